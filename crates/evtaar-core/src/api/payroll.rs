use super::client::path_id;
use super::{ApiClient, Result};
use crate::models::{
    Attendance, AttendanceQuery, CreateEmployeeRequest, Employee, EmployeeQuery,
    GeneratePayrollRequest, MarkAttendanceRequest, Page, PayrollQuery, PayrollRecord,
};

/// `/payroll` endpoints: employees, attendance and payroll records
pub struct PayrollApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PayrollApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    // ===== Employees =====

    pub async fn create_employee(&self, request: &CreateEmployeeRequest) -> Result<Employee> {
        self.client.post("/payroll/employees", request).await
    }

    pub async fn list_employees(&self, query: &EmployeeQuery) -> Result<Page<Employee>> {
        self.client.get_page("/payroll/employees", query).await
    }

    pub async fn get_employee(&self, id: &str) -> Result<Employee> {
        self.client.get(&format!("/payroll/employees/{}", path_id(id)?)).await
    }

    // ===== Attendance =====

    pub async fn mark_attendance(&self, request: &MarkAttendanceRequest) -> Result<Attendance> {
        self.client.post("/payroll/attendance", request).await
    }

    pub async fn list_attendance(&self, query: &AttendanceQuery) -> Result<Page<Attendance>> {
        self.client.get_page("/payroll/attendance", query).await
    }

    // ===== Payroll records =====

    pub async fn generate_record(&self, request: &GeneratePayrollRequest) -> Result<PayrollRecord> {
        self.client.post("/payroll/records", request).await
    }

    pub async fn list_records(&self, query: &PayrollQuery) -> Result<Page<PayrollRecord>> {
        self.client.get_page("/payroll/records", query).await
    }

    pub async fn get_record(&self, id: &str) -> Result<PayrollRecord> {
        self.client.get(&format!("/payroll/records/{}", path_id(id)?)).await
    }

    pub async fn approve_record(&self, id: &str) -> Result<()> {
        self.client
            .post_empty(&format!("/payroll/records/{}/approve", path_id(id)?))
            .await
    }

    pub async fn pay_record(&self, id: &str) -> Result<()> {
        self.client
            .post_empty(&format!("/payroll/records/{}/pay", path_id(id)?))
            .await
    }
}

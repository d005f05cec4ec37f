use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ===== Employees =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Employee {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub employee_code: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub joining_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub salary_amount: f64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub employee_code: String,
    pub department: String,
    pub designation: String,
    pub joining_date: DateTime<Utc>,
    pub salary_amount: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

// ===== Attendance =====

/// A status this client does not know deserializes to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Halfday,
    Leave,
    Holiday,
    Unknown,
}

impl AttendanceStatus {
    pub fn from_api(status: &str) -> Self {
        status.parse().unwrap_or(AttendanceStatus::Unknown)
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AttendanceStatus::from_api(&raw))
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Halfday => "Half day",
            AttendanceStatus::Leave => "Leave",
            AttendanceStatus::Holiday => "Holiday",
            AttendanceStatus::Unknown => "Unknown",
        };
        f.pad(label)
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "halfday" | "half-day" | "half_day" => Ok(AttendanceStatus::Halfday),
            "leave" => Ok(AttendanceStatus::Leave),
            "holiday" => Ok(AttendanceStatus::Holiday),
            other => Err(format!("unknown attendance status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: String,
    pub employee_id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub hours_worked: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAttendanceRequest {
    pub employee_id: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttendanceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

// ===== Payroll records =====

/// Records move draft -> approved -> paid on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Draft,
    Pending,
    Approved,
    Paid,
    Failed,
    Unknown,
}

impl PaymentStatus {
    pub fn from_api(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "draft" => PaymentStatus::Draft,
            "pending" => PaymentStatus::Pending,
            "approved" => PaymentStatus::Approved,
            "paid" => PaymentStatus::Paid,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Unknown,
        }
    }

    pub fn can_approve(&self) -> bool {
        matches!(self, PaymentStatus::Draft | PaymentStatus::Pending)
    }

    pub fn can_pay(&self) -> bool {
        *self == PaymentStatus::Approved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: String,
    pub employee_id: String,
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub basic_salary: f64,
    #[serde(default)]
    pub allowances: f64,
    #[serde(default)]
    pub deductions: f64,
    #[serde(default)]
    pub net_salary: f64,
    #[serde(default, alias = "status")]
    pub payment_status: String,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PayrollRecord {
    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::from_api(&self.payment_status)
    }

    /// "2024-03"
    pub fn period(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayrollRequest {
    pub employee_id: String,
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub allowances: f64,
    #[serde(default)]
    pub deductions: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PayrollQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_status_parsing() {
        assert_eq!("half-day".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Halfday));
        assert_eq!("PRESENT".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
        assert!("sick".parse::<AttendanceStatus>().is_err());

        let json = serde_json::to_string(&AttendanceStatus::Halfday).expect("serialize");
        assert_eq!(json, r#""halfday""#);
    }

    #[test]
    fn test_attendance_page_tolerates_unexpected_status() {
        let json = r#"[
            {"id":"a1","employee_id":"e1","date":"2024-03-04T00:00:00Z","status":"Present"},
            {"id":"a2","employee_id":"e1","date":"2024-03-05T00:00:00Z","status":"half_day"},
            {"id":"a3","employee_id":"e1","date":"2024-03-06T00:00:00Z","status":"sick"}
        ]"#;
        let rows: Vec<Attendance> = serde_json::from_str(json).expect("Failed to parse attendance");
        assert_eq!(rows[0].status, AttendanceStatus::Present);
        assert_eq!(rows[1].status, AttendanceStatus::Halfday);
        assert_eq!(rows[2].status, AttendanceStatus::Unknown);
    }

    #[test]
    fn test_payroll_record_lifecycle_flags() {
        let json = r#"{"id":"p1","employee_id":"e1","month":3,"year":2024,"basic_salary":5000,"allowances":200,"deductions":100,"net_salary":5100,"payment_status":"draft","notes":""}"#;
        let record: PayrollRecord = serde_json::from_str(json).expect("Failed to parse payroll record");
        assert_eq!(record.period(), "2024-03");
        assert!(record.status().can_approve());
        assert!(!record.status().can_pay());
        assert!(PaymentStatus::from_api("Approved").can_pay());
    }

    #[test]
    fn test_attendance_query_formats_dates() {
        let query = AttendanceQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            limit: Some(50),
            ..Default::default()
        };
        let value = serde_json::to_value(&query).expect("serialize");
        assert_eq!(value["start_date"], "2024-01-01");
        assert!(value.get("employee_id").is_none());
    }
}

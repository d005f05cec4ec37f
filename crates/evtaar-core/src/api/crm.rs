use super::client::path_id;
use super::{ApiClient, Result};
use crate::models::{
    CreateInteractionRequest, Customer, CustomerQuery, CustomerRequest, Interaction, Page,
};

/// `/crm` endpoints.
///
/// Interactions are always addressed through their customer
/// (`/crm/customers/{id}/interactions`).
pub struct CrmApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CrmApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer> {
        self.client.post("/crm/customers", request).await
    }

    pub async fn list_customers(&self, query: &CustomerQuery) -> Result<Page<Customer>> {
        self.client.get_page("/crm/customers", query).await
    }

    pub async fn get_customer(&self, id: &str) -> Result<Customer> {
        self.client.get(&format!("/crm/customers/{}", path_id(id)?)).await
    }

    pub async fn update_customer(&self, id: &str, request: &CustomerRequest) -> Result<Customer> {
        self.client
            .put(&format!("/crm/customers/{}", path_id(id)?), request)
            .await
    }

    pub async fn delete_customer(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/crm/customers/{}", path_id(id)?)).await
    }

    pub async fn add_interaction(
        &self,
        customer_id: &str,
        request: &CreateInteractionRequest,
    ) -> Result<Interaction> {
        self.client
            .post(&format!("/crm/customers/{}/interactions", path_id(customer_id)?), request)
            .await
    }

    pub async fn list_interactions(&self, customer_id: &str) -> Result<Vec<Interaction>> {
        self.client
            .get_list(&format!("/crm/customers/{}/interactions", path_id(customer_id)?))
            .await
    }
}

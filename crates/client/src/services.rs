//! Service (contract) API client methods

use crate::client::VendorDeskClient;
use crate::error::ClientError;
use crate::request::RequestDescriptor;
use crate::types::{
    NewService, Page, Service, ServicePatch, ServiceQuery, ServiceStatus, StatusUpdate,
};

impl VendorDeskClient {
    /// List services, one page at a time
    pub async fn list_services(&self, query: &ServiceQuery) -> Result<Page<Service>, ClientError> {
        let request = RequestDescriptor::get("/services/").with_query(query.to_pairs());
        self.execute(&request).await
    }

    /// Get one service
    pub async fn get_service(&self, id: i64) -> Result<Service, ClientError> {
        self.execute(&RequestDescriptor::get(format!("/services/{id}/")))
            .await
    }

    /// Create a service.
    ///
    /// The backend answers with the accepted fields only, not the computed
    /// counters, so the payload echo is returned.
    pub async fn create_service(&self, service: &NewService) -> Result<NewService, ClientError> {
        service.validate()?;
        let request = RequestDescriptor::post("/services/").with_json(service)?;
        self.execute(&request).await
    }

    /// Partially update a service
    pub async fn update_service(
        &self,
        id: i64,
        patch: &ServicePatch,
    ) -> Result<Service, ClientError> {
        if patch.is_empty() {
            return Err(ClientError::Validation("no fields to update".into()));
        }
        patch.validate()?;
        let request = RequestDescriptor::patch(format!("/services/{id}/")).with_json(patch)?;
        self.execute(&request).await
    }

    /// Delete a service
    pub async fn delete_service(&self, id: i64) -> Result<(), ClientError> {
        self.execute_empty(&RequestDescriptor::delete(format!("/services/{id}/")))
            .await
    }

    /// Update only the status field
    pub async fn update_service_status(
        &self,
        id: i64,
        status: ServiceStatus,
    ) -> Result<StatusUpdate, ClientError> {
        let request = RequestDescriptor::patch(format!("/services/{id}/status/"))
            .with_json(&StatusUpdate { status })?;
        self.execute(&request).await
    }

    /// Active services whose expiry falls within the backend's warning window
    pub async fn services_expiring_soon(&self) -> Result<Vec<Service>, ClientError> {
        self.execute(&RequestDescriptor::get("/services/expiring-soon/"))
            .await
    }

    /// Services whose payment falls due within the backend's warning window
    pub async fn services_payment_due_soon(&self) -> Result<Vec<Service>, ClientError> {
        self.execute(&RequestDescriptor::get("/services/payment-due-soon/"))
            .await
    }
}

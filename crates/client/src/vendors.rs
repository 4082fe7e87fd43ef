//! Vendor API client methods

use crate::client::VendorDeskClient;
use crate::error::ClientError;
use crate::request::RequestDescriptor;
use crate::types::{NewVendor, Page, Service, Vendor, VendorPatch, VendorQuery};

impl VendorDeskClient {
    /// List vendors, one page at a time
    pub async fn list_vendors(&self, query: &VendorQuery) -> Result<Page<Vendor>, ClientError> {
        let request = RequestDescriptor::get("/vendors/").with_query(query.to_pairs());
        self.execute(&request).await
    }

    /// Get one vendor with its services
    pub async fn get_vendor(&self, id: i64) -> Result<Vendor, ClientError> {
        self.execute(&RequestDescriptor::get(format!("/vendors/{id}/")))
            .await
    }

    /// Create a vendor
    pub async fn create_vendor(&self, vendor: &NewVendor) -> Result<Vendor, ClientError> {
        vendor.validate()?;
        let request = RequestDescriptor::post("/vendors/").with_json(vendor)?;
        self.execute(&request).await
    }

    /// Partially update a vendor
    pub async fn update_vendor(&self, id: i64, patch: &VendorPatch) -> Result<Vendor, ClientError> {
        if patch.is_empty() {
            return Err(ClientError::Validation("no fields to update".into()));
        }
        let request = RequestDescriptor::patch(format!("/vendors/{id}/")).with_json(patch)?;
        self.execute(&request).await
    }

    /// Delete a vendor and, on the backend, its services
    pub async fn delete_vendor(&self, id: i64) -> Result<(), ClientError> {
        self.execute_empty(&RequestDescriptor::delete(format!("/vendors/{id}/")))
            .await
    }

    /// Services contracted with one vendor
    pub async fn vendor_services(&self, id: i64) -> Result<Vec<Service>, ClientError> {
        self.execute(&RequestDescriptor::get(format!("/vendors/{id}/services/")))
            .await
    }

    /// Active vendors that have at least one active service
    pub async fn vendors_with_active_services(&self) -> Result<Vec<Vendor>, ClientError> {
        self.execute(&RequestDescriptor::get("/vendors/with-active-services/"))
            .await
    }
}

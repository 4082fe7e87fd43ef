//! Dashboard API client methods

use crate::client::VendorDeskClient;
use crate::error::ClientError;
use crate::request::RequestDescriptor;
use crate::types::{DashboardStats, ServiceReminder};

impl VendorDeskClient {
    /// Aggregate counts and the total value of active contracts
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.execute(&RequestDescriptor::get("/dashboard/stats/"))
            .await
    }

    /// Expiry and payment reminders, newest first
    pub async fn reminders(&self) -> Result<Vec<ServiceReminder>, ClientError> {
        self.execute(&RequestDescriptor::get("/reminders/")).await
    }
}

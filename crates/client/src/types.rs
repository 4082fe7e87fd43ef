//! Wire types for the vendordesk backend

use crate::error::ClientError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use std::fmt;
use std::str::FromStr;

// Authentication

/// Access and refresh credential issued at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Refresh endpoint answer; `refresh` is only present when the backend rotates it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

// Domain records

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    Active,
    Inactive,
}

impl VendorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ClientError::Validation(format!(
                "Invalid vendor status '{other}'. Must be one of: active, inactive"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Active,
    Expired,
    PaymentPending,
    Completed,
}

impl ServiceStatus {
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::Expired,
        Self::PaymentPending,
        Self::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::PaymentPending => "payment_pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                ClientError::Validation(format!(
                    "Invalid status '{s}'. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Vendor as returned by list and detail endpoints.
///
/// List responses omit `created_by` and `services`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub status: VendorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<User>,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// A contracted service. The day counters and soon-flags are computed by the
/// backend relative to its current date.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub vendor: i64,
    pub service_name: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub payment_due_date: NaiveDate,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: f64,
    pub status: ServiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<User>,
    pub days_until_expiry: i64,
    pub days_until_payment_due: i64,
    pub is_expiring_soon: bool,
    pub is_payment_due_soon: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Expiry,
    Payment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceReminder {
    pub id: i64,
    pub service: Service,
    pub reminder_type: ReminderType,
    pub reminder_date: NaiveDate,
    pub is_sent: bool,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_vendors: u64,
    pub active_vendors: u64,
    pub total_services: u64,
    pub active_services: u64,
    pub expiring_soon: u64,
    pub payment_due_soon: u64,
    pub overdue_services: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total_contract_value: f64,
}

/// Paginated list envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

// Write payloads

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVendor {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub status: VendorStatus,
}

impl NewVendor {
    /// # Errors
    ///
    /// Returns `ClientError::Validation` when a required field is blank
    pub fn validate(&self) -> Result<(), ClientError> {
        require_non_blank("name", &self.name)?;
        require_non_blank("email", &self.email)
    }
}

/// Partial vendor update, absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VendorStatus>,
}

impl VendorPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewService {
    pub vendor: i64,
    pub service_name: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub payment_due_date: NaiveDate,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: f64,
    pub status: ServiceStatus,
}

impl NewService {
    /// Date ordering and required fields, checked before any request is sent
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` describing the first violation
    pub fn validate(&self) -> Result<(), ClientError> {
        require_non_blank("service_name", &self.service_name)?;
        check_dates(
            self.start_date,
            Some(self.expiry_date),
            Some(self.payment_due_date),
        )?;
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ClientError::Validation(
                "Amount must be a non-negative number.".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,
}

impl ServicePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Only dates supplied together can be checked client-side
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` describing the first violation
    pub fn validate(&self) -> Result<(), ClientError> {
        if let Some(name) = &self.service_name {
            require_non_blank("service_name", name)?;
        }
        match self.start_date {
            Some(start) => check_dates(start, self.expiry_date, self.payment_due_date),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ServiceStatus,
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        Err(ClientError::Validation(format!("{field} may not be blank.")))
    } else {
        Ok(())
    }
}

fn check_dates(
    start: NaiveDate,
    expiry: Option<NaiveDate>,
    payment_due: Option<NaiveDate>,
) -> Result<(), ClientError> {
    if expiry.is_some_and(|expiry| expiry <= start) {
        return Err(ClientError::Validation(
            "Expiry date must be after start date.".into(),
        ));
    }
    if payment_due.is_some_and(|due| due <= start) {
        return Err(ClientError::Validation(
            "Payment due date must be after start date.".into(),
        ));
    }
    Ok(())
}

// List parameters

/// Filters for `GET /vendors/`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub status: Option<VendorStatus>,
}

impl VendorQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "page", self.page);
        push_pair(&mut pairs, "search", self.search.as_deref());
        push_pair(&mut pairs, "ordering", self.ordering.as_deref());
        push_pair(&mut pairs, "status", self.status);
        pairs
    }
}

/// Filters for `GET /services/`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub status: Option<ServiceStatus>,
    pub vendor: Option<i64>,
}

impl ServiceQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "page", self.page);
        push_pair(&mut pairs, "search", self.search.as_deref());
        push_pair(&mut pairs, "ordering", self.ordering.as_deref());
        push_pair(&mut pairs, "status", self.status);
        push_pair(&mut pairs, "vendor", self.vendor);
        pairs
    }
}

fn push_pair<V: ToString>(pairs: &mut Vec<(String, String)>, key: &str, value: Option<V>) {
    if let Some(value) = value {
        pairs.push((key.to_string(), value.to_string()));
    }
}

//! Vendordesk API client
//!
//! Typed bindings for the vendor and service-contract backend, built around a
//! client that attaches the stored bearer token to every request and recovers
//! once from an expired token by calling the refresh endpoint.

pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod navigation;
pub mod request;
pub mod services;
pub mod storage;
pub mod types;
pub mod vendors;

pub use client::{VendorDeskClient, VendorDeskClientBuilder};
pub use config::{ClientConfig, RefreshPolicy, StorageKeys};
pub use error::{ClientError, StorageError};
pub use navigation::{CallbackNavigator, LogNavigator, Navigator};
pub use request::{ApiResponse, RequestDescriptor};
pub use storage::{CredentialStore, FileStore, MemoryStore};

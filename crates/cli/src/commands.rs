//! CLI commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;
use tracing::info;
use vendordesk_client::VendorDeskClient;
use vendordesk_client::types::{
    NewService, NewVendor, ServicePatch, ServiceQuery, ServiceStatus, VendorPatch, VendorQuery,
    VendorStatus,
};

use crate::render;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the credential pair
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (falls back to VENDORDESK_PASSWORD)
        #[arg(short, long, env = "VENDORDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Erase stored credentials
    Logout,

    /// Report whether a credential is stored
    #[command(alias = "whoami")]
    Status,

    /// Vendor operations
    Vendors {
        #[command(subcommand)]
        command: VendorCommands,
    },

    /// Service contract operations
    Services {
        #[command(subcommand)]
        command: ServiceCommands,
    },

    /// Aggregate stats with expiring and payment-due services
    Dashboard,

    /// List service reminders
    Reminders,
}

#[derive(Subcommand)]
pub enum VendorCommands {
    /// List vendors
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        ordering: Option<String>,
        #[arg(long)]
        status: Option<VendorStatus>,
    },

    /// Show one vendor with its services
    Get { id: i64 },

    /// Create a vendor
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact_person: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "active")]
        status: VendorStatus,
    },

    /// Update selected vendor fields
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        contact_person: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        status: Option<VendorStatus>,
    },

    /// Delete a vendor
    Delete { id: i64 },

    /// List a vendor's services
    Services { id: i64 },

    /// Vendors with at least one active service
    Active,
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// List services
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        ordering: Option<String>,
        #[arg(long)]
        status: Option<ServiceStatus>,
        #[arg(long)]
        vendor: Option<i64>,
    },

    /// Show one service
    Get { id: i64 },

    /// Create a service
    Create {
        #[arg(long)]
        vendor: i64,
        #[arg(long)]
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: NaiveDate,
        /// Payment due date (YYYY-MM-DD)
        #[arg(long)]
        payment_due: NaiveDate,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "active")]
        status: ServiceStatus,
    },

    /// Update selected service fields
    Update {
        id: i64,
        #[arg(long)]
        vendor: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        expiry: Option<NaiveDate>,
        #[arg(long)]
        payment_due: Option<NaiveDate>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        status: Option<ServiceStatus>,
    },

    /// Delete a service
    Delete { id: i64 },

    /// Change only the status of a service
    Status { id: i64, status: ServiceStatus },

    /// Services nearing expiry
    Expiring,

    /// Services nearing their payment due date
    PaymentDue,
}

/// Print `value` as JSON or through `render`
fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

impl Commands {
    pub async fn execute(self, client: &VendorDeskClient, json: bool) -> Result<()> {
        match self {
            Commands::Login { username, password } => {
                client.login(&username, &password).await?;
                println!("Logged in as {username}.");
                Ok(())
            }
            Commands::Logout => {
                client.logout()?;
                println!("Logged out.");
                Ok(())
            }
            Commands::Status => {
                let authenticated = client.is_authenticated()?;
                if json {
                    println!("{}", serde_json::json!({ "authenticated": authenticated }));
                } else if authenticated {
                    println!("Signed in to {}.", client.base_url());
                } else {
                    println!("Not signed in. Run `vendordesk login`.");
                }
                Ok(())
            }
            Commands::Vendors { command } => command.execute(client, json).await,
            Commands::Services { command } => command.execute(client, json).await,
            Commands::Dashboard => {
                let (stats, expiring, payment_due) = tokio::try_join!(
                    client.dashboard_stats(),
                    client.services_expiring_soon(),
                    client.services_payment_due_soon(),
                )?;
                if json {
                    let value = serde_json::json!({
                        "stats": stats,
                        "expiring_soon": expiring,
                        "payment_due_soon": payment_due,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                } else {
                    println!("{}", render::stats_summary(&stats));
                    println!("\nExpiring soon\n{}", render::services_table(&expiring));
                    println!("\nPayment due soon\n{}", render::services_table(&payment_due));
                }
                Ok(())
            }
            Commands::Reminders => {
                let reminders = client.reminders().await?;
                emit(json, reminders.as_slice(), render::reminders_table)
            }
        }
    }
}

impl VendorCommands {
    pub async fn execute(self, client: &VendorDeskClient, json: bool) -> Result<()> {
        match self {
            VendorCommands::List {
                page,
                search,
                ordering,
                status,
            } => {
                let query = VendorQuery {
                    page,
                    search,
                    ordering,
                    status,
                };
                let vendors = client.list_vendors(&query).await?;
                emit(json, &vendors, |page| {
                    format!(
                        "{}\n\n{} of {} vendors",
                        render::vendors_table(&page.results),
                        page.results.len(),
                        page.count
                    )
                })
            }
            VendorCommands::Get { id } => {
                let vendor = client.get_vendor(id).await?;
                emit(json, &vendor, render::vendor_detail)
            }
            VendorCommands::Create {
                name,
                contact_person,
                email,
                phone,
                status,
            } => {
                let vendor = client
                    .create_vendor(&NewVendor {
                        name,
                        contact_person,
                        email,
                        phone,
                        status,
                    })
                    .await?;
                info!(id = vendor.id, "Vendor created");
                emit(json, &vendor, render::vendor_detail)
            }
            VendorCommands::Update {
                id,
                name,
                contact_person,
                email,
                phone,
                status,
            } => {
                let patch = VendorPatch {
                    name,
                    contact_person,
                    email,
                    phone,
                    status,
                };
                let vendor = client.update_vendor(id, &patch).await?;
                emit(json, &vendor, render::vendor_detail)
            }
            VendorCommands::Delete { id } => {
                client.delete_vendor(id).await?;
                println!("Deleted vendor {id}.");
                Ok(())
            }
            VendorCommands::Services { id } => {
                let services = client.vendor_services(id).await?;
                emit(json, services.as_slice(), render::services_table)
            }
            VendorCommands::Active => {
                let vendors = client.vendors_with_active_services().await?;
                emit(json, vendors.as_slice(), render::vendors_table)
            }
        }
    }
}

impl ServiceCommands {
    pub async fn execute(self, client: &VendorDeskClient, json: bool) -> Result<()> {
        match self {
            ServiceCommands::List {
                page,
                search,
                ordering,
                status,
                vendor,
            } => {
                let query = ServiceQuery {
                    page,
                    search,
                    ordering,
                    status,
                    vendor,
                };
                let services = client.list_services(&query).await?;
                emit(json, &services, |page| {
                    format!(
                        "{}\n\n{} of {} services",
                        render::services_table(&page.results),
                        page.results.len(),
                        page.count
                    )
                })
            }
            ServiceCommands::Get { id } => {
                let service = client.get_service(id).await?;
                emit(json, &service, render::service_detail)
            }
            ServiceCommands::Create {
                vendor,
                name,
                start,
                expiry,
                payment_due,
                amount,
                status,
            } => {
                let created = client
                    .create_service(&NewService {
                        vendor,
                        service_name: name,
                        start_date: start,
                        expiry_date: expiry,
                        payment_due_date: payment_due,
                        amount,
                        status,
                    })
                    .await?;
                emit(json, &created, |s| {
                    format!(
                        "Created service '{}' for vendor {} ({}, expires {}).",
                        s.service_name,
                        s.vendor,
                        render::format_currency(s.amount),
                        render::format_date(s.expiry_date)
                    )
                })
            }
            ServiceCommands::Update {
                id,
                vendor,
                name,
                start,
                expiry,
                payment_due,
                amount,
                status,
            } => {
                let patch = ServicePatch {
                    vendor,
                    service_name: name,
                    start_date: start,
                    expiry_date: expiry,
                    payment_due_date: payment_due,
                    amount,
                    status,
                };
                let service = client.update_service(id, &patch).await?;
                emit(json, &service, render::service_detail)
            }
            ServiceCommands::Delete { id } => {
                client.delete_service(id).await?;
                println!("Deleted service {id}.");
                Ok(())
            }
            ServiceCommands::Status { id, status } => {
                let update = client.update_service_status(id, status).await?;
                emit(json, &update, |u| format!("Service {id} is now {}.", u.status))
            }
            ServiceCommands::Expiring => {
                let services = client.services_expiring_soon().await?;
                emit(json, services.as_slice(), render::services_table)
            }
            ServiceCommands::PaymentDue => {
                let services = client.services_payment_due_soon().await?;
                emit(json, services.as_slice(), render::services_table)
            }
        }
    }
}

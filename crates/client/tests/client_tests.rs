//! Integration tests for the vendordesk API client

use serde_json::json;
use std::sync::Arc;
use vendordesk_client::types::{
    NewService, NewVendor, ServicePatch, ServiceQuery, ServiceStatus, TokenPair, VendorPatch,
    VendorQuery, VendorStatus,
};
use vendordesk_client::{ClientError, CredentialStore, MemoryStore, VendorDeskClient};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn authenticated(server: &MockServer, access: &str) -> (VendorDeskClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_pair(&TokenPair {
        access: access.into(),
        refresh: "R1".into(),
    }));
    let client = VendorDeskClient::builder()
        .base_url(server.uri())
        .store(store.clone())
        .build()
        .unwrap();
    (client, store)
}

fn vendor_body(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "contact_person": "Dana Reyes",
        "email": "dana@example.com",
        "phone": "+1 555 0100",
        "status": "active",
        "created_at": "2025-01-10T12:00:00Z",
        "updated_at": "2025-01-11T12:00:00Z"
    })
}

fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_client_builder() {
    let client = VendorDeskClient::builder()
        .base_url("http://localhost:8000/api")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000/api");
}

#[tokio::test]
async fn test_client_builder_rejects_invalid_url() {
    let result = VendorDeskClient::builder().base_url("not a url").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_bearer_header_attached_when_token_stored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vendors/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [vendor_body(1, "Acme Hosting")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    let page = client.list_vendors(&VendorQuery::default()).await.unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].name, "Acme Hosting");
    assert!(page.results[0].services.is_empty());
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dashboard/stats/"))
        .respond_with(|req: &Request| {
            if req.headers.contains_key("authorization") {
                ResponseTemplate::new(500)
            } else {
                ResponseTemplate::new(403)
                    .set_body_json(json!({"detail": "Authentication credentials were not provided."}))
            }
        })
        .mount(&mock_server)
        .await;

    let client = VendorDeskClient::new(mock_server.uri()).unwrap();
    let err = client.dashboard_stats().await.unwrap_err();

    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(!client.is_authenticated().unwrap());
}

#[tokio::test]
async fn test_login_stores_credential_pair() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"username": "ops", "password": "hunter2"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "A1", "refresh": "R1"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = VendorDeskClient::builder()
        .base_url(mock_server.uri())
        .store(store.clone())
        .build()
        .unwrap();

    let pair = client.login("ops", "hunter2").await.unwrap();
    assert_eq!(pair.access, "A1");
    assert_eq!(store.access_token().unwrap().as_deref(), Some("A1"));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("R1"));
    assert!(client.is_authenticated().unwrap());

    client.logout().unwrap();
    assert!(!client.is_authenticated().unwrap());
    assert!(store.refresh_token().unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_login_does_not_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, store) = authenticated(&mock_server, "A1");
    let err = client.login("ops", "wrong").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(
        err.detail(),
        "No active account found with the given credentials"
    );
    // A failed login leaves the previous session alone
    assert_eq!(store.access_token().unwrap().as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_list_services_sends_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/"))
        .and(query_param("status", "payment_pending"))
        .and(query_param("vendor", "4"))
        .and(query_param("ordering", "expiry_date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 0,
            "next": null,
            "previous": null,
            "results": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    let query = ServiceQuery {
        status: Some(ServiceStatus::PaymentPending),
        vendor: Some(4),
        ordering: Some("expiry_date".into()),
        ..ServiceQuery::default()
    };
    let page = client.list_services(&query).await.unwrap();
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn test_create_vendor_posts_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/vendors/"))
        .and(body_json(json!({
            "name": "Northwind Cleaning",
            "contact_person": "Sam Ortiz",
            "email": "sam@northwind.example",
            "phone": "555-0199",
            "status": "active"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(vendor_body(8, "Northwind Cleaning")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    let vendor = client
        .create_vendor(&NewVendor {
            name: "Northwind Cleaning".into(),
            contact_person: "Sam Ortiz".into(),
            email: "sam@northwind.example".into(),
            phone: "555-0199".into(),
            status: VendorStatus::Active,
        })
        .await
        .unwrap();
    assert_eq!(vendor.id, 8);
}

#[tokio::test]
async fn test_backend_validation_error_passes_through_verbatim() {
    let mock_server = MockServer::start().await;
    let body = r#"{"email":["This email is already in use by another vendor."]}"#;

    Mock::given(method("PATCH"))
        .and(path("/vendors/2/"))
        .respond_with(ResponseTemplate::new(400).set_body_string(body))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    let patch = VendorPatch {
        email: Some("taken@example.com".into()),
        ..VendorPatch::default()
    };
    let err = client.update_vendor(2, &patch).await.unwrap_err();

    assert!(matches!(err, ClientError::BadRequest(_)));
    assert_eq!(err.body(), Some(body));
    assert_eq!(
        err.detail(),
        "email: This email is already in use by another vendor."
    );
}

#[tokio::test]
async fn test_server_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/77/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reminders/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");

    let err = client.get_service(77).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert_eq!(err.body(), Some(r#"{"detail":"Not found."}"#));

    let err = client.reminders().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::ServerError { status: 500, ref message } if message == "Internal Server Error"
    ));
}

#[tokio::test]
async fn test_invalid_service_never_reaches_backend() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    let err = client
        .create_service(&NewService {
            vendor: 1,
            service_name: "Annual audit".into(),
            start_date: date("2025-05-01"),
            expiry_date: date("2025-04-01"),
            payment_due_date: date("2025-06-01"),
            amount: 5000.0,
            status: ServiceStatus::Active,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_create_service_reads_decimal_amount() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "vendor": 1,
            "service_name": "Annual audit",
            "start_date": "2025-05-01",
            "expiry_date": "2026-04-30",
            "payment_due_date": "2025-06-01",
            "amount": "5000.00",
            "status": "active"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    let created = client
        .create_service(&NewService {
            vendor: 1,
            service_name: "Annual audit".into(),
            start_date: date("2025-05-01"),
            expiry_date: date("2026-04-30"),
            payment_due_date: date("2025-06-01"),
            amount: 5000.0,
            status: ServiceStatus::Active,
        })
        .await
        .unwrap();
    assert!((created.amount - 5000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_delete_and_empty_patch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/services/12/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    client.delete_service(12).await.unwrap();

    let err = client
        .update_service(12, &ServicePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_reminders_decode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reminders/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "service": {
                "id": 5,
                "vendor": 1,
                "service_name": "Managed backups",
                "start_date": "2025-01-01",
                "expiry_date": "2025-02-10",
                "payment_due_date": "2025-02-01",
                "amount": 450,
                "status": "active",
                "created_at": "2025-01-01T08:00:00Z",
                "updated_at": "2025-01-01T08:00:00Z",
                "days_until_expiry": 9,
                "days_until_payment_due": 0,
                "is_expiring_soon": true,
                "is_payment_due_soon": true
            },
            "reminder_type": "expiry",
            "reminder_date": "2025-02-01",
            "is_sent": true,
            "sent_at": "2025-02-01T06:00:00Z",
            "created_at": "2025-02-01T06:00:00Z"
        }])))
        .mount(&mock_server)
        .await;

    let (client, _) = authenticated(&mock_server, "A1");
    let reminders = client.reminders().await.unwrap();

    assert_eq!(reminders.len(), 1);
    assert!(reminders[0].is_sent);
    assert!(reminders[0].service.is_expiring_soon);
}

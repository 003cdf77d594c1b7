use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use creditlens_client::config::ServerConfig;
use creditlens_client::http::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "creditlens-test-boundary";

const CUSTOMERS_CSV: &str = "\
Customer ID,Credit Limit,Utilisation %,Avg Payment Ratio,Min Due Paid Frequency,Merchant Mix Index,Cash Withdrawal %,Recent Spend Change %
C-1,50000,80,40,60,0.8,25,-20
C-2,20000,30,90,10,0.2,5,5
";

fn app() -> Router {
    let config = ServerConfig::default();
    router(AppState::from_config(&config), &config)
}

fn multipart_body(field: &str, file_name: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
    )
}

fn upload_request(field: &str, file_name: &str, content: &str) -> Request<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/score")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, file_name, content)));
    assert!(request.is_ok());
    request.unwrap_or_default()
}

fn get_request(uri: &str) -> Request<Body> {
    let request = Request::builder().uri(uri).body(Body::empty());
    assert!(request.is_ok());
    request.unwrap_or_default()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await;
    assert!(response.is_ok());
    let Ok(response) = response else {
        return (StatusCode::INTERNAL_SERVER_ERROR, Value::Null);
    };
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await;
    assert!(bytes.is_ok());
    let body = bytes
        .ok()
        .and_then(|raw| serde_json::from_slice::<Value>(&raw).ok())
        .unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn ping_reports_ok() {
    let app = app();
    let (status, body) = send(&app, get_request("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn upload_scores_and_enables_customer_lookup() {
    let app = app();

    let (status, body) = send(&app, get_request("/api/customer/C-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data available");

    let (status, body) = send(
        &app,
        upload_request("file", "customers.csv", CUSTOMERS_CSV),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["risk_counts"], json!({"High": 1, "Low": 1}));
    assert_eq!(body["sheet_used"], "customers");
    assert_eq!(body["customers"][0]["Customer ID"], "C-1");
    let batch_id = body["batch_id"].as_str().unwrap_or_default().to_string();
    assert!(batch_id.starts_with("bat_"));

    let (status, body) = send(&app, get_request("/api/customer/C-2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Risk_Reasons_Text"], "Stable behaviour");

    let (status, body) = send(&app, get_request("/api/customer/C-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Customer not found");

    let (status, body) = send(
        &app,
        get_request(&format!("/api/batches/{batch_id}/customers/C-1")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Risk_Level"], "High");

    let (status, body) = send(&app, get_request("/api/batches/bat_missing/customers/C-1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "batch_not_found");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        upload_request("attachment", "customers.csv", CUSTOMERS_CSV),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn non_multipart_upload_is_treated_as_missing_file() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/score")
        .body(Body::empty());
    assert!(request.is_ok());
    let (status, body) = send(&app, request.unwrap_or_default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
    assert_eq!(body["code"], "upload_empty");
}

#[tokio::test]
async fn unusable_workbook_lists_sheets_found() {
    let app = app();
    let (status, body) = send(
        &app,
        upload_request("file", "summary.csv", "Metric,Value\ncustomers,2\n"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No valid data sheet found in workbook.");
    assert_eq!(body["sheets_found"], json!(["summary"]));
    assert_eq!(body["last_sheet_columns"], json!(["Metric", "Value"]));
    assert!(body["hint"].is_string());
}

#[tokio::test]
async fn corrupt_spreadsheet_reports_details() {
    let app = app();
    let (status, body) = send(
        &app,
        upload_request("file", "book.xlsx", "definitely not a zip archive"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unable to read Excel file");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn manual_entry_returns_single_customer() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/score-manual")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"customer_id": "M-1", "avg_payment_ratio": 90, "utilisation_pct": 30})
                .to_string(),
        ));
    assert!(request.is_ok());
    let (status, body) = send(&app, request.unwrap_or_default()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["Customer ID"], "M-1");
    assert_eq!(body["customer"]["Delinquent_Flag"], 0);
    assert_eq!(body["risk_counts"], json!({"Low": 1}));

    let (status, _) = send(&app, get_request("/api/customer/M-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manual_entry_with_bad_json_is_rejected() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/score-manual")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"avg_payment_ratio\": \"high\"}"));
    assert!(request.is_ok());
    let (status, body) = send(&app, request.unwrap_or_default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_argument");
}

use jig_api::{AlertChannel, ApiClient, ApiError, ExcelExport, Notifier};
use jig_core::{AvailabilityStatus, JigSummary};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server, StatusCode};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    url: String,
    body: String,
}

struct MockBackend {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    fn client(&self) -> ApiClient {
        ApiClient::new(&self.base, Duration::from_secs(5)).expect("client")
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve `route(method, url) -> (status, body)` until idle for a few seconds
fn spawn_backend(route: fn(&str, &str) -> (u16, Vec<u8>)) -> MockBackend {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let base = format!("http://{}", server.server_addr());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    thread::spawn(move || loop {
        let mut req = match server.recv_timeout(Duration::from_secs(5)) {
            Ok(Some(req)) => req,
            _ => break,
        };
        let mut body = String::new();
        let _ = req.as_reader().read_to_string(&mut body);
        let method = req.method().to_string();
        let url = req.url().to_string();
        recorded.lock().unwrap().push(Recorded {
            method: method.clone(),
            url: url.clone(),
            body,
        });

        let (status, payload) = route(&method, &url);
        let response = Response::from_data(payload)
            .with_status_code(StatusCode(status))
            .with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("header"),
            );
        let _ = req.respond(response);
    });

    MockBackend { base, requests }
}

fn json(status: u16, body: &str) -> (u16, Vec<u8>) {
    (status, body.as_bytes().to_vec())
}

fn tracker_routes(_method: &str, url: &str) -> (u16, Vec<u8>) {
    let path = url.split('?').next().unwrap_or_default();
    match path {
        "/api/jig_details" if url.contains("jig_number=TJ-1") => json(
            200,
            r#"{"tester_jig_number":"TJ-1","top_assy_no":"ASSY-9","sale_orders":["SO2","SO1"],"officialIncharge":"+910000000000"}"#,
        ),
        "/api/jig_details" => json(
            404,
            r#"{"message":"No details found for Jig Number: TJ-404. Please check the number."}"#,
        ),
        "/api/all_parts_for_jig" if url.contains("jig_number=TJ-1") => json(
            200,
            r#"[
                {"part_number":"P-1","unitName":"Relay","sale_order":"SO1","requiredQuantity":10,"currentStock":4,"availability_status":"Shortage"},
                {"partNumber":"P-2","unitName":"Fuse","saleOrder":"SO2","requiredQuantity":2,"currentStock":9,"availabilityStatus":"Surplus"}
            ]"#,
        ),
        "/api/all_parts_for_jig" if url.contains("jig_number=TJ-EMPTY") => (200, Vec::new()),
        "/api/all_parts_for_jig" => json(200, r#"{"message":"no parts"}"#),
        "/api/shortage_list" => json(
            200,
            r#"[{"partNumber":"P-1","saleOrder":"SO1","availabilityStatus":"Shortage"}]"#,
        ),
        "/api/recommend_purchase" => json(
            200,
            r#"[{"partNumber":"P-1","saleOrder":"SO1","availabilityStatus":"Shortage","p_factor":20,"recommendedQuantity":8}]"#,
        ),
        "/api/send_telegram_alert" => {
            json(200, r#"{"message":"Telegram alert sent successfully!"}"#)
        }
        "/api/send_whatsapp_alert" => json(200, r#"{"message":"Simulated WhatsApp sent"}"#),
        "/api/search_docs" => json(
            200,
            r#"[{"filename":"TJ-1_manual.pdf","page_num":"3","snippet":"relay wiring"}]"#,
        ),
        "/api/download_all_parts_excel" => (200, b"PK\x03\x04excel".to_vec()),
        _ => json(404, r#"{"message":"Not found"}"#),
    }
}

#[test]
fn jig_details_parses_snake_case_summary() {
    let backend = spawn_backend(tracker_routes);
    let summary = backend.client().jig_details(" TJ-1 ").expect("details");

    assert_eq!(summary.tester_jig_number, "TJ-1");
    assert_eq!(summary.top_assy_no, "ASSY-9");
    assert_eq!(summary.sale_orders, vec!["SO2", "SO1"]);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/api/jig_details?jig_number=TJ-1");
}

#[test]
fn backend_error_message_is_surfaced_verbatim() {
    let backend = spawn_backend(tracker_routes);
    let err = backend.client().jig_details("TJ-404").unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "No details found for Jig Number: TJ-404. Please check the number."
    );
}

#[test]
fn backend_error_without_json_body_uses_status() {
    let backend = spawn_backend(|_, _| json(500, "<html>oops</html>"));
    let err = backend.client().all_parts_for_jig("TJ-1").unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Error: 500");
}

#[test]
fn parts_payload_shapes() {
    let backend = spawn_backend(tracker_routes);
    let client = backend.client();

    let parts = client
        .all_parts_for_jig("TJ-1")
        .expect("parts")
        .expect("array payload");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].availability_status, AvailabilityStatus::Shortage);
    assert_eq!(parts[1].sale_order, "SO2");

    assert_eq!(client.all_parts_for_jig("TJ-2").expect("parts"), None);
}

#[test]
fn parts_body_that_is_not_json_is_an_error() {
    let backend = spawn_backend(tracker_routes);

    let err = backend
        .client()
        .all_parts_for_jig("TJ-EMPTY")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::InvalidResponse {
            endpoint: "all_parts_for_jig",
            ..
        }
    ));
    assert_eq!(err.status(), None);
}

#[test]
fn shortage_list_requires_sale_order_before_any_request() {
    let backend = spawn_backend(tracker_routes);
    let client = backend.client();

    let err = client.shortage_list("TJ-1", "  ").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(backend.requests().is_empty());

    let parts = client.shortage_list("TJ-1", "SO1").unwrap().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(
        backend.requests()[0].url,
        "/api/shortage_list?jig_number=TJ-1&sale_order=SO1"
    );
}

#[test]
fn recommendation_fields_are_parsed() {
    let backend = spawn_backend(tracker_routes);
    let parts = backend
        .client()
        .recommend_purchase("TJ-1")
        .unwrap()
        .unwrap();
    assert_eq!(parts[0].p_factor, Some(20.0));
    assert_eq!(parts[0].recommended_quantity, Some(8));
}

#[test]
fn whatsapp_without_incharge_is_rejected_locally() {
    let backend = spawn_backend(tracker_routes);
    let client = backend.client();

    for incharge in [None, Some(""), Some("N/A")] {
        let err = client
            .send_whatsapp_alert("T-1", incharge, "alert")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot send WhatsApp alert: Official Incharge number is missing/invalid."
        );
    }
    assert!(backend.requests().is_empty());
}

#[test]
fn notifier_dispatches_by_channel() {
    let backend = spawn_backend(tracker_routes);
    let client = backend.client();
    let summary = JigSummary {
        tester_jig_number: "TJ-1".to_string(),
        official_incharge: Some("+910000000000".to_string()),
        ..Default::default()
    };

    let telegram = client
        .notify(AlertChannel::Telegram, &summary, "shortage")
        .expect("telegram");
    assert_eq!(telegram, "Telegram alert sent successfully!");

    let whatsapp = client
        .notify(AlertChannel::Whatsapp, &summary, "shortage")
        .expect("whatsapp");
    assert_eq!(whatsapp, "Simulated WhatsApp sent");

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "POST");

    let telegram_body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(telegram_body, serde_json::json!({"message": "shortage"}));

    let whatsapp_body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(
        whatsapp_body,
        serde_json::json!({
            "testerId": "TJ-1",
            "officialIncharge": "+910000000000",
            "message": "shortage"
        })
    );
}

#[test]
fn doc_search_validates_query_length() {
    let backend = spawn_backend(tracker_routes);
    let client = backend.client();

    assert!(matches!(
        client.search_docs("ab"),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(backend.requests().is_empty());

    let hits = client.search_docs("relay").expect("hits");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "TJ-1_manual.pdf (Page 3)");
}

#[test]
fn download_writes_file() {
    let backend = spawn_backend(tracker_routes);
    let dir = tempfile::tempdir().expect("tempdir");
    let dest = dir.path().join(ExcelExport::AllParts.default_file_name("TJ-1"));

    let written = backend
        .client()
        .download_excel(ExcelExport::AllParts, "TJ-1", &dest)
        .expect("download");

    assert_eq!(written, 9);
    assert_eq!(std::fs::read(&dest).unwrap(), b"PK\x03\x04excel");
    assert!(dest.ends_with("HAL_All_Parts_TJ-1.xlsx"));
}

#[test]
fn unreachable_backend_is_reported_as_connectivity_error() {
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = client.jig_details("TJ-1").unwrap_err();

    assert!(matches!(err, ApiError::Unreachable { .. }));
    assert_eq!(
        err.to_string(),
        "Could not connect to the backend server at http://127.0.0.1:9"
    );
}

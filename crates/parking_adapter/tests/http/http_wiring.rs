#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use parking_adapter::{http, AdapterConfig, ParkingAdapterRuntime};
use serde_json::{json, Value};

/// Serves a fresh registry on an ephemeral port for the rest of the test process.
fn start_server(overrides: &[(&str, &str)]) -> String {
    let pairs: Vec<(String, String)> = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut config = AdapterConfig::from_lookup(|key| {
        pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    })
    .unwrap();
    config.bind = "127.0.0.1:0".parse().unwrap();

    let (tx, rx) = mpsc::channel::<SocketAddr>();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let runtime = ParkingAdapterRuntime::from_config(&config).unwrap();
            let app = http::router(runtime, &config.cors_origins);
            let listener = tokio::net::TcpListener::bind(config.bind).await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn send(request: ureq::Request, body: Option<Value>) -> (u16, Value) {
    let result = match body {
        Some(body) => request.send_json(body),
        None => request.call(),
    };
    match result {
        Ok(resp) => (resp.status(), resp.into_json().unwrap()),
        Err(ureq::Error::Status(code, resp)) => (code, resp.into_json().unwrap()),
        Err(err) => panic!("transport error: {err}"),
    }
}

fn get(base: &str, path: &str) -> (u16, Value) {
    send(ureq::get(&format!("{base}{path}")), None)
}

fn post(base: &str, path: &str, body: Value) -> (u16, Value) {
    send(ureq::post(&format!("{base}{path}")), Some(body))
}

#[test]
fn at_http_01_health_check() {
    let base = start_server(&[]);
    let (status, body) = get(&base, "/api/health");
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Smart Parking System API is running");
}

#[test]
fn at_http_02_initial_status_lists_every_slot_free() {
    let base = start_server(&[]);
    let (status, body) = get(&base, "/api/parking/status");
    assert_eq!(status, 200);
    assert_eq!(body["total_count"], 6);
    assert_eq!(body["available_count"], 6);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0]["slot_id"], "A1");
    assert!(slots.iter().all(|s| s["status"] == "available"
        && s["vehicle_id"].is_null()
        && s["booked_at"].is_null()));
}

#[test]
fn at_http_03_book_release_and_conflicts() {
    let base = start_server(&[]);

    let (status, body) = post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "a1", "vehicle_id": " MH-01-AB-1234 "}),
    );
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["slot_id"], "A1");
    assert_eq!(body["vehicle_id"], "MH-01-AB-1234");
    assert!(body["booked_at"].as_str().unwrap().ends_with('Z'));

    let (status, body) = post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "A1", "vehicle_id": "KA-05-XY-9999"}),
    );
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("already occupied"));

    let (status, body) = post(&base, "/api/parking/release", json!({"slot_id": "A1"}));
    assert_eq!(status, 200);
    assert_eq!(body["vehicle_id"], "MH-01-AB-1234");
    assert_eq!(body["message"], "Slot 'A1' has been released");

    let (status, _) = post(&base, "/api/parking/release", json!({"slot_id": "A1"}));
    assert_eq!(status, 409);

    post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "B1", "vehicle_id": "MH-01-AB-1234"}),
    );
    let (status, body) = post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "B2", "vehicle_id": "MH-01-AB-1234"}),
    );
    assert_eq!(status, 409);
    assert_eq!(
        body["message"],
        "Vehicle 'MH-01-AB-1234' is already parked in slot 'B1'"
    );

    let (status, body) = get(&base, "/api/parking/history");
    assert_eq!(status, 200);
    let actions: Vec<(&str, &str)> = body["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["action"].as_str().unwrap(),
                e["slot_id"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        actions,
        vec![("book", "A1"), ("release", "A1"), ("book", "B1")]
    );

    let (_, body) = get(&base, "/api/parking/history?limit=1");
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
    assert_eq!(body["history"][0]["slot_id"], "B1");
}

#[test]
fn at_http_04_input_errors_are_structured() {
    let base = start_server(&[]);

    let (status, body) = post(&base, "/api/parking/book", json!({}));
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing slot_id or vehicle_id");

    let (status, _) = post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "", "vehicle_id": ""}),
    );
    assert_eq!(status, 400);

    let (status, body) = post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "C1", "vehicle_id": "!!!INVALID!!!"}),
    );
    assert_eq!(status, 400);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Invalid Vehicle ID"));

    let (status, body) = post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "Z9", "vehicle_id": "MH-01-AB-1234"}),
    );
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Slot 'Z9' does not exist");

    let (status, body) = send(
        ureq::post(&format!("{base}/api/parking/release")).set("Content-Type", "application/json"),
        None,
    );
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Missing slot_id");

    let (status, body) = get(&base, "/api/parking/history?limit=many");
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (status, body) = get(&base, "/api/parking/nowhere");
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Resource not found");
}

#[test]
fn at_http_05_available_slots_and_cors() {
    let base = start_server(&[("PARKING_SLOT_IDS", "P1,P2,P3")]);
    post(
        &base,
        "/api/parking/book",
        json!({"slot_id": "p2", "vehicle_id": "TN-22-BB-2222"}),
    );

    let resp = ureq::get(&format!("{base}/api/parking/available"))
        .call()
        .unwrap();
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["available_slots"], json!(["P1", "P3"]));

    let preflight = ureq::request("OPTIONS", &format!("{base}/api/parking/book"))
        .call()
        .unwrap();
    assert_eq!(preflight.status(), 204);
    assert!(preflight
        .header("access-control-allow-methods")
        .unwrap()
        .contains("POST"));
}

#[test]
fn at_http_06_history_default_limit_is_configurable() {
    let base = start_server(&[("PARKING_HISTORY_DEFAULT_LIMIT", "2")]);
    for slot in ["A1", "A2", "B1"] {
        let (status, _) = post(
            &base,
            "/api/parking/book",
            json!({"slot_id": slot, "vehicle_id": format!("KA-01-{slot}-1")}),
        );
        assert_eq!(status, 200);
    }
    let (_, body) = get(&base, "/api/parking/history");
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["slot_id"], "A2");
    assert_eq!(history[1]["slot_id"], "B1");
}

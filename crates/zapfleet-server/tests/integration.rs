//! End-to-end tests driving the server over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tokio::time::{sleep, timeout};

use zapfleet_client::mock::{MockConnector, MockHandshake};
use zapfleet_core::SessionStatus;
use zapfleet_server::{ServerConfig, ZapfleetServer};

const TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    base_url: String,
    connector: Arc<MockConnector>,
    server: ZapfleetServer,
    _roster_dir: tempfile::TempDir,
}

async fn boot_server(handshake: MockHandshake) -> TestServer {
    let roster_dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        port: 0, // auto-assign
        roster_dir: roster_dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let connector = Arc::new(MockConnector::new(handshake));
    let server = ZapfleetServer::new(config, connector.clone());
    let (addr, _handle) = server.listen().await.unwrap();

    TestServer {
        base_url: format!("http://{addr}"),
        connector,
        server,
        _roster_dir: roster_dir,
    }
}

/// Poll until `check` passes or the suite timeout trips.
async fn wait_for<F: Fn() -> bool>(check: F) {
    timeout(TIMEOUT, async {
        while !check() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

#[tokio::test]
async fn qr_is_streamed_then_later_requests_get_json() {
    let ts = boot_server(MockHandshake::QrThenConnect(vec![data_url(b"qr-image-bytes")])).await;
    let client = reqwest::Client::new();

    // First request starts the handshake and receives the QR image.
    let response = client
        .get(format!("{}/qrcode/s1", ts.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    let bytes = response.bytes().await.unwrap();
    assert_eq!(&bytes[..], b"qr-image-bytes");

    // Not connected until the code is scanned.
    let body: Value = client
        .get(format!("{}/connected/s1", ts.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connected"], false);

    // Scan.
    ts.connector.release();
    let session = ts.server.registry().get("s1").unwrap();
    wait_for(|| session.status() == SessionStatus::Connected).await;

    // A repeat request acknowledges instead of starting a second handshake.
    let body: Value = client
        .get(format!("{}/qrcode/s1", ts.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connected"], true);
    assert_eq!(ts.connector.connect_count(), 1);
}

#[tokio::test]
async fn malformed_qr_payload_is_a_server_error() {
    let ts = boot_server(MockHandshake::QrThenConnect(vec![
        "this is not a data url".to_owned(),
    ])).await;

    let response = reqwest::get(format!("{}/qrcode/bad", ts.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("malformed QR payload"));

    let session = ts.server.registry().get("bad").unwrap();
    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(session.client().is_none());
}

#[tokio::test]
async fn construction_failure_is_a_server_error_and_frees_the_name() {
    let ts = boot_server(MockHandshake::Fail("backend offline".into())).await;

    let response = reqwest::get(format!("{}/qrcode/s1", ts.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    // The session was torn down, so connectivity reads false and a retry
    // would start a fresh handshake.
    let body: Value = reqwest::get(format!("{}/connected/s1", ts.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connected"], false);
    assert!(ts.server.registry().get("s1").is_none());
}

#[tokio::test]
async fn upload_then_bulk_message_round_trip() {
    let ts = boot_server(MockHandshake::Restored).await;
    let client = reqwest::Client::new();

    // Create the session; a cached restore connects without a QR.
    let body: Value = client
        .get(format!("{}/qrcode/s1", ts.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connected"], true);

    // Upload a two-row roster.
    let csv = "Nome,Telefone 1\nAna,11999990000\nBeto,11888880000\n";
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(csv.as_bytes().to_vec()).file_name("contacts.csv"),
    );
    let response = client
        .post(format!("{}/upload/s1", ts.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], true);

    // Dispatch. The response acknowledges as soon as the batch is issued.
    let response = client
        .post(format!("{}/message/s1", ts.base_url))
        .json(&serde_json::json!({ "message": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], true);
    assert_eq!(body["contacts"], 2);

    // Both sends land, in roster order, fully qualified.
    let mock = ts.connector.client();
    wait_for(|| mock.sent().len() == 2).await;
    let sent = mock.sent();
    assert_eq!(sent[0].to, "5511999990000@c.us");
    assert_eq!(sent[1].to, "5511888880000@c.us");
    assert_eq!(sent[0].body, "hi");

    // The consumed roster file is dropped after the batch.
    let rosters = ts.server.rosters().clone();
    timeout(TIMEOUT, async {
        while rosters.find("s1").await.is_some() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("roster file not removed");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let ts = boot_server(MockHandshake::Restored).await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let response = client
        .post(format!("{}/upload/s1", ts.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn message_without_roster_is_a_server_error() {
    let ts = boot_server(MockHandshake::Restored).await;
    let client = reqwest::Client::new();

    // Connect the session but upload nothing.
    let _ = client
        .get(format!("{}/qrcode/s1", ts.base_url))
        .send()
        .await
        .unwrap();
    let session = ts.server.registry().get("s1").unwrap();
    wait_for(|| session.status() == SessionStatus::Connected).await;

    let response = client
        .post(format!("{}/message/s1", ts.base_url))
        .json(&serde_json::json!({ "message": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("no roster uploaded"));
}

#[tokio::test]
async fn image_dispatch_carries_the_caption() {
    let ts = boot_server(MockHandshake::Restored).await;
    let client = reqwest::Client::new();

    let _ = client
        .get(format!("{}/qrcode/s1", ts.base_url))
        .send()
        .await
        .unwrap();
    let session = ts.server.registry().get("s1").unwrap();
    wait_for(|| session.status() == SessionStatus::Connected).await;

    let csv = "Telefone 1\n11999990000\n";
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(csv.as_bytes().to_vec()).file_name("contacts.csv"),
    );
    let _ = client
        .post(format!("{}/upload/s1", ts.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/message/s1", ts.base_url))
        .json(&serde_json::json!({ "message": "fresh stock", "image": "/tmp/promo.png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let mock = ts.connector.client();
    wait_for(|| mock.sent().len() == 1).await;
    let sent = mock.sent();
    assert_eq!(sent[0].kind, "image");
    assert_eq!(sent[0].body, "/tmp/promo.png");
    assert_eq!(sent[0].caption.as_deref(), Some("fresh stock"));
}

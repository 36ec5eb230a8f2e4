//! WebSocket client tests
//!
//! Runs [`FnosClient`] against a local WebSocket server speaking the fnOS
//! request/response framing.

use fnos_monitor::error::FnosError;
use fnos_monitor::fnos::{FnosApi, FnosClient};
use futures_util::{SinkExt, StreamExt};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

struct FakeDevice {
    host: String,
    logins: Arc<AtomicUsize>,
}

impl FakeDevice {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = listener.local_addr().unwrap().to_string();
        let logins = Arc::new(AtomicUsize::new(0));
        tokio::spawn(serve(listener, logins.clone()));
        Self { host, logins }
    }

    fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

async fn serve(listener: TcpListener, logins: Arc<AtomicUsize>) {
    while let Ok((tcp, _)) = listener.accept().await {
        let logins = logins.clone();
        tokio::spawn(async move {
            let Ok(mut ws) = accept_async(tcp).await else {
                return;
            };
            while let Some(Ok(msg)) = ws.next().await {
                let Message::Text(text) = msg else {
                    continue;
                };
                let frame: Value = serde_json::from_str(&text).unwrap();
                let reqid = frame["reqid"].clone();
                let reply = match frame["req"].as_str().unwrap_or_default() {
                    "user.login" => {
                        logins.fetch_add(1, Ordering::SeqCst);
                        if frame["password"] == "secret" && frame["stay"] == true {
                            json!({"reqid": reqid, "result": "succ"})
                        } else {
                            json!({"reqid": reqid, "result": "fail", "errno": 4})
                        }
                    }
                    "appcgi.sysinfo.getHostName" => {
                        // Unrelated push frame ahead of the real response
                        let push = json!({"reqid": "push-1", "result": "succ", "data": {}});
                        ws.send(Message::text(push.to_string())).await.unwrap();
                        json!({
                            "reqid": reqid,
                            "result": "succ",
                            "data": {"hostName": "nas", "trimVersion": "0.9.2"}
                        })
                    }
                    "appcgi.sysinfo.getMachineId" => {
                        // Notifications that do not look like responses at all
                        for push in [r#"{"reqid":7,"notify":"x"}"#, "[1,2]", "not json"] {
                            ws.send(Message::text(push)).await.unwrap();
                        }
                        json!({"reqid": reqid, "result": "succ", "data": {"machineId": "m-0001"}})
                    }
                    "appcgi.sysinfo.getUptime" => {
                        let _ = ws.close(None).await;
                        return;
                    }
                    "stor.general" => json!({"reqid": reqid, "result": "fail", "errno": 131}),
                    "stor.listDisk" => json!({
                        "reqid": reqid,
                        "result": "succ",
                        "disk": [{"name": "sda", "serialNumber": "SN1"}]
                    }),
                    "stor.diskSmart" => json!({
                        "reqid": reqid,
                        "result": "succ",
                        "smart": {"smart_status": {"passed": frame["disk"] == "sda"}}
                    }),
                    _ => json!({"reqid": reqid, "result": "succ"}),
                };
                if ws.send(Message::text(reply.to_string())).await.is_err() {
                    return;
                }
            }
        });
    }
}

fn password(value: &str) -> SecretString {
    SecretString::new(value.to_string().into())
}

async fn logged_in(device: &FakeDevice) -> FnosClient {
    let client = FnosClient::new(false, true);
    client.connect(&device.host).await.expect("connect failed");
    let login = client.login("admin", &password("secret")).await.unwrap();
    assert!(login.success);
    client
}

#[tokio::test]
async fn test_login_and_read_skip_unrelated_frames() {
    let device = FakeDevice::start().await;
    let client = logged_in(&device).await;

    let host_name = client.host_name().await.unwrap();

    assert_eq!(host_name.host_name, "nas");
    assert_eq!(host_name.trim_version.as_deref(), Some("0.9.2"));
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_malformed_notifications_are_skipped() {
    // Given: A device that sends a numeric reqid, an array and plain text first
    let device = FakeDevice::start().await;
    let client = logged_in(&device).await;

    // When: Reading the machine id
    let machine_id = client.machine_id().await.unwrap();

    // Then: The reply is still matched and the session stays usable
    assert_eq!(machine_id.machine_id, "m-0001");
    assert_eq!(client.host_name().await.unwrap().host_name, "nas");
}

#[tokio::test]
async fn test_wrong_password_reports_unsuccessful_login() {
    let device = FakeDevice::start().await;
    let client = FnosClient::new(false, true);
    client.connect(&device.host).await.unwrap();

    let login = client.login("admin", &password("wrong")).await.unwrap();

    assert!(!login.success);
}

#[tokio::test]
async fn test_failed_result_is_api_error() {
    let device = FakeDevice::start().await;
    let client = logged_in(&device).await;

    let err = client.store_general().await.unwrap_err();

    assert!(matches!(err, FnosError::Api(ref m) if m.contains("stor.general") && m.contains("131")));
}

#[tokio::test]
async fn test_body_level_and_parameterised_reads() {
    let device = FakeDevice::start().await;
    let client = logged_in(&device).await;

    let disks = client.list_disks().await.unwrap();
    let smart = client.disk_smart("sda").await.unwrap();
    let other = client.disk_smart("sdb").await.unwrap();

    assert_eq!(disks.disk[0].serial_number.as_deref(), Some("SN1"));
    assert!(smart.smart_status.unwrap().passed);
    assert!(!other.smart_status.unwrap().passed);
}

#[tokio::test]
async fn test_dropped_connection_is_not_connected_until_reconnect() {
    // Given: A logged-in client
    let device = FakeDevice::start().await;
    let client = logged_in(&device).await;

    // When: The device drops the connection mid-request
    let err = client.uptime().await.unwrap_err();

    // Then: That call and the next both report NotConnected
    assert!(err.is_not_connected());
    assert!(client.host_name().await.unwrap_err().is_not_connected());

    // When: Reconnecting
    client.reconnect().await.unwrap();

    // Then: The stored login is replayed and reads work again
    assert_eq!(device.logins(), 2);
    assert_eq!(client.host_name().await.unwrap().host_name, "nas");
}

#[tokio::test]
async fn test_calls_before_connect() {
    let client = FnosClient::new(false, true);

    assert!(client.host_name().await.unwrap_err().is_not_connected());
    assert!(matches!(client.reconnect().await, Err(FnosError::Config(_))));
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = FnosClient::new(false, true);

    assert!(matches!(
        client.connect(&host).await,
        Err(FnosError::WebSocket(_))
    ));
}

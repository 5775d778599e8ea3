//! Real listener tests for the standalone server.

use std::time::Duration;

use democracy_check::config::ServiceConfig;
use democracy_check::data::{FileSource, ReferenceStore};
use democracy_check::http::HttpServer;
use democracy_check::lifecycle::Shutdown;
use std::sync::Arc;

mod common;

use common::{data_dir, COUNTRIES, DEMOCRACIES};

#[tokio::test]
async fn test_serves_until_shutdown() {
    let dir = data_dir(Some(COUNTRIES), Some(DEMOCRACIES));
    let store = Arc::new(ReferenceStore::new(Arc::new(FileSource::new(dir.path()))));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(ServiceConfig::default(), store.clone());
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{}/doiliveinademocracy?mode=plain", addr))
        .header("X-Country-Code", "NO")
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "Yes");

    let res = client
        .get(format!("http://{}/doiliveinademocracy/_debug", addr))
        .header("X-Test", "1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let json: serde_json::Value = res.json().await.unwrap();
    assert_eq!(json["headers"]["X-Test"], serde_json::json!(["1"]));
    assert!(json["headers"].get("Host").is_none());
    assert!(json["headers"].get("X-Request-Id").is_none());

    let res = client
        .get(format!("http://{}/unknownsegment", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "Not found");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Server did not stop")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(store.load_count(), 1);
}

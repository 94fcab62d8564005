//! Front end tests: the router is driven in-process, the ingest server runs on
//! a loopback port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tower::ServiceExt;

use postbox_api::{AppStateInner, router};
use postbox_db::{Database, SqliteSink};
use postbox_gateway::ingest::IngestServer;
use postbox_gateway::relay::RelayClient;
use postbox_types::models::StoredRecord;
use postbox_types::sink::{RecordSink, SinkError};

const WAIT: Duration = Duration::from_secs(5);

struct ChannelSink(mpsc::UnboundedSender<StoredRecord>);

impl RecordSink for ChannelSink {
    fn insert(&self, record: &StoredRecord) -> Result<(), SinkError> {
        let _ = self.0.send(record.clone());
        Ok(())
    }
}

fn static_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("postbox_api_test_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>index</h1>").unwrap();
    std::fs::write(dir.join("message.html"), "<form method=\"post\"></form>").unwrap();
    std::fs::write(dir.join("error.html"), "<h1>not found</h1>").unwrap();
    std::fs::write(dir.join("style.css"), "body { margin: 0 }").unwrap();
    dir
}

async fn start_ingest(sink: Arc<dyn RecordSink>) -> SocketAddr {
    let server = IngestServer::bind("127.0.0.1:0".parse().unwrap(), sink)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn post_form(body: &'static str) -> Request<Body> {
    Request::post("/message.html")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn form_post_is_relayed_and_redirected() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let addr = start_ingest(Arc::new(ChannelSink(tx))).await;
    let app = router(AppStateInner::new(RelayClient::new(addr.to_string()), static_dir("relay")));

    let res = app.oneshot(post_form("username=alice&message=hello")).await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "/message.html");

    let record = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(record.username, "alice");
    assert_eq!(record.message, "hello");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err(), "exactly one record expected");
}

#[tokio::test]
async fn url_encoded_values_are_decoded_before_relay() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let addr = start_ingest(Arc::new(ChannelSink(tx))).await;
    let app = router(AppStateInner::new(RelayClient::new(addr.to_string()), static_dir("decode")));

    let res = app
        .oneshot(post_form("message=good+morning%21&username=ol%C3%A9na&username=other"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);

    let record = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(record.username, "oléna");
    assert_eq!(record.message, "good morning!");
}

#[tokio::test]
async fn unreachable_ingest_server_returns_500() {
    let app = router(AppStateInner::new(
        RelayClient::new(unused_addr().to_string()),
        static_dir("unreachable"),
    ));

    let res = app.oneshot(post_form("username=alice&message=hello")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn oversized_message_returns_500() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let addr = start_ingest(Arc::new(ChannelSink(tx))).await;
    let app = router(AppStateInner::new(RelayClient::new(addr.to_string()), static_dir("oversized")));

    let body: &'static str = format!("username=alice&message={}", "a".repeat(1500)).leak();
    let res = app.oneshot(post_form(body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().get(header::LOCATION).is_none());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn static_pages_are_served() {
    let app = router(AppStateInner::new(
        RelayClient::new(unused_addr().to_string()),
        static_dir("static"),
    ));

    let res = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res.into_body()).await, "<h1>index</h1>");

    let res = app.clone().oneshot(get("/message.html")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(get("/style.css")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/css");

    let res = app.oneshot(get("/missing.png")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(res.into_body()).await, "<h1>not found</h1>");
}

#[tokio::test]
async fn submission_reaches_sqlite_store() -> anyhow::Result<()> {
    let dir = static_dir("sqlite");
    let db_path = dir.join("records.db");
    let db = Database::open(&db_path)?;
    let addr = start_ingest(Arc::new(SqliteSink::new(&db_path))).await;
    let app = router(AppStateInner::new(RelayClient::new(addr.to_string()), &dir));

    let res = app.oneshot(post_form("username=alice&message=hello")).await?;
    assert_eq!(res.status(), StatusCode::FOUND);

    let stored = timeout(WAIT, async {
        loop {
            let rows = db.recent_records(10)?;
            if !rows.is_empty() {
                return anyhow::Ok(rows);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await??;

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].username, "alice");
    assert_eq!(stored[0].message, "hello");
    Ok(())
}

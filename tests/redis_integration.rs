//! Redis integration tests.
//!
//! These tests run the Redis client and a Redis-backed store against an
//! in-process server that speaks enough RESP for the store, and that can be
//! told to answer chosen keys slowly or with a broken reply.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use shared_state_store::config::Config;
use shared_state_store::{InitialState, KvClient, RedisClient, SharedStateStore, StateStoreError};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::{TcpListener, TcpStream};

/// How the server answers `GET` for a particular key.
#[derive(Clone)]
enum Quirk {
    /// Answer normally, after a pause.
    Delay(Duration),
    /// Send these bytes instead of a reply, then hang up.
    RawThenClose(&'static [u8]),
}

#[derive(Default)]
struct ServerState {
    values: HashMap<String, String>,
    quirks: HashMap<String, Quirk>,
    commands: Vec<String>,
    password: Option<String>,
}

/// Minimal Redis stand-in handling GET, SET, AUTH, SELECT and CLIENT.
struct MockRedisServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl MockRedisServer {
    async fn start() -> Self {
        Self::start_with(ServerState::default()).await
    }

    async fn start_with(state: ServerState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(state));

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&shared)));
            }
        });

        Self { addr, state }
    }

    fn url(&self) -> String {
        format!("redis://{}", self.addr)
    }

    fn put(&self, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        state.values.insert(key.to_string(), value.to_string());
    }

    fn quirk(&self, key: &str, quirk: Quirk) {
        let mut state = self.state.lock().unwrap();
        state.quirks.insert(key.to_string(), quirk);
    }

    /// Data commands received so far, in order.
    fn data_commands(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .commands
            .iter()
            .filter(|c| *c == "GET" || *c == "SET")
            .cloned()
            .collect()
    }

    fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }
}

async fn serve(stream: TcpStream, state: Arc<Mutex<ServerState>>) {
    let mut conn = BufStream::new(stream);
    while let Some(args) = read_command(&mut conn).await {
        let name = args[0].to_uppercase();

        let (reply, quirk) = {
            let mut state = state.lock().unwrap();
            state.commands.push(name.clone());
            match name.as_str() {
                "GET" => {
                    let reply = match state.values.get(&args[1]) {
                        Some(v) => format!("${}\r\n{}\r\n", v.len(), v),
                        None => "$-1\r\n".to_string(),
                    };
                    (reply, state.quirks.get(&args[1]).cloned())
                }
                "SET" => {
                    state.values.insert(args[1].clone(), args[2].clone());
                    ("+OK\r\n".to_string(), None)
                }
                "AUTH" => match state.password {
                    Some(ref p) if args.last() == Some(p) => ("+OK\r\n".to_string(), None),
                    _ => ("-WRONGPASS invalid password\r\n".to_string(), None),
                },
                "SELECT" | "CLIENT" => ("+OK\r\n".to_string(), None),
                "PING" => ("+PONG\r\n".to_string(), None),
                _ => ("-ERR unknown command\r\n".to_string(), None),
            }
        };

        let reply = match quirk {
            Some(Quirk::Delay(pause)) => {
                tokio::time::sleep(pause).await;
                reply.into_bytes()
            }
            Some(Quirk::RawThenClose(bytes)) => {
                let _ = conn.write_all(bytes).await;
                let _ = conn.flush().await;
                return;
            }
            None => reply.into_bytes(),
        };

        if conn.write_all(&reply).await.is_err() || conn.flush().await.is_err() {
            return;
        }
    }
}

async fn read_command(conn: &mut BufStream<TcpStream>) -> Option<Vec<String>> {
    let mut line = String::new();
    if conn.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        conn.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut data = vec![0u8; len + 2];
        conn.read_exact(&mut data).await.ok()?;
        data.truncate(len);
        args.push(String::from_utf8(data).ok()?);
    }
    Some(args)
}

fn channel_template() -> InitialState {
    InitialState::new().with_field("current", 0)
}

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
async fn test_get_set_roundtrip() {
    let server = MockRedisServer::start().await;
    let client = RedisClient::from_url(&server.url()).unwrap();

    assert_eq!(client.get("chan:9").await.unwrap(), None);
    client.set("chan:9", r#"{"current":0}"#).await.unwrap();
    assert_eq!(
        client.get("chan:9").await.unwrap().as_deref(),
        Some(r#"{"current":0}"#)
    );
    assert_eq!(server.data_commands(), vec!["GET", "SET", "GET"]);
}

#[tokio::test]
async fn test_empty_value_is_not_missing() {
    let server = MockRedisServer::start().await;
    let client = RedisClient::from_url(&server.url()).unwrap();

    client.set("k", "").await.unwrap();
    assert_eq!(client.get("k").await.unwrap(), Some(String::new()));
}

#[tokio::test]
async fn test_auth_and_select_on_connect() {
    let server = MockRedisServer::start_with(ServerState {
        password: Some("secret".into()),
        ..ServerState::default()
    })
    .await;
    let client = RedisClient::from_url(&format!("redis://:secret@{}/3", server.addr)).unwrap();

    client.set("k", "v").await.unwrap();

    let commands = server.commands();
    let at = |name: &str| commands.iter().position(|c| c == name).unwrap();
    assert!(at("AUTH") < at("SELECT"));
    assert!(at("SELECT") < at("SET"));
}

#[tokio::test]
async fn test_wrong_password_is_backend_error() {
    let server = MockRedisServer::start_with(ServerState {
        password: Some("secret".into()),
        ..ServerState::default()
    })
    .await;
    let client = RedisClient::from_url(&format!("redis://:nope@{}", server.addr)).unwrap();

    let err = client.get("k").await.unwrap_err();
    assert!(matches!(err, StateStoreError::Backend(_)), "got: {err}");
}

#[tokio::test]
async fn test_cancelled_call_does_not_leak_its_reply() {
    let server = MockRedisServer::start().await;
    server.put("chan:slow", r#"{"owner":"chan:slow"}"#);
    server.put("chan:fast", r#"{"owner":"chan:fast"}"#);
    server.quirk("chan:slow", Quirk::Delay(Duration::from_millis(200)));
    let client = RedisClient::from_url(&server.url()).unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), client.get("chan:slow")).await;
    assert!(timed_out.is_err());

    assert_eq!(
        client.get("chan:fast").await.unwrap().as_deref(),
        Some(r#"{"owner":"chan:fast"}"#)
    );
    assert_eq!(
        client.get("chan:slow").await.unwrap().as_deref(),
        Some(r#"{"owner":"chan:slow"}"#)
    );
}

#[tokio::test]
async fn test_absurd_bulk_length_is_an_error() {
    let server = MockRedisServer::start().await;
    server.quirk("chan:huge", Quirk::RawThenClose(b"$9223372036854775800\r\nxx\r\n"));
    let client = RedisClient::from_url(&server.url()).unwrap();

    let reply = tokio::time::timeout(Duration::from_secs(5), client.get("chan:huge"))
        .await
        .expect("a broken reply must not hang the client");
    assert!(reply.is_err());
}

// ============================================================================
// Redis-backed Store
// ============================================================================

#[tokio::test]
async fn test_redis_backed_store() {
    let server = MockRedisServer::start().await;
    let mut config = Config::default();
    config.backend.redis_url = Some(server.url());

    let a = SharedStateStore::from_config("chan", &config, channel_template()).unwrap();
    let b = SharedStateStore::shared(
        "chan",
        channel_template(),
        Arc::new(RedisClient::from_url(&server.url()).unwrap()),
    );
    assert!(a.is_shared() && b.is_shared());

    assert_eq!(a.get("1").await.unwrap()["current"], json!(0));
    b.set("1", "current", 12).await.unwrap();
    assert_eq!(a.get("1").await.unwrap()["current"], json!(12));
}

#[tokio::test]
async fn test_store_after_timeout_reads_its_own_id() {
    let server = MockRedisServer::start().await;
    server.put("chan:slow", r#"{"current":1}"#);
    server.put("chan:fast", r#"{"current":2}"#);
    server.quirk("chan:slow", Quirk::Delay(Duration::from_millis(200)));
    let mut config = Config::default();
    config.backend.redis_url = Some(server.url());
    let store = SharedStateStore::from_config("chan", &config, channel_template()).unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), store.get("slow")).await;
    assert!(timed_out.is_err());

    let record = store.set("fast", "name", "news").await.unwrap();
    assert_eq!(record["current"], json!(2));
    assert_eq!(record["name"], json!("news"));
}

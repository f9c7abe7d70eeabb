//! GraphQL over WebSocket, driven through the `graphql-transport-ws` protocol
//!
//! The socket is replaced by an in-memory channel; everything from
//! `connection_init` onwards runs through the same code as `/graphql/ws`.

use std::sync::Arc;
use std::time::Duration;

use async_graphql::http::{WebSocketProtocols as Protocols, WebSocket, WsMessage};
use futures::channel::mpsc;
use futures::StreamExt;
use futures::stream::BoxStream;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use bookshelf::AppState;
use bookshelf::api::graphql::connection_init_data;
use bookshelf::config::{Config, DEFAULT_LOGIN_PASSWORD};
use bookshelf::db::Database;

async fn test_state() -> AppState {
    let config = Config {
        host: None,
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt_secret: "ws-test-secret".to_string(),
        login_password: DEFAULT_LOGIN_PASSWORD.to_string(),
        token_lifetime_secs: 3600,
    };
    let db = Database::in_memory().await.unwrap();
    AppState::new(Arc::new(config), db)
}

async fn login_token(state: &AppState, username: &str) -> String {
    state.auth.create_user(username, vec![]).await.unwrap();
    state.auth.login(username, DEFAULT_LOGIN_PASSWORD).await.unwrap()
}

struct Connection {
    client: mpsc::UnboundedSender<String>,
    server: BoxStream<'static, WsMessage>,
    next_id: u32,
}

impl Connection {
    /// Open a connection and complete the `connection_init` handshake
    async fn open(state: &AppState, init_payload: Value) -> Self {
        let (client, incoming) = mpsc::unbounded::<String>();
        let auth = state.auth.clone();
        let server = WebSocket::new(state.schema.clone(), incoming, Protocols::GraphQLWS)
            .on_connection_init(move |params| connection_init_data(auth, params))
            .boxed();

        let mut conn = Self {
            client,
            server,
            next_id: 0,
        };
        conn.send(json!({ "type": "connection_init", "payload": init_payload }));
        assert_eq!(conn.recv().await["type"], "connection_ack");
        conn
    }

    fn send(&self, message: Value) {
        self.client.unbounded_send(message.to_string()).unwrap();
    }

    async fn recv(&mut self) -> Value {
        let message = tokio::time::timeout(Duration::from_secs(5), self.server.next())
            .await
            .expect("no message from server")
            .expect("server closed the connection");
        serde_json::from_str(&message.unwrap_text()).unwrap()
    }

    /// Start an operation and return its id
    fn subscribe(&mut self, query: &str) -> String {
        self.next_id += 1;
        let id = self.next_id.to_string();
        self.send(json!({ "type": "subscribe", "id": id, "payload": { "query": query } }));
        id
    }

    /// Run a one-shot operation and return its `payload`
    async fn execute(&mut self, query: &str) -> Value {
        let id = self.subscribe(query);

        let next = self.recv().await;
        assert_eq!(next["type"], "next");
        assert_eq!(next["id"], id.as_str());
        let complete = self.recv().await;
        assert_eq!(complete, json!({ "type": "complete", "id": id }));

        next["payload"].clone()
    }
}

#[tokio::test]
async fn test_connection_init_token_resolves_current_user() {
    let state = test_state().await;
    let token = login_token(&state, "mluukkai").await;

    let mut conn =
        Connection::open(&state, json!({ "Authorization": format!("Bearer {}", token) })).await;

    let payload = conn.execute("{ me { username } }").await;
    assert_eq!(payload, json!({ "data": { "me": { "username": "mluukkai" } } }));
}

#[tokio::test]
async fn test_connection_init_accepts_lowercase_key_and_bare_token() {
    let state = test_state().await;
    let token = login_token(&state, "hellas").await;

    let mut conn = Connection::open(&state, json!({ "authorization": token })).await;

    let payload = conn.execute("{ me { username } }").await;
    assert_eq!(payload, json!({ "data": { "me": { "username": "hellas" } } }));
}

#[tokio::test]
async fn test_bad_or_missing_init_token_stays_anonymous() {
    let state = test_state().await;

    let mut forged = Connection::open(&state, json!({ "Authorization": "Bearer not-a-jwt" })).await;
    assert_eq!(forged.execute("{ me { username } }").await, json!({ "data": { "me": null } }));

    let mut empty = Connection::open(&state, json!({})).await;
    let payload = empty
        .execute(r#"mutation { addBook(title: "Clean Code", author: "Robert Martin", published: 2008) { title } }"#)
        .await;
    assert_eq!(payload["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");
    assert_eq!(state.db.books().get_by_title("Clean Code").await.unwrap().map(|b| b.title), None);
}

#[tokio::test]
async fn test_authenticated_connection_adds_books_and_streams_them() {
    let state = test_state().await;
    let token = login_token(&state, "mluukkai").await;

    let mut listener = Connection::open(&state, json!({})).await;
    let subscription = listener.subscribe("subscription { bookAdded { title author { name } } }");
    let mut writer =
        Connection::open(&state, json!({ "Authorization": format!("Bearer {}", token) })).await;

    // The listener only processes its subscribe message while being polled
    let (event, payload) = tokio::join!(listener.recv(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        writer
            .execute(r#"mutation { addBook(title: "Clean Code", author: "Robert Martin", published: 2008, genres: ["refactoring"]) { title } }"#)
            .await
    });

    assert_eq!(payload, json!({ "data": { "addBook": { "title": "Clean Code" } } }));
    assert_eq!(event["type"], "next");
    assert_eq!(event["id"], subscription.as_str());
    assert_eq!(
        event["payload"],
        json!({ "data": { "bookAdded": { "title": "Clean Code", "author": { "name": "Robert Martin" } } } })
    );
}

//! GraphQL HTTP and WebSocket endpoints
//!
//! Both resolve the caller from the bearer token before executing, so
//! resolvers only ever see an already-loaded [CurrentUser].

use async_graphql::Data;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;

use crate::AppState;
use crate::graphql::CurrentUser;
use crate::services::AuthService;
use crate::services::auth::extract_bearer;

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok())
}

/// GraphQL query/mutation handler with auth context
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(user) = state.auth.current_user(authorization(&headers)).await {
        request = request.data(CurrentUser(user));
    }

    state.schema.execute(request).await.into()
}

/// GraphiQL interactive playground (only for browsers)
async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        axum::response::Html(
            GraphiQLSource::build()
                .endpoint("/graphql")
                .subscription_endpoint("/graphql/ws")
                .finish(),
        )
        .into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

/// GraphQL WebSocket handler for subscriptions with auth
async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let current_user = state.auth.current_user(authorization(&headers)).await;
    let auth = state.auth.clone();

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            let mut ws = GraphQLWebSocket::new(socket, state.schema.clone(), protocol);

            if let Some(user) = current_user {
                let mut data = Data::default();
                data.insert(CurrentUser(user));
                ws = ws.with_data(data);
            }

            ws.on_connection_init(move |params| connection_init_data(auth, params))
                .serve()
        })
}

/// Context data for a WebSocket connection from its `connection_init` payload.
///
/// Browsers cannot set headers on WebSocket upgrades, so the token may arrive
/// here instead, with or without the `Bearer ` prefix. A bad token leaves the
/// connection anonymous rather than refusing it.
pub async fn connection_init_data(
    auth: AuthService,
    params: serde_json::Value,
) -> async_graphql::Result<Data> {
    let mut data = Data::default();
    if let Some(value) = params
        .get("Authorization")
        .or_else(|| params.get("authorization"))
        .and_then(|v| v.as_str())
    {
        let token = extract_bearer(value).unwrap_or(value);
        if let Some(user) = auth.user_for_token(token).await {
            data.insert(CurrentUser(user));
        }
    }
    Ok(data)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/graphql/ws", get(graphql_ws_handler))
}

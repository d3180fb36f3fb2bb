//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! HTTP protocol listener
//!
//! REST surface over the same backends the RPC listener fronts. Requests
//! pass through the fixed middleware chain (recovery, logging, rate limit,
//! timeout) with auth applied only to the protected user routes.

use crate::backend::{AuthBackend, UserBackend};
use crate::context::RequestContext;
use crate::error::{ConnectionError, GatewayError, INTERNAL_MESSAGE, UNAUTHENTICATED_MESSAGE};
use crate::listener::StopHandle;
use crate::middleware;
use crate::token::TokenValidator;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use fluxor_common::proto::{
    CreateUserRequest, DeleteUserRequest, GetUserRequest, ListUsersRequest, LoginRequest,
    RegisterRequest, UpdateUserRequest, User,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Shared state behind the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<TokenValidator>,
    pub users: Arc<UserBackend>,
    pub auth: Arc<AuthBackend>,
}

/// HTTP listener for the REST surface.
pub struct HttpServer {
    addr: SocketAddr,
    write_timeout: Duration,
    state: AppState,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, write_timeout: Duration, state: AppState) -> Self {
        Self {
            addr,
            write_timeout,
            state,
        }
    }

    /// Build the full router, middleware chain included.
    ///
    /// Layer order matters: the last layer added runs first, so recovery
    /// wraps logging, which wraps rate limiting, which wraps the request
    /// timeout and the handlers. Auth sits inside all of those, on the
    /// protected routes only.
    pub fn router(&self) -> Router {
        let protected = Router::new()
            .route("/api/v1/users", post(create_user).get(list_users))
            .route(
                "/api/v1/users/{id}",
                get(get_user).put(update_user).delete(delete_user),
            )
            .route_layer(axum::middleware::from_fn_with_state(
                self.state.validator.clone(),
                middleware::http::authenticate,
            ));

        Router::new()
            .route("/health", get(health))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .merge(protected)
            .layer(axum::middleware::from_fn(middleware::http::inject_context))
            .layer(axum::middleware::from_fn_with_state(
                self.write_timeout,
                middleware::http::enforce_timeout,
            ))
            .layer(axum::middleware::from_fn(middleware::http::rate_limit))
            .layer(axum::middleware::from_fn(middleware::http::log_requests))
            .layer(axum::middleware::from_fn(middleware::http::recover))
            .with_state(self.state.clone())
    }

    /// Bind and serve. A bind failure is fatal; once serving, the returned
    /// handle stops the listener and drains in-flight requests. The bound
    /// address is returned so callers binding port 0 can reach the listener.
    pub async fn start(self) -> Result<(SocketAddr, StopHandle), GatewayError> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|error| {
                GatewayError::Listener(format!("failed to bind HTTP {}: {}", self.addr, error))
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|error| GatewayError::Listener(error.to_string()))?;
        tracing::info!("HTTP listener on {}", local_addr);

        let router = self.router();
        let (handle, mut shutdown_rx, guard) = StopHandle::new("http");

        tokio::spawn(async move {
            let serve = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            });

            if let Err(error) = serve.await {
                tracing::error!("HTTP listener failed: {}", error);
            }
            guard.finish();
        });

        Ok((local_addr, handle))
    }
}

/// JSON shape of a user on the REST surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBody {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        }
    }
}

impl From<UserBody> for User {
    fn from(body: UserBody) -> Self {
        Self {
            id: body.id,
            username: body.username,
            email: body.email,
            full_name: body.full_name,
            role: body.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub page_size: i32,
    #[serde(default)]
    pub page_token: String,
}

/// Map a gateway error onto a REST status.
///
/// Validation problems are reported with their field message; everything
/// else collapses to a generic payload so backend detail never leaks.
fn error_response(error: GatewayError) -> Response {
    match error {
        GatewayError::Validation { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
        GatewayError::Connection(ConnectionError::CallFailed { method, status }) => {
            // Backend detail goes to the log sink only; callers get a fixed
            // message per status class.
            let (code, message) = match status.code() {
                tonic::Code::NotFound => (StatusCode::NOT_FOUND, "not found"),
                tonic::Code::InvalidArgument => (StatusCode::BAD_REQUEST, "invalid request"),
                tonic::Code::AlreadyExists => (StatusCode::CONFLICT, "already exists"),
                tonic::Code::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, UNAUTHENTICATED_MESSAGE)
                }
                tonic::Code::PermissionDenied => (StatusCode::FORBIDDEN, "forbidden"),
                tonic::Code::DeadlineExceeded | tonic::Code::Unavailable => {
                    (StatusCode::BAD_GATEWAY, "backend unavailable")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE),
            };
            tracing::error!("backend call {} failed: {}", method, status);
            (code, Json(json!({ "error": message }))).into_response()
        }
        GatewayError::Connection(ConnectionError::DeadlineExceeded { method }) => {
            tracing::error!("backend call {} exceeded its deadline", method);
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({ "error": "request timed out" })),
            )
                .into_response()
        }
        other => {
            tracing::error!("request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": INTERNAL_MESSAGE })),
            )
                .into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<LoginBody>,
) -> Result<Response, Response> {
    let request = LoginRequest {
        username: body.username,
        password: body.password,
    };
    crate::validate::validate_login(&request).map_err(error_response)?;

    let response = state
        .auth
        .login(&ctx, request)
        .await
        .map_err(|error| error_response(error.into()))?;

    Ok(Json(json!({
        "token": response.token,
        "user": response.user.map(UserBody::from),
    }))
    .into_response())
}

async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<RegisterBody>,
) -> Result<Response, Response> {
    let request = RegisterRequest {
        username: body.username,
        email: body.email,
        password: body.password,
    };
    crate::validate::validate_register(&request).map_err(error_response)?;

    let response = state
        .auth
        .register(&ctx, request)
        .await
        .map_err(|error| error_response(error.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": response.user.map(UserBody::from) })),
    )
        .into_response())
}

async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<UserBody>,
) -> Result<Response, Response> {
    let user = User::from(body);
    crate::validate::validate_user(Some(&user)).map_err(error_response)?;

    let response = state
        .users
        .create_user(&ctx, CreateUserRequest { user: Some(user) })
        .await
        .map_err(|error| error_response(error.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": response.user.map(UserBody::from) })),
    )
        .into_response())
}

async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    crate::validate::validate_user_id(&id).map_err(error_response)?;

    let response = state
        .users
        .get_user(&ctx, GetUserRequest { user_id: id })
        .await
        .map_err(|error| error_response(error.into()))?;

    Ok(Json(json!({ "user": response.user.map(UserBody::from) })).into_response())
}

async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<UserBody>,
) -> Result<Response, Response> {
    let mut user = User::from(body);
    user.id = id;
    crate::validate::validate_user_id(&user.id).map_err(error_response)?;
    crate::validate::validate_user(Some(&user)).map_err(error_response)?;

    let response = state
        .users
        .update_user(&ctx, UpdateUserRequest { user: Some(user) })
        .await
        .map_err(|error| error_response(error.into()))?;

    Ok(Json(json!({ "user": response.user.map(UserBody::from) })).into_response())
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    crate::validate::validate_user_id(&id).map_err(error_response)?;

    let response = state
        .users
        .delete_user(&ctx, DeleteUserRequest { user_id: id })
        .await
        .map_err(|error| error_response(error.into()))?;

    Ok(Json(json!({ "deleted": response.deleted })).into_response())
}

async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response, Response> {
    crate::validate::validate_page_size(query.page_size).map_err(error_response)?;

    let response = state
        .users
        .list_users(
            &ctx,
            ListUsersRequest {
                page_size: query.page_size,
                page_token: query.page_token,
            },
        )
        .await
        .map_err(|error| error_response(error.into()))?;

    let users: Vec<UserBody> = response.users.into_iter().map(UserBody::from).collect();
    Ok(Json(json!({
        "users": users,
        "next_page_token": response.next_page_token,
    }))
    .into_response())
}

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

//! HTTP middleware stages

use super::{bearer_token, panic_message};
use crate::context::{Protocol, RequestContext};
use crate::error::{INTERNAL_MESSAGE, UNAUTHENTICATED_MESSAGE};
use crate::token::TokenValidator;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::http::header::{AUTHORIZATION, CONTENT_LENGTH, USER_AGENT};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::FutureExt;
use serde_json::json;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Outermost stage: convert any panic below into a 500 response.
///
/// The listener itself must never die because one request faulted; the
/// follow-up request has to succeed.
pub async fn recover(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(
                method = %method,
                path = %path,
                panic = %panic_message(&panic),
                "panic recovered while handling HTTP request"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": INTERNAL_MESSAGE })),
            )
                .into_response()
        }
    }
}

/// Record method, path, peer, user agent, status, latency and response size
/// for every request, success or failure, exactly once. A panicking handler
/// still gets its line (logged as 500) before the unwind continues up to
/// the recovery stage.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let start = Instant::now();

    let result = AssertUnwindSafe(next.run(request)).catch_unwind().await;

    let (status, bytes) = match &result {
        Ok(response) => (
            response.status().as_u16(),
            response
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(0),
        ),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR.as_u16(), 0),
    };

    tracing::info!(
        method = %method,
        path = %path,
        peer = ?peer,
        user_agent = %user_agent,
        status,
        latency = ?start.elapsed(),
        bytes,
        "http request"
    );

    match result {
        Ok(response) => response,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Seed every request with a typed context carrying the protocol and peer
/// address. The auth stage attaches claims on protected routes; handlers
/// read the finished context as an extension.
pub async fn inject_context(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    request
        .extensions_mut()
        .insert(RequestContext::new(Protocol::Http, peer));
    next.run(request).await
}

/// Rate-limit stage. Pass-through: no policy is configured yet, the stage
/// only reserves its slot between Logging and Auth.
pub async fn rate_limit(request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Bound each request by the configured write timeout so a stalled backend
/// cannot hold a connection open indefinitely.
pub async fn enforce_timeout(
    State(timeout): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(json!({ "error": "request timed out" })),
        )
            .into_response(),
    }
}

/// Innermost stage, applied only to protected routes: validate the bearer
/// credential and inject the caller's claims as a typed extension.
///
/// Every failure collapses to a plain 401; the reason only goes to the log.
pub async fn authenticate(
    State(validator): State<Arc<TokenValidator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let claims = bearer_token(header)
        .and_then(|token| validator.validate(token))
        .map_err(|err| {
            tracing::warn!(
                path = %request.uri().path(),
                error = %err,
                "rejected unauthenticated HTTP request"
            );
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": UNAUTHENTICATED_MESSAGE })),
            )
                .into_response()
        })?;

    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(|| RequestContext::new(Protocol::Http, None))
        .with_claims(claims.clone());
    request.extensions_mut().insert(ctx);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

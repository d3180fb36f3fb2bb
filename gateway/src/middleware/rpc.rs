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

//! RPC middleware chain
//!
//! tonic has no server-side chained unary interceptor that can wrap the
//! handler, so the chain is one composed wrapper every unary method runs
//! through. Stage order matches the HTTP side exactly.

use super::{bearer_token, panic_message};
use crate::context::{Protocol, RequestContext};
use crate::error::INTERNAL_MESSAGE;
use crate::token::TokenValidator;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tonic::{Request, Response, Status};

/// Middleware chain applied to every unary RPC.
#[derive(Clone)]
pub struct RpcChain {
    validator: Arc<TokenValidator>,
}

impl RpcChain {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }

    /// Run one unary call through Recovery > Logging > Auth > handler.
    ///
    /// The handler receives a typed [`RequestContext`] carrying the peer
    /// address, any caller deadline from `grpc-timeout` metadata, and the
    /// validated claims when `protected` is set.
    pub async fn run<Req, Res, F, Fut>(
        &self,
        method: &'static str,
        protected: bool,
        request: Request<Req>,
        handler: F,
    ) -> Result<Response<Res>, Status>
    where
        F: FnOnce(RequestContext, Req) -> Fut,
        Fut: Future<Output = Result<Response<Res>, Status>>,
    {
        let peer = request.remote_addr();
        let start = Instant::now();

        // Recovery: the serving task must survive any fault below.
        let result = AssertUnwindSafe(self.dispatch(method, protected, request, handler))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                tracing::error!(
                    method,
                    panic = %panic_message(&panic),
                    "panic recovered while handling RPC"
                );
                Err(Status::internal(INTERNAL_MESSAGE))
            });

        // Logging: exactly one entry per request, success or failure.
        let code = match &result {
            Ok(_) => tonic::Code::Ok,
            Err(status) => status.code(),
        };
        tracing::info!(
            method,
            peer = ?peer,
            code = ?code,
            latency = ?start.elapsed(),
            "rpc request"
        );

        result
    }

    /// Auth stage plus handler invocation.
    async fn dispatch<Req, Res, F, Fut>(
        &self,
        method: &'static str,
        protected: bool,
        request: Request<Req>,
        handler: F,
    ) -> Result<Response<Res>, Status>
    where
        F: FnOnce(RequestContext, Req) -> Fut,
        Fut: Future<Output = Result<Response<Res>, Status>>,
    {
        let mut ctx = RequestContext::new(Protocol::Grpc, request.remote_addr());

        if let Some(timeout) = request
            .metadata()
            .get("grpc-timeout")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_grpc_timeout)
        {
            ctx = ctx.with_deadline(Instant::now() + timeout);
        }

        if protected {
            let header = request
                .metadata()
                .get("authorization")
                .and_then(|value| value.to_str().ok());

            let claims = bearer_token(header)
                .and_then(|token| self.validator.validate(token))
                .map_err(|err| {
                    tracing::warn!(method, error = %err, "rejected unauthenticated RPC");
                    err.to_status()
                })?;

            ctx = ctx.with_claims(claims);
        }

        handler(ctx, request.into_inner()).await
    }
}

/// Parse a `grpc-timeout` metadata value (e.g. `5S`, `100m`) into a duration.
fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    let amount: u64 = digits.parse().ok()?;
    match unit {
        "H" => Some(Duration::from_secs(amount * 3600)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}

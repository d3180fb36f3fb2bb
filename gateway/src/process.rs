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

//! Gateway process lifecycle
//!
//! Startup order is fixed: backend connections first (the process refuses
//! to serve if a downstream is unreachable), then both listeners. Shutdown
//! reverses it: stop accepting, drain in-flight work bounded by the
//! shutdown timeout, then release the backend connections.

use crate::backend::{AuthBackend, UserBackend};
use crate::config::GatewayOptions;
use crate::error::GatewayError;
use crate::grpc::GrpcServer;
use crate::http::{AppState, HttpServer};
use crate::listener::shutdown_signal;
use crate::token::TokenValidator;
use std::sync::Arc;

/// The running gateway.
pub struct GatewayProcess {
    options: GatewayOptions,
}

impl GatewayProcess {
    pub fn new(options: GatewayOptions) -> Self {
        Self { options }
    }

    /// Run until SIGINT or SIGTERM, then drain and stop.
    pub async fn run(self) -> Result<(), GatewayError> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves. Split out from [`run`](Self::run) so
    /// tests can drive the lifecycle without delivering signals.
    pub async fn run_until(
        self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), GatewayError> {
        let options = self.options;
        tracing::info!("Starting gateway");

        // Backends first. A gateway with no reachable downstream has
        // nothing to serve, so construction failure aborts startup.
        let users = Arc::new(UserBackend::connect(&options.user_backend).await?);
        let auth = Arc::new(AuthBackend::connect(&options.auth_backend).await?);
        let validator = Arc::new(TokenValidator::new(&options.jwt_secret));

        // One budget for the whole request: read phase plus write phase.
        let request_timeout = options.read_timeout + options.write_timeout;

        let http = HttpServer::new(
            options.http_addr,
            request_timeout,
            AppState {
                validator: validator.clone(),
                users: users.clone(),
                auth: auth.clone(),
            },
        );
        let (_, mut http_handle) = http.start().await?;

        let grpc = GrpcServer::new(
            options.grpc_addr,
            request_timeout,
            validator,
            users.clone(),
            auth.clone(),
        );
        let mut grpc_handle = match grpc.start().await {
            Ok((_, handle)) => handle,
            Err(error) => {
                let _ = http_handle.stop(options.shutdown_timeout).await;
                Self::close_backends(&users, &auth).await;
                return Err(error);
            }
        };

        tracing::info!("Gateway running");

        // A listener exiting on its own is an outage, not a shutdown.
        let mut failure = None;
        tokio::select! {
            _ = shutdown => {}
            _ = http_handle.exited() => {
                failure = Some(GatewayError::Listener(
                    "HTTP listener exited unexpectedly".to_string(),
                ));
            }
            _ = grpc_handle.exited() => {
                failure = Some(GatewayError::Listener(
                    "gRPC listener exited unexpectedly".to_string(),
                ));
            }
        }

        // Drain both listeners even if the first misses its deadline.
        let http_result = http_handle.stop(options.shutdown_timeout).await;
        let grpc_result = grpc_handle.stop(options.shutdown_timeout).await;

        Self::close_backends(&users, &auth).await;

        if let Some(error) = failure {
            return Err(error);
        }
        http_result?;
        grpc_result?;
        tracing::info!("Gateway stopped");
        Ok(())
    }

    async fn close_backends(users: &UserBackend, auth: &AuthBackend) {
        users.close().await;
        auth.close().await;
    }
}

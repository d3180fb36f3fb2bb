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

//! Backend service clients
//!
//! One client per downstream service, each owning a single long-lived
//! outbound connection. Construction fails fast if the connection cannot
//! reach a usable state within the connect timeout, so callers never hold a
//! client that is not immediately usable. Every call derives a child
//! deadline from the per-call timeout and the caller's own deadline,
//! whichever is earlier.

pub mod auth;
pub mod user;

pub use auth::AuthBackend;
pub use user::UserBackend;

use crate::error::ConnectionError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio::time::error::Elapsed;
use tonic::transport::Channel;

/// Default connection establishment timeout when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable configuration for one backend client.
#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    /// Target address (host:port)
    pub address: String,

    /// Per-call timeout
    pub call_timeout: Duration,

    /// Connection establishment timeout (default 30s)
    pub connect_timeout: Option<Duration>,
}

impl BackendClientConfig {
    pub fn new(address: impl Into<String>, call_timeout: Duration) -> Self {
        Self {
            address: address.into(),
            call_timeout,
            connect_timeout: None,
        }
    }
}

/// Health of one outbound connection.
///
/// Transitions are observed from transport results, never forced by the
/// gateway. A client in `Shutdown` must not issue calls; `TransientFailure`
/// is allowed to attempt and may fail fast at the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection establishment in progress
    Connecting,
    /// Connected and usable
    Ready,
    /// A recent call failed at the transport level
    TransientFailure,
    /// Closed; terminal
    Shutdown,
}

/// Shared connection plumbing under each concrete backend client.
pub(crate) struct BackendChannel {
    address: String,
    channel: Channel,
    state: Arc<RwLock<ConnectionState>>,
}

impl BackendChannel {
    /// Establish the outbound connection.
    ///
    /// An empty address is rejected before dialing. The connect future only
    /// resolves once the transport is usable, which doubles as the
    /// post-construction health check; a connection that does not get there
    /// within the connect timeout is abandoned and construction fails.
    pub async fn connect(config: &BackendClientConfig) -> Result<Self, ConnectionError> {
        if config.address.trim().is_empty() {
            return Err(ConnectionError::EmptyAddress);
        }

        let address = config.address.clone();
        let connect_timeout = config.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);

        tracing::info!("Connecting to backend service at {}", address);

        let endpoint = Channel::from_shared(format!("http://{}", address))
            .map_err(|source| ConnectionError::InvalidEndpoint {
                address: address.clone(),
                message: source.to_string(),
            })?
            .connect_timeout(connect_timeout);

        let channel = match tokio::time::timeout(connect_timeout, endpoint.connect()).await {
            Ok(Ok(channel)) => channel,
            Ok(Err(source)) => {
                tracing::error!("Failed to connect to backend at {}: {}", address, source);
                return Err(ConnectionError::ConnectFailed { address, source });
            }
            Err(_) => {
                tracing::error!(
                    "Connection to backend at {} not ready within {:?}",
                    address,
                    connect_timeout
                );
                return Err(ConnectionError::ConnectTimeout {
                    address,
                    timeout: connect_timeout,
                });
            }
        };

        tracing::info!("Backend connection to {} is ready", address);
        Ok(Self {
            address,
            channel,
            state: Arc::new(RwLock::new(ConnectionState::Ready)),
        })
    }

    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Fail-fast health probe run before every call.
    ///
    /// `Shutdown` refuses immediately. `TransientFailure` is let through:
    /// the attempt will fail fast at the transport if the connection is
    /// still unhealthy, and a success flips the state back to `Ready`.
    pub async fn ensure_ready(&self) -> Result<(), ConnectionError> {
        match *self.state.read().await {
            ConnectionState::Shutdown => Err(ConnectionError::Shutdown),
            _ => Ok(()),
        }
    }

    /// Translate a timeout-bounded call result, updating the observed
    /// connection state from the outcome.
    pub async fn finish_call<Res>(
        &self,
        method: &'static str,
        result: Result<Result<tonic::Response<Res>, tonic::Status>, Elapsed>,
    ) -> Result<Res, ConnectionError> {
        match result {
            Ok(Ok(response)) => {
                self.mark(ConnectionState::Ready).await;
                Ok(response.into_inner())
            }
            Ok(Err(status)) => {
                if status.code() == tonic::Code::Unavailable {
                    self.mark(ConnectionState::TransientFailure).await;
                }
                Err(ConnectionError::CallFailed { method, status })
            }
            Err(_) => Err(ConnectionError::DeadlineExceeded { method }),
        }
    }

    /// Release the connection. Idempotent; `Shutdown` is terminal.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        if *state != ConnectionState::Shutdown {
            tracing::info!("Closing backend connection to {}", self.address);
            *state = ConnectionState::Shutdown;
        }
    }

    async fn mark(&self, next: ConnectionState) {
        let mut state = self.state.write().await;
        if *state != ConnectionState::Shutdown {
            *state = next;
        }
    }
}

/// Effective call deadline: the per-call timeout, clipped by whatever time
/// remains on the caller's own deadline.
pub(crate) fn effective_timeout(call_timeout: Duration, deadline: Option<Instant>) -> Duration {
    match deadline {
        Some(deadline) => call_timeout.min(deadline.saturating_duration_since(Instant::now())),
        None => call_timeout,
    }
}

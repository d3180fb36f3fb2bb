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

//! Gateway error taxonomy
//!
//! Every error a request can hit maps to a stable, non-leaking status at the
//! listener edge. Auth failures are differentiated internally (for logging)
//! but always surface as a single generic "unauthorized" to the caller.

use std::time::Duration;
use thiserror::Error;

/// Message presented to callers for any credential failure.
pub const UNAUTHENTICATED_MESSAGE: &str = "invalid or missing credential";

/// Message presented to callers for any unexpected fault.
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Credential validation failures.
///
/// The variants exist for logs and tests only; callers always see the same
/// generic unauthenticated response regardless of which one occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was presented at all.
    #[error("missing credential")]
    MissingCredential,

    /// An Authorization header / metadata entry was present but not a
    /// well-formed bearer credential.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// The credential verified but its expiry has passed.
    #[error("credential expired")]
    Expired,

    /// Bad signature, malformed token, or a non-HMAC signing algorithm.
    #[error("invalid credential")]
    Invalid,
}

impl AuthError {
    /// Collapse to the caller-visible gRPC status. No variant detail leaks.
    pub fn to_status(self) -> tonic::Status {
        tonic::Status::unauthenticated(UNAUTHENTICATED_MESSAGE)
    }
}

/// Failures establishing or using a backend connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("backend address cannot be empty")]
    EmptyAddress,

    #[error("invalid backend endpoint {address}: {message}")]
    InvalidEndpoint { address: String, message: String },

    #[error("failed to connect to backend at {address}: {source}")]
    ConnectFailed {
        address: String,
        source: tonic::transport::Error,
    },

    #[error("connection to {address} not ready within {timeout:?}")]
    ConnectTimeout { address: String, timeout: Duration },

    /// The client was closed; calls must fail fast instead of attempting.
    #[error("connection is shut down")]
    Shutdown,

    #[error("call to {method} exceeded its deadline")]
    DeadlineExceeded { method: &'static str },

    #[error("call to {method} failed: {status}")]
    CallFailed {
        method: &'static str,
        status: tonic::Status,
    },
}

/// Top-level gateway error.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or missing required settings. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Malformed request payload, reported with a field-level message.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    /// Listener-level failure (bind error, drain deadline elapsed).
    #[error("listener error: {0}")]
    Listener(String),

    /// Anything unexpected, including recovered panics. Full detail goes to
    /// the log sink only.
    #[error("internal error: {0}")]
    Internal(String),
}

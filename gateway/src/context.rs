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

//! Per-request context
//!
//! A typed context threaded explicitly through handler signatures, replacing
//! untyped context-value propagation. The Auth stage is the only writer of
//! the claims field; the context lives exactly as long as its request.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::time::Instant;

/// Identity asserted by a validated bearer credential.
///
/// Immutable once decoded; owned by the request scope that decoded it and
/// never shared across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier
    pub sub: String,

    /// Caller role
    pub role: String,

    /// Expiry (seconds since epoch)
    pub exp: i64,

    /// Issued-at (seconds since epoch)
    pub iat: i64,
}

/// Inbound protocol the request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Grpc,
}

/// Context carried by a single in-flight request.
///
/// Created at the start of middleware processing, destroyed when the handler
/// returns.
#[derive(Debug, Clone)]
pub struct RequestContext {
    protocol: Protocol,
    peer_addr: Option<SocketAddr>,
    deadline: Option<Instant>,
    claims: Option<Claims>,
}

impl RequestContext {
    /// Create a context with no deadline and no identity.
    pub fn new(protocol: Protocol, peer_addr: Option<SocketAddr>) -> Self {
        Self {
            protocol,
            peer_addr,
            deadline: None,
            claims: None,
        }
    }

    /// Attach a caller-supplied deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach validated claims. Called only by the Auth stage.
    pub fn with_claims(mut self, claims: Claims) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Caller deadline, if one was supplied with the request.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Claims of the authenticated caller, present after the Auth stage on
    /// protected routes.
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }
}

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

//! Request middleware chain
//!
//! Both protocol listeners apply the same three stages in the same order:
//! Recovery wraps Logging wraps Auth wraps the handler. The ordering is a
//! hard invariant: a panic anywhere inside still gets logged and converted
//! to a safe error, and unauthenticated attempts are still logged with
//! their outcome. A rate-limit placeholder keeps its slot between Logging
//! and Auth for future policy.

pub mod http;
pub mod rpc;

use crate::error::AuthError;
use std::any::Any;

/// Extract the raw token from a bearer credential carrier value
/// (`Authorization` header or RPC `authorization` metadata).
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredential)?;
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Render a recovered panic payload for the log sink.
pub(crate) fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

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

//! Bearer token validation
//!
//! Verifies and decodes signed bearer tokens against a single shared-secret
//! HMAC key. The validator is constructed once at startup and handed to both
//! protocol chains; it keeps no other state and has no side effects.

use crate::context::Claims;
use crate::error::AuthError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

/// Validates bearer tokens against the configured shared secret.
pub struct TokenValidator {
    decoding_key: DecodingKey,
}

impl TokenValidator {
    /// Create a validator for the given shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify a raw token (already stripped of the `Bearer ` prefix) and
    /// decode its claims.
    ///
    /// Only HMAC-family signing algorithms are accepted. A token whose header
    /// names any other algorithm is rejected before signature verification,
    /// so an attacker cannot select a verification scheme the gateway never
    /// signed with.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        // Empty input fails before any cryptographic work.
        if token.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let header = decode_header(token).map_err(|_| AuthError::Invalid)?;
        let algorithm = match header.alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => header.alg,
            _ => return Err(AuthError::Invalid),
        };

        // Validation::new requires an `exp` claim and checks it by default.
        let validation = Validation::new(algorithm);
        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|err| {
                match err.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::Invalid,
                }
            })?;

        Ok(data.claims)
    }
}

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

//! Request payload validation
//!
//! Shared by both protocol surfaces so a malformed request is rejected at
//! the gateway edge, before any backend call is issued.

use crate::error::GatewayError;
use fluxor_common::proto::{LoginRequest, RegisterRequest, User};

fn required(field: &'static str, value: &str) -> Result<(), GatewayError> {
    if value.trim().is_empty() {
        Err(GatewayError::Validation {
            field,
            message: "is required",
        })
    } else {
        Ok(())
    }
}

/// A user payload needs at least a username and a plausible email.
pub fn validate_user(user: Option<&User>) -> Result<(), GatewayError> {
    let user = user.ok_or(GatewayError::Validation {
        field: "user",
        message: "is required",
    })?;
    required("username", &user.username)?;
    required("email", &user.email)?;
    if !user.email.contains('@') {
        return Err(GatewayError::Validation {
            field: "email",
            message: "is not a valid address",
        });
    }
    Ok(())
}

pub fn validate_user_id(user_id: &str) -> Result<(), GatewayError> {
    required("user_id", user_id)
}

pub fn validate_login(request: &LoginRequest) -> Result<(), GatewayError> {
    required("username", &request.username)?;
    required("password", &request.password)
}

pub fn validate_register(request: &RegisterRequest) -> Result<(), GatewayError> {
    required("username", &request.username)?;
    required("email", &request.email)?;
    if !request.email.contains('@') {
        return Err(GatewayError::Validation {
            field: "email",
            message: "is not a valid address",
        });
    }
    required("password", &request.password)
}

pub fn validate_page_size(page_size: i32) -> Result<(), GatewayError> {
    if page_size < 0 {
        return Err(GatewayError::Validation {
            field: "page_size",
            message: "must not be negative",
        });
    }
    Ok(())
}

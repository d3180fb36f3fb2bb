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

//! Fluxor Gateway Library
//!
//! API gateway front door: authenticates inbound HTTP and gRPC traffic,
//! runs it through a fixed middleware chain, and forwards it to the
//! downstream auth and user services.

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod grpc;
pub mod http;
pub mod listener;
pub mod middleware;
pub mod process;
pub mod token;
pub mod validate;

// Re-export commonly used types
pub use backend::{AuthBackend, BackendClientConfig, ConnectionState, UserBackend};
pub use config::{Arguments, Configuration, GatewayOptions};
pub use context::{Claims, Protocol, RequestContext};
pub use error::{AuthError, ConnectionError, GatewayError};
pub use grpc::GrpcServer;
pub use http::{AppState, HttpServer};
pub use listener::StopHandle;
pub use process::GatewayProcess;
pub use token::TokenValidator;

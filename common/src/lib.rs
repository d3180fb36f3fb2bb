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

//! Fluxor Common Types and Protocols
//!
//! This crate defines the gRPC protocol shared between the gateway and its
//! downstream services:
//! - AuthService (login / register)
//! - UserService (CRUD + list)

/// Generated protobuf types and tonic service stubs.
pub mod proto {
    tonic::include_proto!("fluxor.v1");
}

/// Encoded file descriptor set for the Fluxor protocol, used to register
/// gRPC server reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/fluxor_descriptor.bin"));

pub use proto::auth_service_client::AuthServiceClient;
pub use proto::auth_service_server::{AuthService, AuthServiceServer};
pub use proto::user_service_client::UserServiceClient;
pub use proto::user_service_server::{UserService, UserServiceServer};

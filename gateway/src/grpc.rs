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

//! gRPC protocol listener
//!
//! Fronts the same backends as the HTTP listener. Auth methods are open,
//! user methods require a bearer credential in request metadata. Every
//! method runs through the RPC middleware chain.

use crate::backend::{AuthBackend, UserBackend};
use crate::context::RequestContext;
use crate::error::{ConnectionError, GatewayError, INTERNAL_MESSAGE};
use crate::listener::StopHandle;
use crate::middleware::rpc::RpcChain;
use crate::token::TokenValidator;
use crate::validate;
use fluxor_common::proto::auth_service_server::{AuthService, AuthServiceServer};
use fluxor_common::proto::user_service_server::{UserService, UserServiceServer};
use fluxor_common::proto::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse, GetUserRequest,
    GetUserResponse, ListUsersRequest, ListUsersResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, UpdateUserRequest, UpdateUserResponse,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

/// Translate a backend failure into the status returned to the caller.
///
/// Downstream detail stays in the logs; callers see a deadline, an
/// unavailable, or a generic internal status.
fn backend_status(error: ConnectionError) -> Status {
    match error {
        ConnectionError::DeadlineExceeded { method } => {
            tracing::error!("backend call {} exceeded its deadline", method);
            Status::deadline_exceeded("deadline exceeded")
        }
        ConnectionError::Shutdown => Status::unavailable("backend unavailable"),
        other => {
            tracing::error!("backend call failed: {}", other);
            Status::internal(INTERNAL_MESSAGE)
        }
    }
}

fn invalid(error: GatewayError) -> Status {
    Status::invalid_argument(error.to_string())
}

/// Auth service surface. Unprotected: these calls mint credentials.
pub struct GatewayAuthService {
    chain: RpcChain,
    auth: Arc<AuthBackend>,
}

impl GatewayAuthService {
    pub fn new(chain: RpcChain, auth: Arc<AuthBackend>) -> Self {
        Self { chain, auth }
    }
}

#[tonic::async_trait]
impl AuthService for GatewayAuthService {
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let auth = self.auth.clone();
        self.chain
            .run("AuthService/Login", false, request, |ctx, req| async move {
                validate::validate_login(&req).map_err(invalid)?;
                let response = auth.login(&ctx, req).await.map_err(backend_status)?;
                Ok(Response::new(response))
            })
            .await
    }

    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let auth = self.auth.clone();
        self.chain
            .run(
                "AuthService/Register",
                false,
                request,
                |ctx, req| async move {
                    validate::validate_register(&req).map_err(invalid)?;
                    let response = auth.register(&ctx, req).await.map_err(backend_status)?;
                    Ok(Response::new(response))
                },
            )
            .await
    }
}

/// User service surface. Every method is bearer-protected.
pub struct GatewayUserService {
    chain: RpcChain,
    users: Arc<UserBackend>,
}

impl GatewayUserService {
    pub fn new(chain: RpcChain, users: Arc<UserBackend>) -> Self {
        Self { chain, users }
    }
}

#[tonic::async_trait]
impl UserService for GatewayUserService {
    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        let users = self.users.clone();
        self.chain
            .run(
                "UserService/CreateUser",
                true,
                request,
                |ctx: RequestContext, req| async move {
                    validate::validate_user(req.user.as_ref()).map_err(invalid)?;
                    let response = users.create_user(&ctx, req).await.map_err(backend_status)?;
                    Ok(Response::new(response))
                },
            )
            .await
    }

    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let users = self.users.clone();
        self.chain
            .run(
                "UserService/GetUser",
                true,
                request,
                |ctx, req: GetUserRequest| async move {
                    validate::validate_user_id(&req.user_id).map_err(invalid)?;
                    let response = users.get_user(&ctx, req).await.map_err(backend_status)?;
                    Ok(Response::new(response))
                },
            )
            .await
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, Status> {
        let users = self.users.clone();
        self.chain
            .run(
                "UserService/UpdateUser",
                true,
                request,
                |ctx, req: UpdateUserRequest| async move {
                    validate::validate_user(req.user.as_ref()).map_err(invalid)?;
                    let user_id = req.user.as_ref().map(|u| u.id.as_str()).unwrap_or_default();
                    validate::validate_user_id(user_id).map_err(invalid)?;
                    let response = users.update_user(&ctx, req).await.map_err(backend_status)?;
                    Ok(Response::new(response))
                },
            )
            .await
    }

    async fn delete_user(
        &self,
        request: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        let users = self.users.clone();
        self.chain
            .run(
                "UserService/DeleteUser",
                true,
                request,
                |ctx, req: DeleteUserRequest| async move {
                    validate::validate_user_id(&req.user_id).map_err(invalid)?;
                    let response = users.delete_user(&ctx, req).await.map_err(backend_status)?;
                    Ok(Response::new(response))
                },
            )
            .await
    }

    async fn list_users(
        &self,
        request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let users = self.users.clone();
        self.chain
            .run(
                "UserService/ListUsers",
                true,
                request,
                |ctx, req: ListUsersRequest| async move {
                    validate::validate_page_size(req.page_size).map_err(invalid)?;
                    let response = users.list_users(&ctx, req).await.map_err(backend_status)?;
                    Ok(Response::new(response))
                },
            )
            .await
    }
}

/// gRPC listener for the RPC surface.
pub struct GrpcServer {
    addr: SocketAddr,
    request_timeout: Duration,
    validator: Arc<TokenValidator>,
    users: Arc<UserBackend>,
    auth: Arc<AuthBackend>,
}

impl GrpcServer {
    pub fn new(
        addr: SocketAddr,
        request_timeout: Duration,
        validator: Arc<TokenValidator>,
        users: Arc<UserBackend>,
        auth: Arc<AuthBackend>,
    ) -> Self {
        Self {
            addr,
            request_timeout,
            validator,
            users,
            auth,
        }
    }

    /// Bind and serve both services. A bind failure is fatal; the returned
    /// handle drains in-flight calls on stop. The bound address is returned
    /// so callers binding port 0 can reach the listener.
    pub async fn start(self) -> Result<(SocketAddr, StopHandle), GatewayError> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|error| {
                GatewayError::Listener(format!("failed to bind gRPC {}: {}", self.addr, error))
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|error| GatewayError::Listener(error.to_string()))?;
        tracing::info!("gRPC listener on {}", local_addr);

        let chain = RpcChain::new(self.validator);
        let auth_service = GatewayAuthService::new(chain.clone(), self.auth);
        let user_service = GatewayUserService::new(chain, self.users);
        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(fluxor_common::FILE_DESCRIPTOR_SET)
            .build_v1()
            .map_err(|error| {
                GatewayError::Listener(format!("failed to build reflection service: {}", error))
            })?;

        let (handle, mut shutdown_rx, guard) = StopHandle::new("grpc");
        let request_timeout = self.request_timeout;

        tokio::spawn(async move {
            let serve = tonic::transport::Server::builder()
                .timeout(request_timeout)
                .add_service(AuthServiceServer::new(auth_service))
                .add_service(UserServiceServer::new(user_service))
                .add_service(reflection)
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                    let _ = shutdown_rx.changed().await;
                });

            if let Err(error) = serve.await {
                tracing::error!("gRPC listener failed: {}", error);
            }
            guard.finish();
        });

        Ok((local_addr, handle))
    }
}

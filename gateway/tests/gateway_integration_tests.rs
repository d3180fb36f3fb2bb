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

use axum::body::Body;
use axum::http::{Request as HttpRequest, StatusCode, header};
use fluxor_common::proto::auth_service_server::{AuthService, AuthServiceServer};
use fluxor_common::proto::user_service_server::{UserService, UserServiceServer};
use fluxor_common::proto::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse, GetUserRequest,
    GetUserResponse, ListUsersRequest, ListUsersResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, UpdateUserRequest, UpdateUserResponse, User,
};
use fluxor_gateway::backend::{AuthBackend, BackendClientConfig, UserBackend};
use fluxor_gateway::config::GatewayOptions;
use fluxor_gateway::context::{Claims, Protocol, RequestContext};
use fluxor_gateway::error::{ConnectionError, GatewayError};
use fluxor_gateway::grpc::GatewayUserService;
use fluxor_gateway::http::{AppState, HttpServer};
use fluxor_gateway::middleware::rpc::RpcChain;
use fluxor_gateway::process::GatewayProcess;
use fluxor_gateway::token::TokenValidator;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        full_name: "Alice Example".to_string(),
        role: "member".to_string(),
    }
}

/// Mint a token the gateway's validator accepts.
fn bearer() -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "user-7".to_string(),
        role: "admin".to_string(),
        exp: now + 3600,
        iat: now,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

#[derive(Clone)]
struct MockUserService {
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

#[tonic::async_trait]
impl UserService for MockUserService {
    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        let mut user = request.into_inner().user.unwrap_or_default();
        user.id = "user-1".to_string();
        Ok(Response::new(CreateUserResponse { user: Some(user) }))
    }

    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        let user_id = request.into_inner().user_id;
        Ok(Response::new(GetUserResponse {
            user: Some(sample_user(&user_id)),
        }))
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Response::new(UpdateUserResponse {
            user: request.into_inner().user,
        }))
    }

    async fn delete_user(
        &self,
        _request: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Response::new(DeleteUserResponse { deleted: true }))
    }

    async fn list_users(
        &self,
        _request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Response::new(ListUsersResponse {
            users: vec![sample_user("user-1")],
            next_page_token: String::new(),
        }))
    }
}

#[derive(Clone)]
struct MockAuthService;

#[tonic::async_trait]
impl AuthService for MockAuthService {
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let username = request.into_inner().username;
        let mut user = sample_user("user-1");
        user.username = username;
        Ok(Response::new(LoginResponse {
            token: "backend-token".to_string(),
            user: Some(user),
        }))
    }

    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let body = request.into_inner();
        let mut user = sample_user("user-2");
        user.username = body.username;
        user.email = body.email;
        Ok(Response::new(RegisterResponse { user: Some(user) }))
    }
}

/// User service that fails every call with a fixed status carrying
/// internal detail, the way a real backend reports its own failures.
#[derive(Clone)]
struct FailingUserService {
    status: Status,
}

#[tonic::async_trait]
impl UserService for FailingUserService {
    async fn create_user(
        &self,
        _request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        Err(self.status.clone())
    }

    async fn get_user(
        &self,
        _request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        Err(self.status.clone())
    }

    async fn update_user(
        &self,
        _request: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, Status> {
        Err(self.status.clone())
    }

    async fn delete_user(
        &self,
        _request: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        Err(self.status.clone())
    }

    async fn list_users(
        &self,
        _request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        Err(self.status.clone())
    }
}

async fn spawn_failing_backend(status: Status) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(UserServiceServer::new(FailingUserService { status }))
            .add_service(AuthServiceServer::new(MockAuthService))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    addr.to_string()
}

/// Spin up an in-process backend serving both services on an ephemeral
/// port. Returns the address and the user-service call counter.
async fn spawn_backend(delay: Duration) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let user_service = MockUserService {
        calls: calls.clone(),
        delay,
    };

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(UserServiceServer::new(user_service))
            .add_service(AuthServiceServer::new(MockAuthService))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    (addr.to_string(), calls)
}

async fn app_state(addr: &str, call_timeout: Duration) -> AppState {
    let config = BackendClientConfig::new(addr, call_timeout);
    AppState {
        validator: Arc::new(TokenValidator::new(SECRET)),
        users: Arc::new(UserBackend::connect(&config).await.unwrap()),
        auth: Arc::new(AuthBackend::connect(&config).await.unwrap()),
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// HTTP surface
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_is_open() {
    let (addr, _calls) = spawn_backend(Duration::ZERO).await;
    let state = app_state(&addr, Duration::from_secs(2)).await;
    let router = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state)
        .router();

    let response = router
        .oneshot(
            HttpRequest::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_rejects_missing_token_without_backend_call() {
    let (addr, calls) = spawn_backend(Duration::ZERO).await;
    let state = app_state(&addr, Duration::from_secs(2)).await;
    let router = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state)
        .router();

    let response = router
        .oneshot(
            HttpRequest::builder()
                .uri("/api/v1/users/user-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_protected_route_accepts_valid_token() {
    let (addr, calls) = spawn_backend(Duration::ZERO).await;
    let state = app_state(&addr, Duration::from_secs(2)).await;
    let router = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state)
        .router();

    let response = router
        .oneshot(
            HttpRequest::builder()
                .uri("/api/v1/users/user-9")
                .header(header::AUTHORIZATION, bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let body = body_json(response).await;
    assert_eq!(body["user"]["id"], "user-9");
}

#[tokio::test]
async fn test_create_user_validation_short_circuits() {
    let (addr, calls) = spawn_backend(Duration::ZERO).await;
    let state = app_state(&addr, Duration::from_secs(2)).await;
    let router = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state)
        .router();

    let payload = serde_json::json!({
        "username": "alice",
        "email": "not-an-address",
    });
    let response = router
        .oneshot(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header(header::AUTHORIZATION, bearer())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_route_is_open_and_forwards() {
    let (addr, _calls) = spawn_backend(Duration::ZERO).await;
    let state = app_state(&addr, Duration::from_secs(2)).await;
    let router = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state)
        .router();

    let payload = serde_json::json!({ "username": "alice", "password": "hunter2" });
    let response = router
        .oneshot(
            HttpRequest::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["token"], "backend-token");
    assert_eq!(body["user"]["username"], "alice");
}

#[tokio::test]
async fn test_backend_error_detail_stays_out_of_http_response() {
    let detail = "row user-1 missing in users_shard_3 at 10.0.0.7:5432";
    let addr = spawn_failing_backend(Status::not_found(detail)).await;
    let state = app_state(&addr, Duration::from_secs(2)).await;
    let router = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state)
        .router();

    let response = router
        .oneshot(
            HttpRequest::builder()
                .uri("/api/v1/users/user-1")
                .header(header::AUTHORIZATION, bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "not found");
    assert!(!body.to_string().contains("users_shard_3"));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_rejected_request_still_logged_exactly_once() {
    let (addr, _calls) = spawn_backend(Duration::ZERO).await;
    let state = app_state(&addr, Duration::from_secs(2)).await;
    let router = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state)
        .router();

    let response = router
        .oneshot(
            HttpRequest::builder()
                .uri("/api/v1/users/user-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    logs_assert(|lines: &[&str]| {
        match lines.iter().filter(|line| line.contains("http request")).count() {
            1 => Ok(()),
            n => Err(format!("expected one request log line, found {}", n)),
        }
    });
}

/// Handler that unwinds; the return type only exists to satisfy the
/// handler signature.
async fn boom() -> &'static str {
    panic!("kaboom")
}

#[tokio::test]
async fn test_recovery_keeps_listener_alive_after_panic() {
    use axum::routing::get;

    let router = axum::Router::new()
        .route("/boom", get(boom))
        .route("/ok", get(|| async { "fine" }))
        .layer(axum::middleware::from_fn(
            fluxor_gateway::middleware::http::recover,
        ));

    let response = router
        .clone()
        .oneshot(
            HttpRequest::builder()
                .uri("/boom")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The follow-up request must succeed.
    let response = router
        .oneshot(HttpRequest::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_panicked_request_logged_once_as_500() {
    use axum::routing::get;

    let router = axum::Router::new()
        .route("/boom", get(boom))
        .layer(axum::middleware::from_fn(
            fluxor_gateway::middleware::http::log_requests,
        ))
        .layer(axum::middleware::from_fn(
            fluxor_gateway::middleware::http::recover,
        ));

    let response = router
        .oneshot(
            HttpRequest::builder()
                .uri("/boom")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    logs_assert(|lines: &[&str]| {
        let matching: Vec<_> = lines
            .iter()
            .filter(|line| line.contains("http request"))
            .collect();
        match matching.as_slice() {
            [line] if line.contains("status=500") => Ok(()),
            [line] => Err(format!("expected status=500, got: {}", line)),
            other => Err(format!("expected one request log line, found {}", other.len())),
        }
    });
}

#[tokio::test]
async fn test_handlers_receive_authenticated_context() {
    use axum::Extension;
    use axum::routing::get;

    async fn whoami(Extension(ctx): Extension<RequestContext>) -> String {
        ctx.claims()
            .map(|claims| claims.sub.clone())
            .unwrap_or_default()
    }

    let validator = Arc::new(TokenValidator::new(SECRET));
    let router = axum::Router::new()
        .route("/whoami", get(whoami))
        .route_layer(axum::middleware::from_fn_with_state(
            validator,
            fluxor_gateway::middleware::http::authenticate,
        ))
        .layer(axum::middleware::from_fn(
            fluxor_gateway::middleware::http::inject_context,
        ));

    let response = router
        .oneshot(
            HttpRequest::builder()
                .uri("/whoami")
                .header(header::AUTHORIZATION, bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"user-7");
}

// ============================================================================
// RPC surface
// ============================================================================

#[tokio::test]
async fn test_rpc_user_service_requires_token() {
    let (addr, calls) = spawn_backend(Duration::ZERO).await;
    let config = BackendClientConfig::new(&addr, Duration::from_secs(2));
    let users = Arc::new(UserBackend::connect(&config).await.unwrap());
    let chain = RpcChain::new(Arc::new(TokenValidator::new(SECRET)));
    let service = GatewayUserService::new(chain, users);

    let status = service
        .get_user(Request::new(GetUserRequest {
            user_id: "user-1".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unauthenticated);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rpc_user_service_forwards_with_valid_token() {
    let (addr, calls) = spawn_backend(Duration::ZERO).await;
    let config = BackendClientConfig::new(&addr, Duration::from_secs(2));
    let users = Arc::new(UserBackend::connect(&config).await.unwrap());
    let chain = RpcChain::new(Arc::new(TokenValidator::new(SECRET)));
    let service = GatewayUserService::new(chain, users);

    let mut request = Request::new(GetUserRequest {
        user_id: "user-3".to_string(),
    });
    request
        .metadata_mut()
        .insert("authorization", bearer().parse().unwrap());

    let response = service.get_user(request).await.unwrap().into_inner();
    assert_eq!(response.user.unwrap().id, "user-3");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rpc_validation_short_circuits() {
    let (addr, calls) = spawn_backend(Duration::ZERO).await;
    let config = BackendClientConfig::new(&addr, Duration::from_secs(2));
    let users = Arc::new(UserBackend::connect(&config).await.unwrap());
    let chain = RpcChain::new(Arc::new(TokenValidator::new(SECRET)));
    let service = GatewayUserService::new(chain, users);

    let mut request = Request::new(CreateUserRequest { user: None });
    request
        .metadata_mut()
        .insert("authorization", bearer().parse().unwrap());

    let status = service.create_user(request).await.unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Backend clients
// ============================================================================

#[tokio::test]
async fn test_backend_call_bounded_by_call_timeout() {
    let (addr, _calls) = spawn_backend(Duration::from_millis(500)).await;
    let config = BackendClientConfig::new(&addr, Duration::from_millis(100));
    let users = UserBackend::connect(&config).await.unwrap();

    let ctx = RequestContext::new(Protocol::Grpc, None);
    let err = users
        .get_user(
            &ctx,
            GetUserRequest {
                user_id: "user-1".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectionError::DeadlineExceeded { .. }));
}

#[tokio::test]
async fn test_backend_call_bounded_by_caller_deadline() {
    let (addr, _calls) = spawn_backend(Duration::from_millis(500)).await;
    let config = BackendClientConfig::new(&addr, Duration::from_secs(10));
    let users = UserBackend::connect(&config).await.unwrap();

    let ctx = RequestContext::new(Protocol::Grpc, None)
        .with_deadline(tokio::time::Instant::now() + Duration::from_millis(50));
    let err = users
        .get_user(
            &ctx,
            GetUserRequest {
                user_id: "user-1".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectionError::DeadlineExceeded { .. }));
}

#[tokio::test]
async fn test_closed_backend_refuses_calls() {
    let (addr, calls) = spawn_backend(Duration::ZERO).await;
    let config = BackendClientConfig::new(&addr, Duration::from_secs(2));
    let users = UserBackend::connect(&config).await.unwrap();

    users.close().await;
    let ctx = RequestContext::new(Protocol::Grpc, None);
    let err = users
        .get_user(
            &ctx,
            GetUserRequest {
                user_id: "user-1".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectionError::Shutdown));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Process lifecycle
// ============================================================================

fn options(backend_addr: &str) -> GatewayOptions {
    GatewayOptions {
        http_addr: "127.0.0.1:0".parse().unwrap(),
        grpc_addr: "127.0.0.1:0".parse().unwrap(),
        read_timeout: Duration::from_secs(5),
        write_timeout: Duration::from_secs(5),
        shutdown_timeout: Duration::from_secs(5),
        user_backend: BackendClientConfig::new(backend_addr, Duration::from_secs(2)),
        auth_backend: BackendClientConfig::new(backend_addr, Duration::from_secs(2)),
        jwt_secret: SECRET.to_string(),
    }
}

#[tokio::test]
async fn test_http_listener_drains_in_flight_request_on_stop() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (addr, _calls) = spawn_backend(Duration::from_millis(500)).await;
    let state = app_state(&addr, Duration::from_secs(5)).await;
    let server = HttpServer::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5), state);
    let (bound, handle) = server.start().await.unwrap();

    let token = bearer();
    let request_task = tokio::spawn(async move {
        let mut stream = tokio::net::TcpStream::connect(bound).await.unwrap();
        let request = format!(
            "GET /api/v1/users/user-1 HTTP/1.1\r\nHost: {}\r\nAuthorization: {}\r\nConnection: close\r\n\r\n",
            bound, token
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    });

    // Let the request reach the slow backend, then stop mid-flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.stop(Duration::from_secs(5)).await.unwrap();

    let response = request_task.await.unwrap();
    assert!(
        response.starts_with("HTTP/1.1 200"),
        "in-flight request was not drained: {}",
        response
    );

    // The socket is gone once stop returns.
    assert!(tokio::net::TcpStream::connect(bound).await.is_err());
}

#[tokio::test]
async fn test_process_runs_and_drains_on_shutdown() {
    let (addr, _calls) = spawn_backend(Duration::ZERO).await;
    let (trigger, wait) = tokio::sync::oneshot::channel::<()>();

    let process = GatewayProcess::new(options(&addr));
    let task = tokio::spawn(process.run_until(async move {
        let _ = wait.await;
    }));

    tokio::time::sleep(Duration::from_millis(200)).await;
    trigger.send(()).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_process_refuses_to_start_without_reachable_backend() {
    let mut opts = options("");
    opts.user_backend = BackendClientConfig::new("", Duration::from_secs(2));

    let err = GatewayProcess::new(opts)
        .run_until(std::future::pending::<()>())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Connection(ConnectionError::EmptyAddress)
    ));
}

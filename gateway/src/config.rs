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

use crate::backend::BackendClientConfig;
use crate::error::GatewayError;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "gateway/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "gateway/.env"
    )]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub auth: AuthConfig,

    pub http: Option<HttpConfig>,
    pub grpc: Option<GrpcConfig>,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub backends: BackendsConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Self, String> {
        tracing::debug!("Loading configuration from file: {}", path);
        let file =
            std::fs::File::open(path).map_err(|e| format!("Failed to open config file: {}", e))?;

        let conf = serde_yaml::from_reader(file)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        Ok(conf)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to verify bearer tokens
    #[serde(default)]
    pub jwt_secret: EnvField<JwtSecret>,
}

#[derive(Default, Serialize, Deserialize)]
pub struct JwtSecret(String);

impl JwtSecret {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret itself
        write!(f, "JwtSecret(<{} bytes>)", self.0.len())
    }
}

impl FromStr for JwtSecret {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} bytes>", self.0.len())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub addr: EnvField<HttpBinding>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HttpBinding(SocketAddr);

impl HttpBinding {
    pub fn to_addr(&self) -> SocketAddr {
        self.0
    }
    pub fn to_ip(&self) -> IpAddr {
        self.0.ip()
    }
    pub fn to_port(&self) -> u16 {
        self.0.port()
    }
}

impl FromStr for HttpBinding {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(SocketAddr::from_str(s)?))
    }
}

impl Default for HttpBinding {
    fn default() -> Self {
        Self(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::new(0, 0, 0, 0),
            8080,
        )))
    }
}

impl std::fmt::Display for HttpBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GrpcConfig {
    pub addr: EnvField<GrpcBinding>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GrpcBinding(SocketAddr);

impl GrpcBinding {
    pub fn to_addr(&self) -> SocketAddr {
        self.0
    }
    pub fn to_ip(&self) -> IpAddr {
        self.0.ip()
    }
    pub fn to_port(&self) -> u16 {
        self.0.port()
    }
}

impl FromStr for GrpcBinding {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(SocketAddr::from_str(s)?))
    }
}

impl Default for GrpcBinding {
    fn default() -> Self {
        Self(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::new(0, 0, 0, 0),
            9090,
        )))
    }
}

impl std::fmt::Display for GrpcBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Read timeout in seconds (default: 15)
    #[serde(default = "default_read_timeout")]
    pub read_secs: u64,

    /// Write timeout in seconds (default: 15)
    #[serde(default = "default_write_timeout")]
    pub write_secs: u64,

    /// Graceful shutdown drain deadline in seconds (default: 30)
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_secs: u64,
}

fn default_read_timeout() -> u64 {
    15
}

fn default_write_timeout() -> u64 {
    15
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            read_secs: default_read_timeout(),
            write_secs: default_write_timeout(),
            shutdown_secs: default_shutdown_timeout(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default)]
    pub user: UserBackendConfig,

    #[serde(default)]
    pub auth: AuthBackendConfig,
}

fn default_backend_timeout() -> u64 {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserBackendConfig {
    #[serde(default)]
    pub addr: EnvField<UserServiceAddress>,

    /// Per-call timeout in seconds (default: 10)
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds (default: 30)
    pub connect_timeout_secs: Option<u64>,
}

impl Default for UserBackendConfig {
    fn default() -> Self {
        Self {
            addr: Default::default(),
            timeout_secs: default_backend_timeout(),
            connect_timeout_secs: None,
        }
    }
}

impl UserBackendConfig {
    pub fn to_client_config(&self) -> BackendClientConfig {
        BackendClientConfig {
            address: self.addr.as_str().to_string(),
            call_timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthBackendConfig {
    #[serde(default)]
    pub addr: EnvField<AuthServiceAddress>,

    /// Per-call timeout in seconds (default: 10)
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds (default: 30)
    pub connect_timeout_secs: Option<u64>,
}

impl Default for AuthBackendConfig {
    fn default() -> Self {
        Self {
            addr: Default::default(),
            timeout_secs: default_backend_timeout(),
            connect_timeout_secs: None,
        }
    }
}

impl AuthBackendConfig {
    pub fn to_client_config(&self) -> BackendClientConfig {
        BackendClientConfig {
            address: self.addr.as_str().to_string(),
            call_timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserServiceAddress(String);

impl UserServiceAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserServiceAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Default for UserServiceAddress {
    fn default() -> Self {
        Self(String::from("localhost:50051"))
    }
}

impl std::fmt::Display for UserServiceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthServiceAddress(String);

impl AuthServiceAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AuthServiceAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Default for AuthServiceAddress {
    fn default() -> Self {
        Self(String::from("localhost:50052"))
    }
}

impl std::fmt::Display for AuthServiceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frozen options shared by both listeners and the process composition.
///
/// Constructed once from external configuration; owned by the gateway
/// process for its entire lifetime.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub http_addr: SocketAddr,
    pub grpc_addr: SocketAddr,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub user_backend: BackendClientConfig,
    pub auth_backend: BackendClientConfig,
    pub jwt_secret: String,
}

impl GatewayOptions {
    /// Freeze a loaded configuration into immutable options.
    ///
    /// Fails fast on settings the gateway cannot run without.
    pub fn from_configuration(config: &Configuration) -> Result<Self, GatewayError> {
        let jwt_secret = config.auth.jwt_secret.as_str().to_string();
        if jwt_secret.is_empty() {
            return Err(GatewayError::Config(
                "auth.jwt_secret must be set".to_string(),
            ));
        }

        Ok(Self {
            http_addr: config
                .http
                .as_ref()
                .map(|c| c.addr.to_addr())
                .unwrap_or_else(|| HttpBinding::default().to_addr()),
            grpc_addr: config
                .grpc
                .as_ref()
                .map(|c| c.addr.to_addr())
                .unwrap_or_else(|| GrpcBinding::default().to_addr()),
            read_timeout: Duration::from_secs(config.timeouts.read_secs),
            write_timeout: Duration::from_secs(config.timeouts.write_secs),
            shutdown_timeout: Duration::from_secs(config.timeouts.shutdown_secs),
            user_backend: config.backends.user.to_client_config(),
            auth_backend: config.backends.auth.to_client_config(),
            jwt_secret,
        })
    }
}

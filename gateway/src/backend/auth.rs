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

//! Auth service backend client

use super::{BackendChannel, BackendClientConfig, ConnectionState, effective_timeout};
use crate::context::RequestContext;
use crate::error::ConnectionError;
use fluxor_common::AuthServiceClient;
use fluxor_common::proto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use std::time::Duration;
use tonic::transport::Channel;

/// Client for the downstream auth service.
pub struct AuthBackend {
    channel: BackendChannel,
    call_timeout: Duration,
}

impl AuthBackend {
    pub async fn connect(config: &BackendClientConfig) -> Result<Self, ConnectionError> {
        let channel = BackendChannel::connect(config).await?;
        Ok(Self {
            channel,
            call_timeout: config.call_timeout,
        })
    }

    fn client(&self) -> AuthServiceClient<Channel> {
        AuthServiceClient::new(self.channel.channel())
    }

    pub async fn state(&self) -> ConnectionState {
        self.channel.state().await
    }

    pub async fn close(&self) {
        self.channel.close().await;
    }

    pub async fn login(
        &self,
        context: &RequestContext,
        request: LoginRequest,
    ) -> Result<LoginResponse, ConnectionError> {
        self.channel.ensure_ready().await?;
        let timeout = effective_timeout(self.call_timeout, context.deadline());
        let result = tokio::time::timeout(timeout, self.client().login(request)).await;
        self.channel.finish_call("AuthService/Login", result).await
    }

    pub async fn register(
        &self,
        context: &RequestContext,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, ConnectionError> {
        self.channel.ensure_ready().await?;
        let timeout = effective_timeout(self.call_timeout, context.deadline());
        let result = tokio::time::timeout(timeout, self.client().register(request)).await;
        self.channel.finish_call("AuthService/Register", result).await
    }
}

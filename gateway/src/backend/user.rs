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

//! User service backend client

use super::{BackendChannel, BackendClientConfig, ConnectionState, effective_timeout};
use crate::context::RequestContext;
use crate::error::ConnectionError;
use fluxor_common::UserServiceClient;
use fluxor_common::proto::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse, GetUserRequest,
    GetUserResponse, ListUsersRequest, ListUsersResponse, UpdateUserRequest, UpdateUserResponse,
};
use std::time::Duration;
use tonic::transport::Channel;

/// Client for the downstream user service.
pub struct UserBackend {
    channel: BackendChannel,
    call_timeout: Duration,
}

impl UserBackend {
    /// Connect to the user service, failing fast if the connection cannot
    /// become usable within the configured connect timeout.
    pub async fn connect(config: &BackendClientConfig) -> Result<Self, ConnectionError> {
        let channel = BackendChannel::connect(config).await?;
        Ok(Self {
            channel,
            call_timeout: config.call_timeout,
        })
    }

    fn client(&self) -> UserServiceClient<Channel> {
        UserServiceClient::new(self.channel.channel())
    }

    pub async fn state(&self) -> ConnectionState {
        self.channel.state().await
    }

    pub async fn close(&self) {
        self.channel.close().await;
    }

    pub async fn create_user(
        &self,
        context: &RequestContext,
        request: CreateUserRequest,
    ) -> Result<CreateUserResponse, ConnectionError> {
        self.channel.ensure_ready().await?;
        let timeout = effective_timeout(self.call_timeout, context.deadline());
        let result = tokio::time::timeout(timeout, self.client().create_user(request)).await;
        self.channel.finish_call("UserService/CreateUser", result).await
    }

    pub async fn get_user(
        &self,
        context: &RequestContext,
        request: GetUserRequest,
    ) -> Result<GetUserResponse, ConnectionError> {
        self.channel.ensure_ready().await?;
        let timeout = effective_timeout(self.call_timeout, context.deadline());
        let result = tokio::time::timeout(timeout, self.client().get_user(request)).await;
        self.channel.finish_call("UserService/GetUser", result).await
    }

    pub async fn update_user(
        &self,
        context: &RequestContext,
        request: UpdateUserRequest,
    ) -> Result<UpdateUserResponse, ConnectionError> {
        self.channel.ensure_ready().await?;
        let timeout = effective_timeout(self.call_timeout, context.deadline());
        let result = tokio::time::timeout(timeout, self.client().update_user(request)).await;
        self.channel.finish_call("UserService/UpdateUser", result).await
    }

    pub async fn delete_user(
        &self,
        context: &RequestContext,
        request: DeleteUserRequest,
    ) -> Result<DeleteUserResponse, ConnectionError> {
        self.channel.ensure_ready().await?;
        let timeout = effective_timeout(self.call_timeout, context.deadline());
        let result = tokio::time::timeout(timeout, self.client().delete_user(request)).await;
        self.channel.finish_call("UserService/DeleteUser", result).await
    }

    pub async fn list_users(
        &self,
        context: &RequestContext,
        request: ListUsersRequest,
    ) -> Result<ListUsersResponse, ConnectionError> {
        self.channel.ensure_ready().await?;
        let timeout = effective_timeout(self.call_timeout, context.deadline());
        let result = tokio::time::timeout(timeout, self.client().list_users(request)).await;
        self.channel.finish_call("UserService/ListUsers", result).await
    }
}

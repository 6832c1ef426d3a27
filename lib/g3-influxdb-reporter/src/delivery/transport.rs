/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::Context;
use async_trait::async_trait;
use http::{Request, Response};

use crate::config::HttpClientConfig;

/// Sends one http request and returns the full response.
///
/// Timeouts are the business of the implementation.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, req: Request<Vec<u8>>) -> anyhow::Result<Response<Vec<u8>>>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .context("failed to build http client")?;
        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, req: Request<Vec<u8>>) -> anyhow::Result<Response<Vec<u8>>> {
        let req = reqwest::Request::try_from(req).context("unsupported http request")?;
        let rsp = self
            .client
            .execute(req)
            .await
            .context("failed to send request")?;

        let status = rsp.status();
        let version = rsp.version();
        let body = rsp.bytes().await.context("failed to read response body")?;
        Response::builder()
            .status(status)
            .version(version)
            .body(body.to_vec())
            .context("invalid http response")
    }
}

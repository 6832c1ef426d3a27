/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use http::{HeaderMap, HeaderValue, Method, Request, Response, Uri, header};
use log::{debug, error, trace};

use crate::config::Settings;
use crate::encode::EncodedLines;

mod error;
pub use error::DeliveryError;

mod transport;
pub use transport::{HttpTransport, ReqwestTransport};

/// Posts encoded lines to the InfluxDB write api.
pub struct HttpDelivery {
    url: Uri,
    static_headers: HeaderMap,
    transport: Arc<dyn HttpTransport>,
}

impl HttpDelivery {
    pub fn new(settings: &Settings, transport: Arc<dyn HttpTransport>) -> Self {
        let mut static_headers = HeaderMap::new();
        static_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        static_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(v) = settings.authorization() {
            static_headers.insert(header::AUTHORIZATION, v.clone());
        }
        HttpDelivery {
            url: settings.url().clone(),
            static_headers,
            transport,
        }
    }

    fn build_request(&self, body: Vec<u8>) -> Result<Request<Vec<u8>>, http::Error> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.url.clone());
        for (name, value) in &self.static_headers {
            builder = builder.header(name, value.clone());
        }
        builder.body(body)
    }

    fn check_response(&self, rsp: Response<Vec<u8>>) -> Result<(), DeliveryError> {
        let status = rsp.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = String::from_utf8_lossy(rsp.body()).into_owned();
            Err(DeliveryError::ErrorResponse(status, detail))
        }
    }

    /// Send the body in a single POST request, without any retry.
    pub async fn send(&self, body: Vec<u8>) -> Result<(), DeliveryError> {
        let req = self.build_request(body)?;
        let rsp = self
            .transport
            .send(req)
            .await
            .map_err(DeliveryError::Transport)?;
        self.check_response(rsp)
    }

    /// Send the payload and log the outcome.
    ///
    /// The error is returned for inspection only, it has already been logged.
    pub async fn deliver(&self, payload: EncodedLines) -> Result<(), DeliveryError> {
        if payload.is_empty() {
            trace!("no metrics to post to {}", self.url);
            return Ok(());
        }

        let lines = payload.lines();
        match self.send(payload.into_bytes()).await {
            Ok(_) => {
                debug!("posted {lines} lines to {}", self.url);
                Ok(())
            }
            Err(e) => {
                error!("failed to post {lines} lines to {}: {e}", self.url);
                Err(e)
            }
        }
    }
}

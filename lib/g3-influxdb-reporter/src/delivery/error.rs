/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to build request: {0}")]
    InvalidRequest(#[from] http::Error),
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),
    #[error("error response: {0} {1}")]
    ErrorResponse(StatusCode, String),
}

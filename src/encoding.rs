// 🔤 Encoders - Turn a value into its final JSON bytes
//
// `axum::Json` is the framework default and is used directly by the routes.
// The wrappers here are the explicit alternatives being measured.

use crate::error::ApiError;
use crate::model::BusinessRecord;
use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// Which encoder produced a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    /// `serde_json` via `axum::Json`
    Framework,
    /// `serde_json::to_vec`, wrapped by hand
    SerdeJson,
    /// `sonic_rs::to_vec`
    Sonic,
    /// `BusinessRecord::to_json_bytes`
    Record,
}

impl Encoder {
    pub fn name(&self) -> &'static str {
        match self {
            Encoder::Framework => "axum-json",
            Encoder::SerdeJson => "serde_json",
            Encoder::Sonic => "sonic-rs",
            Encoder::Record => "record",
        }
    }
}

fn json_response(bytes: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response()
}

fn encode_failed(encoder: Encoder, err: impl std::fmt::Display) -> Response {
    ApiError::Internal(format!("{} encoder failed: {}", encoder.name(), err)).into_response()
}

// ============================================================================
// RESPONSE WRAPPERS
// ============================================================================

/// Explicit `serde_json` response, built outside the framework extractor
pub struct SerdeJson<T>(pub T);

impl<T: Serialize> SerdeJson<T> {
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.0)
    }
}

impl<T: Serialize> IntoResponse for SerdeJson<T> {
    fn into_response(self) -> Response {
        match self.encode() {
            Ok(bytes) => json_response(bytes),
            Err(e) => encode_failed(Encoder::SerdeJson, e),
        }
    }
}

/// Fast encoder response
pub struct SonicJson<T>(pub T);

impl<T: Serialize> SonicJson<T> {
    pub fn encode(&self) -> sonic_rs::Result<Vec<u8>> {
        sonic_rs::to_vec(&self.0)
    }
}

impl<T: Serialize> IntoResponse for SonicJson<T> {
    fn into_response(self) -> Response {
        match self.encode() {
            Ok(bytes) => json_response(bytes),
            Err(e) => encode_failed(Encoder::Sonic, e),
        }
    }
}

/// Typed record written by its own canonical encoder
pub struct RecordJson(pub Arc<BusinessRecord>);

impl IntoResponse for RecordJson {
    fn into_response(self) -> Response {
        match self.0.to_json_bytes() {
            Ok(bytes) => json_response(bytes),
            Err(e) => encode_failed(Encoder::Record, e),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

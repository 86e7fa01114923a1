//! Request Signature Verification
//!
//! Second, independent factor: the caller proves knowledge of the shared
//! signature key by sending `sha256_hex("{service}:{key}:{timestamp}")`.
//! Field order and the `:` delimiter are part of the wire contract.

use axum::http::HeaderMap;
use platform::crypto::{constant_time_eq, sha256_hex};

use crate::application::config::GateConfig;
use crate::error::{GateError, GateResult};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_AT_HEADER: &str = "x-request-at";
pub const SERVICE_NAME_HEADER: &str = "x-service-name";

/// Digest a caller must present for the given inputs
pub fn compute_signature(service_name: &str, signature_key: &str, request_at: &str) -> String {
    let input = format!("{}:{}:{}", service_name, signature_key, request_at);
    sha256_hex(input.as_bytes())
}

/// Signature inputs as sent by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHeaders<'a> {
    pub signature: &'a str,
    pub service_name: &'a str,
    pub request_at: &'a str,
}

impl<'a> SignatureHeaders<'a> {
    /// Read the three signature headers
    ///
    /// Only the signature itself is mandatory. An absent service name or
    /// timestamp enters the digest as an empty string, verbatim.
    pub fn from_headers(headers: &'a HeaderMap) -> GateResult<Self> {
        let signature = header_str(headers, API_KEY_HEADER)?.ok_or(GateError::MissingSignature)?;
        let service_name = header_str(headers, SERVICE_NAME_HEADER)?.unwrap_or_default();
        let request_at = header_str(headers, REQUEST_AT_HEADER)?.unwrap_or_default();

        Ok(Self {
            signature,
            service_name,
            request_at,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> GateResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|value| value.to_str().map_err(|_| GateError::InvalidHeader(name)))
        .transpose()
}

pub struct SignatureVerifier {
    signature_key: String,
}

impl SignatureVerifier {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            signature_key: config.signature_key.clone(),
        }
    }

    pub fn expected_signature(&self, service_name: &str, request_at: &str) -> String {
        compute_signature(service_name, &self.signature_key, request_at)
    }

    pub fn verify(&self, headers: &SignatureHeaders<'_>) -> GateResult<()> {
        let expected = self.expected_signature(headers.service_name, headers.request_at);
        if !constant_time_eq(expected.as_bytes(), headers.signature.as_bytes()) {
            return Err(GateError::SignatureMismatch);
        }

        tracing::debug!(service = %headers.service_name, "Request signature verified");
        Ok(())
    }

    /// Read the signature headers from `headers` and verify them
    pub fn verify_headers(&self, headers: &HeaderMap) -> GateResult<()> {
        self.verify(&SignatureHeaders::from_headers(headers)?)
    }
}

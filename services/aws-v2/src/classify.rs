// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;
use std::io::Read;

use bytes::Buf;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http::Method;
use http::StatusCode;
use log::debug;
use log::warn;
use querysign_core::FormRequest;

use crate::error_document::parse_error_document;

/// ErrorKind labels a failed response for callers to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credentials were rejected or lack permission.
    Unauthorized,
    /// The addressed resource does not exist.
    NotFound,
    /// The resource is in a state that conflicts with the request.
    Conflict,
    /// A quota or capacity limit was hit.
    InsufficientResources,
    /// The operation is not supported by this endpoint.
    Unsupported,
    /// An argument was rejected by the service.
    InvalidArgument,
    /// Anything else, tagged with the http status.
    Generic(u16),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unauthorized => write!(f, "Unauthorized"),
            ErrorKind::NotFound => write!(f, "NotFound"),
            ErrorKind::Conflict => write!(f, "Conflict"),
            ErrorKind::InsufficientResources => write!(f, "InsufficientResources"),
            ErrorKind::Unsupported => write!(f, "Unsupported"),
            ErrorKind::InvalidArgument => write!(f, "InvalidArgument"),
            ErrorKind::Generic(status) => write!(f, "Generic({status})"),
        }
    }
}

/// ClassifiedError is the terminal result of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({kind}, status: {http_status})")]
pub struct ClassifiedError {
    /// Status of the failed response.
    pub http_status: StatusCode,
    /// Error code reported by the service, if any.
    pub provider_code: Option<String>,
    /// Message reported by the service, or synthesized from the exchange.
    pub message: String,
    /// Label derived from status, code and message.
    pub kind: ErrorKind,
    /// Request id reported by the service, if any.
    pub request_id: Option<String>,
}

/// ErrorClassifier turns a failed response into a [`ClassifiedError`].
///
/// It only labels failures, retry is left to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify the response of `req`.
    ///
    /// The response body is always read to the end and dropped.
    pub fn classify<R: Read>(&self, req: &FormRequest, resp: http::Response<R>) -> ClassifiedError {
        let (parts, mut body) = resp.into_parts();

        let mut payload = Vec::new();
        if let Err(err) = body.read_to_end(&mut payload) {
            warn!("failed to read error response body, ignored: {err}");
            payload.clear();
        }
        drop(body);

        let mut code = None;
        let mut message = None;
        let mut request_id = None;
        if !payload.is_empty() {
            let document = if is_xml_like(&parts.headers) {
                parse_error_document(&payload)
            } else {
                None
            };

            match document {
                Some(doc) => {
                    code = doc.code;
                    message = doc.message;
                    request_id = doc.request_id;
                }
                None => {
                    let raw = String::from_utf8_lossy(&payload).trim().to_string();
                    if !raw.is_empty() {
                        message = Some(raw);
                    }
                }
            }
        }

        let message = message.unwrap_or_else(|| {
            format!(
                "command: {} {} failed with response: {:?} {}",
                req.method, req.uri, parts.version, parts.status
            )
        });
        let kind = error_kind(&req.method, parts.status, code.as_deref(), &message);
        debug!(
            "classified response {} of {} {} as {kind}, code: {code:?}",
            parts.status, req.method, req.uri
        );

        ClassifiedError {
            http_status: parts.status,
            provider_code: code,
            message,
            kind,
            request_id,
        }
    }
}

impl ErrorClassifier {
    /// Classify a response whose body is already buffered, like the one
    /// kept by [`RetryContext`](crate::RetryContext).
    pub fn classify_bytes(&self, req: &FormRequest, resp: http::Response<Bytes>) -> ClassifiedError {
        self.classify(req, resp.map(Buf::reader))
    }
}

/// Xml bodies and bodies of unknown type are worth a structured parse.
fn is_xml_like(headers: &HeaderMap) -> bool {
    match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        None => true,
        Some(v) => {
            let v = v.to_ascii_lowercase();
            v.contains("xml") || v.contains("unknown")
        }
    }
}

fn error_kind(method: &Method, status: StatusCode, code: Option<&str>, message: &str) -> ErrorKind {
    match status.as_u16() {
        400 => bad_request_kind(code.unwrap_or_default(), message),
        401 | 403 => ErrorKind::Unauthorized,
        // A missing resource on delete usually means it is already gone.
        404 if *method == Method::DELETE => ErrorKind::Generic(404),
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        v => ErrorKind::Generic(v),
    }
}

fn bad_request_kind(code: &str, message: &str) -> ErrorKind {
    if code == "UnsupportedOperation" {
        ErrorKind::Unsupported
    } else if code == "AddressLimitExceeded" {
        ErrorKind::InsufficientResources
    } else if code.contains("NotFound") || code.ends_with(".Unknown") {
        ErrorKind::NotFound
    } else if code == "IncorrectState"
        || code.ends_with(".Duplicate")
        || code.ends_with(".InUse")
        || message.contains("already exists")
        || message.contains("is in use")
    {
        ErrorKind::Conflict
    } else if code.contains("AuthFailure") {
        ErrorKind::Unauthorized
    } else if message.contains("Invalid id") || message.contains("Failed to bind") {
        ErrorKind::InvalidArgument
    } else {
        ErrorKind::Generic(400)
    }
}

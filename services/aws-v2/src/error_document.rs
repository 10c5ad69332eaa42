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

//! Extraction of `{code, message}` from query api error bodies.

use quick_xml::de;
use serde::Deserialize;

/// ErrorDocument is the structured part of a failed response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDocument {
    /// Provider error code, like `InvalidInstanceID.NotFound`.
    pub code: Option<String>,
    /// Human readable message.
    pub message: Option<String>,
    /// Endpoint hint carried by redirect responses.
    pub endpoint: Option<String>,
    /// Request id assigned by the service.
    pub request_id: Option<String>,
}

/// Parse an error body in any of the shapes query apis use:
///
/// ```xml
/// <Response><Errors><Error><Code/><Message/></Error></Errors><RequestID/></Response>
/// <ErrorResponse><Error><Type/><Code/><Message/></Error><RequestId/></ErrorResponse>
/// <Error><Code/><Message/><Endpoint/><RequestId/></Error>
/// ```
///
/// Returns `None` if the body is not xml or carries neither code, message
/// nor endpoint. Empty elements count as absent.
pub fn parse_error_document(body: &[u8]) -> Option<ErrorDocument> {
    let content = std::str::from_utf8(body).ok()?.trim_start();
    if !content.starts_with('<') {
        return None;
    }

    let raw: RawDocument = de::from_str(content).ok()?;

    let root_request_id = raw.request_id.or(raw.request_id_upper);
    let inner = raw
        .errors
        .and_then(|v| v.error.into_iter().next())
        .or(raw.error)
        .unwrap_or(RawError {
            code: raw.code,
            message: raw.message,
            endpoint: raw.endpoint,
            request_id: None,
        });

    let doc = ErrorDocument {
        code: non_empty(inner.code),
        message: non_empty(inner.message),
        endpoint: non_empty(inner.endpoint),
        request_id: non_empty(inner.request_id.or(root_request_id)),
    };
    if doc.code.is_none() && doc.message.is_none() && doc.endpoint.is_none() {
        return None;
    }
    Some(doc)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawDocument {
    code: Option<String>,
    message: Option<String>,
    endpoint: Option<String>,
    request_id: Option<String>,
    #[serde(rename = "RequestID")]
    request_id_upper: Option<String>,
    error: Option<RawError>,
    errors: Option<RawErrors>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawErrors {
    error: Vec<RawError>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawError {
    code: Option<String>,
    message: Option<String>,
    endpoint: Option<String>,
    request_id: Option<String>,
}

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

use std::mem;
use std::str::FromStr;

use bytes::Bytes;
use http::header;
use http::uri::Authority;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::{Error, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// FormRequest is an outgoing request whose parameters travel as a form body.
///
/// Parameters keep insertion order and hold one value per key once
/// [`FormRequest::set_param`] has been used for that key. The body is only
/// rebuilt from the parameters by the signer.
#[derive(Debug, Clone)]
pub struct FormRequest {
    /// HTTP method.
    pub method: Method,
    /// Endpoint uri, including scheme, authority and path.
    pub uri: Uri,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// Form parameters.
    pub params: Vec<(String, String)>,
    /// Encoded request body.
    pub body: Bytes,
}

impl FormRequest {
    /// Create an empty request for `method` and `uri`.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            params: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Build a form request from an http request.
    ///
    /// The body is parsed as `application/x-www-form-urlencoded` when the
    /// content type says so or is absent. Any other body is kept as is and
    /// contributes no parameters.
    pub fn from_http(req: http::Request<Bytes>) -> Result<Self> {
        let (parts, body) = req.into_parts();

        let is_form = match parts.headers.get(header::CONTENT_TYPE) {
            None => true,
            Some(v) => v.to_str()?.starts_with(FORM_CONTENT_TYPE),
        };
        let params = if is_form {
            form_urlencoded::parse(&body)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            params,
            body,
        })
    }

    /// Convert back into an http request ready for the transport.
    pub fn into_http(mut self) -> Result<http::Request<Bytes>> {
        let mut req = http::Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(self.body)?;
        mem::swap(req.headers_mut(), &mut self.headers);
        Ok(req)
    }

    /// Add a parameter, builder style.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(key, value);
        self
    }

    /// Get the first value of a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a parameter, replacing every existing value of `key`.
    ///
    /// The first occurrence keeps its position, later duplicates are dropped.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.params.iter().position(|(k, _)| *k == key) {
            Some(idx) => {
                self.params[idx].1 = value;
                let mut seen = 0usize;
                self.params.retain(|(k, _)| {
                    if *k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.params.push((key, value)),
        }
    }

    /// Remove every value of a parameter, returning the first one.
    pub fn remove_param(&mut self, key: &str) -> Option<String> {
        let first = self.param(key).map(|v| v.to_string());
        self.params.retain(|(k, _)| k != key);
        first
    }

    /// Get the `Host` header, if any.
    pub fn host_header(&self) -> Result<Option<&str>> {
        match self.headers.get(header::HOST) {
            Some(v) => Ok(Some(v.to_str()?)),
            None => Ok(None),
        }
    }

    /// Get the uri path, `/` if the uri has none.
    pub fn path(&self) -> &str {
        match self.uri.path() {
            "" => "/",
            v => v,
        }
    }

    /// Rewrite the host of the endpoint.
    ///
    /// Scheme, port, path and query are kept. A `Host` header, if present,
    /// follows the new authority.
    pub fn set_host(&mut self, host: &str) -> Result<()> {
        let authority = match self.uri.port_u16() {
            Some(port) => Authority::from_str(&format!("{host}:{port}"))?,
            None => Authority::from_str(host)?,
        };

        let mut parts = self.uri.clone().into_parts();
        if parts.scheme.is_none() {
            return Err(Error::request_invalid("request uri has no scheme")
                .with_context(format!("authority: {authority}")));
        }
        parts.authority = Some(authority.clone());
        self.uri = Uri::from_parts(parts)?;

        if self.headers.contains_key(header::HOST) {
            self.headers
                .insert(header::HOST, HeaderValue::from_str(authority.as_str())?);
        }
        Ok(())
    }
}

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

//! Filters applied to form requests before signing.

use http::header::HOST;
use http::HeaderValue;
use querysign_core::{Error, FilterRequest, FormRequest, Result};

use crate::constants::VERSION;

/// ApiVersion sets the `Version` parameter when the request has none.
#[derive(Debug, Clone)]
pub struct ApiVersion(String);

impl ApiVersion {
    /// Create a filter for the given api version, like `2009-08-15`.
    pub fn new(version: &str) -> Self {
        Self(version.to_string())
    }
}

impl FilterRequest for ApiVersion {
    fn filter(&self, req: &mut FormRequest) -> Result<()> {
        if req.param(VERSION).is_none() {
            req.set_param(VERSION, &self.0);
        }
        Ok(())
    }
}

/// HostHeader sets the `Host` header from the uri authority when absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostHeader;

impl FilterRequest for HostHeader {
    fn filter(&self, req: &mut FormRequest) -> Result<()> {
        if req.headers.contains_key(HOST) {
            return Ok(());
        }

        let authority = req.uri.authority().ok_or_else(|| {
            Error::request_invalid("request without authority is invalid for signing")
                .with_context(format!("uri: {}", req.uri))
        })?;
        let value = HeaderValue::from_str(authority.as_str())?;
        req.headers.insert(HOST, value);
        Ok(())
    }
}

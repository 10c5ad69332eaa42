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

use std::fmt::Write;
use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::HeaderValue;
use log::debug;
use querysign_core::hash::base64_hmac_sha256;
use querysign_core::time::{format_iso8601, now, DateTime};
use querysign_core::{Context, Error, FormRequest, Memoized, Result, SignRequest};

use crate::constants::*;
use crate::encode::{encode_for_signature, encode_for_wire};
use crate::{Config, Credential};

/// RequestSigner that implements AWS Signature Version 2 for form requests.
///
/// - [Signature Version 2 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-2.html)
///
/// The `Timestamp` is taken from a cache shared by every request signed with
/// this signer and refreshed once its window (one second by default) passes.
#[derive(Debug)]
pub struct RequestSigner {
    timestamp: Memoized<String>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new signer for AWS V2 form requests.
    pub fn new() -> Self {
        Self::with_clock(Duration::from_secs(1), now)
    }

    /// Create a new signer using the timestamp window from config.
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config.timestamp_ttl, now)
    }

    /// Create a new signer reading time from `clock`.
    ///
    /// `ttl` is how long a formatted timestamp is reused.
    pub fn with_clock(ttl: Duration, clock: impl Fn() -> DateTime + Send + Sync + 'static) -> Self {
        Self {
            timestamp: Memoized::new(ttl, move || format_iso8601(clock())),
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(time: DateTime) -> Self {
        Self::with_clock(Duration::MAX, move || time)
    }
}

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        _: &Context,
        req: &mut FormRequest,
        cred: &Self::Credential,
    ) -> Result<()> {
        // Signing the same request again must not carry stale values.
        req.remove_param(SIGNATURE);
        req.remove_param(SECURITY_TOKEN);

        if let Some(token) = cred.session_token.as_deref().filter(|_| cred.is_session()) {
            req.set_param(SECURITY_TOKEN, token);
        }
        req.set_param(SIGNATURE_METHOD, HMAC_SHA256);
        req.set_param(SIGNATURE_VERSION, SIGNATURE_VERSION_2);
        req.set_param(TIMESTAMP, self.timestamp.get());
        req.set_param(AWS_ACCESS_KEY_ID_PARAM, &cred.access_key_id);

        validate_params(req)?;

        let string_to_sign = string_to_sign(req)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signature =
            base64_hmac_sha256(cred.secret_access_key.as_bytes(), string_to_sign.as_bytes())
                .map_err(|e| e.with_context(format!("access_key_id: {}", cred.access_key_id)))?;
        req.set_param(SIGNATURE, signature);

        let body = encode_for_wire(&req.params);
        req.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        req.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        req.body = Bytes::from(body);

        Ok(())
    }
}

/// Every mandatory parameter must be present exactly once.
fn validate_params(req: &FormRequest) -> Result<()> {
    for key in MANDATORY_PARAMS {
        match req.params.iter().filter(|(k, _)| k == key).count() {
            0 => {
                return Err(Error::missing_parameter(format!(
                    "{key} is required for signing"
                ))
                .with_context(format!("uri: {}", req.uri)))
            }
            1 => {}
            n => {
                return Err(Error::request_invalid(format!(
                    "{key} must appear once, found {n} values"
                ))
                .with_context(format!("uri: {}", req.uri)))
            }
        }
    }

    Ok(())
}

/// StringToSign:
///
/// ```text
/// POST
/// ec2.amazonaws.com
/// /
/// AWSAccessKeyId=user&Action=DescribeImages&SignatureMethod=HmacSHA256&...
/// ```
fn string_to_sign(req: &FormRequest) -> Result<String> {
    let host = req.host_header()?.ok_or_else(|| {
        Error::request_invalid("request without Host header is invalid for signing")
            .with_context(format!("uri: {}", req.uri))
    })?;

    let mut f = String::with_capacity(256);
    writeln!(f, "{}", req.method)?;
    writeln!(f, "{}", host.to_lowercase())?;
    writeln!(f, "{}", req.path())?;
    write!(f, "{}", encode_for_signature(&req.params))?;

    Ok(f)
}

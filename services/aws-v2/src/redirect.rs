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

//! Retry decisions for redirect responses of query apis.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::LOCATION;
use http::uri::Authority;
use http::Method;
use http::StatusCode;
use http::Uri;
use log::debug;
use log::warn;
use querysign_core::{BackoffRetryPolicy, Error, FormRequest, Result, RetryPolicy};

use crate::error_document::parse_error_document;
use crate::Config;

/// RetryContext carries the state of one logical call across attempts.
///
/// It's owned by the caller and never shared between calls.
#[derive(Debug)]
pub struct RetryContext {
    request: FormRequest,
    response: Option<http::Response<Bytes>>,
    redirect_count: u32,
    failure_count: u32,
}

impl RetryContext {
    /// Start tracking a call for `request`.
    pub fn new(request: FormRequest) -> Self {
        Self {
            request,
            response: None,
            redirect_count: 0,
            failure_count: 0,
        }
    }

    /// The request to send next.
    pub fn request(&self) -> &FormRequest {
        &self.request
    }

    /// Mutable access to the request, mostly for re-signing.
    pub fn request_mut(&mut self) -> &mut FormRequest {
        &mut self.request
    }

    /// Consume the context and return the request.
    pub fn into_request(self) -> FormRequest {
        self.request
    }

    /// Record the response of the last attempt.
    pub fn set_response(&mut self, resp: http::Response<Bytes>) {
        self.response = Some(resp);
    }

    /// The response of the last attempt.
    pub fn response(&self) -> Option<&http::Response<Bytes>> {
        self.response.as_ref()
    }

    /// Take the response of the last attempt, for example to classify it.
    pub fn take_response(&mut self) -> Option<http::Response<Bytes>> {
        self.response.take()
    }

    /// Redirects followed so far.
    pub fn redirect_count(&self) -> u32 {
        self.redirect_count
    }

    /// Backoff retries scheduled so far.
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }
}

/// RedirectDecision tells the caller what to do with the last response.
///
/// Every retry decision requires signing the request again before it is
/// resent: the method or host may have changed, and the `Timestamp` must be
/// fresh for each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Re-sign and resend the request, which has been adjusted in place, to the same host.
    RetrySameHost,
    /// Re-sign and resend the request, its host has been rewritten.
    RetryNewHost,
    /// Wait for the delay, then re-sign and resend the request.
    RetryBackoff(Duration),
    /// Stop retrying and surface the last response.
    GiveUp,
}

/// RedirectRetryHandler decides how to follow redirect responses that carry
/// no `Location` but may point to another endpoint in the error body.
///
/// The handler never sleeps or sends anything. It adjusts the request held by
/// [`RetryContext`] and returns a [`RedirectDecision`] for the caller to act on.
#[derive(Debug, Clone)]
pub struct RedirectRetryHandler {
    max_redirects: u32,
    backoff: BackoffRetryPolicy,
    fallback: Arc<dyn RetryPolicy>,
}

impl Default for RedirectRetryHandler {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RedirectRetryHandler {
    /// Create a handler from config.
    ///
    /// Responses that are not redirects fall back to the configured backoff,
    /// which retries server errors and throttling only.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_redirects: config.max_redirects,
            backoff: config.backoff,
            fallback: Arc::new(config.backoff),
        }
    }

    /// Replace the policy used for responses that are not redirects.
    pub fn with_fallback(mut self, policy: impl RetryPolicy) -> Self {
        self.fallback = Arc::new(policy);
        self
    }

    /// Decide what to do with the response recorded in `ctx`.
    ///
    /// Returns an error once more than `max_redirects` redirects have been
    /// followed within the call.
    pub fn should_retry_redirect(&self, ctx: &mut RetryContext) -> Result<RedirectDecision> {
        let Some(resp) = ctx.response.as_ref() else {
            return Ok(RedirectDecision::GiveUp);
        };
        let status = resp.status();

        let is_redirect =
            status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::TEMPORARY_REDIRECT;
        if !is_redirect || resp.headers().contains_key(LOCATION) {
            return Ok(self.fallback(ctx, status));
        }

        if ctx.request.method == Method::HEAD {
            debug!("redirect {status} without location for HEAD, retry as GET");
            ctx.request.method = Method::GET;
            return Ok(RedirectDecision::RetrySameHost);
        }

        ctx.redirect_count += 1;
        if ctx.redirect_count > self.max_redirects {
            return Err(Error::redirect_limit_exceeded(format!(
                "followed more than {} redirects",
                self.max_redirects
            ))
            .with_context(format!("uri: {}", ctx.request.uri)));
        }

        let Some(endpoint) = parse_error_document(resp.body())
            .and_then(|doc| doc.endpoint)
            .and_then(|v| endpoint_host(&v))
        else {
            warn!("redirect {status} carries no endpoint, give up");
            return Ok(RedirectDecision::GiveUp);
        };

        let current = ctx.request.uri.host().unwrap_or_default();
        if endpoint.eq_ignore_ascii_case(current) {
            ctx.failure_count += 1;
            return Ok(match self.backoff.delay(ctx.failure_count) {
                Some(delay) => {
                    debug!("redirect {status} points to current host {current}, retry after {delay:?}");
                    RedirectDecision::RetryBackoff(delay)
                }
                None => {
                    warn!("redirect {status} points to current host {current}, retries exhausted");
                    RedirectDecision::GiveUp
                }
            });
        }

        debug!("redirect {status} from {current} to {endpoint}");
        ctx.request.set_host(&endpoint)?;
        Ok(RedirectDecision::RetryNewHost)
    }

    fn fallback(&self, ctx: &mut RetryContext, status: StatusCode) -> RedirectDecision {
        match self.fallback.retry_delay(status, ctx.failure_count + 1) {
            Some(delay) => {
                ctx.failure_count += 1;
                debug!(
                    "response {status} retried after {delay:?}, attempt {}",
                    ctx.failure_count
                );
                RedirectDecision::RetryBackoff(delay)
            }
            None => RedirectDecision::GiveUp,
        }
    }
}

/// The endpoint hint is usually a bare host, but may carry a port or be a
/// full url. Only the host is taken, the request keeps its own port.
fn endpoint_host(endpoint: &str) -> Option<String> {
    let host = if endpoint.contains("://") {
        endpoint.parse::<Uri>().ok()?.host()?.to_string()
    } else {
        endpoint.parse::<Authority>().ok()?.host().to_string()
    };
    Some(host)
}

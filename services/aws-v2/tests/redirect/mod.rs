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

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use chrono::TimeZone;
use chrono::Utc;
use http::Method;
use pretty_assertions::assert_eq;
use querysign_aws_v2::{
    ApiVersion, ClassifiedError, Config, ErrorClassifier, ErrorKind, HostHeader,
    RedirectDecision, RedirectRetryHandler, RequestSigner, RetryContext,
    StaticCredentialProvider,
};
use querysign_core::{Context, FormRequest, Signer};

use crate::{describe_images, describe_images_with_host, init_test_logger};

fn redirect_to(endpoint: &str) -> http::Response<Bytes> {
    http::Response::builder()
        .status(301)
        .header("content-type", "application/xml")
        .body(Bytes::from(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>PermanentRedirect</Code><Message>Use the specified endpoint.</Message><Endpoint>{endpoint}</Endpoint><RequestId>A1B2</RequestId></Error>"#
        )))
        .unwrap()
}

fn status(code: u16) -> http::Response<Bytes> {
    http::Response::builder()
        .status(code)
        .body(Bytes::new())
        .unwrap()
}

#[test]
fn test_redirect_rewrites_host() {
    init_test_logger();

    let req = describe_images_with_host("https://ec2.amazonaws.com:8443/path/?dry=1");
    let mut ctx = RetryContext::new(req);
    ctx.set_response(redirect_to("ec2.eu-west-1.amazonaws.com"));

    let decision = RedirectRetryHandler::default()
        .should_retry_redirect(&mut ctx)
        .unwrap();

    assert_eq!(decision, RedirectDecision::RetryNewHost);
    assert_eq!(ctx.redirect_count(), 1);
    assert_eq!(
        ctx.request().uri.to_string(),
        "https://ec2.eu-west-1.amazonaws.com:8443/path/?dry=1"
    );
    assert_eq!(
        ctx.request().headers["host"],
        "ec2.eu-west-1.amazonaws.com:8443"
    );
}

#[test]
fn test_redirect_to_same_host_backs_off() {
    let req = describe_images_with_host("https://ec2.amazonaws.com/");
    let mut ctx = RetryContext::new(req);
    ctx.set_response(redirect_to("ec2.amazonaws.com"));

    let decision = RedirectRetryHandler::default()
        .should_retry_redirect(&mut ctx)
        .unwrap();

    assert_eq!(
        decision,
        RedirectDecision::RetryBackoff(Duration::from_millis(50))
    );
    assert_eq!(ctx.request().uri.host(), Some("ec2.amazonaws.com"));
}

#[test]
fn test_head_without_location_flips_to_get() {
    let req = FormRequest::new(
        Method::HEAD,
        "https://bucket.s3.amazonaws.com/key".parse().unwrap(),
    );
    let mut ctx = RetryContext::new(req);
    ctx.set_response(status(307));

    let decision = RedirectRetryHandler::default()
        .should_retry_redirect(&mut ctx)
        .unwrap();

    assert_eq!(decision, RedirectDecision::RetrySameHost);
    assert_eq!(ctx.request().method, Method::GET);
    assert_eq!(ctx.redirect_count(), 0);
}

#[test]
fn test_redirect_without_endpoint_gives_up() {
    let req = describe_images_with_host("https://ec2.amazonaws.com/");
    let mut ctx = RetryContext::new(req);
    ctx.set_response(status(301));

    let decision = RedirectRetryHandler::default()
        .should_retry_redirect(&mut ctx)
        .unwrap();

    assert_eq!(decision, RedirectDecision::GiveUp);
    assert_eq!(ctx.redirect_count(), 1);
}

#[test]
fn test_redirect_limit_exceeded() {
    let config = Config {
        max_redirects: 2,
        ..Default::default()
    };
    let handler = RedirectRetryHandler::from_config(&config);
    let req = describe_images_with_host("https://a.example.com/");
    let mut ctx = RetryContext::new(req);

    for host in ["b.example.com", "a.example.com"] {
        ctx.set_response(redirect_to(host));
        assert_eq!(
            handler.should_retry_redirect(&mut ctx).unwrap(),
            RedirectDecision::RetryNewHost
        );
    }

    ctx.set_response(redirect_to("b.example.com"));
    let err = handler.should_retry_redirect(&mut ctx).unwrap_err();
    assert_eq!(
        err.kind(),
        querysign_core::ErrorKind::RedirectLimitExceeded
    );
    assert_eq!(ctx.redirect_count(), 3);
}

/// Outcome of a full call against [`FakeTransport`].
#[derive(Debug)]
struct Outcome {
    result: Result<http::Response<Bytes>, ClassifiedError>,
    methods: Vec<Method>,
    signatures: Vec<Option<String>>,
    hosts: Vec<String>,
    waited: Vec<Duration>,
}

/// FakeTransport answers with canned responses and records what it was sent.
struct FakeTransport {
    responses: VecDeque<http::Response<Bytes>>,
}

impl FakeTransport {
    fn new(responses: impl IntoIterator<Item = http::Response<Bytes>>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
        }
    }

    fn send(&mut self, req: &FormRequest) -> http::Response<Bytes> {
        assert!(req.param("Signature").is_some(), "request must be signed");
        self.responses.pop_front().expect("transport ran out of responses")
    }

    /// Drive one call the way an http client would.
    fn call(&mut self, req: FormRequest) -> querysign_core::Result<Outcome> {
        let signer = Signer::new(
            Context::new(),
            StaticCredentialProvider::new("user", "key"),
            RequestSigner::with_time(Utc.with_ymd_and_hms(2009, 11, 8, 15, 54, 8).unwrap()),
        )
        .with_filter(HostHeader)
        .with_filter(ApiVersion::new("2009-08-15"));
        let handler = RedirectRetryHandler::default();

        let mut hosts = Vec::new();
        let mut methods = Vec::new();
        let mut waited = Vec::new();
        let mut ctx = RetryContext::new(req);
        signer.sign(ctx.request_mut())?;
        let mut signatures = vec![ctx.request().param("Signature").map(str::to_string)];

        loop {
            hosts.push(ctx.request().uri.host().unwrap_or_default().to_string());
            methods.push(ctx.request().method.clone());
            let resp = self.send(ctx.request());
            if resp.status().is_success() {
                return Ok(Outcome {
                    result: Ok(resp),
                    methods,
                    signatures,
                    hosts,
                    waited,
                });
            }

            ctx.set_response(resp);
            match handler.should_retry_redirect(&mut ctx)? {
                RedirectDecision::RetrySameHost | RedirectDecision::RetryNewHost => {}
                RedirectDecision::RetryBackoff(delay) => waited.push(delay),
                RedirectDecision::GiveUp => {
                    let resp = ctx.take_response().expect("response must be recorded");
                    let err = ErrorClassifier::new().classify_bytes(ctx.request(), resp);
                    return Ok(Outcome {
                        result: Err(err),
                        methods,
                        signatures,
                        hosts,
                        waited,
                    });
                }
            }
            signer.sign(ctx.request_mut())?;
            signatures.push(ctx.request().param("Signature").map(str::to_string));
        }
    }
}

#[test]
fn test_call_follows_redirect_and_resigns() {
    init_test_logger();

    let mut transport = FakeTransport::new([
        redirect_to("ec2.eu-west-1.amazonaws.com"),
        status(200),
    ]);
    let outcome = transport
        .call(describe_images("https://ec2.amazonaws.com/"))
        .unwrap();

    assert!(outcome.result.is_ok());
    assert_eq!(
        outcome.hosts,
        vec!["ec2.amazonaws.com", "ec2.eu-west-1.amazonaws.com"]
    );
    assert_ne!(outcome.signatures[0], outcome.signatures[1]);
    assert!(outcome.waited.is_empty());
}

#[test]
fn test_call_backs_off_then_succeeds() {
    let mut transport = FakeTransport::new([status(503), status(503), status(200)]);
    let outcome = transport
        .call(describe_images("https://ec2.amazonaws.com/"))
        .unwrap();

    assert!(outcome.result.is_ok());
    assert_eq!(
        outcome.waited,
        vec![Duration::from_millis(50), Duration::from_millis(100)]
    );
}

#[test]
fn test_call_gives_up_with_classified_error() {
    let mut transport = FakeTransport::new([http::Response::builder()
        .status(400)
        .header("content-type", "text/xml")
        .body(Bytes::from_static(
            b"<Response><Errors><Error><Code>InvalidAMIID.NotFound</Code><Message>The image id '[ami-1]' does not exist</Message></Error></Errors><RequestID>r-1</RequestID></Response>",
        ))
        .unwrap()]);
    let outcome = transport
        .call(describe_images("https://ec2.amazonaws.com/"))
        .unwrap();

    let err = outcome.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.provider_code.as_deref(), Some("InvalidAMIID.NotFound"));
    assert_eq!(err.request_id.as_deref(), Some("r-1"));
}

#[test]
fn test_call_resigns_after_head_flip() {
    init_test_logger();

    let mut req = describe_images("https://bucket.s3.amazonaws.com/key");
    req.method = Method::HEAD;
    let mut transport = FakeTransport::new([status(307), status(200)]);
    let outcome = transport.call(req).unwrap();

    assert!(outcome.result.is_ok());
    assert_eq!(outcome.methods, vec![Method::HEAD, Method::GET]);
    assert_eq!(outcome.signatures.len(), 2);
    assert_ne!(outcome.signatures[0], outcome.signatures[1]);
}

#[test]
fn test_flipped_request_signature_changes_after_resign() {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new("user", "key"),
        RequestSigner::with_time(Utc.with_ymd_and_hms(2009, 11, 8, 15, 54, 8).unwrap()),
    );
    let mut req = describe_images_with_host("https://bucket.s3.amazonaws.com/key");
    req.method = Method::HEAD;
    signer.sign(&mut req).unwrap();
    let head_signature = req.param("Signature").map(str::to_string);

    let mut ctx = RetryContext::new(req);
    ctx.set_response(status(307));
    let decision = RedirectRetryHandler::default()
        .should_retry_redirect(&mut ctx)
        .unwrap();
    assert_eq!(decision, RedirectDecision::RetrySameHost);

    signer.sign(ctx.request_mut()).unwrap();
    assert_eq!(ctx.request().method, Method::GET);
    assert_ne!(
        ctx.request().param("Signature").map(str::to_string),
        head_signature
    );
}

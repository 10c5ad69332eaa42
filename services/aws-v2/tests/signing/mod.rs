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

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use chrono::Utc;
use pretty_assertions::assert_eq;
use querysign_aws_v2::{
    ApiVersion, Config, Credential, DefaultCredentialProvider, HostHeader, RequestSigner,
    StaticCredentialProvider,
};
use querysign_core::{Context, ErrorKind, SignRequest, Signer, StaticEnv};

use crate::{describe_images, describe_images_with_host, init_test_logger};

fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2009, 11, 8, 15, 54, 8).unwrap()
}

#[test]
fn test_signing_is_deterministic() {
    init_test_logger();

    let cred = Credential::new("user", "key");
    let mut first = describe_images_with_host("https://ec2.amazonaws.com/");
    let mut second = describe_images_with_host("https://ec2.amazonaws.com/");

    RequestSigner::with_time(fixed_time())
        .sign_request(&Context::new(), &mut first, &cred)
        .unwrap();
    RequestSigner::with_time(fixed_time())
        .sign_request(&Context::new(), &mut second, &cred)
        .unwrap();

    assert_eq!(first.body, second.body);
    assert_eq!(first.param("Signature"), second.param("Signature"));
}

#[test]
fn test_timestamp_refreshes_after_window() {
    init_test_logger();

    let seconds = Arc::new(AtomicI64::new(fixed_time().timestamp()));
    let clock = {
        let seconds = seconds.clone();
        move || {
            Utc.timestamp_opt(seconds.fetch_add(1, Ordering::SeqCst), 0)
                .unwrap()
        }
    };
    let signer = RequestSigner::with_clock(Duration::ZERO, clock);
    let cred = Credential::new("user", "key");

    let mut first = describe_images_with_host("https://ec2.amazonaws.com/");
    let mut second = describe_images_with_host("https://ec2.amazonaws.com/");
    signer
        .sign_request(&Context::new(), &mut first, &cred)
        .unwrap();
    signer
        .sign_request(&Context::new(), &mut second, &cred)
        .unwrap();

    assert_eq!(first.param("Timestamp"), Some("2009-11-08T15:54:08Z"));
    assert_eq!(second.param("Timestamp"), Some("2009-11-08T15:54:09Z"));
    assert_ne!(first.param("Signature"), second.param("Signature"));
}

#[test]
fn test_timestamp_is_reused_within_window() {
    let seconds = Arc::new(AtomicI64::new(fixed_time().timestamp()));
    let clock = {
        let seconds = seconds.clone();
        move || {
            Utc.timestamp_opt(seconds.fetch_add(1, Ordering::SeqCst), 0)
                .unwrap()
        }
    };
    let signer = RequestSigner::with_clock(Duration::from_secs(3600), clock);
    let cred = Credential::new("user", "key");

    let mut first = describe_images_with_host("https://ec2.amazonaws.com/");
    let mut second = describe_images_with_host("https://ec2.amazonaws.com/");
    signer
        .sign_request(&Context::new(), &mut first, &cred)
        .unwrap();
    signer
        .sign_request(&Context::new(), &mut second, &cred)
        .unwrap();

    assert_eq!(first.param("Timestamp"), second.param("Timestamp"));
    assert_eq!(first.body, second.body);
}

#[test]
fn test_session_token_changes_signature() {
    let signer = RequestSigner::with_time(fixed_time());
    let plain = Credential::new("user", "key");
    let session = Credential::new("user", "key").with_session_token("session/token");

    let mut a = describe_images_with_host("https://ec2.amazonaws.com/");
    let mut b = describe_images_with_host("https://ec2.amazonaws.com/");
    signer.sign_request(&Context::new(), &mut a, &plain).unwrap();
    signer
        .sign_request(&Context::new(), &mut b, &session)
        .unwrap();

    assert_eq!(a.param("SecurityToken"), None);
    assert_eq!(b.param("SecurityToken"), Some("session/token"));
    assert_ne!(a.param("Signature"), b.param("Signature"));

    // The token travels unescaped on the wire.
    let body = String::from_utf8(b.body.to_vec()).unwrap();
    assert!(body.contains("&SecurityToken=session/token&"));
}

#[test]
fn test_signer_runs_filters() {
    init_test_logger();

    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new("user", "key"),
        RequestSigner::with_time(fixed_time()),
    )
    .with_filter(HostHeader)
    .with_filter(ApiVersion::new("2009-08-15"));

    let mut req = describe_images("https://ec2.amazonaws.com/");
    signer.sign(&mut req).unwrap();

    assert_eq!(req.headers["host"], "ec2.amazonaws.com");
    assert_eq!(req.param("Version"), Some("2009-08-15"));
    assert_eq!(
        req.param("Signature"),
        Some("ftYMUviuZH21TgmIT839e2luc8BJF34X2+iYDc8ayyY=")
    );
}

#[test]
fn test_signer_without_version_fails() {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new("user", "key"),
        RequestSigner::with_time(fixed_time()),
    )
    .with_filter(HostHeader);

    let mut req = describe_images("https://ec2.amazonaws.com/");
    let err = signer.sign(&mut req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingParameter);
}

#[test]
fn test_signer_loads_credential_from_env() {
    let ctx = Context::new().with_env(StaticEnv::from_pairs([
        ("AWS_ACCESS_KEY_ID", "user"),
        ("AWS_SECRET_ACCESS_KEY", "key"),
    ]));
    let loader = DefaultCredentialProvider::new(Arc::new(Config::default()));
    let signer = Signer::new(ctx, loader, RequestSigner::with_time(fixed_time()));

    let mut req = describe_images_with_host("https://ec2.amazonaws.com/");
    signer.sign(&mut req).unwrap();
    assert_eq!(req.param("AWSAccessKeyId"), Some("user"));
}

#[test]
fn test_signer_without_credential_fails() {
    let loader = DefaultCredentialProvider::new(Arc::new(Config::default()));
    let signer = Signer::new(
        Context::new(),
        loader,
        RequestSigner::with_time(fixed_time()),
    );

    let mut req = describe_images_with_host("https://ec2.amazonaws.com/");
    let err = signer.sign(&mut req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert_eq!(req.param("Signature"), None);
}

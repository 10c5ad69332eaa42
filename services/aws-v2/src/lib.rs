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

//! AWS Signature Version 2 for query-style apis.
//!
//! This crate signs form requests (EC2, IAM, SQS style `Action=...` calls)
//! with Signature Version 2, decides how to follow the redirects those apis
//! answer with, and classifies failed responses into typed errors.
//!
//! ## Quick Start
//!
//! ```
//! use querysign_aws_v2::{ApiVersion, Config, DefaultCredentialProvider, HostHeader, RequestSigner};
//! use querysign_core::{Context, FormRequest, Result, Signer};
//!
//! fn main() -> Result<()> {
//!     let ctx = Context::new();
//!
//!     let config = Config {
//!         access_key_id: Some("your-access-key-id".to_string()),
//!         secret_access_key: Some("your-secret-access-key".to_string()),
//!         ..Default::default()
//!     };
//!     let builder = RequestSigner::from_config(&config);
//!     let loader = DefaultCredentialProvider::new(config.into());
//!
//!     let signer = Signer::new(ctx, loader, builder)
//!         .with_filter(HostHeader)
//!         .with_filter(ApiVersion::new("2009-08-15"));
//!
//!     let mut req = FormRequest::new(
//!         http::Method::POST,
//!         "https://ec2.amazonaws.com/".parse()?,
//!     )
//!     .with_param("Action", "DescribeImages");
//!
//!     signer.sign(&mut req)?;
//!     assert!(req.param("Signature").is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Credential Sources
//!
//! [`DefaultCredentialProvider`] tries the [`Config`] first, then the
//! environment:
//!
//! ```bash
//! export AWS_ACCESS_KEY_ID=your-access-key-id
//! export AWS_SECRET_ACCESS_KEY=your-secret-access-key
//! export AWS_SESSION_TOKEN=your-session-token  # Optional
//! ```
//!
//! ## Failures
//!
//! - [`RedirectRetryHandler`] turns redirect responses into a [`RedirectDecision`].
//! - [`ErrorClassifier`] turns a terminal response into a [`ClassifiedError`].

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

pub mod encode;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;

mod filter;
pub use filter::{ApiVersion, HostHeader};

mod error_document;
pub use error_document::{parse_error_document, ErrorDocument};

mod classify;
pub use classify::{ClassifiedError, ErrorClassifier, ErrorKind};

mod redirect;
pub use redirect::{RedirectDecision, RedirectRetryHandler, RetryContext};

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

//! Core components for signing query-style API requests.
//!
//! This crate provides the foundational types and traits shared by the
//! querysign service crates.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds the environment implementation used by credential providers
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`), request
//!   signing (`SignRequest`) and pre-sign request transforms (`FilterRequest`)
//! - **Signer**: The orchestrator that runs the filter chain, loads credentials and signs
//! - **FormRequest**: The mutable request model: method, uri, headers and form parameters
//!
//! ## Example
//!
//! ```
//! use querysign_core::{Context, FormRequest, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential { key: "my-key".to_string() }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyBuilder;
//!
//! impl SignRequest for MyBuilder {
//!     type Credential = MyCredential;
//!
//!     fn sign_request(
//!         &self,
//!         _: &Context,
//!         req: &mut FormRequest,
//!         cred: &Self::Credential,
//!     ) -> Result<()> {
//!         req.set_param("Key", &cred.key);
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyLoader, MyBuilder);
//!
//! let mut req = FormRequest::new(http::Method::POST, "https://example.com/".parse()?);
//! signer.sign(&mut req)?;
//! assert_eq!(req.param("Key"), Some("my-key"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: HMAC and base64 helpers
//! - [`time`]: Timestamp helpers
//! - [`utils`]: Redaction of secrets in debug output
//! - [`Memoized`]: A value cache that refreshes after a time window
//! - [`BackoffRetryPolicy`]: Bounded backoff used by retry handlers

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{Context, Env, OsEnv, StaticEnv};

mod api;
pub use api::{FilterRequest, ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::FormRequest;
mod signer;
pub use signer::Signer;

mod memoize;
pub use memoize::Memoized;
mod retry;
pub use retry::{BackoffRetryPolicy, RetryPolicy};

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

use std::time::Duration;

use log::warn;
use querysign_core::{BackoffRetryPolicy, Context};

use crate::constants::*;

/// Config for query-style aws services.
///
/// Everything here is injected by the caller. Use [`Config::from_env`] to
/// fill unset credentials and the retry budget from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_SESSION_TOKEN`]
    pub session_token: Option<String>,

    /// Maximum number of redirects followed within one call.
    ///
    /// Default to `5`.
    pub max_redirects: u32,
    /// Backoff used for the same-host redirect quirk and for server errors.
    ///
    /// `max_retries` will be loaded from env value [`AWS_MAX_ATTEMPTS`]
    /// (attempts minus the first try) when set.
    pub backoff: BackoffRetryPolicy,
    /// How long a computed `Timestamp` is reused across requests.
    ///
    /// Default to one second.
    pub timestamp_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            max_redirects: 5,
            backoff: BackoffRetryPolicy::default(),
            timestamp_ttl: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.access_key_id.is_none() {
            self.access_key_id = envs.get(AWS_ACCESS_KEY_ID).cloned();
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key = envs.get(AWS_SECRET_ACCESS_KEY).cloned();
        }
        if self.session_token.is_none() {
            self.session_token = envs.get(AWS_SESSION_TOKEN).cloned();
        }
        if let Some(v) = envs.get(AWS_MAX_ATTEMPTS) {
            match v.parse::<u32>() {
                Ok(attempts) if attempts > 0 => self.backoff.max_retries = attempts - 1,
                _ => warn!("ignoring invalid {AWS_MAX_ATTEMPTS} value: {v}"),
            }
        }

        self
    }
}

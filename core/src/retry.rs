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

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use http::StatusCode;
use std::fmt::Debug;
use std::time::Duration;

/// RetryPolicy decides whether a failed response is worth another attempt.
///
/// `attempt` is 1-based: the number of the retry that would be scheduled.
/// Returning `None` means give up. Policies never sleep, the caller waits for
/// the returned delay.
pub trait RetryPolicy: Debug + Send + Sync + 'static {
    /// Get the delay before retry number `attempt`, or `None` to give up.
    fn retry_delay(&self, status: StatusCode, attempt: u32) -> Option<Duration>;
}

/// `()` never retries.
impl RetryPolicy for () {
    fn retry_delay(&self, _: StatusCode, _: u32) -> Option<Duration> {
        None
    }
}

/// BackoffRetryPolicy is a bounded exponential backoff without jitter:
/// `initial_interval * multiplier^(attempt - 1)`, capped at `max_interval`,
/// for at most `max_retries` attempts.
///
/// A `multiplier` of `1.0` gives a constant delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffRetryPolicy {
    /// Maximum number of retries before giving up.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Growth factor applied after every retry.
    pub multiplier: f64,
    /// Upper bound of a single delay.
    pub max_interval: Duration,
}

impl Default for BackoffRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_interval: Duration::from_millis(50),
            multiplier: 2.0,
            max_interval: Duration::from_secs(30),
        }
    }
}

impl BackoffRetryPolicy {
    /// Get the delay for retry number `attempt` regardless of the failure.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }

        let mut backoff = self.create_backoff();
        let mut delay = None;
        for _ in 0..attempt {
            delay = backoff.next_backoff();
        }
        delay.map(|v| v.min(self.max_interval))
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            multiplier: self.multiplier,
            randomization_factor: 0.0,
            // Attempts are bounded by `max_retries` instead.
            max_elapsed_time: None,
            ..Default::default()
        };
        backoff.reset();
        backoff
    }
}

/// As a general policy only server errors and throttling are retried.
impl RetryPolicy for BackoffRetryPolicy {
    fn retry_delay(&self, status: StatusCode, attempt: u32) -> Option<Duration> {
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            self.delay(attempt)
        } else {
            None
        }
    }
}

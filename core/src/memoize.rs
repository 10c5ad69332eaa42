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

use std::fmt::{self, Debug};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Memoized caches the output of a supplier for a bounded time window.
///
/// The value is computed lazily on the first [`Memoized::get`] and reused
/// until `ttl` has elapsed. The first reader that observes expiry recomputes
/// it while holding the lock, so concurrent readers either see the old value
/// or wait for the new one. A cached value is always replaced whole.
///
/// A zero `ttl` recomputes on every read.
pub struct Memoized<T> {
    ttl: Duration,
    supplier: Box<dyn Fn() -> T + Send + Sync>,
    state: Mutex<Option<Entry<T>>>,
}

struct Entry<T> {
    value: T,
    // `None` means the entry never expires.
    expires_at: Option<Instant>,
}

impl<T: Clone> Memoized<T> {
    /// Create a new memoized supplier.
    pub fn new(ttl: Duration, supplier: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            ttl,
            supplier: Box::new(supplier),
            state: Mutex::new(None),
        }
    }

    /// Get the cached value, refreshing it if the window has passed.
    pub fn get(&self) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        if let Some(entry) = state.as_ref() {
            if entry.expires_at.map_or(true, |at| now < at) {
                return entry.value.clone();
            }
        }

        let value = (self.supplier)();
        *state = Some(Entry {
            value: value.clone(),
            expires_at: now.checked_add(self.ttl),
        });
        value
    }
}

impl<T> Debug for Memoized<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized").field("ttl", &self.ttl).finish()
    }
}

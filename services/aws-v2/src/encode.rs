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

//! Canonical encoding of form parameters.
//!
//! The same parameter set is serialized twice: once for the body sent on the
//! wire and once as input of the string to sign. The two differ in order and
//! in escaping, and the server checks the signature against the strict form.

use crate::constants::{ACTION, AWS_ACCESS_KEY_ID_PARAM, SIGNATURE_ENCODE_SET, WIRE_ENCODE_SET};
use percent_encoding::{utf8_percent_encode, AsciiSet};

/// Encode parameters for the request body.
///
/// `Action` comes first, `AWSAccessKeyId` last and every other key sits in
/// between in ascending order. `/` and `?` are left unescaped.
///
/// ```shell
/// [(Version, 1), (AWSAccessKeyId, ak), (Action, Run)] => "Action=Run&Version=1&AWSAccessKeyId=ak"
/// ```
pub fn encode_for_wire(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    // Stable sort, so duplicated keys keep their insertion order.
    sorted.sort_by(|(a, _), (b, _)| (wire_rank(a), a).cmp(&(wire_rank(b), b)));

    join(sorted, &WIRE_ENCODE_SET)
}

/// Encode parameters for the string to sign.
///
/// Keys are sorted in ascending byte order without special cases, and `/`
/// and `?` are escaped as well.
pub fn encode_for_signature(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    join(sorted, &SIGNATURE_ENCODE_SET)
}

fn wire_rank(key: &str) -> u8 {
    match key {
        ACTION => 0,
        AWS_ACCESS_KEY_ID_PARAM => 2,
        _ => 1,
    }
}

fn join(params: Vec<&(String, String)>, set: &'static AsciiSet) -> String {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut s = String::with_capacity(256);

    for (idx, (k, v)) in params.into_iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.extend(utf8_percent_encode(k, set));
        s.push('=');
        s.extend(utf8_percent_encode(v, set));
    }

    s
}

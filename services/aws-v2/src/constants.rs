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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Parameters used in query-style aws services.
pub const ACTION: &str = "Action";
pub const VERSION: &str = "Version";
pub const SIGNATURE_METHOD: &str = "SignatureMethod";
pub const SIGNATURE_VERSION: &str = "SignatureVersion";
pub const TIMESTAMP: &str = "Timestamp";
pub const AWS_ACCESS_KEY_ID_PARAM: &str = "AWSAccessKeyId";
pub const SECURITY_TOKEN: &str = "SecurityToken";
pub const SIGNATURE: &str = "Signature";

pub const HMAC_SHA256: &str = "HmacSHA256";
pub const SIGNATURE_VERSION_2: &str = "2";

/// Parameters that must be present before the string to sign is built.
pub const MANDATORY_PARAMS: [&str; 4] = [ACTION, SIGNATURE_METHOD, SIGNATURE_VERSION, VERSION];

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_MAX_ATTEMPTS: &str = "AWS_MAX_ATTEMPTS";

/// AsciiSet for the form body sent on the wire.
///
/// Every byte except the unreserved characters 'A'-'Z', 'a'-'z', '0'-'9',
/// '-', '.', '_', '~' and the path-safe '/' and '?' is encoded.
pub static WIRE_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b'?');

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/general/latest/gr/signature-version-2.html)
///
/// Used to build the string to sign: '/' and '?' are encoded too.
pub static SIGNATURE_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

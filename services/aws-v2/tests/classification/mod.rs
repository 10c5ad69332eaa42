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

use bytes::Bytes;
use http::Method;
use http::StatusCode;
use querysign_aws_v2::{parse_error_document, ErrorClassifier, ErrorKind};
use querysign_core::FormRequest;
use test_case::test_case;

use crate::init_test_logger;

fn request(method: Method) -> FormRequest {
    FormRequest::new(method, "https://ec2.amazonaws.com/".parse().unwrap())
}

fn xml_response(status: u16, body: &'static str) -> http::Response<Bytes> {
    http::Response::builder()
        .status(status)
        .header("content-type", "text/xml;charset=UTF-8")
        .body(Bytes::from_static(body.as_bytes()))
        .unwrap()
}

#[test_case(
    "<Response><Errors><Error><Code>UnsupportedOperation</Code><Message>The instance type is not supported.</Message></Error></Errors><RequestID>1</RequestID></Response>"
    => ErrorKind::Unsupported; "unsupported operation"
)]
#[test_case(
    "<Response><Errors><Error><Code>InvalidGroup.Duplicate</Code><Message>The security group 'default' already exists</Message></Error></Errors><RequestID>2</RequestID></Response>"
    => ErrorKind::Conflict; "duplicate group"
)]
#[test_case(
    "<ErrorResponse><Error><Type>Sender</Type><Code>AuthFailure</Code><Message>Not authorized.</Message></Error><RequestId>3</RequestId></ErrorResponse>"
    => ErrorKind::Unauthorized; "auth failure in error response"
)]
#[test_case(
    "<Error><Code>InvalidParameterValue</Code><Message>Invalid id: \"sg-1\"</Message></Error>"
    => ErrorKind::InvalidArgument; "invalid id in bare error"
)]
fn test_classify_bad_request(body: &'static str) -> ErrorKind {
    init_test_logger();

    ErrorClassifier::new()
        .classify_bytes(&request(Method::POST), xml_response(400, body))
        .kind
}

#[test]
fn test_auth_failure_with_unauthorized_status() {
    let err = ErrorClassifier::new().classify_bytes(
        &request(Method::POST),
        xml_response(
            401,
            "<Response><Errors><Error><Code>AuthFailure</Code><Message>denied</Message></Error></Errors><RequestID>4</RequestID></Response>",
        ),
    );

    assert_eq!(err.http_status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.provider_code.as_deref(), Some("AuthFailure"));
    assert_eq!(err.message, "denied");
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[test]
fn test_delete_of_missing_resource_is_not_not_found() {
    let resp = xml_response(404, "");

    let err = ErrorClassifier::new().classify_bytes(&request(Method::DELETE), resp);
    assert_eq!(err.kind, ErrorKind::Generic(404));

    let err = ErrorClassifier::new().classify_bytes(&request(Method::GET), xml_response(404, ""));
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn test_classified_error_is_std_error() {
    let err = ErrorClassifier::new().classify_bytes(&request(Method::GET), xml_response(500, ""));
    let err: Box<dyn std::error::Error> = Box::new(err);
    assert!(err.to_string().contains("Generic(500)"));
}

#[test]
fn test_parse_error_document_is_public() {
    let doc = parse_error_document(
        b"<Error><Code>PermanentRedirect</Code><Endpoint></Endpoint></Error>",
    )
    .unwrap();
    assert_eq!(doc.code.as_deref(), Some("PermanentRedirect"));
    assert_eq!(doc.endpoint, None);
}

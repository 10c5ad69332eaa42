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

use querysign_core::hash::base64_hmac_sha256;
use querysign_core::Result;
use querysign_core::{
    Context, FilterRequest, FormRequest, OsEnv, ProvideCredential, SignRequest, Signer,
    SigningCredential,
};

#[derive(Clone, Debug)]
struct MyCredential {
    api_key: String,
    api_secret: String,
}

impl SigningCredential for MyCredential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

// Implement a credential loader that loads from environment
#[derive(Debug)]
struct MyCredentialLoader;

impl ProvideCredential for MyCredentialLoader {
    type Credential = MyCredential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let api_key = ctx.env_var("MY_API_KEY").unwrap_or_default();
        let api_secret = ctx.env_var("MY_API_SECRET").unwrap_or_default();

        // For demo purposes, use dummy credentials if none are provided
        if api_key.is_empty() || api_secret.is_empty() {
            println!("No credentials found in environment, using demo credentials");
            return Ok(Some(MyCredential {
                api_key: "demo-api-key".to_string(),
                api_secret: "demo-api-secret".to_string(),
            }));
        }

        Ok(Some(MyCredential {
            api_key,
            api_secret,
        }))
    }
}

// Every request of this api carries a `Format` parameter
#[derive(Debug)]
struct JsonFormat;

impl FilterRequest for JsonFormat {
    fn filter(&self, req: &mut FormRequest) -> Result<()> {
        req.set_param("Format", "json");
        Ok(())
    }
}

// Implement a request signer
#[derive(Debug)]
struct MyRequestSigner;

impl SignRequest for MyRequestSigner {
    type Credential = MyCredential;

    fn sign_request(
        &self,
        _ctx: &Context,
        req: &mut FormRequest,
        cred: &Self::Credential,
    ) -> Result<()> {
        req.set_param("ApiKey", &cred.api_key);

        let mut params = req.params.clone();
        params.sort();
        let content = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let signature = base64_hmac_sha256(cred.api_secret.as_bytes(), content.as_bytes())?;
        req.set_param("Signature", signature);
        Ok(())
    }
}

fn main() -> Result<()> {
    let ctx = Context::new().with_env(OsEnv);

    let signer = Signer::new(ctx, MyCredentialLoader, MyRequestSigner).with_filter(JsonFormat);

    let mut req = FormRequest::new(
        http::Method::POST,
        "https://api.example.com/".parse()?,
    )
    .with_param("Action", "ListUsers");

    match signer.sign(&mut req) {
        Ok(_) => {
            println!("Request signed successfully!");
            println!("Params: {:?}", req.params);
        }
        Err(e) => {
            eprintln!("Failed to sign request: {}", e);
        }
    }

    Ok(())
}

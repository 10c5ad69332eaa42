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

use crate::{
    Context, Error, FilterRequest, FormRequest, ProvideCredential, Result, SignRequest,
    SigningCredential,
};
use log::debug;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// A signer is composed once: an ordered list of filters, a credential
/// provider and a request signer. Every [`Signer::sign`] runs the filters in
/// insertion order, reads the credential once and signs with that snapshot.
#[derive(Clone)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    filters: Vec<Arc<dyn FilterRequest>>,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            filters: Vec::new(),
            loader: Arc::new(loader),
            builder: Arc::new(builder),
        }
    }

    /// Append a filter that runs before signing.
    pub fn with_filter(mut self, filter: impl FilterRequest) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Signing request.
    pub fn sign(&self, req: &mut FormRequest) -> Result<()> {
        for filter in &self.filters {
            filter.filter(req)?;
        }

        let cred = self.loader.provide_credential(&self.ctx)?.ok_or_else(|| {
            Error::credential_invalid("no credential available for signing")
                .with_context(format!("loader: {:?}", self.loader))
        })?;
        if !cred.is_valid() {
            return Err(Error::credential_invalid("credential is invalid or expired")
                .with_context(format!("credential: {cred:?}")));
        }
        debug!("signing request {} {} with {cred:?}", req.method, req.uri);

        self.builder.sign_request(&self.ctx, req, &cred)
    }
}

impl<K: SigningCredential> Debug for Signer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("ctx", &self.ctx)
            .field("filters", &self.filters)
            .field("loader", &self.loader)
            .field("builder", &self.builder)
            .finish()
    }
}

// ── Batch engine ──
//
// One login per batch, then catalog lookup → template resolution →
// request → shaping for each item, strictly in input order. The first
// failing item stops the batch; records produced so far are returned
// alongside the error.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uniflow_api::{ApiRequest, ControllerClient, Endpoints, Session};

use crate::catalog::{Catalog, OperationDescriptor};
use crate::config::{ControllerConfig, Credentials};
use crate::error::{BatchError, CoreError};
use crate::params::{ItemParams, OPERATION_PARAM, ParameterSource, RESOURCE_PARAM, selector};
use crate::shaper::{OutputRecord, shape};

/// A fully resolved request for one item, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest<'a> {
    pub descriptor: &'a OperationDescriptor,
    pub request: ApiRequest,
    pub split: bool,
}

/// Executes batches of catalog operations against one controller.
pub struct Engine {
    client: ControllerClient,
    credentials: Credentials,
    catalog: Arc<Catalog>,
}

impl Engine {
    /// Build an engine whose HTTP client follows `config`'s TLS and timeout.
    pub fn new(config: &ControllerConfig, catalog: Arc<Catalog>) -> Result<Self, CoreError> {
        let endpoints = Endpoints::from_server_url(config.credentials.server_url.as_str())?;
        Ok(Self {
            client: ControllerClient::new(endpoints, &config.transport())?,
            credentials: config.credentials.clone(),
            catalog,
        })
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Perform the login handshake and return the batch session.
    ///
    /// Blank credentials are rejected by the client before anything is sent.
    pub async fn authenticate(&self) -> Result<Session, CoreError> {
        let Credentials {
            username, password, ..
        } = &self.credentials;
        let session = self.client.login(username, password).await?;
        debug!("session established");
        Ok(session)
    }

    /// Verify the credentials with a bare login; nothing else is sent.
    pub async fn check_credentials(&self) -> Result<(), CoreError> {
        self.authenticate().await.map(drop)
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// Resolve item `item_index` of `source` into a concrete request.
    pub fn prepare<'s, S>(
        &'s self,
        source: &S,
        item_index: usize,
    ) -> Result<PreparedRequest<'s>, CoreError>
    where
        S: ParameterSource + ?Sized,
    {
        let resource = selector(source, item_index, RESOURCE_PARAM);
        let operation = selector(source, item_index, OPERATION_PARAM);
        let descriptor = self.catalog.lookup(&resource, &operation)?;

        let params = ItemParams::new(source, item_index, descriptor);
        for field in params.missing_required() {
            warn!(
                item = item_index,
                %resource,
                %operation,
                field,
                "required parameter not set; using empty value"
            );
        }

        Ok(PreparedRequest {
            descriptor,
            request: ApiRequest {
                method: descriptor.method.into(),
                path: descriptor.url.resolve(&params),
                body: descriptor.body.as_ref().map(|b| b.resolve(&params)),
            },
            split: params.split_requested(),
        })
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Run every item of `source` under a single session.
    ///
    /// An empty batch returns immediately without logging in.
    pub async fn run_batch<S>(&self, source: &S) -> Result<Vec<OutputRecord>, BatchError>
    where
        S: ParameterSource + ?Sized + Sync,
    {
        let count = source.item_count();
        if count == 0 {
            return Ok(Vec::new());
        }
        info!(items = count, "running batch");

        let session = self.authenticate().await.map_err(BatchError::before_items)?;

        let mut records = Vec::new();
        for item_index in 0..count {
            match self.run_item(source, item_index, &session).await {
                Ok(produced) => records.extend(produced),
                Err(error) => {
                    warn!(item = item_index, error = %error, "batch stopped");
                    return Err(BatchError {
                        item_index: Some(item_index),
                        error,
                        partial: records,
                    });
                }
            }
        }

        info!(records = records.len(), "batch complete");
        Ok(records)
    }

    async fn run_item<S>(
        &self,
        source: &S,
        item_index: usize,
        session: &Session,
    ) -> Result<Vec<OutputRecord>, CoreError>
    where
        S: ParameterSource + ?Sized + Sync,
    {
        let prepared = self.prepare(source, item_index)?;
        debug!(
            item = item_index,
            resource = %prepared.descriptor.resource,
            operation = %prepared.descriptor.operation,
            "executing"
        );
        let raw = self.client.execute(&prepared.request, session).await?;
        Ok(shape(
            raw,
            prepared.descriptor.shaping.as_ref(),
            prepared.split,
            item_index,
        ))
    }
}

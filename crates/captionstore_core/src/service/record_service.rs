//! Record use-case service.
//!
//! # Responsibility
//! - Provide create/get/caption-replacement entry points for transport layers.
//! - Decode request payloads and record ids into typed store input.
//! - Classify every failure into a transport status.
//!
//! # Invariants
//! - Service APIs never bypass the store's validation contract.
//! - Caption replacement keeps the stored URL.

use crate::caption::generator::{CaptionError, CaptionGenerator};
use crate::model::record::{Record, RecordId};
use crate::store::{ErrorKind, RecordStore, StoreError, StoreResult};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for record use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Store-level failure, classified by its own kind.
    Store(StoreError),
    /// Captions could not be produced for the submitted URL.
    CaptionGeneration(CaptionError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(err) => err.kind(),
            Self::CaptionGeneration(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::CaptionGeneration(_) => write!(f, "unable to generate captions"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::CaptionGeneration(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case facade over any `RecordStore`.
pub struct RecordService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates one record with caller-supplied captions.
    pub fn create_record(
        &self,
        tenant_id: &str,
        url: impl Into<String>,
        captions: Vec<String>,
    ) -> StoreResult<Record> {
        self.store.insert(tenant_id, &Record::new(url, captions))
    }

    /// Generates `count` captions for `url` and stores the result.
    ///
    /// Nothing is stored when generation fails.
    pub fn create_with_generated_captions<G: CaptionGenerator + ?Sized>(
        &self,
        tenant_id: &str,
        url: &str,
        generator: &G,
        count: usize,
    ) -> Result<Record, ServiceError> {
        let captions = generator.generate(url, count).map_err(|err| {
            warn!(
                "event=record_create module=record_service status=error tenant_id={} error_code=caption_generation_failed error={}",
                tenant_id, err
            );
            ServiceError::CaptionGeneration(err)
        })?;
        Ok(self.create_record(tenant_id, url, captions)?)
    }

    /// Gets one record by tenant and id.
    pub fn get_record(&self, tenant_id: &str, id: RecordId) -> StoreResult<Record> {
        self.store.get(tenant_id, id)
    }

    /// Replaces the captions of an existing record, keeping its URL.
    ///
    /// Read and write are separate store calls; a concurrent update of the
    /// same record may win the URL.
    pub fn replace_captions(
        &self,
        tenant_id: &str,
        id: RecordId,
        captions: Vec<String>,
    ) -> StoreResult<Record> {
        let mut record = self.store.get(tenant_id, id)?;
        record.captions = captions;
        self.store.update(tenant_id, &record)
    }
}

/// Decodes a JSON request body into an insert or update candidate.
///
/// An empty or `null` body means no record was provided.
pub fn decode_record_payload(body: &str) -> StoreResult<Record> {
    if body.trim().is_empty() {
        return Err(StoreError::invalid("must provide record"));
    }
    let record: Option<Record> =
        serde_json::from_str(body).map_err(|_| StoreError::invalid("request"))?;
    record.ok_or_else(|| StoreError::invalid("must provide record"))
}

/// Parses a record id taken from a request path.
pub fn parse_record_id(value: &str) -> StoreResult<RecordId> {
    match RecordId::parse_hex(value) {
        Ok(id) if !id.is_nil() => Ok(id),
        _ => Err(StoreError::invalid("record id")),
    }
}

//! Record domain model.
//!
//! # Responsibility
//! - Define the tenant-owned record (URL plus captions) shared by every store.
//! - Own the canonical identifier encoding used in composite store keys.
//!
//! # Invariants
//! - `RecordId` values are generated by persistent stores only.
//! - The canonical hex form of a `RecordId` never contains `:`.
//! - `tenant_id` is never part of the wire representation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one stored record.
///
/// Serialized as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(Uuid);

/// Error returned when parsing a textual record id fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIdParseError {
    input: String,
}

impl Display for RecordIdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid record id `{}`", self.input)
    }
}

impl Error for RecordIdParseError {}

impl RecordId {
    /// Generates a fresh, previously unused identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The empty identifier. Stores reject it on every keyed operation.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Wraps an existing UUID, e.g. one read back from SQLite.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses the canonical hex form. Hyphenated UUIDs are accepted too.
    pub fn parse_hex(value: &str) -> Result<Self, RecordIdParseError> {
        Uuid::try_parse(value.trim())
            .map(Self)
            .map_err(|_| RecordIdParseError {
                input: value.to_string(),
            })
    }

    /// Canonical encoding used in composite keys and on the wire.
    pub fn to_hex(&self) -> String {
        self.0.simple().to_string()
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(value.as_str())
    }
}

/// One URL and its captions, owned by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Absent until a persistent store assigns it on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Owning tenant. Travels out-of-band, never serialized.
    #[serde(skip)]
    pub tenant_id: String,
    /// Arbitrary payload, not validated by the stores.
    #[serde(default)]
    pub url: String,
    /// Ordered captions; replaced wholesale on update.
    #[serde(default)]
    pub captions: Vec<String>,
}

impl Record {
    /// Creates an insert candidate without id or tenant.
    pub fn new(url: impl Into<String>, captions: Vec<String>) -> Self {
        Self {
            id: None,
            tenant_id: String::new(),
            url: url.into(),
            captions,
        }
    }

    /// Returns this record with the given id set, for update input.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns a copy carrying the given id and tenant, keeping payload fields.
    ///
    /// Used by persistent stores when materializing a freshly inserted record.
    pub fn stamped(&self, id: RecordId, tenant_id: &str) -> Self {
        Self {
            id: Some(id),
            tenant_id: tenant_id.to_string(),
            url: self.url.clone(),
            captions: self.captions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordId};

    #[test]
    fn hex_form_has_no_delimiter_and_parses_back() {
        let id = RecordId::generate();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 32);
        assert!(!hex.contains(':'));
        assert_eq!(RecordId::parse_hex(&hex).unwrap(), id);
    }

    #[test]
    fn parse_hex_rejects_garbage() {
        let err = RecordId::parse_hex("blah").unwrap_err();
        assert_eq!(err.to_string(), "invalid record id `blah`");
    }

    #[test]
    fn stamped_copies_payload_fields() {
        let draft = Record::new("http://x", vec!["a".to_string()]);
        let id = RecordId::generate();
        let stored = draft.stamped(id, "c1");
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.tenant_id, "c1");
        assert_eq!(stored.url, draft.url);
        assert_eq!(stored.captions, draft.captions);
    }
}

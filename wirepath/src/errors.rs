use thiserror::Error;

use crate::types::RecordKey;

/// Structural errors raised while indexing model types.
///
/// Unknown field paths are not errors: lookups report them as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The model type does not normalize to a record.
    #[error("model type `{type_name}` is not a record")]
    InvalidModelKind { type_name: String },

    /// A record key (the model itself or a linked subfield type) has no descriptor.
    #[error("record `{key}` is not registered")]
    UnknownRecord { key: RecordKey },

    /// Two different derived models registered under the same key.
    #[error("record `{key}` is registered by two different models")]
    ConflictingRecord { key: RecordKey },

    /// An inline field inlines a record that is already being inlined.
    #[error("inline cycle: {}", display_chain(.chain))]
    InlineCycle { chain: Vec<RecordKey> },
}

fn display_chain(chain: &[RecordKey]) -> String {
    chain.iter().map(RecordKey::as_str).collect::<Vec<_>>().join(" -> ")
}

pub type SchemaResult<T> = Result<T, SchemaError>;

//! Type normalization.
//!
//! Cache lookups are keyed on the record underneath a field's wrappers, so
//! `T`, `Box<T>`, `Vec<T>`, `Vec<Option<Box<T>>>` and `[T; N]` all land on the
//! same entry. Normalization peels pointers, at most one sequence, then pointers
//! again; `Vec<Vec<T>>` does not normalize to a record.

use crate::types::{RecordKey, TypeRef};

/// Strip pointer / sequence wrapping and return the underlying type.
pub fn strip(ty: &TypeRef) -> &TypeRef {
    let ty = strip_pointers(ty);
    match ty {
        TypeRef::Sequence(inner) => strip_pointers(inner),
        other => other,
    }
}

/// Record identity of `ty`, if it normalizes to a record.
pub fn record_key(ty: &TypeRef) -> Option<&RecordKey> {
    match strip(ty) {
        TypeRef::Record(key) => Some(key),
        _ => None,
    }
}

fn strip_pointers(mut ty: &TypeRef) -> &TypeRef {
    while let TypeRef::Pointer(inner) = ty {
        ty = inner;
    }
    ty
}

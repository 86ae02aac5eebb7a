//! wirepath: resolve model field paths into wire field names.
//!
//! Models describe their fields with `#[derive(WireModel)]` and `#[wire(...)]`
//! annotations. A [`Resolver`] walks dotted application paths (`"home.city"`)
//! through those descriptions and returns the matching wire path
//! (`"addr.city"`), indexing each record type once and only when a path reaches it.

extern crate self as wirepath;

pub mod cache;
pub mod errors;
pub mod index;
pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod types;

pub use cache::TypeCache;
pub use errors::{SchemaError, SchemaResult};
pub use index::FieldPathIndex;
pub use registry::{ModelRegistration, Registry};
pub use resolver::Resolver;
pub use types::{FieldAnnotation, FieldDescriptor, RecordDescriptor, RecordKey, TypeRef, WireModel, WireType};
pub use wirepath_macros::WireModel;

// Re-export inventory for auto-registration in the derive macro
pub use inventory;

/// Wire path of `path` on model `T`, using the process-wide cache.
///
/// Returns `None` for unknown paths and for models that cannot be indexed.
pub fn wire_path<T: WireType + ?Sized>(path: &str) -> Option<String> {
    match Resolver::of::<T>() {
        Ok(resolver) => resolver.get(path),
        Err(err) => {
            log::warn!("cannot resolve `{path}`: {err}");
            None
        }
    }
}

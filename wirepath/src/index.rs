//! One-level field path index of a single record type.

use crate::errors::{SchemaError, SchemaResult};
use crate::normalize;
use crate::registry::Registry;
use crate::types::RecordKey;
use std::collections::BTreeMap;

/// Application path -> wire path for one record, plus subfield links.
///
/// Built once per record and never mutated afterwards. Nested non-inline records
/// are only linked, which keeps construction finite on cyclic type graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPathIndex {
    record: RecordKey,
    paths: BTreeMap<String, String>,
    links: BTreeMap<String, RecordKey>,
}

impl FieldPathIndex {
    pub fn record(&self) -> &RecordKey {
        &self.record
    }

    pub fn wire_name(&self, field: &str) -> Option<&str> {
        self.paths.get(field).map(String::as_str)
    }

    /// Record type linked from `field`, if the field holds a nested record.
    pub fn link(&self, field: &str) -> Option<&RecordKey> {
        self.links.get(field)
    }

    pub fn paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.paths.iter().map(|(app, wire)| (app.as_str(), wire.as_str()))
    }

    pub fn links(&self) -> impl Iterator<Item = (&str, &RecordKey)> {
        self.links.iter().map(|(app, key)| (app.as_str(), key))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Build the index of `key` from its registered descriptor.
pub fn build(registry: &Registry, key: &RecordKey) -> SchemaResult<FieldPathIndex> {
    let mut index = FieldPathIndex {
        record: key.clone(),
        paths: BTreeMap::new(),
        links: BTreeMap::new(),
    };
    let mut inline_chain = Vec::new();
    collect(registry, key, &mut inline_chain, &mut index)?;
    log::debug!(
        "indexed `{key}`: {} paths, {} links",
        index.paths.len(),
        index.links.len()
    );
    Ok(index)
}

/// Add the entries of `key` to `index`; inline fields recurse with the same target.
fn collect(
    registry: &Registry,
    key: &RecordKey,
    inline_chain: &mut Vec<RecordKey>,
    index: &mut FieldPathIndex,
) -> SchemaResult<()> {
    let descriptor = registry.lookup(key)?;
    inline_chain.push(key.clone());

    for field in &descriptor.fields {
        let Some(annotation) = field.annotation.as_ref().filter(|a| !a.skip) else {
            continue;
        };
        let nested = normalize::record_key(&field.ty);

        if annotation.inline {
            let Some(nested) = nested else {
                log::debug!(
                    "`{key}.{}`: inline on non-record type `{}`, field dropped",
                    field.name,
                    field.ty
                );
                continue;
            };
            if inline_chain.contains(nested) {
                let mut chain = inline_chain.clone();
                chain.push(nested.clone());
                return Err(SchemaError::InlineCycle { chain });
            }
            collect(registry, nested, inline_chain, index)?;
            continue;
        }

        index.paths.insert(field.name.clone(), annotation.wire_name.clone());
        match nested {
            Some(nested) => index.links.insert(field.name.clone(), nested.clone()),
            None => index.links.remove(&field.name),
        };
    }

    inline_chain.pop();
    Ok(())
}

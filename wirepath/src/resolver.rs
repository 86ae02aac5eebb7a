//! Dotted path resolution over a model's field indexes.

use crate::cache::TypeCache;
use crate::errors::SchemaResult;
use crate::index::FieldPathIndex;
use crate::types::{RecordKey, TypeRef, WireType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Resolves application field paths of one model into wire paths.
///
/// Nested records are indexed through the cache only when a path actually
/// descends into them.
///
/// ```text
/// #[derive(WireModel)]
/// struct User {
///     #[wire("name")]
///     name: String,
///     #[wire("addr")]
///     address: Address,
/// }
///
/// let users = Resolver::of::<Vec<User>>()?;
/// assert_eq!(users.get("address.city").as_deref(), Some("addr.city"));
/// ```
#[derive(Debug, Clone)]
pub struct Resolver<'c> {
    cache: &'c TypeCache,
    root: Arc<FieldPathIndex>,
}

impl Resolver<'static> {
    /// Resolver for `T` on the process-wide cache.
    pub fn of<T: WireType + ?Sized>() -> SchemaResult<Self> {
        Resolver::for_model::<T>(TypeCache::global())
    }
}

impl<'c> Resolver<'c> {
    /// Resolver for the record underneath `model`. The root index is built
    /// eagerly, so a non-record or unregistered model fails here.
    pub fn new(cache: &'c TypeCache, model: &TypeRef) -> SchemaResult<Self> {
        let root = cache.index_of(model)?;
        Ok(Self { cache, root })
    }

    pub fn for_model<T: WireType + ?Sized>(cache: &'c TypeCache) -> SchemaResult<Self> {
        Self::new(cache, &T::type_ref())
    }

    pub fn record(&self) -> &RecordKey {
        self.root.record()
    }

    pub fn cache(&self) -> &'c TypeCache {
        self.cache
    }

    /// Wire path for `path`, or `None` when any segment is unknown.
    ///
    /// Structural errors met while descending (an unregistered nested record, an
    /// inline cycle in a nested record) are logged and reported as `None`; use
    /// [`Resolver::try_get`] to observe them.
    pub fn get(&self, path: &str) -> Option<String> {
        match self.try_get(path) {
            Ok(resolved) => resolved,
            Err(err) => {
                log::warn!("cannot resolve `{path}` on `{}`: {err}", self.record());
                None
            }
        }
    }

    pub fn try_get(&self, path: &str) -> SchemaResult<Option<String>> {
        let mut index = Arc::clone(&self.root);
        let mut wire = String::with_capacity(path.len());
        let mut rest = path;

        loop {
            let (head, tail) = match rest.split_once('.') {
                Some((head, tail)) => (head, Some(tail)),
                None => (rest, None),
            };
            let Some(name) = index.wire_name(head) else {
                return Ok(None);
            };
            wire.push_str(name);

            let Some(tail) = tail else {
                return Ok(Some(wire));
            };
            let Some(link) = index.link(head) else {
                return Ok(None);
            };
            index = self.cache.get(link)?;
            wire.push('.');
            rest = tail;
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Every application path reachable from the model, mapped to its wire path.
    ///
    /// Links back to a record already on the current descent are listed but not
    /// followed, so cyclic models produce a finite map.
    pub fn field_map(&self) -> SchemaResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        let mut chain = vec![self.record().clone()];
        self.expand(&self.root, "", "", &mut chain, &mut map)?;
        Ok(map)
    }

    fn expand(
        &self,
        index: &FieldPathIndex,
        app_prefix: &str,
        wire_prefix: &str,
        chain: &mut Vec<RecordKey>,
        map: &mut BTreeMap<String, String>,
    ) -> SchemaResult<()> {
        for (app, wire) in index.paths() {
            let app_path = format!("{app_prefix}{app}");
            let wire_path = format!("{wire_prefix}{wire}");

            if let Some(link) = index.link(app)
                && !chain.contains(link)
            {
                let nested = self.cache.get(link)?;
                chain.push(link.clone());
                self.expand(&nested, &format!("{app_path}."), &format!("{wire_path}."), chain, map)?;
                chain.pop();
            }
            map.insert(app_path, wire_path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchemaError;
    use crate::registry::Registry;
    use crate::types::{FieldAnnotation, RecordDescriptor};

    fn cache(descriptors: impl IntoIterator<Item = RecordDescriptor>) -> TypeCache {
        let registry = Registry::new();
        for descriptor in descriptors {
            registry.insert(descriptor);
        }
        TypeCache::new(Arc::new(registry))
    }

    fn people() -> TypeCache {
        cache([
            RecordDescriptor::new("Person")
                .field("Name", FieldAnnotation::named("name"), TypeRef::scalar("String"))
                .field("Age", FieldAnnotation::named("age"), TypeRef::scalar("i32"))
                .field("Hidden", FieldAnnotation::skip(), TypeRef::scalar("i32"))
                .field("Home", FieldAnnotation::named("home"), TypeRef::pointer(TypeRef::record("Address"))),
            RecordDescriptor::new("Address")
                .field("City", FieldAnnotation::named("city"), TypeRef::scalar("String"))
                .field("Geo", FieldAnnotation::inline(), TypeRef::record("Geo")),
            RecordDescriptor::new("Geo")
                .field("Lat", FieldAnnotation::named("lat"), TypeRef::scalar("f64"))
                .field("Lng", FieldAnnotation::named("lng"), TypeRef::scalar("f64")),
        ])
    }

    #[test]
    fn resolves_flat_and_nested_paths() {
        let cache = people();
        let resolver = Resolver::new(&cache, &TypeRef::record("Person")).unwrap();

        assert_eq!(resolver.get("Name").as_deref(), Some("name"));
        assert_eq!(resolver.get("Age").as_deref(), Some("age"));
        assert_eq!(resolver.get("Home").as_deref(), Some("home"));
        assert_eq!(resolver.get("Home.City").as_deref(), Some("home.city"));
        assert_eq!(resolver.get("Home.Lat").as_deref(), Some("home.lat"));
    }

    #[test]
    fn unknown_paths_are_none() {
        let cache = people();
        let resolver = Resolver::new(&cache, &TypeRef::record("Person")).unwrap();

        for path in ["Hidden", "Hidden.Anything", "Nope", "Name.Inner", "Home.Geo", "Home.Geo.Lat", "", "Home.", ".Name"] {
            assert_eq!(resolver.get(path), None, "{path}");
        }
        assert!(!resolver.contains("Hidden"));
        assert!(resolver.contains("Home.Lng"));
    }

    #[test]
    fn descends_lazily() {
        let cache = people();
        let resolver = Resolver::new(&cache, &TypeRef::record("Person")).unwrap();
        assert_eq!(cache.builds(), 1);

        resolver.get("Name");
        assert!(!cache.contains(&RecordKey::from_static("Address")));

        resolver.get("Home.City");
        resolver.get("Home.City");
        assert_eq!(cache.builds(), 2);
        assert!(!cache.contains(&RecordKey::from_static("Geo")));
    }

    #[test]
    fn non_record_model_is_rejected() {
        let cache = people();
        let err = Resolver::new(&cache, &TypeRef::scalar("i32")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidModelKind { .. }));
    }

    #[test]
    fn broken_nested_record_surfaces_through_try_get() {
        let cache = cache([RecordDescriptor::new("Order").field(
            "Customer",
            FieldAnnotation::named("customer"),
            TypeRef::record("Customer"),
        )]);
        let resolver = Resolver::new(&cache, &TypeRef::record("Order")).unwrap();

        assert_eq!(resolver.get("Customer").as_deref(), Some("customer"));
        assert_eq!(resolver.get("Customer.Name"), None);
        assert_eq!(
            resolver.try_get("Customer.Name").unwrap_err(),
            SchemaError::UnknownRecord {
                key: RecordKey::from_static("Customer")
            }
        );
    }

    #[test]
    fn mutual_recursion_terminates() {
        let cache = cache([
            RecordDescriptor::new("A").field(
                "Bs",
                FieldAnnotation::named("bs"),
                TypeRef::sequence(TypeRef::pointer(TypeRef::record("B"))),
            ),
            RecordDescriptor::new("B").field(
                "As",
                FieldAnnotation::named("as"),
                TypeRef::sequence(TypeRef::pointer(TypeRef::record("A"))),
            ),
        ]);
        let resolver = Resolver::new(&cache, &TypeRef::record("A")).unwrap();

        assert_eq!(resolver.get("Bs.As").as_deref(), Some("bs.as"));
        assert_eq!(resolver.get("Bs.As.Bs").as_deref(), Some("bs.as.bs"));
        assert_eq!(resolver.get("Bs.As.Bs.As.Bs.As").as_deref(), Some("bs.as.bs.as.bs.as"));
        assert_eq!(cache.builds(), 2);

        let map = resolver.field_map().unwrap();
        let expected: BTreeMap<String, String> = [("Bs", "bs"), ("Bs.As", "bs.as")]
            .into_iter()
            .map(|(a, w)| (a.to_string(), w.to_string()))
            .collect();
        assert_eq!(map, expected);
    }

    #[test]
    fn field_map_covers_reachable_paths() {
        let cache = people();
        let resolver = Resolver::new(&cache, &TypeRef::record("Person")).unwrap();
        let map = resolver.field_map().unwrap();

        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Age", "Home", "Home.City", "Home.Lat", "Home.Lng", "Name"]);
        assert_eq!(map["Home.Lng"], "home.lng");
        for (app, wire) in &map {
            assert_eq!(resolver.get(app).as_deref(), Some(wire.as_str()));
        }
    }
}

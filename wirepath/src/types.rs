use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Identity of a record type.
///
/// Derived models use [`std::any::type_name`], which includes the enclosing fn for
/// structs declared inside function bodies. Models recovered from source by the
/// CLI scanner use the bare struct name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordKey(Cow<'static, str>);

impl RecordKey {
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for RecordKey {
    fn from(key: &'static str) -> Self {
        Self::from_static(key)
    }
}

/// Shape of a declared field type, as far as path resolution cares about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeRef {
    /// Anything without addressable subfields (numbers, strings, maps, opaque types).
    Scalar(Cow<'static, str>),
    Record(RecordKey),
    /// `Box`, `Rc`, `Arc`, `Option`, `Cow`, references.
    Pointer(Box<TypeRef>),
    /// `Vec`, `VecDeque`, arrays, slices, sets.
    Sequence(Box<TypeRef>),
}

impl TypeRef {
    pub const fn scalar(name: &'static str) -> Self {
        TypeRef::Scalar(Cow::Borrowed(name))
    }

    pub fn record(key: impl Into<RecordKey>) -> Self {
        TypeRef::Record(key.into())
    }

    pub fn pointer(inner: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(inner))
    }

    pub fn sequence(inner: TypeRef) -> Self {
        TypeRef::Sequence(Box::new(inner))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(name) => f.write_str(name),
            TypeRef::Record(key) => write!(f, "{key}"),
            TypeRef::Pointer(inner) => write!(f, "&{inner}"),
            TypeRef::Sequence(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Per-field `#[wire(...)]` annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldAnnotation {
    pub wire_name: String,
    pub skip: bool,
    pub inline: bool,
}

impl FieldAnnotation {
    pub fn named(wire_name: impl Into<String>) -> Self {
        Self {
            wire_name: wire_name.into(),
            ..Self::default()
        }
    }

    pub fn skip() -> Self {
        Self {
            skip: true,
            ..Self::default()
        }
    }

    pub fn inline() -> Self {
        Self {
            inline: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Application-facing field name.
    pub name: String,
    /// `None` means the field was declared without `#[wire(...)]`.
    pub annotation: Option<FieldAnnotation>,
    pub ty: TypeRef,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, annotation: Option<FieldAnnotation>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            annotation,
            ty,
        }
    }
}

/// Field table of one record type, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDescriptor {
    pub key: RecordKey,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(key: impl Into<RecordKey>) -> Self {
        Self {
            key: key.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, annotation: FieldAnnotation, ty: TypeRef) -> Self {
        self.fields.push(FieldDescriptor::new(name, Some(annotation), ty));
        self
    }

    pub fn unannotated(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDescriptor::new(name, None, ty));
        self
    }
}

/// Types that can appear as a model field.
///
/// Implemented here for std scalars and wrappers, and by `#[derive(WireModel)]`
/// for records. The derive treats annotated fields of any other type as opaque
/// leaves, so [`impl_wire_scalar!`](crate::impl_wire_scalar) is only needed to
/// name a local leaf type or to see through wrappers around it.
pub trait WireType {
    fn type_ref() -> TypeRef;
}

/// Trait for record types described by `#[derive(WireModel)]`.
pub trait WireModel: WireType {
    /// Registry key of this record.
    fn record_key() -> RecordKey {
        RecordKey::from_static(std::any::type_name::<Self>())
    }

    fn record_descriptor() -> RecordDescriptor;
}

/// Declare leaf types that resolve as scalars.
///
/// ```
/// #[derive(Debug)]
/// enum Status { Active, Banned }
/// wirepath::impl_wire_scalar!(Status);
///
/// use wirepath::types::{TypeRef, WireType};
/// assert!(matches!(<Status as WireType>::type_ref(), TypeRef::Scalar(_)));
/// ```
#[macro_export]
macro_rules! impl_wire_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::types::WireType for $ty {
                fn type_ref() -> $crate::types::TypeRef {
                    $crate::types::TypeRef::scalar(stringify!($ty))
                }
            }
        )+
    };
}

/// Field type lookup emitted by `#[derive(WireModel)]`.
///
/// `(&&Describe::<T>::new("T")).wire_type_ref()` uses `T`'s [`WireType`] impl when
/// one exists and otherwise names `T` as an opaque scalar.
#[doc(hidden)]
pub struct Describe<T: ?Sized>(PhantomData<T>, &'static str);

impl<T: ?Sized> Describe<T> {
    pub const fn new(repr: &'static str) -> Self {
        Self(PhantomData, repr)
    }
}

#[doc(hidden)]
pub trait DescribeWireType {
    fn wire_type_ref(&self) -> TypeRef;
}

impl<T: WireType + ?Sized> DescribeWireType for &Describe<T> {
    fn wire_type_ref(&self) -> TypeRef {
        T::type_ref()
    }
}

#[doc(hidden)]
pub trait DescribeOpaque {
    fn wire_type_ref(&self) -> TypeRef;
}

impl<T: ?Sized> DescribeOpaque for Describe<T> {
    fn wire_type_ref(&self) -> TypeRef {
        TypeRef::Scalar(Cow::Borrowed(self.1))
    }
}

impl_wire_scalar!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, String, str, ()
);

macro_rules! impl_pointer {
    ($($ty:ty),+) => {
        $(
            impl<T: WireType + ?Sized> WireType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::pointer(T::type_ref())
                }
            }
        )+
    };
}

impl_pointer!(Box<T>, std::rc::Rc<T>, std::sync::Arc<T>, &T);

impl<T: WireType> WireType for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::pointer(T::type_ref())
    }
}

impl<T: WireType + ToOwned + ?Sized> WireType for Cow<'_, T> {
    fn type_ref() -> TypeRef {
        TypeRef::pointer(T::type_ref())
    }
}

impl<T: WireType> WireType for [T] {
    fn type_ref() -> TypeRef {
        TypeRef::sequence(T::type_ref())
    }
}

impl<T: WireType, const N: usize> WireType for [T; N] {
    fn type_ref() -> TypeRef {
        TypeRef::sequence(T::type_ref())
    }
}

impl<T: WireType> WireType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::sequence(T::type_ref())
    }
}

impl<T: WireType> WireType for std::collections::VecDeque<T> {
    fn type_ref() -> TypeRef {
        TypeRef::sequence(T::type_ref())
    }
}

impl<T: WireType, S> WireType for std::collections::HashSet<T, S> {
    fn type_ref() -> TypeRef {
        TypeRef::sequence(T::type_ref())
    }
}

impl<T: WireType> WireType for std::collections::BTreeSet<T> {
    fn type_ref() -> TypeRef {
        TypeRef::sequence(T::type_ref())
    }
}

impl<K, V, S> WireType for std::collections::HashMap<K, V, S> {
    fn type_ref() -> TypeRef {
        TypeRef::scalar("map")
    }
}

impl<K, V> WireType for std::collections::BTreeMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::scalar("map")
    }
}

impl WireType for serde_json::Value {
    fn type_ref() -> TypeRef {
        TypeRef::scalar("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashSet, VecDeque};
    use std::sync::Arc;

    #[test]
    fn wrappers_describe_their_shape() {
        assert_eq!(<Option<i32> as WireType>::type_ref(), TypeRef::pointer(TypeRef::scalar("i32")));
        assert_eq!(
            <Vec<Box<String>> as WireType>::type_ref(),
            TypeRef::sequence(TypeRef::pointer(TypeRef::scalar("String")))
        );
        assert_eq!(<[u8; 4] as WireType>::type_ref(), TypeRef::sequence(TypeRef::scalar("u8")));
        assert_eq!(<VecDeque<Arc<bool>> as WireType>::type_ref(), TypeRef::sequence(TypeRef::pointer(TypeRef::scalar("bool"))));
        assert_eq!(<HashSet<u64> as WireType>::type_ref(), TypeRef::sequence(TypeRef::scalar("u64")));
    }

    #[test]
    fn maps_are_scalars() {
        assert_eq!(<BTreeMap<String, i32> as WireType>::type_ref(), TypeRef::scalar("map"));
    }

    #[test]
    fn describe_prefers_wire_type_impls() {
        assert_eq!(
            (&&Describe::<Vec<Option<u8>>>::new("Vec<Option<u8>>")).wire_type_ref(),
            TypeRef::sequence(TypeRef::pointer(TypeRef::scalar("u8")))
        );
    }

    #[test]
    fn describe_falls_back_to_opaque_leaves() {
        assert_eq!(
            (&&Describe::<std::time::Duration>::new("Duration")).wire_type_ref(),
            TypeRef::scalar("Duration")
        );
        assert_eq!(
            (&&Describe::<std::path::PathBuf>::new("PathBuf")).wire_type_ref(),
            TypeRef::scalar("PathBuf")
        );
    }

    #[test]
    fn type_ref_display() {
        let ty = TypeRef::pointer(TypeRef::sequence(TypeRef::record("app::User")));
        assert_eq!(ty.to_string(), "&[app::User]");
    }

    #[test]
    fn descriptor_builder_keeps_declaration_order() {
        let descriptor = RecordDescriptor::new("User")
            .field("Name", FieldAnnotation::named("name"), TypeRef::scalar("String"))
            .unannotated("Cache", TypeRef::scalar("map"))
            .field("Hidden", FieldAnnotation::skip(), TypeRef::scalar("i32"));
        let names: Vec<_> = descriptor.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Name", "Cache", "Hidden"]);
        assert!(descriptor.fields[1].annotation.is_none());
    }
}

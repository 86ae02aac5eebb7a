//! Rust source parser using syn to extract model declarations.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::{Attribute, Fields, GenericArgument, Ident, Item, ItemStruct, LitStr, PathArguments, Token, Type};
use wirepath::{FieldAnnotation, RecordKey, TypeRef};

/// A model struct as written in source, before field types are resolved.
#[derive(Clone, Debug)]
pub struct SourceModel {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub fields: Vec<SourceField>,
}

#[derive(Clone, Debug)]
pub struct SourceField {
    pub name: String,
    pub annotation: Option<FieldAnnotation>,
    pub ty: Type,
}

/// Parse a Rust file and extract every struct deriving `derive`, including
/// structs in inline `mod` blocks.
pub fn parse_model_file(path: &Path, relative_path: &str, derive: &str) -> Result<Vec<SourceModel>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_model_source(&content, relative_path, derive)
}

pub fn parse_model_source(content: &str, relative_path: &str, derive: &str) -> Result<Vec<SourceModel>> {
    let syntax = syn::parse_file(content).with_context(|| format!("Failed to parse Rust file: {relative_path}"))?;
    let lines: Vec<&str> = content.lines().collect();

    let mut models = Vec::new();
    collect_items(&syntax.items, derive, &mut |item| {
        let name = item.ident.unraw().to_string();
        let line = find_struct_line(&lines, &name).unwrap_or(1);
        let fields = parse_fields(item).with_context(|| format!("Invalid #[wire] attribute on `{name}` in {relative_path}"))?;
        models.push(SourceModel {
            name,
            file: relative_path.to_string(),
            line,
            fields,
        });
        Ok(())
    })?;

    Ok(models)
}

fn collect_items(items: &[Item], derive: &str, on_model: &mut impl FnMut(&ItemStruct) -> Result<()>) -> Result<()> {
    for item in items {
        match item {
            Item::Struct(item_struct) if has_derive(&item_struct.attrs, derive) => on_model(item_struct)?,
            Item::Mod(module) => {
                if let Some((_, nested)) = &module.content {
                    collect_items(nested, derive, on_model)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Find the line number where a struct is defined
fn find_struct_line(lines: &[&str], struct_name: &str) -> Option<usize> {
    let pattern = format!("struct {struct_name}");
    lines
        .iter()
        .position(|line| {
            line.find(&pattern).is_some_and(|at| {
                let rest = &line[at + pattern.len()..];
                !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_')
            })
        })
        .map(|i| i + 1)
}

/// Whether `attrs` include `#[derive(..., <derive>, ...)]`, by path or bare name.
fn has_derive(attrs: &[Attribute], derive: &str) -> bool {
    attrs.iter().filter(|attr| attr.path().is_ident("derive")).any(|attr| {
        attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
            .map(|paths| {
                paths
                    .iter()
                    .any(|path| path.segments.last().is_some_and(|seg| seg.ident == derive))
            })
            .unwrap_or(false)
    })
}

fn parse_fields(item: &ItemStruct) -> syn::Result<Vec<SourceField>> {
    let Fields::Named(named) = &item.fields else {
        log::debug!("`{}` has no named fields", item.ident);
        return Ok(Vec::new());
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(ident) = &field.ident else { continue };
        let mut annotation = None;
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("wire")) {
            if annotation.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate #[wire(...)] attribute"));
            }
            annotation = Some(parse_wire_attr(attr)?);
        }
        fields.push(SourceField {
            name: ident.unraw().to_string(),
            annotation,
            ty: field.ty.clone(),
        });
    }
    Ok(fields)
}

/// `#[wire("name")]`, `#[wire(name = "name")]`, `#[wire(skip)]` or `#[wire(inline)]`.
fn parse_wire_attr(attr: &Attribute) -> syn::Result<FieldAnnotation> {
    attr.parse_args_with(|input: ParseStream| {
        let annotation = if input.peek(LitStr) {
            wire_name(input.parse()?)?
        } else {
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    wire_name(input.parse()?)?
                }
                "skip" => FieldAnnotation::skip(),
                "inline" => FieldAnnotation::inline(),
                other => return Err(syn::Error::new(key.span(), format!("unknown wire option `{other}`"))),
            }
        };
        input.parse::<Option<Token![,]>>()?;
        Ok(annotation)
    })
}

fn wire_name(lit: LitStr) -> syn::Result<FieldAnnotation> {
    let name = lit.value();
    if name.is_empty() {
        return Err(syn::Error::new(lit.span(), "wire name cannot be empty"));
    }
    Ok(FieldAnnotation::named(name))
}

/// Describe a source type, treating names in `models` as records.
///
/// Wrappers are recognised by their last path segment, so `std::sync::Arc<T>`
/// and `Arc<T>` are the same pointer.
pub fn to_type_ref(ty: &Type, models: &HashSet<String>) -> TypeRef {
    match ty {
        Type::Reference(reference) => TypeRef::pointer(to_type_ref(&reference.elem, models)),
        Type::Array(array) => TypeRef::sequence(to_type_ref(&array.elem, models)),
        Type::Slice(slice) => TypeRef::sequence(to_type_ref(&slice.elem, models)),
        Type::Paren(paren) => to_type_ref(&paren.elem, models),
        Type::Group(group) => to_type_ref(&group.elem, models),
        Type::Path(type_path) if type_path.qself.is_none() => {
            let Some(last) = type_path.path.segments.last() else {
                return opaque(ty);
            };
            let ident = last.ident.to_string();
            match (ident.as_str(), first_type_argument(&last.arguments)) {
                ("Box" | "Rc" | "Arc" | "Option" | "Cow", Some(inner)) => TypeRef::pointer(to_type_ref(inner, models)),
                ("Vec" | "VecDeque" | "HashSet" | "BTreeSet", Some(inner)) => {
                    TypeRef::sequence(to_type_ref(inner, models))
                }
                (name, None) if models.contains(name) => TypeRef::record(RecordKey::new(name)),
                _ => opaque(ty),
            }
        }
        _ => opaque(ty),
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn opaque(ty: &Type) -> TypeRef {
    TypeRef::Scalar(Cow::Owned(type_to_string(ty)))
}

fn type_to_string(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .iter()
            .map(|seg| {
                let ident = seg.ident.to_string();
                match &seg.arguments {
                    PathArguments::AngleBracketed(args) => {
                        let inner: Vec<String> = args
                            .args
                            .iter()
                            .filter_map(|arg| match arg {
                                GenericArgument::Type(inner_ty) => Some(type_to_string(inner_ty)),
                                _ => None,
                            })
                            .collect();
                        if inner.is_empty() {
                            ident
                        } else {
                            format!("{ident}<{}>", inner.join(", "))
                        }
                    }
                    _ => ident,
                }
            })
            .collect::<Vec<_>>()
            .join("::"),
        Type::Reference(reference) => format!("&{}", type_to_string(&reference.elem)),
        Type::Slice(slice) => format!("[{}]", type_to_string(&slice.elem)),
        Type::Array(array) => format!("[{}; N]", type_to_string(&array.elem)),
        Type::Tuple(tuple) if tuple.elems.is_empty() => "()".to_string(),
        _ => "unknown".to_string(),
    }
}

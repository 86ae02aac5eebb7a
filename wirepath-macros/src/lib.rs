use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Token, Type, parse_macro_input,
    spanned::Spanned,
};

mod parsed;

use parsed::ParsedModel;

/// Derive the wirepath field table of a struct.
///
/// Field attributes:
/// - `#[wire("name")]` / `#[wire(name = "name")]`: wire name of the field
/// - `#[wire(skip)]`: never resolvable
/// - `#[wire(inline)]`: flatten the nested record's fields into this one
///
/// Fields without `#[wire(...)]` are listed but never resolve.
#[proc_macro_derive(WireModel, attributes(wire))]
pub fn derive_wire_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedModel::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}

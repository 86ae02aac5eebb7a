use super::*;

const EXPECTED_DIRECTIVE: &str = "expected #[wire(\"name\")], #[wire(name = \"name\")], #[wire(skip)] or #[wire(inline)]";

/// What a `#[wire(...)]` attribute asks for.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Directive {
    Name(String),
    Skip,
    Inline,
}

pub(crate) struct ParsedField {
    pub ident: Ident,
    pub name: String,
    pub ty: Type,
    pub directive: Option<Directive>,
}

impl ParsedField {
    pub(crate) fn from_field(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "WireModel requires named fields"))?;
        let name = ident.unraw().to_string();

        let mut directive: Option<Directive> = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("wire") {
                continue;
            }
            if directive.is_some() {
                return Err(Error::new(attr.span(), "duplicate #[wire(...)] attribute"));
            }
            directive = Some(parse_wire_attr(attr)?);
        }

        Ok(Self {
            ident,
            name,
            ty: field.ty.clone(),
            directive,
        })
    }

    /// `FieldDescriptor` constructor for this field.
    ///
    /// Fields that take part in resolution use their `WireType` impl when the type
    /// has one and otherwise become opaque leaves. The rest are described by their
    /// source text.
    pub(crate) fn to_descriptor_tokens(&self) -> TokenStream2 {
        let name = LitStr::new(&self.name, self.ident.span());
        let ty = &self.ty;
        let ty_repr = LitStr::new(&type_repr(ty), ty.span());
        let described = quote! {{
            #[allow(unused_imports)]
            use ::wirepath::types::{DescribeOpaque as _, DescribeWireType as _};
            (&&::wirepath::types::Describe::<#ty>::new(#ty_repr)).wire_type_ref()
        }};
        let opaque = quote! { ::wirepath::types::TypeRef::scalar(#ty_repr) };

        let (annotation, type_ref) = match &self.directive {
            None => (quote! { ::std::option::Option::None }, opaque),
            Some(Directive::Skip) => (
                quote! { ::std::option::Option::Some(::wirepath::types::FieldAnnotation::skip()) },
                opaque,
            ),
            Some(Directive::Inline) => (
                quote! { ::std::option::Option::Some(::wirepath::types::FieldAnnotation::inline()) },
                described,
            ),
            Some(Directive::Name(wire)) => (
                quote! { ::std::option::Option::Some(::wirepath::types::FieldAnnotation::named(#wire)) },
                described,
            ),
        };

        quote! {
            ::wirepath::types::FieldDescriptor::new(#name, #annotation, #type_ref)
        }
    }
}

/// Source text of `ty` without the token spacing `quote` adds.
fn type_repr(ty: &Type) -> String {
    quote!(#ty)
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
}

fn parse_wire_attr(attr: &Attribute) -> Result<Directive> {
    if !matches!(attr.meta, syn::Meta::List(_)) {
        return Err(Error::new(attr.span(), EXPECTED_DIRECTIVE));
    }
    let span = attr.span();
    attr.parse_args_with(|input: ParseStream| parse_directive(input, span))
}

fn parse_directive(input: ParseStream, span: Span) -> Result<Directive> {
    if input.is_empty() {
        return Err(Error::new(span, EXPECTED_DIRECTIVE));
    }

    let mut found: Vec<(Directive, Span)> = Vec::new();
    while !input.is_empty() {
        if input.peek(LitStr) {
            let lit: LitStr = input.parse()?;
            found.push((Directive::Name(lit.value()), lit.span()));
        } else {
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    found.push((Directive::Name(lit.value()), lit.span()));
                }
                "skip" => found.push((Directive::Skip, key.span())),
                "inline" => found.push((Directive::Inline, key.span())),
                other => {
                    return Err(Error::new(
                        key.span(),
                        format!("unknown wire option `{other}`, expected name, skip, or inline"),
                    ));
                }
            }
        }

        if input.is_empty() {
            break;
        }
        input.parse::<Token![,]>()?;
    }

    if let Some((_, extra)) = found.get(1) {
        return Err(Error::new(
            *extra,
            "a field takes exactly one of a wire name, `skip`, or `inline`",
        ));
    }
    let Some((directive, at)) = found.pop() else {
        return Err(Error::new(span, EXPECTED_DIRECTIVE));
    };
    if let Directive::Name(wire) = &directive
        && wire.is_empty()
    {
        return Err(Error::new(at, "wire name cannot be empty"));
    }
    Ok(directive)
}

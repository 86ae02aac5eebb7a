use super::*;

pub(crate) struct ParsedModel {
    name: Ident,
    fields: Vec<ParsedField>,
}

impl ParsedModel {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        if let Some(attr) = input.attrs.iter().find(|attr| attr.path().is_ident("wire")) {
            return Err(Error::new(attr.span(), "#[wire(...)] goes on fields, not on the struct"));
        }
        if !input.generics.params.is_empty() {
            return Err(Error::new(
                input.generics.span(),
                "WireModel cannot be derived for generic structs; register a RecordDescriptor by hand instead",
            ));
        }

        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named
                    .named
                    .iter()
                    .map(ParsedField::from_field)
                    .collect::<Result<Vec<_>>>()?,
                _ => return Err(Error::new(input.ident.span(), "WireModel requires named fields")),
            },
            _ => return Err(Error::new(input.ident.span(), "WireModel can only be derived for structs")),
        };

        Ok(Self {
            name: input.ident.clone(),
            fields,
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let field_inits = self.fields.iter().map(ParsedField::to_descriptor_tokens);

        quote! {
            impl ::wirepath::types::WireType for #name {
                fn type_ref() -> ::wirepath::types::TypeRef {
                    ::wirepath::types::TypeRef::Record(<#name as ::wirepath::types::WireModel>::record_key())
                }
            }

            impl ::wirepath::types::WireModel for #name {
                fn record_key() -> ::wirepath::types::RecordKey {
                    ::wirepath::types::RecordKey::from_static(::std::any::type_name::<#name>())
                }

                fn record_descriptor() -> ::wirepath::types::RecordDescriptor {
                    ::wirepath::types::RecordDescriptor {
                        key: <#name as ::wirepath::types::WireModel>::record_key(),
                        fields: ::std::vec![#(#field_inits),*],
                    }
                }
            }

            ::wirepath::inventory::submit! {
                ::wirepath::registry::ModelRegistration::new(
                    <#name as ::wirepath::types::WireModel>::record_key,
                    <#name as ::wirepath::types::WireModel>::record_descriptor,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn error_of(input: DeriveInput) -> String {
        ParsedModel::from_input(&input).err().expect("input rejected").to_string()
    }

    #[test]
    fn keeps_declaration_order() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[wire("name")]
                name: String,
                scratch: u8,
                #[wire(skip)]
                secret: String,
                #[wire(inline)]
                audit: Audit,
            }
        };
        let parsed = ParsedModel::from_input(&input).unwrap();
        let names: Vec<_> = parsed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "scratch", "secret", "audit"]);
        assert!(parsed.fields[1].directive.is_none());
        assert_eq!(parsed.fields[3].directive, Some(Directive::Inline));
    }

    #[test]
    fn emits_record_key_and_registration() {
        let input: DeriveInput = parse_quote! {
            struct Order {
                #[wire("total")]
                total: u64,
            }
        };
        let tokens = ParsedModel::from_input(&input).unwrap().emit().to_string();
        assert!(tokens.contains("type_name :: < Order >"));
        assert!(tokens.contains("record_key"));
        assert!(tokens.contains("inventory :: submit"));
        assert!(tokens.contains("ModelRegistration :: new"));
    }

    #[test]
    fn rejects_unsupported_shapes() {
        assert!(error_of(parse_quote! { enum Shape { Circle, Square } }).contains("only be derived for structs"));
        assert!(error_of(parse_quote! { struct Pair(String, String); }).contains("named fields"));
        assert!(error_of(parse_quote! { struct Page<T> { #[wire("items")] items: Vec<T> } }).contains("generic"));
        assert!(
            error_of(parse_quote! {
                #[wire("user")]
                struct User { #[wire("name")] name: String }
            })
            .contains("goes on fields")
        );
    }

    #[test]
    fn field_errors_propagate() {
        let err = error_of(parse_quote! {
            struct User {
                #[wire("name")]
                name: String,
                #[wire(hidden)]
                age: u8,
            }
        });
        assert!(err.contains("unknown wire option `hidden`"));
    }
}

//! `#[derive(Reflect)]` for `ruststack-attributevalue`.
//!
//! Named structs become records: the derive emits a static field table and
//! index based field accessors. Records are never zero, so `omitempty` keeps
//! a nested record even when all of its fields are empty. Single-field tuple structs are transparent
//! newtypes that expose the wrapped value directly.
//!
//! Field attributes, all under `#[attrvalue(...)]`:
//!
//! * `key = "annotation"` stores a raw annotation under a tag key, for
//!   example `dynamodbav = "name,omitempty"` or `json = "name"`.
//! * `embed` promotes the members of a nested record (optionally behind
//!   `Option` or `Box`) into the outer record.
//!
//! Container attributes `#[attrvalue(marshaler, unmarshaler)]` route the type
//! through its own `Marshaler` and `Unmarshaler` implementations.
//! `text_marshaler`, `binary_marshaler`, `text_unmarshaler` and
//! `binary_unmarshaler` expose the matching encoding traits, which the codec
//! uses only when the encoder or decoder opts in.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Fields, FieldsNamed, GenericArgument, PathArguments, Type,
    parse_macro_input,
};

const ATTR: &str = "attrvalue";

/// Derives `Reflect` for a record or a newtype.
///
/// ```ignore
/// #[derive(Default, Reflect)]
/// struct Order {
///     #[attrvalue(dynamodbav = "pk")]
///     id: String,
///     #[attrvalue(embed)]
///     audit: Option<Audit>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(attrvalue))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic types",
        ));
    }
    let container = ContainerAttrs::parse(&input.attrs)?;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Reflect can only be derived for structs",
        ));
    };
    match &data.fields {
        Fields::Named(fields) => expand_record(input, fields, &container),
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            Ok(expand_newtype(input, &container))
        }
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "Reflect can only be derived for structs with named fields or single-field newtypes",
        )),
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A capability hook of `Reflect` that a container flag switches on.
struct Capability {
    flag: &'static str,
    method: &'static str,
    trait_name: &'static str,
    mutable: bool,
}

const CAPABILITIES: &[Capability] = &[
    Capability {
        flag: "marshaler",
        method: "as_marshaler",
        trait_name: "Marshaler",
        mutable: false,
    },
    Capability {
        flag: "unmarshaler",
        method: "as_unmarshaler",
        trait_name: "Unmarshaler",
        mutable: true,
    },
    Capability {
        flag: "text_marshaler",
        method: "as_text_marshaler",
        trait_name: "TextMarshaler",
        mutable: false,
    },
    Capability {
        flag: "binary_marshaler",
        method: "as_binary_marshaler",
        trait_name: "BinaryMarshaler",
        mutable: false,
    },
    Capability {
        flag: "text_unmarshaler",
        method: "as_text_unmarshaler",
        trait_name: "TextUnmarshaler",
        mutable: true,
    },
    Capability {
        flag: "binary_unmarshaler",
        method: "as_binary_unmarshaler",
        trait_name: "BinaryUnmarshaler",
        mutable: true,
    },
];

impl Capability {
    fn expand(&self, body: &TokenStream2) -> TokenStream2 {
        let method = format_ident!("{}", self.method);
        let trait_name = format_ident!("{}", self.trait_name);
        if self.mutable {
            quote! {
                fn #method(&mut self) -> ::core::option::Option<&mut dyn ::ruststack_attributevalue::#trait_name> {
                    #body
                }
            }
        } else {
            quote! {
                fn #method(&self) -> ::core::option::Option<&dyn ::ruststack_attributevalue::#trait_name> {
                    #body
                }
            }
        }
    }
}

#[derive(Default)]
struct ContainerAttrs {
    enabled: Vec<&'static str>,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
            attr.parse_nested_meta(|meta| {
                let Some(capability) = CAPABILITIES.iter().find(|c| meta.path.is_ident(c.flag))
                else {
                    let flags: Vec<_> = CAPABILITIES.iter().map(|c| c.flag).collect();
                    return Err(meta.error(format!("expected one of: {}", flags.join(", "))));
                };
                out.enabled.push(capability.flag);
                Ok(())
            })?;
        }
        Ok(out)
    }

    fn is_enabled(&self, capability: &Capability) -> bool {
        self.enabled.contains(&capability.flag)
    }

    /// Hooks returning `self` for every enabled flag.
    fn capabilities(&self) -> TokenStream2 {
        let own = quote! { ::core::option::Option::Some(self) };
        CAPABILITIES
            .iter()
            .filter(|c| self.is_enabled(c))
            .map(|c| c.expand(&own))
            .collect()
    }

    /// Every hook, returning `self` when enabled and forwarding to the
    /// wrapped value otherwise.
    fn newtype_capabilities(&self) -> TokenStream2 {
        CAPABILITIES
            .iter()
            .map(|c| {
                let body = if self.is_enabled(c) {
                    quote! { ::core::option::Option::Some(self) }
                } else {
                    let method = format_ident!("{}", c.method);
                    if c.mutable {
                        quote! { ::ruststack_attributevalue::Reflect::#method(&mut self.0) }
                    } else {
                        quote! { ::ruststack_attributevalue::Reflect::#method(&self.0) }
                    }
                };
                c.expand(&body)
            })
            .collect()
    }
}

#[derive(Default)]
struct FieldAttrs {
    tags: Vec<(String, String)>,
    embed: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("embed") {
                    out.embed = true;
                    return Ok(());
                }
                let Some(key) = meta.path.get_ident() else {
                    return Err(meta.error("expected a tag key such as `dynamodbav`"));
                };
                let key = key.unraw().to_string();
                let value: syn::LitStr = meta.value()?.parse()?;
                out.tags.push((key, value.value()));
                Ok(())
            })?;
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn expand_record(
    input: &DeriveInput,
    fields: &FieldsNamed,
    container: &ContainerAttrs,
) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = name.to_string();

    let mut infos = Vec::with_capacity(fields.named.len());
    let mut idents = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let field_name = ident.unraw().to_string();
        let tags = attrs.tags.iter().map(|(k, v)| quote! { (#k, #v) });
        let embedded = if attrs.embed {
            let inner = embedded_record_type(&field.ty);
            quote! {
                ::core::option::Option::Some(
                    <#inner as ::ruststack_attributevalue::RecordType>::record_type_info
                )
            }
        } else {
            quote! { ::core::option::Option::None }
        };
        infos.push(quote! {
            ::ruststack_attributevalue::FieldInfo {
                name: #field_name,
                tags: &[#(#tags),*],
                embedded: #embedded,
            }
        });
        idents.push(ident);
    }

    let indexes = 0..idents.len();
    let field_arms = idents.iter().zip(indexes.clone()).map(|(ident, i)| {
        quote! { #i => ::core::option::Option::Some(&self.#ident as &dyn ::ruststack_attributevalue::Reflect) }
    });
    let field_mut_arms = idents.iter().zip(indexes).map(|(ident, i)| {
        quote! { #i => ::core::option::Option::Some(&mut self.#ident as &mut dyn ::ruststack_attributevalue::Reflect) }
    });
    let capabilities = container.capabilities();

    Ok(quote! {
        impl ::ruststack_attributevalue::RecordType for #name {
            fn record_type_info() -> &'static ::ruststack_attributevalue::RecordInfo {
                static INFO: ::ruststack_attributevalue::RecordInfo = ::ruststack_attributevalue::RecordInfo {
                    type_name: #name_str,
                    type_id: ::core::any::TypeId::of::<#name>,
                    fields: &[#(#infos),*],
                };
                &INFO
            }
        }

        impl ::ruststack_attributevalue::Record for #name {
            fn record_info(&self) -> &'static ::ruststack_attributevalue::RecordInfo {
                <Self as ::ruststack_attributevalue::RecordType>::record_type_info()
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::ruststack_attributevalue::Reflect> {
                match index {
                    #(#field_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::ruststack_attributevalue::Reflect> {
                match index {
                    #(#field_mut_arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::ruststack_attributevalue::Reflect for #name {
            fn reflect_ref(&self) -> ::ruststack_attributevalue::ReflectRef<'_> {
                ::ruststack_attributevalue::ReflectRef::Record(self)
            }

            fn reflect_mut(&mut self) -> ::ruststack_attributevalue::ReflectMut<'_> {
                ::ruststack_attributevalue::ReflectMut::Record(self)
            }

            #capabilities

            fn is_zero(&self) -> bool {
                false
            }

            fn reset(&mut self) {
                #(::ruststack_attributevalue::Reflect::reset(&mut self.#idents);)*
            }
        }
    })
}

/// Strips `Option<..>` and `Box<..>` wrappers off an embedded field type.
fn embedded_record_type(ty: &Type) -> &Type {
    if let Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "Option" || segment.ident == "Box" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return embedded_record_type(inner);
                    }
                }
            }
        }
    }
    ty
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

fn expand_newtype(input: &DeriveInput, container: &ContainerAttrs) -> TokenStream2 {
    let name = &input.ident;
    let capabilities = container.newtype_capabilities();

    quote! {
        impl ::ruststack_attributevalue::Reflect for #name {
            fn reflect_ref(&self) -> ::ruststack_attributevalue::ReflectRef<'_> {
                ::ruststack_attributevalue::Reflect::reflect_ref(&self.0)
            }

            fn reflect_mut(&mut self) -> ::ruststack_attributevalue::ReflectMut<'_> {
                ::ruststack_attributevalue::Reflect::reflect_mut(&mut self.0)
            }

            #capabilities

            fn is_zero(&self) -> bool {
                ::ruststack_attributevalue::Reflect::is_zero(&self.0)
            }

            fn is_absent(&self) -> bool {
                ::ruststack_attributevalue::Reflect::is_absent(&self.0)
            }

            fn reset(&mut self) {
                ::ruststack_attributevalue::Reflect::reset(&mut self.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn test_should_strip_optional_and_boxed_wrappers() {
        let ty: Type = parse_quote!(Option<Box<crate::Audit>>);
        let inner: Type = parse_quote!(crate::Audit);
        assert_eq!(embedded_record_type(&ty), &inner);

        let plain: Type = parse_quote!(Audit);
        assert_eq!(embedded_record_type(&plain), &plain);
    }

    #[test]
    fn test_should_collect_tags_and_embed_flag() {
        let field: syn::Field = parse_quote! {
            #[attrvalue(dynamodbav = "name,omitempty", json = "n", embed)]
            value: Inner
        };
        let attrs = FieldAttrs::parse(&field.attrs).unwrap();
        assert!(attrs.embed);
        assert_eq!(
            attrs.tags,
            vec![
                ("dynamodbav".to_owned(), "name,omitempty".to_owned()),
                ("json".to_owned(), "n".to_owned()),
            ]
        );
    }

    #[test]
    fn test_should_reject_enums_and_generics() {
        let input: DeriveInput = parse_quote! { enum Kind { A, B } };
        assert!(expand(&input).is_err());

        let input: DeriveInput = parse_quote! { struct Wrapper<T> { value: T } };
        assert!(expand(&input).is_err());

        let input: DeriveInput = parse_quote! { struct Pair(u8, u8); };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn test_should_reject_unknown_container_flags() {
        let input: DeriveInput = parse_quote! {
            #[attrvalue(serializer)]
            struct Item { id: String }
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn test_should_expose_encoding_capabilities() {
        let input: DeriveInput = parse_quote! {
            #[attrvalue(text_marshaler, binary_unmarshaler)]
            struct Pair { i: i32, j: i32 }
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("as_text_marshaler"));
        assert!(tokens.contains("as_binary_unmarshaler"));
        assert!(!tokens.contains("as_marshaler"));

        let input: DeriveInput = parse_quote! { struct Id(String); };
        let tokens = expand(&input).unwrap().to_string();
        for capability in CAPABILITIES {
            assert!(tokens.contains(capability.method));
        }
    }
}

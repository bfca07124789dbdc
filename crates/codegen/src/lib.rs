//! Derive macros for argo.
//!
//! - `#[derive(JsonObject)]` on a struct with named fields generates its
//!   member table and a `Codable` impl with the object shape.
//! - `#[derive(JsonVariants)]` on an enum of single-field tuple variants
//!   generates a `Codable` impl with one variant per enum variant.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, Generics, LitStr, Result as SynResult,
};

#[proc_macro_derive(JsonObject, attributes(json))]
pub fn derive_json_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match json_object(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(JsonVariants)]
pub fn derive_json_variants(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match json_variants(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    skip: bool,
    read_only: bool,
}

fn field_options(attrs: &[Attribute]) -> SynResult<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("json")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                options.rename = Some(name.value());
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("read_only") {
                options.read_only = true;
            } else {
                return Err(meta.error("expected `rename`, `skip` or `read_only`"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

fn encode_only(attrs: &[Attribute]) -> SynResult<bool> {
    let mut encode_only = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("json")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("encode_only") {
                encode_only = true;
                Ok(())
            } else {
                Err(meta.error("expected `encode_only`"))
            }
        })?;
    }
    Ok(encode_only)
}

/// Every type parameter must itself be codable.
fn with_codable_bounds(mut generics: Generics) -> Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::argo::Codable));
    }
    generics
}

fn json_object(input: DeriveInput) -> SynResult<TokenStream2> {
    let name = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "JsonObject can only be derived for structs"));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(name, "JsonObject needs a struct with named fields"));
    };

    let mut members = Vec::new();
    for field in &fields.named {
        let options = field_options(&field.attrs)?;
        if options.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let key = options.rename.unwrap_or_else(|| ident.unraw().to_string());
        members.push(if options.read_only {
            quote! {
                ::argo::EncodingMember::<Self>::read_only(#key, |value| &value.#ident)
            }
        } else {
            quote! {
                ::argo::EncodingMember::<Self>::field(#key, |value| &value.#ident, |value, member| value.#ident = member)
            }
        });
    }

    let encode_only = encode_only(&input.attrs)?;
    let shape = if encode_only {
        quote! {
            ::argo::Descriptor::<Self>::new().object(::argo::ObjectForm::encode_only())
        }
    } else {
        quote! {
            ::argo::Descriptor::<Self>::new()
                .object(::argo::ObjectForm::new(<Self as ::std::default::Default>::default))
                .or_null(<Self as ::std::default::Default>::default)
        }
    };

    let generics = with_codable_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let mut constructible = generics.clone();
    if !encode_only {
        constructible
            .make_where_clause()
            .predicates
            .push(parse_quote!(Self: ::std::default::Default));
    }
    let (_, _, codable_where_clause) = constructible.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::argo::JsonObject for #name #ty_generics #where_clause {
            fn members() -> ::std::vec::Vec<::argo::EncodingMember<Self>> {
                ::std::vec![#(#members),*]
            }
        }

        impl #impl_generics ::argo::Codable for #name #ty_generics #codable_where_clause {
            fn descriptor() -> ::argo::Descriptor<Self> {
                #shape
            }
        }
    })
}

fn json_variants(input: DeriveInput) -> SynResult<TokenStream2> {
    let name = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "JsonVariants can only be derived for enums"));
    };

    let mut variants = Vec::new();
    for variant in &data.variants {
        let single = matches!(&variant.fields, Fields::Unnamed(fields) if fields.unnamed.len() == 1);
        if !single {
            return Err(syn::Error::new_spanned(
                variant,
                "JsonVariants needs every variant to hold exactly one unnamed field",
            ));
        }
        let ident = &variant.ident;
        variants.push(quote! {
            .variant(Self::#ident, |value| match value {
                Self::#ident(inner) => ::std::option::Option::Some(inner),
                #[allow(unreachable_patterns)]
                _ => ::std::option::Option::None,
            })
        });
    }

    let generics = with_codable_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::argo::Codable for #name #ty_generics #where_clause {
            fn descriptor() -> ::argo::Descriptor<Self> {
                ::argo::Descriptor::<Self>::new()
                    .variants(::argo::VariantSet::<Self>::new() #(#variants)*)
            }
        }
    })
}

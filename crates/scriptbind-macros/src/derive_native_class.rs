//! Implementation of the `#[derive(NativeClass)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input, spanned::Spanned};

use crate::attrs::{FieldAttrs, TypeAttrs};

pub fn derive_native_class_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_native_class_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_native_class_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let attrs = TypeAttrs::from_attrs(&input.attrs)?;
    let script_name = attrs.name.clone().unwrap_or_else(|| name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let members = collect_members(input)?;
    let conversions = if attrs.opaque {
        TokenStream2::new()
    } else {
        generate_conversions(input)
    };

    Ok(quote! {
        impl #impl_generics ::scriptbind::NativeClass for #name #ty_generics #where_clause {
            const NAME: &'static str = #script_name;
        }

        impl #impl_generics ::scriptbind::ClassMembers for #name #ty_generics #where_clause {
            fn members() -> ::std::vec::Vec<::scriptbind::class::Member<Self>> {
                ::std::vec![#(#members),*]
            }
        }

        #conversions
    })
}

/// Build one member descriptor per bound field, in declaration order.
fn collect_members(input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    let mut members = Vec::new();

    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span,
                "NativeClass can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "NativeClass can only be derived for structs",
            ));
        }
    };

    match &data.fields {
        Fields::Named(fields) => {
            for field in &fields.named {
                let field_attrs = FieldAttrs::from_attrs(&field.attrs)?;
                if !field_attrs.is_bound() {
                    continue;
                }

                let Some(field_name) = field.ident.as_ref() else {
                    continue;
                };
                let member_name = field_attrs
                    .name
                    .clone()
                    .unwrap_or_else(|| field_name.to_string());

                members.push(if field_attrs.set {
                    quote! {
                        ::scriptbind::class::Member::field(
                            #member_name,
                            ::scriptbind::field!(Self, #field_name),
                        )
                    }
                } else {
                    quote! {
                        ::scriptbind::class::Member::readonly_field(
                            #member_name,
                            ::scriptbind::readonly_field!(Self, #field_name),
                        )
                    }
                });
            }
        }
        Fields::Unnamed(fields) => {
            for field in &fields.unnamed {
                if FieldAttrs::from_attrs(&field.attrs)?.is_bound() {
                    return Err(syn::Error::new(
                        field.span(),
                        "only named fields can be exposed as members",
                    ));
                }
            }
        }
        Fields::Unit => {}
    }

    Ok(members)
}

/// Generate `ToScript`/`FromScript` going through the instance factory.
fn generate_conversions(input: &DeriveInput) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics ::scriptbind::ToScript for #name #ty_generics #where_clause {
            fn to_vm(
                self,
                runtime: &mut ::scriptbind::Runtime,
            ) -> ::std::result::Result<::scriptbind::Dynamic, ::scriptbind::ConversionError> {
                ::scriptbind::class::InstanceFactory::<Self>::emplace(runtime, self)
            }
        }

        impl #impl_generics ::scriptbind::FromScript for #name #ty_generics #where_clause {
            fn from_vm(
                slot: &::scriptbind::Dynamic,
                runtime: &::scriptbind::Runtime,
            ) -> ::std::result::Result<Self, ::scriptbind::ConversionError> {
                ::scriptbind::class::InstanceFactory::<Self>::read(slot, runtime)
            }
        }
    }
}

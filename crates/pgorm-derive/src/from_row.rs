//! FromRow derive macro implementation.
//!
//! Builds a field index once (`column name -> field`), then for each row assigns from
//! columns present on it. Columns the row doesn't carry are simply not matched, so the
//! field keeps its `Default::default()` value; columns the row carries but the struct
//! doesn't know about are silently skipped. Every plain field's type must implement
//! `Default`.
//!
//! An `#[orm(embed)]` field (`Option<T>` or `Option<Box<T>>` where `T: Record +
//! FromRow`) is allocated on demand: it stays `None` unless the row carries at least
//! one of `T`'s columns (per `T::all_columns()`), mirroring `Record`'s own embedded
//! flattening so a row round-tripped through `Record` projects back symmetrically.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

use crate::common::syn_types::{box_inner, option_inner};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "FromRow can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRow can only be derived for structs",
            ))
        }
    };

    let mut defaults = Vec::new();
    let mut match_arms = Vec::new();
    let mut embed_assignments = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().unwrap();
        defaults.push(quote! { #field_name: ::core::default::Default::default() });

        if is_embed(field) {
            let inner_ty = embed_inner_type(field)?;
            let wrap = if is_boxed_embed(field) {
                quote! { ::std::boxed::Box::new(embedded) }
            } else {
                quote! { embedded }
            };
            embed_assignments.push(quote! {
                {
                    let embedded_cols = <#inner_ty as pgorm::record::Record>::all_columns();
                    let any_present = row.columns().iter().any(|c| embedded_cols.contains(&c.name()));
                    if any_present {
                        let embedded = <#inner_ty as pgorm::FromRow>::from_row(row)?;
                        out.#field_name = Some(#wrap);
                    }
                }
            });
        } else {
            let column_name = get_column_name(field);
            match_arms.push(quote! {
                #column_name => out.#field_name = row.try_get_column(#column_name)?,
            });
        }
    }

    Ok(quote! {
        impl #impl_generics pgorm::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &tokio_postgres::Row) -> pgorm::OrmResult<Self> {
                use pgorm::RowExt;
                let mut out = #name { #(#defaults),* };
                for column in row.columns() {
                    match column.name() {
                        #(#match_arms)*
                        _ => {}
                    }
                }
                #(#embed_assignments)*
                Ok(out)
            }
        }
    })
}

fn is_embed(field: &syn::Field) -> bool {
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("embed") {
                    found = true;
                }
                Ok(())
            });
            if found {
                return true;
            }
        }
    }
    false
}

/// Resolve the `T` in an `#[orm(embed)]` field declared as `Option<T>` or
/// `Option<Box<T>>`.
fn embed_inner_type(field: &syn::Field) -> Result<&syn::Type> {
    let option_ty = option_inner(&field.ty).ok_or_else(|| {
        syn::Error::new_spanned(
            &field.ty,
            "#[orm(embed)] fields must be Option<T> or Option<Box<T>>",
        )
    })?;
    Ok(box_inner(option_ty).unwrap_or(option_ty))
}

fn is_boxed_embed(field: &syn::Field) -> bool {
    option_inner(&field.ty).is_some_and(|inner| box_inner(inner).is_some())
}

fn get_column_name(field: &syn::Field) -> String {
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            if let Ok(nested) = attr.parse_args::<syn::MetaNameValue>() {
                if nested.path.is_ident("column") {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) = &nested.value
                    {
                        return lit.value();
                    }
                }
            }
        }
    }
    field.ident.as_ref().unwrap().to_string()
}

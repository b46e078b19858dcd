//! Record derive macro implementation.
//!
//! Generates `Record::all_columns()`/`record_entries()` for a struct, replacing the
//! runtime struct-tag reflection the original used. A plain field contributes one
//! column; an `#[orm(embed)]` field (`Option<T>` or `Option<Box<T>>` where `T: Record`)
//! flattens `T`'s own columns into the parent, marking them `Unavailable` when the
//! embedded value is `None`.

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
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(&input, "Record can only be derived for structs"));
        }
    };

    let mut columns_pushes = Vec::new();
    let mut entries_pushes = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().unwrap();

        if is_embed(field) {
            let inner_ty = embed_inner_type(field)?;
            columns_pushes.push(quote! {
                cols.extend(<#inner_ty as pgorm::record::Record>::all_columns());
            });
            entries_pushes.push(quote! {
                match &self.#field_name {
                    Some(embedded) => entries.extend(embedded.record_entries()),
                    None => entries.extend(
                        <#inner_ty as pgorm::record::Record>::all_columns()
                            .into_iter()
                            .map(|c| (c, pgorm::record::RecordSlot::Unavailable)),
                    ),
                }
            });
        } else {
            let column_name = get_column_name(field);
            columns_pushes.push(quote! {
                cols.push(#column_name);
            });
            entries_pushes.push(quote! {
                entries.push((
                    #column_name,
                    pgorm::record::RecordSlot::Value(self.#field_name.clone().into()),
                ));
            });
        }
    }

    Ok(quote! {
        impl #impl_generics pgorm::record::Record for #name #ty_generics #where_clause {
            fn all_columns() -> Vec<&'static str> {
                let mut cols: Vec<&'static str> = Vec::new();
                #(#columns_pushes)*
                cols
            }

            fn record_entries(&self) -> Vec<(&'static str, pgorm::record::RecordSlot)> {
                let mut entries: Vec<(&'static str, pgorm::record::RecordSlot)> = Vec::new();
                #(#entries_pushes)*
                entries
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

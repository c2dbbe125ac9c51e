use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive macro that generates a companion column store for a struct of
/// per-day scalar diagnostics. All fields must be `f64`.
///
/// For `struct DailyStats { mean: f64, .. }` it generates `DailyStatsColumns`
/// with one `Vec<f64>` per field plus `with_capacity`, `push`, `len`,
/// `is_empty`, `column(name)` and `columns()`. `DailyStats::COLUMN_NAMES`
/// lists the field names in declaration order.
///
/// Use `#[columns(name = "CustomName")]` to override the generated struct name.
#[proc_macro_derive(Columns, attributes(columns))]
pub fn derive_columns(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let store_name = match store_name_override(&input) {
        Ok(Some(custom)) => custom,
        Ok(None) => format_ident!("{}Columns", name),
        Err(err) => return err.to_compile_error().into(),
    };

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Columns can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Columns can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let mut idents = Vec::with_capacity(named.len());
    for field in named {
        if !is_f64(&field.ty) {
            return syn::Error::new_spanned(&field.ty, "Columns derive: every field must be f64")
                .to_compile_error()
                .into();
        }
        if let Some(ident) = &field.ident {
            idents.push(ident.clone());
        }
    }

    let Some(first) = idents.first() else {
        return syn::Error::new_spanned(name, "Columns struct needs at least one field")
            .to_compile_error()
            .into();
    };

    let names: Vec<String> = idents.iter().map(|i| i.to_string()).collect();
    let n_columns = idents.len();
    let store_doc = format!("Column store generated from [`{name}`], one `Vec<f64>` per field.");

    let expanded = quote! {
        #[doc = #store_doc]
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #store_name {
            #(pub #idents: Vec<f64>,)*
        }

        impl #store_name {
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#idents: Vec::with_capacity(n),)*
                }
            }

            pub fn push(&mut self, row: &#name) {
                #(self.#idents.push(row.#idents);)*
            }

            /// Number of rows.
            pub fn len(&self) -> usize {
                self.#first.len()
            }

            pub fn is_empty(&self) -> bool {
                self.#first.is_empty()
            }

            /// Column by field name.
            pub fn column(&self, name: &str) -> Option<&[f64]> {
                match name {
                    #(#names => Some(self.#idents.as_slice()),)*
                    _ => None,
                }
            }

            /// All columns as (name, values) in declaration order.
            pub fn columns(&self) -> [(&'static str, &[f64]); #n_columns] {
                [#((#names, self.#idents.as_slice()),)*]
            }
        }

        impl #name {
            pub const COLUMN_NAMES: &'static [&'static str] = &[#(#names),*];
        }
    };

    expanded.into()
}

fn store_name_override(input: &DeriveInput) -> syn::Result<Option<proc_macro2::Ident>> {
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("columns")) {
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            let nv = match meta {
                Meta::NameValue(nv) => nv,
                other => {
                    return Err(syn::Error::new_spanned(other, "expected `name = \"...\"`"));
                }
            };
            if !nv.path.is_ident("name") {
                return Err(syn::Error::new_spanned(nv.path, "unknown columns attribute"));
            }
            match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => return Ok(Some(format_ident!("{}", s.value()))),
                other => {
                    return Err(syn::Error::new_spanned(other, "name must be a string literal"));
                }
            }
        }
    }
    Ok(None)
}

fn is_f64(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(p) if p.qself.is_none() && p.path.is_ident("f64"))
}

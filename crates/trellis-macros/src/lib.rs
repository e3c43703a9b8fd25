//! Procedural macros for Trellis grid rows.
//!
//! This crate provides `#[derive(GridRow)]`, which generates the static field
//! table a grid needs: one entry per named field, in declaration order, with
//! the field's display metadata and a typed accessor.
//!
//! # Attributes
//!
//! ## `#[grid(...)]`
//!
//! ```ignore
//! #[derive(Clone, GridRow)]
//! struct Session {
//!     #[grid(filterable)]
//!     session_id: String,
//!
//!     #[grid(hidden, filterable)]
//!     user_agent: String,
//!
//!     #[grid(align = "right", format = "N0")]
//!     hits: u32,
//!
//!     #[grid(skip)]
//!     cache: Vec<u8>,
//! }
//! ```
//!
//! Field attributes:
//! - `hidden` / `show = bool`: column visibility (default visible)
//! - `sortable = bool`: whether the header accepts sort clicks (default true)
//! - `filterable` / `filterable = bool`: offer a filter input (default false)
//! - `align = "left" | "center" | "right"`: cell alignment (default left)
//! - `format = "..."`: display format string
//! - `skip`: leave the field out of the table entirely
//!
//! Fields without a `#[grid]` attribute get the defaults. Skipped fields do
//! not need to implement `ToFieldValue`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Expr, ExprLit, Field, Fields, Ident, Lit, LitBool, LitStr,
    parse_macro_input,
};

/// Derive `trellis_core::GridRow` and generate the static field table.
///
/// # Example
///
/// ```ignore
/// use trellis_macros::GridRow;
///
/// #[derive(Clone, GridRow)]
/// struct Invoice {
///     #[grid(filterable)]
///     customer: String,
///     #[grid(align = "right", format = "C2")]
///     total: f64,
/// }
///
/// let names: Vec<_> = Invoice::fields().iter().map(|f| f.meta.name).collect();
/// assert_eq!(names, ["customer", "total"]);
/// ```
#[proc_macro_derive(GridRow, attributes(grid))]
pub fn derive_grid_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_grid_row(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed `#[grid(...)]` information for one field.
struct ColumnInfo {
    field_name: Ident,
    show_in_grid: bool,
    sortable: bool,
    filterable: bool,
    align: Align,
    format: Option<String>,
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn tokens(self) -> TokenStream2 {
        match self {
            Align::Left => quote! { trellis_core::meta::Align::Left },
            Align::Center => quote! { trellis_core::meta::Align::Center },
            Align::Right => quote! { trellis_core::meta::Align::Right },
        }
    }
}

fn impl_derive_grid_row(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "GridRow derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "GridRow derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "GridRow derive only supports structs",
            ));
        }
    };

    let mut columns = Vec::new();
    for field in fields.iter() {
        if let Some(column) = parse_column(field)? {
            columns.push(column);
        }
    }

    let getter_fns = generate_getter_fns(struct_name, &columns);
    let descriptors = generate_descriptors(struct_name, &columns);
    let table_name = format_ident!("{}_GRID_FIELDS", struct_name.to_string().to_uppercase());
    let field_count = columns.len();
    let type_name_str = struct_name.to_string();

    Ok(quote! {
        #getter_fns

        /// Static field table for this type (generated by #[derive(GridRow)]).
        #[allow(non_upper_case_globals)]
        static #table_name: [trellis_core::meta::FieldDescriptor<#struct_name>; #field_count] =
            #descriptors;

        impl trellis_core::meta::GridRow for #struct_name {
            fn fields() -> &'static [trellis_core::meta::FieldDescriptor<Self>] {
                &#table_name
            }

            fn type_name() -> &'static str {
                #type_name_str
            }
        }
    })
}

/// Parse one named field into a column, or `None` if it is skipped.
fn parse_column(field: &Field) -> syn::Result<Option<ColumnInfo>> {
    let Some(field_name) = field.ident.clone() else {
        return Ok(None);
    };

    let mut column = ColumnInfo {
        field_name,
        show_in_grid: true,
        sortable: true,
        filterable: false,
        align: Align::Left,
        format: None,
    };
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("grid") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
            } else if meta.path.is_ident("hidden") {
                column.show_in_grid = false;
            } else if meta.path.is_ident("show") {
                column.show_in_grid = parse_bool(&meta)?;
            } else if meta.path.is_ident("sortable") {
                column.sortable = parse_bool(&meta)?;
            } else if meta.path.is_ident("filterable") {
                column.filterable = if meta.input.peek(syn::Token![=]) {
                    parse_bool(&meta)?
                } else {
                    true
                };
            } else if meta.path.is_ident("align") {
                let value: LitStr = meta.value()?.parse()?;
                column.align = match value.value().to_ascii_lowercase().as_str() {
                    "left" => Align::Left,
                    "center" => Align::Center,
                    "right" => Align::Right,
                    other => {
                        return Err(syn::Error::new_spanned(
                            &value,
                            format!("unknown alignment `{other}`, expected left, center or right"),
                        ));
                    }
                };
            } else if meta.path.is_ident("format") {
                let value: Expr = meta.value()?.parse()?;
                if let Expr::Lit(ExprLit {
                    lit: Lit::Str(lit_str),
                    ..
                }) = value
                {
                    column.format = Some(lit_str.value());
                } else {
                    return Err(meta.error("format expects a string literal"));
                }
            } else {
                return Err(meta.error("unsupported grid attribute"));
            }
            Ok(())
        })?;
    }

    if skip {
        return Ok(None);
    }
    Ok(Some(column))
}

fn parse_bool(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<bool> {
    let value: LitBool = meta.value()?.parse()?;
    Ok(value.value)
}

fn getter_name(struct_name: &Ident, field_name: &Ident) -> Ident {
    format_ident!(
        "__{}_{}_grid_getter",
        struct_name.to_string().to_lowercase(),
        field_name
    )
}

/// Generate one accessor function per column.
fn generate_getter_fns(struct_name: &Ident, columns: &[ColumnInfo]) -> TokenStream2 {
    let fns: Vec<TokenStream2> = columns
        .iter()
        .map(|column| {
            let field_name = &column.field_name;
            let getter = getter_name(struct_name, field_name);
            quote! {
                #[allow(non_snake_case)]
                fn #getter(row: &#struct_name) -> trellis_core::meta::FieldValue {
                    trellis_core::meta::ToFieldValue::to_field_value(&row.#field_name)
                }
            }
        })
        .collect();

    quote! { #(#fns)* }
}

/// Generate the descriptor array literal.
fn generate_descriptors(struct_name: &Ident, columns: &[ColumnInfo]) -> TokenStream2 {
    let entries: Vec<TokenStream2> = columns
        .iter()
        .map(|column| {
            let field_name_str = column.field_name.to_string();
            let getter = getter_name(struct_name, &column.field_name);
            let show_in_grid = column.show_in_grid;
            let sortable = column.sortable;
            let filterable = column.filterable;
            let align = column.align.tokens();
            let format = match &column.format {
                Some(f) => quote! { Some(#f) },
                None => quote! { None },
            };

            quote! {
                trellis_core::meta::FieldDescriptor {
                    meta: trellis_core::meta::FieldMeta {
                        name: #field_name_str,
                        show_in_grid: #show_in_grid,
                        sortable: #sortable,
                        filterable: #filterable,
                        align: #align,
                        format: #format,
                    },
                    get: #getter,
                }
            }
        })
        .collect();

    quote! { [#(#entries),*] }
}

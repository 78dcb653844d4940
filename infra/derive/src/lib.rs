#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared across the workspace. They remove the
//! boilerplate around two recurring patterns: domain error enums and
//! thread-safe feature slice handles.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Attribute macro for defining domain error enums.
///
/// Transforms a plain enum into a fully wired error type:
///
/// * Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * Generates a companion `<Name>Ext` trait adding `.context(...)` to
///   `Result<T, Name>` and to `Result<T, Source>` for every variant that
///   wraps an upstream error.
/// * Implements `From<Source>` for variants carrying a `source` field, so
///   upstream errors propagate with `?`.
/// * Implements `From<&'static str>` / `From<String>` when an `Internal`
///   variant exists.
///
/// Every variant must use named fields. Variants that carry a `source`
/// must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use atelier_derive::app_error;
/// use std::borrow::Cow;
///
/// #[app_error]
/// pub enum StoreError {
///     #[error("Query failed{}: {source}", fmt_context(.context))]
///     Query {
///         #[source]
///         source: surrealdb::Error,
///         context: Option<Cow<'static, str>>,
///     },
///     #[error("Internal store error{}: {message}", fmt_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn app_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Attribute macro for defining a feature slice handle.
///
/// Rewrites the annotated struct into the slice pattern used by the
/// kernel state registry:
///
/// 1. The struct body becomes `<Name>Inner`.
/// 2. `<Name>` becomes a cheap `Arc` wrapper with `Deref` to the inner
///    state.
/// 3. `FeatureSlice` is implemented so the handle can be registered in
///    the API state.
///
/// # Example
///
/// ```rust,ignore
/// #[atelier_derive::feature_slice]
/// pub struct Artists {
///     pub store: ArtistStore,
/// }
///
/// let slice = Artists::new(ArtistsInner { store });
/// ```
#[proc_macro_attribute]
pub fn feature_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand(input).into()
}

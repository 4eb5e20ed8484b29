#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared across the devcfg workspace.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! devcfg-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```
//!
//! The consuming crate must depend on `thiserror` because the generated code derives
//! `thiserror::Error`.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for the error enums of the workspace crates.
///
/// Every flag, profile and logger error follows the same shape: struct variants carrying either a
/// `message` or a `source`, plus an optional human context. This macro removes the wiring that
/// otherwise has to be repeated in each `error.rs`.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext` trait with `.context(...)` implemented for `Result<T, Name>`.
/// * For each variant with a `source` field (or a field marked `#[source]`/`#[from]`):
///   `From<Source> for Name` and `<Name>Ext` for `Result<T, Source>`.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Every variant uses named fields; tuple and unit variants are rejected.
/// 3. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 4. A variant with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[devcfg_derive::devcfg_error]
/// pub enum ProfileError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Settings, ProfileError> {
///     builder.build().context("Reading device profile")?.try_deserialize().map_err(Into::into)
/// }
/// ```
#[proc_macro_attribute]
pub fn devcfg_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}

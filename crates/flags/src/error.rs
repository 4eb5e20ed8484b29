//! # Flag Errors
//!
//! Collaborators report failures through [`FlagError`]. The resolver itself never surfaces them:
//! every lookup failure collapses into the caller's default. Errors only escape from
//! construction ([`crate::FlagResolverBuilder::build`]) and configuration loading.

use std::borrow::Cow;

#[devcfg_derive::devcfg_error]
pub enum FlagError {
    /// The package metadata service has no package with this name.
    #[error("Package not found{}: {message}", format_context(.context))]
    PackageNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The resource bundle has no value for this id.
    #[error("Resource not found{}: {message}", format_context(.context))]
    ResourceNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid module policy{}: {message}", format_context(.context))]
    InvalidPolicy { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Internal flag error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl FlagError {
    /// Shorthand used by package services for a missing package.
    pub fn package_not_found(package_name: impl Into<Cow<'static, str>>) -> Self {
        Self::PackageNotFound { message: package_name.into(), context: None }
    }

    /// Shorthand used by resource bundles for a missing id.
    pub fn resource_not_found(id: impl std::fmt::Display) -> Self {
        Self::ResourceNotFound { message: id.to_string().into(), context: None }
    }

    /// `true` for the two not-found conditions that collaborators are expected to signal.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::PackageNotFound { .. } | Self::ResourceNotFound { .. })
    }
}

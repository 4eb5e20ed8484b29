use devcfg_flags::FlagError;
use std::borrow::Cow;

#[devcfg_derive::devcfg_error]
pub enum ProfileError {
    /// The profile file is missing, malformed, or does not match the profile shape.
    #[error("Profile config error{}: {source}", format_context(.context))]
    Config { source: FlagError, context: Option<Cow<'static, str>> },

    #[error("Invalid device profile{}: {message}", format_context(.context))]
    InvalidProfile { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

use devcfg_derive::devcfg_error;
use std::borrow::Cow;

#[devcfg_error]
#[derive(Debug)]
pub enum LookupError {
    #[error("Package not found{}: {message}", format_context(.context))]
    PackageNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Nothing to add: {message}")]
    Bare { message: Cow<'static, str> },
}

fn main() {
    let err: Result<(), LookupError> =
        Err(LookupError::PackageNotFound { message: "com.example".into(), context: None });
    let err = err.context("Module lookup").unwrap_err();
    assert_eq!(err.to_string(), "Package not found (Module lookup): com.example");

    let bare: Result<(), LookupError> = Err(LookupError::Bare { message: "x".into() });
    assert!(matches!(bare.context("ignored"), Err(LookupError::Bare { .. })));
}

use devcfg_derive::devcfg_error;
use std::borrow::Cow;

#[devcfg_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    let raw: Result<(), std::io::Error> = Err(std::io::Error::other("disk"));
    raw.context("Reading profile")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading profile): disk");

    let internal: DemoError = "boom".into();
    assert_eq!(internal.to_string(), "Internal error: boom");

    let owned: Result<(), DemoError> = Err(DemoError::from(String::from("late")));
    let annotated = owned.context("Late stage").unwrap_err();
    assert_eq!(annotated.to_string(), "Internal error (Late stage): late");
}

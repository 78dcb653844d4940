use atelier_derive::app_error;
use std::borrow::Cow;

#[app_error]
pub enum SampleError {
    #[error("Parse failed{}: {source}", fmt_context(.context))]
    Parse {
        #[source]
        source: std::num::ParseIntError,
        context: Option<Cow<'static, str>>,
    },
    #[error("Rejected{}: {message}", fmt_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Internal error{}: {message}", fmt_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[test]
fn from_source_via_question_mark() {
    fn parse(s: &str) -> Result<i32, SampleError> {
        Ok(s.parse::<i32>()?)
    }

    let err = parse("not-a-number").unwrap_err();
    assert!(matches!(err, SampleError::Parse { context: None, .. }));
}

#[test]
fn context_attaches_to_source_results() {
    let res: Result<i32, _> = "x".parse::<i32>();
    let err = res.context("Parsing page number").unwrap_err();
    match err {
        SampleError::Parse { context, .. } => {
            assert_eq!(context.as_deref(), Some("Parsing page number"));
        },
        other => panic!("unexpected variant: {other}"),
    }
}

#[test]
fn context_attaches_to_own_results() {
    let res: Result<(), SampleError> =
        Err(SampleError::Rejected { message: "nope".into(), context: None });
    let err = res.context("Checking access").unwrap_err();
    assert!(err.to_string().contains("(Checking access)"));
}

#[test]
fn internal_from_strings() {
    let err: SampleError = "boom".into();
    assert!(matches!(err, SampleError::Internal { .. }));

    let err: SampleError = String::from("boom").into();
    assert!(err.to_string().contains("boom"));
}

#[test]
fn display_without_context_has_no_suffix() {
    let err = SampleError::Rejected { message: "denied".into(), context: None };
    assert_eq!(err.to_string(), "Rejected: denied");
}

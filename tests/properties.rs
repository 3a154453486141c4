use std::io;

use errtrail::{
    INIT_MARKER, NO_DATA, TrailError, Value, annotate, annotate_with, parse, parse_error,
    result_ext::ResultExt, trail,
};

#[test]
fn test_code_survives_annotation() {
    let mut error = TrailError::new("stable");
    for n in 0..10 {
        error = error.annotate_with([n]);
        assert_eq!(error.code(), "stable");
    }
    assert_eq!(error.trail().len(), 11);
}

#[test]
fn test_annotation_does_not_mutate() {
    let original = TrailError::with_context("code", ["first"]);
    let before = original.to_string();
    let annotated = original.annotate_with(["second"]);

    assert_eq!(original.to_string(), before);
    assert_eq!(original.trail().len(), 1);
    assert!(!annotated.is_same_instance(&original));
    assert_eq!(annotated.trail().len(), 2);
}

#[test]
fn test_free_function_passes_none_through() {
    assert!(annotate(None::<TrailError>).is_none());
    assert!(annotate_with(None::<io::Error>, ["ignored"]).is_none());
    assert!(parse_error(None).is_none());
}

#[test]
fn test_free_function_records_direct_caller() {
    let line = line!() + 1;
    let annotated = annotate(Some(TrailError::new("code"))).unwrap();
    let site = annotated.trail().last().site().to_string();
    assert!(site.contains(&format!("{}:{line}", file!())), "{site}");
}

#[test]
fn test_parse_error_returns_same_instance() {
    let error = TrailError::new("code");
    assert!(parse_error(Some(&error)).unwrap().is_same_instance(&error));
}

#[test]
fn test_parse_round_trip() {
    let error = trail!("round trip", 1, "two", 3.5, true, None::<u8>)
        .annotate_with([vec![1, 2]])
        .annotate();
    let text = error.to_string();
    let parsed = parse(&text).unwrap();

    assert_eq!(parsed.code(), error.code());
    assert_eq!(parsed.trail(), error.trail());
    assert_eq!(parsed.to_string(), text);
}

#[test]
fn test_parse_fallback() {
    assert!(parse("").is_none());

    for text in ["plain", "[not json", "{\"Code\": 1}", "[\"code\"]"] {
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.code(), text);
        assert_eq!(parsed.trail().len(), 1);
        assert_eq!(
            parsed.trail().first().context(),
            &[Value::from(INIT_MARKER)]
        );
    }
}

#[test]
fn test_foreign_error_interop() {
    let io_error = io::Error::other("disk full");
    let annotated = annotate_with(Some(io_error), ["writing snapshot"]).unwrap();

    assert_eq!(annotated.code(), "disk full");
    assert_eq!(annotated.trail().len(), 2);
    assert_eq!(
        annotated.trail().last().context(),
        &[Value::from("writing snapshot")]
    );
}

#[test]
fn test_result_ext_on_io_error() {
    let result = std::fs::read("/this/path/does/not/exist").annotate_with(["config"]);
    let error = result.unwrap_err();
    assert_eq!(error.trail().len(), 2);
    assert!(!error.code().is_empty());
}

#[test]
fn test_error_as_context() {
    let cause = TrailError::new("cause");
    let error = TrailError::new("effect").annotate_with([&cause]);
    assert_eq!(
        error.trail().last().context(),
        &[Value::Text(cause.to_string())]
    );

    // Text context decodes as a plain string.
    let parsed = parse(&error.to_string()).unwrap();
    assert_eq!(
        parsed.trail().last().context(),
        &[Value::Str(cause.to_string())]
    );
}

#[test]
fn test_no_data_sentinel() {
    let first: &TrailError = &NO_DATA;
    let second: &TrailError = &NO_DATA;
    assert!(first.is_same_instance(second));
    assert_eq!(NO_DATA.code(), "data not found");

    let annotated = errtrail::annotate!(&*NO_DATA, "user", 7);
    assert!(NO_DATA.equal(&annotated));
    assert_eq!(NO_DATA.trail().len(), 1);
}

#[test]
fn test_macros() {
    let error = trail!("code");
    assert_eq!(error.trail().first().context(), &[Value::from(INIT_MARKER)]);

    let annotated = errtrail::annotate!(error.clone(), "id", 7_u64, -1);
    assert_eq!(
        annotated.trail().last().context(),
        &[Value::from("id"), Value::Int(7), Value::Int(-1)]
    );

    let io_error = io::Error::other("denied");
    let annotated = errtrail::annotate!(&io_error);
    assert_eq!(annotated.code(), "denied");
    assert!(annotated.trail().last().context().is_empty());

    fn fails() -> errtrail::Result<()> {
        errtrail::bail!("bailed", 1);
    }
    assert_eq!(fails().unwrap_err().code(), "bailed");
}

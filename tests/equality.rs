use std::{error::Error, io};

use errtrail::{TrailError, annotate, annotate_with, equal, parse_error};

#[derive(Debug, thiserror::Error)]
#[error("request failed")]
struct RequestFailed(#[source] TrailError);

fn foreign(code: &str) -> io::Error {
    io::Error::other(code.to_string())
}

fn resolved(error: &(dyn Error + 'static)) -> TrailError {
    parse_error(Some(error)).unwrap()
}

#[test]
fn test_equal_by_code_across_forms() {
    let cases: Vec<(TrailError, TrailError)> = vec![
        (TrailError::new("New"), TrailError::new("New")),
        (TrailError::new("New"), resolved(&TrailError::new("New"))),
        (TrailError::new("New"), resolved(&foreign("New"))),
        (TrailError::new("New"), annotate(Some(TrailError::new("New"))).unwrap()),
        (TrailError::new("New"), annotate(Some(foreign("New"))).unwrap()),
        (
            TrailError::new("New"),
            annotate_with(Some(TrailError::new("New")), ["reason"]).unwrap(),
        ),
        (
            TrailError::new("New"),
            annotate_with(Some(foreign("New")), ["reason"]).unwrap(),
        ),
        (
            resolved(&TrailError::new("Parsed")),
            resolved(&TrailError::new("Parsed")),
        ),
        (resolved(&TrailError::new("Parsed")), resolved(&foreign("Parsed"))),
        (
            resolved(&TrailError::new("Parsed")),
            annotate_with(Some(foreign("Parsed")), ["reason"]).unwrap(),
        ),
    ];

    for (index, (left, right)) in cases.iter().enumerate() {
        assert!(left.equal(right), "case {index}: {left} vs {right}");
        assert!(equal(Some(left), Some(right)), "case {index}");
        assert!(equal(Some(right), Some(left)), "case {index}");
    }
}

#[test]
fn test_different_codes_differ() {
    let left = TrailError::new("A");
    assert!(!left.equal(&TrailError::new("B")));
    assert!(!left.equal(&foreign("B")));
    assert!(!equal(Some(&left), Some(&foreign("a"))));
}

#[test]
fn test_foreign_errors_compare_by_text() {
    assert!(equal(Some(&foreign("X")), Some(&foreign("X"))));
    assert!(!equal(Some(&foreign("X")), Some(&foreign("Y"))));
}

#[test]
fn test_absent_errors() {
    assert!(equal(None, None));
    assert!(!equal(Some(&TrailError::new("X")), None));
    assert!(!equal(None, Some(&foreign("X"))));
}

#[test]
fn test_wrapped_error_equals_its_source() {
    let sentinel = TrailError::new("not found");
    let wrapper = RequestFailed(errtrail::annotate!(&sentinel, "user", 7));

    assert!(equal(Some(&wrapper), Some(&sentinel)));
    assert!(sentinel.equal(&wrapper));
    // Without a match in the chain, the wrapper's own text is its code.
    assert!(TrailError::new("request failed").equal(&RequestFailed(TrailError::new("x"))));
    assert!(!TrailError::new("x").annotate().equal(&TrailError::new("request failed")));
}

#[test]
fn test_encoded_foreign_error_equals_original() {
    let original = TrailError::new("timeout").annotate();
    let carried = foreign(&original.to_string());
    assert!(original.equal(&carried));
    assert!(equal(Some(&carried), Some(&original)));
}

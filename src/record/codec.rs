//! Text encoding of [`TrailError`] and resolution of foreign errors.
//!
//! The canonical form is a JSON array: `["code", ["site", ctx...], ...]`.
//! Decoding also accepts the older object form
//! `{"Code": "code", "As": [["site", ctx...], ...]}`.

use alloc::{
    borrow::Cow,
    string::{String, ToString},
    vec::Vec,
};
use core::{fmt, panic::Location};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
    ser::SerializeSeq,
};
use triomphe::Arc;

use super::TrailError;
use crate::{entry::Entry, trail::Trail};

/// Parses the text form of an error.
///
/// - Empty text gives `None`.
/// - Text starting with `[` or `{` is decoded as an encoded [`TrailError`],
///   keeping its code and trail.
/// - Anything else, and structured text that fails to decode, becomes a new
///   error whose code is the whole text, created at the caller.
///
/// Parsing never fails otherwise.
///
/// ```
/// let parsed = errtrail::parse("connection refused").unwrap();
/// assert_eq!(parsed.code(), "connection refused");
///
/// let parsed = errtrail::parse(r#"["timeout",["db.rs:3:1","[init]"]]"#).unwrap();
/// assert_eq!(parsed.code(), "timeout");
/// assert_eq!(parsed.trail().first().site().as_str(), "db.rs:3:1");
///
/// assert!(errtrail::parse("").is_none());
/// ```
#[track_caller]
pub fn parse(text: &str) -> Option<TrailError> {
    if text.is_empty() {
        return None;
    }
    Some(TrailError::parse_at(text, Location::caller()))
}

fn is_structured(text: &str) -> bool {
    text.starts_with(['[', '{'])
}

impl TrailError {
    /// Resolves any error into a [`TrailError`].
    ///
    /// A `TrailError` is returned as the same instance. Any other error is
    /// rendered with [`Display`](fmt::Display) and the text is parsed as by
    /// [`parse`], so a foreign error whose text is an encoded `TrailError`
    /// gets its code and trail back.
    ///
    /// ```
    /// use errtrail::TrailError;
    ///
    /// let original = TrailError::new("boom");
    /// assert!(TrailError::from_dyn(&original).is_same_instance(&original));
    ///
    /// let io = std::io::Error::other("boom");
    /// assert_eq!(TrailError::from_dyn(&io).code(), "boom");
    /// ```
    #[track_caller]
    #[must_use]
    pub fn from_dyn(error: &(dyn core::error::Error + 'static)) -> Self {
        Self::resolve_at(error, Location::caller())
    }

    pub(crate) fn resolve_at(
        error: &(dyn core::error::Error + 'static),
        location: &'static Location<'static>,
    ) -> Self {
        if let Some(record) = error.downcast_ref::<TrailError>() {
            return record.clone();
        }
        Self::parse_at(&error.to_string(), location)
    }

    pub(crate) fn parse_at(text: &str, location: &'static Location<'static>) -> Self {
        if is_structured(text)
            && let Ok(record) = serde_json::from_str::<TrailError>(text)
        {
            return record;
        }
        Self::new_at(String::from(text), location, Vec::new())
    }
}

/// The code `error` resolves to, without building a record.
pub(super) fn resolved_code<'a>(error: &'a (dyn core::error::Error + 'static)) -> Cow<'a, str> {
    if let Some(record) = error.downcast_ref::<TrailError>() {
        return Cow::Borrowed(record.code());
    }
    let text = error.to_string();
    if is_structured(&text)
        && let Ok(record) = serde_json::from_str::<TrailError>(&text)
    {
        return Cow::Owned(record.code().to_string());
    }
    Cow::Owned(text)
}

impl Serialize for TrailError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let trail = self.trail();
        let mut seq = serializer.serialize_seq(Some(1 + trail.len()))?;
        seq.serialize_element(self.code())?;
        for entry in trail {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for TrailError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordVisitor)
    }
}

struct RecordVisitor;

impl RecordVisitor {
    fn build<E: de::Error>(code: String, entries: Vec<Entry>) -> Result<TrailError, E> {
        let Some(trail) = Trail::from_entries(entries) else {
            return Err(E::invalid_length(0, &"at least one trail entry"));
        };
        Ok(TrailError::from_parts(Arc::new(code), trail))
    }
}

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = TrailError;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of an error code followed by trail entries")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<TrailError, A::Error> {
        let code: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(1));
        while let Some(entry) = seq.next_element::<Entry>()? {
            entries.push(entry);
        }
        Self::build(code, entries)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TrailError, A::Error> {
        let mut code = None;
        let mut entries = None;
        while let Some(key) = map.next_key::<Cow<'de, str>>()? {
            match &*key {
                "Code" => code = Some(map.next_value::<String>()?),
                "As" => entries = Some(map.next_value::<Vec<Entry>>()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        let code = code.ok_or_else(|| de::Error::missing_field("Code"))?;
        let entries = entries.ok_or_else(|| de::Error::missing_field("As"))?;
        Self::build(code, entries)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString};

    use super::*;
    use crate::Value;

    #[test]
    fn test_encoding_shape() {
        let error = TrailError::with_context("code", [1, 2]).annotate_with(["why"]);
        let decoded: serde_json::Value = serde_json::from_str(&error.to_string()).unwrap();
        let items = decoded.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], "code");
        assert_eq!(items[1][1], 1);
        assert_eq!(items[1][2], 2);
        assert_eq!(items[2][1], "why");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let error = TrailError::new("code").annotate_with([1.5]);
        assert_eq!(error.to_string(), error.to_string());
        assert_eq!(error.to_json().unwrap(), error.to_string());
        assert_eq!(error.to_json_pretty().unwrap(), format!("{error:#}"));
    }

    #[test]
    fn test_decode_preserves_trail() {
        let error = TrailError::new("code").annotate_with(["a", "b"]);
        let decoded = parse(&error.to_string()).unwrap();
        assert_eq!(decoded.code(), "code");
        assert_eq!(decoded.trail(), error.trail());
        assert!(!decoded.is_same_instance(&error));
    }

    #[test]
    fn test_decode_deeply_nested_context() {
        let deep = (0..130).fold(Value::Int(1), |value, _| Value::List(alloc::vec![value]));
        let error = TrailError::new("code").annotate_with([deep]);
        let decoded = parse(&error.to_string()).unwrap();
        assert_eq!(decoded.code(), error.code());
        assert_eq!(decoded.trail().len(), 2);
        assert_eq!(decoded.to_string(), error.to_string());
    }

    #[test]
    fn test_legacy_object_form() {
        let text = r#"{"Code":"data not found","As":[["loader::fetch(loader.rs:10)","[init]"],["loader::run(loader.rs:15)","[2]"]]}"#;
        let decoded = parse(text).unwrap();
        assert_eq!(decoded.code(), "data not found");
        assert_eq!(decoded.trail().len(), 2);
        assert_eq!(
            decoded.trail().last().site().as_str(),
            "loader::run(loader.rs:15)"
        );
        assert_eq!(decoded.trail().last().context(), &[Value::from("[2]")]);
    }

    #[test]
    fn test_malformed_structured_text_falls_back() {
        for text in [
            "[",
            "[]",
            r#"["code"]"#,
            r#"[1, ["a.rs:1"]]"#,
            r#"["code", "not an entry"]"#,
            r#"["code", []]"#,
            r#"{"Code": "code"}"#,
            "{not json}",
        ] {
            let parsed = parse(text).unwrap();
            assert_eq!(parsed.code(), text);
            assert_eq!(parsed.trail().len(), 1);
            assert!(parsed.trail().first().site().as_str().contains(file!()));
        }
    }

    #[test]
    fn test_leading_whitespace_is_not_structured() {
        let text = r#" ["code",["a.rs:1"]]"#;
        assert_eq!(parse(text).unwrap().code(), text);
    }

    #[derive(Debug)]
    struct EncodedError(String);

    impl fmt::Display for EncodedError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl core::error::Error for EncodedError {}

    #[test]
    fn test_resolved_code() {
        let error = TrailError::new("code");
        assert_eq!(resolved_code(&error), "code");
        assert_eq!(resolved_code(&EncodedError(error.to_string())), "code");
        assert_eq!(resolved_code(&EncodedError("plain".to_string())), "plain");
    }

    #[test]
    fn test_unstructured_text_is_code() {
        let parsed = parse("plain text").unwrap();
        assert_eq!(parsed.code(), "plain text");
        assert!(parsed.to_string().starts_with(r#"["plain text","#));
    }
}

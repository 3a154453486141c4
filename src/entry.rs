use alloc::{string::String, vec::Vec};
use core::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
};

use crate::{Value, callsite::CallSite};

/// One element of a trail: where the error was touched, and what the caller
/// said about it.
///
/// Encodes as a JSON array whose first element is the call-site descriptor,
/// followed by the context values: `["src/db.rs:42:9", "retrying", 3]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    site: CallSite,
    context: Vec<Value>,
}

impl Entry {
    /// Creates an entry from its parts.
    pub fn new(site: CallSite, context: Vec<Value>) -> Self {
        Self { site, context }
    }

    /// The call site this entry was recorded at.
    pub fn site(&self) -> &CallSite {
        &self.site
    }

    /// The context values, in the order they were supplied.
    pub fn context(&self) -> &[Value] {
        &self.context
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => fmt::Debug::fmt(self, f),
        }
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.context.len()))?;
        seq.serialize_element(self.site.as_str())?;
        for value in &self.context {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(EntryVisitor)
    }
}

struct EntryVisitor;

impl<'de> Visitor<'de> for EntryVisitor {
    type Value = Entry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of a call-site string followed by context values")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Entry, A::Error> {
        let site: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let mut context = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element::<crate::Value>()? {
            context.push(value);
        }
        Ok(Entry::new(CallSite::new(site), context))
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use super::*;

    #[test]
    fn test_entry_encoding() {
        let entry = Entry::new(
            CallSite::new("src/db.rs:42:9"),
            vec![Value::from("retrying"), Value::from(3)],
        );
        assert_eq!(entry.to_string(), r#"["src/db.rs:42:9","retrying",3]"#);
    }

    #[test]
    fn test_entry_decoding() {
        let entry: Entry = serde_json::from_str(r#"["a.rs:1", 1, [true]]"#).unwrap();
        assert_eq!(entry.site().as_str(), "a.rs:1");
        assert_eq!(
            entry.context(),
            &[Value::Int(1), Value::List(vec![Value::Bool(true)])]
        );
    }

    #[test]
    fn test_entry_requires_site() {
        assert!(serde_json::from_str::<Entry>("[]").is_err());
        assert!(serde_json::from_str::<Entry>("[1]").is_err());
        assert!(serde_json::from_str::<Entry>(r#""a.rs:1""#).is_err());
    }
}

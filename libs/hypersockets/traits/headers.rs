use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered HTTP header mapping
///
/// Names compare ASCII case-insensitively. Inserting an existing name
/// overwrites its value in place, so the original position is kept;
/// new names are appended at the end.
///
/// # Example
/// ```
/// use hypersockets::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("Authorization", "Bearer a");
/// headers.insert("X-Trace", "1");
/// headers.insert("authorization", "Bearer b");
///
/// assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer b"));
/// assert_eq!(headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a header, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Add a value for a header, joining with any existing value
    ///
    /// Repeated response headers collapse into one comma-separated value.
    pub fn append(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => {
                let existing = &mut self.entries[idx].1;
                existing.push_str(", ");
                existing.push_str(value.as_ref());
            }
            None => self.entries.push((name, value.as_ref().to_string())),
        }
    }

    /// Look up a header value by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Check whether a header is present (case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove a header, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Layer another mapping on top of this one
    ///
    /// Every header of `other` is inserted with overwrite semantics.
    pub fn extend_from(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Iterate headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((name, value)) = access.next_entry::<String, HeaderValue>()? {
                    headers.insert(name, value.0);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Header value that also accepts numbers and booleans from config files
struct HeaderValue(String);

impl<'de> Deserialize<'de> for HeaderValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(HeaderValue(s)),
            serde_json::Value::Number(n) => Ok(HeaderValue(n.to_string())),
            serde_json::Value::Bool(b) => Ok(HeaderValue(b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "invalid header value: {}",
                other
            ))),
        }
    }
}

//! Case-insensitive header storage.

/// A set of HTTP header fields keyed case-insensitively.
///
/// At most one entry exists per case-insensitive name. The stored casing is
/// fixed when a name is first inserted (in canonical `Content-Type` form) and
/// is kept when the value is later overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a header value, ignoring ASCII case in the name.
    ///
    /// Returns `None` for an empty name.
    pub fn get(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }

        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets a header value.
    ///
    /// An empty name is ignored. An empty value removes the header instead of
    /// storing an empty field.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return;
        }

        let value = value.into();
        if value.is_empty() {
            self.remove(name);
            return;
        }

        match self.position(name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((canonicalize(name), value)),
        }
    }

    /// Removes a header, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let i = self.position(name.trim())?;
        Some(self.entries.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderMap::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}

/// Canonical display form of a header name: every hyphen-separated segment
/// starts upper-case and continues lower-case (`content-type` -> `Content-Type`).
pub fn canonicalize(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::with_capacity(segment.len());
                    out.push(first.to_ascii_uppercase());
                    out.extend(chars.map(|c| c.to_ascii_lowercase()));
                    out
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

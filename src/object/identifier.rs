use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Globally unique address of a domain object
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub key: String,
    pub namespace: String,
}

impl Identifier {
    pub fn new(key: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            namespace: namespace.into(),
        }
    }

    /// Render the identifier as a key string
    ///
    /// Key strings have the form `namespace:key`, with any `:` in the
    /// namespace escaped as `\:`. Identifiers without a namespace render
    /// as the bare key.
    pub fn key_string(&self) -> String {
        if self.namespace.is_empty() {
            return self.key.clone();
        }
        format!("{}:{}", self.namespace.replace(':', "\\:"), self.key)
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key_string())
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    /// Parse a key string
    ///
    /// Splits on the first unescaped `:`. A string without one is a bare
    /// key with an empty namespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut namespace = String::new();
        let mut chars = s.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' if matches!(chars.peek(), Some((_, ':'))) => {
                    namespace.push(':');
                    chars.next();
                }
                ':' => return Ok(Identifier::new(&s[i + 1..], namespace)),
                c => namespace.push(c),
            }
        }

        Ok(Identifier::new(s, ""))
    }
}

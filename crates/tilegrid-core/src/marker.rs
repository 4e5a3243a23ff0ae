use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The content stored in one cell of one layer.
///
/// A marker is either empty or a non-empty token naming a tile, glyph, or
/// semantic tag (`"wall"`, `"npc:guard"`, ...). An empty token string is
/// the empty marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Marker(Option<String>);

impl Marker {
    pub const EMPTY: Marker = Marker(None);

    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() {
            Self(None)
        } else {
            Self(Some(token))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Read one cell of a saved record.
    ///
    /// Strings are tokens and numbers become their decimal text (numeric
    /// tile ids). `null` and any other value mean "no cell here".
    pub fn from_value(value: &Value) -> Option<Marker> {
        match value {
            Value::String(token) => Some(Marker::new(token.as_str())),
            Value::Number(n) => Some(Marker::new(n.to_string())),
            Value::Null => None,
            other => {
                log::warn!("Ignoring cell value {}", other);
                None
            }
        }
    }
}

impl From<&str> for Marker {
    fn from(token: &str) -> Self {
        Marker::new(token)
    }
}

impl From<String> for Marker {
    fn from(token: String) -> Self {
        Marker::new(token)
    }
}

impl From<Option<&str>> for Marker {
    fn from(token: Option<&str>) -> Self {
        token.map(Marker::new).unwrap_or_default()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}

// Serialized as a plain string; the empty marker is "".
impl Serialize for Marker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str().unwrap_or(""))
    }
}

impl<'de> Deserialize<'de> for Marker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Marker::new(token))
    }
}

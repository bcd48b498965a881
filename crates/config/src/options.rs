//! Lenient reader over the option maps passed to `config(...)` and `widget(...)`.
//!
//! Every accessor returns `None` (or a caller-supplied default) for absent keys and for values of
//! the wrong type. Nothing here can fail a script.

use rhai::{Dynamic, Map};
use tracing::debug;

use crate::types::{Point, Size};

/// Typed field access over a script option map.
pub struct Options {
    /// The map being read; empty when the script passed a non-map value.
    map: Map,
}

impl Options {
    /// Wrap a script value. Anything other than a map reads as an empty map.
    pub fn new(value: Dynamic) -> Self {
        let value = value.flatten();
        let type_name = value.type_name();
        match value.try_cast::<Map>() {
            Some(map) => Self { map },
            None => {
                debug!("option argument is a {}, not a map; treating as empty", type_name);
                Self { map: Map::new() }
            }
        }
    }

    /// Raw value for `key`, with `()` treated as absent.
    fn get(&self, key: &str) -> Option<&Dynamic> {
        self.map.get(key).filter(|v| !v.is_unit())
    }

    /// A number, accepting both integer and float script values.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        if let Ok(f) = value.as_float() {
            return Some(f);
        }
        if let Ok(i) = value.as_int() {
            return Some(i as f64);
        }
        mismatch(key, "number", value);
        None
    }

    /// An integer; floats are truncated toward zero.
    pub fn integer(&self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        if let Ok(i) = value.as_int() {
            return Some(i);
        }
        if let Ok(f) = value.as_float()
            && f.is_finite()
        {
            return Some(f.trunc() as i64);
        }
        mismatch(key, "integer", value);
        None
    }

    /// A boolean.
    pub fn boolean(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?;
        match value.as_bool() {
            Ok(b) => Some(b),
            Err(_) => {
                mismatch(key, "bool", value);
                None
            }
        }
    }

    /// A string. Other scalar types are not converted; see [`Self::text`].
    pub fn string(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        if let Ok(s) = value.clone().into_string() {
            return Some(s);
        }
        if let Ok(c) = value.as_char() {
            return Some(c.to_string());
        }
        mismatch(key, "string", value);
        None
    }

    /// Free-form text: strings as-is, numbers and booleans stringified, anything else empty.
    pub fn text(&self, key: &str) -> String {
        let Some(value) = self.get(key) else {
            return String::new();
        };
        if value.is_string() || value.is_char() {
            return self.string(key).unwrap_or_default();
        }
        if value.is_int() || value.is_float() || value.is_bool() {
            return value.to_string();
        }
        mismatch(key, "text", value);
        String::new()
    }

    /// A nested option map.
    pub fn nested(&self, key: &str) -> Option<Self> {
        let value = self.get(key)?;
        if value.is_map() {
            Some(Self::new(value.clone()))
        } else {
            mismatch(key, "map", value);
            None
        }
    }

    /// `{x, y}` under `key`. Missing coordinates fall back to `default`'s; a missing or
    /// non-map value yields `default` itself.
    pub fn point(&self, key: &str, default: Point) -> Point {
        match self.nested(key) {
            Some(p) => Point::new(
                p.number("x").unwrap_or(default.x),
                p.number("y").unwrap_or(default.y),
            ),
            None => default,
        }
    }

    /// `{width, height}` under `key`, with per-field fallbacks from `default`.
    pub fn size(&self, key: &str, default: Size) -> Size {
        match self.nested(key) {
            Some(s) => Size::new(
                s.number("width").unwrap_or(default.width),
                s.number("height").unwrap_or(default.height),
            ),
            None => default,
        }
    }

    /// Whether `key` is present with a non-unit value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Note a wrong-typed field. The field is then treated as absent.
fn mismatch(key: &str, expected: &str, value: &Dynamic) {
    debug!(
        "option '{}': expected {}, got {}; using default",
        key,
        expected,
        value.type_name()
    );
}

//! Runtime value model exported to PHP source text.

use std::fmt;

use crate::handle::ClosureHandle;

/// Array key. PHP arrays key by integer or string only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl From<i64> for Key {
    fn from(k: i64) -> Self {
        Key::Int(k)
    }
}

impl From<&str> for Key {
    fn from(k: &str) -> Self {
        Key::Str(k.to_string())
    }
}

impl From<String> for Key {
    fn from(k: String) -> Self {
        Key::Str(k)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => write!(f, "'{s}'"),
        }
    }
}

/// Closed set of exportable runtime value kinds. `Object` and `Resource` exist
/// so the formatter can report them precisely; they are never renderable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered key/value entries with unique keys, matching PHP array
    /// insertion-order semantics.
    Array(Vec<(Key, Value)>),
    Closure(ClosureHandle),
    Object {
        class: String,
    },
    Resource {
        kind: String,
    },
}

impl Value {
    /// Builds an array value the way a PHP literal does: entries without an
    /// explicit key get the next free non-negative integer key, and a
    /// duplicated key overwrites the earlier entry in place.
    pub fn array<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Option<Key>, Value)>,
    {
        let mut out: Vec<(Key, Value)> = Vec::new();
        let mut next_index: i64 = 0;
        for (key, value) in entries {
            let key = match key {
                Some(Key::Int(n)) => {
                    if n >= next_index {
                        next_index = n + 1;
                    }
                    Key::Int(n)
                }
                Some(k) => k,
                None => {
                    let k = Key::Int(next_index);
                    next_index += 1;
                    k
                }
            };
            if let Some(slot) = out.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
            } else {
                out.push((key, value));
            }
        }
        Value::Array(out)
    }

    /// Short human name for diagnostics, mirroring `gettype` output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Closure(_) => "closure",
            Value::Object { .. } => "object",
            Value::Resource { .. } => "resource",
        }
    }
}

/// Location of a value inside the container being exported, used to report
/// where an unexportable value sits (e.g. `$root['jobs'][0]`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValuePath {
    segments: Vec<Key>,
}

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, key: Key) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key);
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$root")?;
        for segment in &self.segments {
            write!(f, "[{segment}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, Value, ValuePath};

    #[test]
    fn array_builder_assigns_implicit_integer_keys() {
        let value = Value::array(vec![
            (None, Value::Int(1)),
            (Some(Key::from("a")), Value::Int(2)),
            (None, Value::Int(3)),
        ]);
        let Value::Array(entries) = value else {
            panic!("expected array");
        };
        assert_eq!(entries[0].0, Key::Int(0));
        assert_eq!(entries[1].0, Key::from("a"));
        assert_eq!(entries[2].0, Key::Int(1));
    }

    #[test]
    fn array_builder_continues_after_explicit_index() {
        let value = Value::array(vec![
            (Some(Key::Int(5)), Value::Int(1)),
            (None, Value::Int(2)),
        ]);
        let Value::Array(entries) = value else {
            panic!("expected array");
        };
        assert_eq!(entries[1].0, Key::Int(6));
    }

    #[test]
    fn duplicate_key_overwrites_in_place() {
        let value = Value::array(vec![
            (Some(Key::from("k")), Value::Int(1)),
            (None, Value::Int(9)),
            (Some(Key::from("k")), Value::Int(2)),
        ]);
        let Value::Array(entries) = value else {
            panic!("expected array");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Key::from("k"), Value::Int(2)));
    }

    #[test]
    fn path_display_reads_like_subscripts() {
        let path = ValuePath::root().child(Key::from("jobs")).child(Key::Int(0));
        assert_eq!(path.to_string(), "$root['jobs'][0]");
    }
}

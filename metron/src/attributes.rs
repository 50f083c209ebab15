//! Attribute sets used to bucket measurements into series.
//!
//! An [`AttributeSet`] is the per-series key: two sets with identical
//! key/value pairs are the same series regardless of the order the pairs were
//! supplied in. Internally the pairs are sorted by key and deduplicated at
//! construction, and shared behind an `Arc` so cloning a set (which the hot
//! recording path does) is pointer-sized.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ordered_float::OrderedFloat;

/// A single attribute value: scalar or array of scalars.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AttributeValue {
    /// String value
    Str(String),
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Long(i64),
    /// 64-bit floating point value
    Double(f64),
    /// Array of strings
    StrArray(Vec<String>),
    /// Array of booleans
    BoolArray(Vec<bool>),
    /// Array of 64-bit integers
    LongArray(Vec<i64>),
    /// Array of 64-bit floats
    DoubleArray(Vec<f64>),
}

// Doubles compare and hash through their bit pattern (via OrderedFloat) so
// that AttributeValue is a usable hash-map key even for NaN payloads.
impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        use AttributeValue::*;
        match (self, other) {
            (Str(a), Str(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Double(a), Double(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (StrArray(a), StrArray(b)) => a == b,
            (BoolArray(a), BoolArray(b)) => a == b,
            (LongArray(a), LongArray(b)) => a == b,
            (DoubleArray(a), DoubleArray(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| OrderedFloat(*x) == OrderedFloat(*y))
            }
            _ => false,
        }
    }
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use AttributeValue::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Str(v) => v.hash(state),
            Bool(v) => v.hash(state),
            Long(v) => v.hash(state),
            Double(v) => OrderedFloat(*v).hash(state),
            StrArray(v) => v.hash(state),
            BoolArray(v) => v.hash(state),
            LongArray(v) => v.hash(state),
            DoubleArray(v) => {
                for x in v {
                    OrderedFloat(*x).hash(state);
                }
            }
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AttributeValue::*;
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            f.write_str("]")
        }
        match self {
            Str(v) => f.write_str(v),
            Bool(v) => write!(f, "{v}"),
            Long(v) => write!(f, "{v}"),
            Double(v) => write!(f, "{v}"),
            StrArray(v) => list(f, v),
            BoolArray(v) => list(f, v),
            LongArray(v) => list(f, v),
            DoubleArray(v) => list(f, v),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Long(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

/// Immutable, order-independent set of key/value attributes.
///
/// Equality and hashing are value-based: the construction path sorts pairs by
/// key, so `{a=1, b=2}` and `{b=2, a=1}` produce equal sets with equal hashes.
/// Duplicate keys keep the last value supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSet {
    entries: Arc<[(Arc<str>, AttributeValue)]>,
}

impl AttributeSet {
    /// The set with no attributes.
    pub fn empty() -> Self {
        Self { entries: Arc::from(Vec::new()) }
    }

    /// Number of distinct keys in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .binary_search_by(|(k, _)| k.as_ref().cmp(key))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Iterate the pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Into<Arc<str>>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries: Vec<(Arc<str>, AttributeValue)> =
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        // Stable sort keeps insertion order within a key, so for duplicates the
        // last-supplied value is the last of its run; swap it into the retained
        // slot while deduplicating.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|a, b| {
            if a.0 == b.0 {
                std::mem::swap(&mut a.1, &mut b.1);
                true
            } else {
                false
            }
        });
        Self { entries: Arc::from(entries) }
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

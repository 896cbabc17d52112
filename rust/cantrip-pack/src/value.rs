use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use cantrip_power::Power;

/// A node that supplies its own wire representation.
///
/// Mirrors the `toJSON` convention of JSON-with-custom-serializers: the
/// transform runs *before* capability interception, and the packing walk
/// then inspects the transformed result. A [`Power`] nested anywhere in
/// the output of `to_wire` is still replaced by a marker, and a reserved
/// key anywhere in that output still aborts the call.
pub trait ToWire: Send + Sync {
    /// Produce the value to serialize in place of this node.
    fn to_wire(&self) -> Value;
}

/// An object graph to be packed.
///
/// This is a closed model of everything a caller may serialize: plain
/// structural data, capability references, and nodes with a custom
/// to-wire transform. Maps are ordered (`BTreeMap`) so the packed text is
/// deterministic for a given graph and label assignment.
#[derive(Clone)]
pub enum Value {
    /// The absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number, in the structural encoder's representation.
    Number(serde_json::Number),
    /// A string.
    String(String),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A string-keyed mapping with deterministic key order.
    Map(BTreeMap<String, Value>),
    /// A capability reference. Packs as `{"_special": <label>}`.
    Power(Power),
    /// A node with a custom pre-serialization transform.
    Wire(Arc<dyn ToWire>),
}

impl Value {
    /// The contained string, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// The contained entries, if this is a `Map`.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The contained items, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The contained capability, if this is a `Power`.
    pub fn as_power(&self) -> Option<&Power> {
        match self {
            Value::Power(power) => Some(power),
            _ => None,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Value::Number(value) => f.debug_tuple("Number").field(value).finish(),
            Value::String(value) => f.debug_tuple("String").field(value).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Value::Power(power) => f.debug_tuple("Power").field(power).finish(),
            Value::Wire(_) => f.write_str("Wire(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Power(a), Value::Power(b)) => a == b,
            (Value::Wire(a), Value::Wire(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Power> for Value {
    fn from(value: Power) -> Self {
        Value::Power(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_builds_maps_from_iterators() {
        let value = Value::from_iter([("b", 2i64), ("a", 1i64)]);

        let entries = value.as_map().expect("not a map");
        // BTreeMap ordering, not insertion ordering.
        assert_eq!(
            entries.keys().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn it_compares_powers_inside_values_by_identity() {
        let power = Power::new();

        assert_eq!(Value::from(power.clone()), Value::from(power));
        assert_ne!(Value::from(Power::new()), Value::from(Power::new()));
    }

    #[test]
    fn it_converts_non_finite_floats_to_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert_eq!(Value::from(1.5), Value::Number(
            serde_json::Number::from_f64(1.5).expect("finite")
        ));
    }
}

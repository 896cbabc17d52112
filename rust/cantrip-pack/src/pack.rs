use cantrip_power::PowerTable;

use crate::token::PlaceholderToken;
use crate::{CantripPackError, Value};

/// The reserved public marker key. Every capability reference appears in
/// packed text as `{"_special": <label>}`, and input data is forbidden
/// from authoring this key itself.
pub const MARKER_KEY: &str = "_special";

/// Ceiling on transformation recursion. Finite `Value` trees stay well
/// under it; only runaway to-wire expansion can reach it.
pub(crate) const MAX_DEPTH: usize = 128;

/// Pack an object graph into capability-safe wire text.
///
/// Every [`Power`](cantrip_power::Power) in the graph — at any depth,
/// including inside the output of a to-wire transform — is replaced by a
/// marker object carrying the label `table` assigns to it. Labels are
/// stable across calls against the same table, so re-packing the same
/// graph produces byte-identical text.
///
/// # Errors
///
/// * [`CantripPackError::ForgedMarker`] — the input itself authors the
///   reserved `_special` key.
/// * [`CantripPackError::RecursionLimit`] — a to-wire transform expands
///   without bound.
/// * [`CantripPackError::Encoding`] — the structural encoder rejected the
///   transformed tree.
/// * [`CantripPackError::Entropy`] — the randomness source failed.
pub fn pack(table: &PowerTable, root: &Value) -> Result<String, CantripPackError> {
    Packing::begin(table)?.pack(root)
}

/// One packing call: a borrowed label table plus the call-scoped
/// placeholder token.
struct Packing<'a> {
    table: &'a PowerTable,
    token: PlaceholderToken,
}

impl<'a> Packing<'a> {
    fn begin(table: &'a PowerTable) -> Result<Self, CantripPackError> {
        Ok(Self {
            table,
            token: PlaceholderToken::generate()?,
        })
    }

    fn pack(&self, root: &Value) -> Result<String, CantripPackError> {
        let text = self.encode(root)?;
        Ok(text.replace(self.token.transient_key(), MARKER_KEY))
    }

    /// Encode to the intermediate form, with markers still under the
    /// transient key.
    fn encode(&self, root: &Value) -> Result<String, CantripPackError> {
        let tree = self.transform(root, 0)?;
        Ok(serde_json::to_string(&tree)?)
    }

    /// Walk one node, replacing Powers with transient-keyed markers and
    /// rejecting input that authors the reserved key. To-wire nodes are
    /// expanded first and the expansion re-intercepted.
    fn transform(&self, value: &Value, depth: usize) -> Result<serde_json::Value, CantripPackError> {
        if depth > MAX_DEPTH {
            return Err(CantripPackError::RecursionLimit(MAX_DEPTH));
        }
        match value {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(value) => Ok(serde_json::Value::Bool(*value)),
            Value::Number(value) => Ok(serde_json::Value::Number(value.clone())),
            Value::String(value) => Ok(serde_json::Value::String(value.clone())),
            Value::List(items) => Ok(serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| self.transform(item, depth + 1))
                    .collect::<Result<_, _>>()?,
            )),
            Value::Map(entries) => {
                let mut object = serde_json::Map::with_capacity(entries.len());
                for (key, entry) in entries {
                    if key == MARKER_KEY {
                        tracing::warn!("rejecting input that authors the reserved marker key");
                        return Err(CantripPackError::ForgedMarker);
                    }
                    object.insert(key.clone(), self.transform(entry, depth + 1)?);
                }
                Ok(serde_json::Value::Object(object))
            }
            Value::Power(power) => {
                let label = self.table.label(power);
                let mut marker = serde_json::Map::with_capacity(1);
                marker.insert(self.token.transient_key().to_owned(), label.into());
                Ok(serde_json::Value::Object(marker))
            }
            Value::Wire(node) => self.transform(&node.to_wire(), depth + 1),
        }
    }
}

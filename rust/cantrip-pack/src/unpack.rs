use std::collections::{BTreeMap, BTreeSet};

use cantrip_power::PowerTable;

use crate::pack::MARKER_KEY;
use crate::{CantripUnpackError, Value};

/// Unpack wire text back into an object graph.
///
/// Every `{"_special": <label>}` marker is resolved through `table` to the
/// live [`Power`](cantrip_power::Power) that produced it; everything else
/// maps structurally. Labels are meaningful only to the table that issued
/// them.
///
/// # Errors
///
/// * [`CantripUnpackError::Malformed`] — the text is not valid JSON.
/// * [`CantripUnpackError::MalformedMarker`] — an object carries the
///   `_special` key without being exactly a single-key marker with a
///   positive integer label.
/// * [`CantripUnpackError::UnknownLabel`] — the table never assigned the
///   label.
/// * [`CantripUnpackError::DefunctLabel`] — the labeled Power has been
///   dropped by every holder.
pub fn unpack(table: &PowerTable, text: &str) -> Result<Value, CantripUnpackError> {
    let tree: serde_json::Value = serde_json::from_str(text).map_err(|error| {
        tracing::warn!(%error, "failed to parse packed document");
        CantripUnpackError::Malformed(error)
    })?;
    revive(table, &tree)
}

/// Enumerate the capability labels a packed document references, without
/// resolving them against any table.
///
/// Malformed documents and malformed markers fail exactly as in
/// [`unpack`].
pub fn authorities(text: &str) -> Result<BTreeSet<u64>, CantripUnpackError> {
    let tree: serde_json::Value = serde_json::from_str(text)?;
    let mut labels = BTreeSet::new();
    collect(&tree, &mut labels)?;
    Ok(labels)
}

fn revive(table: &PowerTable, node: &serde_json::Value) -> Result<Value, CantripUnpackError> {
    match node {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(value) => Ok(Value::Bool(*value)),
        serde_json::Value::Number(value) => Ok(Value::Number(value.clone())),
        serde_json::Value::String(value) => Ok(Value::String(value.clone())),
        serde_json::Value::Array(items) => Ok(Value::List(
            items
                .iter()
                .map(|item| revive(table, item))
                .collect::<Result<_, _>>()?,
        )),
        serde_json::Value::Object(object) => {
            if object.contains_key(MARKER_KEY) {
                let label = marker_label(object)?;
                if !table.is_assigned(label) {
                    return Err(CantripUnpackError::UnknownLabel(label));
                }
                return table
                    .resolve(label)
                    .map(Value::Power)
                    .ok_or(CantripUnpackError::DefunctLabel(label));
            }
            let mut entries = BTreeMap::new();
            for (key, entry) in object {
                entries.insert(key.clone(), revive(table, entry)?);
            }
            Ok(Value::Map(entries))
        }
    }
}

fn collect(node: &serde_json::Value, labels: &mut BTreeSet<u64>) -> Result<(), CantripUnpackError> {
    match node {
        serde_json::Value::Array(items) => {
            for item in items {
                collect(item, labels)?;
            }
        }
        serde_json::Value::Object(object) => {
            if object.contains_key(MARKER_KEY) {
                labels.insert(marker_label(object)?);
                return Ok(());
            }
            for entry in object.values() {
                collect(entry, labels)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Validate a marker object and extract its label.
///
/// A genuine marker is exactly `{"_special": <positive integer>}`; the
/// packer can never emit anything wider, so anything wider is rejected
/// rather than partially honored.
fn marker_label(
    object: &serde_json::Map<String, serde_json::Value>,
) -> Result<u64, CantripUnpackError> {
    if object.len() != 1 {
        return Err(CantripUnpackError::MalformedMarker);
    }
    object
        .get(MARKER_KEY)
        .and_then(serde_json::Value::as_u64)
        .filter(|label| *label > 0)
        .ok_or(CantripUnpackError::MalformedMarker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantrip_power::Power;

    use crate::pack;

    #[test]
    fn it_resolves_markers_to_the_power_that_produced_them() {
        let table = PowerTable::new();
        let power = Power::new();
        let text = pack(&table, &Value::from(power.clone())).expect("pack");

        let revived = unpack(&table, &text).expect("unpack");

        assert_eq!(revived.as_power(), Some(&power));
    }

    #[test]
    fn it_rejects_unknown_labels() {
        let table = PowerTable::new();

        let result = unpack(&table, r#"{"_special":41}"#);

        assert!(matches!(
            result,
            Err(CantripUnpackError::UnknownLabel(41))
        ));
    }

    #[test]
    fn it_rejects_labels_of_dropped_powers() {
        let table = PowerTable::new();
        let text = pack(&table, &Value::from(Power::new())).expect("pack");

        let result = unpack(&table, &text);

        assert!(matches!(
            result,
            Err(CantripUnpackError::DefunctLabel(1))
        ));
    }

    #[test]
    fn it_rejects_markers_with_extra_keys() {
        let table = PowerTable::new();
        table.label(&Power::new());

        let result = unpack(&table, r#"{"_special":1,"extra":true}"#);

        assert!(matches!(result, Err(CantripUnpackError::MalformedMarker)));
    }

    #[test]
    fn it_rejects_non_integer_labels() {
        let table = PowerTable::new();

        for text in [
            r#"{"_special":"forged"}"#,
            r#"{"_special":0}"#,
            r#"{"_special":-3}"#,
            r#"{"_special":1.5}"#,
            r#"{"_special":null}"#,
        ] {
            let result = unpack(&table, text);
            assert!(
                matches!(result, Err(CantripUnpackError::MalformedMarker)),
                "accepted {text}"
            );
        }
    }

    #[test]
    fn it_rejects_invalid_json() {
        let table = PowerTable::new();

        let result = unpack(&table, "{not json");

        assert!(matches!(result, Err(CantripUnpackError::Malformed(_))));
    }

    #[test]
    fn it_collects_the_authority_set_of_a_document() {
        let table = PowerTable::new();
        let first = Power::new();
        let second = Power::new();
        let graph = Value::from_iter([
            ("a", Value::from(first.clone())),
            ("b", Value::from(vec![Value::from(second), Value::from(first)])),
            ("c", Value::from("plain")),
        ]);
        let text = pack(&table, &graph).expect("pack");

        let labels = authorities(&text).expect("authorities");

        assert_eq!(labels, BTreeSet::from([1, 2]));
    }
}

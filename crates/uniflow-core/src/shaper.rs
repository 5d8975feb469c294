// ── Response shaping ──
//
// Turns one raw response into output records. Never fails: anything
// that does not match the shaping directive passes through.

use serde::Serialize;
use serde_json::Value;

use crate::catalog::OutputShaping;

/// One output record, tagged with the invocation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub item_index: usize,
    pub json: Value,
}

/// Split `raw` into records for item `item_index`.
///
/// With a shaping field and `split` set, an array at that field yields one
/// record per element. Otherwise a bare array yields one record per element
/// and anything else a single record.
pub fn shape(
    mut raw: Value,
    shaping: Option<&OutputShaping>,
    split: bool,
    item_index: usize,
) -> Vec<OutputRecord> {
    let wrap = |json| OutputRecord { item_index, json };

    if let (Some(shaping), true) = (shaping, split) {
        if let Some(Value::Array(items)) = raw.get_mut(&shaping.split_field) {
            return std::mem::take(items).into_iter().map(wrap).collect();
        }
    }

    match raw {
        Value::Array(items) => items.into_iter().map(wrap).collect(),
        other => vec![wrap(other)],
    }
}

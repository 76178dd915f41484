use serde::{Deserialize, Serialize};
use serde_json::Value;

use keywire_core::Mainboard;
use keywire_route::RouteResult;

use crate::KeymapError;

/// Prototype vendor id shared by hobbyist boards.
pub const VENDOR_ID: &str = "0xFEED";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViaMatrix {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViaLayouts {
    pub keymap: Value,
}

/// Keyboard definition loaded by the VIA configurator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViaDefinition {
    pub name: String,
    pub vendor_id: String,
    pub product_id: String,
    pub lighting: String,
    pub matrix: ViaMatrix,
    pub layouts: ViaLayouts,
}

impl ViaDefinition {
    /// Build the definition for `result`, echoing `layout` (raw KLE rows) with
    /// each key legend replaced by its `"row,col"` matrix position.
    pub fn new(
        name: &str,
        mainboard: &Mainboard,
        result: &RouteResult,
        layout: &Value,
    ) -> Result<Self, KeymapError> {
        let mut by_layout: Vec<(usize, usize)> = result
            .assignments
            .iter()
            .map(|a| (result.keys[a.key].layout_index, a.key))
            .collect();
        by_layout.sort_unstable();
        let positions: Vec<String> = by_layout
            .iter()
            .map(|&(_, k)| {
                let a = &result.assignments[k];
                format!("{},{}", a.logical_row(), a.logical_col())
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            vendor_id: VENDOR_ID.to_string(),
            product_id: mainboard.product_id.clone(),
            lighting: "none".to_string(),
            matrix: ViaMatrix {
                rows: mainboard.logical_rows,
                cols: mainboard.logical_cols,
            },
            layouts: ViaLayouts {
                keymap: substitute_layout(layout, &positions)?,
            },
        })
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn to_json(&self) -> Result<String, KeymapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Replace the legends of a KLE layout with `labels`, in order.
///
/// Inside a row, strings are keys and objects are property changes (their
/// `a` alignment is dropped). Entries that are not rows, such as the
/// keyboard metadata object, are copied as is.
pub fn substitute_layout(layout: &Value, labels: &[String]) -> Result<Value, KeymapError> {
    let rows = layout.as_array().ok_or(KeymapError::InvalidLayout)?;
    let mut next = 0;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(items) = row.as_array() else {
            out.push(row.clone());
            continue;
        };
        let mut new_row = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(_) => {
                    let label = labels
                        .get(next)
                        .ok_or(KeymapError::LayoutKeyMissing { index: next })?;
                    new_row.push(Value::String(label.clone()));
                    next += 1;
                }
                Value::Object(props) => {
                    let mut props = props.clone();
                    props.shift_remove("a");
                    new_row.push(Value::Object(props));
                }
                other => new_row.push(other.clone()),
            }
        }
        out.push(Value::Array(new_row));
    }
    Ok(Value::Array(out))
}

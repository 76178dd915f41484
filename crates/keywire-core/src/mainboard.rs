use serde::{Deserialize, Serialize};

use crate::{Error, FlatCable, Net, WireGroup};

/// Controller board constants: matrix size, firmware ids and cables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mainboard {
    pub name: String,
    pub logical_rows: usize,
    pub logical_cols: usize,
    #[serde(default = "default_product_id")]
    pub product_id: String,
    #[serde(default)]
    pub row_wire_names: Vec<String>,
    #[serde(default)]
    pub col_wire_names: Vec<String>,
    pub cables: Vec<FlatCable>,
}

fn default_product_id() -> String {
    "0x0000".to_string()
}

pub const PRESETS: [&str; 3] = ["Alice", "Bob", "Charlotte"];

impl Mainboard {
    /// Built-in board by name.
    pub fn preset(name: &str) -> Result<Mainboard, Error> {
        match name {
            "Alice" => Ok(alice()),
            "Bob" => Ok(bob()),
            "Charlotte" => Ok(charlotte()),
            _ => Err(Error::UnknownMainboard {
                name: name.to_string(),
                known: PRESETS.join(", "),
            }),
        }
    }

    #[must_use]
    pub fn logical_count(&self, net: Net) -> usize {
        match net {
            Net::Row => self.logical_rows,
            Net::Col => self.logical_cols,
        }
    }

    #[must_use]
    pub fn wire_names(&self, net: Net) -> &[String] {
        match net {
            Net::Row => &self.row_wire_names,
            Net::Col => &self.col_wire_names,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.cables.iter().try_for_each(FlatCable::validate)
    }
}

fn names(prefix: &str, range: std::ops::Range<usize>) -> impl Iterator<Item = String> + '_ {
    range.map(move |i| format!("{prefix}{i}"))
}

fn alice() -> Mainboard {
    Mainboard {
        name: "Alice".to_string(),
        logical_rows: 10,
        logical_cols: 24,
        product_id: default_product_id(),
        row_wire_names: names("ROW_", 1..9).chain(names("LED_ROW_", 1..3)).collect(),
        col_wire_names: names("COL_", 1..25).chain(names("LED_COL_", 1..7)).collect(),
        cables: vec![
            FlatCable::new(10, 1)
                .with_group(WireGroup::new(0, 8, 0, Net::Row, false))
                .with_group(WireGroup::new(8, 10, 8, Net::Row, true)),
            FlatCable::new(30, 1)
                .with_group(WireGroup::new(0, 24, 0, Net::Col, false))
                .with_group(WireGroup::new(24, 30, 0, Net::Col, true)),
        ],
    }
}

fn bob() -> Mainboard {
    Mainboard {
        name: "Bob".to_string(),
        logical_rows: 16,
        logical_cols: 12,
        product_id: default_product_id(),
        row_wire_names: names("S", 0..16).collect(),
        col_wire_names: names("D", 0..12).collect(),
        cables: vec![FlatCable::new(30, 0)
            .with_group(WireGroup::new(0, 8, 0, Net::Row, false))
            .with_group(WireGroup::new(8, 20, 0, Net::Col, false))
            .with_group(WireGroup::new(22, 30, 8, Net::Row, false))],
    }
}

fn charlotte() -> Mainboard {
    Mainboard {
        name: "Charlotte".to_string(),
        logical_rows: 18,
        logical_cols: 12,
        product_id: "0x9605".to_string(),
        row_wire_names: names("S", 0..16).chain(names("LED_S", 0..2)).collect(),
        col_wire_names: names("D", 0..12).chain(names("LED_D", 0..3)).collect(),
        cables: vec![FlatCable::new(36, 0)
            .with_pitch(0.1)
            .with_group(WireGroup::new(0, 8, 0, Net::Row, false))
            .with_group(WireGroup::new(8, 20, 0, Net::Col, false))
            .with_group(WireGroup::new(22, 24, 16, Net::Row, true))
            .with_group(WireGroup::new(24, 27, 0, Net::Col, true))
            .with_group(WireGroup::new(28, 36, 8, Net::Row, false))],
    }
}

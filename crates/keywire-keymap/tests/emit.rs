use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::json;
use std::f64::consts::{FRAC_PI_2, PI};

use keywire_core::{
    FlatCable, FlatCablePlacement, Key, Mainboard, Net, Pose, TerminalGeometry, TerminalPair,
    WireGroup,
};
use keywire_keymap::{KeymapTable, ViaDefinition, NO_KEY};
use keywire_route::{generate_route, Matrix, RouteInput, RouteResult, SolveOptions};

fn key(index: usize, x: f64, code: &str) -> Key {
    let pair = TerminalPair {
        left: Pose::new(-0.1, 0.0, 0.0),
        right: Pose::new(0.1, 0.0, PI),
    };
    Key {
        id: format!("K{index}"),
        index,
        pose: Pose::new(x, 0.0, 0.0),
        orientation: Default::default(),
        terminals: TerminalGeometry {
            row: pair,
            col: pair,
        },
        code: Some(code.to_string()),
        layout_index: index,
    }
}

fn board(rows: usize, cols: usize) -> Mainboard {
    let cable = FlatCable::new(rows + cols, 0)
        .with_group(WireGroup::new(0, rows, 0, Net::Row, false))
        .with_group(WireGroup::new(rows, rows + cols, 0, Net::Col, false));
    Mainboard {
        name: "test".to_string(),
        logical_rows: rows,
        logical_cols: cols,
        product_id: "0x1234".to_string(),
        row_wire_names: (0..rows).map(|i| format!("R{i}")).collect(),
        col_wire_names: (0..cols).map(|i| format!("C{i}")).collect(),
        cables: vec![cable],
    }
}

/// Keys along +x, key `i` at matrix cell `cells[i]`.
fn route(mainboard: &Mainboard, cells: &[(usize, usize)], codes: &[&str]) -> RouteResult {
    let keys: Vec<Key> = cells
        .iter()
        .enumerate()
        .map(|(i, _)| key(i, 1.0 + i as f64, codes[i]))
        .collect();
    let mut matrix = Matrix::new();
    for (i, &(r, c)) in cells.iter().enumerate() {
        matrix
            .entry(format!("R{r}"))
            .or_insert_with(IndexMap::new)
            .insert(format!("C{c}"), format!("K{i}"));
    }
    let placements = vec![FlatCablePlacement::new(
        mainboard.cables[0].clone(),
        [0.0, 0.0],
        -FRAC_PI_2,
        false,
    )];
    let input = RouteInput {
        matrix: &matrix,
        placements: &placements,
        keys: &keys,
    };
    generate_route(&input, &SolveOptions::default()).unwrap()
}

#[test]
fn two_keys_fill_exactly_two_cells() {
    let mainboard = board(2, 3);
    let result = route(&mainboard, &[(0, 0), (0, 1)], &["KC_A", "KC_B"]);
    let table = KeymapTable::from_route(&result, &mainboard).unwrap();

    assert_eq!(table.populated(), 2);
    assert_eq!(
        table.codes(),
        vec![
            vec!["KC_A", "KC_B", NO_KEY],
            vec![NO_KEY, NO_KEY, NO_KEY],
        ]
    );
    assert_eq!(
        table.to_qmk(),
        "const uint16_t PROGMEM keymaps[][MATRIX_ROWS][MATRIX_COLS] = {\n    [0] = {\n        {KC_A, KC_B, KC_NO, },\n        {KC_NO, KC_NO, KC_NO, },\n    }\n};\n"
    );
}

#[test]
fn via_definition_mirrors_the_layout() {
    let mainboard = board(2, 3);
    let result = route(&mainboard, &[(1, 2), (0, 1)], &["KC_A", "KC_B"]);
    let layout = json!([[{"a": 7}, "A", "B"]]);
    let via = ViaDefinition::new("demo", &mainboard, &result, &layout).unwrap();
    let value: serde_json::Value = serde_json::from_str(&via.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "demo",
            "vendorId": "0xFEED",
            "productId": "0x1234",
            "lighting": "none",
            "matrix": {"rows": 2, "cols": 3},
            "layouts": {"keymap": [[{}, "1,2", "0,1"]]}
        })
    );
    assert!(via.to_json().unwrap().starts_with("{\n  \"name\": \"demo\","));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn table_always_has_board_dimensions(rows in 1usize..6, cols in 1usize..6, n in 0usize..4) {
        let mainboard = board(rows, cols);
        let cells: Vec<(usize, usize)> = (0..n.min(rows * cols))
            .map(|i| (i / cols, i % cols))
            .collect();
        let codes = vec!["KC_X"; cells.len()];
        let result = route(&mainboard, &cells, &codes);
        let table = KeymapTable::from_route(&result, &mainboard).unwrap();
        let codes = table.codes();
        prop_assert_eq!(codes.len(), rows);
        prop_assert!(codes.iter().all(|r| r.len() == cols));
        prop_assert_eq!(table.populated(), cells.len());
    }
}

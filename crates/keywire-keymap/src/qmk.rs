use crate::KeymapTable;

/// QMK code of an unassigned cell.
pub const NO_KEY: &str = "KC_NO";

pub(crate) fn render(table: &KeymapTable) -> String {
    let mut out =
        String::from("const uint16_t PROGMEM keymaps[][MATRIX_ROWS][MATRIX_COLS] = {\n    [0] = {\n");
    for row in table.codes() {
        out.push_str("        {");
        for code in row {
            out.push_str(code);
            out.push_str(", ");
        }
        out.push_str("},\n");
    }
    out.push_str("    }\n};\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    #[test]
    fn layout_of_the_c_fragment() {
        let mut t = KeymapTable::new(2, 2);
        t.place(1, 0, Cell::new(0, "K0", Some("KC_ESC".into())))
            .unwrap();
        assert_eq!(
            render(&t),
            "const uint16_t PROGMEM keymaps[][MATRIX_ROWS][MATRIX_COLS] = {\n    [0] = {\n        {KC_NO, KC_NO, },\n        {KC_ESC, KC_NO, },\n    }\n};\n"
        );
    }
}

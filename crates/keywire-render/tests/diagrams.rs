use indexmap::IndexMap;
use std::f64::consts::{FRAC_PI_2, PI};

use keywire_core::{
    FlatCable, FlatCablePlacement, Key, Net, Pose, TerminalGeometry, TerminalPair, WireGroup,
};
use keywire_render::{render_net, render_wiring, wire_color, RenderOptions};
use keywire_route::{generate_route, Matrix, RouteInput, RouteResult, SolveOptions};

fn key(index: usize, x: f64) -> Key {
    Key {
        id: format!("K{index}"),
        index,
        pose: Pose::new(x, 0.0, 0.0),
        orientation: Default::default(),
        terminals: TerminalGeometry {
            row: TerminalPair {
                left: Pose::new(-0.1, 0.0, 0.0),
                right: Pose::new(0.1, 0.0, PI),
            },
            col: TerminalPair {
                left: Pose::new(0.0, -0.1, FRAC_PI_2),
                right: Pose::new(0.0, 0.1, -FRAC_PI_2),
            },
        },
        code: None,
        layout_index: index,
    }
}

fn routed() -> RouteResult {
    let keys = vec![key(0, 1.0), key(1, 2.0)];
    let cable = FlatCable::new(3, 0)
        .with_group(WireGroup::new(0, 1, 0, Net::Row, false))
        .with_group(WireGroup::new(1, 3, 0, Net::Col, false));
    let placements = vec![FlatCablePlacement::new(cable, [0.0, 0.0], -FRAC_PI_2, false)];
    let mut matrix = Matrix::new();
    matrix.insert(
        "R0".to_string(),
        IndexMap::from([
            ("C0".to_string(), "K0".to_string()),
            ("C1".to_string(), "K1".to_string()),
        ]),
    );
    let input = RouteInput {
        matrix: &matrix,
        placements: &placements,
        keys: &keys,
    };
    generate_route(&input, &SolveOptions::default()).unwrap()
}

#[test]
fn both_diagrams_share_dimensions() {
    let result = routed();
    let diagrams = render_wiring(&result, &RenderOptions::default()).unwrap();
    assert_eq!(diagrams.source.width(), diagrams.drain.width());
    assert_eq!(diagrams.source.height(), diagrams.drain.height());
    // Two keys of 1.4 cm plus the cable entry, at 100 px/cm and a 100 px margin.
    assert!(diagrams.source.width() > 300);
}

#[test]
fn emphasized_row_wire_is_drawn_in_its_ribbon_color() {
    let result = routed();
    let (pixmap, view) = render_net(&result, Net::Row, &RenderOptions::default()).unwrap();
    let (x, y) = view.to_pixel([0.15, 0.0]);
    let c = pixmap.pixel(x as u32, y as u32).unwrap().demultiply();
    let expected = wire_color(0).rgba;
    assert_eq!([c.red(), c.green(), c.blue()], [expected[0], expected[1], expected[2]]);
}

#[test]
fn diagrams_are_saved_as_png() {
    let result = routed();
    let diagrams = render_wiring(&result, &RenderOptions::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    diagrams.save(dir.path()).unwrap();
    for name in ["wiring_source.png", "wiring_drain.png"] {
        let bytes = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}

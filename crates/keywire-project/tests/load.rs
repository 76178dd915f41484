use std::path::Path;

use keywire_project::{Error, LayoutCache, Project};

const GRID: &str = r#"
mainboard: Bob
placements: [{anchor: [0, 0], angle: -90}]
parts:
  mx:
    row: {left: {x: -0.3, y: 0.5}, right: {x: 0.3, y: 0.5, angle: 180}}
    col: {left: {x: -0.2, y: -0.4, angle: 90}, right: {x: 0.2, y: -0.4, angle: -90}}
default_part: mx
matrix: {S0: {D0: K0, D1: K1}}
kle: '[["A", "B"]]'
"#;

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write project");
    path
}

#[test]
fn unnamed_project_takes_the_file_stem() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(dir.path(), "macropad.yaml", GRID);
    let project = Project::load(&path, &mut LayoutCache::new()).expect("load");
    assert_eq!(project.name, "macropad");
    assert_eq!(project.keys.len(), 2);
    assert_eq!(project.mainboard.name, "Bob");
    let input = project.route_input();
    assert_eq!(input.keys.len(), 2);
    assert_eq!(input.placements.len(), 1);
}

#[test]
fn layout_text_is_cached_across_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write(dir.path(), "a.yaml", GRID);
    let b = write(dir.path(), "b.yaml", &format!("name: other\n{GRID}"));
    let mut cache = LayoutCache::new();
    Project::load(&a, &mut cache).expect("load a");
    let other = Project::load(&b, &mut cache).expect("load b");
    assert_eq!(other.name, "other");
    assert_eq!(cache.len(), 1);
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.yaml");
    let err = Project::load(&path, &mut LayoutCache::new()).unwrap_err();
    match err {
        Error::Io { path: p, source } => {
            assert_eq!(p, path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn unknown_field_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(dir.path(), "typo.yaml", &format!("{GRID}solver: {{}}\n"));
    let err = Project::load(&path, &mut LayoutCache::new()).unwrap_err();
    assert!(matches!(err, Error::Yaml(_)), "{err}");
}

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use keywire_core::{FlatCablePlacement, Key, Mainboard, Pose, SwitchOrientation};
use keywire_route::{Matrix, RouteInput, SolveOptions};

use crate::cache::LayoutCache;
use crate::kle::KleLayout;
use crate::parts::PartLibrary;
use crate::Error;

/// One KLE unit, in centimetres.
pub const DEFAULT_KEY_PITCH: f64 = 1.905;

/// Appended to a key's part name when the key sits on an LED row.
pub const LED_PART_SUFFIX: &str = " LED";

fn default_key_pitch() -> f64 {
    DEFAULT_KEY_PITCH
}

/// A built-in board by name, or a full definition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MainboardSpec {
    Preset(String),
    Inline(Mainboard),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlacementSpec {
    /// Index into the mainboard's cables.
    #[serde(default)]
    pub cable: usize,
    pub anchor: [f64; 2],
    /// Degrees.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub flip: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct KeySpec {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Degrees.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub part: Option<String>,
    #[serde(default)]
    pub orientation: Option<SwitchOrientation>,
    #[serde(default)]
    pub code: Option<String>,
}

/// KLE layout, as JSON text or inline rows.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum KleSource {
    Text(String),
    Rows(Value),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolveSpec {
    /// Seconds per pin-group.
    pub time_limit: Option<f64>,
    pub threads: Option<usize>,
    pub turning_radius: Option<f64>,
    pub polyline_step: Option<f64>,
}

/// The project file as written.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub name: Option<String>,
    pub mainboard: MainboardSpec,
    pub placements: Vec<PlacementSpec>,
    #[serde(default)]
    pub parts: PartLibrary,
    #[serde(default)]
    pub default_part: Option<String>,
    /// Part names by key id. Explicit keys may also name their part inline.
    #[serde(default)]
    pub key_parts: IndexMap<String, String>,
    /// Switch orientation of keys that do not give one.
    #[serde(default)]
    pub orientation: SwitchOrientation,
    #[serde(default)]
    pub key_orientations: IndexMap<String, SwitchOrientation>,
    #[serde(default = "default_key_pitch")]
    pub key_pitch: f64,
    pub matrix: Matrix,
    #[serde(default)]
    pub keys: Option<Vec<KeySpec>>,
    #[serde(default)]
    pub kle: Option<KleSource>,
    #[serde(default)]
    pub solve: SolveSpec,
}

/// Everything one routing run needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub mainboard: Mainboard,
    pub placements: Vec<FlatCablePlacement>,
    pub keys: Vec<Key>,
    pub matrix: Matrix,
    /// KLE rows echoed into the VIA definition.
    pub layout: Value,
    pub solve: SolveOptions,
}

impl Project {
    /// Read and resolve a project file. Layout text goes through `cache`.
    pub fn load(path: impl AsRef<Path>, cache: &mut LayoutCache) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = ProjectFile::from_yaml_str(&text)?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "keyboard".to_string());
        let project = file.resolve(&fallback, cache)?;
        info!(
            "loaded project \"{}\": {} keys on {}",
            project.name,
            project.keys.len(),
            project.mainboard.name
        );
        Ok(project)
    }

    #[must_use]
    pub fn route_input(&self) -> RouteInput<'_> {
        RouteInput {
            matrix: &self.matrix,
            placements: &self.placements,
            keys: &self.keys,
        }
    }
}

impl ProjectFile {
    /// YAML, or JSON (a YAML subset).
    pub fn from_yaml_str(text: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validate and convert to [`Project`]; `fallback_name` is used when the
    /// file has no `name`.
    pub fn resolve(self, fallback_name: &str, cache: &mut LayoutCache) -> Result<Project, Error> {
        let mainboard = match self.mainboard {
            MainboardSpec::Preset(ref name) => Mainboard::preset(name)?,
            MainboardSpec::Inline(ref board) => {
                board.validate()?;
                board.clone()
            }
        };
        positive("key_pitch", self.key_pitch)?;

        let placements = self
            .placements
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let cable = mainboard.cables.get(p.cable).ok_or(Error::UnknownCable {
                    placement: i,
                    cable: p.cable,
                    count: mainboard.cables.len(),
                })?;
                Ok(FlatCablePlacement::new(
                    cable.clone(),
                    p.anchor,
                    p.angle.to_radians(),
                    p.flip,
                ))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let led = self.led_keys();
        let (keys, layout) = match (&self.keys, &self.kle) {
            (Some(specs), None) => {
                let keys = specs
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| self.explicit_key(i, spec, &led))
                    .collect::<Result<Vec<_>, Error>>()?;
                let row: Vec<Value> = keys.iter().map(|k| Value::String(k.id.clone())).collect();
                (keys, Value::Array(vec![Value::Array(row)]))
            }
            (None, Some(source)) => {
                let layout = match source {
                    KleSource::Text(text) => cache.get_or_parse(text)?,
                    KleSource::Rows(rows) => KleLayout::from_value(rows.clone())?.into(),
                };
                debug!("layout has {} keys", layout.keys.len());
                let keys = self.kle_keys(&layout, &led)?;
                (keys, layout.raw.clone())
            }
            _ => return Err(Error::KeySource),
        };

        let mut seen = HashSet::new();
        for k in &keys {
            if !seen.insert(k.id.as_str()) {
                return Err(Error::DuplicateKey { key: k.id.clone() });
            }
        }
        for id in self.key_parts.keys().chain(self.key_orientations.keys()) {
            if !seen.contains(id.as_str()) {
                warn!("per-key setting for \"{id}\", which is not a key of this project");
            }
        }

        Ok(Project {
            name: self.name.clone().unwrap_or_else(|| fallback_name.to_string()),
            mainboard,
            placements,
            keys,
            matrix: self.matrix.clone(),
            layout,
            solve: self.solve.options()?,
        })
    }

    /// Ids of keys wired on an LED row.
    fn led_keys(&self) -> HashSet<&str> {
        self.matrix
            .iter()
            .filter(|(row, _)| row.starts_with("LED"))
            .flat_map(|(_, cols)| cols.values().map(String::as_str))
            .collect()
    }

    /// Terminal geometry of the part named inline, in `key_parts`, or by
    /// `default_part`, in that order. Keys on LED rows use the part's LED
    /// variant.
    fn part_geometry(
        &self,
        key: &str,
        part: Option<&str>,
        led: &HashSet<&str>,
    ) -> Result<keywire_core::TerminalGeometry, Error> {
        let Some(name) = part
            .or_else(|| self.key_parts.get(key).map(String::as_str))
            .or(self.default_part.as_deref())
        else {
            return Err(Error::NoPart {
                key: key.to_string(),
            });
        };
        let name = if led.contains(key) && !name.ends_with(LED_PART_SUFFIX) {
            format!("{name}{LED_PART_SUFFIX}")
        } else {
            name.to_string()
        };
        self.parts
            .get(&name)
            .map(|p| p.geometry())
            .ok_or_else(|| Error::MissingTerminals {
                key: key.to_string(),
                part: name,
            })
    }

    fn orientation(&self, key: &str, inline: Option<SwitchOrientation>) -> SwitchOrientation {
        inline
            .or_else(|| self.key_orientations.get(key).copied())
            .unwrap_or(self.orientation)
    }

    fn explicit_key(&self, index: usize, spec: &KeySpec, led: &HashSet<&str>) -> Result<Key, Error> {
        Ok(Key {
            id: spec.id.clone(),
            index,
            pose: Pose::new(spec.x, spec.y, spec.angle.to_radians()),
            orientation: self.orientation(&spec.id, spec.orientation),
            terminals: self.part_geometry(&spec.id, spec.part.as_deref(), led)?,
            code: spec.code.clone(),
            layout_index: index,
        })
    }

    /// Keys of a KLE layout, named `K0`, `K1`, ... in layout order. KLE y
    /// points down, the board's y up.
    fn kle_keys(&self, layout: &KleLayout, led: &HashSet<&str>) -> Result<Vec<Key>, Error> {
        layout
            .keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let id = format!("K{i}");
                let [x, y] = k.center();
                Ok(Key {
                    terminals: self.part_geometry(&id, None, led)?,
                    orientation: self.orientation(&id, None),
                    id,
                    index: i,
                    pose: Pose::new(
                        x * self.key_pitch,
                        -y * self.key_pitch,
                        -k.rotation_angle.to_radians(),
                    ),
                    code: k.code().map(str::to_string),
                    layout_index: i,
                })
            })
            .collect()
    }
}

impl SolveSpec {
    pub fn options(&self) -> Result<SolveOptions, Error> {
        let mut options = SolveOptions::default();
        if let Some(secs) = self.time_limit {
            positive("solve.time_limit", secs)?;
            options.time_limit = Duration::from_secs_f64(secs);
        }
        if let Some(threads) = self.threads {
            options.threads = threads.max(1);
        }
        if let Some(r) = self.turning_radius {
            positive("solve.turning_radius", r)?;
            options.turning_radius = r;
        }
        if let Some(step) = self.polyline_step {
            positive("solve.polyline_step", step)?;
            options.polyline_step = step;
        }
        Ok(options)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::NotPositive { field, value })
    }
}

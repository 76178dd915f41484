//! Keyboard Layout Editor (KLE) JSON.
//!
//! Coordinates are in key units with y pointing down, as KLE draws them.

use serde_json::{Map, Value};

use crate::Error;

/// Legend slot KLE's "front center" cell, used to carry firmware key codes.
pub const CODE_LEGEND: usize = 9;

#[derive(Debug, Clone, Copy)]
struct State {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    rx: f64,
    ry: f64,
    r: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KleKey {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    /// Degrees, clockwise on screen.
    pub rotation_angle: f64,
    pub labels: Vec<String>,
}

impl KleKey {
    /// Key centre after rotation about `(rotation_x, rotation_y)`.
    #[must_use]
    pub fn center(&self) -> [f64; 2] {
        let cx = self.x + self.width / 2.0 - self.rotation_x;
        let cy = self.y + self.height / 2.0 - self.rotation_y;
        let (sin, cos) = self.rotation_angle.to_radians().sin_cos();
        [
            self.rotation_x + cx * cos - cy * sin,
            self.rotation_y + cx * sin + cy * cos,
        ]
    }

    #[must_use]
    pub fn legend(&self, slot: usize) -> Option<&str> {
        self.labels
            .get(slot)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Firmware code from the code legend slot.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.legend(CODE_LEGEND)
    }
}

/// A parsed layout together with the JSON it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct KleLayout {
    pub raw: Value,
    pub keys: Vec<KleKey>,
}

impl KleLayout {
    /// Parse KLE text. Both the downloadable JSON (an array) and the raw-data
    /// form without the outer brackets are accepted.
    pub fn parse_str(text: &str) -> Result<Self, Error> {
        let raw: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(first) => serde_json::from_str(&format!("[{text}]"))
                .map_err(|_| Error::Kle(first.to_string()))?,
        };
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self, Error> {
        let keys = parse_keys(&raw)?;
        Ok(Self { raw, keys })
    }
}

fn number(props: &Map<String, Value>, name: &str) -> Option<f64> {
    match props.get(name) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

pub fn parse_keys(raw: &Value) -> Result<Vec<KleKey>, Error> {
    let Value::Array(top) = raw else {
        return Err(Error::Kle("root must be an array".to_string()));
    };
    // Leading keyboard metadata.
    let skip = usize::from(matches!(top.first(), Some(Value::Object(_))));

    let mut state = State {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
        rx: 0.0,
        ry: 0.0,
        r: 0.0,
    };
    let mut keys = Vec::new();
    for (row_index, row) in top[skip..].iter().enumerate() {
        let Value::Array(items) = row else {
            return Err(Error::Kle("rows must be arrays".to_string()));
        };
        if row_index > 0 {
            state.y += 1.0;
        }
        state.x = state.rx;
        state.w = 1.0;
        state.h = 1.0;

        for item in items {
            match item {
                Value::Object(props) => {
                    let rx = number(props, "rx");
                    let ry = number(props, "ry");
                    if let Some(rx) = rx {
                        state.rx = rx;
                    }
                    if let Some(ry) = ry {
                        state.ry = ry;
                    }
                    if rx.is_some() || ry.is_some() {
                        // A rotation cluster restarts at its origin.
                        state.x = state.rx;
                        state.y = state.ry;
                    }
                    if let Some(r) = number(props, "r") {
                        state.r = r;
                    }
                    if let Some(w) = number(props, "w") {
                        state.w = w;
                    }
                    if let Some(h) = number(props, "h") {
                        state.h = h;
                    }
                    if let Some(dx) = number(props, "x") {
                        state.x += dx;
                    }
                    if let Some(dy) = number(props, "y") {
                        state.y += dy;
                    }
                }
                Value::String(label) => {
                    keys.push(KleKey {
                        x: state.x,
                        y: state.y,
                        width: state.w,
                        height: state.h,
                        rotation_x: state.rx,
                        rotation_y: state.ry,
                        rotation_angle: state.r,
                        labels: label.split('\n').map(str::to_string).collect(),
                    });
                    state.x += state.w;
                    state.w = 1.0;
                    state.h = 1.0;
                }
                Value::Null => {}
                _ => {
                    return Err(Error::Kle(
                        "row items must be objects or strings".to_string(),
                    ));
                }
            }
        }
    }
    Ok(keys)
}

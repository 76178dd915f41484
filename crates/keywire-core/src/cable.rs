use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Net, Pose};

/// Pin pitch of the stock 1.27 mm ribbon cable, in centimetres.
pub const DEFAULT_WIRE_PITCH: f64 = 0.127;

lazy_static! {
    static ref WIRE_NAME_NUMBER: Regex = Regex::new(r"^.+?(\d+)$").expect("static regex");
}

/// A contiguous pin range `[start, end)` serving one net.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireGroup {
    pub start: usize,
    pub end: usize,
    pub logical_start: usize,
    pub net: Net,
    #[serde(default)]
    pub led: bool,
}

impl WireGroup {
    #[must_use]
    pub fn new(start: usize, end: usize, logical_start: usize, net: Net, led: bool) -> Self {
        Self {
            start,
            end,
            logical_start,
            net,
            led,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Physical pin and logical matrix index a wire name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRef {
    pub pin: usize,
    pub logical: usize,
    pub led: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatCable {
    pub n_wire: usize,
    /// Number carried by the first wire name of a group (`ROW_1` vs `S0`).
    #[serde(default)]
    pub first_index_in_wire_name: usize,
    #[serde(default = "default_pitch")]
    pub pitch: f64,
    #[serde(default)]
    pub groups: Vec<WireGroup>,
}

fn default_pitch() -> f64 {
    DEFAULT_WIRE_PITCH
}

impl FlatCable {
    #[must_use]
    pub fn new(n_wire: usize, first_index_in_wire_name: usize) -> Self {
        Self {
            n_wire,
            first_index_in_wire_name,
            pitch: DEFAULT_WIRE_PITCH,
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: WireGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.pitch > 0.0 && self.pitch.is_finite()) {
            return Err(Error::InvalidPitch { pitch: self.pitch });
        }
        for g in &self.groups {
            if g.start >= g.end || g.end > self.n_wire {
                return Err(Error::MalformedWireGroup {
                    start: g.start,
                    end: g.end,
                    net: g.net,
                    n_wire: self.n_wire,
                });
            }
        }
        Ok(())
    }

    /// Groups carrying `net`, in declaration order.
    pub fn groups_for(&self, net: Net) -> impl Iterator<Item = &WireGroup> {
        self.groups.iter().filter(move |g| g.net == net)
    }

    /// Map a net name such as `ROW_3` or `LED_D1` to a pin of this cable.
    ///
    /// The trailing number, offset by `first_index_in_wire_name`, counts
    /// through the groups of the same net and LED flag in order. Returns
    /// `Ok(None)` when the name belongs to another cable.
    pub fn resolve_wire(&self, wire_name: &str, net: Net) -> Result<Option<PinRef>, Error> {
        let led = wire_name.contains("LED");
        let number: usize = WIRE_NAME_NUMBER
            .captures(wire_name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| Error::MalformedWireName {
                wire: wire_name.to_string(),
            })?;
        let Some(mut index) = number.checked_sub(self.first_index_in_wire_name) else {
            return Ok(None);
        };
        for g in self.groups_for(net).filter(|g| g.led == led) {
            if index < g.len() {
                return Ok(Some(PinRef {
                    pin: g.start + index,
                    logical: g.logical_start + index,
                    led,
                }));
            }
            index -= g.len();
        }
        Ok(None)
    }
}

/// A cable mounted on the board.
///
/// Pins are laid out from `anchor` along `angle`; wires leave the connector
/// perpendicular to that axis, to its left unless `flip` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatCablePlacement {
    pub cable: FlatCable,
    pub anchor: [f64; 2],
    pub angle: f64,
    #[serde(default)]
    pub flip: bool,
}

impl FlatCablePlacement {
    #[must_use]
    pub fn new(cable: FlatCable, anchor: [f64; 2], angle: f64, flip: bool) -> Self {
        Self {
            cable,
            anchor,
            angle,
            flip,
        }
    }
}

/// Resolved pose of one physical pin where its wire enters the board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub pose: Pose,
    pub pin: usize,
    pub logical: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> FlatCable {
        FlatCable::new(30, 0)
            .with_group(WireGroup::new(0, 8, 0, Net::Row, false))
            .with_group(WireGroup::new(8, 20, 0, Net::Col, false))
            .with_group(WireGroup::new(22, 30, 8, Net::Row, false))
    }

    #[test]
    fn resolves_first_group() {
        let pin = bob().resolve_wire("S3", Net::Row).unwrap().unwrap();
        assert_eq!((pin.pin, pin.logical, pin.led), (3, 3, false));
    }

    #[test]
    fn counts_through_later_groups() {
        let pin = bob().resolve_wire("S9", Net::Row).unwrap().unwrap();
        assert_eq!((pin.pin, pin.logical), (23, 9));
        let pin = bob().resolve_wire("D11", Net::Col).unwrap().unwrap();
        assert_eq!((pin.pin, pin.logical), (19, 11));
    }

    #[test]
    fn out_of_range_name_is_unresolved() {
        assert_eq!(bob().resolve_wire("S16", Net::Row).unwrap(), None);
        assert_eq!(bob().resolve_wire("LED_S0", Net::Row).unwrap(), None);
    }

    #[test]
    fn name_without_number_is_an_error() {
        let err = bob().resolve_wire("ROW", Net::Row).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedWireName {
                wire: "ROW".to_string()
            }
        );
    }

    #[test]
    fn one_based_names_and_led_groups() {
        let cable = FlatCable::new(10, 1)
            .with_group(WireGroup::new(0, 8, 0, Net::Row, false))
            .with_group(WireGroup::new(8, 10, 8, Net::Row, true));
        let pin = cable.resolve_wire("ROW_1", Net::Row).unwrap().unwrap();
        assert_eq!((pin.pin, pin.logical), (0, 0));
        let pin = cable.resolve_wire("LED_ROW_2", Net::Row).unwrap().unwrap();
        assert_eq!((pin.pin, pin.logical, pin.led), (9, 9, true));
        assert_eq!(cable.resolve_wire("ROW_0", Net::Row).unwrap(), None);
    }

    #[test]
    fn validate_rejects_groups_past_cable_end() {
        let cable = FlatCable::new(8, 0).with_group(WireGroup::new(4, 9, 0, Net::Col, false));
        assert!(matches!(
            cable.validate(),
            Err(Error::MalformedWireGroup { end: 9, .. })
        ));
        let empty = FlatCable::new(8, 0).with_group(WireGroup::new(4, 4, 0, Net::Col, false));
        assert!(empty.validate().is_err());
        assert!(bob().validate().is_ok());
    }
}

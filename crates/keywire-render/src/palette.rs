/// Ribbon cable colors, indexed by wire number mod 10.
pub const RAINBOW: [[u8; 4]; 10] = [
    [0, 0, 0, 255],       // black
    [165, 42, 42, 255],   // brown
    [255, 0, 0, 255],     // red
    [255, 165, 0, 255],   // orange
    [255, 255, 0, 255],   // yellow
    [0, 128, 0, 255],     // green
    [0, 0, 255, 255],     // blue
    [238, 130, 238, 255], // violet
    [128, 128, 128, 255], // grey
    [255, 255, 255, 255], // white
];

const GREY: [u8; 4] = [128, 128, 128, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireColor {
    pub rgba: [u8; 4],
    pub outline: [u8; 4],
}

/// Color of the wire on zero-based `pin`. Wire numbers printed on ribbon
/// cable start at 1.
#[must_use]
pub fn wire_color(pin: usize) -> WireColor {
    let rgba = RAINBOW[(pin + 1) % 10];
    let outline = if rgba == GREY { BLACK } else { GREY };
    WireColor { rgba, outline }
}

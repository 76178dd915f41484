//! Raster wiring diagrams of a routed keyboard.
//!
//! Two images are drawn from one [`RouteResult`]: one with the row wires
//! emphasized (the "source" side of the diodes) and one with the column
//! wires emphasized ("drain"). Both are mirrored so they read as seen from
//! the wiring side of the plate.

mod palette;

use std::path::Path;

use keywire_core::{Net, Pose, DEFAULT_WIRE_PITCH};
use keywire_route::{terminal_pose, Approach, RouteAssignment, RouteResult};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

pub use palette::{wire_color, WireColor, RAINBOW};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create pixmap with dimensions {width}x{height}")]
    PixmapCreation { width: u32, height: u32 },
    #[error("PNG encoding error: {0}")]
    PngEncode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Pixels per centimetre.
    pub magnification: f64,
    /// Padding around the drawing in pixels.
    pub margin: u32,
    /// Width of an emphasized wire, in centimetres.
    pub wire_pitch: f64,
    /// Side of the square drawn for each switch, in centimetres.
    pub key_size: f64,
    /// Flip left and right.
    pub mirror: bool,
    /// Background color as RGBA.
    pub background: [u8; 4],
    /// Switch outline color as RGBA.
    pub key_color: [u8; 4],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            magnification: 100.0,
            margin: 100,
            wire_pitch: DEFAULT_WIRE_PITCH,
            key_size: 1.4,
            mirror: true,
            background: [255, 255, 255, 255],
            key_color: [160, 160, 160, 255],
        }
    }
}

/// Maps board coordinates (cm, y up) to pixels (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    min_x: f64,
    max_y: f64,
    scale: f64,
    margin: f64,
    width: u32,
    height: u32,
    mirror: bool,
}

impl Viewport {
    fn fit(points: &[[f64; 2]], opts: &RenderOptions) -> Self {
        let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
        let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
        for &[x, y] in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if points.is_empty() {
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
        }
        let span = |lo: f64, hi: f64| ((hi - lo) * opts.magnification).ceil().max(0.0) as u32;
        Self {
            min_x,
            max_y,
            scale: opts.magnification,
            margin: f64::from(opts.margin),
            width: span(min_x, max_x) + 2 * opts.margin,
            height: span(min_y, max_y) + 2 * opts.margin,
            mirror: opts.mirror,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel position of a board point.
    #[must_use]
    pub fn to_pixel(&self, [x, y]: [f64; 2]) -> (f32, f32) {
        let mut px = (x - self.min_x) * self.scale + self.margin;
        let py = (self.max_y - y) * self.scale + self.margin;
        if self.mirror {
            px = f64::from(self.width) - px;
        }
        (px as f32, py as f32)
    }
}

/// The two diagrams of a routed board.
pub struct WiringDiagrams {
    /// Row wires emphasized.
    pub source: Pixmap,
    /// Column wires emphasized.
    pub drain: Pixmap,
}

impl WiringDiagrams {
    /// Write `wiring_source.png` and `wiring_drain.png` into `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), RenderError> {
        let dir = dir.as_ref();
        save_png(&self.source, dir.join("wiring_source.png"))?;
        save_png(&self.drain, dir.join("wiring_drain.png"))?;
        Ok(())
    }
}

/// Polylines of one wire plus the straight hops through each key.
struct WirePath {
    pin: usize,
    net: Net,
    legs: Vec<Vec<[f64; 2]>>,
    hops: Vec<([f64; 2], [f64; 2])>,
}

impl WirePath {
    fn new(result: &RouteResult, route: &RouteAssignment) -> Self {
        let net = route.group.net;
        let mut hops = Vec::new();
        for (i, leg) in route.legs.iter().enumerate() {
            let Some(&end) = leg.last() else { continue };
            let next = match route.legs.get(i + 1).and_then(|l| l.first()) {
                Some(&p) => p,
                None => {
                    // Through the last key to its exit terminal.
                    let v = &route.visits[i];
                    let key = &result.keys[v.key];
                    terminal_pose(key, net, v.exit(), Approach::Leaving).xy()
                }
            };
            hops.push((end, next));
        }
        Self {
            pin: route.entry.pin,
            net,
            legs: route.legs.clone(),
            hops,
        }
    }

    fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.legs
            .iter()
            .flatten()
            .copied()
            .chain(self.hops.iter().map(|h| h.1))
    }
}

fn key_corners(pose: &Pose, size: f64) -> [[f64; 2]; 4] {
    let h = size / 2.0;
    [[-h, -h], [h, -h], [h, h], [-h, h]].map(|c| pose.shifted(c).xy())
}

fn paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
    paint.anti_alias = true;
    paint
}

fn stroke(width: f64) -> Stroke {
    Stroke {
        width: width.max(1.0) as f32,
        line_cap: tiny_skia::LineCap::Round,
        line_join: tiny_skia::LineJoin::Round,
        ..Default::default()
    }
}

fn stroke_polyline(pixmap: &mut Pixmap, view: &Viewport, points: &[[f64; 2]], paint: &Paint, stroke: &Stroke) {
    let mut pb = PathBuilder::new();
    for (i, &p) in points.iter().enumerate() {
        let (x, y) = view.to_pixel(p);
        if i == 0 {
            pb.move_to(x, y);
        } else {
            pb.line_to(x, y);
        }
    }
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
    }
}

struct Scene {
    view: Viewport,
    wires: Vec<WirePath>,
    keys: Vec<[[f64; 2]; 4]>,
}

impl Scene {
    fn new(result: &RouteResult, opts: &RenderOptions) -> Self {
        let wires: Vec<WirePath> = result
            .routes
            .values()
            .map(|r| WirePath::new(result, r))
            .collect();
        let keys: Vec<[[f64; 2]; 4]> = result
            .keys
            .iter()
            .map(|k| key_corners(&k.switch_frame(), opts.key_size))
            .collect();
        let points: Vec<[f64; 2]> = wires
            .iter()
            .flat_map(WirePath::points)
            .chain(keys.iter().flatten().copied())
            .collect();
        Self {
            view: Viewport::fit(&points, opts),
            wires,
            keys,
        }
    }

    fn draw(&self, emphasized: Net, opts: &RenderOptions) -> Result<Pixmap, RenderError> {
        let (width, height) = (self.view.width, self.view.height);
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::PixmapCreation { width, height })?;
        let bg = opts.background;
        pixmap.fill(Color::from_rgba8(bg[0], bg[1], bg[2], bg[3]));

        let key_paint = paint(opts.key_color);
        let key_stroke = stroke(0.02 * opts.magnification);
        for corners in &self.keys {
            let mut outline = corners.to_vec();
            outline.push(corners[0]);
            stroke_polyline(&mut pixmap, &self.view, &outline, &key_paint, &key_stroke);
        }

        let mag = opts.magnification;
        let thin_outer = stroke(0.035 * mag);
        let thin_inner = stroke(0.015 * mag);
        let bold_outer = stroke(opts.wire_pitch * mag);
        let bold_inner = stroke((opts.wire_pitch - 0.04) * mag);
        let black = paint([0, 0, 0, 255]);

        // Emphasized net last so it sits on top.
        for net in [emphasized.other(), emphasized] {
            for wire in self.wires.iter().filter(|w| w.net == net) {
                let color = wire_color(wire.pin);
                let fill = paint(color.rgba);
                let edge = paint(color.outline);
                for &(a, b) in &wire.hops {
                    stroke_polyline(&mut pixmap, &self.view, &[a, b], &black, &thin_outer);
                    stroke_polyline(&mut pixmap, &self.view, &[a, b], &fill, &thin_inner);
                }
                let (outer, inner) = if net == emphasized {
                    (&bold_outer, &bold_inner)
                } else {
                    (&thin_outer, &thin_inner)
                };
                for leg in wire.legs.iter().filter(|l| l.len() > 1) {
                    stroke_polyline(&mut pixmap, &self.view, leg, &edge, outer);
                    stroke_polyline(&mut pixmap, &self.view, leg, &fill, inner);
                }
            }
        }
        Ok(pixmap)
    }
}

/// Draw both diagrams.
pub fn render_wiring(result: &RouteResult, opts: &RenderOptions) -> Result<WiringDiagrams, RenderError> {
    let scene = Scene::new(result, opts);
    debug!(
        "rendering {} wires at {}x{}",
        scene.wires.len(),
        scene.view.width,
        scene.view.height
    );
    Ok(WiringDiagrams {
        source: scene.draw(Net::Row, opts)?,
        drain: scene.draw(Net::Col, opts)?,
    })
}

/// Draw one diagram with `emphasized` wires bold, returning it with its viewport.
pub fn render_net(
    result: &RouteResult,
    emphasized: Net,
    opts: &RenderOptions,
) -> Result<(Pixmap, Viewport), RenderError> {
    let scene = Scene::new(result, opts);
    Ok((scene.draw(emphasized, opts)?, scene.view))
}

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    use image::{ImageBuffer, Rgba};

    let width = pixmap.width();
    let height = pixmap.height();
    let mut img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        // tiny-skia stores premultiplied alpha.
        let c = pixmap
            .pixel(x, y)
            .map(|p| p.demultiply())
            .map_or([0, 0, 0, 0], |c| [c.red(), c.green(), c.blue(), c.alpha()]);
        *pixel = Rgba(c);
    }

    let mut buf = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buf);
    img.write_to(&mut cursor, image::ImageFormat::Png)?;
    Ok(buf)
}

pub fn save_png(pixmap: &Pixmap, path: impl AsRef<Path>) -> Result<(), RenderError> {
    std::fs::write(path, encode_png(pixmap)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(mirror: bool) -> RenderOptions {
        RenderOptions {
            mirror,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn viewport_spans_points_plus_margin() {
        let view = Viewport::fit(&[[0.0, 0.0], [2.0, 1.0]], &opts(false));
        assert_eq!(view.width(), 400);
        assert_eq!(view.height(), 300);
        assert_eq!(view.to_pixel([0.0, 1.0]), (100.0, 100.0));
        assert_eq!(view.to_pixel([2.0, 0.0]), (300.0, 200.0));
    }

    #[test]
    fn mirror_flips_x_only() {
        let view = Viewport::fit(&[[0.0, 0.0], [2.0, 1.0]], &opts(true));
        assert_eq!(view.to_pixel([0.0, 1.0]), (300.0, 100.0));
        assert_eq!(view.to_pixel([2.0, 0.0]), (100.0, 200.0));
    }

    #[test]
    fn empty_drawing_is_margin_only() {
        let view = Viewport::fit(&[], &opts(true));
        assert_eq!((view.width(), view.height()), (200, 200));
    }

    #[test]
    fn key_square_is_rotated_with_the_key() {
        let c = key_corners(&Pose::new(1.0, 1.0, std::f64::consts::FRAC_PI_2), 2.0);
        assert!((c[0][0] - 2.0).abs() < 1e-12);
        assert!((c[0][1] - 0.0).abs() < 1e-12);
    }
}

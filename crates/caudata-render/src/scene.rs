//! Software renderer for the extruded terrain.
//!
//! The shaded surface is extruded with a fixed vertical exaggeration,
//! projected orthographically from a camera orbiting the scene, and
//! rasterized with a depth buffer. Occurrence points are draped on the
//! surface as discs lifted by a fixed offset.

use std::path::Path;

use caudata_core::models::Raster;
use image::{Rgb as Pixel, RgbImage};

use crate::error::{RenderError, Result};
use crate::palette::{hex, Rgb};
use crate::shade::HeightMap;

/// Vertical exaggeration of the extruded surface
pub const RENDER_EXAGGERATION: f64 = 25.0;

/// Height in meters points are lifted above the surface before exaggeration
pub const POINT_OFFSET_M: f64 = 60.0;

/// Disc radius of a draped point, in pixels
pub const POINT_RADIUS_PX: i32 = 4;

pub const POINT_COLOR: Rgb = hex(0xE31A1C);

const BACKGROUND: Rgb = hex(0xFFFFFF);

/// Orthographic camera orbiting the scene center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Rotation about the vertical axis in degrees
    pub theta_deg: f64,
    /// Elevation above the horizon in degrees; 90 looks straight down
    pub phi_deg: f64,
    pub width: u32,
    pub height: u32,
}

impl Camera {
    /// Looking almost straight down, north up
    pub fn overhead() -> Self {
        Self { theta_deg: 0.0, phi_deg: 89.0, width: 1200, height: 1000 }
    }

    /// Low oblique view from the south-west
    pub fn oblique() -> Self {
        Self { theta_deg: -45.0, phi_deg: 25.0, width: 1400, height: 900 }
    }

    /// Project a world point (east, north, up) to (screen x, screen up, depth)
    ///
    /// Larger depth is closer to the camera.
    fn project(&self, p: [f64; 3]) -> [f64; 3] {
        let (st, ct) = self.theta_deg.to_radians().sin_cos();
        let (sp, cp) = self.phi_deg.to_radians().sin_cos();
        let x = p[0] * ct - p[1] * st;
        let y = p[0] * st + p[1] * ct;
        [x, y * sp + p[2] * cp, -y * cp + p[2] * sp]
    }
}

/// A point to drape on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrapedPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Extruded, colored terrain ready to be photographed
pub struct Scene<'a> {
    raster: &'a Raster,
    heights: HeightMap,
    colors: Vec<Option<Rgb>>,
    points: Vec<DrapedPoint>,
    exaggeration: f64,
}

impl<'a> Scene<'a> {
    pub fn new(raster: &'a Raster, colors: Vec<Option<Rgb>>) -> Result<Self> {
        if colors.len() != raster.rows() * raster.cols() {
            return Err(RenderError::Plot {
                artifact: "scene".to_string(),
                reason: format!("{} colors for {} cells", colors.len(), raster.rows() * raster.cols()),
            });
        }
        Ok(Self {
            raster,
            heights: HeightMap::from_raster(raster),
            colors,
            points: Vec::new(),
            exaggeration: RENDER_EXAGGERATION,
        })
    }

    pub fn with_points(mut self, points: impl IntoIterator<Item = DrapedPoint>) -> Self {
        self.points.extend(points);
        self
    }

    /// World position of a cell center, origin at the grid center
    fn world(&self, row: usize, col: usize, height: f64) -> [f64; 3] {
        let east = (col as f64 + 0.5 - self.heights.cols as f64 / 2.0) * self.heights.dx;
        let north = (self.heights.rows as f64 / 2.0 - row as f64 - 0.5) * self.heights.dy;
        [east, north, height * self.exaggeration]
    }

    /// Render one snapshot
    pub fn render(&self, camera: &Camera) -> Result<RgbImage> {
        let projected: Vec<Option<[f64; 3]>> = (0..self.heights.rows)
            .flat_map(|row| (0..self.heights.cols).map(move |col| (row, col)))
            .map(|(row, col)| self.heights.get(row, col).map(|h| camera.project(self.world(row, col, h))))
            .collect();

        let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for p in projected.iter().flatten() {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
        }
        if min_x > max_x {
            return Err(RenderError::EmptyLayer {
                artifact: "scene".to_string(),
                reason: "height map has no valid cell".to_string(),
            });
        }

        // Fit the projected surface with a 5% margin
        let (w, h) = (camera.width as f64, camera.height as f64);
        let scale = 0.9 * (w / (max_x - min_x).max(1e-9)).min(h / (max_y - min_y).max(1e-9));
        let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        let to_screen = |p: [f64; 3]| [w / 2.0 + (p[0] - cx) * scale, h / 2.0 - (p[1] - cy) * scale, p[2]];

        let mut frame = Frame::new(camera.width, camera.height);
        let cols = self.heights.cols;
        for row in 0..self.heights.rows.saturating_sub(1) {
            for col in 0..cols.saturating_sub(1) {
                let corners = [(row, col), (row, col + 1), (row + 1, col), (row + 1, col + 1)];
                let [Some(a), Some(b), Some(c), Some(d)] = corners.map(|(r, c)| projected[r * cols + c]) else {
                    continue;
                };
                let Some(color) = self.colors[row * cols + col] else {
                    continue;
                };
                let (a, b, c, d) = (to_screen(a), to_screen(b), to_screen(c), to_screen(d));
                frame.triangle(a, b, c, color);
                frame.triangle(b, d, c, color);
            }
        }

        let bias = POINT_OFFSET_M * self.exaggeration;
        for point in &self.points {
            let Some((row, col)) = self.raster.cell_at(point.lon, point.lat) else {
                continue;
            };
            let Some(height) = self.heights.get(row, col) else {
                continue;
            };
            let world = self.world(row, col, height + POINT_OFFSET_M);
            let screen = to_screen(camera.project(world));
            frame.disc(screen, POINT_RADIUS_PX, POINT_COLOR, bias);
        }

        Ok(frame.into_image())
    }

    /// Render and write a PNG snapshot
    pub fn snapshot(&self, camera: &Camera, path: &Path) -> Result<()> {
        self.render(camera)?.save(path)?;
        tracing::info!(path = %path.display(), theta = camera.theta_deg, phi = camera.phi_deg, "Wrote 3D render");
        Ok(())
    }
}

/// Color and depth buffers
struct Frame {
    width: usize,
    height: usize,
    color: Vec<Rgb>,
    depth: Vec<f64>,
}

impl Frame {
    fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            color: vec![BACKGROUND; width * height],
            depth: vec![f64::NEG_INFINITY; width * height],
        }
    }

    fn plot(&mut self, x: i64, y: i64, depth: f64, color: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        if depth > self.depth[i] {
            self.depth[i] = depth;
            self.color[i] = color;
        }
    }

    /// Fill a screen-space triangle, interpolating depth
    fn triangle(&mut self, a: [f64; 3], b: [f64; 3], c: [f64; 3], color: Rgb) {
        let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        if area.abs() < 1e-12 {
            return;
        }
        let min_x = a[0].min(b[0]).min(c[0]).floor().max(0.0) as i64;
        let max_x = a[0].max(b[0]).max(c[0]).ceil().min(self.width as f64 - 1.0) as i64;
        let min_y = a[1].min(b[1]).min(c[1]).floor().max(0.0) as i64;
        let max_y = a[1].max(b[1]).max(c[1]).ceil().min(self.height as f64 - 1.0) as i64;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let w0 = ((b[0] - px) * (c[1] - py) - (b[1] - py) * (c[0] - px)) / area;
                let w1 = ((c[0] - px) * (a[1] - py) - (c[1] - py) * (a[0] - px)) / area;
                let w2 = 1.0 - w0 - w1;
                if w0 < -1e-9 || w1 < -1e-9 || w2 < -1e-9 {
                    continue;
                }
                self.plot(x, y, w0 * a[2] + w1 * b[2] + w2 * c[2], color);
            }
        }
    }

    /// Filled disc whose depth is raised by `bias`
    fn disc(&mut self, center: [f64; 3], radius: i32, color: Rgb, bias: f64) {
        let (cx, cy) = (center[0].round() as i64, center[1].round() as i64);
        let r = radius as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.plot(cx + dx, cy + dy, center[2] + bias, color);
                }
            }
        }
    }

    fn into_image(self) -> RgbImage {
        let width = self.width as u32;
        RgbImage::from_fn(width, self.height as u32, |x, y| {
            Pixel(self.color[y as usize * self.width + x as usize])
        })
    }
}

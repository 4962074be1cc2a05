//! Color scales shared by the charts, maps and rasters.

use caudata_core::models::CleanedTable;
use plotters::style::RGBColor;

pub type Rgb = [u8; 3];

/// Parse `#RRGGBB`
pub const fn hex(value: u32) -> Rgb {
    [(value >> 16) as u8, (value >> 8) as u8, value as u8]
}

pub fn to_plotters(color: Rgb) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Alpha-composite `top` over `base`
pub fn blend(base: Rgb, top: Rgb, alpha: f64) -> Rgb {
    lerp(base, top, alpha)
}

/// Piecewise-linear gradient over 0..1
#[derive(Debug, Clone, Copy)]
pub struct Gradient {
    stops: &'static [(f64, Rgb)],
}

impl Gradient {
    pub const fn new(stops: &'static [(f64, Rgb)]) -> Self {
        Self { stops }
    }

    pub fn at(&self, t: f64) -> Rgb {
        let Some(&(first_t, first)) = self.stops.first() else {
            return [0, 0, 0];
        };
        if !(t > first_t) {
            return first;
        }
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                return lerp(c0, c1, (t - t0) / (t1 - t0));
            }
        }
        self.stops.last().map(|s| s.1).unwrap_or(first)
    }

    /// Color of `value` stretched over `min..max`
    pub fn scaled(&self, value: f64, min: f64, max: f64) -> Rgb {
        if max > min {
            self.at((value - min) / (max - min))
        } else {
            self.at(0.5)
        }
    }
}

/// Hypsometric green-yellow-brown-white ramp for elevation
pub const TERRAIN: Gradient = Gradient::new(&[
    (0.0, hex(0x00A600)),
    (0.5, hex(0xE6E600)),
    (0.8, hex(0xECB176)),
    (1.0, hex(0xF2F2F2)),
]);

/// Slope ramp, flat to steep
pub const SLOPE: Gradient = Gradient::new(&[
    (0.0, hex(0xFFFFCC)),
    (0.5, hex(0xFD8D3C)),
    (1.0, hex(0x800026)),
]);

/// Circular ramp for aspect, north at both ends
pub const ASPECT: Gradient = Gradient::new(&[
    (0.0, hex(0xD7191C)),
    (0.25, hex(0xFDAE61)),
    (0.5, hex(0x2C7BB6)),
    (0.75, hex(0xABD9E9)),
    (1.0, hex(0xD7191C)),
]);

pub const GREY: Gradient = Gradient::new(&[(0.0, hex(0x000000)), (1.0, hex(0xFFFFFF))]);

/// Diverging color scale for observation years
///
/// Interpolates low, white and high with white at the midpoint. Years
/// outside the domain are drawn in grey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearScale {
    pub low: Rgb,
    pub mid: Rgb,
    pub high: Rgb,
    pub outside: Rgb,
    pub domain: (f64, f64),
    pub midpoint: f64,
}

impl YearScale {
    /// Labeled breaks of the legend
    pub const BREAKS: [i32; 3] = [1930, 1975, 2022];

    /// Scale centered at `midpoint`, clamped into the domain
    pub fn centered(midpoint: f64) -> Self {
        let domain = (1930.0, 2030.0);
        Self {
            low: hex(0x832424),
            mid: hex(0xFFFFFF),
            high: hex(0x3A3A98),
            outside: hex(0x7F7F7F),
            domain,
            midpoint: if midpoint.is_finite() {
                midpoint.clamp(domain.0 + 1.0, domain.1 - 1.0)
            } else {
                (domain.0 + domain.1) / 2.0
            },
        }
    }

    /// Scale centered at the mean year of the cleaned table
    pub fn for_table(table: &CleanedTable) -> Self {
        Self::centered(table.mean_year().unwrap_or(f64::NAN))
    }

    pub fn color(&self, year: f64) -> Rgb {
        let (lo, hi) = self.domain;
        if !(lo..=hi).contains(&year) {
            return self.outside;
        }
        if year <= self.midpoint {
            lerp(self.low, self.mid, (year - lo) / (self.midpoint - lo))
        } else {
            lerp(self.mid, self.high, (year - self.midpoint) / (hi - self.midpoint))
        }
    }
}

/// `#rrggbb` for HTML and SVG
pub fn css(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

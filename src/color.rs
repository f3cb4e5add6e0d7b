//! Deterministic color assignment for rings and sectors.
//!
//! Ring colors sample a fixed perceptual gradient, inverted so inner
//! rings are brightest. A sector reuses its ring's hue with the
//! lightness flipped by sector parity, which keeps neighboring sectors
//! distinguishable without any per-render state.

/// Anchor points of the gradient, dark to bright.
const GRADIENT: [(f64, f64, f64); 5] = [
    (13.0, 8.0, 135.0),
    (126.0, 3.0, 168.0),
    (204.0, 71.0, 120.0),
    (248.0, 149.0, 64.0),
    (240.0, 249.0, 33.0),
];

/// Pure color scheme over a fixed number of rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    ring_count: usize,
}

impl ColorScheme {
    /// Creates a scheme for the given ring count.
    #[must_use]
    pub fn new(ring_count: usize) -> Self {
        Self { ring_count }
    }

    /// Hex color for a ring. Inner rings map to the bright end of the
    /// gradient.
    #[must_use]
    pub fn ring_color(&self, ring_index: usize) -> String {
        let (r, g, b) = self.ring_rgb(ring_index);
        format!("#{:02x}{:02x}{:02x}", r as u8, g as u8, b as u8)
    }

    /// Hex color for a sector: the ring's hue with lightness 0.75 for
    /// even sector indices and 0.35 for odd ones.
    #[must_use]
    pub fn sector_color(&self, ring_index: usize, sector_index: usize) -> String {
        let (r, g, b) = self.ring_rgb(ring_index);
        let (h, s, _) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
        let lightness = if sector_index % 2 == 0 { 0.75 } else { 0.35 };
        let (r, g, b) = hsl_to_rgb(h, s, lightness);
        format!(
            "#{:02x}{:02x}{:02x}",
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8
        )
    }

    fn ring_rgb(&self, ring_index: usize) -> (f64, f64, f64) {
        let t = if self.ring_count == 0 {
            1.0
        } else {
            (self.ring_count as f64 - ring_index as f64) / self.ring_count as f64
        };
        sample_gradient(t.clamp(0.0, 1.0))
    }
}

fn sample_gradient(t: f64) -> (f64, f64, f64) {
    let scaled = t * (GRADIENT.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    let upper = (scaled.ceil() as usize).min(GRADIENT.len() - 1);
    let frac = scaled - lower as f64;
    let (r0, g0, b0) = GRADIENT[lower];
    let (r1, g1, b1) = GRADIENT[upper];
    (
        r0 + (r1 - r0) * frac,
        g0 + (g1 - g0) * frac,
        b0 + (b1 - b0) * frac,
    )
}

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, lightness);
    }
    let delta = max - min;
    let saturation = if lightness > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    let segment = if (max - r).abs() < f64::EPSILON {
        ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    (segment * 60.0, saturation, lightness)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp as usize {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    (r1 + m, g1 + m, b1 + m)
}

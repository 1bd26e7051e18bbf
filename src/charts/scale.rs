//! Color scales shared by the interactive and static charts.

/// Sequential "Reds" scale, light to dark.
pub const REDS: [[u8; 3]; 9] = [
    [255, 245, 240],
    [254, 224, 210],
    [252, 187, 161],
    [252, 146, 114],
    [251, 106, 74],
    [239, 59, 44],
    [203, 24, 29],
    [165, 15, 21],
    [103, 0, 13],
];

/// Fill for regions with no matching data.
pub const NO_DATA: [u8; 3] = [224, 224, 224];

/// Line color for the trend chart.
pub const TREND: [u8; 3] = [203, 24, 29];

/// Categorical palette, one color per crime category.
pub const PALETTE: [[u8; 3]; 10] = [
    [231, 76, 60],   // Red
    [46, 204, 113],  // Green
    [155, 89, 182],  // Purple
    [243, 156, 18],  // Orange
    [26, 188, 156],  // Teal
    [233, 30, 99],   // Pink
    [0, 188, 212],   // Cyan
    [255, 87, 34],   // Deep Orange
    [121, 85, 72],   // Brown
    [96, 125, 139],  // Blue Grey
];

/// Interpolate the Reds scale at `t` (clamped to `0.0..=1.0`).
pub fn reds(t: f64) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (REDS.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(REDS.len() - 1);
    let frac = pos - lower as f64;

    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (REDS[lower], REDS[upper]);
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Fill for a choropleth region.
pub fn region_fill(intensity: Option<f64>) -> [u8; 3] {
    intensity.map(reds).unwrap_or(NO_DATA)
}

pub fn palette(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

/// Round `max` up to a 1, 2 or 5 times power-of-ten axis limit.
pub fn nice_upper_bound(max: i64) -> i64 {
    if max <= 1 {
        return 1;
    }
    let mut magnitude = 1i64;
    while magnitude <= max / 10 {
        magnitude *= 10;
    }
    [1, 2, 5, 10]
        .into_iter()
        .map(|step| step * magnitude)
        .find(|bound| *bound >= max)
        .unwrap_or(10 * magnitude)
}

//! Fixed color palette for calendar events.
//!
//! Colors are stored as `"r, g, b"` strings; arrow keys cycle a selected
//! calendar event through the six entries.

use egui::Color32;

pub const PALETTE: [(u8, u8, u8); 6] = [
    (66, 133, 244),
    (52, 168, 83),
    (251, 188, 5),
    (234, 67, 53),
    (171, 71, 188),
    (0, 172, 193),
];

/// Fill for task blocks, which carry no color of their own.
pub const TASK_COLOR: Color32 = Color32::from_rgb(96, 125, 139);

pub fn default_color() -> String {
    format_rgb(PALETTE[0])
}

pub fn default_fill() -> Color32 {
    let (r, g, b) = PALETTE[0];
    Color32::from_rgb(r, g, b)
}

pub fn format_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("{}, {}, {}", r, g, b)
}

/// Parse an `"r, g, b"` string; whitespace around components is ignored.
pub fn parse_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let mut parts = value.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b))
}

pub fn to_color32(value: &str) -> Option<Color32> {
    parse_rgb(value).map(|(r, g, b)| Color32::from_rgb(r, g, b))
}

fn position(value: &str) -> Option<usize> {
    let rgb = parse_rgb(value)?;
    PALETTE.iter().position(|entry| *entry == rgb)
}

/// Next palette entry; colors outside the palette continue from the first.
pub fn next_color(current: &str) -> String {
    let next = match position(current) {
        Some(index) => (index + 1) % PALETTE.len(),
        None => 0,
    };
    format_rgb(PALETTE[next])
}

/// Previous palette entry; colors outside the palette continue from the first.
pub fn previous_color(current: &str) -> String {
    let previous = match position(current) {
        Some(index) => (index + PALETTE.len() - 1) % PALETTE.len(),
        None => 0,
    };
    format_rgb(PALETTE[previous])
}

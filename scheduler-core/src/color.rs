//! Per-subject color assignment for one rendering pass.

use std::collections::HashMap;

/// Colors handed out in order of first appearance.
pub const PALETTE: [&str; 10] = [
    "#ff6a00", "#3498db", "#2ecc71", "#9b59b6", "#e74c3c", "#1abc9c", "#f39c12", "#d35400",
    "#34495e", "#27ae60",
];

/// Maps subject codes to palette colors.
///
/// A fresh assigner is created for every result set, so the same subject may
/// get a different color in the next pass.
#[derive(Debug, Default, Clone)]
pub struct ColorAssigner {
    assigned: HashMap<String, &'static str>,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `subject`, assigning the next palette entry on first sight.
    pub fn color_for(&mut self, subject: &str) -> &'static str {
        if let Some(color) = self.assigned.get(subject) {
            return *color;
        }

        let color = PALETTE[self.assigned.len() % PALETTE.len()];
        self.assigned.insert(subject.to_string(), color);
        color
    }

    /// Number of distinct subjects seen so far.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Parse `#rrggbb` into its components.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_subject_keeps_its_color() {
        let mut colors = ColorAssigner::new();

        let a = colors.color_for("A");
        let b = colors.color_for("B");
        let a_again = colors.color_for("A");
        let c = colors.color_for("C");

        assert_eq!(a, a_again);
        assert_eq!([a, b, c], [PALETTE[0], PALETTE[1], PALETTE[2]]);
        assert_ne!(b, c);
        assert_eq!(colors.len(), 3);
    }

    #[test]
    fn test_palette_cycles() {
        let mut colors = ColorAssigner::new();
        for i in 0..PALETTE.len() {
            colors.color_for(&format!("S{i}"));
        }

        assert_eq!(colors.color_for("eleventh"), PALETTE[0]);
        assert_eq!(colors.color_for("twelfth"), PALETTE[1]);
    }

    #[test]
    fn test_fresh_assigner_starts_over() {
        let mut first = ColorAssigner::new();
        first.color_for("X");
        first.color_for("Y");

        let mut second = ColorAssigner::new();
        assert_eq!(second.color_for("Y"), PALETTE[0]);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff6a00"), Some((255, 106, 0)));
        assert_eq!(hex_to_rgb("#34495E"), Some((52, 73, 94)));
        assert_eq!(hex_to_rgb("ff6a00"), None);
        assert_eq!(hex_to_rgb("#fff"), None);
    }
}

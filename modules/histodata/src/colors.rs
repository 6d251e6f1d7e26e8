// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Approximate team colors keyed by the archive's constructor ids. The
//! archive itself carries no colors; these cover every constructor back to
//! the early nineties, anything unknown renders grey.

const TEAM_COLORS: [(&str, &str); 43] = [
    ("ferrari", "#DC0000"),
    ("mclaren", "#FF8700"),
    ("mercedes", "#00D2BE"),
    ("red_bull", "#1E41FF"),
    ("williams", "#005AFF"),
    ("alpine", "#0090FF"),
    ("renault", "#FFF500"),
    ("aston_martin", "#006F62"),
    ("alfa", "#900000"),
    ("alphatauri", "#2B4562"),
    ("toro_rosso", "#469BFF"),
    ("haas", "#FFFFFF"),
    ("sauber", "#9B0000"),
    ("racing_point", "#F596C8"),
    ("force_india", "#FF80C7"),
    ("lotus_f1", "#000000"),
    ("caterham", "#005030"),
    ("marussia", "#6E0000"),
    ("manor", "#6E0000"),
    ("virgin", "#CC0000"),
    ("hrt", "#808080"),
    ("toyota", "#CC0000"),
    ("honda", "#FFFFFF"),
    ("bmw_sauber", "#FFFFFF"),
    ("super_aguri", "#CC0000"),
    ("spyker", "#FF6600"),
    ("midland", "#CC0000"),
    ("jordan", "#EBC94A"),
    ("minardi", "#191919"),
    ("jaguar", "#006400"),
    ("prost", "#0000CC"),
    ("arrows", "#FF6600"),
    ("bar", "#FFFFFF"),
    ("tyrrell", "#00008B"),
    ("stewart", "#FFFFFF"),
    ("benetton", "#00FF00"),
    ("ligier", "#0000FF"),
    ("footwork", "#FF6600"),
    ("simtek", "#800080"),
    ("pacific", "#006400"),
    ("forti", "#FFFF00"),
    ("lola", "#008000"),
    ("brabham", "#006400"),
];

/// Fallback color for constructors without an entry.
pub const DEFAULT_COLOR: &str = "#808080";

/// The display color of a constructor.
pub fn team_color(constructor_id: &str) -> &'static str {
    TEAM_COLORS
        .iter()
        .find(|(id, _)| *id == constructor_id)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constructors_have_a_color() {
        assert_eq!(team_color("ferrari"), "#DC0000");
        assert_eq!(team_color("brabham"), "#006400");
    }

    #[test]
    fn unknown_constructors_render_grey() {
        assert_eq!(team_color("unobtainium_gp"), DEFAULT_COLOR);
    }
}

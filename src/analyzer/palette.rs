//! Color Palette Extraction
//!
//! Static scan of style-ish files for color literals. Pure computation,
//! stage-isolated in the pipeline: a failure here never affects the run.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::palette;
use crate::types::{FileSet, extension_of};

/// Extensions worth scanning for colors
const COLOR_FILE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less", "html"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteColor {
    /// Normalized #RRGGBB, uppercase
    pub hex: String,
    /// Occurrences across all scanned files
    pub frequency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Most frequent colors, descending
    pub colors: Vec<PaletteColor>,
    /// Distinct colors found before truncation
    pub total_colors_found: usize,
}

/// Extract the project's color palette from stylesheet-like files.
///
/// Collects hex and rgb()/rgba() literals, normalizes them to `#RRGGBB`,
/// and reports the top colors by frequency.
pub fn extract_palette(files: &FileSet) -> ColorPalette {
    let (Ok(hex_color), Ok(rgb_color)) = (
        Regex::new(r"#([0-9A-Fa-f]{6}|[0-9A-Fa-f]{3})\b"),
        Regex::new(r"rgba?\s*\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})"),
    ) else {
        return ColorPalette {
            colors: Vec::new(),
            total_colors_found: 0,
        };
    };

    let mut counts: HashMap<String, usize> = HashMap::new();

    for (path, content) in files.iter() {
        if !is_color_relevant(path) {
            continue;
        }

        for capture in hex_color.captures_iter(content) {
            let hex = normalize_hex(&capture[1]);
            *counts.entry(hex).or_insert(0) += 1;
        }

        for capture in rgb_color.captures_iter(content) {
            if let (Ok(r), Ok(g), Ok(b)) = (
                capture[1].parse::<u32>(),
                capture[2].parse::<u32>(),
                capture[3].parse::<u32>(),
            ) && r <= 255
                && g <= 255
                && b <= 255
            {
                let hex = format!("#{:02X}{:02X}{:02X}", r, g, b);
                *counts.entry(hex).or_insert(0) += 1;
            }
        }
    }

    let total_colors_found = counts.len();

    let mut colors: Vec<PaletteColor> = counts
        .into_iter()
        .map(|(hex, frequency)| PaletteColor { hex, frequency })
        .collect();
    colors.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.hex.cmp(&b.hex)));
    colors.truncate(palette::TOP_COLORS);

    ColorPalette {
        colors,
        total_colors_found,
    }
}

fn is_color_relevant(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| COLOR_FILE_EXTENSIONS.contains(&ext.as_str()))
}

/// Expand 3-digit hex to 6 digits and uppercase
fn normalize_hex(digits: &str) -> String {
    if digits.len() == 3 {
        let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
        format!("#{}", expanded.to_uppercase())
    } else {
        format!("#{}", digits.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_hex_colors() {
        let files: FileSet = [(
            "style.css",
            ".btn { color: #ff0000; background: #ff0000; border: #00FF00; }",
        )]
        .into_iter()
        .collect();

        let palette = extract_palette(&files);
        assert_eq!(palette.total_colors_found, 2);
        assert_eq!(palette.colors[0].hex, "#FF0000");
        assert_eq!(palette.colors[0].frequency, 2);
    }

    #[test]
    fn test_expands_short_hex() {
        let files: FileSet = [("style.css", "a { color: #fff; }")].into_iter().collect();
        let palette = extract_palette(&files);
        assert_eq!(palette.colors[0].hex, "#FFFFFF");
    }

    #[test]
    fn test_extracts_rgb_colors() {
        let files: FileSet = [("style.css", "a { color: rgb(255, 0, 0); b: rgba(0,0,255,0.5); }")]
            .into_iter()
            .collect();
        let palette = extract_palette(&files);
        let hexes: Vec<&str> = palette.colors.iter().map(|c| c.hex.as_str()).collect();
        assert!(hexes.contains(&"#FF0000"));
        assert!(hexes.contains(&"#0000FF"));
    }

    #[test]
    fn test_ignores_non_style_files() {
        let files: FileSet = [("main.py", "color = '#ff0000'")].into_iter().collect();
        let palette = extract_palette(&files);
        assert!(palette.colors.is_empty());
    }

    #[test]
    fn test_top_colors_bounded() {
        let body: String = (0..20)
            .map(|i| format!("a{{color:#0000{:02X};}}", i))
            .collect();
        let files: FileSet = [("style.css", body.as_str())].into_iter().collect();
        let palette = extract_palette(&files);
        assert_eq!(palette.colors.len(), palette::TOP_COLORS);
        assert_eq!(palette.total_colors_found, 20);
    }
}

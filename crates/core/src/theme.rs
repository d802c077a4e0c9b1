//! Brand colors and typeface shared by every slide template.

use crate::canvas::Color;
use crate::error::Result;
use crate::types::CalloutKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Colors and font used by the layouts.
///
/// Every field has a default, so a theme file only needs to list the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Typeface applied to every run. `None` leaves the theme font in place.
    pub font: Option<String>,

    pub brand: Color,
    pub accent: Color,
    pub black: Color,
    pub white: Color,
    pub dark_gray: Color,
    pub light_gray: Color,
    /// Footer text on the one-pager.
    pub footer_gray: Color,
    /// Footer text on purple backgrounds.
    pub muted: Color,

    pub amber: Color,
    pub caution: Color,
    pub green: Color,

    pub amber_tint: Color,
    pub green_tint: Color,
    pub purple_tint: Color,
    /// Alternate table row fill.
    pub stripe: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font: Some("Graphik".to_string()),
            brand: Color::rgb(117, 0, 192),
            accent: Color::rgb(160, 85, 245),
            black: Color::rgb(0, 0, 0),
            white: Color::rgb(255, 255, 255),
            dark_gray: Color::rgb(51, 51, 51),
            light_gray: Color::rgb(128, 128, 128),
            footer_gray: Color::rgb(127, 140, 141),
            muted: Color::rgb(200, 200, 220),
            amber: Color::rgb(217, 119, 6),
            caution: Color::rgb(245, 158, 11),
            green: Color::rgb(16, 185, 129),
            amber_tint: Color::rgb(254, 243, 199),
            green_tint: Color::rgb(209, 250, 229),
            purple_tint: Color::rgb(243, 232, 255),
            stripe: Color::rgb(245, 245, 250),
        }
    }
}

/// Fill and border of a callout banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerColors {
    pub fill: Color,
    pub border: Color,
}

impl Theme {
    /// Load a theme override file (JSON).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Colors of a full-size banner.
    pub fn banner_colors(&self, kind: CalloutKind) -> BannerColors {
        match kind {
            CalloutKind::Critical => BannerColors {
                fill: self.amber_tint,
                border: self.amber,
            },
            CalloutKind::Recommendation => BannerColors {
                fill: self.green_tint,
                border: self.green,
            },
            CalloutKind::BottomLine | CalloutKind::Default => BannerColors {
                fill: self.purple_tint,
                border: self.brand,
            },
        }
    }

    /// Colors of the short closing banner, which only distinguishes
    /// recommendations from everything else.
    pub fn compact_banner_colors(&self, kind: CalloutKind) -> BannerColors {
        match kind {
            CalloutKind::Recommendation => self.banner_colors(CalloutKind::Recommendation),
            _ => self.banner_colors(CalloutKind::Default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_palette() {
        let theme = Theme::default();

        assert_eq!(theme.banner_colors(CalloutKind::Critical).fill.to_hex(), "FEF3C7");
        assert_eq!(theme.banner_colors(CalloutKind::Critical).border.to_hex(), "D97706");
        assert_eq!(theme.banner_colors(CalloutKind::Recommendation).fill.to_hex(), "D1FAE5");
        assert_eq!(theme.banner_colors(CalloutKind::BottomLine).fill.to_hex(), "F3E8FF");
        assert_eq!(theme.banner_colors(CalloutKind::Default).border.to_hex(), "7500C0");
    }

    #[test]
    fn test_compact_palette_narrows_to_green_or_purple() {
        let theme = Theme::default();

        assert_eq!(
            theme.compact_banner_colors(CalloutKind::Recommendation).fill,
            theme.green_tint
        );
        assert_eq!(
            theme.compact_banner_colors(CalloutKind::Critical).fill,
            theme.purple_tint
        );
        assert_eq!(
            theme.compact_banner_colors(CalloutKind::BottomLine).fill,
            theme.purple_tint
        );
    }

    #[test]
    fn test_partial_theme_file() {
        let theme: Theme = serde_json::from_str(r##"{"brand": "#112233", "font": null}"##).unwrap();

        assert_eq!(theme.brand, Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.font, None);
        assert_eq!(theme.green, Theme::default().green);
    }
}

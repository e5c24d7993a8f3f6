use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Named watermark placement.
///
/// Only the vertical offset differs between anchors: the `-left`/`-right`
/// variants place exactly like their plain `top`/`bottom` counterparts and
/// exist as separate button labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    Top,
    Center,
    BottomLeft,
    BottomRight,
    #[default]
    Bottom,
}

/// Button grid offered when the user customizes the position.
pub const ANCHOR_GRID: [&[Anchor]; 4] = [
    &[Anchor::TopLeft, Anchor::TopRight],
    &[Anchor::Center],
    &[Anchor::BottomLeft, Anchor::BottomRight],
    &[Anchor::Bottom],
];

impl Anchor {
    /// Parses a stored tag, falling back to `bottom` for anything unknown.
    pub fn from_tag_lossy(tag: &str) -> Self {
        Anchor::from_str(tag.trim()).unwrap_or_default()
    }

    /// Button label: "top-left" → "TOP LEFT".
    pub fn label(self) -> String {
        self.as_ref().replace('-', " ").to_uppercase()
    }
}

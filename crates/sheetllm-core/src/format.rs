//! Cell formatting
//!
//! A [`CellFormat`] is the resolved formatting of one cell: a set of
//! [`FormatFlag`]s, optional fill and font colors, and the [`BorderSide`]s
//! that carry a border. Its canonical string (see [`CellFormat::canonical`])
//! is the identity used when grouping cells by format.

use std::collections::BTreeSet;
use std::fmt;

/// A formatting flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FormatFlag {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    LeftAligned,
    CenterAligned,
    RightAligned,
    Highlighted,
    Bordered,
    Merged,
}

impl FormatFlag {
    /// Lower-case name used in the canonical format string
    pub fn name(&self) -> &'static str {
        match self {
            FormatFlag::Bold => "bold",
            FormatFlag::Italic => "italic",
            FormatFlag::Underline => "underline",
            FormatFlag::Strikethrough => "strikethrough",
            FormatFlag::LeftAligned => "left_aligned",
            FormatFlag::CenterAligned => "center_aligned",
            FormatFlag::RightAligned => "right_aligned",
            FormatFlag::Highlighted => "highlighted",
            FormatFlag::Bordered => "bordered",
            FormatFlag::Merged => "merged",
        }
    }
}

/// A side of a cell that can carry a border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BorderSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl BorderSide {
    /// All four sides
    pub const ALL: [BorderSide; 4] = [
        BorderSide::Left,
        BorderSide::Right,
        BorderSide::Top,
        BorderSide::Bottom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BorderSide::Left => "left",
            BorderSide::Right => "right",
            BorderSide::Top => "top",
            BorderSide::Bottom => "bottom",
        }
    }
}

/// Resolved formatting of a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellFormat {
    /// Formatting flags
    pub flags: BTreeSet<FormatFlag>,
    /// Background (fill) color, usually an ARGB hex string
    pub bg_color: Option<String>,
    /// Font color
    pub font_color: Option<String>,
    /// Sides that carry a border
    pub borders: BTreeSet<BorderSide>,
}

impl CellFormat {
    /// Create an unformatted cell format
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flag
    pub fn with_flag(mut self, flag: FormatFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Set font to bold
    pub fn bold(self) -> Self {
        self.with_flag(FormatFlag::Bold)
    }

    /// Set font to italic
    pub fn italic(self) -> Self {
        self.with_flag(FormatFlag::Italic)
    }

    /// Set a solid fill color; filled cells are also flagged as highlighted
    pub fn fill_color<S: Into<String>>(mut self, color: S) -> Self {
        self.bg_color = Some(color.into());
        self.with_flag(FormatFlag::Highlighted)
    }

    /// Set the font color
    pub fn font_color<S: Into<String>>(mut self, color: S) -> Self {
        self.font_color = Some(color.into());
        self
    }

    /// Add a border on one side; bordered cells are also flagged as bordered
    pub fn border(mut self, side: BorderSide) -> Self {
        self.borders.insert(side);
        self.with_flag(FormatFlag::Bordered)
    }

    /// Add borders on all four sides
    pub fn all_borders(self) -> Self {
        BorderSide::ALL.iter().fold(self, |fmt, side| fmt.border(*side))
    }

    /// Check for a flag
    pub fn has_flag(&self, flag: FormatFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Bold or italic
    pub fn has_emphasis(&self) -> bool {
        self.has_flag(FormatFlag::Bold) || self.has_flag(FormatFlag::Italic)
    }

    /// Fill color or font color
    pub fn has_color(&self) -> bool {
        self.bg_color.is_some() || self.font_color.is_some()
    }

    /// Any border side, or the bordered flag
    pub fn is_bordered(&self) -> bool {
        !self.borders.is_empty() || self.has_flag(FormatFlag::Bordered)
    }

    /// No formatting at all
    pub fn is_default(&self) -> bool {
        self.flags.is_empty()
            && self.bg_color.is_none()
            && self.font_color.is_none()
            && self.borders.is_empty()
    }

    /// Canonical grouping key
    ///
    /// Flag names, then `bg:<color>`, `fg:<color>` and `borders:<sides>`,
    /// space-joined. Flags and sides are emitted in declaration order so the
    /// key is stable.
    pub fn canonical(&self) -> String {
        let mut parts: Vec<String> = self.flags.iter().map(|f| f.name().to_string()).collect();
        if let Some(bg) = &self.bg_color {
            parts.push(format!("bg:{}", bg));
        }
        if let Some(fg) = &self.font_color {
            parts.push(format!("fg:{}", fg));
        }
        if !self.borders.is_empty() {
            let sides: Vec<&str> = self.borders.iter().map(BorderSide::name).collect();
            parts.push(format!("borders:{}", sides.join(",")));
        }
        parts.join(" ")
    }
}

impl fmt::Display for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

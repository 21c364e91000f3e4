//! Padding around render output.
//!
//! [`ExactPadding`] adds fixed insets. [`AlignedPadding`] grows the output to a minimum
//! size and positions the render inside it; non-positive dimensions are relative to the
//! terminal and must be [resolved](AlignedPadding::resolve) before use.

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::geometry::Size;
use crate::layout::measure::char_width;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Horizontal position of a render within padded space.
pub enum HAlign {
    /// Padding goes to the right.
    Left,
    /// Padding is split; the odd column goes to the right.
    #[default]
    Center,
    /// Padding goes to the left.
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Vertical position of a render within padded space.
pub enum VAlign {
    /// Padding goes below.
    Top,
    /// Padding is split; the odd line goes below.
    #[default]
    Middle,
    /// Padding goes above.
    Bottom,
}

enum AlignKind {
    Start,
    Center,
    End,
}

impl From<HAlign> for AlignKind {
    fn from(value: HAlign) -> Self {
        match value {
            HAlign::Left => Self::Start,
            HAlign::Center => Self::Center,
            HAlign::Right => Self::End,
        }
    }
}

impl From<VAlign> for AlignKind {
    fn from(value: VAlign) -> Self {
        match value {
            VAlign::Top => Self::Start,
            VAlign::Middle => Self::Center,
            VAlign::Bottom => Self::End,
        }
    }
}

/// Split `extra` cells into (leading, trailing).
fn split_extra<A: Into<AlignKind>>(extra: u32, align: A) -> (u32, u32) {
    match align.into() {
        AlignKind::Start => (0, extra),
        AlignKind::Center => {
            let leading = extra / 2;
            (leading, extra - leading)
        }
        AlignKind::End => (extra, 0),
    }
}

fn default_fill() -> char {
    ' '
}

/// Padding cells are counted one column per fill character.
fn check_fill(fill: char) -> TesseraResult<char> {
    if char_width(fill) != 1 {
        return Err(TesseraError::padding(format!(
            "fill {fill:?} must occupy exactly one column"
        )));
    }
    Ok(fill)
}

fn deserialize_fill<'de, D>(deserializer: D) -> Result<char, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let fill = <char as serde::Deserialize>::deserialize(deserializer)?;
    check_fill(fill).map_err(serde::de::Error::custom)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Fixed insets in cells.
pub struct ExactPadding {
    #[serde(default)]
    pub left: u32,
    #[serde(default)]
    pub top: u32,
    #[serde(default)]
    pub right: u32,
    #[serde(default)]
    pub bottom: u32,
    /// Character used for padding cells.
    #[serde(default = "default_fill", deserialize_with = "deserialize_fill")]
    pub fill: char,
}

impl Default for ExactPadding {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl ExactPadding {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            fill: ' ',
        }
    }

    /// Fails for fills that are not exactly one column wide.
    pub fn with_fill(self, fill: char) -> TesseraResult<Self> {
        Ok(Self {
            fill: check_fill(fill)?,
            ..self
        })
    }

    /// `(left, top, right, bottom)`.
    pub fn dimensions(&self) -> (u32, u32, u32, u32) {
        (self.left, self.top, self.right, self.bottom)
    }

    pub fn is_zero(&self) -> bool {
        self.dimensions() == (0, 0, 0, 0)
    }

    pub fn get_padded_size(&self, render_size: Size) -> Size {
        render_size.grow(
            self.left.saturating_add(self.right),
            self.top.saturating_add(self.bottom),
        )
    }

    /// Surround `render` (which occupies `render_size`) with fill cells.
    ///
    /// Zero insets return the input unchanged.
    pub fn pad(&self, render: &str, render_size: Size) -> TesseraResult<String> {
        if self.is_zero() {
            return Ok(render.to_owned());
        }
        check_fill(self.fill)?;

        let padded = self.get_padded_size(render_size);
        let fill_row = repeat_fill(self.fill, padded.width);
        let left = repeat_fill(self.fill, self.left);
        let right = repeat_fill(self.fill, self.right);

        let mut out = String::with_capacity(
            fill_row.len().saturating_mul(padded.height as usize) + render.len(),
        );
        for _ in 0..self.top {
            out.push_str(&fill_row);
            out.push('\n');
        }
        for (i, line) in render.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&left);
            out.push_str(line);
            out.push_str(&right);
        }
        for _ in 0..self.bottom {
            out.push('\n');
            out.push_str(&fill_row);
        }
        Ok(out)
    }
}

fn repeat_fill(fill: char, n: u32) -> String {
    std::iter::repeat_n(fill, n as usize).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Minimum padded size plus alignment of the render within it.
///
/// `width <= 0` / `height <= 0` mean "terminal size plus this (non-positive) amount".
pub struct AlignedPadding {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub h_align: HAlign,
    #[serde(default)]
    pub v_align: VAlign,
    #[serde(default = "default_fill", deserialize_with = "deserialize_fill")]
    pub fill: char,
}

impl AlignedPadding {
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            fill: ' ',
        }
    }

    pub fn aligned(self, h_align: HAlign, v_align: VAlign) -> Self {
        Self {
            h_align,
            v_align,
            ..self
        }
    }

    /// Fails for fills that are not exactly one column wide.
    pub fn with_fill(self, fill: char) -> TesseraResult<Self> {
        Ok(Self {
            fill: check_fill(fill)?,
            ..self
        })
    }

    pub fn is_relative(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Replace relative dimensions with `max(terminal + relative, 1)`.
    pub fn resolve(&self, terminal_size: Size) -> Self {
        fn resolve_dim(value: i32, terminal: u32) -> i32 {
            if value > 0 {
                return value;
            }
            let resolved = (i64::from(terminal) + i64::from(value)).max(1);
            i32::try_from(resolved).unwrap_or(i32::MAX)
        }

        Self {
            width: resolve_dim(self.width, terminal_size.width),
            height: resolve_dim(self.height, terminal_size.height),
            ..*self
        }
    }

    fn absolute_size(&self) -> TesseraResult<Size> {
        if self.is_relative() {
            return Err(TesseraError::padding(format!(
                "relative padding ({}, {}) must be resolved against a terminal size first",
                self.width, self.height
            )));
        }
        Ok(Size::new(self.width as u32, self.height as u32))
    }

    pub fn get_padded_size(&self, render_size: Size) -> TesseraResult<Size> {
        Ok(render_size.max(self.absolute_size()?))
    }

    /// Equivalent insets for a render of `render_size`.
    pub fn to_exact(&self, render_size: Size) -> TesseraResult<ExactPadding> {
        let padded = self.get_padded_size(render_size)?;
        let (left, right) = split_extra(padded.width - render_size.width, self.h_align);
        let (top, bottom) = split_extra(padded.height - render_size.height, self.v_align);
        Ok(ExactPadding {
            left,
            top,
            right,
            bottom,
            fill: self.fill,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Either kind of padding.
pub enum Padding {
    /// Fixed insets.
    Exact(ExactPadding),
    /// Minimum size plus alignment.
    Aligned(AlignedPadding),
}

impl Default for Padding {
    fn default() -> Self {
        Self::Exact(ExactPadding::default())
    }
}

impl From<ExactPadding> for Padding {
    fn from(value: ExactPadding) -> Self {
        Self::Exact(value)
    }
}

impl From<AlignedPadding> for Padding {
    fn from(value: AlignedPadding) -> Self {
        Self::Aligned(value)
    }
}

impl Padding {
    pub fn is_relative(&self) -> bool {
        match self {
            Self::Exact(_) => false,
            Self::Aligned(p) => p.is_relative(),
        }
    }

    pub fn fill(&self) -> char {
        match self {
            Self::Exact(p) => p.fill,
            Self::Aligned(p) => p.fill,
        }
    }

    /// Resolve terminal-relative dimensions; absolute padding is returned as is.
    pub fn resolve(&self, terminal_size: Size) -> Self {
        match self {
            Self::Exact(p) => Self::Exact(*p),
            Self::Aligned(p) => Self::Aligned(p.resolve(terminal_size)),
        }
    }

    pub fn to_exact(&self, render_size: Size) -> TesseraResult<ExactPadding> {
        match self {
            Self::Exact(p) => Ok(*p),
            Self::Aligned(p) => p.to_exact(render_size),
        }
    }

    pub fn get_padded_size(&self, render_size: Size) -> TesseraResult<Size> {
        match self {
            Self::Exact(p) => Ok(p.get_padded_size(render_size)),
            Self::Aligned(p) => p.get_padded_size(render_size),
        }
    }

    pub fn pad(&self, render: &str, render_size: Size) -> TesseraResult<String> {
        self.to_exact(render_size)?.pad(render, render_size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/padding.rs"]
mod tests;

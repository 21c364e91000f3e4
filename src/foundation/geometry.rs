use std::fmt;

use crate::foundation::error::{TesseraError, TesseraResult};

/// Width and height in terminal cells (columns, lines).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Like [`Size::new`] but rejects zero dimensions.
    pub fn positive(width: u32, height: u32) -> TesseraResult<Self> {
        let size = Self::new(width, height);
        size.validate()?;
        Ok(size)
    }

    pub fn is_positive(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn validate(self) -> TesseraResult<()> {
        if !self.is_positive() {
            return Err(TesseraError::validation(format!(
                "size dimensions must be positive, got {self}"
            )));
        }
        Ok(())
    }

    /// Grow by the given extra columns and lines.
    pub fn grow(self, columns: u32, lines: u32) -> Self {
        Self {
            width: self.width.saturating_add(columns),
            height: self.height.saturating_add(lines),
        }
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

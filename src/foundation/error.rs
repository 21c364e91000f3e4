use std::fmt;

/// Result alias used across the crate.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// Which bound a render size check failed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeDimension {
    /// Unpadded render width exceeds the terminal width.
    RenderWidth,
    /// Unpadded render height exceeds the terminal height.
    RenderHeight,
    /// Padded width exceeds the terminal width.
    PaddingWidth,
    /// Padded height exceeds the terminal height.
    PaddingHeight,
}

impl fmt::Display for SizeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RenderWidth => "render width",
            Self::RenderHeight => "render height",
            Self::PaddingWidth => "padding width",
            Self::PaddingHeight => "padding height",
        })
    }
}

#[derive(thiserror::Error, Debug)]
/// Crate-wide error type.
pub enum TesseraError {
    /// Invalid argument to a public operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A render parameter value failed its type or value check.
    #[error("render param error: {0}")]
    Param(String),

    /// Unknown render parameter field or missing parameter namespace.
    #[error("render args field error: {0}")]
    ArgsField(String),

    /// Unknown, unset or mistyped render data field.
    #[error("render data field error: {0}")]
    DataField(String),

    /// Invalid render class declaration.
    #[error("render class error: {0}")]
    Class(String),

    /// Render classes that are not related by inheritance.
    #[error("incompatibility error: {0}")]
    Incompatible(String),

    /// Render output does not fit the terminal.
    #[error("{dimension} out of range: {detail}")]
    Size {
        /// The bound that was exceeded.
        dimension: SizeDimension,
        /// Human readable sizes involved.
        detail: String,
    },

    /// Padding used in a state it cannot be used in.
    #[error("padding error: {0}")]
    Padding(String),

    /// Operation issued out of order (finalized data, invalid seek).
    #[error("sequencing error: {0}")]
    Sequence(String),

    /// Failure while producing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Drawing was cancelled at a write boundary.
    #[error("draw interrupted")]
    Interrupted,

    /// Terminal I/O failure.
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),

    #[error(transparent)]
    /// Wrapped lower-level error.
    Other(#[from] anyhow::Error),
}

impl TesseraError {
    /// Build a [`TesseraError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TesseraError::Param`] value.
    pub fn param(msg: impl Into<String>) -> Self {
        Self::Param(msg.into())
    }

    /// Build a [`TesseraError::ArgsField`] value.
    pub fn args_field(msg: impl Into<String>) -> Self {
        Self::ArgsField(msg.into())
    }

    /// Build a [`TesseraError::DataField`] value.
    pub fn data_field(msg: impl Into<String>) -> Self {
        Self::DataField(msg.into())
    }

    /// Build a [`TesseraError::Class`] value.
    pub fn class(msg: impl Into<String>) -> Self {
        Self::Class(msg.into())
    }

    /// Build a [`TesseraError::Incompatible`] value.
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::Incompatible(msg.into())
    }

    /// Build a [`TesseraError::Size`] value.
    pub fn size(dimension: SizeDimension, detail: impl Into<String>) -> Self {
        Self::Size {
            dimension,
            detail: detail.into(),
        }
    }

    /// Build a [`TesseraError::Padding`] value.
    pub fn padding(msg: impl Into<String>) -> Self {
        Self::Padding(msg.into())
    }

    /// Build a [`TesseraError::Sequence`] value.
    pub fn sequence(msg: impl Into<String>) -> Self {
        Self::Sequence(msg.into())
    }

    /// Build a [`TesseraError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// `true` for cooperative cancellation.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl From<std::io::Error> for TesseraError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::Interrupted {
            Self::Interrupted
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

use std::fmt;

use crate::foundation::geometry::Size;

/// Number of frames a renderable produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameCount {
    Definite(usize),
    /// Streaming or otherwise unknown length. Only "restart" seeks are supported.
    Indefinite,
    /// Resolved on first query, then memoized.
    Postponed,
}

impl FrameCount {
    pub fn definite(self) -> Option<usize> {
        match self {
            Self::Definite(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_indefinite(self) -> bool {
        matches!(self, Self::Indefinite)
    }

    /// `false` only for a definite count of one.
    pub fn is_animated(self) -> bool {
        self != Self::Definite(1)
    }
}

impl fmt::Display for FrameCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definite(n) => write!(f, "{n}"),
            Self::Indefinite => f.write_str("indefinite"),
            Self::Postponed => f.write_str("postponed"),
        }
    }
}

/// Per-frame display duration of an animated renderable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameDuration {
    /// Milliseconds, same for every frame.
    Static(u32),
    /// Decided per frame at render time.
    Dynamic,
}

/// Reference point of a seek offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Seek {
    #[default]
    Start,
    Current,
    /// Relative to the last frame.
    End,
}

impl Seek {
    /// Absolute frame number for `offset` from this reference point.
    ///
    /// Returns `None` when the result is not a frame number of `0..frame_count`.
    pub fn resolve(self, offset: isize, current: usize, frame_count: usize) -> Option<usize> {
        let base = match self {
            Self::Start => 0,
            Self::Current => isize::try_from(current).ok()?,
            Self::End => isize::try_from(frame_count).ok()? - 1,
        };
        let target = usize::try_from(base.checked_add(offset)?).ok()?;
        (target < frame_count).then_some(target)
    }
}

/// One rendered unit of output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    pub number: usize,
    /// Milliseconds; `None` for non-animated renderables.
    pub duration: Option<u32>,
    /// Size of `render_output`, padding included.
    pub render_size: Size,
    pub render_output: String,
}

impl Frame {
    pub fn new(
        number: usize,
        duration: Option<u32>,
        render_size: Size,
        render_output: impl Into<String>,
    ) -> Self {
        Self {
            number,
            duration,
            render_size,
            render_output: render_output.into(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_output)
    }
}

/// Outcome of one render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rendered {
    Frame(Frame),
    /// An indefinite renderable has no more frames.
    Done,
}

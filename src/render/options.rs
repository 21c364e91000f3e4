use crate::layout::padding::{AlignedPadding, Padding};
use crate::terminal::InterruptFlag;

/// Padding `draw` uses unless told otherwise: full terminal width, two lines short of its
/// height, centered.
pub const DRAW_PADDING: Padding = Padding::Aligned(AlignedPadding::new(0, -2));

/// Frame caching policy of a render iterator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FrameCache {
    /// Always or never cache.
    Toggle(bool),
    /// Cache only if the frame count is at most this value.
    Limit(usize),
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::Limit(100)
    }
}

impl FrameCache {
    /// Whether a renderable with `frame_count` frames is cached.
    pub fn enabled_for(self, frame_count: usize) -> bool {
        match self {
            Self::Toggle(on) => on,
            Self::Limit(max) => frame_count <= max,
        }
    }
}

/// Options of [`RenderableExt::draw`](crate::render::renderable::RenderableExt::draw).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DrawOptions {
    /// Animate animated renderables; otherwise only the current frame is drawn.
    pub animate: bool,
    /// Number of times to play the animation; negative loops forever.
    pub loops: i64,
    pub cache: FrameCache,
    /// Fail before drawing if the output would not fit the terminal.
    pub check_size: bool,
    /// Let non-animated output exceed the terminal height.
    pub allow_scroll: bool,
    pub hide_cursor: bool,
    pub echo_input: bool,
    #[serde(skip)]
    pub interrupt: Option<InterruptFlag>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            animate: true,
            loops: -1,
            cache: FrameCache::default(),
            check_size: true,
            allow_scroll: false,
            hide_cursor: true,
            echo_input: false,
            interrupt: None,
        }
    }
}

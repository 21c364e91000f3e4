#![forbid(unsafe_code)]

pub mod foundation;
pub mod layout;
pub mod render;
pub mod terminal;

pub use foundation::error::{SizeDimension, TesseraError, TesseraResult};
pub use foundation::geometry::Size;
pub use layout::padding::{AlignedPadding, ExactPadding, HAlign, Padding, VAlign};
pub use render::args::{ArgsNamespace, RenderArgs};
pub use render::class::{ClassLayout, RenderClass};
pub use render::data::{DataNamespace, RenderData};
pub use render::frame::{Frame, FrameCount, FrameDuration, Rendered, Seek};
pub use render::iterator::RenderIterator;
pub use render::options::{DRAW_PADDING, DrawOptions, FrameCache};
pub use render::param::{ParamValue, RenderParam};
pub use render::renderable::{
    RENDERABLE, Renderable, RenderableExt, RenderableState, base_render_data,
};
pub use render::text::{TEXT, TEXT_FRAMES, TEXT_STREAM, TextFrames, TextStream};
pub use terminal::buffer::BufferTerminal;
pub use terminal::stdout::StdoutTerminal;
pub use terminal::{InterruptFlag, Output, Terminal};

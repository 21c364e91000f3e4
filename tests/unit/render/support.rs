//! Renderables shared by the render unit tests.

use std::cell::Cell;

use crate::foundation::error::TesseraResult;
use crate::foundation::geometry::Size;
use crate::render::args::RenderArgs;
use crate::render::class::RenderClass;
use crate::render::data::RenderData;
use crate::render::frame::{Frame, FrameCount, FrameDuration, Rendered};
use crate::render::renderable::{RENDERABLE, Renderable, RenderableState};
use crate::terminal::Output;

pub(crate) static DIGITS: RenderClass = RenderClass::new("Digits").with_bases(&[&RENDERABLE]);

/// Fills its render size with the last digit of the frame number.
pub(crate) struct Digits {
    pub size: Size,
    pub state: RenderableState,
    /// Frames an indefinite instance produces before reporting `Done`.
    pub limit: Option<usize>,
    pub resolves_to: FrameCount,
    pub resolved: Cell<usize>,
    pub rendered: Cell<usize>,
    pub cleared: Cell<usize>,
    pub interrupted: Cell<usize>,
}

impl Digits {
    fn with_state(size: Size, state: RenderableState) -> Self {
        Self {
            size,
            state,
            limit: None,
            resolves_to: FrameCount::Postponed,
            resolved: Cell::new(0),
            rendered: Cell::new(0),
            cleared: Cell::new(0),
            interrupted: Cell::new(0),
        }
    }

    pub fn still(width: u32, height: u32) -> Self {
        Self::with_state(Size::new(width, height), RenderableState::still())
    }

    pub fn animated(frames: usize, width: u32, height: u32) -> Self {
        let state =
            RenderableState::new(FrameCount::Definite(frames), Some(FrameDuration::Static(1)))
                .unwrap();
        Self::with_state(Size::new(width, height), state)
    }

    pub fn stream(limit: usize, width: u32, height: u32) -> Self {
        let state =
            RenderableState::new(FrameCount::Indefinite, Some(FrameDuration::Static(1))).unwrap();
        Self {
            limit: Some(limit),
            ..Self::with_state(Size::new(width, height), state)
        }
    }

    pub fn postponed(resolves_to: FrameCount) -> Self {
        let state =
            RenderableState::new(FrameCount::Postponed, Some(FrameDuration::Static(1))).unwrap();
        Self {
            resolves_to,
            ..Self::with_state(Size::new(1, 1), state)
        }
    }
}

impl Renderable for Digits {
    fn render_class(&self) -> &'static RenderClass {
        &DIGITS
    }

    fn state(&self) -> &RenderableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderableState {
        &mut self.state
    }

    fn get_render_size(&self) -> Size {
        self.size
    }

    fn get_frame_count(&self) -> TesseraResult<FrameCount> {
        self.resolved.set(self.resolved.get() + 1);
        Ok(self.resolves_to)
    }

    fn render_frame(&self, data: &mut RenderData, _args: &RenderArgs) -> TesseraResult<Rendered> {
        let size = data.size()?;
        let number = data.frame()?;
        if self.limit.is_some_and(|limit| number >= limit) {
            return Ok(Rendered::Done);
        }
        self.rendered.set(self.rendered.get() + 1);

        let digit = char::from_digit((number % 10) as u32, 10).unwrap_or('?');
        let row: String = std::iter::repeat_n(digit, size.width as usize).collect();
        let block = vec![row; size.height as usize].join("\n");
        Ok(Rendered::Frame(Frame::new(number, data.duration()?, size, block)))
    }

    fn clear_frame(&self, _out: &mut Output<'_>, _previous: &Frame) -> TesseraResult<()> {
        self.cleared.set(self.cleared.get() + 1);
        Ok(())
    }

    fn handle_interrupted_draw(&self, out: &mut Output<'_>) -> TesseraResult<()> {
        self.interrupted.set(self.interrupted.get() + 1);
        out.write("!")
    }
}

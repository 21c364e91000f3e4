//! The renderable contract and the operations every renderable gets for free.
//!
//! Implementors provide [`Renderable`]: their class descriptor, their [`RenderableState`], a
//! render size and [`Renderable::render_frame`]. [`RenderableExt`] layers the public
//! operations (`render`, `draw`, `seek`/`tell`, iteration) on top, for every implementor.

use std::cell::Cell;

use crate::foundation::error::{SizeDimension, TesseraError, TesseraResult};
use crate::foundation::geometry::Size;
use crate::layout::padding::Padding;
use crate::render::animate;
use crate::render::args::RenderArgs;
use crate::render::class::RenderClass;
use crate::render::data::RenderData;
use crate::render::frame::{Frame, FrameCount, FrameDuration, Rendered, Seek};
use crate::render::iterator::RenderIterator;
use crate::render::options::{DrawOptions, FrameCache};
use crate::terminal::{Output, Terminal};

/// Root of every render class hierarchy. Declares the base render data fields.
pub static RENDERABLE: RenderClass =
    RenderClass::new("Renderable").with_data(&["size", "frame", "duration", "iteration"]);

/// Frame bookkeeping shared by all renderables.
#[derive(Debug)]
pub struct RenderableState {
    frame_count: Cell<FrameCount>,
    frame_duration: Option<FrameDuration>,
    cursor: usize,
}

impl RenderableState {
    /// Validate and build the state.
    ///
    /// A single-frame renderable has no duration (any given one is ignored); animated ones
    /// require one.
    pub fn new(
        frame_count: FrameCount,
        frame_duration: Option<FrameDuration>,
    ) -> TesseraResult<Self> {
        if frame_count == FrameCount::Definite(0) {
            return Err(TesseraError::validation("frame count must be positive"));
        }
        let frame_duration = if frame_count.is_animated() {
            match frame_duration {
                None => {
                    return Err(TesseraError::validation(
                        "animated renderables need a frame duration",
                    ));
                }
                Some(d) => Some(check_duration(d)?),
            }
        } else {
            None
        };
        Ok(Self {
            frame_count: Cell::new(frame_count),
            frame_duration,
            cursor: 0,
        })
    }

    /// State of a non-animated renderable.
    pub fn still() -> Self {
        Self {
            frame_count: Cell::new(FrameCount::Definite(1)),
            frame_duration: None,
            cursor: 0,
        }
    }
}

fn check_duration(duration: FrameDuration) -> TesseraResult<FrameDuration> {
    if duration == FrameDuration::Static(0) {
        return Err(TesseraError::validation("frame duration must be positive"));
    }
    Ok(duration)
}

/// What a render class implements.
pub trait Renderable {
    fn render_class(&self) -> &'static RenderClass;

    fn state(&self) -> &RenderableState;

    fn state_mut(&mut self) -> &mut RenderableState;

    /// Size of the unpadded output in cells. Both dimensions must be positive.
    fn get_render_size(&self) -> Size;

    /// Produce the frame described by `data` (size, frame number, duration).
    ///
    /// The output must span exactly `size.height` lines of `size.width` columns, with no
    /// trailing line break. [`Rendered::Done`] is only allowed while iterating a renderable
    /// with an indefinite frame count.
    fn render_frame(&self, data: &mut RenderData, args: &RenderArgs) -> TesseraResult<Rendered>;

    /// Resolve a [`FrameCount::Postponed`] frame count.
    fn get_frame_count(&self) -> TesseraResult<FrameCount> {
        Err(TesseraError::render(format!(
            "`{}` postpones its frame count but cannot resolve it",
            self.render_class()
        )))
    }

    /// Render data for one render (`iteration == false`) or a render sequence.
    ///
    /// Overrides call [`base_render_data`] (or their parent's builder) first, then populate
    /// their own fields.
    fn get_render_data(&self, iteration: bool) -> TesseraResult<RenderData> {
        base_render_data(self, iteration)
    }

    /// Play the animation. `data` was built for iteration.
    fn animate(
        &self,
        data: RenderData,
        args: &RenderArgs,
        padding: &Padding,
        opts: &DrawOptions,
        out: &mut Output<'_>,
    ) -> TesseraResult<()> {
        animate::default_animate(self, data, args, padding, opts, out)
    }

    /// Called before each frame after the first replaces `previous` on screen.
    fn clear_frame(&self, _out: &mut Output<'_>, _previous: &Frame) -> TesseraResult<()> {
        Ok(())
    }

    /// Called after a draw was interrupted mid-write, e.g. to terminate an escape sequence.
    fn handle_interrupted_draw(&self, _out: &mut Output<'_>) -> TesseraResult<()> {
        Ok(())
    }
}

/// Render data with the base fields populated.
pub fn base_render_data<R: Renderable + ?Sized>(
    renderable: &R,
    iteration: bool,
) -> TesseraResult<RenderData> {
    let size = renderable.get_render_size();
    size.validate()?;
    let duration = match renderable.state().frame_duration {
        Some(FrameDuration::Static(ms)) => Some(ms),
        _ => None,
    };

    let mut data = RenderData::new(renderable.render_class())?;
    data.set_size(size)?;
    data.set_frame(renderable.state().cursor)?;
    data.set_duration(duration)?;
    data.set_iteration(iteration)?;
    Ok(data)
}

/// `args` as render args for the renderable's own class.
pub(crate) fn resolve_args<R: Renderable + ?Sized>(
    renderable: &R,
    args: Option<&RenderArgs>,
) -> TesseraResult<RenderArgs> {
    let cls = renderable.render_class();
    match args {
        None => RenderArgs::defaults(cls),
        Some(args) if args.render_cls().is(cls) => Ok(args.clone()),
        Some(args) => RenderArgs::new(cls, Some(args), []),
    }
}

/// Render one frame and apply `padding`, which must be absolute.
///
/// `Ok(None)` means an indefinite renderable ran out of frames during iteration.
pub(crate) fn render_padded<R: Renderable + ?Sized>(
    renderable: &R,
    data: &mut RenderData,
    args: &RenderArgs,
    padding: &Padding,
) -> TesseraResult<Option<Frame>> {
    let frame = match renderable.render_frame(data, args)? {
        Rendered::Frame(frame) => frame,
        Rendered::Done => {
            if data.iteration()? && renderable.frame_count()?.is_indefinite() {
                return Ok(None);
            }
            return Err(TesseraError::render(format!(
                "`{}` ran out of frames outside of an indefinite iteration",
                renderable.render_class()
            )));
        }
    };

    let render_output = padding.pad(&frame.render_output, frame.render_size)?;
    let render_size = padding.get_padded_size(frame.render_size)?;
    Ok(Some(Frame {
        render_size,
        render_output,
        ..frame
    }))
}

/// Fail if the output would not fit `terminal`.
///
/// The height bound is skipped for scrollable (non-animated) output.
pub(crate) fn check_render_size(
    render_size: Size,
    padding: &Padding,
    terminal: Size,
    animation: bool,
    allow_scroll: bool,
) -> TesseraResult<()> {
    let check_height = animation || !allow_scroll;

    if render_size.width > terminal.width {
        return Err(TesseraError::size(
            SizeDimension::RenderWidth,
            format!("{} > {}", render_size.width, terminal.width),
        ));
    }
    if check_height && render_size.height > terminal.height {
        return Err(TesseraError::size(
            SizeDimension::RenderHeight,
            format!("{} > {}", render_size.height, terminal.height),
        ));
    }

    let padded = padding.get_padded_size(render_size)?;
    if padded.width > terminal.width {
        return Err(TesseraError::size(
            SizeDimension::PaddingWidth,
            format!("{} > {}", padded.width, terminal.width),
        ));
    }
    if check_height && padded.height > terminal.height {
        return Err(TesseraError::size(
            SizeDimension::PaddingHeight,
            format!("{} > {}", padded.height, terminal.height),
        ));
    }
    Ok(())
}

/// Public operations of every [`Renderable`].
pub trait RenderableExt: Renderable {
    /// Frame count, resolving and memoizing a postponed one.
    fn frame_count(&self) -> TesseraResult<FrameCount> {
        let state = self.state();
        if state.frame_count.get() != FrameCount::Postponed {
            return Ok(state.frame_count.get());
        }
        let resolved = self.get_frame_count()?;
        if matches!(
            resolved,
            FrameCount::Postponed | FrameCount::Definite(0) | FrameCount::Definite(1)
        ) {
            return Err(TesseraError::render(format!(
                "`{}` resolved its postponed frame count to {resolved}",
                self.render_class()
            )));
        }
        state.frame_count.set(resolved);
        Ok(resolved)
    }

    fn frame_duration(&self) -> Option<FrameDuration> {
        self.state().frame_duration
    }

    fn set_frame_duration(&mut self, duration: FrameDuration) -> TesseraResult<()> {
        if !self.animated() {
            return Err(TesseraError::validation(format!(
                "`{}` is not animated",
                self.render_class()
            )));
        }
        self.state_mut().frame_duration = Some(check_duration(duration)?);
        Ok(())
    }

    /// `false` only for a single-frame renderable. Never resolves a postponed count.
    fn animated(&self) -> bool {
        self.state().frame_count.get().is_animated()
    }

    fn render_size(&self) -> Size {
        self.get_render_size()
    }

    /// Move the frame cursor; returns the new position.
    ///
    /// An indefinite renderable only accepts an offset of zero, which restarts it.
    fn seek(&mut self, offset: isize, whence: Seek) -> TesseraResult<usize> {
        let target = match self.frame_count()? {
            FrameCount::Indefinite => {
                if offset != 0 {
                    return Err(TesseraError::sequence(format!(
                        "`{}` has an indefinite frame count; only a restart (offset 0) is supported",
                        self.render_class()
                    )));
                }
                0
            }
            FrameCount::Definite(n) => whence
                .resolve(offset, self.state().cursor, n)
                .ok_or_else(|| {
                    TesseraError::sequence(format!(
                        "seek offset {offset} from {whence:?} is out of range for {n} frames"
                    ))
                })?,
            FrameCount::Postponed => {
                return Err(TesseraError::sequence("frame count is unresolved"));
            }
        };
        self.state_mut().cursor = target;
        Ok(target)
    }

    fn tell(&self) -> usize {
        self.state().cursor
    }

    /// Render the current frame once. `padding` must be absolute.
    #[tracing::instrument(level = "debug", skip_all, fields(class = self.render_class().name()))]
    fn render(&self, args: Option<&RenderArgs>, padding: Padding) -> TesseraResult<Frame> {
        if padding.is_relative() {
            return Err(TesseraError::padding(
                "render() needs absolute padding; resolve it against a terminal size first",
            ));
        }
        let args = resolve_args(self, args)?;
        let mut data = self.get_render_data(false)?;
        let frame = render_padded(self, &mut data, &args, &padding);
        data.finalize();
        frame?.ok_or_else(|| TesseraError::render("no frame was produced"))
    }

    /// Text of [`RenderableExt::render`] with default args and no padding.
    fn render_text(&self) -> TesseraResult<String> {
        Ok(self.render(None, Padding::default())?.render_output)
    }

    /// Draw to `term`, animating if the renderable is animated and `opts.animate` is set.
    ///
    /// Terminal-relative padding is resolved once against the current terminal size. Size
    /// checks run before anything is written.
    #[tracing::instrument(level = "debug", skip_all, fields(class = self.render_class().name()))]
    fn draw(
        &self,
        term: &mut dyn Terminal,
        args: Option<&RenderArgs>,
        padding: Padding,
        opts: &DrawOptions,
    ) -> TesseraResult<()> {
        let args = resolve_args(self, args)?;
        let terminal_size = term.size()?;
        let padding = padding.resolve(terminal_size);
        let animation = opts.animate && self.animated();
        if animation && opts.loops == 0 {
            return Err(TesseraError::validation("loops must be non-zero"));
        }

        let mut data = self.get_render_data(animation)?;
        if opts.check_size {
            check_render_size(
                data.size()?,
                &padding,
                terminal_size,
                animation,
                opts.allow_scroll,
            )?;
        }

        let mut out = Output::new(term, opts.interrupt.clone());
        if opts.hide_cursor {
            out.set_cursor_visible(false)?;
        }
        if !opts.echo_input {
            out.set_input_echo(false)?;
        }

        let result = if animation {
            self.animate(data, &args, &padding, opts, &mut out)
        } else {
            let result = draw_once(self, &mut data, &args, &padding, &mut out);
            data.finalize();
            result
        };

        if !opts.echo_input {
            out.set_input_echo(true)?;
        }
        if opts.hide_cursor {
            out.set_cursor_visible(true)?;
        }
        out.flush()?;
        result
    }

    /// Iterator over frames with default args, no padding, one loop and default caching.
    fn iter(&self) -> TesseraResult<RenderIterator<'_, Self>> {
        RenderIterator::new(self, None, Padding::default(), 1, FrameCache::default())
    }
}

impl<T: Renderable + ?Sized> RenderableExt for T {}

fn draw_once<R: Renderable + ?Sized>(
    renderable: &R,
    data: &mut RenderData,
    args: &RenderArgs,
    padding: &Padding,
    out: &mut Output<'_>,
) -> TesseraResult<()> {
    let frame = render_padded(renderable, data, args, padding)?
        .ok_or_else(|| TesseraError::render("no frame was produced"))?;
    let written = out
        .write(&frame.render_output)
        .and_then(|()| out.write("\n"))
        .and_then(|()| out.flush());
    if let Err(err) = written {
        if err.is_interrupted() {
            tracing::warn!(class = renderable.render_class().name(), "draw interrupted");
            renderable.handle_interrupted_draw(out)?;
        }
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderable.rs"]
mod tests;

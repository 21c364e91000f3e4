//! Plain-text renderables: fixed frames and line streams.

use std::fmt;
use std::io::{self, BufRead};

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::geometry::Size;
use crate::layout::measure::{char_width, fit_line, line_width};
use crate::render::args::RenderArgs;
use crate::render::class::RenderClass;
use crate::render::data::RenderData;
use crate::render::frame::{Frame, FrameCount, FrameDuration, Rendered};
use crate::render::param::{ParamValue, RenderParam};
use crate::render::renderable::{RENDERABLE, Renderable, RenderableState, base_render_data};

fn is_str(v: &ParamValue) -> bool {
    v.as_str().is_some()
}

fn is_single_cell(v: &ParamValue) -> bool {
    v.as_str().is_some_and(|s| {
        let mut chars = s.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if char_width(c) == 1)
    })
}

fn is_bool(v: &ParamValue) -> bool {
    v.as_bool().is_some()
}

static TEXT_PARAMS: [RenderParam; 1] = [RenderParam::checked(
    "fill",
    ParamValue::str(" "),
    Some((is_str, "fill must be a string")),
    Some((is_single_cell, "fill must be a single one-column character")),
)];

/// Base of the text renderables. `fill` pads short lines and missing rows.
pub static TEXT: RenderClass = RenderClass::new("Text")
    .with_bases(&[&RENDERABLE])
    .with_params(&TEXT_PARAMS);

static TEXT_FRAMES_PARAMS: [RenderParam; 1] = [RenderParam::checked(
    "reverse",
    ParamValue::Bool(false),
    Some((is_bool, "reverse must be a bool")),
    None,
)];

pub static TEXT_FRAMES: RenderClass = RenderClass::new("TextFrames")
    .with_bases(&[&TEXT])
    .with_params(&TEXT_FRAMES_PARAMS)
    .with_data(&["lines"]);

pub static TEXT_STREAM: RenderClass = RenderClass::new("TextStream")
    .with_bases(&[&TEXT])
    .with_data(&["source"])
    .with_finalizer(close_source);

fn fill(args: &RenderArgs) -> TesseraResult<char> {
    args.get(&TEXT)?.get_as("fill")
}

/// Exactly `size.height` rows of exactly `size.width` columns.
fn fit_block<'a>(lines: impl IntoIterator<Item = &'a str>, size: Size, fill: char) -> String {
    let mut lines = lines.into_iter();
    (0..size.height)
        .map(|_| fit_line(lines.next().unwrap_or(""), size.width as usize, fill))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A fixed sequence of text blocks, one per frame.
///
/// The render size is the widest line by the tallest block; shorter content is filled.
pub struct TextFrames {
    frames: Vec<Vec<String>>,
    size: Size,
    state: RenderableState,
}

impl TextFrames {
    /// `duration` is required for more than one frame.
    pub fn new<S: AsRef<str>>(
        frames: impl IntoIterator<Item = S>,
        duration: Option<FrameDuration>,
    ) -> TesseraResult<Self> {
        let frames: Vec<Vec<String>> = frames
            .into_iter()
            .map(|f| {
                f.as_ref()
                    .lines()
                    .map(str::to_owned)
                    .collect::<Vec<String>>()
            })
            .collect();
        if frames.is_empty() {
            return Err(TesseraError::validation("text frames need at least one frame"));
        }

        let mut size = Size::new(1, 1);
        for lines in &frames {
            let width = lines.iter().map(|l| line_width(l)).max().unwrap_or(0);
            size = size.max(Size::new(
                u32::try_from(width).unwrap_or(u32::MAX),
                u32::try_from(lines.len()).unwrap_or(u32::MAX),
            ));
        }

        let state = if frames.len() == 1 {
            RenderableState::still()
        } else {
            RenderableState::new(FrameCount::Definite(frames.len()), duration)?
        };
        Ok(Self {
            frames,
            size,
            state,
        })
    }

    /// Split `text` into frames at lines equal to `separator`.
    pub fn parse(
        text: &str,
        separator: &str,
        duration: Option<FrameDuration>,
    ) -> TesseraResult<Self> {
        let mut frames = vec![String::new()];
        for line in text.lines() {
            if line == separator {
                frames.push(String::new());
                continue;
            }
            if let Some(current) = frames.last_mut() {
                if !current.is_empty() {
                    current.push('\n');
                }
                current.push_str(line);
            }
        }
        Self::new(frames, duration)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Debug for TextFrames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFrames")
            .field("frames", &self.frames.len())
            .field("size", &self.size)
            .finish()
    }
}

impl Renderable for TextFrames {
    fn render_class(&self) -> &'static RenderClass {
        &TEXT_FRAMES
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

    fn render_frame(&self, data: &mut RenderData, args: &RenderArgs) -> TesseraResult<Rendered> {
        let size = data.size()?;
        let index = data.frame()?;
        let reverse: bool = args.get(&TEXT_FRAMES)?.get_as("reverse")?;
        let source = if reverse {
            self.frames.len().checked_sub(index + 1)
        } else {
            Some(index)
        };
        let lines = source.and_then(|i| self.frames.get(i)).ok_or_else(|| {
            TesseraError::render(format!("frame {index} of {} requested", self.frames.len()))
        })?;

        let block = fit_block(lines.iter().map(String::as_str), size, fill(args)?);
        data.set("lines", block.clone())?;
        Ok(Rendered::Frame(Frame::new(index, data.duration()?, size, block)))
    }
}

/// Opens the line source of a [`TextStream`].
pub type SourceOpener = Box<dyn Fn() -> io::Result<Box<dyn BufRead + Send>>>;

fn close_source(data: &mut RenderData) {
    if data.take::<Box<dyn BufRead + Send>>("source").is_ok() {
        tracing::trace!("closed text stream source");
    }
}

/// An indefinite stream of frames, each `size.height` lines read from a source.
///
/// The source is opened when render data is built and released when it is finalized,
/// so restarting an iteration reads from the beginning again.
pub struct TextStream {
    size: Size,
    open: SourceOpener,
    state: RenderableState,
}

impl TextStream {
    pub fn new(
        size: Size,
        duration: FrameDuration,
        open: impl Fn() -> io::Result<Box<dyn BufRead + Send>> + 'static,
    ) -> TesseraResult<Self> {
        size.validate()?;
        Ok(Self {
            size,
            open: Box::new(open),
            state: RenderableState::new(FrameCount::Indefinite, Some(duration))?,
        })
    }
}

impl fmt::Debug for TextStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextStream")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Renderable for TextStream {
    fn render_class(&self) -> &'static RenderClass {
        &TEXT_STREAM
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

    fn get_render_data(&self, iteration: bool) -> TesseraResult<RenderData> {
        let mut data = base_render_data(self, iteration)?;
        data.set("source", (self.open)()?)?;
        Ok(data)
    }

    fn render_frame(&self, data: &mut RenderData, args: &RenderArgs) -> TesseraResult<Rendered> {
        let size = data.size()?;
        let number = data.frame()?;
        let duration = data.duration()?;

        let source = data.get_mut::<Box<dyn BufRead + Send>>("source")?;
        let mut lines = Vec::with_capacity(size.height as usize);
        let mut line = String::new();
        while lines.len() < size.height as usize {
            line.clear();
            if source.read_line(&mut line)? == 0 {
                break;
            }
            lines.push(line.trim_end_matches(['\n', '\r']).to_owned());
        }
        if lines.is_empty() {
            return Ok(Rendered::Done);
        }

        let block = fit_block(lines.iter().map(String::as_str), size, fill(args)?);
        Ok(Rendered::Frame(Frame::new(number, duration, size, block)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;

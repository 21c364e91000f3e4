//! Repeated rendering of an animated renderable.

use std::sync::Arc;

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::geometry::Size;
use crate::layout::padding::Padding;
use crate::render::args::RenderArgs;
use crate::render::data::RenderData;
use crate::render::frame::{Frame, FrameCount, FrameDuration, Seek};
use crate::render::options::FrameCache;
use crate::render::renderable::{Renderable, RenderableExt, render_padded, resolve_args};

struct CacheSlot {
    frame: Arc<Frame>,
    size: Size,
    args: RenderArgs,
    padding: Padding,
}

/// Frame iterator with loop counting, optional caching and seeking.
///
/// Yields `TesseraResult<Arc<Frame>>`. A cached frame is handed out again (same `Arc`)
/// for as long as the render size, args and padding it was rendered with stay current.
/// The render data is finalized when the iterator is exhausted, fails, is closed or
/// dropped.
pub struct RenderIterator<'a, R: Renderable + ?Sized> {
    renderable: &'a R,
    data: Option<RenderData>,
    args: RenderArgs,
    padding: Padding,
    frame_count: FrameCount,
    loops: i64,
    cache: Option<Vec<Option<CacheSlot>>>,
    next_frame: usize,
    /// Frames produced so far; the frame number of an indefinite renderable.
    produced: usize,
    render_size: Size,
    duration: Option<FrameDuration>,
}

impl<'a, R: Renderable + ?Sized> RenderIterator<'a, R> {
    /// `loops` must be non-zero (negative is infinite); `padding` must be absolute.
    ///
    /// Indefinite renderables are always played once and never cached.
    #[tracing::instrument(level = "debug", skip_all, fields(class = renderable.render_class().name()))]
    pub fn new(
        renderable: &'a R,
        args: Option<&RenderArgs>,
        padding: Padding,
        loops: i64,
        cache: FrameCache,
    ) -> TesseraResult<Self> {
        if !renderable.animated() {
            return Err(not_animated(renderable));
        }
        let args = resolve_args(renderable, args)?;
        let data = renderable.get_render_data(true)?;
        Self::from_render_data(renderable, data, args, padding, loops, cache)
    }

    /// Iterate with render data already built for iteration.
    pub fn from_render_data(
        renderable: &'a R,
        data: RenderData,
        args: RenderArgs,
        padding: Padding,
        loops: i64,
        cache: FrameCache,
    ) -> TesseraResult<Self> {
        if !renderable.animated() {
            return Err(not_animated(renderable));
        }
        if !data.iteration()? {
            return Err(TesseraError::validation(
                "render data was not built for iteration",
            ));
        }
        if loops == 0 {
            return Err(TesseraError::validation("loops must be non-zero"));
        }
        if cache == FrameCache::Limit(0) {
            return Err(TesseraError::validation("cache limit must be positive"));
        }
        check_padding(&padding)?;
        let args = resolve_args(renderable, Some(&args))?;

        let frame_count = renderable.frame_count()?;
        let (loops, cache, next_frame) = match frame_count {
            FrameCount::Definite(n) => {
                let cache = cache
                    .enabled_for(n)
                    .then(|| std::iter::repeat_with(|| None).take(n).collect());
                (loops, cache, renderable.tell())
            }
            _ => (1, None, 0),
        };
        tracing::debug!(
            %frame_count,
            loops,
            cached = cache.is_some(),
            "render iterator ready"
        );

        Ok(Self {
            renderable,
            render_size: data.size()?,
            data: Some(data),
            args,
            padding,
            frame_count,
            loops,
            cache,
            next_frame,
            produced: 0,
            duration: renderable.frame_duration(),
        })
    }

    /// Remaining loops, counting the current one; negative when looping forever.
    pub fn loop_count(&self) -> i64 {
        self.loops
    }

    pub fn is_closed(&self) -> bool {
        self.data.is_none()
    }

    /// Set the frame produced next. The loop countdown is left alone.
    ///
    /// An indefinite renderable only accepts an offset of zero: from `Start` it restarts
    /// with fresh render data, from `Current` it is a no-op.
    pub fn seek(&mut self, offset: isize, whence: Seek) -> TesseraResult<usize> {
        if self.data.is_none() {
            return Err(TesseraError::sequence("render iterator is closed"));
        }
        match self.frame_count {
            FrameCount::Definite(n) => {
                let target = whence.resolve(offset, self.next_frame, n).ok_or_else(|| {
                    TesseraError::sequence(format!(
                        "seek offset {offset} from {whence:?} is out of range for {n} frames"
                    ))
                })?;
                self.next_frame = target;
                Ok(target)
            }
            _ => {
                if offset != 0 || whence == Seek::End {
                    return Err(TesseraError::sequence(
                        "an indefinite render iterator can only be restarted",
                    ));
                }
                if whence == Seek::Start {
                    if let Some(mut old) = self.data.take() {
                        old.finalize();
                    }
                    self.data = Some(self.renderable.get_render_data(true)?);
                    self.produced = 0;
                }
                Ok(self.produced)
            }
        }
    }

    /// Args for frames rendered from now on.
    pub fn set_render_args(&mut self, args: &RenderArgs) -> TesseraResult<()> {
        self.args = resolve_args(self.renderable, Some(args))?;
        Ok(())
    }

    pub fn set_padding(&mut self, padding: Padding) -> TesseraResult<()> {
        check_padding(&padding)?;
        self.padding = padding;
        Ok(())
    }

    pub fn set_render_size(&mut self, size: Size) -> TesseraResult<()> {
        size.validate()?;
        self.render_size = size;
        Ok(())
    }

    pub fn set_frame_duration(&mut self, duration: FrameDuration) -> TesseraResult<()> {
        if duration == FrameDuration::Static(0) {
            return Err(TesseraError::validation("frame duration must be positive"));
        }
        self.duration = Some(duration);
        Ok(())
    }

    /// Finalize the render data and drop cached frames. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut data) = self.data.take() {
            data.finalize();
            tracing::trace!(
                class = self.renderable.render_class().name(),
                produced = self.produced,
                "render iterator closed"
            );
        }
        self.cache = None;
    }

    fn static_duration(&self) -> Option<u32> {
        match self.duration {
            Some(FrameDuration::Static(ms)) => Some(ms),
            _ => None,
        }
    }

    fn next_frame(&mut self) -> TesseraResult<Option<Arc<Frame>>> {
        let duration = self.static_duration();
        let Some(data) = self.data.as_mut() else {
            return Ok(None);
        };

        let FrameCount::Definite(n) = self.frame_count else {
            data.set_frame(self.produced)?;
            data.set_size(self.render_size)?;
            data.set_duration(duration)?;
            let frame = render_padded(self.renderable, data, &self.args, &self.padding)?;
            return Ok(frame.map(|f| {
                self.produced += 1;
                Arc::new(f)
            }));
        };

        if self.loops == 0 {
            return Ok(None);
        }
        let index = self.next_frame;

        let cached = self.cache.as_ref().and_then(|slots| {
            slots[index].as_ref().filter(|slot| {
                slot.size == self.render_size
                    && slot.padding == self.padding
                    && slot.args == self.args
            })
        });
        let frame = match cached {
            Some(slot) => {
                tracing::trace!(index, "frame cache hit");
                Arc::clone(&slot.frame)
            }
            None => {
                data.set_frame(index)?;
                data.set_size(self.render_size)?;
                data.set_duration(duration)?;
                let frame = render_padded(self.renderable, data, &self.args, &self.padding)?
                    .ok_or_else(|| TesseraError::render("no frame was produced"))?;
                let frame = Arc::new(frame);
                if let Some(slots) = self.cache.as_mut() {
                    slots[index] = Some(CacheSlot {
                        frame: Arc::clone(&frame),
                        size: self.render_size,
                        args: self.args.clone(),
                        padding: self.padding,
                    });
                }
                frame
            }
        };

        self.produced += 1;
        self.next_frame = (index + 1) % n;
        if self.next_frame == 0 && self.loops > 0 {
            self.loops -= 1;
        }
        Ok(Some(frame))
    }
}

fn not_animated<R: Renderable + ?Sized>(renderable: &R) -> TesseraError {
    TesseraError::validation(format!(
        "`{}` is not animated",
        renderable.render_class()
    ))
}

fn check_padding(padding: &Padding) -> TesseraResult<()> {
    if padding.is_relative() {
        return Err(TesseraError::padding(
            "render iterators need absolute padding; resolve it against a terminal size first",
        ));
    }
    Ok(())
}

impl<R: Renderable + ?Sized> Iterator for RenderIterator<'_, R> {
    type Item = TesseraResult<Arc<Frame>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.close();
                None
            }
            Err(err) => {
                self.close();
                Some(Err(err))
            }
        }
    }
}

impl<R: Renderable + ?Sized> Drop for RenderIterator<'_, R> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/iterator.rs"]
mod tests;

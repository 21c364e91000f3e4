//! Default animation driver: redraw every frame in place.

use std::thread;
use std::time::{Duration, Instant};

use crate::foundation::error::TesseraResult;
use crate::layout::padding::Padding;
use crate::render::args::RenderArgs;
use crate::render::data::RenderData;
use crate::render::iterator::RenderIterator;
use crate::render::options::DrawOptions;
use crate::render::renderable::Renderable;
use crate::terminal::{Output, ansi};

/// Play `renderable` frame by frame, writing each over the previous one.
///
/// The first frame is written before any timing starts. Interruption stops playback after
/// the renderable's interrupt hook has run and is not reported as an error. The cursor
/// always ends up on the line after the animation.
pub fn default_animate<R: Renderable + ?Sized>(
    renderable: &R,
    data: RenderData,
    args: &RenderArgs,
    padding: &Padding,
    opts: &DrawOptions,
    out: &mut Output<'_>,
) -> TesseraResult<()> {
    let mut frames = RenderIterator::from_render_data(
        renderable,
        data,
        args.clone(),
        *padding,
        opts.loops,
        opts.cache,
    )?;
    let played = play(renderable, &mut frames, out);
    frames.close();

    match played {
        Err(err) if err.is_interrupted() => {
            tracing::warn!(
                class = renderable.render_class().name(),
                "animation interrupted"
            );
            renderable.handle_interrupted_draw(out)?;
        }
        Err(err) => return Err(err),
        Ok(()) => {}
    }
    out.write("\n")?;
    out.flush()
}

/// Line breaks that also return to the first column.
fn in_place(output: &str) -> String {
    output.replace('\n', "\r\n")
}

fn play<R: Renderable + ?Sized>(
    renderable: &R,
    frames: &mut RenderIterator<'_, R>,
    out: &mut Output<'_>,
) -> TesseraResult<()> {
    let Some(first) = frames.next() else {
        return Ok(());
    };
    let mut previous = first?;
    out.write(&in_place(&previous.render_output))?;
    out.flush()?;
    let mut shown_at = Instant::now();

    for frame in frames.by_ref() {
        let frame = frame?;

        if let Some(ms) = previous.duration {
            let remaining = Duration::from_millis(u64::from(ms)).saturating_sub(shown_at.elapsed());
            if !remaining.is_zero() {
                thread::sleep(remaining);
            }
        }

        renderable.clear_frame(out, &previous)?;
        out.write(&ansi::cursor_up(previous.render_size.height.saturating_sub(1)))?;
        out.write(&ansi::cursor_column(1))?;
        out.write(&in_place(&frame.render_output))?;
        out.flush()?;

        shown_at = Instant::now();
        previous = frame;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/animate.rs"]
mod tests;

use super::*;
use crate::layout::measure::measure;
use crate::layout::padding::{AlignedPadding, ExactPadding};
use crate::render::options::DRAW_PADDING;
use crate::render::test_support::Digits;
use crate::terminal::InterruptFlag;
use crate::terminal::buffer::BufferTerminal;

#[test]
fn state_validation() {
    assert!(RenderableState::new(FrameCount::Definite(0), None).is_err());
    assert!(RenderableState::new(FrameCount::Definite(3), None).is_err());
    assert!(
        RenderableState::new(FrameCount::Definite(3), Some(FrameDuration::Static(0))).is_err()
    );
    assert!(RenderableState::new(FrameCount::Indefinite, Some(FrameDuration::Dynamic)).is_ok());

    let still = RenderableState::new(FrameCount::Definite(1), Some(FrameDuration::Static(5)))
        .unwrap();
    assert_eq!(still.frame_duration, None);
}

#[test]
fn render_produces_current_frame() {
    let d = Digits::still(3, 2);
    let frame = d.render(None, Padding::default()).unwrap();
    assert_eq!(frame.render_output, "000\n000");
    assert_eq!(frame.render_size, Size::new(3, 2));
    assert_eq!(frame.number, 0);
    assert_eq!(frame.duration, None);
}

#[test]
fn render_applies_padding() {
    let d = Digits::still(2, 1);
    let frame = d
        .render(None, ExactPadding::new(1, 1, 2, 0).into())
        .unwrap();
    assert_eq!(frame.render_size, Size::new(5, 2));
    assert_eq!(measure(&frame.render_output), Size::new(5, 2));
    assert_eq!(frame.render_output, "     \n 00  ");

    let frame = d
        .render(None, AlignedPadding::new(4, 3).into())
        .unwrap();
    assert_eq!(frame.render_size, Size::new(4, 3));
}

#[test]
fn render_rejects_relative_padding() {
    let d = Digits::still(1, 1);
    assert!(matches!(
        d.render(None, DRAW_PADDING),
        Err(TesseraError::Padding(_))
    ));
}

static RT_UNRELATED: RenderClass = RenderClass::new("RtUnrelated");

#[test]
fn render_rejects_unrelated_args() {
    let d = Digits::still(1, 1);
    let args = RenderArgs::defaults(&RT_UNRELATED).unwrap();
    assert!(matches!(
        d.render(Some(&args), Padding::default()),
        Err(TesseraError::Incompatible(_))
    ));
}

#[test]
fn seek_and_tell() {
    let mut d = Digits::animated(5, 1, 1);
    assert_eq!(d.tell(), 0);
    assert_eq!(d.seek(2, Seek::Start).unwrap(), 2);
    assert_eq!(d.seek(-1, Seek::Current).unwrap(), 1);
    assert_eq!(d.seek(0, Seek::End).unwrap(), 4);
    assert!(matches!(d.seek(5, Seek::Start), Err(TesseraError::Sequence(_))));
    assert_eq!(d.tell(), 4);

    d.seek(3, Seek::Start).unwrap();
    assert_eq!(d.render_text().unwrap(), "3");
}

#[test]
fn indefinite_seek_only_restarts() {
    let mut d = Digits::stream(3, 1, 1);
    assert!(matches!(d.seek(1, Seek::Start), Err(TesseraError::Sequence(_))));
    assert_eq!(d.seek(0, Seek::Start).unwrap(), 0);
}

#[test]
fn postponed_frame_count_is_memoized() {
    let d = Digits::postponed(FrameCount::Definite(4));
    assert!(d.animated());
    assert_eq!(d.frame_count().unwrap(), FrameCount::Definite(4));
    assert_eq!(d.frame_count().unwrap(), FrameCount::Definite(4));
    assert_eq!(d.resolved.get(), 1);
}

#[test]
fn postponed_frame_count_must_resolve_to_animated() {
    for bad in [FrameCount::Definite(1), FrameCount::Postponed] {
        let d = Digits::postponed(bad);
        assert!(matches!(d.frame_count(), Err(TesseraError::Render(_))));
    }
    let d = Digits::postponed(FrameCount::Indefinite);
    assert_eq!(d.frame_count().unwrap(), FrameCount::Indefinite);
}

#[test]
fn frame_duration_setter() {
    let mut still = Digits::still(1, 1);
    assert!(still.set_frame_duration(FrameDuration::Static(10)).is_err());

    let mut d = Digits::animated(2, 1, 1);
    d.set_frame_duration(FrameDuration::Dynamic).unwrap();
    assert_eq!(d.frame_duration(), Some(FrameDuration::Dynamic));
    assert!(d.set_frame_duration(FrameDuration::Static(0)).is_err());
}

#[test]
fn done_outside_indefinite_iteration_is_a_render_error() {
    let d = Digits::stream(0, 1, 1);
    assert!(matches!(d.render_text(), Err(TesseraError::Render(_))));
}

#[test]
fn size_checks_name_the_failing_dimension() {
    let term = Size::new(10, 4);
    let none = Padding::default();
    let dim = |r: TesseraResult<()>| match r {
        Err(TesseraError::Size { dimension, .. }) => Some(dimension),
        _ => None,
    };

    assert_eq!(dim(check_render_size(Size::new(10, 4), &none, term, true, false)), None);
    assert_eq!(
        dim(check_render_size(Size::new(11, 1), &none, term, false, false)),
        Some(SizeDimension::RenderWidth)
    );
    assert_eq!(
        dim(check_render_size(Size::new(1, 5), &none, term, false, false)),
        Some(SizeDimension::RenderHeight)
    );

    let wide = Padding::from(ExactPadding::new(1, 0, 1, 0));
    assert_eq!(
        dim(check_render_size(Size::new(9, 1), &wide, term, false, false)),
        Some(SizeDimension::PaddingWidth)
    );
    let tall = Padding::from(ExactPadding::new(0, 1, 0, 0));
    assert_eq!(
        dim(check_render_size(Size::new(1, 4), &tall, term, false, false)),
        Some(SizeDimension::PaddingHeight)
    );
}

#[test]
fn scrolling_skips_height_only_when_not_animating() {
    let term = Size::new(10, 4);
    let none = Padding::default();
    assert!(check_render_size(Size::new(1, 9), &none, term, false, true).is_ok());
    assert!(check_render_size(Size::new(1, 9), &none, term, true, true).is_err());
    assert!(check_render_size(Size::new(11, 1), &none, term, false, true).is_err());
}

#[test]
fn draw_writes_frame_and_restores_terminal() {
    let d = Digits::still(2, 2);
    let mut term = BufferTerminal::new(Size::new(10, 5));
    d.draw(&mut term, None, Padding::default(), &DrawOptions::default())
        .unwrap();
    assert_eq!(term.text(), "00\n00\n");
    assert!(term.cursor_visible);
    assert_eq!(term.echo_changes, vec![false, true]);
    assert!(term.flushes >= 1);
}

#[test]
fn draw_resolves_relative_padding_against_the_terminal() {
    let d = Digits::still(1, 1);
    let mut term = BufferTerminal::new(Size::new(6, 5));
    d.draw(&mut term, None, DRAW_PADDING, &DrawOptions::default())
        .unwrap();
    let text = term.text();
    let output = text.strip_suffix('\n').unwrap();
    assert_eq!(measure(output), Size::new(6, 3));
    assert!(output.contains('0'));
}

#[test]
fn draw_checks_size_before_writing() {
    let d = Digits::still(20, 1);
    let mut term = BufferTerminal::new(Size::new(10, 5));
    let err = d
        .draw(&mut term, None, Padding::default(), &DrawOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        TesseraError::Size {
            dimension: SizeDimension::RenderWidth,
            ..
        }
    ));
    assert!(term.bytes.is_empty());

    let opts = DrawOptions {
        check_size: false,
        ..DrawOptions::default()
    };
    d.draw(&mut term, None, Padding::default(), &opts).unwrap();
    assert!(!term.bytes.is_empty());
}

#[test]
fn interrupted_draw_runs_recovery_then_propagates() {
    let d = Digits::still(1, 1);
    let mut term = BufferTerminal::new(Size::new(10, 5));
    let flag = InterruptFlag::new();
    flag.raise();
    let opts = DrawOptions {
        interrupt: Some(flag),
        ..DrawOptions::default()
    };
    let err = d
        .draw(&mut term, None, Padding::default(), &opts)
        .unwrap_err();
    assert!(err.is_interrupted());
    assert_eq!(d.interrupted.get(), 1);
    assert_eq!(term.text(), "!");
    assert!(term.cursor_visible);
}

#[test]
fn draw_rejects_zero_loops_for_animations() {
    let d = Digits::animated(2, 1, 1);
    let mut term = BufferTerminal::new(Size::new(10, 5));
    let opts = DrawOptions {
        loops: 0,
        ..DrawOptions::default()
    };
    assert!(matches!(
        d.draw(&mut term, None, Padding::default(), &opts),
        Err(TesseraError::Validation(_))
    ));
}

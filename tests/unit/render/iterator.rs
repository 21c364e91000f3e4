use super::*;
use crate::layout::padding::ExactPadding;
use crate::render::options::DRAW_PADDING;
use crate::render::test_support::Digits;

fn iter(d: &Digits, loops: i64, cache: FrameCache) -> RenderIterator<'_, Digits> {
    RenderIterator::new(d, None, Padding::default(), loops, cache).unwrap()
}

fn numbers(frames: &[Arc<Frame>]) -> Vec<usize> {
    frames.iter().map(|f| f.number).collect()
}

#[test]
fn construction_is_validated() {
    let still = Digits::still(1, 1);
    assert!(matches!(
        RenderIterator::new(&still, None, Padding::default(), 1, FrameCache::default()),
        Err(TesseraError::Validation(_))
    ));

    let d = Digits::animated(3, 1, 1);
    assert!(matches!(
        RenderIterator::new(&d, None, Padding::default(), 0, FrameCache::default()),
        Err(TesseraError::Validation(_))
    ));
    assert!(matches!(
        RenderIterator::new(&d, None, Padding::default(), 1, FrameCache::Limit(0)),
        Err(TesseraError::Validation(_))
    ));
    assert!(matches!(
        RenderIterator::new(&d, None, DRAW_PADDING, 1, FrameCache::default()),
        Err(TesseraError::Padding(_))
    ));
}

#[test]
fn yields_frames_times_loops() {
    let d = Digits::animated(3, 1, 1);
    let mut it = iter(&d, 2, FrameCache::default());
    assert_eq!(it.loop_count(), 2);

    let first: Vec<_> = it.by_ref().take(3).map(Result::unwrap).collect();
    assert_eq!(numbers(&first), vec![0, 1, 2]);
    assert_eq!(it.loop_count(), 1);

    let rest: Vec<_> = it.by_ref().map(Result::unwrap).collect();
    assert_eq!(numbers(&rest), vec![0, 1, 2]);
    assert_eq!(it.loop_count(), 0);
    assert!(it.is_closed());
    assert!(it.next().is_none());
}

#[test]
fn negative_loops_never_stop() {
    let d = Digits::animated(2, 1, 1);
    let mut it = iter(&d, -1, FrameCache::default());
    let frames: Vec<_> = it.by_ref().take(11).map(Result::unwrap).collect();
    assert_eq!(frames.len(), 11);
    assert_eq!(it.loop_count(), -1);
    assert!(!it.is_closed());
}

#[test]
fn cached_frames_are_shared_across_loops() {
    let d = Digits::animated(3, 2, 1);
    let frames: Vec<_> = iter(&d, 2, FrameCache::Toggle(true))
        .map(Result::unwrap)
        .collect();
    assert_eq!(frames.len(), 6);
    for i in 0..3 {
        assert!(Arc::ptr_eq(&frames[i], &frames[i + 3]));
    }
    assert_eq!(d.rendered.get(), 3);
}

#[test]
fn uncached_frames_are_equal_but_distinct() {
    let d = Digits::animated(3, 2, 1);
    let frames: Vec<_> = iter(&d, 2, FrameCache::Toggle(false))
        .map(Result::unwrap)
        .collect();
    for i in 0..3 {
        assert!(!Arc::ptr_eq(&frames[i], &frames[i + 3]));
        assert_eq!(frames[i], frames[i + 3]);
    }
    assert_eq!(d.rendered.get(), 6);
}

#[test]
fn cache_limit_below_frame_count_disables_caching() {
    let d = Digits::animated(3, 1, 1);
    let frames: Vec<_> = iter(&d, 2, FrameCache::Limit(2))
        .map(Result::unwrap)
        .collect();
    assert!(!Arc::ptr_eq(&frames[0], &frames[3]));
}

#[test]
fn changed_size_or_padding_invalidates_cached_frames() {
    let d = Digits::animated(2, 1, 1);
    let mut it = iter(&d, -1, FrameCache::Toggle(true));
    let a = it.next().unwrap().unwrap();
    it.next().unwrap().unwrap();

    it.set_render_size(Size::new(3, 1)).unwrap();
    let b = it.next().unwrap().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(b.render_output, "000");

    it.next().unwrap().unwrap();
    let c = it.next().unwrap().unwrap();
    assert!(Arc::ptr_eq(&b, &c));

    it.next().unwrap().unwrap();
    it.set_padding(ExactPadding::new(1, 0, 0, 0).into()).unwrap();
    let e = it.next().unwrap().unwrap();
    assert_eq!(e.render_output, " 000");
    assert_eq!(e.render_size, Size::new(4, 1));
    assert!(it.set_padding(DRAW_PADDING).is_err());
}

#[test]
fn seek_sets_next_frame_without_touching_loops() {
    let d = Digits::animated(5, 1, 1);
    let mut it = iter(&d, 3, FrameCache::default());
    it.next().unwrap().unwrap();

    assert_eq!(it.seek(3, Seek::Start).unwrap(), 3);
    assert_eq!(it.next().unwrap().unwrap().number, 3);
    assert_eq!(it.seek(-2, Seek::Current).unwrap(), 2);
    assert_eq!(it.seek(0, Seek::End).unwrap(), 4);
    assert_eq!(it.loop_count(), 3);
    assert!(matches!(it.seek(5, Seek::Start), Err(TesseraError::Sequence(_))));
    assert_eq!(it.next().unwrap().unwrap().number, 4);
    assert_eq!(it.loop_count(), 2);
}

#[test]
fn starts_at_the_renderable_cursor() {
    let mut d = Digits::animated(4, 1, 1);
    d.seek(2, Seek::Start).unwrap();
    let first = iter(&d, 1, FrameCache::default()).next().unwrap().unwrap();
    assert_eq!(first.number, 2);
}

#[test]
fn indefinite_runs_until_done_once() {
    let d = Digits::stream(4, 1, 1);
    let mut it = iter(&d, 5, FrameCache::Toggle(true));
    assert_eq!(it.loop_count(), 1);
    let frames: Vec<_> = it.by_ref().map(Result::unwrap).collect();
    assert_eq!(numbers(&frames), vec![0, 1, 2, 3]);
    assert!(it.is_closed());
}

#[test]
fn indefinite_seek_restarts_or_fails() {
    let d = Digits::stream(3, 1, 1);
    let mut it = iter(&d, 1, FrameCache::default());
    it.next().unwrap().unwrap();
    it.next().unwrap().unwrap();

    assert!(matches!(it.seek(1, Seek::Start), Err(TesseraError::Sequence(_))));
    assert!(matches!(it.seek(0, Seek::End), Err(TesseraError::Sequence(_))));
    assert_eq!(it.seek(0, Seek::Current).unwrap(), 2);

    assert_eq!(it.seek(0, Seek::Start).unwrap(), 0);
    let frames: Vec<_> = it.map(Result::unwrap).collect();
    assert_eq!(numbers(&frames), vec![0, 1, 2]);
}

#[test]
fn close_is_idempotent() {
    let d = Digits::animated(2, 1, 1);
    let mut it = iter(&d, 1, FrameCache::default());
    it.close();
    it.close();
    assert!(it.is_closed());
    assert!(it.next().is_none());
    assert!(matches!(it.seek(0, Seek::Start), Err(TesseraError::Sequence(_))));
}

#[test]
fn frame_duration_and_args_take_effect_on_next_frame() {
    let d = Digits::animated(2, 1, 1);
    let mut it = iter(&d, -1, FrameCache::Toggle(false));
    assert_eq!(it.next().unwrap().unwrap().duration, Some(1));
    it.set_frame_duration(FrameDuration::Static(7)).unwrap();
    assert_eq!(it.next().unwrap().unwrap().duration, Some(7));
    assert!(it.set_frame_duration(FrameDuration::Static(0)).is_err());

    let args = RenderArgs::defaults(&crate::render::test_support::DIGITS).unwrap();
    it.set_render_args(&args).unwrap();
}

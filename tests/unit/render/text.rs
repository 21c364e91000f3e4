use super::*;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::layout::padding::Padding;
use crate::render::frame::Seek;
use crate::render::renderable::RenderableExt;

fn frames(args: Option<&RenderArgs>, text: &TextFrames) -> String {
    text.render(args, Padding::default()).unwrap().render_output
}

#[test]
fn parse_splits_on_separator_lines() {
    let text = TextFrames::parse("ab\n--\nc\nd", "--", Some(FrameDuration::Static(10))).unwrap();
    assert_eq!(text.len(), 2);
    assert_eq!(text.render_size(), Size::new(2, 2));
    assert_eq!(text.frame_count().unwrap(), FrameCount::Definite(2));
    assert_eq!(text.render_text().unwrap(), "ab\n  ");
}

#[test]
fn construction_is_validated() {
    let none: [&str; 0] = [];
    assert!(matches!(TextFrames::new(none, None), Err(TesseraError::Validation(_))));
    assert!(matches!(
        TextFrames::new(["a", "b"], None),
        Err(TesseraError::Validation(_))
    ));

    let single = TextFrames::new(["x"], Some(FrameDuration::Static(10))).unwrap();
    assert!(!single.animated());
    assert_eq!(single.frame_duration(), None);
}

#[test]
fn empty_text_is_one_filled_cell() {
    let text = TextFrames::new([""], None).unwrap();
    assert_eq!(text.render_size(), Size::new(1, 1));
    assert_eq!(text.render_text().unwrap(), " ");
}

#[test]
fn wide_characters_count_their_columns() {
    let text = TextFrames::new(["日本", "a"], Some(FrameDuration::Dynamic)).unwrap();
    assert_eq!(text.render_size(), Size::new(4, 1));
}

#[test]
fn fill_and_reverse_args() {
    let text = TextFrames::parse("ab\n--\nc\nd", "--", Some(FrameDuration::Static(10))).unwrap();
    let defaults = RenderArgs::defaults(&TEXT_FRAMES).unwrap();

    let dotted = defaults.update(&TEXT, [("fill", ".")]).unwrap();
    assert_eq!(frames(Some(&dotted), &text), "ab\n..");

    let reversed = defaults.update(&TEXT_FRAMES, [("reverse", true)]).unwrap();
    assert_eq!(frames(Some(&reversed), &text), "c \nd ");

    assert!(matches!(
        defaults.update(&TEXT, [("fill", "ab")]),
        Err(TesseraError::Param(_))
    ));
    assert!(matches!(
        defaults.update(&TEXT, [("fill", "＃")]),
        Err(TesseraError::Param(_))
    ));
}

#[test]
fn colored_text_keeps_its_escapes() {
    let red = "\x1b[31mab\x1b[0m";
    let text = TextFrames::new([red], None).unwrap();
    assert_eq!(text.render_size(), Size::new(2, 1));
    assert_eq!(text.render_text().unwrap(), red);

    let frames = ["x\x1bé", "\x1b[1mlonger\x1b[0m"];
    let text = TextFrames::new(frames, Some(FrameDuration::Dynamic)).unwrap();
    assert_eq!(text.render_size(), Size::new(6, 1));
    assert_eq!(text.render_text().unwrap(), "x\x1bé     ");
}

#[test]
fn rendered_block_is_kept_in_render_data() {
    let text = TextFrames::new(["hi"], None).unwrap();
    let args = RenderArgs::defaults(&TEXT_FRAMES).unwrap();
    let mut data = text.get_render_data(false).unwrap();
    text.render_frame(&mut data, &args).unwrap();
    assert_eq!(data.get::<String>("lines").unwrap(), "hi");
}

/// Reader that holds a guard so tests can see when the source is released.
struct Tracked {
    inner: Cursor<&'static str>,
    _guard: Arc<()>,
}

impl Read for Tracked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for Tracked {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

fn stream(body: &'static str, opened: Arc<AtomicUsize>, guard: Arc<()>) -> TextStream {
    TextStream::new(Size::new(3, 2), FrameDuration::Static(5), move || {
        opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Tracked {
            inner: Cursor::new(body),
            _guard: Arc::clone(&guard),
        }) as Box<dyn BufRead + Send>)
    })
    .unwrap()
}

#[test]
fn stream_reads_frames_until_the_source_ends() {
    let opened = Arc::new(AtomicUsize::new(0));
    let guard = Arc::new(());
    let text = stream("a\nb\nc\n", Arc::clone(&opened), Arc::clone(&guard));
    assert_eq!(text.frame_count().unwrap(), FrameCount::Indefinite);

    let outputs: Vec<String> = text
        .iter()
        .unwrap()
        .map(|f| f.unwrap().render_output.clone())
        .collect();
    assert_eq!(outputs, vec!["a  \nb  ", "c  \n   "]);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    // Source released; only the opener's clone remains.
    assert_eq!(Arc::strong_count(&guard), 2);
}

#[test]
fn stream_restart_reopens_the_source() {
    let opened = Arc::new(AtomicUsize::new(0));
    let text = stream("x\ny\n", Arc::clone(&opened), Arc::new(()));
    let mut it = text.iter().unwrap();
    assert_eq!(it.next().unwrap().unwrap().render_output, "x  \ny  ");

    assert_eq!(it.seek(0, Seek::Start).unwrap(), 0);
    assert_eq!(opened.load(Ordering::SeqCst), 2);
    let again = it.next().unwrap().unwrap();
    assert_eq!(again.number, 0);
    assert_eq!(again.render_output, "x  \ny  ");
    assert!(it.next().is_none());
}

#[test]
fn empty_stream_cannot_render_outside_iteration() {
    let text = stream("", Arc::new(AtomicUsize::new(0)), Arc::new(()));
    assert!(matches!(text.render_text(), Err(TesseraError::Render(_))));
}

#[test]
fn open_failures_surface_as_io_errors() {
    let text = TextStream::new(Size::new(1, 1), FrameDuration::Static(5), || {
        Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
    })
    .unwrap();
    assert!(matches!(text.render_text(), Err(TesseraError::Io(_))));
}

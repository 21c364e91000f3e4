use super::*;
use crate::terminal::buffer::BufferTerminal;

#[test]
fn raised_flag_fails_one_write_then_clears() {
    let mut term = BufferTerminal::new(Size::new(10, 5));
    let flag = InterruptFlag::new();
    {
        let mut out = Output::new(&mut term, Some(flag.clone()));
        out.write("a").unwrap();
        flag.raise();
        let err = out.write("b").unwrap_err();
        assert!(err.is_interrupted());
        assert!(!flag.is_raised());
        out.write("c").unwrap();
    }
    assert_eq!(term.text(), "ac");
}

#[test]
fn without_flag_writes_pass_through() {
    let mut term = BufferTerminal::new(Size::new(10, 5));
    {
        let mut out = Output::new(&mut term, None);
        out.write("x").unwrap();
        out.flush().unwrap();
        out.set_cursor_visible(false).unwrap();
        assert_eq!(out.size().unwrap(), Size::new(10, 5));
    }
    assert_eq!(term.text(), "x");
    assert_eq!(term.flushes, 1);
    assert!(!term.cursor_visible);
}

struct Plain(Vec<u8>);

impl Terminal for Plain {
    fn size(&self) -> io::Result<Size> {
        Ok(Size::new(1, 1))
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.0.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn default_cursor_visibility_writes_escapes() {
    let mut t = Plain(Vec::new());
    t.set_cursor_visible(false).unwrap();
    t.set_cursor_visible(true).unwrap();
    t.set_input_echo(false).unwrap();
    assert_eq!(t.0, b"\x1b[?25l\x1b[?25h");
}

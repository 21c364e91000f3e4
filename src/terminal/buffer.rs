use std::io;

use crate::foundation::geometry::Size;
use crate::terminal::Terminal;

/// In-memory terminal for tests and embedding.
#[derive(Debug)]
pub struct BufferTerminal {
    size: Size,
    /// Everything written, in order.
    pub bytes: Vec<u8>,
    pub flushes: usize,
    pub cursor_visible: bool,
    pub input_echo: bool,
    /// `set_input_echo` calls, in order.
    pub echo_changes: Vec<bool>,
}

impl BufferTerminal {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            bytes: Vec::new(),
            flushes: 0,
            cursor_visible: true,
            input_echo: true,
            echo_changes: Vec::new(),
        }
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Written bytes as text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl Terminal for BufferTerminal {
    fn size(&self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.cursor_visible = visible;
        Ok(())
    }

    fn set_input_echo(&mut self, enabled: bool) -> io::Result<()> {
        self.input_echo = enabled;
        self.echo_changes.push(enabled);
        Ok(())
    }
}

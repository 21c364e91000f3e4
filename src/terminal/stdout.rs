use std::io::{self, Stdout, Write};

use crossterm::{cursor, execute, terminal};

use crate::foundation::geometry::Size;
use crate::terminal::Terminal;

/// Process stdout, sized through crossterm.
///
/// On unix, disabling input echo clears `ECHO` on stdin's terminal attributes; the original
/// attributes come back when echo is re-enabled or the terminal is dropped.
#[derive(Debug)]
pub struct StdoutTerminal {
    out: Stdout,
    #[cfg(unix)]
    saved_echo: Option<echo::Saved>,
}

impl StdoutTerminal {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            #[cfg(unix)]
            saved_echo: None,
        }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdoutTerminal {
    fn size(&self) -> io::Result<Size> {
        let (columns, lines) = terminal::size()?;
        Ok(Size::new(u32::from(columns), u32::from(lines)))
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            execute!(self.out, cursor::Show)
        } else {
            execute!(self.out, cursor::Hide)
        }
    }

    #[cfg(unix)]
    fn set_input_echo(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            return match self.saved_echo.take() {
                Some(saved) => echo::restore(&saved),
                None => Ok(()),
            };
        }
        if self.saved_echo.is_none() {
            self.saved_echo = echo::disable()?;
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Drop for StdoutTerminal {
    fn drop(&mut self) {
        if let Some(saved) = self.saved_echo.take() {
            if let Err(err) = echo::restore(&saved) {
                tracing::warn!(%err, "restoring terminal echo failed");
            }
        }
    }
}

#[cfg(unix)]
mod echo {
    use std::fmt;
    use std::io;
    use std::os::unix::io::AsRawFd;

    /// Stdin terminal attributes from before echo was turned off.
    pub(super) struct Saved(libc::termios);

    impl fmt::Debug for Saved {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Saved")
        }
    }

    /// `None` when stdin is not a terminal (piped input, tests).
    pub(super) fn disable() -> io::Result<Option<Saved>> {
        let fd = io::stdin().as_raw_fd();
        // SAFETY: isatty only inspects the descriptor.
        if unsafe { libc::isatty(fd) } == 0 {
            return Ok(None);
        }
        // SAFETY: termios is plain data and tcgetattr fills it in on success.
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let original = termios;
        termios.c_lflag &= !libc::ECHO;
        // SAFETY: fd is a terminal and termios came from tcgetattr.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Some(Saved(original)))
    }

    pub(super) fn restore(saved: &Saved) -> io::Result<()> {
        let fd = io::stdin().as_raw_fd();
        // SAFETY: the attributes were read from this descriptor by `disable`.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &saved.0) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Whether stdin currently echoes; `None` when it is not a terminal.
    #[cfg(test)]
    pub(super) fn is_enabled() -> Option<bool> {
        let fd = io::stdin().as_raw_fd();
        // SAFETY: as in `disable`.
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::isatty(fd) } == 0 || unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
            return None;
        }
        Some(termios.c_lflag & libc::ECHO != 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/terminal/stdout.rs"]
mod tests;

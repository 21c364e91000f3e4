//! The terminal collaborator: current size and blocking byte writes.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::geometry::Size;

pub mod ansi;
pub mod buffer;
pub mod stdout;

/// Output device a renderable draws to.
pub trait Terminal {
    /// Current size in columns and lines.
    fn size(&self) -> io::Result<Size>;

    /// Write all of `bytes`, blocking until they are transmitted.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        let seq = if visible {
            ansi::SHOW_CURSOR
        } else {
            ansi::HIDE_CURSOR
        };
        self.write(seq.as_bytes())
    }

    /// Enable or disable echoing of typed input. Devices without input ignore this.
    fn set_input_echo(&mut self, _enabled: bool) -> io::Result<()> {
        Ok(())
    }
}

/// Cooperative cancellation request for an ongoing draw.
///
/// Raised from anywhere (a signal handler thread, a UI event loop); observed at the next
/// write boundary of the draw it was handed to.
#[derive(Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The underlying atomic, for handlers that set it directly (signal registration).
    pub fn shared(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }

    /// Clear the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

impl fmt::Debug for InterruptFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InterruptFlag").field(&self.is_raised()).finish()
    }
}

/// A terminal borrowed for the duration of one draw.
///
/// Every write first checks the interrupt flag; a raised flag is consumed and the write
/// fails with [`TesseraError::Interrupted`], so recovery output written afterwards goes
/// through.
pub struct Output<'a> {
    term: &'a mut dyn Terminal,
    interrupt: Option<InterruptFlag>,
}

impl<'a> Output<'a> {
    pub fn new(term: &'a mut dyn Terminal, interrupt: Option<InterruptFlag>) -> Self {
        Self { term, interrupt }
    }

    fn check_interrupt(&self) -> TesseraResult<()> {
        match &self.interrupt {
            Some(flag) if flag.take() => Err(TesseraError::Interrupted),
            _ => Ok(()),
        }
    }

    pub fn write(&mut self, s: &str) -> TesseraResult<()> {
        self.check_interrupt()?;
        self.term.write(s.as_bytes())?;
        Ok(())
    }

    pub fn flush(&mut self) -> TesseraResult<()> {
        self.term.flush()?;
        Ok(())
    }

    pub fn size(&self) -> TesseraResult<Size> {
        Ok(self.term.size()?)
    }

    pub fn set_cursor_visible(&mut self, visible: bool) -> TesseraResult<()> {
        self.term.set_cursor_visible(visible)?;
        Ok(())
    }

    pub fn set_input_echo(&mut self, enabled: bool) -> TesseraResult<()> {
        self.term.set_input_echo(enabled)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/terminal/output.rs"]
mod tests;

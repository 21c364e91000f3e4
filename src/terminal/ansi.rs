//! Cursor control sequences written by the draw and animation paths.

/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";

pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Move the cursor up by `n` lines; empty for `n == 0`.
pub fn cursor_up(n: u32) -> String {
    if n > 0 {
        format!("{CSI}{n}A")
    } else {
        String::new()
    }
}

/// Move the cursor to column `col` (1-based) of the current line.
pub fn cursor_column(col: u32) -> String {
    format!("{CSI}{}G", col.max(1))
}

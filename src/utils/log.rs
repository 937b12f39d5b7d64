//! Terminal logging with colored module prefixes and in-place progress bars.
//!
//! ```ignore
//! log!("guides"; "found {} guides", count);
//!
//! let progress = ProgressBars::new(&[("pages", pages.len()), ("assets", assets.len())]);
//! progress.inc(0);
//! progress.finish();
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stdout},
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

// ============================================================================
// Layout
// ============================================================================
//
// "[pages] [████░░░░] 42/100"
//  prefix   bar       count

/// "[" + "]" + trailing space
const PREFIX_OVERHEAD: usize = 3;
/// " []" around the bar plus the space before the count
const BAR_OVERHEAD: usize = 4;
const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;

#[inline]
const fn prefix_len(module_len: usize) -> usize {
    module_len + PREFIX_OVERHEAD
}

/// Terminal width, detected once. Falls back to 120 columns.
fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120)) as usize
}

/// Log a message with a colored module prefix.
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::utils::log::log($module, &format!($($arg)*))
    }};
}

/// Print one log line, truncated to the terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let max_len = terminal_width().saturating_sub(prefix_len(module.len()));
    let message = truncate_str(message, max_len);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "warn" => prefix.bright_magenta().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Cut `s` to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Progress Bars
// ============================================================================

/// Several progress bars, one terminal line each, updated from worker threads.
///
/// Bars are addressed by their position in the slice passed to [`ProgressBars::new`].
pub struct ProgressBars {
    bars: Vec<ProgressBar>,
    lock: Mutex<()>,
}

struct ProgressBar {
    prefix: ColoredString,
    prefix_len: usize,
    total: usize,
    current: AtomicUsize,
    row: usize,
}

impl ProgressBars {
    pub fn new(phases: &[(&'static str, usize)]) -> Self {
        let mut stdout = stdout().lock();
        for _ in phases {
            writeln!(stdout).ok();
        }
        stdout.flush().ok();

        let bars = phases
            .iter()
            .enumerate()
            .map(|(row, (name, total))| ProgressBar {
                prefix: colorize_prefix(name),
                prefix_len: prefix_len(name.len()),
                total: *total,
                current: AtomicUsize::new(0),
                row,
            })
            .collect();

        Self { bars, lock: Mutex::new(()) }
    }

    #[inline]
    pub fn inc(&self, index: usize) {
        if let Some(bar) = self.bars.get(index) {
            let current = bar.current.fetch_add(1, Ordering::Relaxed) + 1;
            self.draw(bar, current);
        }
    }

    fn draw(&self, bar: &ProgressBar, current: usize) {
        let _guard = self.lock.lock().ok();

        let count = format!("{current}/{}", bar.total);
        let overhead = bar.prefix_len + BAR_OVERHEAD + count.len();
        let bar_width = bar_width(terminal_width(), overhead);
        let filled = filled_cells(current, bar.total, bar_width);
        let cells = "█".repeat(filled) + &"░".repeat(bar_width - filled);

        let mut stdout = stdout().lock();
        let lines_up = (self.bars.len() - bar.row) as u16;
        execute!(stdout, cursor::MoveUp(lines_up), Clear(ClearType::CurrentLine)).ok();
        write!(stdout, "{} [{cells}] {count}", bar.prefix).ok();
        execute!(stdout, cursor::MoveDown(lines_up)).ok();
        write!(stdout, "\r").ok();
        stdout.flush().ok();
    }

    /// Erase the progress area.
    pub fn finish(&self) {
        let _guard = self.lock.lock().ok();
        let rows = self.bars.len() as u16;
        if rows == 0 {
            return;
        }

        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveUp(rows)).ok();
        for _ in &self.bars {
            execute!(stdout, Clear(ClearType::CurrentLine), cursor::MoveDown(1)).ok();
        }
        execute!(stdout, cursor::MoveUp(rows)).ok();
        stdout.flush().ok();
    }
}

fn bar_width(terminal: usize, overhead: usize) -> usize {
    terminal.saturating_sub(overhead).clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

fn filled_cells(current: usize, total: usize, width: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (current.min(total) * width) / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_len() {
        // "[pages] "
        assert_eq!(prefix_len(5), 8);
        assert_eq!(prefix_len(0), 3);
    }

    #[test]
    fn test_truncate_str_ascii() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_truncate_str_korean_boundary() {
        // each hangul syllable is 3 bytes
        assert_eq!(truncate_str("가이드", 4), "가");
        assert_eq!(truncate_str("가이드", 6), "가이");
        assert_eq!(truncate_str("a가b", 2), "a");
    }

    #[test]
    fn test_bar_width_is_clamped() {
        assert_eq!(bar_width(20, 15), MIN_BAR_WIDTH);
        assert_eq!(bar_width(400, 15), MAX_BAR_WIDTH);
        assert_eq!(bar_width(40, 15), 25);
    }

    #[test]
    fn test_filled_cells() {
        assert_eq!(filled_cells(0, 0, 20), 0);
        assert_eq!(filled_cells(5, 10, 20), 10);
        assert_eq!(filled_cells(10, 10, 20), 20);
        assert_eq!(filled_cells(12, 10, 20), 20);
    }
}

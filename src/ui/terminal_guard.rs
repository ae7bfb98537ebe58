//! Raw-mode terminal setup that is undone on drop, early return or panic.

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub struct TerminalGuard {
    active: AtomicBool,
}

impl TerminalGuard {
    /// Switch to raw mode and the alternate screen, returning the guard and a terminal
    pub fn enter() -> Result<(Self, Tui)> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = Self {
            active: AtomicBool::new(true),
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok((guard, terminal))
    }

    /// Best-effort restore; errors are ignored since this also runs from the panic hook
    pub fn restore() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            Self::restore();
        }
    }
}

/// Restore the terminal before the default hook prints the panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        TerminalGuard::restore();
        original_hook(panic_info);
    }));
}

//! Terminal state restoration on every exit path.

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALT_SCREEN_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Owns the raw-mode and alternate-screen transition for the render loop.
///
/// Restoration runs on drop, on explicit `restore`, and from the chained
/// panic hook; the flags make repeated restoration a no-op, so it is safe
/// for more than one of those paths to fire.
pub struct TerminalRestoreGuard;

impl TerminalRestoreGuard {
    /// Enter raw mode and the alternate screen in one step.
    ///
    /// A partial failure rolls back raw mode before returning, so an error
    /// never leaves the terminal half-configured.
    pub fn acquire(stdout: &mut impl Write) -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            RAW_MODE_ENABLED.store(false, Ordering::SeqCst);
            let _ = disable_raw_mode();
            return Err(err);
        }
        ALT_SCREEN_ENABLED.store(true, Ordering::SeqCst);
        Ok(TerminalRestoreGuard)
    }

    pub fn restore(&self) {
        restore_terminal();
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
    let mut stdout = io::stdout();
    if ALT_SCREEN_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
    let _ = execute!(stdout, Show);
    let _ = stdout.flush();
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

//! Operator interruption (Ctrl-C / SIGTERM) for the maintenance jobs.
//!
//! [`Interrupt::install`] starts a watcher thread. The first termination signal
//! raises the flag, prints `Interrupted.` and ends the process with status 1,
//! even while the main thread is blocked inside the driver. Writes already
//! applied stay applied.
//!
//! Jobs also poll the flag between records and once more after each scan, and
//! [`Interrupt::settle`] turns any outcome observed under a raised flag into
//! [`MakotoError::Interrupted`]. Detached handles (tests, library callers) rely
//! on that path alone.

use crate::core::error::MakotoError;
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::iterator::Signals;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub const INTERRUPTED_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    /// A handle no signal is wired to. It trips only through [`Interrupt::raise`].
    pub fn detached() -> Self {
        Self::default()
    }

    /// Watch the termination signals on a background thread.
    pub fn install() -> Result<Self, MakotoError> {
        let interrupt = Self::default();
        let mut signals = Signals::new(TERM_SIGNALS)?;
        let watcher = interrupt.clone();
        thread::Builder::new()
            .name("makoto-signals".to_string())
            .spawn(move || {
                if signals.forever().next().is_some() {
                    watcher.raise();
                    eprintln!("\nInterrupted.");
                    process::exit(INTERRUPTED_EXIT_CODE);
                }
            })?;
        Ok(interrupt)
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), MakotoError> {
        if self.is_raised() {
            return Err(MakotoError::Interrupted);
        }
        Ok(())
    }

    /// A run that saw the flag go up counts as interrupted, whether it
    /// finished or failed.
    pub fn settle<T>(&self, outcome: Result<T, MakotoError>) -> Result<T, MakotoError> {
        if self.is_raised() {
            return Err(MakotoError::Interrupted);
        }
        outcome
    }
}

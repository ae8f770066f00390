//! The quit signal that cancels a run.
//!
//! On Unix the trigger is `SIGQUIT`. Ctrl+C is accepted as well. Only the
//! first delivery matters: the caller cancels the run and stops listening.

use std::io;
#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

pub struct QuitSignal {
    #[cfg(unix)]
    quit: Signal,
}

impl QuitSignal {
    /// Registers the handlers. Must be called from inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the OS error if `SIGQUIT` cannot be hooked.
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            quit: signal(SignalKind::quit())?,
        })
    }

    /// Resolves with the name of the first signal delivered.
    pub async fn recv(&mut self) -> &'static str {
        #[cfg(unix)]
        let quit = async {
            self.quit.recv().await;
        };

        #[cfg(not(unix))]
        let quit = std::future::pending::<()>();

        let interrupt = async {
            // An unavailable Ctrl+C hook leaves SIGQUIT as the only trigger.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            () = quit => "SIGQUIT",
            () = interrupt => "SIGINT",
        }
    }
}

//! Trigger signal mechanisms.
//!
//! The managed process raises the signal by creating a signal file next to the handshake file,
//! after the handshake record is in place. The inspector waits for the signal file to show up,
//! reads the handshake record and consumes the signal file.
//!
//! The default signal may vary from one platform to another, only the way the inspector waits
//! for the file differs.

pub mod dummy;
#[cfg(all(feature = "inotify", target_os = "linux"))]
pub mod inotify;
#[cfg(target_os = "macos")]
pub mod kqueue;
pub mod polling;

use std::{
    fs::OpenOptions,
    future::Future,
    path::{Path, PathBuf},
};

use crate::{error::Result, internal::remove_if_exists};

// Decide which signal is the default
#[cfg(all(feature = "inotify", target_os = "linux"))]
pub use inotify::InotifySignal as DefaultSignal;
#[cfg(target_os = "macos")]
pub use kqueue::KqueueSignal as DefaultSignal;
#[cfg(not(any(all(feature = "inotify", target_os = "linux"), target_os = "macos")))]
pub use polling::PollingSignal as DefaultSignal;

/// Trigger signal abstraction.
pub trait TriggerSignal {
    /// The type of raiser returned by [raiser](`TriggerSignal::raiser`).
    type Raiser: SignalRaiser;

    /// Returns a raiser which can be raised multiple times.
    fn raiser(signal_path: PathBuf) -> Self::Raiser;

    /// Waits asynchronously for the signal to be raised, then consumes it.
    fn raised(signal_path: PathBuf) -> impl Future<Output = Result<()>>;
}

/// Signal raising abstraction, used from the managed process.
pub trait SignalRaiser {
    /// Raises the signal once, synchronously.
    fn raise(&mut self) -> Result<()>;
}

/// Raiser shared by the signals based on a signal file.
///
/// An unconsumed signal file is replaced, so that watchers of creation events see every raise.
pub struct SignalFileRaiser {
    path: PathBuf,
}

impl SignalFileRaiser {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SignalRaiser for SignalFileRaiser {
    fn raise(&mut self) -> Result<()> {
        remove_if_exists(&self.path)?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        Ok(())
    }
}

fn consume_signal_file(path: &Path) -> Result<()> {
    Ok(remove_if_exists(path)?)
}

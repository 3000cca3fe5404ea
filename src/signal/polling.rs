//! Polling signal which checks the presence of the signal file at a fixed interval.
//!
//! Works everywhere. Prefer the `inotify` signal on Linux and the `kqueue` signal on macOS.

use std::{path::PathBuf, time::Duration};

use async_io::Timer;

use crate::{
    error::Result,
    signal::{consume_signal_file, SignalFileRaiser, TriggerSignal},
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Polling signal.
pub struct PollingSignal;

impl TriggerSignal for PollingSignal {
    type Raiser = SignalFileRaiser;

    fn raiser(signal_path: PathBuf) -> Self::Raiser {
        SignalFileRaiser::new(signal_path)
    }

    async fn raised(signal_path: PathBuf) -> Result<()> {
        while !std::fs::exists(&signal_path)? {
            Timer::after(POLL_INTERVAL).await;
        }
        consume_signal_file(&signal_path)
    }
}

//! Dummy signal which is never raised outside of the process.

use std::path::PathBuf;

use crate::{
    error::Result,
    signal::{SignalRaiser, TriggerSignal},
};

/// Dummy signal.
///
/// Raising it does nothing and waiting for it resolves immediately. Useful to record call sites
/// for an inspector that polls the handshake file on its own.
pub struct DummySignal;

impl TriggerSignal for DummySignal {
    type Raiser = DummySignalRaiser;

    fn raiser(_signal_path: PathBuf) -> Self::Raiser {
        DummySignalRaiser
    }

    async fn raised(_signal_path: PathBuf) -> Result<()> {
        Ok(())
    }
}

/// Dummy signal raiser.
///
/// It does nothing.
pub struct DummySignalRaiser;

impl SignalRaiser for DummySignalRaiser {
    fn raise(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use async_io::Timer;
    use futures::{select, FutureExt};

    use super::DummySignal;
    use crate::signal::{SignalRaiser, TriggerSignal};

    #[test]
    fn test_dummy_signal() {
        let dir = tempfile::tempdir().unwrap();
        let signal_path = dir.path().join("inspector.sig");

        let mut exec = futures::executor::LocalPool::new();

        let res = exec.run_until(async {
            let job = async {
                DummySignal::raised(signal_path.clone()).await?;
                DummySignal::raiser(signal_path.clone()).raise()?;
                Ok::<_, Box<dyn std::error::Error>>(())
            };

            let timeout =
                Timer::after(Duration::from_secs(5)).then(async |_| Err("Test timeout".into()));

            select! {
                a = job.fuse() => a,
                b = timeout.fuse() => b,
            }
        });

        exec.run();

        res.unwrap();
        assert!(!signal_path.exists());
    }
}

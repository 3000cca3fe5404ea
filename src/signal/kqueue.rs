//! Kqueue signal which waits for writes to the signal file directory.

use std::{
    ops::{Deref, DerefMut},
    os::fd::{AsFd, AsRawFd, BorrowedFd},
    path::PathBuf,
};

use async_io::Async;
use kqueue::{EventFilter, FilterFlag, Watcher};

use crate::{
    error::Result,
    internal::parent_dir,
    signal::{consume_signal_file, SignalFileRaiser, TriggerSignal},
};

struct KqueueWatcherWrapper(Watcher);

impl Deref for KqueueWatcherWrapper {
    type Target = Watcher;

    fn deref(&self) -> &Watcher {
        &self.0
    }
}

impl DerefMut for KqueueWatcherWrapper {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl AsFd for KqueueWatcherWrapper {
    fn as_fd(&self) -> BorrowedFd<'_> {
        unsafe { BorrowedFd::borrow_raw(self.0.as_raw_fd()) }
    }
}

pub struct KqueueSignal;

impl TriggerSignal for KqueueSignal {
    type Raiser = SignalFileRaiser;

    fn raiser(signal_path: PathBuf) -> Self::Raiser {
        SignalFileRaiser::new(signal_path)
    }

    async fn raised(signal_path: PathBuf) -> Result<()> {
        let parent = parent_dir(&signal_path);
        let mut watcher = KqueueWatcherWrapper(Watcher::new()?);
        watcher.add_filename(parent, EventFilter::EVFILT_VNODE, FilterFlag::NOTE_WRITE)?;
        watcher.watch()?;
        let async_kqueue = Async::new_nonblocking(watcher)?;
        loop {
            if std::fs::exists(&signal_path)? {
                return consume_signal_file(&signal_path);
            }
            async_kqueue
                .read_with(|inner| match inner.poll(None) {
                    Some(_) => Ok(()),
                    None => Err(std::io::ErrorKind::WouldBlock.into()),
                })
                .await?;
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{path::Path, time::Duration};

    use async_io::Timer;

    use super::KqueueSignal;
    use crate::{internal::AutoDropFile, signal::tests::test_signal};

    #[test]
    fn test_kqueue_signal() {
        test_signal::<KqueueSignal, _, _>(|dir: &Path| {
            let wrong_signal_path = dir.join("inspector.sig_wrong");
            async move {
                let _file = AutoDropFile::create(wrong_signal_path);
                // Wait to make sure kqueue sees the file
                Timer::after(Duration::from_millis(200)).await;
            }
        });
    }
}

//! Inotify signal which waits for the creation of the signal file in its directory.

use std::path::PathBuf;

use async_io::Async;
use inotify::{Inotify, WatchMask};

use crate::{
    error::{Error, Result},
    internal::parent_dir,
    signal::{consume_signal_file, SignalFileRaiser, TriggerSignal},
};

pub struct InotifySignal;

impl TriggerSignal for InotifySignal {
    type Raiser = SignalFileRaiser;

    fn raiser(signal_path: PathBuf) -> Self::Raiser {
        SignalFileRaiser::new(signal_path)
    }

    async fn raised(signal_path: PathBuf) -> Result<()> {
        let parent = parent_dir(&signal_path);
        let file_name = signal_path.file_name().ok_or_else(|| {
            Error::Watch(format!("{} has no file name", signal_path.display()))
        })?;
        let inotify = Inotify::init()?;
        inotify.watches().add(parent, WatchMask::CREATE)?;
        let mut async_inotify = Async::new(inotify)?;
        let mut buffer = [0u8; 1024];
        // Detect creation before listening to inotify
        if !std::fs::exists(&signal_path)? {
            loop {
                let read = |inner: &mut Inotify| {
                    let events = inner.read_events(&mut buffer)?;
                    for event in events {
                        if let Some(name) = event.name {
                            if name == file_name {
                                return Ok(true);
                            }
                        }
                    }
                    Ok(false)
                };
                if unsafe { async_inotify.read_with_mut(read) }.await? {
                    break;
                };
            }
        }
        consume_signal_file(&signal_path)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{path::Path, time::Duration};

    use async_io::Timer;

    use super::InotifySignal;
    use crate::{internal::AutoDropFile, signal::tests::test_signal};

    #[test]
    fn test_inotify_signal() {
        test_signal::<InotifySignal, _, _>(|dir: &Path| {
            let wrong_signal_path = dir.join("inspector.sig_wrong");
            async move {
                let _file = AutoDropFile::create(wrong_signal_path);
                // Wait to make sure inotify sees the file
                Timer::after(Duration::from_millis(200)).await;
            }
        });
    }
}

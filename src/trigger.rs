//! Trigger entry point: scan the launch arguments, record the call site, raise the signal.
//!
//! Nothing in here reports a failure to the caller. A missing inspector, an unwritable handshake
//! file or a failing signal are logged and the call returns normally.

use std::{
    ffi::OsString,
    marker::PhantomData,
    panic::{self, AssertUnwindSafe, Location},
    path::{Path, PathBuf},
};

use tracing::{debug, error, warn};

use crate::{
    config::TriggerConfig,
    error::Result,
    handshake::{remove_call_site, write_call_site},
    launch::{current_handshake_path, handshake_path},
    signal::{DefaultSignal, SignalRaiser, TriggerSignal},
};

/// What a trigger did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// No inspector argument, nothing was written nor raised.
    Detached,
    /// The signal was raised for the given handshake file.
    Fired {
        handshake: PathBuf,
        /// Whether the call site made it to the handshake file.
        recorded: bool,
    },
}

/// Configurable trigger.
///
/// The launch arguments are read again on every call unless fixed with
/// [`with_args`](Trigger::with_args).
pub struct Trigger<S = DefaultSignal> {
    config: TriggerConfig,
    args: Option<Vec<OsString>>,
    _signal: PhantomData<fn() -> S>,
}

impl Trigger {
    /// Creates a trigger raising the default signal.
    pub fn new(config: TriggerConfig) -> Self {
        Self::with_signal(config)
    }
}

impl<S: TriggerSignal> Trigger<S> {
    /// Creates a trigger raising the signal `S`.
    pub fn with_signal(config: TriggerConfig) -> Self {
        Self {
            config,
            args: None,
            _signal: PhantomData,
        }
    }

    /// Scans `args` instead of the process launch arguments.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Triggers with the line of the caller as call site.
    #[track_caller]
    pub fn fire(&self) -> TriggerOutcome {
        self.fire_at(Location::caller().line())
    }

    /// Triggers with an explicit call site.
    pub fn fire_at(&self, line: u32) -> TriggerOutcome {
        let handshake = match &self.args {
            Some(args) => handshake_path(args, &self.config),
            None => current_handshake_path(&self.config),
        };
        let Some(handshake) = handshake else {
            return TriggerOutcome::Detached;
        };

        let recorded = record(&handshake, line, write_call_site);

        raise::<S>(self.config.signal_path(&handshake));

        TriggerOutcome::Fired {
            handshake,
            recorded,
        }
    }
}

/// Writes the call site with `write`, leaving no stale record behind on failure.
fn record<W>(handshake: &Path, line: u32, write: W) -> bool
where
    W: FnOnce(&Path, u32) -> Result<()>,
{
    match write(handshake, line) {
        Ok(()) => true,
        Err(err) => {
            warn!(path = %handshake.display(), line, "unable to record call site: {err}");
            if let Err(err) = remove_call_site(handshake) {
                warn!(path = %handshake.display(), "unable to remove stale call site: {err}");
            }
            false
        }
    }
}

fn raise<S: TriggerSignal>(signal_path: PathBuf) {
    let path = signal_path.clone();
    match panic::catch_unwind(AssertUnwindSafe(move || S::raiser(signal_path).raise())) {
        Ok(Ok(())) => debug!(path = %path.display(), "trigger signal raised"),
        Ok(Err(err)) => warn!(path = %path.display(), "unable to raise trigger signal: {err}"),
        Err(_) => error!(path = %path.display(), "panic while raising trigger signal"),
    }
}

/// Asks the attached inspector, if any, to take a snapshot now.
///
/// The line of the caller is recorded as call site. Returns normally whatever happens.
#[track_caller]
pub fn visualize() {
    let line = Location::caller().line();
    Trigger::new(TriggerConfig::default()).fire_at(line);
}

//! Launch argument scanning.
//!
//! The inspector announces itself through a startup argument shaped like
//! `-agentpath:<path-to-module>[=<options>]`. The handshake file lives next to the module, with
//! the module extension replaced by the data extension.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use tracing::{trace, warn};

use crate::config::TriggerConfig;

/// Options may follow the module path, as in `-agentpath:/lib/agent.so=verbose`.
const OPTIONS_SEPARATOR: char = '=';

/// Finds the handshake path announced by the first marker argument.
///
/// Returns `None` when no argument carries the marker, which simply means no inspector is
/// attached, and also when the first marker argument is malformed. Arguments after the first
/// marker argument are never looked at.
pub fn handshake_path<I, S>(args: I, config: &TriggerConfig) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let argument = args.into_iter().find_map(|arg| {
        arg.as_ref()
            .to_str()
            .filter(|arg| arg.starts_with(config.marker.as_str()))
            .map(str::to_owned)
    });

    match argument {
        Some(argument) => derive_handshake_path(&argument, config),
        None => {
            trace!("no inspector attached");
            None
        }
    }
}

/// Same as [`handshake_path`] with the live arguments of the current process.
pub fn current_handshake_path(config: &TriggerConfig) -> Option<PathBuf> {
    handshake_path(std::env::args_os(), config)
}

fn derive_handshake_path(argument: &str, config: &TriggerConfig) -> Option<PathBuf> {
    let Some((_, module)) = argument.split_once(config.delimiter) else {
        warn!(argument, "inspector argument has no module path");
        return None;
    };

    let module = if config.delimiter == OPTIONS_SEPARATOR {
        module
    } else {
        module
            .split_once(OPTIONS_SEPARATOR)
            .map_or(module, |(path, _options)| path)
    };

    if module.is_empty() {
        warn!(argument, "inspector argument has an empty module path");
        return None;
    }

    let module = Path::new(module);
    match module.extension().and_then(OsStr::to_str) {
        Some(extension) if config.is_module_extension(extension) => {
            Some(module.with_extension(&config.data_extension))
        }
        _ => {
            warn!(argument, "inspector module has an unknown extension");
            None
        }
    }
}

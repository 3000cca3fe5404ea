//! Handshake file holding the call site of the latest trigger.
//!
//! The record is a single decimal line. It is written to a temporary file in the same directory
//! and renamed over the handshake path, so the inspector never reads a truncated record.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    error::{Error, Result},
    internal::{parent_dir, remove_if_exists},
};

/// Replaces the handshake record at `path` with `line`.
///
/// An existing record keeps its permissions, and a symbolic link is followed so the file it
/// points to is replaced rather than the link itself.
pub fn write_call_site(path: &Path, line: u32) -> Result<()> {
    let target = match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => target,
            // Dangling link, the record it points to is created
            Err(err) if err.kind() == ErrorKind::NotFound => {
                parent_dir(path).join(fs::read_link(path)?)
            }
            Err(err) => return Err(err.into()),
        },
        _ => path.to_path_buf(),
    };
    let permissions = match fs::metadata(&target) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => return Err(err.into()),
    };

    let mut file = NamedTempFile::new_in(parent_dir(&target))?;
    match permissions {
        Some(permissions) => file.as_file().set_permissions(permissions)?,
        None => set_default_permissions(file.as_file())?,
    }
    writeln!(file, "{line}")?;
    file.flush()?;
    file.persist(&target).map_err(|err| Error::Io(err.error))?;
    debug!(path = %target.display(), line, "handshake record written");
    Ok(())
}

/// New records are readable by an inspector running as another user.
#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Removes the handshake record, if any.
///
/// Used after a failed write so that the inspector finds no record rather than the call site of
/// an older trigger.
pub fn remove_call_site(path: &Path) -> Result<()> {
    Ok(remove_if_exists(path)?)
}

/// Reads the handshake record at `path`.
///
/// Returns `None` if there is no record.
pub fn read_call_site(path: &Path) -> Result<Option<u32>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let line = contents
        .strip_suffix('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .unwrap_or(&contents);
    line.parse()
        .map(Some)
        .map_err(|_| Error::MalformedRecord(contents.clone()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use assert_matches::assert_matches;

    use super::{read_call_site, remove_call_site, write_call_site};
    use crate::error::Error;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspector.dat");

        write_call_site(&path, 42).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "42\n");
        assert_eq!(read_call_site(&path).unwrap(), Some(42));
    }

    #[test]
    fn test_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspector.dat");
        std::fs::write(&path, "a much longer previous content\nwith two lines\n").unwrap();

        for line in [7, 123456, 3] {
            write_call_site(&path, line).unwrap();
            let contents = std::fs::read_to_string(&path).unwrap();
            assert_eq!(contents, format!("{line}\n"));
            assert_eq!(contents.lines().count(), 1);
        }

        // No temporary file left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let mode = |path: &std::path::Path| {
            std::fs::metadata(path).unwrap().permissions().mode() & 0o777
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspector.dat");

        write_call_site(&path, 1).unwrap();
        assert_eq!(mode(&path), 0o644);

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o664)).unwrap();
        write_call_site(&path, 42).unwrap();
        assert_eq!(mode(&path), 0o664);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "42\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_followed() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared.dat");
        let path = dir.path().join("inspector.dat");
        std::fs::write(&shared, "1\n").unwrap();
        std::os::unix::fs::symlink(&shared, &path).unwrap();

        write_call_site(&path, 42).unwrap();

        assert!(std::fs::symlink_metadata(&path)
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(std::fs::read_to_string(&shared).unwrap(), "42\n");
        assert_eq!(read_call_site(&path).unwrap(), Some(42));

        std::fs::remove_file(&shared).unwrap();
        write_call_site(&path, 43).unwrap();
        assert!(std::fs::symlink_metadata(&path)
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(std::fs::read_to_string(&shared).unwrap(), "43\n");
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("inspector.dat");

        assert_matches!(write_call_site(&path, 1), Err(Error::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_absent_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspector.dat");

        assert_matches!(read_call_site(&path), Ok(None));

        std::fs::write(&path, "12\r\n").unwrap();
        assert_matches!(read_call_site(&path), Ok(Some(12)));

        std::fs::write(&path, "1\n2\n").unwrap();
        assert_matches!(read_call_site(&path), Err(Error::MalformedRecord(_)));

        std::fs::write(&path, "").unwrap();
        assert_matches!(read_call_site(&path), Err(Error::MalformedRecord(_)));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspector.dat");

        remove_call_site(&path).unwrap();
        write_call_site(&path, 5).unwrap();
        remove_call_site(&path).unwrap();
        assert!(!path.exists());
    }
}

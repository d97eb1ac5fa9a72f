use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use snafu::ResultExt;
use tempfile::NamedTempFile;
use tracing::*;

use crate::error::{IoWriteSnafu, ReadorderError};

/// Writes `path` through a temporary sibling file that is renamed over the
/// destination once `write` succeeds.
///
/// A failing writer leaves the destination untouched and the temporary file
/// is removed.
pub fn write_atomic<P, F>(path: P, write: F) -> Result<(), ReadorderError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), ReadorderError>,
{
    let path = path.as_ref();
    let path_str = path.to_string_lossy();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).context(IoWriteSnafu {
        path: dir.to_string_lossy(),
    })?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush().context(IoWriteSnafu {
            path: path_str.clone(),
        })?;
    }

    temp.persist(path)
        .map_err(|err| err.error)
        .context(IoWriteSnafu { path: path_str })?;

    debug!("Wrote {:?}", path);
    Ok(())
}

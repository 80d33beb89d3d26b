//! Whole-file helpers over a [`FileSystem`]. Every handle is dropped, and
//! so released, before these return, including on error.

use crate::vfs::FileSystem;
use std::io::{self, Read, Write};
use std::path::Path;

/// Read the full contents of `path`.
pub(crate) fn read_file<F: FileSystem>(fs: &F, path: &Path) -> io::Result<Vec<u8>> {
    let mut file = fs.open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Replace the contents of `path`, then flush. The parent directory must
/// already exist.
pub(crate) fn write_file<F: FileSystem>(fs: &F, path: &Path, contents: &[u8]) -> io::Result<()> {
    let file = fs.create(path)?;
    finish(file, contents)
}

/// Like [`write_file`], but creates missing parent directories and retries
/// once if the first open reports `NotFound`.
pub(crate) fn write_file_with_parents<F: FileSystem>(
    fs: &F,
    path: &Path,
    contents: &[u8],
) -> io::Result<()> {
    let file = match fs.create(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs.create_dir_all(parent)?;
            }
            fs.create(path)?
        }
        Err(e) => return Err(e),
    };
    finish(file, contents)
}

fn finish<W: Write>(mut file: W, contents: &[u8]) -> io::Result<()> {
    file.write_all(contents)?;
    file.flush()
}

//! Filesystem seam the store persists through.
//!
//! Paths handed to a [`FileSystem`] are relative, `/`-separated, and resolved
//! against whatever root the implementation was built with.

use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Minimal hierarchical byte store.
///
/// Handles are released when dropped. A writer's [`Write::flush`] is its
/// durability point: once it returns `Ok`, the bytes written so far must
/// survive a crash as far as the backing store can promise.
pub trait FileSystem: Send + Sync {
    type Reader: Read;
    type Writer: Write;

    /// Open an existing file for reading. Fails with
    /// [`io::ErrorKind::NotFound`] if it does not exist.
    fn open(&self, path: &Path) -> io::Result<Self::Reader>;

    /// Open a file for writing, truncating or creating it. Fails with
    /// [`io::ErrorKind::NotFound`] if the parent directory does not exist.
    fn create(&self, path: &Path) -> io::Result<Self::Writer>;

    /// Create a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// A [`FileSystem`] backed by a directory on local disk.
#[derive(Debug)]
pub struct DiskFs {
    root: PathBuf,
    lock: Option<File>,
}

impl DiskFs {
    /// Use `root` as the base directory. It is created on first write if
    /// missing.
    pub fn new(root: impl AsRef<Path>) -> Self {
        DiskFs {
            root: root.as_ref().to_path_buf(),
            lock: None,
        }
    }

    /// Like [`DiskFs::new`], but also take an exclusive advisory lock on
    /// `root/.lock` for as long as the returned value lives.
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] if another handle, in this
    /// process or another, holds the lock.
    pub fn locked(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let lock_path = root.join(".lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock.try_lock_exclusive().map_err(|e| {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!(
                        "another writer holds the lock on {}",
                        lock_path.display()
                    ),
                )
            } else {
                e
            }
        })?;

        Ok(DiskFs {
            root,
            lock: Some(lock),
        })
    }

    /// Returns the base directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether this handle holds the directory lock.
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.root.join(normalize(path)?))
    }
}

impl Drop for DiskFs {
    fn drop(&mut self) {
        if let Some(lock) = &self.lock {
            let _ = FileExt::unlock(lock);
        }
    }
}

/// Buffered file whose `flush` also syncs data to disk.
#[derive(Debug)]
pub struct DiskFile {
    inner: BufWriter<File>,
}

impl Write for DiskFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()?;
        self.inner.get_ref().sync_data()
    }
}

impl FileSystem for DiskFs {
    type Reader = BufReader<File>;
    type Writer = DiskFile;

    fn open(&self, path: &Path) -> io::Result<Self::Reader> {
        Ok(BufReader::new(File::open(self.resolve(path)?)?))
    }

    fn create(&self, path: &Path) -> io::Result<Self::Writer> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.resolve(path)?)?;
        Ok(DiskFile {
            inner: BufWriter::new(file),
        })
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path)?)
    }
}

#[derive(Debug)]
enum Node {
    Dir,
    File(Arc<Mutex<Vec<u8>>>),
}

/// In-memory [`FileSystem`].
///
/// Clones share the same contents, so a test can keep one handle for
/// inspection while a store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    nodes: Arc<Mutex<HashMap<PathBuf, Node>>>,
}

impl MemFs {
    pub fn new() -> Self {
        MemFs::default()
    }

    /// Current contents of a file, or `None` if it does not exist or is a
    /// directory.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = normalize(path.as_ref()).ok()?;
        match self.nodes.lock().get(&path)? {
            Node::File(data) => Some(data.lock().clone()),
            Node::Dir => None,
        }
    }

    /// Overwrite a file, creating parent directories as needed.
    pub fn write(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> io::Result<()> {
        let path = normalize(path.as_ref())?;
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        let mut file = self.create(&path)?;
        file.write_all(&contents.into())
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        match normalize(path.as_ref()) {
            Ok(path) => path.as_os_str().is_empty() || self.nodes.lock().contains_key(&path),
            Err(_) => false,
        }
    }
}

/// Write handle into a [`MemFs`] file. Bytes land immediately.
#[derive(Debug)]
pub struct MemFile {
    data: Arc<Mutex<Vec<u8>>>,
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MemFs {
    type Reader = Cursor<Vec<u8>>;
    type Writer = MemFile;

    fn open(&self, path: &Path) -> io::Result<Self::Reader> {
        let path = normalize(path)?;
        match self.nodes.lock().get(&path) {
            Some(Node::File(data)) => Ok(Cursor::new(data.lock().clone())),
            Some(Node::Dir) => Err(is_a_directory(&path)),
            None => Err(not_found(&path)),
        }
    }

    fn create(&self, path: &Path) -> io::Result<Self::Writer> {
        let path = normalize(path)?;
        let mut nodes = self.nodes.lock();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            match nodes.get(parent) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => return Err(not_a_directory(parent)),
                None => return Err(not_found(parent)),
            }
        }
        let data = match nodes.get(&path) {
            Some(Node::File(data)) => {
                data.lock().clear();
                Arc::clone(data)
            }
            Some(Node::Dir) => return Err(is_a_directory(&path)),
            None => {
                let data = Arc::new(Mutex::new(Vec::new()));
                nodes.insert(path, Node::File(Arc::clone(&data)));
                data
            }
        };
        Ok(MemFile { data })
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path)?;
        let mut nodes = self.nodes.lock();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            match nodes.get(&current) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => return Err(not_a_directory(&current)),
                None => {
                    nodes.insert(current.clone(), Node::Dir);
                }
            }
        }
        Ok(())
    }
}

/// Reduce `path` to plain relative components, rejecting anything that
/// could escape the root.
fn normalize(path: &Path) -> io::Result<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path escapes filesystem root: {}", path.display()),
                ));
            }
        }
    }
    Ok(out)
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::other(format!("not a directory: {}", path.display()))
}

fn is_a_directory(path: &Path) -> io::Error {
    io::Error::other(format!("is a directory: {}", path.display()))
}

// --- Task file persistence helpers ---

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile; // For atomic writes
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    model::{Partition, TaskList},
    taskline::{parse_tasks, serialize_tasks},
};

/// Default list name.
pub const DEFAULT_LIST: &str = "tasks";

/// Done first: if the second write fails, a just-finished task is left in
/// both files rather than in neither.
const WRITE_ORDER: [Partition; 2] = [Partition::Done, Partition::Active];

/// Where one list lives: `<dir>/<name>` for unfinished tasks and
/// `<dir>/.<name>.done` for finished ones.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
    name: String,
    delete_if_empty: bool,
    track_updates: bool,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            delete_if_empty: false,
            track_updates: false,
        }
    }

    /// Remove a partition's file instead of writing it empty.
    pub fn delete_if_empty(mut self, enabled: bool) -> Self {
        self.delete_if_empty = enabled;
        self
    }

    /// Lists loaded from this store stamp `updated` metadata on changes.
    pub fn track_updates(mut self, enabled: bool) -> Self {
        self.track_updates = enabled;
        self
    }

    pub fn path(&self, partition: Partition) -> PathBuf {
        match partition {
            Partition::Active => self.dir.join(&self.name),
            Partition::Done => self.dir.join(format!(".{}.done", self.name)),
        }
    }

    /// Fails if either task file path is taken by a directory.
    pub fn check(&self) -> Result<()> {
        for partition in [Partition::Active, Partition::Done] {
            let path = self.path(partition);
            if path.is_dir() {
                return Err(Error::InvalidStorageLocation(path));
            }
        }
        Ok(())
    }

    /// Read both task files. Missing files are empty partitions.
    pub fn load(&self) -> Result<TaskList> {
        self.check()?;
        let mut list = TaskList::new().with_update_tracking(self.track_updates);

        for partition in [Partition::Active, Partition::Done] {
            let path = self.path(partition);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            let tasks = parse_tasks(&content);
            debug!(path = %path.display(), count = tasks.len(), "loaded task file");
            for task in tasks {
                let id = task.id.clone();
                if partition == Partition::Done
                    && list.tasks(Partition::Active).contains_key(&id)
                {
                    warn!(%id, path = %path.display(), "task is in both files, keeping it as finished");
                }
                if list.insert(partition, task).is_some() {
                    warn!(%id, path = %path.display(), "duplicate task id, keeping the later line");
                }
            }
        }

        Ok(list)
    }

    /// Write both partitions back. Nothing is written unless both paths are
    /// usable.
    pub fn save(&self, list: &TaskList) -> Result<()> {
        self.check()?;

        for partition in WRITE_ORDER {
            let path = self.path(partition);
            let tasks = list.tasks(partition);

            if tasks.is_empty() && self.delete_if_empty {
                match fs::remove_file(&path) {
                    Ok(()) => debug!(path = %path.display(), "removed empty task file"),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                continue;
            }

            atomic_write(&path, &serialize_tasks(tasks.values()))?;
            debug!(path = %path.display(), count = tasks.len(), "wrote task file");
        }

        Ok(())
    }
}

/// Atomically replace `path` with `contents`: the previous file is only
/// replaced once the new one is fully on disk.
pub fn atomic_write(path: impl AsRef<Path>, contents: &str) -> io::Result<()> {
    let path = path.as_ref();

    // Write into a temp file in the *same* directory.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;

    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;

    // atomic rename on POSIX, safe fallback on Windows
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

use std::collections::BTreeMap;

use sha1::{Digest, Sha1};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::prefix;

/// Metadata key stamped with unix seconds when update tracking is enabled.
pub const UPDATED_KEY: &str = "updated";

/// Derive a task id from its text: the hex SHA-1 digest.
///
/// Only called when a task is born. Edits never recompute it.
pub fn hash(text: &str) -> String {
    let digest = Sha1::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// --- Task Object ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /** Immutable name chosen at creation (not a checksum of `text`) */
    pub id: String,

    /** Summary line shown in listings */
    pub text: String,

    /** Extra key/value pairs carried through edits; never holds `id` or `text` */
    pub metadata: BTreeMap<String, String>,
}

impl Task {
    /// A freshly authored task, named after its text.
    pub fn new<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        Self {
            id: hash(&text),
            text,
            metadata: BTreeMap::new(),
        }
    }

    /// Unix seconds of the last recorded update, if any.
    pub fn updated_at(&self) -> Option<i64> {
        self.metadata.get(UPDATED_KEY)?.parse().ok()
    }

    fn touch(&mut self) {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.metadata.insert(UPDATED_KEY.to_string(), now.to_string());
    }
}

/// Which half of a list an operation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
    #[default]
    Active,
    Done,
}

// -- Top level container ---
/// Unfinished and finished tasks of one list, each keyed by id.
///
/// A task id lives in exactly one of the two maps.
#[derive(Debug, Default, Clone)]
pub struct TaskList {
    active: BTreeMap<String, Task>,
    done: BTreeMap<String, Task>,
    track_updates: bool,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `updated` metadata on add, edit and finish.
    pub fn with_update_tracking(mut self, enabled: bool) -> Self {
        self.track_updates = enabled;
        self
    }

    pub fn tasks(&self, partition: Partition) -> &BTreeMap<String, Task> {
        match partition {
            Partition::Active => &self.active,
            Partition::Done => &self.done,
        }
    }

    /// Put an already-identified task into a partition, e.g. when loading.
    /// Returns the task it displaced, if any.
    pub fn insert(&mut self, partition: Partition, task: Task) -> Option<Task> {
        let (target, other) = match partition {
            Partition::Active => (&mut self.active, &mut self.done),
            Partition::Done => (&mut self.done, &mut self.active),
        };
        other.remove(&task.id);
        target.insert(task.id.clone(), task)
    }

    /// Add a new, unfinished task and return its id.
    pub fn add(&mut self, text: &str) -> Result<String> {
        check_text(text)?;
        let mut task = Task::new(text);
        if self.track_updates {
            task.touch();
        }
        let id = task.id.clone();
        debug!(%id, "adding task");
        self.insert(Partition::Active, task);
        Ok(id)
    }

    /// Resolve a reference against the unfinished tasks.
    pub fn resolve(&self, reference: &str) -> Result<String> {
        prefix::resolve(reference, self.active.keys().map(String::as_str)).map(str::to_string)
    }

    /// Replace the text of an unfinished task, keeping its id and metadata.
    ///
    /// Text starting with `s/` or `/` is a substitution applied to the current
    /// text instead; see [`substitute`].
    pub fn edit(&mut self, reference: &str, text: &str) -> Result<String> {
        let id = self.resolve(reference)?;
        let track_updates = self.track_updates;
        let Some(task) = self.active.get_mut(&id) else {
            return Err(Error::UnknownReference(reference.to_string()));
        };

        let new_text = if text.starts_with("s/") || text.starts_with('/') {
            substitute(&task.text, text)?
        } else {
            text.to_string()
        };
        check_text(&new_text)?;

        task.text = new_text;
        if track_updates {
            task.touch();
        }
        Ok(id)
    }

    /// Move an unfinished task, whole, to the finished tasks.
    pub fn finish(&mut self, reference: &str) -> Result<String> {
        let id = self.resolve(reference)?;
        let Some(mut task) = self.active.remove(&id) else {
            return Err(Error::UnknownReference(reference.to_string()));
        };
        if self.track_updates {
            task.touch();
        }
        self.done.insert(id.clone(), task);
        Ok(id)
    }

    /// Delete an unfinished task for good.
    pub fn remove(&mut self, reference: &str) -> Result<Task> {
        let id = self.resolve(reference)?;
        self.active
            .remove(&id)
            .ok_or_else(|| Error::UnknownReference(reference.to_string()))
    }
}

/// Text must survive a taskline round trip: a leading `#` would read back as
/// a comment and a line break would split the task in two.
fn check_text(text: &str) -> Result<()> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyText);
    }
    if trimmed.starts_with('#') || text.contains(['\n', '\r']) {
        return Err(Error::UnstorableText(text.to_string()));
    }
    Ok(())
}

/// Apply a `s/<find>/<replace>` (or `/<find>/<replace>`) expression to `text`.
///
/// Only the first occurrence of `<find>` is replaced, as sed does without `g`.
/// One trailing `/` after `<replace>` is accepted and dropped.
pub fn substitute(text: &str, expr: &str) -> Result<String> {
    let body = expr
        .strip_prefix("s/")
        .or_else(|| expr.strip_prefix('/'))
        .unwrap_or(expr)
        .trim();

    let Some((find, replace)) = body.split_once('/') else {
        return Err(Error::InvalidSubstitution(expr.to_string()));
    };
    if find.is_empty() {
        return Err(Error::InvalidSubstitution(expr.to_string()));
    }
    let replace = replace.strip_suffix('/').unwrap_or(replace);

    Ok(text.replacen(find, replace, 1))
}

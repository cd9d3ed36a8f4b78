//! Tasklines: the on-disk form of a task.
//!
//! ```text
//! summary text ... | id:<hex id>, key:value, ...
//! ```
//!
//! A line holding only summary text is a task typed in by hand; it gets its id
//! from the text when read. Lines starting with `#` are comments.

use std::collections::BTreeMap;

use tracing::warn;

use crate::model::{Task, hash};

/// Parse one line. Returns `None` for blank lines and comments.
pub fn parse_taskline(line: &str) -> Option<Task> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let Some((text, meta)) = line.rsplit_once('|') else {
        return Some(Task::new(line));
    };

    let text = text.trim().to_string();
    let mut metadata = parse_metadata(meta);
    let id = match metadata.remove("id").filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            let id = hash(&text);
            warn!(%id, "taskline has no id, deriving one from its text");
            id
        }
    };

    Some(Task { id, text, metadata })
}

/// `key:value` pairs separated by commas. A segment without a colon becomes a
/// key with an empty value.
fn parse_metadata(meta: &str) -> BTreeMap<String, String> {
    meta.split(',')
        .filter_map(|piece| {
            let (key, value) = piece.split_once(':').unwrap_or((piece, ""));
            let key = key.trim();
            (!key.is_empty() && key != "text").then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parse the contents of a task file.
pub fn parse_tasks(content: &str) -> Vec<Task> {
    content.lines().filter_map(parse_taskline).collect()
}

/// Serialize one task. The id always comes first, other keys follow in
/// key order.
pub fn serialize_taskline(task: &Task) -> String {
    let mut line = format!("{} | id:{}", task.text, task.id);
    for (key, value) in &task.metadata {
        line.push_str(&format!(", {key}:{value}"));
    }
    line
}

/// Serialize tasks to file contents, one line each, newline terminated.
pub fn serialize_tasks<'a, I>(tasks: I) -> String
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .map(|task| serialize_taskline(task) + "\n")
        .collect()
}

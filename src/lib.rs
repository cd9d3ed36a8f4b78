pub mod config;
pub mod error;
pub mod listing;
pub mod model;
pub mod prefix;
pub mod storage;
pub mod taskline;

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

pub use crate::{
    error::Error,
    listing::{LabelMode, ListOptions, Listing, SortKey},
    model::{Partition, Task, TaskList},
    storage::Store,
};

/// Add a new task and return its id.
pub fn add_task(store: &Store, text: &str) -> Result<String> {
    // Read current state of both task files.
    let mut list = store.load()?;

    // Mutate in memory.
    let id = list.add(text)?;

    store.save(&list).context("Writing tasks to disk")?;
    info!(%id, "added task");
    Ok(id)
}

/// Replace (or `s/find/replace`) the text of the task `reference` points at.
pub fn edit_task(store: &Store, reference: &str, text: &str) -> Result<String> {
    let mut list = store.load()?;
    let id = list.edit(reference, text)?;

    store.save(&list).context("Writing updated task list")?;
    info!(%id, "edited task");
    Ok(id)
}

/// Mark task as done.
pub fn finish_task(store: &Store, reference: &str) -> Result<String> {
    let mut list = store.load()?;
    let id = list.finish(reference)?;

    store.save(&list).context("Writing updated task list")?;
    info!(%id, "finished task");
    Ok(id)
}

/// Remove a task (returns error if the reference matches none or several).
pub fn remove_task(store: &Store, reference: &str) -> Result<String> {
    let mut list = store.load()?;
    let task = list.remove(reference)?;

    store.save(&list).context("Persisting after remove")?;
    info!(id = %task.id, "removed task");
    Ok(task.id)
}

/// List tasks of one partition, filtered and labelled per `options`.
pub fn list_tasks<W: Write>(store: &Store, options: &ListOptions, out: &mut W) -> Result<()> {
    let list = store.load()?;

    Listing::new(&list, options)
        .render(out)
        .context("Printing task list")
}

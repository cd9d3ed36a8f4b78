use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, ValueHint};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use t::config::Config;
use t::error::exit_codes;
use t::{LabelMode, ListOptions, Partition, Store};

/// t is for people that want to do things, not organize their tasks.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("action").args(["edit", "finish", "remove"])))]
struct Cli {
    /// Edit TASK to contain TEXT (`s/find/replace` edits the current text)
    #[arg(short, long, value_name = "TASK")]
    edit: Option<String>,

    /// Mark TASK as finished
    #[arg(short, long, value_name = "TASK")]
    finish: Option<String>,

    /// Remove TASK from list
    #[arg(short, long, value_name = "TASK")]
    remove: Option<String>,

    /// Work on LIST
    #[arg(short, long, value_name = "LIST")]
    list: Option<String>,

    /// Work on the lists in DIR
    #[arg(
        short = 't',
        long = "task-dir",
        value_name = "DIR",
        env = "T_TASK_DIR",
        value_hint = ValueHint::DirPath
    )]
    task_dir: Option<PathBuf>,

    /// Delete the task file if it becomes empty
    #[arg(short, long)]
    delete_if_empty: bool,

    /// Print only tasks that contain WORD
    #[arg(short, long, value_name = "WORD")]
    grep: Option<String>,

    /// Print more detailed output (full task ids, etc)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Print less detailed output (no task ids, etc)
    #[arg(short, long)]
    quiet: bool,

    /// List done tasks instead of unfinished ones
    #[arg(long)]
    done: bool,

    /// Task text
    #[arg(value_name = "TEXT", trailing_var_arg = true, allow_hyphen_values = true)]
    text: Vec<String>,
}

/// Selector values given as empty strings count as not given.
fn selector(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let dir = cli.task_dir.clone().unwrap_or_else(|| config.task_dir());
    let name = cli.list.clone().unwrap_or_else(|| config.list().to_string());

    let store = Store::new(dir, name)
        .delete_if_empty(cli.delete_if_empty || config.delete_if_empty)
        .track_updates(config.track_updates);
    // Fail before touching anything if a task file path is a directory.
    store.check()?;

    let text = cli.text.join(" ").trim().to_string();

    if let Some(reference) = selector(&cli.finish) {
        t::finish_task(&store, reference)?;
    } else if let Some(reference) = selector(&cli.remove) {
        t::remove_task(&store, reference)?;
    } else if let Some(reference) = selector(&cli.edit) {
        t::edit_task(&store, reference, &text)?;
    } else if !text.is_empty() {
        t::add_task(&store, &text)?;
    } else {
        let options = ListOptions {
            partition: if cli.done {
                Partition::Done
            } else {
                Partition::Active
            },
            labels: if cli.verbose {
                LabelMode::Full
            } else if cli.quiet {
                LabelMode::Hidden
            } else {
                LabelMode::Prefix
            },
            sort: config.sort,
            grep: cli.grep,
        };
        let stdout = io::stdout();
        let mut out = stdout.lock();
        t::list_tasks(&store, &options, &mut out)?;
        out.flush()?;
    }

    Ok(())
}

fn main() {
    // Tracing is opt-in via RUST_LOG; stdout is reserved for task listings.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        let code = match err.downcast_ref::<t::Error>() {
            Some(e) => {
                eprintln!("{e}");
                e.exit_code()
            }
            None => {
                eprintln!("Error: {err:#}");
                exit_codes::FATAL
            }
        };
        std::process::exit(code);
    }
}

//! What `t` prints when no task is being changed.

use std::cmp::Reverse;
use std::io::{self, Write};

use serde::Deserialize;

use crate::model::{Partition, Task, TaskList};
use crate::prefix::{self, PrefixIndex};

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending by id.
    #[default]
    Id,
    /// Most recently updated first, then by id. Tasks never stamped come last.
    Updated,
}

/// How each entry is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMode {
    /// Shortest unique prefix of the id.
    #[default]
    Prefix,
    /// The whole id.
    Full,
    /// No label at all.
    Hidden,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub partition: Partition,
    pub labels: LabelMode,
    pub sort: SortKey,
    /// Case-insensitive substring the text must contain.
    pub grep: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    pub label: Option<&'a str>,
    pub text: &'a str,
}

/// An ordered, filtered view over one partition.
///
/// Labels are computed once, over the whole partition, when the listing is
/// built. [`Listing::entries`] can be walked any number of times.
pub struct Listing<'a> {
    tasks: Vec<&'a Task>,
    labels: Option<PrefixIndex<'a>>,
    mode: LabelMode,
    needle: Option<String>,
}

impl<'a> Listing<'a> {
    pub fn new(list: &'a TaskList, options: &ListOptions) -> Self {
        let partition = list.tasks(options.partition);
        let mut tasks: Vec<&Task> = partition.values().collect();
        match options.sort {
            SortKey::Id => tasks.sort_by(|a, b| a.id.cmp(&b.id)),
            SortKey::Updated => tasks.sort_by(|a, b| {
                Reverse(a.updated_at())
                    .cmp(&Reverse(b.updated_at()))
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }

        let labels = (options.labels == LabelMode::Prefix)
            .then(|| prefix::prefixes(partition.keys().map(String::as_str)));

        Self {
            tasks,
            labels,
            mode: options.labels,
            needle: options
                .grep
                .as_deref()
                .filter(|g| !g.is_empty())
                .map(str::to_lowercase),
        }
    }

    fn label(&self, task: &'a Task) -> Option<&'a str> {
        match self.mode {
            LabelMode::Hidden => None,
            LabelMode::Full => Some(task.id.as_str()),
            LabelMode::Prefix => self
                .labels
                .as_ref()
                .and_then(|labels| labels.get(task.id.as_str()).copied()),
        }
    }

    /// Width of the longest label in the partition, filtered out tasks included.
    pub fn label_width(&self) -> usize {
        self.tasks
            .iter()
            .filter_map(|&task| self.label(task))
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'a>> + '_ {
        self.tasks
            .iter()
            .copied()
            .filter(|task| match &self.needle {
                Some(needle) => task.text.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(move |task| Entry {
                label: self.label(task),
                text: &task.text,
            })
    }

    /// Print `<label> - <text>` lines, labels padded to a common width.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let width = self.label_width();
        for entry in self.entries() {
            match entry.label {
                Some(label) => writeln!(out, "{label:<width$} - {}", entry.text)?,
                None => writeln!(out, "{}", entry.text)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::hash;
    use pretty_assertions::assert_eq;

    fn task(id: &str, text: &str) -> Task {
        Task {
            id: id.into(),
            text: text.into(),
            metadata: Default::default(),
        }
    }

    fn sample() -> TaskList {
        let mut list = TaskList::new();
        list.insert(Partition::Active, task("abd456", "Write report"));
        list.insert(Partition::Active, task("abc123", "buy milk"));
        list.insert(Partition::Active, task("f00000", "Call mom"));
        list.insert(Partition::Done, task("9", "file taxes"));
        list
    }

    fn rendered(list: &TaskList, options: &ListOptions) -> String {
        let mut out = Vec::new();
        Listing::new(list, options).render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn single_task_gets_one_character_label() {
        let mut list = TaskList::new();
        list.add("foo").unwrap();
        let listing = Listing::new(&list, &ListOptions::default());

        let entries: Vec<_> = listing.entries().collect();
        assert_eq!(
            entries,
            vec![Entry {
                label: Some(&hash("foo")[..1]),
                text: "foo"
            }]
        );
        assert_eq!(rendered(&list, &ListOptions::default()), "0 - foo\n");
    }

    #[test]
    fn labels_are_padded_to_longest() {
        assert_eq!(
            rendered(&sample(), &ListOptions::default()),
            "abc - buy milk\nabd - Write report\nf   - Call mom\n"
        );
    }

    #[test]
    fn verbose_and_quiet_labels() {
        let full = ListOptions {
            labels: LabelMode::Full,
            ..Default::default()
        };
        assert!(rendered(&sample(), &full).starts_with("abc123 - buy milk\n"));

        let hidden = ListOptions {
            labels: LabelMode::Hidden,
            ..Default::default()
        };
        assert_eq!(
            rendered(&sample(), &hidden),
            "buy milk\nWrite report\nCall mom\n"
        );
    }

    #[test]
    fn grep_is_case_insensitive_and_keeps_width() {
        let options = ListOptions {
            grep: Some("CALL".into()),
            ..Default::default()
        };
        assert_eq!(rendered(&sample(), &options), "f   - Call mom\n");
    }

    #[test]
    fn done_partition_is_listed_on_request() {
        let options = ListOptions {
            partition: Partition::Done,
            ..Default::default()
        };
        assert_eq!(rendered(&sample(), &options), "9 - file taxes\n");
    }

    #[test]
    fn sort_by_updated_puts_recent_first() {
        let mut list = TaskList::new();
        let mut old = task("aa", "old");
        old.metadata.insert("updated".into(), "100".into());
        let mut new = task("bb", "new");
        new.metadata.insert("updated".into(), "200".into());
        list.insert(Partition::Active, old);
        list.insert(Partition::Active, new);
        list.insert(Partition::Active, task("00", "never"));

        let options = ListOptions {
            sort: SortKey::Updated,
            labels: LabelMode::Hidden,
            ..Default::default()
        };
        assert_eq!(rendered(&list, &options), "new\nold\nnever\n");
    }

    #[test]
    fn entries_can_be_walked_twice() {
        let list = sample();
        let listing = Listing::new(&list, &ListOptions::default());
        assert_eq!(listing.entries().count(), 3);
        assert_eq!(listing.entries().count(), 3);
    }

    #[test]
    fn empty_partition_prints_nothing() {
        assert_eq!(rendered(&TaskList::new(), &ListOptions::default()), "");
    }
}

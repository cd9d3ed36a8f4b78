//! Short id prefixes.
//!
//! Users refer to tasks by any unique leading part of their id, similar to git
//! short hashes. [`prefixes`] computes the shortest label that still identifies
//! each id in a set, [`resolve`] maps a typed reference back to one id.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};

/// Id → shortest unique prefix, built for one set of ids and then thrown away.
pub type PrefixIndex<'a> = BTreeMap<&'a str, &'a str>;

/// Compute the shortest unique prefix of every id in `ids`.
///
/// Ids are sorted first, so the id sharing the longest common prefix with any
/// given id is always one of its two neighbours, and the result does not depend
/// on input order. An id that is a leading part of another id (or has one as
/// its own leading part) cannot be told apart by any shorter label, so such ids
/// are labelled with the whole id.
pub fn prefixes<'a, I>(ids: I) -> PrefixIndex<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&'a str> = ids.into_iter().filter(|id| !id.is_empty()).collect();
    sorted.sort_unstable();
    debug_assert!(
        sorted.windows(2).all(|pair| pair[0] != pair[1]),
        "duplicate ids passed to prefixes"
    );
    sorted.dedup();

    let nested = nested_ids(&sorted);
    let mut index = PrefixIndex::new();

    for (i, &id) in sorted.iter().enumerate() {
        if nested[i] {
            index.insert(id, id);
            continue;
        }

        let before = i.checked_sub(1).map_or(0, |j| common_prefix_len(sorted[j], id));
        let after = sorted.get(i + 1).map_or(0, |next| common_prefix_len(id, next));
        let shared = before.max(after);

        // `shared` < id.len() here: otherwise the neighbour would contain id.
        let end = id[shared..]
            .chars()
            .next()
            .map_or(id.len(), |c| shared + c.len_utf8());
        index.insert(id, &id[..end]);
    }

    debug!(count = index.len(), "computed id prefixes");
    index
}

/// Flags every id in the sorted slice that is a leading part of another id or
/// has another id as its leading part.
fn nested_ids(sorted: &[&str]) -> Vec<bool> {
    let mut nested = vec![false; sorted.len()];
    // Chain of earlier ids, each a leading part of the next.
    let mut open: Vec<&str> = Vec::new();

    for (i, &id) in sorted.iter().enumerate() {
        while open.last().is_some_and(|top| !id.starts_with(top)) {
            open.pop();
        }
        if !open.is_empty() {
            nested[i] = true;
        }
        if sorted.get(i + 1).is_some_and(|next| next.starts_with(id)) {
            nested[i] = true;
        }
        open.push(id);
    }

    nested
}

/// Length in bytes of the longest common leading part, on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((idx, _), _)| idx)
}

/// Resolve a user supplied reference to exactly one id.
///
/// A reference matching several ids is still accepted when it is one of them
/// in full, so a complete id always resolves even if it is the leading part of
/// a longer id.
pub fn resolve<'a, I>(reference: &str, ids: I) -> Result<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let matched: Vec<&'a str> = ids
        .into_iter()
        .filter(|id| id.starts_with(reference))
        .collect();

    match matched.as_slice() {
        [id] => Ok(*id),
        [] => Err(Error::UnknownReference(reference.to_string())),
        _ => match matched.iter().find(|id| **id == reference) {
            Some(id) => Ok(*id),
            None => {
                debug!(reference, candidates = matched.len(), "ambiguous reference");
                Err(Error::AmbiguousReference(reference.to_string()))
            }
        },
    }
}

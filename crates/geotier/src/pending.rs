// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Key bookkeeping for one resolution pass.

use std::{collections::HashSet, hash::Hash};

use crate::ResultMap;

/// Returns `requested` without repeated keys, keeping the first occurrence of each.
pub(crate) fn dedup<K>(requested: &[K]) -> Vec<K>
where
    K: Clone + Eq + Hash,
{
    let mut seen = HashSet::with_capacity(requested.len());
    requested.iter().filter(|key| seen.insert(*key)).cloned().collect()
}

/// Drops every key a tier resolved, keeping the order of the rest.
pub(crate) fn narrow<K, V>(mut pending: Vec<K>, hits: &ResultMap<K, V>) -> Vec<K>
where
    K: Eq + Hash,
{
    pending.retain(|key| !hits.contains_key(key));
    pending
}

/// Folds partial results in tier order. A later map overrides an earlier one on the same key.
pub(crate) fn merge<K, V, const N: usize>(partials: [ResultMap<K, V>; N]) -> ResultMap<K, V>
where
    K: Eq + Hash,
{
    partials.into_iter().fold(ResultMap::new(), |mut merged, partial| {
        merged.extend(partial);
        merged
    })
}

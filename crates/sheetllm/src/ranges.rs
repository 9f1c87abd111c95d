//! Address-range compression
//!
//! A list of addresses sharing one property is sorted by its rendered A1
//! string and collapsed into horizontal runs: three or more same-row,
//! column-consecutive addresses become `first:last`, shorter runs are listed
//! one by one.
//!
//! Sorting is lexicographic on the string, not numeric on `(row, col)`, so
//! `A10` sorts before `A2` and vertically adjacent cells interleave with
//! horizontal neighbours. Output compatibility depends on this ordering.

use crate::error::CompressResult;
use ahash::AHashMap;
use sheetllm_core::CellAddress;
use std::hash::Hash;

/// Minimum run length emitted as a range
pub const MIN_RUN_LEN: usize = 3;

/// Compress addresses into horizontal run ranges
pub fn compress_addresses(addresses: &[CellAddress]) -> Vec<String> {
    let mut rendered: Vec<(String, CellAddress)> = addresses
        .iter()
        .map(|addr| (addr.to_a1_string(), *addr))
        .collect();
    rendered.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::new();
    let mut run: Vec<&(String, CellAddress)> = Vec::new();

    for entry in &rendered {
        let extends = run.last().map_or(false, |(_, prev)| {
            prev.row == entry.1.row && prev.col + 1 == entry.1.col
        });
        if !extends {
            flush_run(&run, &mut out);
            run.clear();
        }
        run.push(entry);
    }
    flush_run(&run, &mut out);

    out
}

/// Parse address strings, then compress them
///
/// Fails with a malformed-address error if any string is not `LETTERS+DIGITS`.
pub fn compress_address_strings<S: AsRef<str>>(addresses: &[S]) -> CompressResult<Vec<String>> {
    let parsed = addresses
        .iter()
        .map(|s| CellAddress::parse(s.as_ref()))
        .collect::<sheetllm_core::Result<Vec<_>>>()?;
    Ok(compress_addresses(&parsed))
}

/// Addresses grouped by key, remembering first-seen key order
#[derive(Debug, Clone)]
pub struct AddressGroups<K> {
    index: AHashMap<K, usize>,
    groups: Vec<(K, Vec<CellAddress>)>,
}

impl<K: Eq + Hash + Clone> AddressGroups<K> {
    pub fn new() -> Self {
        Self {
            index: AHashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Add an address under `key`
    pub fn push(&mut self, key: K, addr: CellAddress) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(addr),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![addr]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[CellAddress])> + '_ {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl<K: Eq + Hash + Clone> Default for AddressGroups<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn flush_run(run: &[&(String, CellAddress)], out: &mut Vec<String>) {
    match run {
        [] => {}
        [first, .., last] if run.len() >= MIN_RUN_LEN => {
            out.push(format!("{}:{}", first.0, last.0));
        }
        _ => out.extend(run.iter().map(|(s, _)| s.clone())),
    }
}

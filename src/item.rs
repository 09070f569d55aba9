//! The document store: items, the growing content sequence, and the two
//! position finders every integration algorithm is built on top of.
//!
//! `Item` and `Doc` are generic over an `Aux` payload so the shared
//! fields the data model calls for (`id`, `content`, the two origins,
//! the tombstone flag) need no knowledge of which algorithm is using
//! them. Each algorithm module supplies its own concrete `Aux` — `()`
//! for YjsActual/YjsMod/the DoubleRGA-equivalent rewrite, a `seq` counter
//! for Automerge, an `insert_after` flag for Sync9, cached ancestor links
//! for the two DoubleRGA variants.

use std::cell::Cell;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::id::{Id, Version};

/// How an `Aux` payload contributes to `Doc::max_seq`. Every algorithm
/// but Automerge has no seq counter of its own, so the default just
/// falls back to the item's `id.seq` (a harmless, unused value for
/// those algorithms); Automerge's `AutomergeAux` overrides this to
/// report its own causal `seq` field instead, since that is the value
/// `maxSeq` must track for the "strictly greater than every prior seq
/// observed" invariant to hold once a replica merges in history it
/// didn't create.
pub trait CausalSeq {
    fn causal_seq(&self, id_seq: u64) -> u64 {
        return id_seq;
    }
}

impl CausalSeq for () {}

/// One logical element of the list. Every operation inserts exactly one
/// element (no block/range insertions); `content` is `None` only for
/// Sync9's content-less split sentinels (see `algorithms::sync9`).
#[derive(Clone, Debug)]
pub struct Item<Aux> {
    pub id: Id,
    pub content: Option<u8>,
    pub origin_left: Option<Id>,
    pub origin_right: Option<Id>,
    pub is_deleted: bool,
    pub aux: Aux,
}

impl<Aux> Item<Aux> {
    pub fn is_visible(&self) -> bool {
        return self.content.is_some() && !self.is_deleted;
    }
}

/// Running counts of hint-cache hits/misses in `find_by_id`, exposed so
/// the hint's effect on editing-trace workloads can be measured. Not
/// load-bearing for correctness.
#[derive(Clone, Copy, Debug, Default)]
pub struct HintMetrics {
    pub hits: u64,
    pub misses: u64,
}

/// The document: an ordered sequence of items plus the version vector,
/// the Automerge-shared `max_seq` counter, and the visible `length`.
#[derive(Clone, Debug)]
pub struct Doc<Aux> {
    pub content: Vec<Item<Aux>>,
    pub version: Version,
    pub max_seq: u64,
    pub length: usize,
    /// Maps an id to a physical index that currently holds an item with
    /// that id. Kept up to date on every splice; see module docs for why
    /// this needs to tolerate two items sharing an id (Sync9 splits).
    id_index: FxHashMap<Id, usize>,
    hint: Cell<usize>,
    metrics: Cell<HintMetrics>,
}

impl<Aux> Default for Doc<Aux> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<Aux> Doc<Aux> {
    pub fn new() -> Doc<Aux> {
        return Doc {
            content: Vec::new(),
            version: Version::new(),
            max_seq: 0,
            length: 0,
            id_index: FxHashMap::default(),
            hint: Cell::new(0),
            metrics: Cell::new(HintMetrics::default()),
        };
    }

    pub fn hint_metrics(&self) -> HintMetrics {
        return self.metrics.get();
    }

    /// Splice `item` into physical position `at`, updating `length`,
    /// `max_seq`, and the id index. Does not touch `version` — callers
    /// record the version advance themselves once they've checked the
    /// `OutOfOrder` precondition.
    pub fn splice(&mut self, at: usize, item: Item<Aux>)
    where
        Aux: CausalSeq,
    {
        let cseq = item.aux.causal_seq(item.id.seq);
        if cseq + 1 > self.max_seq {
            self.max_seq = cseq + 1;
        }
        if item.is_visible() {
            self.length += 1;
        }
        self.content.insert(at, item);
        self.reindex_from(at);
        self.hint.set(at);
    }

    /// Re-point the id index for every item at or after `from` (their
    /// physical index just shifted by the insertion at `from`).
    fn reindex_from(&mut self, from: usize) {
        for i in from..self.content.len() {
            self.id_index.insert(self.content[i].id.clone(), i);
        }
    }

    /// Mark the item at visible position `pos` as deleted. Idempotent:
    /// deleting an already-deleted item is a no-op.
    pub fn delete_at_physical(&mut self, idx: usize) {
        let item = &mut self.content[idx];
        if !item.is_deleted && item.content.is_some() {
            item.is_deleted = true;
            self.length -= 1;
        }
    }

    /// Find the physical index where the `pos`-th visible item sits (or
    /// would sit, for an insertion). If `stick_end` is true the walk
    /// returns as soon as the remaining count hits zero regardless of
    /// whether the item at that slot is visible — Sync9 uses this so an
    /// insertion can resolve to a split boundary instead of being
    /// pushed past content-less spans.
    pub fn find_by_visible_index(&self, pos: usize, stick_end: bool) -> Result<usize, Error> {
        let mut remaining = pos;
        for (i, item) in self.content.iter().enumerate() {
            if stick_end && remaining == 0 {
                return Ok(i);
            }
            if item.is_visible() {
                if remaining == 0 {
                    return Ok(i);
                }
                remaining -= 1;
            }
        }
        if remaining == 0 {
            return Ok(self.content.len());
        }
        return Err(Error::OutOfRange { pos, len: self.length });
    }

    /// Find the physical index of the item whose id equals `id`. `hint`
    /// is a speculative index tried first. For Sync9, `at_end = true`
    /// additionally requires the matched item to currently carry content
    /// (the content-bearing end of a split span, not its empty prefix).
    pub fn find_by_id(&self, id: &Id, at_end: bool, hint: Option<usize>) -> Result<usize, Error> {
        let matches = |item: &Item<Aux>| -> bool {
            return &item.id == id && (!at_end || item.content.is_some());
        };

        if let Some(h) = hint {
            if self.content.get(h).is_some_and(matches) {
                let mut m = self.metrics.get();
                m.hits += 1;
                self.metrics.set(m);
                self.hint.set(h);
                return Ok(h);
            }
        }

        let mut m = self.metrics.get();
        m.misses += 1;
        self.metrics.set(m);

        if let Some(&idx) = self.id_index.get(id) {
            if self.content.get(idx).is_some_and(matches) {
                self.hint.set(idx);
                return Ok(idx);
            }
            // A split can leave the index pointing at the other occurrence
            // of this id (sentinel vs. content-bearing); the two are always
            // adjacent, so check the immediate neighbours before falling
            // back to a full scan.
            for i in idx.saturating_sub(1)..=(idx + 1).min(self.content.len().saturating_sub(1)) {
                if self.content.get(i).is_some_and(matches) {
                    self.hint.set(i);
                    return Ok(i);
                }
            }
        }

        for (i, item) in self.content.iter().enumerate() {
            if matches(item) {
                self.hint.set(i);
                return Ok(i);
            }
        }

        return Err(Error::NotFound(id.clone()));
    }

    /// The item whose id is `originLeft`'s physical index, or -1 encoded
    /// as `None` when the origin is the null boundary.
    pub fn find_origin(&self, origin: Option<&Id>, hint: Option<usize>) -> Result<Option<usize>, Error> {
        return match origin {
            None => Ok(None),
            Some(id) => Ok(Some(self.find_by_id(id, false, hint)?)),
        };
    }

    /// The visible content, in document order, skipping tombstones and
    /// Sync9's content-less sentinels.
    pub fn get_array(&self) -> Vec<u8> {
        return self
            .content
            .iter()
            .filter(|item| item.is_visible())
            .map(|item| item.content.unwrap())
            .collect();
    }
}

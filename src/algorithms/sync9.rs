//! Sync9: splittable spans realised as content-absent sentinels.
//!
//! An id can legitimately resolve to *two* physical items here: the
//! sentinel left by a split (content absent) and the content-bearing
//! item it split off from. `locate` below resolves that ambiguity by
//! `at_end`, bypassing `item::Doc::find_by_id`'s single-index cache
//! entirely — a plain scan is the only thing that's unambiguously
//! correct once an id can appear twice.

use crate::error::Error;
use crate::id::Id;
use crate::item::{self, Item};

/// Whether this insertion attaches to the *end* of `origin_left`'s
/// splittable span (true) rather than its *start* (false).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sync9Aux {
    pub insert_after: bool,
}

impl item::CausalSeq for Sync9Aux {}

fn locate(doc: &item::Doc<Sync9Aux>, id: &Id, at_end: bool) -> Result<isize, Error> {
    let mut sentinel = None;
    let mut bearing = None;
    for (i, it) in doc.content.iter().enumerate() {
        if &it.id == id {
            if it.content.is_some() {
                bearing = Some(i);
            } else {
                sentinel = Some(i);
            }
        }
    }
    let found = if at_end { bearing } else { sentinel.or(bearing) };
    return found.map(|i| i as isize).ok_or_else(|| Error::NotFound(id.clone()));
}

fn locate_opt(doc: &item::Doc<Sync9Aux>, id: Option<&Id>, at_end: bool) -> Result<isize, Error> {
    return match id {
        None => Ok(-1),
        Some(id) => locate(doc, id, at_end),
    };
}

pub fn integrate(
    doc: &mut item::Doc<Sync9Aux>,
    id: Id,
    content: Option<u8>,
    origin_left: Option<Id>,
    origin_right: Option<Id>,
    insert_after: bool,
    _hint: Option<usize>,
) -> Result<usize, Error> {
    let expected = doc.version.next_seq(&id.agent);
    if id.seq != expected {
        return Err(Error::OutOfOrder { agent: id.agent.clone(), expected, got: id.seq });
    }
    doc.version.advance(&id.agent, id.seq);

    let parent_idx = locate_opt(doc, origin_left.as_ref(), insert_after)?;

    let dest;
    if !insert_after && parent_idx >= 0 && doc.content[parent_idx as usize].content.is_some() {
        let parent = &doc.content[parent_idx as usize];
        let sentinel = Item {
            id: parent.id.clone(),
            content: None,
            origin_left: parent.origin_left.clone(),
            origin_right: parent.origin_right.clone(),
            is_deleted: false,
            aux: Sync9Aux { insert_after: false },
        };
        doc.splice(parent_idx as usize, sentinel);
        dest = parent_idx as usize + 1;
    } else {
        let mut i = (parent_idx + 1) as usize;
        loop {
            if i >= doc.content.len() {
                break;
            }
            let o = &doc.content[i];
            let o_origin = locate_opt(doc, o.origin_left.as_ref(), o.aux.insert_after)?;
            if o_origin < parent_idx || (o_origin == parent_idx && id.agent < o.id.agent) {
                break;
            }
            i += 1;
        }
        dest = i;
    }

    let new_item = Item { id, content, origin_left, origin_right, is_deleted: false, aux: Sync9Aux { insert_after } };
    doc.splice(dest, new_item);
    return Ok(dest);
}

/// Derives `(origin_left, origin_right, insert_after)` for a local
/// insertion at visible position `pos`: attach after the content-bearing
/// left neighbour when one directly precedes the insertion point,
/// otherwise treat this as prefixing whatever span starts here.
pub fn nominal_origins(doc: &item::Doc<Sync9Aux>, pos: usize) -> Result<(Option<Id>, Option<Id>, bool), Error> {
    let i = doc.find_by_visible_index(pos, true)?;
    let origin_right = doc.content.get(i).map(|it| it.id.clone());

    if i > 0 && doc.content[i - 1].content.is_some() {
        return Ok((Some(doc.content[i - 1].id.clone()), origin_right, true));
    }

    for it in &doc.content[i..] {
        if it.content.is_some() {
            return Ok((Some(it.id.clone()), origin_right, false));
        }
    }
    return Ok((None, origin_right, true));
}

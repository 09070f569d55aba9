//! DoubleRGA-1: an ancestor-tree comparator over two trees — the
//! `originLeft` tree every item belongs to, and an `originRight` tree
//! restricted to siblings.
//!
//! `DoubleRga1Aux` stores only what genuinely differs from the shared
//! `Item` fields: the left-tree depth, and the *gated* right-tree link
//! (set only when `origin_right`'s own `origin_left` matches this
//! item's) plus its depth.
//!
//! The comparator climbs both trees by following cached ids through
//! `get`, which costs one `find_by_id` per hop — a plain scan, the
//! baseline cost this builds on.

use std::cmp::Ordering;

use crate::error::Error;
use crate::id::Id;
use crate::item::{self, Item};

use super::{check_and_advance, left_index, right_index};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoubleRga1Aux {
    pub left_depth: u32,
    pub origin_right_item: Option<Id>,
    pub right_depth: u32,
}

impl item::CausalSeq for DoubleRga1Aux {}

fn get<'a>(doc: &'a item::Doc<DoubleRga1Aux>, id: &Id) -> Result<&'a Item<DoubleRga1Aux>, Error> {
    let idx = doc.find_by_id(id, false, None)?;
    return Ok(&doc.content[idx]);
}

fn left_depth_of(doc: &item::Doc<DoubleRga1Aux>, id: Option<&Id>) -> Result<u32, Error> {
    return match id {
        None => Ok(0),
        Some(id) => Ok(get(doc, id)?.aux.left_depth),
    };
}

fn gated_right_cache(
    doc: &item::Doc<DoubleRga1Aux>,
    origin_left: Option<&Id>,
    origin_right: Option<&Id>,
) -> Result<(Option<Id>, u32), Error> {
    let rid = match origin_right {
        None => return Ok((None, 0)),
        Some(rid) => rid,
    };
    let r_item = get(doc, rid)?;
    if r_item.origin_left.as_ref() == origin_left {
        return Ok((Some(rid.clone()), 1 + r_item.aux.right_depth));
    }
    return Ok((None, 0));
}

/// The new item's own placement fields, not yet spliced into `content`
/// and so not resolvable through `get`/`find_by_id`. `compare` and
/// `compare_siblings` consult this instead of the document whenever a
/// climb lands back on the new item's own id.
struct Pending<'a> {
    id: &'a Id,
    origin_left: Option<Id>,
    left_depth: u32,
    origin_right_item: Option<Id>,
    right_depth: u32,
}

fn left_depth_at(doc: &item::Doc<DoubleRga1Aux>, pending: &Pending, id: &Id) -> Result<u32, Error> {
    if id == pending.id {
        return Ok(pending.left_depth);
    }
    return Ok(get(doc, id)?.aux.left_depth);
}

fn origin_left_at(doc: &item::Doc<DoubleRga1Aux>, pending: &Pending, id: &Id) -> Result<Option<Id>, Error> {
    if id == pending.id {
        return Ok(pending.origin_left.clone());
    }
    return Ok(get(doc, id)?.origin_left.clone());
}

fn right_depth_at(doc: &item::Doc<DoubleRga1Aux>, pending: &Pending, id: &Id) -> Result<u32, Error> {
    if id == pending.id {
        return Ok(pending.right_depth);
    }
    return Ok(get(doc, id)?.aux.right_depth);
}

fn origin_right_item_at(doc: &item::Doc<DoubleRga1Aux>, pending: &Pending, id: &Id) -> Result<Option<Id>, Error> {
    if id == pending.id {
        return Ok(pending.origin_right_item.clone());
    }
    return Ok(get(doc, id)?.aux.origin_right_item.clone());
}

fn compare_siblings(doc: &item::Doc<DoubleRga1Aux>, pending: &Pending, x: &Id, y: &Id) -> Result<Ordering, Error> {
    if x == y {
        return Ok(Ordering::Equal);
    }
    let rx = right_depth_at(doc, pending, x)?;
    let ry = right_depth_at(doc, pending, y)?;
    let (hi, hi_depth, lo, lo_depth, hi_is_x) =
        if rx >= ry { (x.clone(), rx, y.clone(), ry, true) } else { (y.clone(), ry, x.clone(), rx, false) };

    let mut cur = hi.clone();
    let mut reached = true;
    for _ in 0..(hi_depth - lo_depth) {
        match origin_right_item_at(doc, pending, &cur)? {
            Some(p) => cur = p,
            None => {
                reached = false;
                break;
            }
        }
    }
    if reached && cur == lo {
        // hi is a right-tree descendant of lo: deeper-right is lesser.
        return Ok(if hi_is_x { Ordering::Less } else { Ordering::Greater });
    }

    // Agents are a plain field on `Id` itself; no document lookup needed.
    return Ok(x.agent.cmp(&y.agent));
}

fn compare(doc: &item::Doc<DoubleRga1Aux>, pending: &Pending, a: &Id, b: &Id) -> Result<Ordering, Error> {
    if a == b {
        return Ok(Ordering::Equal);
    }
    let da = left_depth_at(doc, pending, a)?;
    let db = left_depth_at(doc, pending, b)?;
    let (hi, hi_depth, lo, lo_depth, hi_is_a) =
        if da >= db { (a.clone(), da, b.clone(), db, true) } else { (b.clone(), db, a.clone(), da, false) };

    let mut cur = hi.clone();
    for _ in 0..(hi_depth - lo_depth) {
        cur = match origin_left_at(doc, pending, &cur)? {
            Some(p) => p,
            None => break,
        };
    }
    if cur == lo {
        // hi is a left-tree descendant of lo: the deeper one is greater.
        return Ok(if hi_is_a { Ordering::Greater } else { Ordering::Less });
    }

    let mut x = cur;
    let mut y = lo;
    loop {
        let xp = origin_left_at(doc, pending, &x)?;
        let yp = origin_left_at(doc, pending, &y)?;
        match (xp, yp) {
            (Some(xp), Some(yp)) if xp == yp => {
                let ord = compare_siblings(doc, pending, &x, &y)?;
                return Ok(if hi_is_a { ord } else { ord.reverse() });
            }
            (Some(xp), Some(yp)) => {
                x = xp;
                y = yp;
            }
            _ => return Err(Error::Stuck),
        }
    }
}

pub fn integrate(
    doc: &mut item::Doc<DoubleRga1Aux>,
    id: Id,
    content: Option<u8>,
    origin_left: Option<Id>,
    origin_right: Option<Id>,
    hint: Option<usize>,
) -> Result<usize, Error> {
    check_and_advance(doc, &id)?;

    let l = left_index(doc, origin_left.as_ref(), hint)?;
    let r = right_index(doc, origin_right.as_ref())?;
    let left_depth = 1 + left_depth_of(doc, origin_left.as_ref())?;
    let (origin_right_item, right_depth) = gated_right_cache(doc, origin_left.as_ref(), origin_right.as_ref())?;

    let pending = Pending {
        id: &id,
        origin_left: origin_left.clone(),
        left_depth,
        origin_right_item: origin_right_item.clone(),
        right_depth,
    };

    let mut dest = r;
    for i in (l + 1) as usize..r {
        if compare(doc, &pending, &doc.content[i].id, &id)? == Ordering::Greater {
            dest = i;
            break;
        }
    }

    let new_item = Item {
        id,
        content,
        origin_left,
        origin_right,
        is_deleted: false,
        aux: DoubleRga1Aux { left_depth, origin_right_item, right_depth },
    };
    doc.splice(dest, new_item);
    return Ok(dest);
}

//! DoubleRGA-2: the unified-tree form. Every item has one parent and a
//! `parent_is_left` flag recording which origin that parent came from;
//! right-children sort before left-children of the same parent, and
//! that direction generalises transitively up an ancestor/descendant
//! chain.

use std::cmp::Ordering;

use crate::error::Error;
use crate::id::Id;
use crate::item::{self, Item};

use super::{check_and_advance, left_index, right_index};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoubleRga2Aux {
    pub parent: Option<Id>,
    pub parent_is_left: bool,
    pub depth: u32,
}

impl item::CausalSeq for DoubleRga2Aux {}

fn get<'a>(doc: &'a item::Doc<DoubleRga2Aux>, id: &Id) -> Result<&'a Item<DoubleRga2Aux>, Error> {
    let idx = doc.find_by_id(id, false, None)?;
    return Ok(&doc.content[idx]);
}

fn depth_of(doc: &item::Doc<DoubleRga2Aux>, id: Option<&Id>) -> Result<u32, Error> {
    return match id {
        None => Ok(0),
        Some(id) => Ok(get(doc, id)?.aux.depth),
    };
}

/// Selects the parent: `origin_left` by default, but `origin_right`
/// instead (with `parent_is_left = false`) when it is a descendant of
/// `origin_left` — detected by their sharing the same `origin_left`.
fn select_parent(
    doc: &item::Doc<DoubleRga2Aux>,
    origin_left: Option<&Id>,
    origin_right: Option<&Id>,
) -> Result<(Option<Id>, bool), Error> {
    if let Some(rid) = origin_right {
        let r_item = get(doc, rid)?;
        if r_item.origin_left.as_ref() == origin_left {
            return Ok((Some(rid.clone()), false));
        }
    }
    return Ok((origin_left.cloned(), true));
}

/// The new item's own placement fields, not yet spliced into `content`
/// and so not resolvable through `get`/`find_by_id`. `compare` consults
/// this instead of the document whenever a climb lands back on the new
/// item's own id.
struct Pending<'a> {
    id: &'a Id,
    parent: Option<Id>,
    parent_is_left: bool,
    depth: u32,
}

fn depth_at(doc: &item::Doc<DoubleRga2Aux>, pending: &Pending, id: &Id) -> Result<u32, Error> {
    if id == pending.id {
        return Ok(pending.depth);
    }
    return Ok(get(doc, id)?.aux.depth);
}

fn parent_at(doc: &item::Doc<DoubleRga2Aux>, pending: &Pending, id: &Id) -> Result<Option<Id>, Error> {
    if id == pending.id {
        return Ok(pending.parent.clone());
    }
    return Ok(get(doc, id)?.aux.parent.clone());
}

fn parent_is_left_at(doc: &item::Doc<DoubleRga2Aux>, pending: &Pending, id: &Id) -> Result<bool, Error> {
    if id == pending.id {
        return Ok(pending.parent_is_left);
    }
    return Ok(get(doc, id)?.aux.parent_is_left);
}

fn sibling_order(x: &Id, x_parent_is_left: bool, y: &Id, y_parent_is_left: bool) -> Ordering {
    return match (x_parent_is_left, y_parent_is_left) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => x.agent.cmp(&y.agent),
    };
}

fn compare(doc: &item::Doc<DoubleRga2Aux>, pending: &Pending, a: &Id, b: &Id) -> Result<Ordering, Error> {
    if a == b {
        return Ok(Ordering::Equal);
    }
    let da = depth_at(doc, pending, a)?;
    let db = depth_at(doc, pending, b)?;
    let (hi, hi_depth, lo, lo_depth, hi_is_a) =
        if da >= db { (a.clone(), da, b.clone(), db, true) } else { (b.clone(), db, a.clone(), da, false) };

    let mut cur = hi.clone();
    let mut last_is_left = true;
    for _ in 0..(hi_depth - lo_depth) {
        last_is_left = parent_is_left_at(doc, pending, &cur)?;
        cur = match parent_at(doc, pending, &cur)? {
            Some(p) => p,
            None => return Err(Error::Stuck),
        };
    }
    if cur == lo {
        // the shallower one (`lo`) lies in the direction of the last
        // climbing step: left = greater, right = lesser.
        let hi_vs_lo = if last_is_left { Ordering::Less } else { Ordering::Greater };
        return Ok(if hi_is_a { hi_vs_lo } else { hi_vs_lo.reverse() });
    }

    let mut x = cur;
    let mut y = lo;
    loop {
        let xp = parent_at(doc, pending, &x)?;
        let yp = parent_at(doc, pending, &y)?;
        if xp == yp {
            let x_pil = parent_is_left_at(doc, pending, &x)?;
            let y_pil = parent_is_left_at(doc, pending, &y)?;
            let ord = sibling_order(&x, x_pil, &y, y_pil);
            return Ok(if hi_is_a { ord } else { ord.reverse() });
        }
        match (xp, yp) {
            (Some(xp), Some(yp)) => {
                x = xp;
                y = yp;
            }
            _ => return Err(Error::Stuck),
        }
    }
}

pub fn integrate(
    doc: &mut item::Doc<DoubleRga2Aux>,
    id: Id,
    content: Option<u8>,
    origin_left: Option<Id>,
    origin_right: Option<Id>,
    hint: Option<usize>,
) -> Result<usize, Error> {
    check_and_advance(doc, &id)?;

    let l = left_index(doc, origin_left.as_ref(), hint)?;
    let r = right_index(doc, origin_right.as_ref())?;
    let (parent, parent_is_left) = select_parent(doc, origin_left.as_ref(), origin_right.as_ref())?;
    let depth = 1 + depth_of(doc, parent.as_ref())?;

    let pending = Pending { id: &id, parent: parent.clone(), parent_is_left, depth };

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
        aux: DoubleRga2Aux { parent, parent_is_left, depth },
    };
    doc.splice(dest, new_item);
    return Ok(dest);
}

//! DoubleRGA-equivalent: [`super::yjs_mod`]'s loop, with any
//! `originRight` pointer nulled out for the duration of the placement
//! decision whenever it refers to an item whose own `originLeft`
//! differs from its bearer's. This is the demonstration that
//! DoubleRGA-2's behaviour is reachable through the YjsMod style of
//! placement rather than an explicit tree walk.

use crate::error::Error;
use crate::id::Id;
use crate::item::{self, Item};

use super::{check_and_advance, left_index, right_index};

fn get<'a, Aux>(doc: &'a item::Doc<Aux>, id: &Id) -> Result<&'a Item<Aux>, Error> {
    let idx = doc.find_by_id(id, false, None)?;
    return Ok(&doc.content[idx]);
}

/// Nulls `origin_right` unless the item it refers to shares
/// `bearer_origin_left` as its own `originLeft`.
fn gated_right<Aux>(
    doc: &item::Doc<Aux>,
    bearer_origin_left: Option<&Id>,
    origin_right: Option<&Id>,
) -> Result<Option<Id>, Error> {
    let rid = match origin_right {
        None => return Ok(None),
        Some(rid) => rid,
    };
    let r_item = get(doc, rid)?;
    if r_item.origin_left.as_ref() == bearer_origin_left {
        return Ok(Some(rid.clone()));
    }
    return Ok(None);
}

pub fn integrate(
    doc: &mut item::Doc<()>,
    id: Id,
    content: Option<u8>,
    origin_left: Option<Id>,
    origin_right: Option<Id>,
    hint: Option<usize>,
) -> Result<usize, Error> {
    check_and_advance(doc, &id)?;

    let l = left_index(doc, origin_left.as_ref(), hint)?;
    let gated_x_right = gated_right(doc, origin_left.as_ref(), origin_right.as_ref())?;
    let r = right_index(doc, gated_x_right.as_ref())?;

    let mut i = (l + 1) as usize;
    let mut dest = i;
    let mut scanning = false;
    loop {
        if i == doc.content.len() || i == r {
            break;
        }
        let o = &doc.content[i];
        let o_l = left_index(doc, o.origin_left.as_ref(), None)?;
        if o_l < l {
            break;
        } else if o_l == l {
            let gated_o_right = gated_right(doc, o.origin_left.as_ref(), o.origin_right.as_ref())?;
            let o_r = right_index(doc, gated_o_right.as_ref())?;
            if o_r < r {
                scanning = true;
            } else if o_r == r {
                if id.agent < o.id.agent {
                    break;
                }
                scanning = false;
            } else {
                scanning = false;
            }
        }
        i += 1;
        if !scanning {
            dest = i;
        }
    }

    let new_item = Item { id, content, origin_left, origin_right, is_deleted: false, aux: () };
    doc.splice(dest, new_item);
    return Ok(dest);
}

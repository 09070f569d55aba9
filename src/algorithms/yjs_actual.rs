//! YATA-style placement, the scanning-flag form.
//!
//! Agent ties favour the *incoming* item over the existing occupant
//! (`x.agent > o.agent` clears scanning), which is the strict direction
//! that `withTails`/backward-interleaving scenarios are known to get
//! wrong relative to [`super::yjs_mod`] — see [`super::skip_tags`].

use crate::error::Error;
use crate::id::Id;
use crate::item::{self, Item};

use super::{check_and_advance, left_index, right_index};

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
    let r = right_index(doc, origin_right.as_ref())?;

    let mut i = (l + 1) as usize;
    let mut dest = i;
    let mut scanning = false;
    loop {
        if i == doc.content.len() || i == r {
            break;
        }
        let o_l = left_index(doc, doc.content[i].origin_left.as_ref(), None)?;
        if o_l < l {
            break;
        } else if o_l == l {
            let o_r = right_index(doc, doc.content[i].origin_right.as_ref())?;
            if id.agent > doc.content[i].id.agent {
                scanning = false;
            } else if o_r == r {
                break;
            } else {
                scanning = true;
            }
        }
        // oL > L: fall through, scanning unchanged.
        i += 1;
        if !scanning {
            dest = i;
        }
    }

    let new_item = Item { id, content, origin_left, origin_right, is_deleted: false, aux: () };
    doc.splice(dest, new_item);
    return Ok(dest);
}

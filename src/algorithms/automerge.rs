//! Automerge-style placement: children of the same parent ordered by
//! descending `seq`, ascending agent as tiebreak.
//!
//! Note the agent tiebreak here is ascending, the opposite of the
//! reference Automerge implementation's descending order — a wire
//! incompatibility a real adapter would need to invert, not a bug in
//! this crate.
//!
//! Known to fail the `tails` and `backward_interleaving` conformance
//! scenarios; see [`super::skip_tags`].

use crate::error::Error;
use crate::id::Id;
use crate::item::{self, Item};

use super::{check_and_advance, left_index};

/// Automerge's monotone per-creation-replica counter, strictly greater
/// than every prior seq that replica has locally observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AutomergeAux {
    pub seq: u64,
}

impl item::CausalSeq for AutomergeAux {
    fn causal_seq(&self, _id_seq: u64) -> u64 {
        return self.seq;
    }
}

pub fn integrate(
    doc: &mut item::Doc<AutomergeAux>,
    id: Id,
    content: Option<u8>,
    origin_left: Option<Id>,
    origin_right: Option<Id>,
    seq: u64,
    hint: Option<usize>,
) -> Result<usize, Error> {
    check_and_advance(doc, &id)?;

    let l = left_index(doc, origin_left.as_ref(), hint)?;

    let mut dest = doc.content.len();
    let mut i = (l + 1) as usize;
    while i < doc.content.len() {
        let o = &doc.content[i];
        if seq > o.aux.seq {
            dest = i;
            break;
        }
        let o_l = left_index(doc, o.origin_left.as_ref(), None)?;
        if o_l < l || (o_l == l && seq == o.aux.seq && id.agent < o.id.agent) {
            dest = i;
            break;
        }
        i += 1;
    }

    let new_item = Item { id, content, origin_left, origin_right, is_deleted: false, aux: AutomergeAux { seq } };
    doc.splice(dest, new_item);
    return Ok(dest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        let mut doc: item::Doc<AutomergeAux> = item::Doc::new();
        integrate(&mut doc, Id::new("A", 0), Some(b'a'), None, None, 1, None).unwrap();
        integrate(&mut doc, Id::new("A", 1), Some(b'b'), Some(Id::new("A", 0)), None, 2, None).unwrap();
        assert_eq!(doc.get_array(), b"ab");
    }

    #[test]
    fn concurrent_children_order_by_descending_seq_then_agent() {
        let mut doc: item::Doc<AutomergeAux> = item::Doc::new();
        integrate(&mut doc, Id::new("A", 0), Some(b'r'), None, None, 1, None).unwrap();
        // two concurrent children of the root, same seq: ascending agent.
        integrate(&mut doc, Id::new("b", 0), Some(b'b'), Some(Id::new("A", 0)), None, 2, None).unwrap();
        integrate(&mut doc, Id::new("a", 0), Some(b'a'), Some(Id::new("A", 0)), None, 2, None).unwrap();
        assert_eq!(doc.get_array(), b"rab");
    }
}

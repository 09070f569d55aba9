//! Operation generation and the merge driver, plus the top-level
//! dispatch across the seven algorithms tagged in [`crate::algorithms`].

use crate::algorithms::{automerge, double_rga1, double_rga2, double_rga_equiv, sync9, yjs_actual, yjs_mod};
use crate::algorithms::{Algorithm, Doc, Op};
use crate::error::Error;
use crate::id::{is_in_version, Id, Version};
use crate::item;

pub fn new_doc(alg: Algorithm) -> Doc {
    return Doc::new(alg);
}

/// `(physical index, left neighbour id, right neighbour id)` for a
/// local insertion at visible position `pos`, shared by every algorithm
/// except Sync9 (which derives its own origins; see [`sync9::nominal_origins`]).
fn nominal_neighbors<Aux>(doc: &item::Doc<Aux>, pos: usize) -> Result<(usize, Option<Id>, Option<Id>), Error> {
    let i = doc.find_by_visible_index(pos, false)?;
    let origin_left = if i > 0 { Some(doc.content[i - 1].id.clone()) } else { None };
    let origin_right = if i < doc.content.len() { Some(doc.content[i].id.clone()) } else { None };
    return Ok((i, origin_left, origin_right));
}

/// Synthesises and integrates a local insertion of `content` at visible
/// position `pos`, returning the new item's id. Fails with `OutOfRange`
/// if `pos` exceeds the document's visible length.
pub fn local_insert(doc: &mut Doc, agent: &str, pos: usize, content: u8) -> Result<Id, Error> {
    return match doc {
        Doc::YjsActual(d) => {
            let (i, ol, or) = nominal_neighbors(d, pos)?;
            let id = Id::new(agent, d.version.next_seq(agent));
            yjs_actual::integrate(d, id.clone(), Some(content), ol, or, Some(i))?;
            Ok(id)
        }
        Doc::YjsMod(d) => {
            let (i, ol, or) = nominal_neighbors(d, pos)?;
            let id = Id::new(agent, d.version.next_seq(agent));
            yjs_mod::integrate(d, id.clone(), Some(content), ol, or, Some(i))?;
            Ok(id)
        }
        Doc::Automerge(d) => {
            let (i, ol, or) = nominal_neighbors(d, pos)?;
            let id = Id::new(agent, d.version.next_seq(agent));
            let seq = d.max_seq + 1;
            automerge::integrate(d, id.clone(), Some(content), ol, or, seq, Some(i))?;
            Ok(id)
        }
        Doc::Sync9(d) => {
            let (ol, or, insert_after) = sync9::nominal_origins(d, pos)?;
            let id = Id::new(agent, d.version.next_seq(agent));
            sync9::integrate(d, id.clone(), Some(content), ol, or, insert_after, None)?;
            Ok(id)
        }
        Doc::DoubleRga1(d) => {
            let (i, ol, or) = nominal_neighbors(d, pos)?;
            let id = Id::new(agent, d.version.next_seq(agent));
            double_rga1::integrate(d, id.clone(), Some(content), ol, or, Some(i))?;
            Ok(id)
        }
        Doc::DoubleRga2(d) => {
            let (i, ol, or) = nominal_neighbors(d, pos)?;
            let id = Id::new(agent, d.version.next_seq(agent));
            double_rga2::integrate(d, id.clone(), Some(content), ol, or, Some(i))?;
            Ok(id)
        }
        Doc::DoubleRgaEquivalent(d) => {
            let (i, ol, or) = nominal_neighbors(d, pos)?;
            let id = Id::new(agent, d.version.next_seq(agent));
            double_rga_equiv::integrate(d, id.clone(), Some(content), ol, or, Some(i))?;
            Ok(id)
        }
    };
}

/// Tombstones the item at visible position `pos`. Fails with
/// `OutOfRange` if `pos` is not a currently-visible position.
pub fn local_delete(doc: &mut Doc, agent: &str, pos: usize) -> Result<(), Error> {
    fn delete_in<Aux>(d: &mut item::Doc<Aux>, pos: usize) -> Result<(), Error> {
        if pos >= d.length {
            return Err(Error::OutOfRange { pos, len: d.length });
        }
        let idx = d.find_by_visible_index(pos, false)?;
        d.delete_at_physical(idx);
        return Ok(());
    }
    let _ = agent; // deletions carry no new id of their own in this driver.
    return match doc {
        Doc::YjsActual(d) => delete_in(d, pos),
        Doc::YjsMod(d) => delete_in(d, pos),
        Doc::Automerge(d) => delete_in(d, pos),
        Doc::Sync9(d) => delete_in(d, pos),
        Doc::DoubleRga1(d) => delete_in(d, pos),
        Doc::DoubleRga2(d) => delete_in(d, pos),
        Doc::DoubleRgaEquivalent(d) => delete_in(d, pos),
    };
}

/// The primitive merge and tests drive directly: integrates one
/// pre-formed operation. `doc` and `op` must agree on algorithm — a
/// mismatch is a caller bug, not a data-dependent failure, so it panics
/// rather than returning one of the four `Error` kinds.
pub fn integrate(doc: &mut Doc, op: Op, hint: Option<usize>) -> Result<usize, Error> {
    return match (doc, op) {
        (Doc::YjsActual(d), Op::Plain { id, content, origin_left, origin_right }) => {
            yjs_actual::integrate(d, id, content, origin_left, origin_right, hint)
        }
        (Doc::YjsMod(d), Op::Plain { id, content, origin_left, origin_right }) => {
            yjs_mod::integrate(d, id, content, origin_left, origin_right, hint)
        }
        (Doc::DoubleRgaEquivalent(d), Op::Plain { id, content, origin_left, origin_right }) => {
            double_rga_equiv::integrate(d, id, content, origin_left, origin_right, hint)
        }
        (Doc::DoubleRga1(d), Op::Plain { id, content, origin_left, origin_right }) => {
            double_rga1::integrate(d, id, content, origin_left, origin_right, hint)
        }
        (Doc::DoubleRga2(d), Op::Plain { id, content, origin_left, origin_right }) => {
            double_rga2::integrate(d, id, content, origin_left, origin_right, hint)
        }
        (Doc::Automerge(d), Op::Automerge { id, content, origin_left, origin_right, seq }) => {
            automerge::integrate(d, id, content, origin_left, origin_right, seq, hint)
        }
        (Doc::Sync9(d), Op::Sync9 { id, content, origin_left, origin_right, insert_after }) => {
            sync9::integrate(d, id, content, origin_left, origin_right, insert_after, hint)
        }
        (doc, op) => panic!("integrate: op {op:?} does not match document algorithm {:?}", doc.algorithm()),
    };
}

fn is_ready<Aux>(item: &item::Item<Aux>, dest_version: &Version) -> bool {
    return is_in_version(item.origin_left.as_ref(), dest_version)
        && is_in_version(item.origin_right.as_ref(), dest_version)
        && item.id.seq == dest_version.next_seq(&item.id.agent);
}

/// Repeatedly integrates every `src` item whose dependencies are
/// satisfied in `dest`, until the working set is empty. Deletions are
/// not replicated by this driver.
fn merge_generic<Aux>(
    dest: &mut item::Doc<Aux>,
    src: &item::Doc<Aux>,
    mut integrate_one: impl FnMut(&mut item::Doc<Aux>, &item::Item<Aux>) -> Result<usize, Error>,
) -> Result<(), Error> {
    let mut pending: Vec<usize> = src
        .content
        .iter()
        .enumerate()
        .filter(|(_, it)| it.content.is_some() && !dest.version.contains(&it.id.agent, it.id.seq))
        .map(|(i, _)| i)
        .collect();

    while !pending.is_empty() {
        let mut next_pending = Vec::new();
        let mut progressed = false;
        for idx in pending {
            let item = &src.content[idx];
            if is_ready(item, &dest.version) {
                integrate_one(dest, item)?;
                progressed = true;
            } else {
                next_pending.push(idx);
            }
        }
        if !progressed {
            return Err(Error::Stuck);
        }
        pending = next_pending;
    }
    return Ok(());
}

/// Bulk-imports every operation in `src` not yet known to `dest`.
/// `dest` and `src` must use the same algorithm.
pub fn merge_into(dest: &mut Doc, src: &Doc) -> Result<(), Error> {
    return match (dest, src) {
        (Doc::YjsActual(d), Doc::YjsActual(s)) => merge_generic(d, s, |d, it| {
            yjs_actual::integrate(d, it.id.clone(), it.content, it.origin_left.clone(), it.origin_right.clone(), None)
        }),
        (Doc::YjsMod(d), Doc::YjsMod(s)) => merge_generic(d, s, |d, it| {
            yjs_mod::integrate(d, it.id.clone(), it.content, it.origin_left.clone(), it.origin_right.clone(), None)
        }),
        (Doc::DoubleRgaEquivalent(d), Doc::DoubleRgaEquivalent(s)) => merge_generic(d, s, |d, it| {
            double_rga_equiv::integrate(d, it.id.clone(), it.content, it.origin_left.clone(), it.origin_right.clone(), None)
        }),
        (Doc::DoubleRga1(d), Doc::DoubleRga1(s)) => merge_generic(d, s, |d, it| {
            double_rga1::integrate(d, it.id.clone(), it.content, it.origin_left.clone(), it.origin_right.clone(), None)
        }),
        (Doc::DoubleRga2(d), Doc::DoubleRga2(s)) => merge_generic(d, s, |d, it| {
            double_rga2::integrate(d, it.id.clone(), it.content, it.origin_left.clone(), it.origin_right.clone(), None)
        }),
        (Doc::Automerge(d), Doc::Automerge(s)) => merge_generic(d, s, |d, it| {
            automerge::integrate(d, it.id.clone(), it.content, it.origin_left.clone(), it.origin_right.clone(), it.aux.seq, None)
        }),
        (Doc::Sync9(d), Doc::Sync9(s)) => merge_generic(d, s, |d, it| {
            sync9::integrate(
                d,
                it.id.clone(),
                it.content,
                it.origin_left.clone(),
                it.origin_right.clone(),
                it.aux.insert_after,
                None,
            )
        }),
        (dest, src) => panic!("merge_into: dest algorithm {:?} does not match src algorithm {:?}", dest.algorithm(), src.algorithm()),
    };
}

pub fn get_array(doc: &Doc) -> Vec<u8> {
    return match doc {
        Doc::YjsActual(d) => d.get_array(),
        Doc::YjsMod(d) => d.get_array(),
        Doc::Automerge(d) => d.get_array(),
        Doc::Sync9(d) => d.get_array(),
        Doc::DoubleRga1(d) => d.get_array(),
        Doc::DoubleRga2(d) => d.get_array(),
        Doc::DoubleRgaEquivalent(d) => d.get_array(),
    };
}

fn version_of(doc: &Doc) -> &Version {
    return match doc {
        Doc::YjsActual(d) => &d.version,
        Doc::YjsMod(d) => &d.version,
        Doc::Automerge(d) => &d.version,
        Doc::Sync9(d) => &d.version,
        Doc::DoubleRga1(d) => &d.version,
        Doc::DoubleRga2(d) => &d.version,
        Doc::DoubleRgaEquivalent(d) => &d.version,
    };
}

/// Causal-readiness predicate: would `op` be eligible for `integrate`
/// right now? Does not check the algorithm tags match.
pub fn can_insert_now(op: &Op, doc: &Doc) -> bool {
    let version = version_of(doc);
    let id = op.id();
    return is_in_version(op.origin_left(), version)
        && is_in_version(op.origin_right(), version)
        && id.seq == version.next_seq(&id.agent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Algorithm;

    #[test]
    fn local_insert_and_delete_round_trip() {
        let mut doc = new_doc(Algorithm::YjsMod);
        local_insert(&mut doc, "a", 0, b'x').unwrap();
        local_insert(&mut doc, "a", 1, b'y').unwrap();
        assert_eq!(get_array(&doc), b"xy");
        local_delete(&mut doc, "a", 0).unwrap();
        assert_eq!(get_array(&doc), b"y");
    }

    #[test]
    fn delete_out_of_range() {
        let mut doc = new_doc(Algorithm::YjsMod);
        let err = local_delete(&mut doc, "a", 0).unwrap_err();
        assert_eq!(err, Error::OutOfRange { pos: 0, len: 0 });
    }

    #[test]
    fn merge_converges_across_two_replicas() {
        let mut a = new_doc(Algorithm::YjsMod);
        let mut b = new_doc(Algorithm::YjsMod);
        local_insert(&mut a, "a", 0, b'a').unwrap();
        local_insert(&mut b, "b", 0, b'b').unwrap();
        merge_into(&mut a, &b).unwrap();
        merge_into(&mut b, &a).unwrap();
        assert_eq!(get_array(&a), get_array(&b));
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = new_doc(Algorithm::YjsMod);
        let mut b = new_doc(Algorithm::YjsMod);
        local_insert(&mut b, "b", 0, b'b').unwrap();
        merge_into(&mut a, &b).unwrap();
        let before = get_array(&a);
        merge_into(&mut a, &b).unwrap();
        assert_eq!(get_array(&a), before);
    }

    #[test]
    #[should_panic(expected = "does not match document algorithm")]
    fn integrate_panics_on_algorithm_mismatch() {
        let mut doc = new_doc(Algorithm::YjsMod);
        let _ = integrate(
            &mut doc,
            Op::Automerge { id: Id::new("a", 0), content: Some(b'x'), origin_left: None, origin_right: None, seq: 1 },
            None,
        );
    }
}

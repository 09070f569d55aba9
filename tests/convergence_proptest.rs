//! Property-based convergence testing: the critical strong-eventual-
//! consistency property.
//!
//! A random script of local inserts across a handful of agents is played
//! against one reference document to harvest a causally-valid operation
//! multiset. That multiset is then rescheduled into two independently
//! randomised orders — each still respecting per-agent seq order and
//! every operation's causal-readiness precondition — and fed to two
//! fresh documents. Strong eventual consistency says `get_array` must
//! agree no matter which of the two orders won.

use std::collections::{HashMap, HashSet, VecDeque};

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use listcrdt::algorithms::{Algorithm, Doc, Op};
use listcrdt::id::Id;
use listcrdt::item;
use listcrdt::ops::{get_array, integrate, local_insert, new_doc};

const AGENTS: &[&str] = &["alice", "bob", "carol"];

const ALL: &[Algorithm] = &[
    Algorithm::YjsActual,
    Algorithm::YjsMod,
    Algorithm::Automerge,
    Algorithm::Sync9,
    Algorithm::DoubleRga1,
    Algorithm::DoubleRga2,
    Algorithm::DoubleRgaEquivalent,
];

/// One step of the generation script: which agent inserts, where
/// (as a percentage of the document's visible length at that point),
/// and what byte.
#[derive(Clone, Debug)]
struct Step {
    agent_idx: usize,
    pos_pct: f64,
    content: u8,
}

fn arbitrary_step() -> impl Strategy<Value = Step> {
    return (0..AGENTS.len(), 0.0..=1.0f64, b'a'..=b'z')
        .prop_map(|(agent_idx, pos_pct, content)| Step { agent_idx, pos_pct, content });
}

fn find_plain<Aux>(doc: &item::Doc<Aux>, id: &Id) -> &item::Item<Aux> {
    return doc.content.iter().find(|it| &it.id == id).expect("generated id must be present");
}

/// Recovers the `Op` that produced `id`, reading back whatever extra
/// field its algorithm attaches (Automerge's `seq`, Sync9's
/// `insert_after`) so the harvested multiset can be fed to `integrate`
/// directly in any order.
fn op_for(doc: &Doc, id: &Id) -> Op {
    return match doc {
        Doc::YjsActual(d) | Doc::YjsMod(d) | Doc::DoubleRgaEquivalent(d) => {
            let it = find_plain(d, id);
            Op::Plain { id: it.id.clone(), content: it.content, origin_left: it.origin_left.clone(), origin_right: it.origin_right.clone() }
        }
        Doc::DoubleRga1(d) => {
            let it = find_plain(d, id);
            Op::Plain { id: it.id.clone(), content: it.content, origin_left: it.origin_left.clone(), origin_right: it.origin_right.clone() }
        }
        Doc::DoubleRga2(d) => {
            let it = find_plain(d, id);
            Op::Plain { id: it.id.clone(), content: it.content, origin_left: it.origin_left.clone(), origin_right: it.origin_right.clone() }
        }
        Doc::Automerge(d) => {
            let it = find_plain(d, id);
            Op::Automerge {
                id: it.id.clone(),
                content: it.content,
                origin_left: it.origin_left.clone(),
                origin_right: it.origin_right.clone(),
                seq: it.aux.seq,
            }
        }
        Doc::Sync9(d) => {
            // ids can appear twice after a split (sentinel + content-bearing
            // end); the content-bearing occurrence is always the one this
            // harvest cares about, since that's the item the insertion
            // itself produced.
            let it = d.content.iter().find(|it| &it.id == id && it.content.is_some()).expect("generated id must be present");
            Op::Sync9 {
                id: it.id.clone(),
                content: it.content,
                origin_left: it.origin_left.clone(),
                origin_right: it.origin_right.clone(),
                insert_after: it.aux.insert_after,
            }
        }
    };
}

/// Plays `steps` against a fresh document under `alg`, harvesting the
/// operation multiset in generation order (itself one valid, causally
/// consistent permutation).
fn harvest(alg: Algorithm, steps: &[Step]) -> Vec<Op> {
    let mut doc = new_doc(alg);
    let mut ops = Vec::with_capacity(steps.len());
    for step in steps {
        let len = get_array(&doc).len();
        let pos = ((step.pos_pct * len as f64) as usize).min(len);
        let id = local_insert(&mut doc, AGENTS[step.agent_idx], pos, step.content).unwrap();
        ops.push(op_for(&doc, &id));
    }
    return ops;
}

/// Reschedules `ops` into a random order that still respects each
/// agent's own seq order and every op's causal-readiness precondition
/// — exactly the set of admissible interleavings.
fn random_valid_permutation(ops: &[Op], rng: &mut impl Rng) -> Vec<Op> {
    let mut by_agent: HashMap<&str, VecDeque<Op>> = HashMap::new();
    for op in ops {
        by_agent.entry(op.id().agent.as_str()).or_default().push_back(op.clone());
    }
    let mut placed: HashSet<Id> = HashSet::new();
    let mut result = Vec::with_capacity(ops.len());

    loop {
        let ready: Vec<&str> = by_agent
            .iter()
            .filter(|(_, q)| {
                q.front().is_some_and(|op| {
                    op.origin_left().map_or(true, |id| placed.contains(id))
                        && op.origin_right().map_or(true, |id| placed.contains(id))
                })
            })
            .map(|(a, _)| *a)
            .collect();
        if ready.is_empty() {
            break;
        }
        let chosen = ready[rng.gen_range(0..ready.len())];
        let op = by_agent.get_mut(chosen).unwrap().pop_front().unwrap();
        placed.insert(op.id().clone());
        result.push(op);
    }
    return result;
}

fn feed(alg: Algorithm, ops: &[Op]) -> Vec<u8> {
    let mut doc = new_doc(alg);
    for op in ops {
        integrate(&mut doc, op.clone(), None).unwrap();
    }
    return get_array(&doc);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Two independently randomised, causally-admissible schedules of
    /// the same operation multiset converge to the same visible array,
    /// under every algorithm.
    #[test]
    fn convergence_across_random_schedules(
        steps in prop::collection::vec(arbitrary_step(), 1..16),
        seed_a in any::<u64>(),
        seed_b in any::<u64>(),
    ) {
        for &alg in ALL {
            let ops = harvest(alg, &steps);
            let mut rng_a = SmallRng::seed_from_u64(seed_a);
            let mut rng_b = SmallRng::seed_from_u64(seed_b);
            let perm_a = random_valid_permutation(&ops, &mut rng_a);
            let perm_b = random_valid_permutation(&ops, &mut rng_b);
            prop_assert_eq!(perm_a.len(), ops.len(), "{alg:?} schedule a dropped ops");
            prop_assert_eq!(perm_b.len(), ops.len(), "{alg:?} schedule b dropped ops");

            let array_a = feed(alg, &perm_a);
            let array_b = feed(alg, &perm_b);
            prop_assert_eq!(array_a, array_b, "{alg:?} diverged across schedules");
        }
    }

    /// Generation order itself is one admissible schedule; replaying it
    /// through raw `integrate` must reproduce exactly what `local_insert`
    /// produced live.
    #[test]
    fn generation_order_round_trips(steps in prop::collection::vec(arbitrary_step(), 1..16)) {
        for &alg in ALL {
            let mut live = new_doc(alg);
            let mut ops = Vec::new();
            for step in &steps {
                let len = get_array(&live).len();
                let pos = ((step.pos_pct * len as f64) as usize).min(len);
                let id = local_insert(&mut live, AGENTS[step.agent_idx], pos, step.content).unwrap();
                ops.push(op_for(&live, &id));
            }
            let replayed = feed(alg, &ops);
            prop_assert_eq!(get_array(&live), replayed, "{alg:?}");
        }
    }
}

//! Randomised fuzzing: a single-document driver that checks invariants
//! after every event, and a multi-document driver that checks
//! convergence after every merge.
//!
//! Deletions are local-only and `merge_into` does not replicate them,
//! so the multi-document driver restricts itself to insertions when
//! comparing replicas.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use listcrdt::algorithms::Algorithm;
use listcrdt::ops::{get_array, local_delete, local_insert, merge_into, new_doc};

const ALL: &[Algorithm] = &[
    Algorithm::YjsActual,
    Algorithm::YjsMod,
    Algorithm::Automerge,
    Algorithm::Sync9,
    Algorithm::DoubleRga1,
    Algorithm::DoubleRga2,
    Algorithm::DoubleRgaEquivalent,
];

const STEPS: usize = 2000;

/// Single-document fuzz: one replica, one agent, a long random mix of
/// inserts and deletes. After every event, `length` must equal the
/// count of visible items and the visible array must never grow on a
/// delete nor shrink on an insert.
#[test]
fn single_document_invariants_hold_under_fuzzing() {
    for &alg in ALL {
        let mut rng = SmallRng::seed_from_u64(0xC0FFEE ^ alg as u64);
        let mut doc = new_doc(alg);

        for _ in 0..STEPS {
            let len = get_array(&doc).len();
            let before = len;
            if len == 0 || rng.gen_bool(0.75) {
                let pos = rng.gen_range(0..=len);
                let content = rng.gen_range(b'a'..=b'z');
                local_insert(&mut doc, "solo", pos, content).unwrap();
                assert_eq!(get_array(&doc).len(), before + 1, "{alg:?} insert shrank the document");
            } else {
                let pos = rng.gen_range(0..len);
                local_delete(&mut doc, "solo", pos).unwrap();
                assert_eq!(get_array(&doc).len(), before - 1, "{alg:?} delete grew the document");
            }
        }
    }
}

/// Multi-document fuzz: several replicas independently insert, merging
/// pairwise at random intervals. Every replica must agree with every
/// other replica's visible array once all pairwise merges have caught
/// up — strong eventual consistency exercised across thousands of
/// events rather than the handful of literal scenarios in
/// tests/conformance.rs.
#[test]
fn multi_document_convergence_holds_under_fuzzing() {
    const REPLICAS: usize = 4;
    let agents = ["r0", "r1", "r2", "r3"];

    for &alg in ALL {
        let mut rng = SmallRng::seed_from_u64(0xC0FFEE ^ (alg as u64).wrapping_mul(31));
        let mut docs: Vec<_> = (0..REPLICAS).map(|_| new_doc(alg)).collect();

        for step in 0..STEPS {
            let r = rng.gen_range(0..REPLICAS);
            let len = get_array(&docs[r]).len();
            let pos = rng.gen_range(0..=len);
            let content = rng.gen_range(b'a'..=b'z');
            local_insert(&mut docs[r], agents[r], pos, content).unwrap();

            // Merge a random pair every few steps so replicas stay
            // partially in sync without ever fully converging until the
            // final all-pairs pass below.
            if step % 7 == 0 {
                let a = rng.gen_range(0..REPLICAS);
                let b = rng.gen_range(0..REPLICAS);
                if a != b {
                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    let (left, right) = docs.split_at_mut(hi);
                    merge_into(&mut left[lo], &right[0]).unwrap();
                }
            }
        }

        // Converge fully: repeated all-pairs merge passes until every
        // replica has seen every other replica's operations.
        for _ in 0..REPLICAS {
            for i in 0..REPLICAS {
                for j in 0..REPLICAS {
                    if i == j {
                        continue;
                    }
                    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
                    let (left, right) = docs.split_at_mut(hi);
                    merge_into(&mut left[lo], &right[0]).unwrap();
                }
            }
        }

        let reference = get_array(&docs[0]);
        for (i, doc) in docs.iter().enumerate().skip(1) {
            assert_eq!(get_array(doc), reference, "{alg:?} replica {i} diverged from replica 0");
        }
    }
}

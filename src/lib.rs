
//! A comparative reference library of list-CRDT integration algorithms.
//!
//! Seven placement rules share one data model and one merge driver:
//! *YjsActual*, *YjsMod*, *Automerge*, *Sync9*, *DoubleRGA-1*,
//! *DoubleRGA-2*, and a *DoubleRGA-equivalent* re-expression of YjsMod.
//! Pick one at construction time; every document converges under its
//! own rule regardless of the order operations are integrated in, as
//! long as each agent's own operations are delivered in sequence.
//!
//! # Quick start
//!
//! ```
//! use listcrdt::algorithms::Algorithm;
//! use listcrdt::ops::{get_array, local_insert, merge_into, new_doc};
//!
//! let mut a = new_doc(Algorithm::YjsMod);
//! let mut b = new_doc(Algorithm::YjsMod);
//!
//! local_insert(&mut a, "alice", 0, b'h').unwrap();
//! local_insert(&mut a, "alice", 1, b'i').unwrap();
//! local_insert(&mut b, "bob", 0, b'!').unwrap();
//!
//! merge_into(&mut a, &b).unwrap();
//! merge_into(&mut b, &a).unwrap();
//! assert_eq!(get_array(&a), get_array(&b));
//! ```

pub mod algorithms;
pub mod error;
pub mod id;
pub mod item;
pub mod ops;
pub mod print;

//! An in-memory ordered set backed by a 2-3 tree.
//!
//! ```
//! use two_three_set::TwoThreeSet;
//!
//! let mut set: TwoThreeSet<i32> = vec![10, 15, 4, 20, 8].into_iter().collect();
//! assert!(!set.insert(15).1);
//! assert_eq!(set.erase(&4), 1);
//! assert_eq!(set.iter().cloned().collect::<Vec<_>>(), vec![8, 10, 15, 20]);
//! ```
//!
//! Values can be ordered by any comparator given at construction:
//!
//! ```
//! use two_three_set::TwoThreeSet;
//!
//! let mut set = TwoThreeSet::with_comparator(|a: &i32, b: &i32| b.cmp(a));
//! set.extend(vec![1, 3, 2]);
//! assert_eq!(set.iter().cloned().collect::<Vec<_>>(), vec![3, 2, 1]);
//! ```


mod arena;
mod compare;
mod error;
mod two_three;

pub use compare::{Comparator, Natural};
pub use error::{Error, Result};
pub use two_three::{Cursor, Iter, NodeRef, TwoThreeSet};

//! # Rankset
//!
//! A bounded-score ranking index: an in-memory leaderboard structure for
//! workloads where the score universe is a small integer range known up
//! front, reads are dominated by rank and range queries, and many members
//! share a score.
//!
//! The index keeps a binary decomposition of the score range with member
//! counts on every node, a lexicographically sorted bucket per score, and a
//! linked list of the occupied scores in descending order. Rank queries walk
//! the tree in O(log U); range queries seek once and then stream, O(log U + k).
//!
//! ```
//! use rankset::RankSet;
//!
//! let mut board = RankSet::new(0, 1000)?;
//! board.add("alice", 123);
//! board.add("bob", 734);
//! board.add("charlie", 123);
//!
//! assert_eq!(board.rev_rank("bob"), Some(0));
//! assert_eq!(board.range(0, -1), ["alice", "charlie", "bob"]);
//! assert_eq!(board.pop_max(), Some(("bob".to_string(), 734)));
//! # Ok::<(), rankset::RankSetError>(())
//! ```

pub mod error;
pub mod index;

mod list;
mod tree;

pub use error::{RankSetError, RankSetResult};
pub use index::{Iter, Options, RankSet};

//! The ranking index.
//!
//! [`RankSet`] composes the score tree, the occupied-leaf list, and the
//! member map into a leaderboard structure: distinct string members tagged
//! with bounded integer scores, ranked in ascending score order with
//! byte-wise lexicographic tie-breaking. Rank and count queries walk the
//! tree; range queries seek through the tree once and then stream along the
//! list, so they cost O(log U + k) for k results over a score universe of
//! size U.

use crate::error::{RankSetError, RankSetResult};
use crate::list::{ElemId, LeafList};
use crate::tree::Tree;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Tuning knobs for a [`RankSet`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Below this many stored members, linking a newly occupied leaf into
    /// the ordered list scans from the head instead of walking the tree.
    /// Purely a performance trade; any value preserves ordering.
    pub linear_scan_threshold: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            linear_scan_threshold: 10,
        }
    }
}

/// A bounded-score ranking index.
///
/// Members are distinct strings; scores are integers in the closed range
/// fixed at construction. Equal scores are ordered by byte-wise string
/// comparison, ascending.
#[derive(Clone)]
pub struct RankSet {
    tree: Tree,
    list: LeafList,
    members: HashMap<String, usize>,
    card: usize,
    min_score: i64,
    max_score: i64,
    linear_scan_threshold: usize,
}

impl RankSet {
    /// Create an index over the score range `[low, high]`.
    ///
    /// Both bounds must be non-negative and `low` must not exceed `high`.
    /// The full tree over the range is allocated here; the range never
    /// changes afterwards.
    pub fn new(low: i64, high: i64) -> RankSetResult<RankSet> {
        Self::with_options(low, high, Options::default())
    }

    /// Like [`RankSet::new`], with explicit [`Options`].
    pub fn with_options(low: i64, high: i64, options: Options) -> RankSetResult<RankSet> {
        if low < 0 || high < 0 {
            return Err(RankSetError::NegativeBound { low, high });
        }
        if low > high {
            return Err(RankSetError::InvertedRange { low, high });
        }
        Ok(RankSet {
            tree: Tree::new(low, high),
            list: LeafList::default(),
            members: HashMap::new(),
            card: 0,
            min_score: low,
            max_score: high,
            linear_scan_threshold: options.linear_scan_threshold,
        })
    }

    /// Lower bound of the score range.
    pub fn min_score(&self) -> i64 {
        self.min_score
    }

    /// Upper bound of the score range.
    pub fn max_score(&self) -> i64 {
        self.max_score
    }

    /// Number of stored members.
    pub fn card(&self) -> usize {
        self.card
    }

    pub fn is_empty(&self) -> bool {
        self.card == 0
    }

    /// Add a member with the given score. Returns `false` when the member is
    /// already present or the score is outside the range.
    pub fn add(&mut self, member: &str, score: i64) -> bool {
        if self.members.contains_key(member) {
            return false;
        }
        let Some(leaf) = self.tree.find(score) else {
            return false;
        };
        // Link before touching any count: both insertion strategies rely on
        // the pre-insert cardinality and subtree counts.
        if self.tree.elem(leaf).is_none() {
            self.link_leaf(leaf);
        }
        let bucket = self.tree.members_mut(leaf);
        let Err(pos) = bucket.binary_search_by(|m| m.as_str().cmp(member)) else {
            panic!("member {member:?} in bucket but not in map");
        };
        bucket.insert(pos, member.to_owned());
        self.members.insert(member.to_owned(), leaf);
        self.card += 1;
        self.tree.update_counts(leaf, 1);
        trace!(member, score, "member added");
        true
    }

    /// Remove the given members. Returns how many were actually present.
    pub fn remove<'a, I>(&mut self, members: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut removed = 0;
        for member in members {
            if self.remove_one(member) {
                removed += 1;
            }
        }
        removed
    }

    /// Rank of a member in ascending score order, 0-based: the member with
    /// the lowest score (and lexicographically first among equals) has rank 0.
    pub fn rank(&self, member: &str) -> Option<usize> {
        let (leaf, pos) = self.locate(member)?;
        Some(self.tree.left_area_count(leaf) + pos)
    }

    /// Rank of a member in descending score order, 0-based: the member with
    /// the highest score has rank 0. This is the exact reversal of
    /// [`RankSet::rank`] (`rev_rank(m) == card() - 1 - rank(m)`), so among
    /// equal scores the lexicographically last member comes first. Note
    /// that [`RankSet::rev_range`] keeps ties lexicographically ascending.
    pub fn rev_rank(&self, member: &str) -> Option<usize> {
        let (leaf, pos) = self.locate(member)?;
        let offset = self.tree.count(leaf) - pos - 1;
        Some(self.tree.right_area_count(leaf) + offset)
    }

    /// Score of a member, if present.
    pub fn score(&self, member: &str) -> Option<i64> {
        let &leaf = self.members.get(member)?;
        Some(self.tree.low(leaf))
    }

    /// Number of members with a score in `[min, max]`, after clamping the
    /// bounds to the score range. An empty intersection counts zero.
    pub fn count(&self, min: i64, max: i64) -> usize {
        let min = min.max(self.min_score);
        let max = max.min(self.max_score);
        if min > max {
            return 0;
        }
        let left = self.leaf_at(min);
        let right = self.leaf_at(max);
        let below = self.tree.left_area_count(left);
        let through = self.tree.left_area_count(right) + self.tree.count(right);
        through - below
    }

    /// Members with ranks in `[start, end]`, ascending. Negative indices
    /// count from the end, `-1` being the last rank.
    pub fn range(&self, start: i64, end: i64) -> Vec<String> {
        self.ranked(start, end, false, |member, _| member.to_owned())
    }

    /// Members with ranks in `[start, end]` of the descending order.
    pub fn rev_range(&self, start: i64, end: i64) -> Vec<String> {
        self.ranked(start, end, true, |member, _| member.to_owned())
    }

    /// [`RankSet::range`], with each member's score.
    pub fn range_with_score(&self, start: i64, end: i64) -> Vec<(String, i64)> {
        self.ranked(start, end, false, |member, score| {
            (member.to_owned(), score)
        })
    }

    /// [`RankSet::rev_range`], with each member's score.
    pub fn rev_range_with_score(&self, start: i64, end: i64) -> Vec<(String, i64)> {
        self.ranked(start, end, true, |member, score| (member.to_owned(), score))
    }

    /// Members with scores in `[min, max]`, ascending. Bounds are clamped to
    /// the score range.
    pub fn range_by_score(&self, min: i64, max: i64) -> Vec<(String, i64)> {
        self.by_score(min, max, false)
    }

    /// Members with scores in `[min, max]`, descending.
    pub fn rev_range_by_score(&self, min: i64, max: i64) -> Vec<(String, i64)> {
        self.by_score(min, max, true)
    }

    /// Remove and return the highest-ranked member: highest score, and the
    /// lexicographically last of its bucket.
    pub fn pop_max(&mut self) -> Option<(String, i64)> {
        let leaf = self.list.head().map(|e| self.list.leaf(e))?;
        Some(self.take_lex_last(leaf))
    }

    /// Remove and return a member with the lowest score. Among equal lowest
    /// scores this takes the lexicographically *last* member: the same
    /// in-bucket position [`RankSet::pop_max`] uses, applied at the tail.
    pub fn pop_min(&mut self) -> Option<(String, i64)> {
        let leaf = self.list.back().map(|e| self.list.leaf(e))?;
        Some(self.take_lex_last(leaf))
    }

    /// Pop up to `n` members from the high end, best first.
    pub fn pop_max_n(&mut self, n: usize) -> Vec<(String, i64)> {
        let n = n.min(self.card);
        (0..n).map_while(|_| self.pop_max()).collect()
    }

    /// Pop up to `n` members from the low end, worst first.
    pub fn pop_min_n(&mut self, n: usize) -> Vec<(String, i64)> {
        let n = n.min(self.card);
        (0..n).map_while(|_| self.pop_min()).collect()
    }

    /// Add `delta` to a member's score, inserting at `delta` when absent.
    /// Returns the resulting score.
    ///
    /// When the resulting score falls outside the range the member is
    /// removed from the index and `None` is returned.
    pub fn increment_by(&mut self, member: &str, delta: i64) -> Option<i64> {
        let mut score = delta;
        if let Some(&leaf) = self.members.get(member) {
            score += self.tree.low(leaf);
            self.remove_one(member);
        }
        if self.add(member, score) { Some(score) } else { None }
    }

    /// Re-score a member. `insert` controls only whether an *absent* member
    /// is created; an existing member is always moved to `score`. Returns
    /// whether an update took place.
    ///
    /// An existing member updated to an out-of-range score is removed, and
    /// the call still reports `true`.
    pub fn update_score(&mut self, member: &str, score: i64, insert: bool) -> bool {
        let existed = self.remove_one(member);
        if existed || insert {
            self.add(member, score);
            true
        } else {
            false
        }
    }

    /// Iterate members in descending score order, lexicographically
    /// ascending within a score. The index cannot be mutated while the
    /// iterator is live.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            set: self,
            leaf: self.list.head().map(|e| self.list.leaf(e)),
            pos: 0,
        }
    }

    /// Leaf for an in-range score. Only call with clamped scores.
    fn leaf_at(&self, score: i64) -> usize {
        self.tree
            .find(score)
            .expect("clamped score outside the tree")
    }

    /// Member's leaf and its position inside the leaf bucket.
    fn locate(&self, member: &str) -> Option<(usize, usize)> {
        let &leaf = self.members.get(member)?;
        let pos = self
            .tree
            .members(leaf)
            .binary_search_by(|m| m.as_str().cmp(member))
            .unwrap_or_else(|_| panic!("member {member:?} missing from its bucket"));
        Some((leaf, pos))
    }

    fn remove_one(&mut self, member: &str) -> bool {
        let Some(&leaf) = self.members.get(member) else {
            return false;
        };
        let bucket = self.tree.members_mut(leaf);
        let Ok(pos) = bucket.binary_search_by(|m| m.as_str().cmp(member)) else {
            panic!("member {member:?} missing from its bucket");
        };
        bucket.remove(pos);
        // The leaf's count still includes this member, which is what the
        // next-greater walk needs to find the unlink mark.
        if self.tree.count(leaf) == 1 {
            let mark = self.next_greater_mark(leaf);
            self.list.remove_next(mark);
            self.tree.set_elem(leaf, None);
        }
        self.members.remove(member);
        self.card -= 1;
        self.tree.update_counts(leaf, -1);
        trace!(member, "member removed");
        true
    }

    /// Wire a newly occupied leaf into the list, keeping descending score
    /// order. Must run before the leaf's counts are incremented.
    fn link_leaf(&mut self, leaf: usize) {
        let score = self.tree.low(leaf);
        let elem = if self.card == 0 {
            self.list.push_front(leaf)
        } else if self.card < self.linear_scan_threshold {
            // Short list: walk from the head and remember the last leaf
            // scoring at least as high.
            let mut target = None;
            let mut cursor = self.list.head();
            while let Some(e) = cursor {
                if self.tree.low(self.list.leaf(e)) >= score {
                    target = Some(e);
                } else {
                    break;
                }
                cursor = self.list.next(e);
            }
            match target {
                Some(mark) => self.list.insert_after(leaf, mark),
                None => self.list.push_front(leaf),
            }
        } else {
            match self.next_greater_mark(leaf) {
                Some(mark) => self.list.insert_after(leaf, mark),
                None => self.list.push_front(leaf),
            }
        };
        self.tree.set_elem(leaf, Some(elem));
    }

    /// List element of the closest higher-scoring occupied leaf; `None`
    /// puts the position at the front of the list.
    fn next_greater_mark(&self, leaf: usize) -> Option<ElemId> {
        let greater = self.tree.next_greater_leaf(leaf)?;
        Some(
            self.tree
                .elem(greater)
                .expect("occupied leaf missing its list slot"),
        )
    }

    /// Shared body of the rank-range operations.
    fn ranked<T>(
        &self,
        start: i64,
        end: i64,
        reverse: bool,
        take: impl FnMut(&str, i64) -> T,
    ) -> Vec<T> {
        let Some((start, len)) = self.clip_rank_window(start, end) else {
            return Vec::new();
        };
        let end = start + len - 1;
        // The seek always enters from the high-score side.
        let skip = if reverse { start } else { self.card - end - 1 };
        let (leaf, leftover) = self.tree.seek_from_right(skip);
        let pos = if reverse {
            leftover
        } else {
            self.tree.count(leaf) - leftover - 1
        };
        self.collect(leaf, pos, len, reverse, take)
    }

    /// Shared body of the score-range operations.
    fn by_score(&self, min: i64, max: i64, reverse: bool) -> Vec<(String, i64)> {
        let min = min.max(self.min_score);
        let max = max.min(self.max_score);
        if min > max {
            return Vec::new();
        }
        let mut leaf = self.leaf_at(max);
        if self.tree.count(leaf) == 0 {
            match self.tree.next_smaller_leaf(leaf) {
                Some(lower) => leaf = lower,
                None => return Vec::new(),
            }
        }
        let len = self.count(min, max);
        if len == 0 {
            return Vec::new();
        }
        let pos = if reverse { 0 } else { self.tree.count(leaf) - 1 };
        self.collect(leaf, pos, len, reverse, |member, score| {
            (member.to_owned(), score)
        })
    }

    /// Drive the cursor `len` steps from `(leaf, pos)`. The cursor emits
    /// high-to-low, so ascending callers get the walk reversed.
    fn collect<T>(
        &self,
        leaf: usize,
        pos: usize,
        len: usize,
        reverse: bool,
        mut take: impl FnMut(&str, i64) -> T,
    ) -> Vec<T> {
        let mut cursor = Cursor {
            set: self,
            leaf,
            pos,
            reverse,
        };
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(take(cursor.member(), cursor.score()));
            cursor.advance();
        }
        if !reverse {
            out.reverse();
        }
        out
    }

    /// Clamp a possibly-negative rank window to `[0, card)`. Returns the
    /// start rank and window length, or `None` for an empty window.
    fn clip_rank_window(&self, mut start: i64, mut end: i64) -> Option<(usize, usize)> {
        let card = self.card as i64;
        if start < 0 {
            start = (start + card).max(0);
        }
        if end < 0 {
            end += card;
        }
        if start > end || start >= card {
            return None;
        }
        if end >= card {
            end = card - 1;
        }
        Some((start as usize, (end - start + 1) as usize))
    }

    fn take_lex_last(&mut self, leaf: usize) -> (String, i64) {
        let member = self
            .tree
            .members(leaf)
            .last()
            .cloned()
            .expect("listed leaf has an empty bucket");
        let score = self.tree.low(leaf);
        self.remove_one(&member);
        (member, score)
    }
}

impl fmt::Debug for RankSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankSet")
            .field("score_range", &(self.min_score..=self.max_score))
            .field("card", &self.card)
            .field("occupied_leaves", &self.list.len())
            .finish_non_exhaustive()
    }
}

/// Walks the occupied-leaf list from the head: descending scores, ascending
/// lexicographic order inside each bucket.
struct Cursor<'a> {
    set: &'a RankSet,
    leaf: usize,
    pos: usize,
    reverse: bool,
}

impl Cursor<'_> {
    fn member(&self) -> &str {
        &self.set.tree.members(self.leaf)[self.pos]
    }

    fn score(&self) -> i64 {
        self.set.tree.low(self.leaf)
    }

    /// Step to the next emission position. Past the last position this is a
    /// no-op; callers bound their step count beforehand.
    fn advance(&mut self) {
        if self.reverse {
            if self.pos + 1 < self.set.tree.count(self.leaf) {
                self.pos += 1;
            } else if let Some(leaf) = self.next_leaf() {
                self.leaf = leaf;
                self.pos = 0;
            }
        } else if self.pos > 0 {
            self.pos -= 1;
        } else if let Some(leaf) = self.next_leaf() {
            self.leaf = leaf;
            self.pos = self.set.tree.count(leaf) - 1;
        }
    }

    fn next_leaf(&self) -> Option<usize> {
        let elem = self
            .set
            .tree
            .elem(self.leaf)
            .expect("cursor on a leaf outside the list");
        self.set.list.next(elem).map(|e| self.set.list.leaf(e))
    }
}

/// Iterator returned by [`RankSet::iter`].
pub struct Iter<'a> {
    set: &'a RankSet,
    leaf: Option<usize>,
    pos: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, i64);

    fn next(&mut self) -> Option<Self::Item> {
        let set = self.set;
        let leaf = self.leaf?;
        let bucket = set.tree.members(leaf);
        let item = (bucket[self.pos].as_str(), set.tree.low(leaf));
        if self.pos + 1 < bucket.len() {
            self.pos += 1;
        } else {
            self.leaf = set
                .tree
                .elem(leaf)
                .and_then(|e| set.list.next(e))
                .map(|e| set.list.leaf(e));
            self.pos = 0;
        }
        Some(item)
    }
}

#[cfg(test)]
impl RankSet {
    /// Structural audit of every cross-component invariant: count sums,
    /// bucket sort, list and occupancy agreement, list order, map consistency.
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashSet;

        let mut occupied = HashSet::new();
        let mut leaf_total = 0;
        let mut expected_low = self.min_score;
        for id in 0..self.tree.len() {
            match self.tree.children(id) {
                Some((left, right)) => {
                    assert_eq!(
                        self.tree.count(id),
                        self.tree.count(left) + self.tree.count(right),
                        "internal count out of sync at [{}, {}]",
                        self.tree.low(id),
                        self.tree.high(id),
                    );
                    assert!(self.tree.members(id).is_empty());
                    assert!(self.tree.elem(id).is_none());
                }
                None => {
                    let low = self.tree.low(id);
                    assert_eq!(low, self.tree.high(id));
                    assert_eq!(low, expected_low, "leaf sweep out of order");
                    expected_low += 1;
                    let bucket = self.tree.members(id);
                    assert_eq!(self.tree.count(id), bucket.len());
                    for pair in bucket.windows(2) {
                        assert!(pair[0] < pair[1], "bucket at {low} not strictly sorted");
                    }
                    assert_eq!(
                        self.tree.elem(id).is_some(),
                        !bucket.is_empty(),
                        "leaf {low} occupancy disagrees with its list slot"
                    );
                    if !bucket.is_empty() {
                        occupied.insert(id);
                        leaf_total += bucket.len();
                    }
                }
            }
        }
        assert_eq!(expected_low, self.max_score + 1);

        let mut listed = HashSet::new();
        let mut previous: Option<i64> = None;
        let mut cursor = self.list.head();
        while let Some(e) = cursor {
            let leaf = self.list.leaf(e);
            assert_eq!(self.tree.elem(leaf), Some(e), "stale list slot");
            let low = self.tree.low(leaf);
            if let Some(p) = previous {
                assert!(p > low, "list not strictly descending: {p} then {low}");
            }
            previous = Some(low);
            listed.insert(leaf);
            cursor = self.list.next(e);
        }
        assert_eq!(listed, occupied, "list leaves differ from occupied leaves");
        assert_eq!(self.list.len(), listed.len());

        assert_eq!(self.card, self.members.len());
        assert_eq!(self.card, self.tree.count(crate::tree::ROOT));
        assert_eq!(self.card, leaf_total);
        for (member, &leaf) in &self.members {
            assert!(
                self.tree.members(leaf).binary_search(member).is_ok(),
                "mapped member {member:?} not in its bucket"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    fn listed_scores(set: &RankSet) -> Vec<i64> {
        set.list.leaves().map(|leaf| set.tree.low(leaf)).collect()
    }

    #[test]
    fn test_list_order_ascending_inserts() {
        let mut set = RankSet::new(1, 8).unwrap();
        for (member, score) in [("a", 1), ("b", 2), ("c", 3), ("d", 5), ("e", 8)] {
            set.add(member, score);
            set.check_invariants();
        }
        assert_eq!(listed_scores(&set), vec![8, 5, 3, 2, 1]);
    }

    #[test]
    fn test_list_order_mixed_inserts() {
        let mut set = RankSet::new(1, 8).unwrap();
        for (member, score) in [("a", 7), ("b", 8), ("c", 5), ("d", 1), ("f", 6), ("g", 5)] {
            set.add(member, score);
            set.check_invariants();
        }
        assert_eq!(listed_scores(&set), vec![8, 7, 6, 5, 1]);
    }

    #[test]
    fn test_tree_insertion_path_matches_linear() {
        // Threshold 0 forces every link through the tree walk; the default
        // starts with head scans. Both must produce the same ordering.
        let ops = [
            ("m", 14),
            ("c", 3),
            ("x", 60),
            ("d", 3),
            ("q", 33),
            ("a", 0),
            ("z", 63),
            ("n", 14),
            ("p", 27),
            ("b", 1),
            ("y", 61),
            ("e", 7),
        ];
        let mut linear = RankSet::new(0, 63).unwrap();
        let mut treewise = RankSet::with_options(
            0,
            63,
            Options {
                linear_scan_threshold: 0,
            },
        )
        .unwrap();
        for (member, score) in ops {
            assert!(linear.add(member, score));
            assert!(treewise.add(member, score));
            linear.check_invariants();
            treewise.check_invariants();
        }
        assert_eq!(linear.range(0, -1), treewise.range(0, -1));
        assert_eq!(listed_scores(&linear), listed_scores(&treewise));
    }

    #[test]
    fn test_relink_after_drain() {
        let mut set = RankSet::new(0, 15).unwrap();
        set.add("a", 4);
        set.add("b", 9);
        set.remove(["a"]);
        set.check_invariants();
        set.add("c", 4);
        set.check_invariants();
        assert_eq!(listed_scores(&set), vec![9, 4]);
        set.remove(["b", "c"]);
        set.check_invariants();
        assert!(set.is_empty());
        assert_eq!(set.list.len(), 0);
    }

    /// Reference model: ordered (score, member) pairs.
    #[derive(Default)]
    struct Model {
        entries: BTreeSet<(i64, String)>,
    }

    impl Model {
        fn ascending(&self) -> Vec<String> {
            self.entries.iter().map(|(_, m)| m.clone()).collect()
        }

        fn add(&mut self, member: &str, score: i64) -> bool {
            if self.entries.iter().any(|(_, m)| m == member) {
                return false;
            }
            self.entries.insert((score, member.to_owned()));
            true
        }

        fn remove(&mut self, member: &str) -> bool {
            let found = self
                .entries
                .iter()
                .find(|(_, m)| m == member)
                .cloned();
            match found {
                Some(entry) => {
                    self.entries.remove(&entry);
                    true
                }
                None => false,
            }
        }

        fn score(&self, member: &str) -> Option<i64> {
            self.entries
                .iter()
                .find(|(_, m)| m == member)
                .map(|&(s, _)| s)
        }
    }

    #[test]
    fn test_random_ops_match_model() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for &(low, high) in &[(0i64, 0i64), (1, 8), (0, 63), (3, 200)] {
            let mut set = RankSet::new(low, high).unwrap();
            let mut model = Model::default();
            for step in 0..1500 {
                let member = format!("m{:02}", rng.gen_range(0..40));
                match rng.gen_range(0..100) {
                    0..=44 => {
                        let score = rng.gen_range(low..=high);
                        assert_eq!(
                            set.add(&member, score),
                            model.add(&member, score),
                            "add {member} at {score} diverged"
                        );
                    }
                    45..=69 => {
                        assert_eq!(set.remove([member.as_str()]), model.remove(&member) as usize);
                    }
                    70..=84 => {
                        let delta = rng.gen_range(-3..=3);
                        let expected = model.score(&member).unwrap_or(0) + delta;
                        model.remove(&member);
                        let got = set.increment_by(&member, delta);
                        if (low..=high).contains(&expected) {
                            model.add(&member, expected);
                            assert_eq!(got, Some(expected));
                        } else {
                            // out-of-range result drops the member
                            assert_eq!(got, None);
                            assert_eq!(set.score(&member), None);
                        }
                    }
                    _ => {
                        let score = rng.gen_range(low..=high);
                        let insert = rng.gen_bool(0.5);
                        let existed = model.remove(&member);
                        assert_eq!(set.update_score(&member, score, insert), existed || insert);
                        if existed || insert {
                            model.add(&member, score);
                        }
                    }
                }
                if step % 50 == 0 {
                    set.check_invariants();
                }
            }
            set.check_invariants();
            assert_eq!(set.card(), model.entries.len());
            assert_eq!(set.range(0, -1), model.ascending());
        }
    }

    #[test]
    fn test_rank_round_trip_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut set = RankSet::new(0, 31).unwrap();
        for i in 0..120 {
            set.add(&format!("player-{i:03}"), rng.gen_range(0..=31));
        }
        let ascending = set.range(0, -1);
        let descending = set.rev_range(0, -1);
        assert_eq!(ascending.len(), set.card());
        for member in &ascending {
            let rank = set.rank(member).unwrap();
            assert_eq!(&ascending[rank], member);
            // rev_rank reverses the ascending order exactly; rev_range keeps
            // ties lexicographically ascending, so with equal scores the two
            // agree on score but not necessarily on member.
            let rev = set.rev_rank(member).unwrap();
            assert_eq!(rank + rev, set.card() - 1);
            assert_eq!(set.score(&descending[rev]), set.score(member));
        }
    }

    #[test]
    fn test_count_agrees_with_range_by_score() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut set = RankSet::new(0, 63).unwrap();
        for i in 0..200 {
            set.add(&format!("m{i}"), rng.gen_range(0..=63));
        }
        for _ in 0..200 {
            let a = rng.gen_range(-10..=70);
            let b = rng.gen_range(-10..=70);
            assert_eq!(
                set.count(a, b),
                set.range_by_score(a, b).len(),
                "count({a}, {b}) disagrees with range_by_score"
            );
        }
    }

    #[test]
    fn test_pop_bounds_random() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut set = RankSet::new(0, 100).unwrap();
        for i in 0..80 {
            set.add(&format!("m{i}"), rng.gen_range(0..=100));
        }
        while let Some((_, score)) = set.pop_max() {
            if let Some((_, top)) = set.iter().next() {
                assert!(score >= top, "pop_max returned {score} with {top} left");
            }
            set.check_invariants();
        }
        for i in 0..80 {
            set.add(&format!("m{i}"), rng.gen_range(0..=100));
        }
        while let Some((_, score)) = set.pop_min() {
            if let Some(lowest) = set.iter().map(|(_, s)| s).min() {
                assert!(score <= lowest, "pop_min returned {score} with {lowest} left");
            }
            set.check_invariants();
        }
    }

    #[test]
    fn test_remove_idempotent() {
        let mut set = RankSet::new(1, 8).unwrap();
        set.add("a", 3);
        assert_eq!(set.remove(["a"]), 1);
        set.check_invariants();
        assert_eq!(set.remove(["a"]), 0);
        set.check_invariants();
        assert_eq!(set.card(), 0);
    }

    #[test]
    fn test_debug_summary() {
        let mut set = RankSet::new(1, 8).unwrap();
        set.add("a", 3);
        set.add("b", 3);
        let repr = format!("{set:?}");
        assert!(repr.contains("card: 2"));
        assert!(repr.contains("occupied_leaves: 1"));
    }
}

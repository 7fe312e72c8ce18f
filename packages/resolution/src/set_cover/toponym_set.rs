use std::collections::BTreeSet;
use std::sync::Arc;

use geotag_gazetteer::GazetteerEntry;

use crate::candidate::CandidateEntry;
use crate::tree::{NodeId, Tree};

#[derive(Debug, Clone)]
struct SetNode {
    entry: Arc<GazetteerEntry>,
    /// lower-cased phrases this node stands for
    phrases: BTreeSet<String>,
}

impl SetNode {
    const fn new(entry: Arc<GazetteerEntry>) -> Self {
        Self {
            entry,
            phrases: BTreeSet::new(),
        }
    }
}

/// Candidates of one or more phrases grouped under a shared pivot
/// ancestor.
///
/// The tree holds the first candidate's chain from its root down to the
/// candidate. The pivot is the node just above that candidate; later
/// candidates with the same pivot hang directly below it. Only the pivot's
/// subtree counts towards the set's phrases and population.
#[derive(Debug, Clone)]
pub struct ToponymSet {
    tree: Tree<SetNode>,
    pivot: NodeId,
    cost: f64,
}

impl ToponymSet {
    /// Starts a set from `candidate`'s chain, tagging the deepest node with
    /// `phrase`.
    #[must_use]
    pub fn new(phrase: &str, candidate: &CandidateEntry) -> Self {
        let mut chain = candidate.root_to_leaf();
        let first = chain
            .next()
            .unwrap_or_else(|| Arc::clone(candidate.entry()));

        let mut tree = Tree::new();
        let root = tree.add_root(SetNode::new(first));
        let mut pivot = None;
        let mut last = root;

        for entry in chain {
            if entry.id == candidate.id() {
                pivot = Some(last);
            }
            last = tree.add_child(last, SetNode::new(entry));
        }

        tree.get_mut(last).phrases.insert(phrase.to_string());

        Self {
            tree,
            pivot: pivot.unwrap_or(root),
            cost: 1.0,
        }
    }

    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// The shared ancestor this set is keyed by.
    #[must_use]
    pub fn pivot_entry(&self) -> &Arc<GazetteerEntry> {
        &self.tree.get(self.pivot).entry
    }

    /// The record directly above the pivot in the chain, if any.
    #[must_use]
    pub fn pivot_parent_entry(&self) -> Option<&Arc<GazetteerEntry>> {
        self.tree
            .parent(self.pivot)
            .map(|parent| &self.tree.get(parent).entry)
    }

    /// Every phrase tagged within the pivot's subtree.
    #[must_use]
    pub fn phrases(&self) -> BTreeSet<String> {
        self.tree
            .preorder(self.pivot)
            .into_iter()
            .flat_map(|id| self.tree.get(id).phrases.iter().cloned())
            .collect()
    }

    /// Total population of the tagged nodes under the pivot.
    #[must_use]
    pub fn population(&self) -> u64 {
        self.tree
            .filter(self.pivot, |node| !node.phrases.is_empty())
            .into_iter()
            .map(|id| self.tree.get(id).entry.population)
            .sum()
    }

    /// Whether the pivot's subtree holds the record `id`.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        !self.tree.filter(self.pivot, |node| node.entry.id == id).is_empty()
    }

    /// Phrases tagged on the first node holding the record `id`.
    #[must_use]
    pub fn phrases_of(&self, id: u64) -> Option<&BTreeSet<String>> {
        self.tree
            .filter(self.pivot, |node| node.entry.id == id)
            .first()
            .map(|found| &self.tree.get(*found).phrases)
    }

    /// Hangs `candidate` below the pivot, tagged with `phrase`.
    pub fn add_child(&mut self, phrase: &str, candidate: &CandidateEntry) {
        let mut node = SetNode::new(Arc::clone(candidate.entry()));
        node.phrases.insert(phrase.to_string());
        self.tree.add_child(self.pivot, node);
    }

    /// Tags the pivot itself with `phrases`.
    pub fn tag_pivot(&mut self, phrases: impl IntoIterator<Item = String>) {
        self.tree.get_mut(self.pivot).phrases.extend(phrases);
    }

    /// The most populated record tagged with `phrase`. The first in
    /// preorder wins a tie.
    #[must_use]
    pub fn pick_populated(&self, phrase: &str) -> Option<&Arc<GazetteerEntry>> {
        let mut best: Option<&Arc<GazetteerEntry>> = None;
        for id in self.tree.filter(self.pivot, |node| node.phrases.contains(phrase)) {
            let entry = &self.tree.get(id).entry;
            if best.is_none_or(|b| entry.population > b.population) {
                best = Some(entry);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use geotag_gazetteer::EARTH_ID;

    use super::*;
    use crate::fixtures;

    #[test]
    fn pivot_is_the_node_above_the_candidate() {
        let set = ToponymSet::new("paris", &fixtures::candidate(fixtures::PARIS_TX));
        assert_eq!(set.pivot_entry().id, fixtures::TEXAS);
        assert_eq!(set.pivot_parent_entry().map(|e| e.id), Some(fixtures::USA));
        assert!(set.contains(fixtures::PARIS_TX));
        assert!(set.contains(fixtures::TEXAS));
        assert!(!set.contains(fixtures::USA));
    }

    #[test]
    fn country_pivots_on_earth() {
        let set = ToponymSet::new("france", &fixtures::candidate(fixtures::FRANCE));
        assert_eq!(set.pivot_entry().id, EARTH_ID);
        assert!(set.pivot_parent_entry().is_none());
        assert_eq!(set.phrases().into_iter().collect::<Vec<_>>(), vec!["france"]);
    }

    #[test]
    fn population_counts_tagged_nodes_only() {
        let mut set = ToponymSet::new("paris", &fixtures::candidate(fixtures::PARIS_TX));
        assert_eq!(set.population(), 25_171);
        set.tag_pivot(["texas".to_string()]);
        assert_eq!(set.population(), 25_171 + 22_875_689);
        assert_eq!(set.phrases().len(), 2);
    }

    #[test]
    fn pick_populated_prefers_larger_places() {
        let mut set = ToponymSet::new("springfield", &fixtures::candidate(fixtures::PARIS_TX));
        set.add_child("springfield", &fixtures::candidate(fixtures::LAMAR_COUNTY));
        assert_eq!(
            set.pick_populated("springfield").map(|e| e.id),
            Some(fixtures::LAMAR_COUNTY)
        );
        assert!(set.pick_populated("paris").is_none());
    }

    #[test]
    fn phrases_of_reads_a_node() {
        let set = ToponymSet::new("paris", &fixtures::candidate(fixtures::PARIS_FR));
        assert_eq!(
            set.phrases_of(fixtures::PARIS_FR).map(BTreeSet::len),
            Some(1)
        );
        assert_eq!(set.phrases_of(fixtures::FRANCE).map(BTreeSet::len), Some(0));
        assert!(set.phrases_of(fixtures::USA).is_none());
    }
}

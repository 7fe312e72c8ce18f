//! A gazetteer candidate together with its known ancestors.

use std::sync::Arc;

use geotag_gazetteer::{GazetteerEntry, Hierarchy, Level, earth};
use geotag_resolution_models::{TaggedMention, Toponym};

/// One interpretation of a phrase: a gazetteer record plus whichever of its
/// administrative ancestors could be resolved.
#[derive(Debug, Clone)]
pub struct CandidateEntry {
    entry: Arc<GazetteerEntry>,
    hierarchy: Hierarchy,
}

impl CandidateEntry {
    /// Wraps `entry` with its partial ancestor map.
    #[must_use]
    pub const fn new(entry: Arc<GazetteerEntry>, hierarchy: Hierarchy) -> Self {
        Self { entry, hierarchy }
    }

    /// The candidate record itself.
    #[must_use]
    pub const fn entry(&self) -> &Arc<GazetteerEntry> {
        &self.entry
    }

    /// The candidate's `GeoNames` id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.entry.id
    }

    /// Known ancestors keyed by level.
    #[must_use]
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// The record standing for this candidate at `level`: the ancestor at
    /// that level, or the candidate itself when it lives there.
    #[must_use]
    pub fn ancestor_at(&self, level: Level) -> Option<&Arc<GazetteerEntry>> {
        self.hierarchy
            .get(&level)
            .or_else(|| (self.entry.level == level).then_some(&self.entry))
    }

    /// The closest known record above the candidate's own level, or earth.
    #[must_use]
    pub fn nearest_parent(&self) -> Arc<GazetteerEntry> {
        let mut level = self.entry.level.parent();
        while let Some(current) = level {
            if let Some(found) = self.ancestor_at(current) {
                return Arc::clone(found);
            }
            level = current.parent();
        }
        earth()
    }

    /// The closest known record strictly below `from`.
    #[must_use]
    pub fn nearest_child(&self, from: Level) -> Option<&Arc<GazetteerEntry>> {
        let mut level = from.child();
        while let Some(current) = level {
            if let Some(found) = self.hierarchy.get(&current) {
                return Some(found);
            }
            if self.entry.level == current {
                return Some(&self.entry);
            }
            level = current.child();
        }
        None
    }

    /// Whether `target` is this candidate or one of its known ancestors.
    #[must_use]
    pub fn contains(&self, target: &GazetteerEntry) -> bool {
        self.entry.id == target.id || self.hierarchy.values().any(|a| a.id == target.id)
    }

    /// The highest known record of the chain. Countries hang directly off
    /// earth.
    fn root(&self) -> Arc<GazetteerEntry> {
        if self.entry.level == Level::Country {
            return earth();
        }
        Level::ALL
            .iter()
            .rev()
            .find_map(|level| self.ancestor_at(*level))
            .map_or_else(|| Arc::clone(&self.entry), Arc::clone)
    }

    /// Binds `mention` to this candidate, carrying its country and
    /// administrative divisions.
    #[must_use]
    pub fn toponym(&self, mention: &TaggedMention, score: f64) -> Toponym {
        Toponym::resolved(mention, &self.entry, score).with_ancestors(
            self.ancestor_at(Level::Country).map(Arc::as_ref),
            self.ancestor_at(Level::Admin1).map(Arc::as_ref),
            self.ancestor_at(Level::Admin2).map(Arc::as_ref),
        )
    }

    /// Walks the fullest known chain from the root down to the candidate.
    ///
    /// Each call starts a fresh walk.
    #[must_use]
    pub fn root_to_leaf(&self) -> RootToLeaf<'_> {
        RootToLeaf {
            candidate: self,
            next: Some(self.root()),
        }
    }
}

/// Iterator returned by [`CandidateEntry::root_to_leaf`].
pub struct RootToLeaf<'a> {
    candidate: &'a CandidateEntry,
    next: Option<Arc<GazetteerEntry>>,
}

impl Iterator for RootToLeaf<'_> {
    type Item = Arc<GazetteerEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.candidate.nearest_child(current.level).cloned();
        Some(current)
    }
}

use std::cmp::Reverse;

use crate::candidate::CandidateEntry;

/// Running arg-max over candidate scores. Equal scores, zero included,
/// accumulate; the most populated of the tied candidates wins.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    best: f64,
    tied: Vec<&'a CandidateEntry>,
}

impl<'a> Selection<'a> {
    pub fn offer(&mut self, score: f64, candidate: &'a CandidateEntry) {
        if (score - self.best).abs() < f64::EPSILON {
            self.tied.push(candidate);
        } else if score > self.best {
            self.best = score;
            self.tied = vec![candidate];
        }
    }

    /// The winning score and candidate. The earliest offered candidate wins
    /// a population tie.
    #[must_use]
    pub fn winner(&self) -> Option<(f64, &'a CandidateEntry)> {
        self.tied
            .iter()
            .min_by_key(|c| Reverse(c.entry().population))
            .map(|c| (self.best, *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn higher_score_replaces_ties() {
        let fr = fixtures::candidate(fixtures::PARIS_FR);
        let tx = fixtures::candidate(fixtures::PARIS_TX);
        let mut selection = Selection::default();
        selection.offer(0.2, &fr);
        selection.offer(0.7, &tx);
        assert_eq!(selection.winner().map(|(_, c)| c.id()), Some(fixtures::PARIS_TX));
    }

    #[test]
    fn zero_scores_tie_and_population_decides() {
        let ga = fixtures::candidate(fixtures::ATHENS_GA);
        let gr = fixtures::candidate(fixtures::ATHENS_GR);
        let mut selection = Selection::default();
        selection.offer(0.0, &ga);
        selection.offer(0.0, &gr);
        let (score, winner) = selection.winner().unwrap();
        assert_eq!(winner.id(), fixtures::ATHENS_GR);
        assert!(score.abs() < f64::EPSILON);
    }

    #[test]
    fn empty_selection_has_no_winner() {
        assert!(Selection::default().winner().is_none());
    }
}

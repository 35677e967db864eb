//! Choice among ranked candidates under a rotation policy.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::warn;

use banter_common::{Comment, RotationStrategy};

/// Floor applied to random-strategy weights. The weight formula reaches zero
/// for a comment used this instant; the floor keeps every remaining
/// candidate at non-zero probability.
const MIN_WEIGHT: f64 = 1e-3;

/// A store comment scored against the current post.
pub struct Candidate<'a> {
    pub comment: &'a Comment,
    pub category: &'a str,
    pub relevance: f64,
}

/// Outcome of a selection round.
pub struct Pick {
    /// Index into the candidate slice handed to `select`.
    pub index: usize,
    /// True when every candidate was over the reuse ceiling and the ceiling
    /// had to be ignored.
    pub ceiling_relaxed: bool,
}

pub struct RotationSelector {
    strategy: RotationStrategy,
    max_reuse: u32,
    decay_hours: f64,
}

impl RotationSelector {
    pub fn new(strategy: RotationStrategy, max_reuse: u32, decay_hours: f64) -> Self {
        Self {
            strategy,
            max_reuse,
            decay_hours,
        }
    }

    /// Pick one candidate, or `None` when the set is empty ("exhausted" —
    /// the facade's fallback trigger, not an error).
    pub fn select<R: Rng>(
        &self,
        candidates: &[Candidate<'_>],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<Pick> {
        if candidates.is_empty() {
            return None;
        }

        // Reuse-ceiling pre-filter, ignored rather than failing when it
        // would empty the set.
        let mut eligible: Vec<usize> = (0..candidates.len())
            .filter(|&i| candidates[i].comment.usage_count <= self.max_reuse)
            .collect();
        let mut ceiling_relaxed = false;
        if eligible.is_empty() {
            warn!(
                ceiling = self.max_reuse,
                candidates = candidates.len(),
                "Every candidate exceeds the reuse ceiling, ignoring it"
            );
            eligible = (0..candidates.len()).collect();
            ceiling_relaxed = true;
        }

        let index = match self.strategy {
            RotationStrategy::Random => self.weighted_draw(candidates, &eligible, now, rng),
            RotationStrategy::Sequential => oldest_first(candidates, &eligible),
        };

        Some(Pick {
            index,
            ceiling_relaxed,
        })
    }

    /// `exp(-hours_since_last_used / decay_hours)`; never-used comments get
    /// no penalty at all.
    fn recency_penalty(&self, last_used: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(last) = last_used else { return 0.0 };
        if self.decay_hours <= 0.0 {
            return 0.0;
        }
        let hours = (now - last).num_seconds().max(0) as f64 / 3600.0;
        (-hours / self.decay_hours).exp()
    }

    /// One draw through the cumulative weight distribution,
    /// `weight = (1 + relevance) * (1 - recency_penalty)`, floored.
    fn weighted_draw<R: Rng>(
        &self,
        candidates: &[Candidate<'_>],
        eligible: &[usize],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> usize {
        let weights: Vec<f64> = eligible
            .iter()
            .map(|&i| {
                let c = &candidates[i];
                let w = (1.0 + c.relevance)
                    * (1.0 - self.recency_penalty(c.comment.last_used, now));
                w.max(MIN_WEIGHT)
            })
            .collect();

        let total: f64 = weights.iter().sum();
        let mut x = rng.random_range(0.0..total);
        for (&index, weight) in eligible.iter().zip(&weights) {
            if x < *weight {
                return index;
            }
            x -= weight;
        }
        eligible[eligible.len() - 1]
    }
}

/// Sequential strategy: oldest `last_used` first (never-used before any
/// timestamp), ties broken by reference so the order is deterministic.
fn oldest_first(candidates: &[Candidate<'_>], eligible: &[usize]) -> usize {
    eligible
        .iter()
        .copied()
        .min_by(|&a, &b| {
            let ka = (candidates[a].comment.last_used, &candidates[a].comment.reference);
            let kb = (candidates[b].comment.last_used, &candidates[b].comment.reference);
            ka.cmp(&kb)
        })
        .unwrap_or(eligible[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn comment(reference: &str, usage_count: u32, last_used: Option<DateTime<Utc>>) -> Comment {
        Comment {
            reference: reference.to_string(),
            text: format!("text for {reference}"),
            tags: BTreeSet::new(),
            usage_count,
            last_used,
            created_at: Utc::now(),
        }
    }

    fn candidates<'a>(comments: &'a [Comment]) -> Vec<Candidate<'a>> {
        comments
            .iter()
            .map(|c| Candidate {
                comment: c,
                category: "general",
                relevance: 0.0,
            })
            .collect()
    }

    #[test]
    fn empty_set_is_exhausted() {
        let selector = RotationSelector::new(RotationStrategy::Random, 5, 24.0);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(selector.select(&[], Utc::now(), &mut rng).is_none());
    }

    #[test]
    fn random_never_picks_over_ceiling_while_under_remains() {
        let comments = vec![
            comment("over", 10, None),
            comment("under", 0, None),
        ];
        let cands = candidates(&comments);
        let selector = RotationSelector::new(RotationStrategy::Random, 5, 24.0);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let pick = selector.select(&cands, Utc::now(), &mut rng).unwrap();
            assert_eq!(cands[pick.index].comment.reference, "under");
            assert!(!pick.ceiling_relaxed);
        }
    }

    #[test]
    fn ceiling_is_relaxed_rather_than_failing() {
        let comments = vec![comment("a", 10, None), comment("b", 11, None)];
        let cands = candidates(&comments);
        let selector = RotationSelector::new(RotationStrategy::Random, 5, 24.0);
        let mut rng = StdRng::seed_from_u64(1);

        let pick = selector.select(&cands, Utc::now(), &mut rng).unwrap();
        assert!(pick.ceiling_relaxed);
    }

    #[test]
    fn recently_used_is_penalized_but_never_starved() {
        let now = Utc::now();
        let comments = vec![
            comment("fresh", 0, None),
            comment("just-used", 0, Some(now)),
        ];
        let cands = candidates(&comments);
        let selector = RotationSelector::new(RotationStrategy::Random, 100, 24.0);
        let mut rng = StdRng::seed_from_u64(99);

        let mut fresh = 0u32;
        let mut just_used = 0u32;
        for _ in 0..2000 {
            let pick = selector.select(&cands, now, &mut rng).unwrap();
            match cands[pick.index].comment.reference.as_str() {
                "fresh" => fresh += 1,
                _ => just_used += 1,
            }
        }
        assert!(fresh > just_used * 10, "fresh={fresh} just_used={just_used}");
        assert!(just_used > 0, "floor must keep the just-used comment drawable");
    }

    #[test]
    fn higher_relevance_weighs_heavier() {
        let comments = vec![comment("plain", 0, None), comment("topical", 0, None)];
        let mut cands = candidates(&comments);
        cands[1].relevance = 2.0;
        let selector = RotationSelector::new(RotationStrategy::Random, 100, 24.0);
        let mut rng = StdRng::seed_from_u64(5);

        let mut topical = 0u32;
        for _ in 0..1000 {
            let pick = selector.select(&cands, Utc::now(), &mut rng).unwrap();
            if cands[pick.index].comment.reference == "topical" {
                topical += 1;
            }
        }
        // weight 3 vs 1: expect roughly three quarters of the draws.
        assert!(topical > 600, "topical={topical}");
    }

    #[test]
    fn sequential_visits_everyone_before_repeating() {
        let now = Utc::now();
        let mut comments = vec![
            comment("a", 0, None),
            comment("b", 0, None),
            comment("c", 0, None),
        ];
        let selector = RotationSelector::new(RotationStrategy::Sequential, 100, 24.0);
        let mut rng = StdRng::seed_from_u64(0);

        let mut seen = Vec::new();
        for round in 0..3 {
            let picked = {
                let cands = candidates(&comments);
                let pick = selector.select(&cands, now, &mut rng).unwrap();
                cands[pick.index].comment.reference.clone()
            };
            seen.push(picked.clone());
            let ts = now + chrono::Duration::minutes(round + 1);
            let c = comments.iter_mut().find(|c| c.reference == picked).unwrap();
            c.usage_count += 1;
            c.last_used = Some(ts);
        }

        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c"]);

        // Fourth pick wraps back to the oldest-used.
        let cands = candidates(&comments);
        let pick = selector.select(&cands, now, &mut rng).unwrap();
        assert_eq!(cands[pick.index].comment.reference, "a");
    }

    #[test]
    fn sequential_breaks_ties_by_reference() {
        let comments = vec![comment("b", 0, None), comment("a", 0, None)];
        let cands = candidates(&comments);
        let selector = RotationSelector::new(RotationStrategy::Sequential, 100, 24.0);
        let mut rng = StdRng::seed_from_u64(0);

        let pick = selector.select(&cands, Utc::now(), &mut rng).unwrap();
        assert_eq!(cands[pick.index].comment.reference, "a");
    }
}

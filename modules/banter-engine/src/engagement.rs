//! Picks which post on a page to target, by decay-weighted engagement.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use banter_common::PostContext;

pub struct EngagementSelector {
    decay_hours: f64,
}

impl EngagementSelector {
    pub fn new(decay_hours: f64) -> Self {
        Self { decay_hours }
    }

    /// `(reactions + 2 * comments) * exp(-age_hours / decay_hours)`.
    /// Posts without a readable timestamp count as fresh.
    pub fn score(&self, post: &PostContext, now: DateTime<Utc>) -> f64 {
        let base = (post.reaction_count + 2 * post.comment_count) as f64;
        base * self.freshness(post.posted_at, now)
    }

    fn freshness(&self, posted_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(posted) = posted_at else { return 1.0 };
        if self.decay_hours <= 0.0 {
            return 1.0;
        }
        let age_hours = (now - posted).num_seconds().max(0) as f64 / 3600.0;
        (-age_hours / self.decay_hours).exp()
    }

    /// Highest score wins; exact ties go to the most recent post. `None`
    /// means the caller should skip the page, not that something failed.
    pub fn pick<'a>(&self, posts: &'a [PostContext], now: DateTime<Utc>) -> Option<&'a PostContext> {
        posts.iter().max_by(|a, b| {
            self.score(a, now)
                .partial_cmp(&self.score(b, now))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.posted_at.cmp(&b.posted_at))
        })
    }
}

//! The comment provider facade: a small state machine that always produces
//! a comment unless the configuration makes that impossible.

use std::cmp::Ordering;

use tracing::{info, warn};

use ai_client::CommentGenerator;
use banter_common::{
    AppConfig, BanterError, CommentSource, RotationStrategy, SelectionContext, SelectionResult,
    SelectionSource,
};

use crate::relevance;
use crate::rotation::{Candidate, RotationSelector};
use crate::store::CommentStore;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub source: CommentSource,
    pub rotation: RotationStrategy,
    pub fallback_enabled: bool,
    pub max_reuse: u32,
    pub decay_hours: f64,
    pub style_prompt: String,
    /// Last-resort texts; overriding this with an empty list is the one
    /// configuration under which selection can fail.
    pub emergency_comments: Vec<String>,
}

impl From<&AppConfig> for ProviderConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            source: config.comment_source,
            rotation: config.rotation,
            fallback_enabled: config.fallback_to_openai,
            max_reuse: config.max_reuse,
            decay_hours: config.decay_hours,
            style_prompt: config.style_prompt.clone(),
            emergency_comments: CommentStore::emergency_set(),
        }
    }
}

/// Selection stages. Control always moves rightward:
/// `SelectLocal -> SelectFallback -> Emergency -> Done | Failed`.
enum SelectState {
    SelectLocal,
    SelectFallback,
    Emergency,
    Done(SelectionResult),
    Failed,
}

pub struct CommentProvider {
    config: ProviderConfig,
    store: Option<CommentStore>,
    generator: Option<Box<dyn CommentGenerator>>,
    selector: RotationSelector,
    emergency_cursor: usize,
}

impl CommentProvider {
    pub fn new(
        config: ProviderConfig,
        store: Option<CommentStore>,
        generator: Option<Box<dyn CommentGenerator>>,
    ) -> Result<Self, BanterError> {
        match config.source {
            CommentSource::Local if store.is_none() => {
                return Err(BanterError::Configuration(
                    "comment source is 'local' but no comment store was provided".to_string(),
                ))
            }
            CommentSource::Generative if generator.is_none() => {
                return Err(BanterError::Configuration(
                    "comment source is 'generative' but no generator was provided".to_string(),
                ))
            }
            _ => {}
        }
        if config.source == CommentSource::Local && config.fallback_enabled && generator.is_none()
        {
            warn!("Fallback enabled but no generator wired; exhaustion will use the emergency set");
        }

        let selector =
            RotationSelector::new(config.rotation, config.max_reuse, config.decay_hours);
        Ok(Self {
            config,
            store,
            generator,
            selector,
            emergency_cursor: 0,
        })
    }

    pub fn store(&self) -> Option<&CommentStore> {
        self.store.as_ref()
    }

    /// Produce a comment for this posting opportunity. Never returns
    /// "nothing to say": every stage falls through to the next, and only an
    /// empty emergency set (a configuration error) or an untrustworthy
    /// corpus (validation/persistence) can surface an error.
    pub async fn select(
        &mut self,
        ctx: &SelectionContext,
    ) -> Result<SelectionResult, BanterError> {
        let mut state = match self.config.source {
            CommentSource::Local => SelectState::SelectLocal,
            CommentSource::Generative => SelectState::SelectFallback,
        };
        let mut fell_back = false;

        loop {
            state = match state {
                SelectState::SelectLocal => match self.try_local(ctx)? {
                    Some(result) => SelectState::Done(result),
                    None => {
                        info!(page = %ctx.page_handle, "Local selection exhausted");
                        fell_back = true;
                        if self.config.fallback_enabled && self.generator.is_some() {
                            SelectState::SelectFallback
                        } else {
                            SelectState::Emergency
                        }
                    }
                },
                SelectState::SelectFallback => match self.generator.as_ref() {
                    None => {
                        fell_back = true;
                        SelectState::Emergency
                    }
                    Some(generator) => {
                        match generator
                            .generate(&ctx.post_text, &self.config.style_prompt)
                            .await
                        {
                            Ok(text) => SelectState::Done(SelectionResult {
                                text,
                                source: SelectionSource::Generated,
                                reference: None,
                                category: None,
                                relevance_score: 0.0,
                                fallback_used: fell_back,
                            }),
                            Err(e) => {
                                warn!(error = %e, "Generation failed, using emergency set");
                                fell_back = true;
                                SelectState::Emergency
                            }
                        }
                    }
                },
                SelectState::Emergency => match self.next_emergency() {
                    Some(text) => SelectState::Done(SelectionResult {
                        text,
                        source: SelectionSource::Emergency,
                        reference: None,
                        category: None,
                        relevance_score: 0.0,
                        fallback_used: true,
                    }),
                    None => SelectState::Failed,
                },
                SelectState::Done(result) => return Ok(result),
                SelectState::Failed => {
                    return Err(BanterError::Configuration(
                        "emergency comment set is empty".to_string(),
                    ))
                }
            };
        }
    }

    /// One pass over the store: score, rank, rotate, record usage, persist.
    /// `Ok(None)` is exhaustion; validation and persistence errors surface.
    fn try_local(
        &mut self,
        ctx: &SelectionContext,
    ) -> Result<Option<SelectionResult>, BanterError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(None);
        };

        let (result, reference) = {
            let mut candidates: Vec<Candidate<'_>> = store
                .candidates()
                .map(|(category, comment)| Candidate {
                    relevance: relevance::score(&ctx.post_text, category, &comment.tags),
                    comment,
                    category,
                })
                .collect();

            // When anything scores above zero, stay in the topical tier.
            // Zero-relevance comments remain selectable whenever nothing
            // matches (empty post text included).
            if candidates.iter().any(|c| c.relevance > 0.0) {
                candidates.retain(|c| c.relevance > 0.0);
            }
            candidates.sort_by(|a, b| {
                b.relevance
                    .partial_cmp(&a.relevance)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.comment.reference.cmp(&b.comment.reference))
            });

            let Some(pick) =
                self.selector
                    .select(&candidates, ctx.requested_at, &mut rand::rng())
            else {
                return Ok(None);
            };
            let chosen = &candidates[pick.index];
            let result = SelectionResult {
                text: chosen.comment.text.clone(),
                source: SelectionSource::Local,
                reference: Some(chosen.comment.reference.clone()),
                category: Some(chosen.category.to_string()),
                relevance_score: chosen.relevance,
                fallback_used: false,
            };
            (result, chosen.comment.reference.clone())
        };

        let Some(store) = self.store.as_mut() else {
            return Ok(None);
        };
        store.update(&reference, ctx.requested_at)?;
        store.backup_and_save()?;

        info!(
            reference,
            category = result.category.as_deref().unwrap_or_default(),
            relevance = result.relevance_score,
            "Selected local comment"
        );
        Ok(Some(result))
    }

    fn next_emergency(&mut self) -> Option<String> {
        if self.config.emergency_comments.is_empty() {
            return None;
        }
        let text = self.config.emergency_comments
            [self.emergency_cursor % self.config.emergency_comments.len()]
        .clone();
        self.emergency_cursor = self.emergency_cursor.wrapping_add(1);
        info!("Using emergency comment");
        Some(text)
    }
}

mod fixtures;
mod metrics;
mod publisher;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::{CommentGenerator, OpenAi};
use banter_common::{AppConfig, CommentSource};
use banter_engine::{run_page, CommentProvider, CommentStore, EngagementSelector, ProviderConfig};

use fixtures::FixtureFeed;
use metrics::JsonlMetrics;
use publisher::DryRunPublisher;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("banter=info".parse()?))
        .init();

    info!("Banter bot starting...");

    let config = AppConfig::from_env()?;

    let store = match config.comment_source {
        CommentSource::Local => Some(CommentStore::load(&config.local_comment_file)?),
        CommentSource::Generative => None,
    };

    let wants_generator =
        config.comment_source == CommentSource::Generative || config.fallback_to_openai;
    let generator: Option<Box<dyn CommentGenerator>> = match (&config.openai_api_key, wants_generator)
    {
        (Some(key), true) => Some(Box::new(OpenAi::new(key, &config.openai_model))),
        (None, true) => {
            warn!("OPENAI_API_KEY not set; generation disabled");
            None
        }
        _ => None,
    };

    let mut provider = CommentProvider::new(ProviderConfig::from(&config), store, generator)?;
    let engagement = EngagementSelector::new(config.decay_hours);

    // The browser collaborator is out of scope here; a feed fixture plus the
    // dry-run publisher exercise the full selection path end to end.
    let fixture_path =
        std::env::var("FEED_FIXTURE").unwrap_or_else(|_| "feed.json".to_string());
    let feed = match FixtureFeed::from_file(&fixture_path) {
        Ok(feed) => feed,
        Err(e) => {
            warn!(error = %e, "No feed fixture, starting with an empty feed");
            FixtureFeed::new(Default::default())
        }
    };
    let publisher = DryRunPublisher;
    let mut metrics = JsonlMetrics::open()?;

    let mut posted = 0usize;
    let mut skipped = 0usize;
    for page in &config.feed_pages {
        match run_page(page, &feed, &publisher, &mut metrics, &engagement, &mut provider).await? {
            Some(record) => {
                posted += 1;
                info!(page = %page, post = %record.post_id, source = %record.source, "Page done");
            }
            None => skipped += 1,
        }
    }

    info!(posted, skipped, "Run complete");
    Ok(())
}

//! Page-side pass over a saved HTML document.
//!
//! Usage: `phishblock-scan <file.html> [page-url]`. The annotated document is
//! written to stdout; the outcome goes to the log.

use anyhow::Context;
use tracing::{error, info};

use phishblock_engine::{
    annotator::Annotator,
    collector::{Collector, ScanOutcome},
    config::EngineConfig,
    page::HtmlPage,
    transport::HttpTransport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishblock_engine=info,phishblock_scan=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: phishblock-scan <file.html> [page-url]")?;
    let page_url = args.next();

    let config = EngineConfig::from_env();
    let html = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path))?;
    let mut page = HtmlPage::parse(html, page_url.as_deref());

    let collector = Collector::new(
        HttpTransport::new(&config.engine_url, config.retry.timeout)?,
        config.retry,
        Annotator::new(config.threshold),
    );

    // Failures only mean the page goes out unmarked.
    match collector.run(&mut page).await {
        ScanOutcome::NoLinks => info!("No links found in {}", path),
        ScanOutcome::Annotated(summary) => info!("Annotated {}: {:?}", path, summary),
        ScanOutcome::Failed(failure) => error!("Leaving {} unmarked: {}", path, failure),
    }

    print!("{}", page.render());
    Ok(())
}

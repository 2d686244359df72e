//! # Slide Canvas CLI
//!
//! Headless host binary for the slide canvas engine.

use clap::Parser;
use slide_cli::{run, shortcut_help, CliArgs, HostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slide_cli=info,slide_engine=info,slide_renderer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    if args.list_shortcuts {
        println!("{}", shortcut_help());
        return Ok(());
    }

    let config = HostConfig::from(args);
    tracing::info!(
        "Container {}x{}, pixel ratio {:?}",
        config.container.0,
        config.container.1,
        config.signals.device_pixel_ratio
    );

    let summary = run(&config)?;
    tracing::info!(
        "Slide {}: {} elements, backing {}x{}, display {}x{}, {:?}",
        summary.slide_id,
        summary.elements,
        summary.backing_size.0,
        summary.backing_size.1,
        summary.display_size.0,
        summary.display_size.1,
        summary.frame.content
    );
    Ok(())
}

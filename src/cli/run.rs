// src/cli/run.rs — Run one design session

use std::sync::Arc;

use crate::cli::{progress, Cli};
use crate::core::agent::DesignAgent;
use crate::core::types::{Artifact, RunConfiguration};
use crate::infra::config::{Config, ProviderConfig};
use crate::provider::openai::OpenAiProvider;
use crate::provider::VisionProvider;

/// Wire config and flags into an agent, run it, and write the outputs.
pub async fn run_session(cli: Cli, config: &Config) -> anyhow::Result<()> {
    let goal = cli.goal.join(" ");
    if goal.trim().is_empty() {
        anyhow::bail!("No design goal given. Usage: decora -i room.jpg \"<goal>\"");
    }

    let mut run_config = RunConfiguration::from(&config.agent);
    run_config.goal = goal;
    run_config.style_keywords = cli.styles.clone();
    if let Some(n) = cli.iterations {
        run_config.max_iterations = n;
    }
    if let Some(b) = cli.budget {
        run_config.budget_usd = b;
    }
    if let Some(d) = cli.delay_ms {
        run_config.iteration_delay_ms = d;
    }
    if cli.simulate {
        run_config.simulate = true;
    }

    let provider = build_provider(&config.provider)?;
    let initial = Artifact::new(cli.image.clone());

    let (task, handle) = DesignAgent::spawn(provider, run_config, initial);

    if !cli.quiet {
        tokio::spawn(progress::render(handle.subscribe()));
    }

    // First Ctrl-C requests a cooperative stop; the run winds down at
    // its next checkpoint. A second Ctrl-C aborts outright.
    let stopper = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n[stop] winding down (Ctrl-C again to abort)");
            stopper.stop();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });

    let report = task.await?;

    if let Some(path) = cli.report.as_deref() {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        eprintln!("[export] report written to {}", path.display());
    }
    if let Some(path) = cli.artifacts.as_deref() {
        let artifacts = handle.export_artifacts();
        std::fs::write(path, serde_json::to_string_pretty(&artifacts)?)?;
        eprintln!(
            "[export] {} artifact reference(s) written to {}",
            artifacts.len(),
            path.display()
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_provider(cfg: &ProviderConfig) -> anyhow::Result<Arc<dyn VisionProvider>> {
    match cfg.kind.as_str() {
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is not set"))?;
            let mut provider =
                OpenAiProvider::new(api_key, cfg.model.clone(), cfg.image_model.clone());
            if let Some(url) = &cfg.base_url {
                provider = provider.with_base_url(url.clone());
            }
            Ok(Arc::new(provider))
        }
        other => anyhow::bail!(
            "Unknown provider kind '{}'. Supported: openai",
            other
        ),
    }
}

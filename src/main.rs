use std::sync::Arc;

use leadflow::campaign::CampaignController;
use leadflow::config::EngineConfig;
use leadflow::context::RunContext;
use leadflow::executor::{ActionExecutor, ExecutorConfig};
use leadflow::followup::FollowUpMessenger;
use leadflow::pacing::PacingScheduler;
use leadflow::platform::session::Credentials;
use leadflow::platform::sim::{self, SimulatedNetwork};
use leadflow::platform::{Discovery, MessageGenerator, PlatformApi};
use leadflow::store::OutputStore;
use leadflow::triage::TriageController;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "campaign".to_string());
    let mut config = EngineConfig::from_env();
    let dry_run = std::env::var("LEADFLOW_DRY_RUN").map(|v| v == "1").unwrap_or(false);

    eprintln!("leadflow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Mode: {}", mode);
    eprintln!("   Output: {}", config.output_dir.display());

    if !dry_run {
        // Session bootstrap is fatal: no credentials, no run.
        let credentials = Credentials::from_env().map_err(|e| {
            eprintln!("Error: {e}");
            e
        })?;
        eprintln!("   Account: {}", credentials.username);
        eprintln!();
        eprintln!("Error: no live platform client is wired into this binary.");
        eprintln!("  Implement leadflow::platform::{{Discovery, PlatformApi}} against");
        eprintln!("  your client and drive the controllers from your own main, or set");
        eprintln!("  LEADFLOW_DRY_RUN=1 to exercise the engine against the simulator.");
        std::process::exit(1);
    }

    eprintln!("   Dry run: simulated collaborators, no network actions\n");
    if config.campaign.affiliations.is_empty() {
        config.campaign.affiliations = sim::FIXTURE_AFFILIATIONS
            .iter()
            .map(|s| s.to_string())
            .collect();
    }

    let network = Arc::new(SimulatedNetwork::fixture());
    let api: Arc<dyn PlatformApi> = network.clone();
    let discovery: Arc<dyn Discovery> = network.clone();
    let generator: Arc<dyn MessageGenerator> = network.clone();

    let pacing = Arc::new(match config.rng_seed {
        Some(seed) => PacingScheduler::seeded(config.pacing.clone(), seed),
        None => PacingScheduler::new(config.pacing.clone()),
    });
    let store = Arc::new(OutputStore::new(&config.output_dir));
    let ctx = RunContext::new(store, Arc::clone(&pacing));

    let executor_config = ExecutorConfig {
        max_attempts: config.pacing.max_attempts,
        ..ExecutorConfig::default()
    };
    let executor = ActionExecutor::new(Arc::clone(&api), Arc::clone(&pacing), executor_config);

    match mode.as_str() {
        "campaign" => {
            let controller =
                CampaignController::new(discovery, executor, ctx, config.campaign.clone());
            let summary = controller.run().await?;
            eprintln!(
                "\nCampaign done: {}/{} connections across {} attempts",
                summary.successes, summary.target, summary.attempts
            );
        }
        "followup" => {
            let messenger = FollowUpMessenger::new(
                discovery,
                generator,
                executor,
                ctx,
                config.followup.clone(),
            );
            let summary = messenger.run().await?;
            eprintln!(
                "\nFollow-up done: {} sent, {} skipped, {} failed",
                summary.sent, summary.skipped, summary.failed
            );
        }
        "triage" => {
            let controller = TriageController::new(api, executor, ctx, config.triage.clone());
            let summary = controller.run().await?;
            eprintln!(
                "\nTriage done: {} conversations, {} facts, {} acknowledgements",
                summary.conversations, summary.contact_facts, summary.acknowledgements_sent
            );
        }
        other => {
            eprintln!("Unknown mode: {other} (expected campaign | followup | triage)");
            std::process::exit(2);
        }
    }

    Ok(())
}

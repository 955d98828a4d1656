//! End-to-end follow-up messaging runs against the simulated platform.

use std::sync::Arc;

use leadflow::config::FollowUpConfig;
use leadflow::context::RunContext;
use leadflow::executor::{ActionExecutor, ExecutorConfig};
use leadflow::followup::FollowUpMessenger;
use leadflow::model::{ConnectionProfile, TargetId};
use leadflow::pacing::{PacingConfig, PacingScheduler};
use leadflow::platform::sim::SimulatedNetwork;
use leadflow::platform::{Discovery, MessageGenerator, PlatformApi};
use leadflow::store::OutputStore;

fn profile(id: &str, restricted: bool) -> ConnectionProfile {
    ConnectionProfile {
        id: TargetId::new(id),
        name: format!("Member {id}"),
        restricted,
        current_position: Some("Engineer".into()),
        company: Some("Acme".into()),
        experiences: vec!["Engineer (2y)".into()],
        skills: vec!["Rust".into()],
        certifications: vec![],
    }
}

fn messenger(sim: &Arc<SimulatedNetwork>, store: Arc<OutputStore>) -> FollowUpMessenger {
    let pacing = Arc::new(PacingScheduler::seeded(PacingConfig::instant(), 42));
    let executor = ActionExecutor::new(
        Arc::clone(sim) as Arc<dyn PlatformApi>,
        Arc::clone(&pacing),
        ExecutorConfig::default(),
    );
    let ctx = RunContext::new(store, pacing);
    FollowUpMessenger::new(
        Arc::clone(sim) as Arc<dyn Discovery>,
        Arc::clone(sim) as Arc<dyn MessageGenerator>,
        executor,
        ctx,
        FollowUpConfig::default(),
    )
}

#[tokio::test]
async fn messages_each_connection_and_skips_restricted() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(OutputStore::new(dir.path()));

    let sim = Arc::new(SimulatedNetwork::new());
    sim.add_connection(profile("conn-1", false));
    sim.add_connection(profile("conn-2", true));
    sim.add_connection(profile("conn-3", false));

    let summary = messenger(&sim, Arc::clone(&store)).run().await.unwrap();
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);

    let calls = sim.message_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(id, _)| id != "conn-2"));
    // Generated bodies are personalized, never empty.
    assert!(calls.iter().all(|(_, body)| !body.is_empty()));

    let attempts = store.load_attempts().await.unwrap();
    assert_eq!(attempts.len(), 2);
}

#[tokio::test]
async fn generation_failure_skips_recipient_without_sending() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(OutputStore::new(dir.path()));

    let sim = Arc::new(SimulatedNetwork::new());
    sim.add_connection(profile("conn-1", false));
    sim.set_generator_failing(true);

    let summary = messenger(&sim, Arc::clone(&store)).run().await.unwrap();
    assert_eq!(summary.sent, 0);
    assert_eq!(summary.skipped, 1);
    assert!(sim.message_calls().is_empty());
    assert!(store.load_attempts().await.unwrap().is_empty());
}

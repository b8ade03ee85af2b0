use anyhow::Result;
use meshperf::prelude::*;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("meshperf=info,quick_run=info")
        .init();

    let outcome = LoadTest::new("http://bookinfo.local/productpage")
        .mesh("istio")
        .concurrency(4)
        .qps(50)
        .duration(Duration::from_secs(60))
        .load_generator(LoadGenerator::Wrk2)
        .runtime(MeshperfRuntime::new().with_args())
        .await?;

    match outcome {
        RunOutcome::Completed(result) => info!("Completed: {:?}", result.meshery_id),
        other => warn!("Load test ended early: {other:?}"),
    }
    Ok(())
}

use anyhow::Result;
use meshperf::prelude::*;
use meshperf::Field;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("meshperf=debug,run_profile=info")
        .init();

    let mut orchestrator = MeshperfRuntime::new().with_args().build()?;
    orchestrator.refresh().await;
    info!("Meshes: {:?}", orchestrator.session().meshes().options());

    let form = orchestrator.form_mut();
    form.set(Field::ProfileName, "bookinfo-productpage");
    form.set(Field::Url, "http://bookinfo.local/productpage");
    form.set(Field::Concurrency, "8");
    form.set(Field::Qps, "100");
    form.set(Field::Duration, "30s");

    orchestrator.submit().await?;
    while let Some(phase) = orchestrator.next_update().await {
        if !phase.is_active() {
            break;
        }
    }

    if let Some(result) = orchestrator.session().result() {
        info!("Runner results: {:?}", result.runner_results);
    }
    if let Some(url) = orchestrator.result_url() {
        info!("Raw result: {url}");
    }
    Ok(())
}

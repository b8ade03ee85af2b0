use meshperf::prelude::*;
use meshperf::Field;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use mock_service::MockHandle;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

/// Install logging and the metrics recorder once per test binary.
#[allow(unused)]
pub fn init() -> &'static PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    HANDLE.get_or_init(|| {
        let _ = FmtSubscriber::builder()
            .with_env_filter("meshperf=trace,mock_service=debug,axum::rejection=trace")
            .try_init();

        PrometheusBuilder::new()
            .install_recorder()
            .expect("no other metrics recorder is installed")
    })
}

#[allow(unused)]
pub async fn mock() -> MockHandle {
    init();
    mock_service::spawn().await.expect("mock service binds")
}

#[allow(unused)]
pub fn runtime(mock: &MockHandle, notifier: &RecordingNotifier) -> MeshperfRuntime {
    MeshperfRuntime::new()
        .server(mock.url().parse().expect("mock url"))
        .notifier(notifier.clone())
}

#[allow(unused)]
pub fn orchestrator(mock: &MockHandle, notifier: &RecordingNotifier) -> Orchestrator {
    runtime(mock, notifier).build().expect("client builds")
}

/// Fill the form with a runnable load test against `target`.
#[allow(unused)]
pub fn fill_form(orchestrator: &mut Orchestrator, target: &str) {
    let form = orchestrator.form_mut();
    form.set(Field::Url, target);
    form.set(Field::Concurrency, "10");
    form.set(Field::Qps, "5");
    form.set(Field::Duration, "30s");
    form.set(Field::Mesh, "istio");
}

/// Poll `check` until it holds, giving up after two seconds.
#[allow(unused)]
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

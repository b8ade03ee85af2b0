use std::net::SocketAddr;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("mock_service=debug,tower_http=debug")
        .init();

    let addr: SocketAddr = "0.0.0.0:9081".parse()?;
    mock_service::run(addr).await
}

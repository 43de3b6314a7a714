use attendance_board::config::BoardConfig;
use attendance_board::console;
use attendance_board::state::AppState;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "attendance_board=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = BoardConfig::new_from_env()?;
    info!("Starting attendance board");

    let app = AppState::from_config(&config).await?;

    let stdin = BufReader::new(tokio::io::stdin());
    console::run(&app, stdin, tokio::io::stdout()).await?;

    Ok(())
}

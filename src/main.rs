use std::process::ExitCode;

use activities::config::Config;
use dotenvy::dotenv;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    activities::init_tracing();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Environment misconfigured: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = activities::start_server(config).await {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

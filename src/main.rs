use std::process::ExitCode;

use bistro_server::start_server;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    match start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

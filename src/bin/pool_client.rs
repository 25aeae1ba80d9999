use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match ball_pool::run_client_with_config().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "client failed");
            ExitCode::FAILURE
        }
    }
}

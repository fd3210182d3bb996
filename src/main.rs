use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match registration_backend::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {}", e);
            eprintln!("registration-backend: {}", e);
            ExitCode::FAILURE
        }
    }
}

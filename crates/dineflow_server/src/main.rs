use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match dineflow_server::start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dineflow_server: {err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = mediflow_lib::run().await {
        tracing::error!(error = %e, "MediFlow failed");
        eprintln!("mediflow: {e}");
        std::process::exit(1);
    }
}

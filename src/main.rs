#[tokio::main]
async fn main() {
    if let Err(e) = burn_history_scanner::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

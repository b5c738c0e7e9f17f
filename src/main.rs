#[tokio::main]
async fn main() {
    if let Err(e) = blockindex::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = studio_booking::run().await {
        eprintln!("studio-booking failed to start: {}", e);
        std::process::exit(1);
    }
}

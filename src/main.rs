#[tokio::main]
async fn main() {
    if let Err(error) = contact_book::web::run().await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

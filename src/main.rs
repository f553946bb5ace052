use dotenv::dotenv;
use tracing::{error, info, warn};
use yango_backend::app::app::App;
use yango_backend::util::logger::Logger;


#[tokio::main]
async fn main() {
    // Loaded first so LOG_DIR and the log levels can come from .env
    let dotenv_result = dotenv();

    let logger = match Logger::new() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!("🚀 Starting car submission backend");

    match dotenv_result {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let result = match App::new().await {
        Ok(app) => app.start().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Application stopped with error: {}", e);
        // Flush the file writers before exiting
        drop(logger);
        std::process::exit(1);
    }
}

use std::env;

use tracing::Level;

pub fn init_logger() {
    let verbosity = env::var("VERBOSITY").unwrap_or_else(|_| "INFO".to_string());
    let level = match verbosity.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => {
            eprintln!("Invalid verbosity level '{}', defaulting to INFO", verbosity);
            Level::INFO
        }
    };

    tracing_subscriber::fmt().with_max_level(level).init();
}

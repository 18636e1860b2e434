use makoto_tools::core::error::MakotoError;
use makoto_tools::core::interrupt::INTERRUPTED_EXIT_CODE;
use makoto_tools::core::logging;
use std::process;

fn main() {
    // A missing .env is fine; the environment and flags still apply.
    dotenvy::dotenv().ok();
    logging::init_logger(logging::DEFAULT_FILTER);

    match makoto_tools::run() {
        Ok(()) => {}
        Err(MakotoError::Interrupted) => {
            eprintln!("\nInterrupted.");
            process::exit(INTERRUPTED_EXIT_CODE);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

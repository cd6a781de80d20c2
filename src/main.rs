use circle_area::utils::error::EXIT_OK;
use circle_area::utils::logger;
use circle_area::{CircleConfig, CircleSession};
use clap::Parser;

fn main() {
    let _config = CircleConfig::parse();

    logger::init_circle_logger();

    let result = {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut session = CircleSession::new(stdin.lock(), stdout.lock());
        session.run()
    };

    let code = match result {
        Ok(area) => {
            tracing::debug!("Computed area {}", area);
            EXIT_OK
        }
        Err(e) => {
            tracing::debug!("Circle area failed: {} (Category: {:?})", e, e.category());
            eprintln!("{}", e);
            e.exit_code()
        }
    };

    std::process::exit(code);
}

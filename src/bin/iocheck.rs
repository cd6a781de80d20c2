use anyhow::Context;
use circle_area::utils::logger;
use circle_area::{CheckerArgs, ProcessSpawner, SuiteConfig};
use clap::Parser;

#[tokio::main]
async fn main() {
    let args = CheckerArgs::parse();

    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(args).await {
        tracing::error!("iocheck failed: {:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: CheckerArgs) -> anyhow::Result<()> {
    // Resolve before changing directory so a relative spec path still works.
    let spec_path = std::path::absolute(&args.spec)
        .with_context(|| format!("resolve {}", args.spec.display()))?;
    tracing::info!("Loading suite from: {}", spec_path.display());

    let config = SuiteConfig::from_file(&spec_path)
        .with_context(|| format!("load suite {}", spec_path.display()))?;

    if let Some(dir) = &args.directory {
        std::env::set_current_dir(dir).with_context(|| format!("change to {}", dir.display()))?;
        tracing::debug!("Working directory: {}", dir.display());
    }

    let suite = config.into_suite().context("invalid suite")?;
    tracing::info!(
        "Suite has {} cases worth {} points",
        suite.cases.len(),
        suite.total_points()
    );

    if args.validate {
        tracing::info!("Validation only, no cases run");
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    let report = suite
        .run(&ProcessSpawner, &mut stdout, args.quiet)
        .await
        .context("run suite")?;

    println!("Grade: {} / {}", report.earned, report.total);

    if args.json {
        println!("{}", report.to_json().context("serialize report")?);
    }

    Ok(())
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "iocheck", version)]
#[command(about = "Checks the console I/O of command-line programs against a scripted suite")]
pub struct CheckerArgs {
    /// Path to the TOML suite file
    pub spec: PathBuf,

    /// Change to this directory before running any case
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Only parse and validate the suite
    #[arg(long)]
    pub validate: bool,

    /// Disable progress messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Also print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = CheckerArgs::parse_from(["iocheck", "suite.toml"]);
        assert_eq!(args.spec, PathBuf::from("suite.toml"));
        assert!(args.directory.is_none());
        assert!(!args.validate && !args.quiet && !args.verbose && !args.json);
    }

    #[test]
    fn test_parse_all_flags() {
        let args = CheckerArgs::parse_from([
            "iocheck", "-d", "work", "--validate", "-q", "-v", "--json", "suite.toml",
        ]);
        assert_eq!(args.directory, Some(PathBuf::from("work")));
        assert!(args.validate && args.quiet && args.verbose && args.json);
    }

    #[test]
    fn test_spec_is_required() {
        assert!(CheckerArgs::try_parse_from(["iocheck"]).is_err());
    }
}

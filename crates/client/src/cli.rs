//! Command-line interface for the headless battle runner.

use std::path::PathBuf;

use clap::Parser;

/// Headless team-arena battle simulator
#[derive(Parser, Debug)]
#[command(name = "arena-sim")]
#[command(about = "Run a team-arena battle between two AI-controlled sides")]
#[command(version)]
pub struct Args {
    /// Directory holding `roster.ron` and `match.toml`
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Roster file, overriding `<data-dir>/roster.ron`
    #[arg(long, value_name = "RON_FILE")]
    pub roster: Option<PathBuf>,

    /// Match file, overriding `<data-dir>/match.toml`
    #[arg(long = "match", value_name = "TOML_FILE")]
    pub match_file: Option<PathBuf>,

    /// RNG seed, overriding the match file
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rounds after which the battle is called a draw
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Stun skip delay in milliseconds, overriding the match file
    #[arg(long, value_name = "MS")]
    pub stun_delay: Option<u64>,

    /// Write the match report and full event log as JSON
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "arena-sim",
            "--match",
            "duel.toml",
            "--seed",
            "7",
            "--max-rounds",
            "12",
        ])
        .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.match_file, Some(PathBuf::from("duel.toml")));
        assert_eq!(args.roster, None);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.max_rounds, Some(12));
    }
}

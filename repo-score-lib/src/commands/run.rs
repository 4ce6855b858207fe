//! Command dispatch logic for repo-score

use super::{InitArgs, ScoreArgs, init_config, score_urls};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "repo-score", version, about, author, long_about = None)]
#[command(about = "Score npm packages and GitHub repositories on maintainability")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: ScoreSubcommand,
}

#[derive(Subcommand, Debug)]
enum ScoreSubcommand {
    /// Score every repository listed in a URL file and print NDJSON records
    Score(Box<ScoreArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        ScoreSubcommand::Score(score_args) => score_urls(host, score_args).await,
        ScoreSubcommand::Init(init_args) => init_config(host, init_args),
    }
}

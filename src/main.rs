use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotskip::{
    cli::{self, ControlCommand},
    config, fatal,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Settings file to load instead of the one in the data directory
    #[clap(long, global = true)]
    env_file: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Watch playback and skip recently scrobbled songs
    Run,

    /// Check credentials once without skipping anything
    Check,

    /// Pause skipping in the running instance
    Pause,

    /// Resume skipping in the running instance
    Resume,

    /// Toggle between paused and active
    Toggle,

    /// Don't skip the song that is playing now
    Keep,

    /// Show the running instance's state
    Status,

    /// Show the log folder
    Logs,

    /// Stop the running instance
    Exit,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn settings(loaded: spotskip::Result<PathBuf>) -> config::Settings {
    if let Err(e) = loaded {
        fatal!("Cannot load settings. Err: {}", e);
    }
    match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => fatal!("{}", e),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = config::load_env(cli.env_file.clone()).await;

    match cli.command {
        Command::Run => cli::run(settings(loaded)).await,
        Command::Check => cli::check(settings(loaded)).await,
        // only CONTROL_ADDRESS matters here, and it has a default
        Command::Pause => cli::send(ControlCommand::Pause).await,
        Command::Resume => cli::send(ControlCommand::Resume).await,
        Command::Toggle => cli::send(ControlCommand::Toggle).await,
        Command::Keep => cli::send(ControlCommand::Keep).await,
        Command::Exit => cli::send(ControlCommand::Exit).await,
        Command::Status => cli::status().await,
        Command::Logs => cli::logs().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

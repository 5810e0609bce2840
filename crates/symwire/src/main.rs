use std::path::PathBuf;

use clap::{Parser, Subcommand};
use starbase::{App, AppResult, AppSession};

use symwire::commands::{
    run_encode, run_escape, run_hex_decode, run_hex_encode, run_unescape,
};

/// Symwire CLI - encode runtime values for a host process
#[derive(Parser)]
#[command(name = "symwire")]
#[command(about = "Encode runtime values into the symwire text tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Encode a JSON runtime value and print the wire document
    Encode {
        /// JSON file holding the value (stdin when absent)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Mapping whose names are left out of the output
        #[arg(short, long)]
        baseline: Option<PathBuf>,
        /// Path to symwire.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Convert doubles to and from hex
    Hex {
        #[command(subcommand)]
        action: HexAction,
    },
    /// Escape text the way STRING fields are escaped
    Escape {
        /// Text to escape
        text: String,
    },
    /// Reverse `escape`
    Unescape {
        /// Escaped text
        text: String,
    },
}

#[derive(Clone, Subcommand)]
enum HexAction {
    /// Print the hex form of a double
    Encode {
        #[arg(allow_hyphen_values = true)]
        value: f64,
    },
    /// Print the double a hex string describes
    Decode {
        /// 16 hex digits
        text: String,
    },
}

/// Application session for Symwire CLI
#[derive(Clone)]
struct SymwireSession {
    command: Commands,
}

#[async_trait::async_trait]
impl AppSession for SymwireSession {
    async fn execute(&mut self) -> AppResult {
        match &self.command {
            Commands::Encode {
                input,
                baseline,
                config,
            } => run_encode(input.clone(), baseline.clone(), config.clone()),
            Commands::Hex { action } => match action {
                HexAction::Encode { value } => run_hex_encode(*value),
                HexAction::Decode { text } => run_hex_decode(text.clone()),
            },
            Commands::Escape { text } => run_escape(text.clone()),
            Commands::Unescape { text } => run_unescape(text.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> starbase::MainResult {
    let cli = Cli::parse();

    let session = SymwireSession {
        command: cli.command,
    };

    let exit_code = App::default()
        .run(
            session,
            |mut session| async move { session.execute().await },
        )
        .await?;

    Ok(std::process::ExitCode::from(exit_code))
}

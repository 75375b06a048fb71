use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use hartype_cli::commands;
use hartype_cli::{OutputFormat, Schema};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hartype")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Parse, check and re-encode HTTP Archive (HAR) files",
    long_about = "hartype reads HAR 1.2 files into a typed model, keeps every vendor field it \
                  does not recognise, and writes the archive back out. Browser DevTools \
                  extension fields can be read as typed fields with --devtools."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for reports
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a HAR file and write it back out
    Format {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write absent optional fields as explicit nulls
        #[arg(long)]
        include_nulls: bool,

        /// Write compact JSON instead of pretty-printed JSON
        #[arg(long)]
        compact: bool,

        /// Read DevTools extension fields as typed fields
        #[arg(long)]
        devtools: bool,

        /// Fail on the first structural anomaly instead of substituting defaults
        #[arg(long)]
        strict: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report structural anomalies and validation problems
    Check {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Read DevTools extension fields as typed fields
        #[arg(long)]
        devtools: bool,

        /// Exit with an error when any anomaly is found
        #[arg(long)]
        strict: bool,
    },

    /// Quick overview of a HAR file
    Summary {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Read DevTools extension fields as typed fields
        #[arg(long)]
        devtools: bool,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts.\n\n\
        SUPPORTED SHELLS:\n  \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash:  hartype completion --shell bash > ~/.local/share/bash-completion/completions/hartype\n  \
        zsh:   hartype completion --shell zsh > ~/.zfunc/_hartype\n  \
        fish:  hartype completion --shell fish > ~/.config/fish/completions/hartype.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);
    tracing::debug!("Report format: {}", cli.format.as_str());

    // Execute the command
    match cli.command {
        Commands::Format {
            file,
            include_nulls,
            compact,
            devtools,
            strict,
            output,
        } => commands::format::execute(
            &file,
            Schema::from_flag(devtools),
            include_nulls,
            compact,
            strict,
            output,
        ),
        Commands::Check {
            file,
            devtools,
            strict,
        } => commands::check::execute(&file, Schema::from_flag(devtools), strict, cli.format),
        Commands::Summary { file, devtools } => {
            commands::summary::execute(&file, Schema::from_flag(devtools), cli.format)
        }
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("hartype=debug,hartype_cli=debug,hartype_core=debug")
    } else {
        EnvFilter::new("hartype=info,hartype_cli=info,hartype_core=warn")
    };

    // Logs go to stderr so re-encoded HAR on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

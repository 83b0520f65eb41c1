use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tower_lsp::{LspService, Server};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use test_selector::{
    BufferError, DeclarationIndex, DeclarationScanner, FileBuffer, PatternError, SelectorError, ServerSettings,
    SuppressionMutator, TestFramework, TestSelectorServer, config::ConfigFileError,
};

#[derive(Parser, Debug)]
#[command(name = "test-selector", version, about)]
struct Args {
    #[arg(long, short)]
    verbose: bool,

    #[arg(long)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the test declarations of a file as JSON.
    List {
        path: PathBuf,
        #[arg(long, value_enum)]
        framework: Option<TestFramework>,
    },
    /// Insert the suppress marker above a test.
    Suppress {
        path: PathBuf,
        name: String,
        #[arg(long, value_enum)]
        framework: Option<TestFramework>,
    },
    /// Remove the suppress marker above a test.
    Unsuppress {
        path: PathBuf,
        name: String,
        #[arg(long, value_enum)]
        framework: Option<TestFramework>,
    },
}

/// Failures of the one-shot subcommands.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("invalid patterns: {0}")]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Config(#[from] ConfigFileError),
    #[error("failed to render declarations: {0}")]
    Render(#[from] serde_json::Error),
}

fn default_log_path() -> PathBuf {
    dirs_or_tmp().join("test-selector.log")
}

fn dirs_or_tmp() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".test-selector");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    std::env::temp_dir()
}

fn init_tracing(args: &Args) -> PathBuf {
    let stderr_filter = if args.verbose {
        EnvFilter::new("test_selector=debug,tower_lsp=debug")
    } else {
        EnvFilter::new("test_selector=info,tower_lsp=warn")
    };

    let file_filter = if args.verbose {
        EnvFilter::new("test_selector=debug,tower_lsp=info")
    } else {
        EnvFilter::new("test_selector=info,tower_lsp=warn")
    };

    let log_path = args.log_file.as_ref().map(PathBuf::from).unwrap_or_else(default_log_path);

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path.file_name().unwrap_or(std::ffi::OsStr::new("test-selector.log")),
    );

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false).with_target(false).with_filter(file_filter);

    let stderr_layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false).with_filter(stderr_filter);

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
    log_path
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_path = init_tracing(&args);

    let Some(command) = args.command else {
        serve(&log_path).await;
        return ExitCode::SUCCESS;
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            eprintln!("test-selector: {error}");
            ExitCode::FAILURE
        },
    }
}

async fn serve(log_path: &Path) {
    info!("Starting test-selector server v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(TestSelectorServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    info!("test-selector server stopped");
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::List {
            path,
            framework,
        } => {
            let (buffer, scanner) = load(&path, framework)?;
            let result = scanner.scan(&buffer);
            let json = serde_json::to_string_pretty(&result)?;
            println!("{json}");
            Ok(())
        },
        Command::Suppress {
            path,
            name,
            framework,
        } => set_suppressed(&path, &name, framework, true),
        Command::Unsuppress {
            path,
            name,
            framework,
        } => set_suppressed(&path, &name, framework, false),
    }
}

fn set_suppressed(
    path: &Path,
    name: &str,
    framework: Option<TestFramework>,
    suppressed: bool,
) -> Result<(), CliError> {
    let (mut buffer, scanner) = load(path, framework)?;
    let index = DeclarationIndex::build(&scanner.scan(&buffer));
    let mutator = SuppressionMutator::new(Arc::clone(scanner.patterns()));
    match mutator.set_suppressed(&mut buffer, &index, name, suppressed)? {
        Some(edit) => info!("{}: {:?} at byte {}", path.display(), edit.kind, edit.at_offset),
        None => info!("{}: '{name}' already suppressed={suppressed}", path.display()),
    }
    Ok(())
}

/// Load `path` and a scanner configured from the nearest settings file,
/// with `--framework` taking precedence over its preset.
fn load(
    path: &Path,
    framework: Option<TestFramework>,
) -> Result<(FileBuffer, DeclarationScanner), CliError> {
    let buffer = FileBuffer::load(path)?;
    let mut settings = ServerSettings::discover(path)?;
    if let Some(framework) = framework {
        settings.selector.framework = framework;
    }
    let patterns = settings.selector.compile()?;
    Ok((buffer, DeclarationScanner::new(patterns)))
}

#[cfg(test)]
#[path = "../tests/src/main_tests.rs"]
mod tests;

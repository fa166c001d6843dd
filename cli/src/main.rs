use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rpc_openapi_core::{GenerateOptions, Generator, Router, SchemaBackend};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "rpc-openapi")]
#[command(about = "Generate an OpenAPI document from an RPC router description")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by every subcommand that generates a document.
#[derive(clap::Args)]
struct GenerateArgs {
    /// Router description (JSON)
    input: PathBuf,

    /// Options file (JSON, kebab-case keys); flags override its values
    #[arg(long)]
    options: Option<PathBuf>,

    /// Path prefix for every operation (e.g. /trpc)
    #[arg(long)]
    path_prefix: Option<String>,

    /// Disable the native schema converter and always use the legacy one
    #[arg(long)]
    legacy_only: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the OpenAPI document
    Generate {
        #[command(flatten)]
        args: GenerateArgs,

        /// Output document file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document title (info.title)
        #[arg(long)]
        title: Option<String>,

        /// Document version (info.version)
        #[arg(long)]
        api_version: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// List the generated operations, one `METHOD path operationId` per line
    Routes {
        #[command(flatten)]
        args: GenerateArgs,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            args,
            output,
            title,
            api_version,
            format,
        } => {
            let mut options = load_options(args.options.as_deref())?;
            if let Some(title) = title {
                options.title = title;
            }
            if let Some(version) = api_version {
                options.version = version;
            }

            let document = run(&args, options)?;
            write_json(&document, output.as_ref(), format)?;
        }
        Commands::Routes { args } => {
            let options = load_options(args.options.as_deref())?;
            let document = run(&args, options)?;

            let mut out = BufWriter::new(io::stdout());
            for (path, method, operation) in document.operations() {
                writeln!(out, "{method} {path} {}", operation.operation_id)
                    .context("Failed to write routes")?;
            }
            out.flush().context("Failed to flush routes")?;
        }
    }

    Ok(())
}

fn run(args: &GenerateArgs, mut options: GenerateOptions) -> Result<rpc_openapi_core::Document> {
    if let Some(prefix) = &args.path_prefix {
        options.path_prefix = prefix.clone();
    }

    let router: Router = read_json(&args.input, "router")?;
    tracing::debug!(procedures = router.len(), "loaded router");

    let mut generator = Generator::new(options);
    if args.legacy_only {
        generator = generator.with_backend(SchemaBackend::legacy_only());
    }

    generator
        .generate(&router)
        .map_err(|e| anyhow::Error::from(e).context("Generation failed"))
}

fn load_options(path: Option<&Path>) -> Result<GenerateOptions> {
    match path {
        Some(path) => read_json(path, "options"),
        None => Ok(GenerateOptions::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {what} from: {}", path.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}

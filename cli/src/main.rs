use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use csm_docs_core::{CommandIndex, GrammarDocument, validate_grammar};
use csm_docs_db::{
    DEFAULT_CONFIG_FILE, DEFAULT_INDEX_FILE, DocumentationIndex, HoverResolver, PipelineConfig,
    run_pipeline, write_atomic,
};
use csm_docs_extract::{ExtractionReport, extract_with_report};
use csm_docs_grammar::synthesize;
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Output format for the extracted index.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum IndexFormat {
    Json,
    Yaml,
}

/// Output format for hover results.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum HoverFormat {
    Markdown,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "csm-docs")]
#[command(about = "CSM command documentation and TextMate grammar generator")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract the command index from an OpenCSM header.
    Extract(ExtractArgs),
    /// Synthesize the TextMate grammar from an index and the keyword catalog.
    Grammar(GrammarArgs),
    /// Run the full header → index → grammar pipeline.
    Build(BuildArgs),
    /// Look up hover documentation for a token.
    Hover(HoverArgs),
    /// Validate a persisted index and/or grammar.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// OpenCSM header file.
    #[arg(long)]
    header: PathBuf,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: IndexFormat,
    /// Output both the index and the extraction report.
    #[arg(long)]
    with_report: bool,
}

#[derive(Debug, Args)]
struct GrammarArgs {
    /// Command index (missing file means keyword-only grammar).
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    index: PathBuf,
    /// Pipeline configuration supplying keyword files and grammar identity.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Grammar name.
    #[arg(long)]
    name: Option<String>,
    /// Grammar scope name, e.g. source.csm.
    #[arg(long)]
    scope_name: Option<String>,
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Path to the pipeline configuration.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Override the configured header path.
    #[arg(long)]
    header: Option<PathBuf>,
    /// Override the configured index path.
    #[arg(long)]
    index: Option<PathBuf>,
    /// Override the configured grammar path.
    #[arg(long)]
    grammar: Option<PathBuf>,
    /// Write the build report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct HoverArgs {
    /// Token under the cursor.
    token: String,
    /// Command index.
    #[arg(long, default_value = DEFAULT_INDEX_FILE)]
    index: PathBuf,
    /// Output format.
    #[arg(long, default_value = "markdown")]
    format: HoverFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Command index to validate.
    #[arg(long)]
    index: Option<PathBuf>,
    /// Grammar to validate.
    #[arg(long)]
    grammar: Option<PathBuf>,
}

#[derive(Serialize)]
struct ExtractOutput<'a> {
    commands: &'a CommandIndex,
    report: &'a ExtractionReport,
}

fn main() {
    let cli = Cli::parse();

    let result = init_logging(cli.verbose).and_then(|()| match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Grammar(args) => run_grammar(args),
        Command::Build(args) => run_build(args),
        Command::Hover(args) => run_hover(args),
        Command::Validate(args) => run_validate(args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) -> Result<(), String> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| format!("Failed to install logger: {err}"))
}

fn run_extract(args: ExtractArgs) -> Result<(), String> {
    let text = fs::read_to_string(&args.header)
        .map_err(|err| format!("Failed to read '{}': {err}", args.header.display()))?;
    let (commands, report) = extract_with_report(&text);

    for warning in report.warnings() {
        eprintln!("warning: {warning}");
    }

    if let (Some(path), false, IndexFormat::Json) = (&args.output, args.with_report, args.format) {
        DocumentationIndex::new(commands)
            .save(path)
            .map_err(|e| e.to_string())?;
        info!(path = %path.display(), "Wrote documentation index");
        return Ok(());
    }

    let raw = if args.with_report {
        let output = ExtractOutput {
            commands: &commands,
            report: &report,
        };
        render(&output, args.format)?
    } else {
        render(&commands, args.format)?
    };

    match &args.output {
        Some(path) => write_output(path, &raw)?,
        None => print!("{raw}"),
    }
    Ok(())
}

fn run_grammar(args: GrammarArgs) -> Result<(), String> {
    let config = PipelineConfig::load_or_default(&args.config).map_err(|e| e.to_string())?;
    let index = DocumentationIndex::load_or_empty(&args.index).map_err(|e| e.to_string())?;
    let catalog = config.catalog().map_err(|e| e.to_string())?;

    let mut options = config.grammar_options();
    if let Some(name) = args.name {
        options.name = name;
    }
    if let Some(scope_name) = args.scope_name {
        options.scope_name = scope_name;
    }

    let grammar = synthesize(&catalog, index.names(), &options).map_err(|e| e.to_string())?;
    let raw = grammar
        .to_json_pretty()
        .map_err(|err| format!("JSON serialization failed: {err}"))?;

    match &args.output {
        Some(path) => write_output(path, &raw)?,
        None => print!("{raw}"),
    }
    Ok(())
}

fn run_build(args: BuildArgs) -> Result<(), String> {
    let mut config = PipelineConfig::load_or_default(&args.config).map_err(|e| e.to_string())?;
    if let Some(header) = args.header {
        config.paths.header = header;
    }
    if let Some(index) = args.index {
        config.paths.index = index;
    }
    if let Some(grammar) = args.grammar {
        config.paths.grammar = grammar;
    }

    let report = run_pipeline(&config).map_err(|e| e.to_string())?;
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if let Some(path) = &args.report {
        report.save(path).map_err(|e| e.to_string())?;
    }

    println!(
        "Built grammar '{}' from {} command(s) (index {}, {}).",
        config.paths.grammar.display(),
        report.commands,
        report.index_source,
        if report.grammar_written {
            "written"
        } else {
            "unchanged"
        }
    );
    Ok(())
}

fn run_hover(args: HoverArgs) -> Result<(), String> {
    let resolver = HoverResolver::from_path(&args.index).map_err(|e| e.to_string())?;
    let Some(payload) = resolver.resolve(&args.token) else {
        eprintln!("no documentation for '{}'", args.token);
        return Ok(());
    };

    match args.format {
        HoverFormat::Markdown => print!("{}", payload.to_markdown()),
        HoverFormat::Json => {
            let raw = serde_json::to_string_pretty(&payload)
                .map_err(|err| format!("JSON serialization failed: {err}"))?;
            println!("{raw}");
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    if args.index.is_none() && args.grammar.is_none() {
        return Err("Specify at least one of --index or --grammar".to_string());
    }

    let mut problems = Vec::new();

    if let Some(path) = &args.index {
        let index = DocumentationIndex::load(path).map_err(|e| e.to_string())?;
        let errors = index.validate();
        if errors.is_empty() {
            println!("Validated index '{}' ({} command(s)).", path.display(), index.len());
        }
        problems.extend(errors.iter().map(|e| format!("{}: {e}", path.display())));
    }

    if let Some(path) = &args.grammar {
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
        let grammar: GrammarDocument = serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?;
        let errors = validate_grammar(&grammar);
        if errors.is_empty() {
            println!(
                "Validated grammar '{}' ({} repository entries).",
                path.display(),
                grammar.repository.len()
            );
        }
        problems.extend(errors.iter().map(|e| format!("{}: {e}", path.display())));
    }

    if problems.is_empty() {
        return Ok(());
    }
    for problem in &problems {
        eprintln!("{problem}");
    }
    Err(format!("{} validation error(s)", problems.len()))
}

fn render<T: Serialize>(value: &T, format: IndexFormat) -> Result<String, String> {
    match format {
        IndexFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut raw| {
                raw.push('\n');
                raw
            })
            .map_err(|e| format!("JSON serialization failed: {e}")),
        IndexFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

fn write_output(path: &Path, raw: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    write_atomic(path, raw.as_bytes()).map_err(|e| e.to_string())?;
    info!(path = %path.display(), "Wrote output");
    Ok(())
}

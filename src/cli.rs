//! Command-line interface for codeassist.

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::assistant::CodeAssistant;
use crate::checker::{self, StaticChecker};
use crate::config::{self, Config};
use crate::llm::{RefactorStyle, Task};
use crate::models::{any_at_least, Severity};
use crate::report::{self, FileFindings};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CODEASSIST_LOG";

const STDIN_LABEL: &str = "<stdin>";

/// AI code assistant - completion, refactoring, documentation and
/// explanation through a language model, plus local bare-except detection.
#[derive(Parser)]
#[command(name = "codeassist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model to use (overrides config and CODEASSIST_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Suggest completions for a code fragment
    Complete(CompleteArgs),
    /// Find bugs: local bare-except check plus model review
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Refactor code following a style
    Refactor(RefactorArgs),
    /// Generate documentation for code
    Document(TextArgs),
    /// Explain code in plain language
    Explain(TextArgs),
    /// Run every capability on built-in examples
    Demo,
    /// Write a config file template
    Init(InitArgs),
}

/// Where the code comes from.
#[derive(Args)]
pub struct InputArgs {
    /// Input file ('-' or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Inline code instead of a file
    #[arg(short, long, conflicts_with = "input")]
    pub code: Option<String>,
}

#[derive(Args)]
pub struct CompleteArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of suggestions to request
    #[arg(short = 'n', long, default_value_t = 3)]
    pub max_suggestions: usize,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// File or directory to analyze ('-' or omitted reads stdin)
    pub path: Option<PathBuf>,

    /// Inline code instead of a path
    #[arg(short, long, conflicts_with = "path")]
    pub code: Option<String>,

    /// Only run local checks (no network)
    #[arg(long)]
    pub static_only: bool,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Lowest severity that fails the run: low, medium, or high
    #[arg(long, default_value = "low")]
    pub fail_on: String,
}

#[derive(Args)]
pub struct RefactorArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Refactoring style: clean_code, performance, or readability
    #[arg(short, long, default_value = "clean_code")]
    pub style: String,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Args)]
pub struct TextArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "codeassist.yaml")]
    pub output: PathBuf,
}

/// Install the stderr log subscriber.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore the error when a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Complete(args) => run_complete(&cli.global, args),
        Commands::Analyze(args) => run_analyze(&cli.global, args),
        Commands::Refactor(args) => run_refactor(&cli.global, args),
        Commands::Document(args) => run_text(&cli.global, Task::Document, args),
        Commands::Explain(args) => run_text(&cli.global, Task::Explain, args),
        Commands::Demo => run_demo(&cli.global),
        Commands::Init(args) => run_init(args),
    }
}

/// Load config and build an assistant, applying `--model`.
pub fn build_assistant(global: &GlobalArgs) -> anyhow::Result<CodeAssistant> {
    let mut config = Config::load(global.config.as_deref())?;
    if let Some(model) = &global.model {
        config.model = model.clone();
        config.validate()?;
    }
    if config.api_key.is_empty() {
        tracing::warn!(
            "no API key configured; set {} or api_key in the config file",
            config::API_KEY_ENV
        );
    }
    Ok(CodeAssistant::from_config(&config))
}

fn check_format(format: &str, allowed: &[&str]) -> bool {
    if allowed.contains(&format) {
        return true;
    }
    let quoted: Vec<String> = allowed.iter().map(|f| format!("'{}'", f)).collect();
    eprintln!(
        "Error: invalid format {:?}, must be {}",
        format,
        quoted.join(" or ")
    );
    false
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Read code from `--code`, a file, or stdin.
fn read_input(input: &InputArgs) -> anyhow::Result<String> {
    if let Some(code) = &input.code {
        return Ok(code.clone());
    }
    match &input.input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e)),
        _ => read_stdin(),
    }
}

/// Run the complete command.
pub fn run_complete(global: &GlobalArgs, args: &CompleteArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format, &["pretty", "json"]) {
        return Ok(EXIT_ERROR);
    }
    let code = read_input(&args.input)?;
    let assistant = build_assistant(global)?;

    let suggestions = assistant.complete(&code, args.max_suggestions);

    match args.format.as_str() {
        "json" => report::write_json_suggestions(assistant.model(), &suggestions)?,
        _ => report::write_pretty_suggestions(&suggestions),
    }
    Ok(EXIT_SUCCESS)
}

/// Gather (label, source) pairs for the analyze command.
fn analyze_inputs(args: &AnalyzeArgs) -> anyhow::Result<Vec<(String, String)>> {
    if let Some(code) = &args.code {
        return Ok(vec![("<inline>".to_string(), code.clone())]);
    }
    let path = match &args.path {
        Some(p) if p != Path::new("-") => p,
        _ => return Ok(vec![(STDIN_LABEL.to_string(), read_stdin()?)]),
    };

    let files = checker::collect_python_files(path)
        .map_err(|e| anyhow::anyhow!("cannot access path {:?}: {}", path, e))?;

    let mut inputs = Vec::with_capacity(files.len());
    for file in files {
        let source = std::fs::read_to_string(&file)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", file.display(), e))?;
        inputs.push((file.to_string_lossy().to_string(), source));
    }
    Ok(inputs)
}

/// Run the analyze command.
pub fn run_analyze(global: &GlobalArgs, args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format, &["pretty", "json", "sarif"]) {
        return Ok(EXIT_ERROR);
    }
    let fail_on: Severity = match args.fail_on.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let inputs = analyze_inputs(args)?;
    if inputs.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let assistant = if args.static_only {
        None
    } else {
        Some(build_assistant(global)?)
    };
    let static_checker = StaticChecker::default();

    let mut results = Vec::with_capacity(inputs.len());
    let mut remote_error = None;

    for (label, source) in &inputs {
        let findings = match &assistant {
            Some(assistant) => {
                let (findings, error) = assistant.analyze_partial(source);
                if let Some(e) = error {
                    tracing::warn!(file = %label, error = %e, "error in AI bug detection");
                    remote_error.get_or_insert_with(|| e.to_string());
                }
                findings
            }
            None => static_checker.check(source),
        };
        results.push(FileFindings {
            file: label.clone(),
            findings,
        });
    }

    match args.format.as_str() {
        "json" => report::write_json_findings(&results, remote_error.as_deref())?,
        "sarif" => report::write_sarif(&results)?,
        _ => report::write_pretty_findings(&results, remote_error.as_deref()),
    }

    if results.iter().any(|r| any_at_least(&r.findings, fail_on)) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the refactor command.
pub fn run_refactor(global: &GlobalArgs, args: &RefactorArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format, &["pretty", "json"]) {
        return Ok(EXIT_ERROR);
    }
    let style: RefactorStyle = match args.style.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let code = read_input(&args.input)?;
    let assistant = build_assistant(global)?;

    let refactored = assistant.refactor(&code, style);
    write_text(&args.format, Task::Refactor, assistant.model(), &refactored)?;
    Ok(EXIT_SUCCESS)
}

/// Run the document or explain command.
pub fn run_text(global: &GlobalArgs, task: Task, args: &TextArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format, &["pretty", "json"]) {
        return Ok(EXIT_ERROR);
    }
    let code = read_input(&args.input)?;
    let assistant = build_assistant(global)?;

    let text = match task {
        Task::Document => assistant.document(&code),
        _ => assistant.explain(&code),
    };
    write_text(&args.format, task, assistant.model(), &text)?;
    Ok(EXIT_SUCCESS)
}

fn write_text(format: &str, task: Task, model: &str, text: &str) -> anyhow::Result<()> {
    match format {
        "json" => report::write_json_text(task.as_str(), model, text),
        _ => {
            report::write_pretty_text(task.as_str(), text);
            Ok(())
        }
    }
}

const DEMO_COMPLETION: &str = "def calculate_fibonacci(n):";

const DEMO_BUGGY: &str = r#"
def divide(a, b):
    return a / b

try:
    result = divide(10, 0)
except:
    pass
"#;

const DEMO_MESSY: &str = r#"
def calc(x,y,z):
    a=x+y
    b=a*z
    return b
"#;

const DEMO_EXPLAIN: &str = "lambda x: reduce(lambda a,b: a*b, range(1, x+1))";

/// Run every capability on fixed snippets and print the results.
pub fn run_demo(global: &GlobalArgs) -> anyhow::Result<i32> {
    let assistant = build_assistant(global)?;

    println!("\n=== Code Completion ===");
    for (i, suggestion) in assistant.complete(DEMO_COMPLETION, 3).iter().enumerate() {
        println!("\nSuggestion {}:", i + 1);
        println!("{}", suggestion.code);
    }

    println!("\n=== Bug Detection ===");
    for bug in assistant.analyze(DEMO_BUGGY) {
        println!(
            "Line {}: [{}] {}",
            bug.line_number, bug.severity, bug.description
        );
    }

    println!("\n=== Code Refactoring ===");
    println!("Refactored code:");
    println!("{}", assistant.refactor(DEMO_MESSY, RefactorStyle::CleanCode));

    println!("\n=== Code Explanation ===");
    println!("{}", assistant.explain(DEMO_EXPLAIN));

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, config::TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set {} or edit api_key in {}", config::API_KEY_ENV, args.output.display());
    println!("  2. Run: codeassist analyze path/to/code.py");

    Ok(EXIT_SUCCESS)
}

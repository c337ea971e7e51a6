//! csvreconcile CLI - compare two comma-separated exports
//!
//! # Main Commands
//!
//! ```bash
//! csvreconcile compare left.csv right.csv     # Normalized exclusive rows
//! csvreconcile intersect left.csv right.csv   # Raw shared rows
//! csvreconcile diff left.csv right.csv        # Raw exclusive rows
//! csvreconcile report left.csv right.csv      # Every view plus metadata
//! csvreconcile serve                          # Start HTTP server (port 3000)
//! ```
//!
//! # Inspection Commands
//!
//! ```bash
//! csvreconcile headers input.csv              # Show the detected header
//! csvreconcile normalize "  Foo  Bar "        # Normalize one value
//! csvreconcile validate-options opts.json     # Check an options file
//! csvreconcile policy                         # Show the normalization policy
//! ```

use clap::{Args, Parser, Subcommand};
use csvreconcile::{
    load_file, load_options_file, normalize, parse_dataset, policy_description, reconcile_files,
    ComparisonContext, ComparisonOptions, MergeRule, OptionsError, OptionsPatch, ServerConfig, Side,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "csvreconcile")]
#[command(about = "Reconcile two comma-separated datasets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Comparison options: an optional JSON file, then flags on top.
#[derive(Args, Debug)]
struct OptionsArgs {
    /// Options JSON file (caseSensitive, normalizeWhitespace, mergeColumns)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Compare values case-sensitively (`--case-sensitive=false` to turn off)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    case_sensitive: Option<bool>,

    /// Collapse whitespace runs (`--normalize-whitespace=false` removes all whitespace)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    normalize_whitespace: Option<bool>,

    /// Merge rule, e.g. `first+last=name` or `first+last=name:-` (repeatable)
    #[arg(long = "merge", value_name = "SRC+SRC=TARGET[:SEP]")]
    merge: Vec<MergeRule>,
}

impl OptionsArgs {
    fn patch(&self) -> OptionsPatch {
        OptionsPatch {
            case_sensitive: self.case_sensitive,
            normalize_whitespace: self.normalize_whitespace,
            merge_columns: (!self.merge.is_empty()).then(|| self.merge.clone()),
        }
    }

    fn resolve(&self) -> Result<ComparisonOptions, OptionsError> {
        let base = match self.options {
            Some(ref path) => load_options_file(path)?,
            None => ComparisonOptions::default(),
        };
        let patch = self.patch();
        if self.options.is_some() && !patch.is_empty() {
            eprintln!("   Command-line flags override the options file");
        }
        let options = base.merged(patch);
        options.validate()?;
        Ok(options)
    }
}

/// Where and how to print results.
#[derive(Args, Debug)]
struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print result lines instead of JSON
    #[arg(long)]
    lines: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalized comparison: rows of each side with no equal row on the other
    Compare {
        left: PathBuf,
        right: PathBuf,
        #[command(flatten)]
        options: OptionsArgs,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Raw intersection: left rows found verbatim in the right dataset
    Intersect {
        left: PathBuf,
        right: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Raw difference: rows of each side not found verbatim on the other
    Diff {
        left: PathBuf,
        right: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Every view plus dataset metadata, as JSON
    Report {
        left: PathBuf,
        right: PathBuf,
        #[command(flatten)]
        options: OptionsArgs,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the detected header of a dataset
    Headers {
        input: PathBuf,
    },

    /// Normalize a single value
    Normalize {
        value: String,
        #[command(flatten)]
        options: OptionsArgs,
    },

    /// Validate an options JSON file
    ValidateOptions {
        input: PathBuf,
    },

    /// Show the normalization policy
    Policy,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: CSVRECONCILE_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare { left, right, options, out } => cmd_compare(&left, &right, &options, &out),
        Commands::Intersect { left, right, out } => cmd_intersect(&left, &right, &out),
        Commands::Diff { left, right, out } => cmd_diff(&left, &right, &out),
        Commands::Report { left, right, options, output } => cmd_report(&left, &right, &options, output.as_deref()),
        Commands::Headers { input } => cmd_headers(&input),
        Commands::Normalize { value, options } => cmd_normalize(&value, &options),
        Commands::ValidateOptions { input } => cmd_validate_options(&input),
        Commands::Policy => cmd_policy(),
        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Load both files into a context.
fn load_context(left: &Path, right: &Path, options: ComparisonOptions) -> Result<ComparisonContext, Box<dyn std::error::Error>> {
    let mut context = ComparisonContext::new(options);
    for (side, path) in [(Side::Left, left), (Side::Right, right)] {
        eprintln!("📄 Reading {} dataset: {}", side, path.display());
        let dataset = load_file(path)?;
        eprintln!("   Encoding: {}", dataset.encoding);
        context.set_dataset(side, dataset.text);
    }
    Ok(context)
}

fn cmd_compare(left: &Path, right: &Path, options: &OptionsArgs, out: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let context = load_context(left, right, options.resolve()?)?;
    let result = context.compare().ok_or("Nothing to compare")?;

    eprintln!(
        "⚙️  {} only in left, {} only in right",
        result.only_in_left.len().saturating_sub(1),
        result.only_in_right.len().saturating_sub(1)
    );

    if out.lines {
        let mut text = String::from("# only in left\n");
        text.push_str(&result.only_in_left.join("\n"));
        text.push_str("\n# only in right\n");
        text.push_str(&result.only_in_right.join("\n"));
        write_output(&text, out.output.as_deref())
    } else {
        write_json(&result, out.output.as_deref())
    }
}

fn cmd_intersect(left: &Path, right: &Path, out: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let context = load_context(left, right, ComparisonOptions::default())?;
    let result = context.intersect().ok_or("Nothing to intersect")?;

    eprintln!("⚙️  {} identical rows", result.intersection.len());

    if out.lines {
        let mut lines = vec![result.headers.join(",")];
        lines.extend(result.intersection);
        write_output(&lines.join("\n"), out.output.as_deref())
    } else {
        write_json(&result, out.output.as_deref())
    }
}

fn cmd_diff(left: &Path, right: &Path, out: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let context = load_context(left, right, ComparisonOptions::default())?;
    let result = context.difference().ok_or("Nothing to compare")?;

    eprintln!(
        "⚙️  {} only in left, {} only in right",
        result.only_in_left.len(),
        result.only_in_right.len()
    );

    if out.lines {
        let text = result
            .only_in_left
            .iter()
            .map(|l| format!("< {}", l))
            .chain(result.only_in_right.iter().map(|l| format!("> {}", l)))
            .collect::<Vec<_>>()
            .join("\n");
        write_output(&text, out.output.as_deref())
    } else {
        write_json(&result, out.output.as_deref())
    }
}

fn cmd_report(left: &Path, right: &Path, options: &OptionsArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let report = reconcile_files(left, right, options.resolve()?)?;
    write_json(&report, output)?;
    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_headers(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_file(input)?;
    let parsed = parse_dataset(&dataset.text);

    match parsed.header.header_index {
        Some(idx) => {
            eprintln!("📋 Header on line {} ({} columns):", idx + 1, parsed.header.headers.len());
            for (i, col) in parsed.header.headers.iter().enumerate() {
                eprintln!("   [{:2}] {}", i + 1, col);
            }
            eprintln!("   {} data rows", parsed.rows.len());
        }
        None => eprintln!("⚠️  No header row found"),
    }

    write_json(&parsed.header, None)
}

fn cmd_normalize(value: &str, options: &OptionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = options.resolve()?;
    println!("{}", normalize(value, &options));
    Ok(())
}

fn cmd_validate_options(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    match load_options_file(input) {
        Ok(options) => {
            eprintln!("✅ Options valid");
            write_json(&options, None)
        }
        Err(OptionsError::Schema { errors }) => {
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            Err(format!("{} schema error(s)", errors.len()).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_policy() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", policy_description());
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config = config.with_port(port);
    }
    csvreconcile::server::start_server(config).await?;
    Ok(())
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    write_output(&json, path)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

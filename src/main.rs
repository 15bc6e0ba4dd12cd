use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use query_disassembler::source::{analyze_files, discover_query_files, read_query_file};
use query_disassembler::{
    extract_field_names, extract_table_names, DacpacSchemaProvider, ExtractionOptions,
    QueryParser, WildcardDetection,
};

#[derive(Parser)]
#[command(name = "query-disassembler")]
#[command(author, version, about = "List the tables and fields referenced by T-SQL queries")]
struct Cli {
    /// Enable verbose output (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where to read the query from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct QueryInput {
    /// Query text
    #[arg(short, long)]
    query: Option<String>,

    /// File containing the query
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl QueryInput {
    fn read(&self) -> Result<String> {
        match (&self.query, &self.file) {
            (Some(query), _) => Ok(query.clone()),
            (None, Some(path)) => Ok(read_query_file(path)?),
            (None, None) => bail!("either --query or --file is required"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tables referenced by a query, one per line
    Tables {
        #[command(flatten)]
        input: QueryInput,
    },

    /// Print the field names referenced by a query, one per line
    Fields {
        #[command(flatten)]
        input: QueryInput,
    },

    /// Print field names, expanding wildcard queries from a .dacpac schema
    Resolve {
        #[command(flatten)]
        input: QueryInput,

        /// Path to the .dacpac package providing table columns
        #[arg(short, long)]
        dacpac: PathBuf,

        /// Only expand queries whose select list contains `*` or `t.*`
        #[arg(long)]
        structural: bool,
    },

    /// Summarize tables, fields and parse errors of .sql files
    Check {
        /// A .sql file or a directory searched recursively
        #[arg(short, long)]
        path: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tables { input } => {
            for name in extract_table_names(&input.read()?) {
                println!("{}", name);
            }
        }
        Commands::Fields { input } => {
            for name in extract_field_names(&input.read()?) {
                println!("{}", name);
            }
        }
        Commands::Resolve {
            input,
            dacpac,
            structural,
        } => {
            let provider = DacpacSchemaProvider::new(&dacpac)?;
            let options = ExtractionOptions {
                wildcard_detection: if structural {
                    WildcardDetection::Structural
                } else {
                    WildcardDetection::Textual
                },
            };
            let parser = QueryParser::with_options(provider, options);
            let fields = parser
                .get_field_names_from_query(&input.read()?)
                .with_context(|| format!("Failed to resolve columns from {}", dacpac.display()))?;
            for name in fields {
                println!("{}", name);
            }
        }
        Commands::Check { path } => {
            let files = discover_query_files(&path);
            if files.is_empty() {
                bail!("No .sql files found in {}", path.display());
            }

            let reports = analyze_files(&files)?;
            let mut failed = 0;
            for report in &reports {
                println!("{}", report.path.display());
                println!("  tables: {}", report.table_names.join(", "));
                println!("  fields: {}", report.field_names.join(", "));
                for error in &report.errors {
                    println!("  {}", error);
                }
                if !report.is_clean() {
                    failed += 1;
                }
            }

            println!();
            println!("{} files, {} with errors", reports.len(), failed);
            if failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

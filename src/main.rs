use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, Table};
use scholar_sync::config::{find_config_file, get_config, load_config, Config};
use scholar_sync::graph::SimilarityGraphBuilder;
use scholar_sync::models::{Paper, SimilarityGraph};
use scholar_sync::pipeline::{
    load_document, AnalysisPipeline, QueryReport, QueryRequest, UploadReport,
};
use scholar_sync::utils::dedupe_papers;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scholar Sync - Literature analysis for research queries and uploaded papers
#[derive(Parser, Debug)]
#[command(name = "scholar-sync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search, classify and relate research papers", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Markdown report
    Markdown,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search both backends and analyze the papers found
    Analyze {
        /// Research query
        query: String,

        /// Number of papers to analyze
        #[arg(long, short = 'm')]
        max_results: Option<usize>,

        /// Earliest publication year
        #[arg(long)]
        start_year: Option<i32>,

        /// Latest publication year
        #[arg(long)]
        end_year: Option<i32>,
    },

    /// Analyze an uploaded PDF, TXT or MD document
    Upload {
        /// Path to the document
        file: PathBuf,
    },

    /// Build the similarity network of a JSON list of papers
    Graph {
        /// JSON file containing an array of papers
        input: PathBuf,
    },

    /// Remove duplicate papers from a JSON file
    Dedupe {
        /// JSON file containing an array of papers
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => get_config(),
    };

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = cli.output.resolve();

    match cli.command {
        Commands::Analyze {
            query,
            max_results,
            start_year,
            end_year,
        } => {
            let pipeline = AnalysisPipeline::from_config(&config)?;
            let request = QueryRequest::new(
                query,
                max_results.unwrap_or(config.search.default_results),
            )
            .years(start_year, end_year);
            let report = pipeline.analyze_query(&request).await?;
            output_query_report(&report, format)?;
        }

        Commands::Upload { file } => {
            let input = load_document(&file)?;
            let pipeline = AnalysisPipeline::from_config(&config)?;
            let report = pipeline.analyze_upload(&input).await?;
            output_upload_report(&report, format)?;
        }

        Commands::Graph { input } => {
            let papers = read_papers(&input)?;
            let graph = SimilarityGraphBuilder::new(config.graph.settings()).build(&papers);
            output_graph(&graph, format)?;
        }

        Commands::Dedupe { input, output } => {
            let papers = read_papers(&input)?;
            let before = papers.len();
            let deduped = dedupe_papers(papers);
            let output_json = serde_json::to_string_pretty(&deduped)?;
            match &output {
                Some(path) => std::fs::write(path, output_json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", output_json),
            }
            if !cli.quiet {
                eprintln!(
                    "Deduplicated: {} -> {} papers",
                    before,
                    deduped.len()
                );
            }
        }

        Commands::Config => {
            println!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Install the tracing subscriber; logs go to stderr so stdout stays parseable
fn init_tracing(cli: &Cli, config: &Config) {
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    let json = config.logging.is_json();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scholar_sync={}", env_filter)),
        ))
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn read_papers(path: &Path) -> Result<Vec<Paper>> {
    let json_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let papers: Vec<Paper> = serde_json::from_str(&json_str)
        .with_context(|| format!("{} is not a JSON array of papers", path.display()))?;
    Ok(papers)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let keep: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", keep)
    } else {
        text.to_string()
    }
}

fn year_cell(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}

fn output_query_report(report: &QueryReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Markdown => {
            println!("{}\n", report.summary);
            println!("## Papers\n");
            for analysis in &report.analyses {
                let paper = &analysis.paper;
                println!("### {} ({})\n", paper.title, year_cell(paper.year));
                println!("*{}* | {}\n", paper.source, paper.author_line());
                for (kind, text) in analysis.sections.iter() {
                    println!("- **{}:** {}", kind.label(), text);
                }
                println!();
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let mut table = new_table(vec!["Title", "Year", "Source", "Method Used", "Limitations"]);
            for (analysis, row) in report.analyses.iter().zip(&report.comparison) {
                table.add_row(vec![
                    Cell::new(truncate(&row.paper, 50)).add_attribute(Attribute::Bold),
                    Cell::new(year_cell(row.year)),
                    Cell::new(analysis.paper.source),
                    Cell::new(truncate(&row.method_used, 60)),
                    Cell::new(truncate(&row.limitations, 60)),
                ]);
            }
            println!("{table}");
            println!("\n{}", report.summary);
            print_graph_summary(&report.graph);
        }
    }
    Ok(())
}

fn output_upload_report(report: &UploadReport, format: OutputFormat) -> Result<()> {
    let paper = &report.analysis.paper;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Markdown => {
            println!("## {}\n", paper.title);
            println!("- **File:** {}", report.filename);
            println!("- **Authors:** {}", paper.author_line());
            println!("- **Year:** {}", year_cell(paper.year));
            println!("- **Source:** {}\n", report.provenance);
            for (kind, text) in report.analysis.sections.iter() {
                println!("### {}\n\n{}\n", kind.label(), text);
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let mut meta = new_table(vec!["Field", "Value"]);
            meta.add_row(vec!["Title", paper.title.as_str()]);
            meta.add_row(vec!["File", report.filename.as_str()]);
            meta.add_row(vec!["Authors", paper.author_line().as_str()]);
            meta.add_row(vec!["Year", year_cell(paper.year).as_str()]);
            meta.add_row(vec!["Venue", paper.venue.as_str()]);
            meta.add_row(vec!["Source", report.provenance.as_str()]);
            println!("{meta}");

            let mut sections = new_table(vec!["Section", "Text"]);
            for (kind, text) in report.analysis.sections.iter() {
                sections.add_row(vec![
                    Cell::new(kind.label()).add_attribute(Attribute::Bold),
                    Cell::new(text),
                ]);
            }
            println!("{sections}");
        }
    }
    Ok(())
}

fn output_graph(graph: &SimilarityGraph, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(graph)?);
        }
        OutputFormat::Markdown => {
            if let Some(message) = &graph.placeholder {
                println!("_{}_", message);
            }
            for edge in &graph.edges {
                println!(
                    "- {} -- {} ({:.3})",
                    graph.nodes[edge.source].label, graph.nodes[edge.target].label, edge.weight
                );
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let mut nodes = new_table(vec!["#", "Title", "X", "Y", "Size", "Recency"]);
            for node in &graph.nodes {
                nodes.add_row(vec![
                    Cell::new(node.index),
                    Cell::new(truncate(&node.label, 50)).add_attribute(Attribute::Bold),
                    Cell::new(format!("{:.3}", node.x)),
                    Cell::new(format!("{:.3}", node.y)),
                    Cell::new(node.size),
                    Cell::new(format!("{:.2}", node.color_intensity)),
                ]);
            }
            println!("{nodes}");

            if !graph.edges.is_empty() {
                let mut edges = new_table(vec!["Source", "Target", "Weight"]);
                for edge in &graph.edges {
                    edges.add_row(vec![
                        Cell::new(edge.source),
                        Cell::new(edge.target),
                        Cell::new(format!("{:.3}", edge.weight)),
                    ]);
                }
                println!("{edges}");
            }
            print_graph_summary(graph);
        }
    }
    Ok(())
}

fn print_graph_summary(graph: &SimilarityGraph) {
    match &graph.placeholder {
        Some(message) => println!("\n{}", message),
        None => println!(
            "\nSimilarity network: {} papers, {} links",
            graph.node_count(),
            graph.edge_count()
        ),
    }
}

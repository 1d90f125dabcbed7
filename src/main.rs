use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rowtree::config::{Config, DatasetConfig, DatasetFormat};
use rowtree::handler::{AREA_MAP_TITLE, PageHandler, build_dataset};
use rowtree::model::{ConflictPolicy, RowPolicy, TreeVariant};
use rowtree::render::{Layout, parse_outlines, render_area_map};
use rowtree::source::DirSource;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "rowtree")]
#[command(author, version, about = "Build hierarchies from flat rows and render them as pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a hierarchy from a dataset file and print it
    Tree {
        /// CSV or JSON file with one row per leaf
        input: PathBuf,

        /// Shape of the path column (dotted, file-path, admin-code)
        #[arg(long, default_value = "dotted")]
        variant: TreeVariant,

        /// Column holding the path (default depends on the variant)
        #[arg(long)]
        path_column: Option<String>,

        /// Column holding the weight (default depends on the variant)
        #[arg(long)]
        weight_column: Option<String>,

        /// Label of the root node
        #[arg(long)]
        root_label: Option<String>,

        /// Input format, detected from the content if absent
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Skip malformed rows instead of failing
        #[arg(long)]
        lenient: bool,

        /// Fail on rows disagreeing whether a path is a leaf
        #[arg(long)]
        reject_conflicts: bool,

        /// Print an indented tree instead of JSON
        #[arg(long)]
        print: bool,

        /// Pretty-print the JSON output
        #[arg(long, conflicts_with = "print")]
        pretty: bool,
    },
    /// Render the page of a layout (circle-pack, partition, treemap, radial)
    Page {
        layout: Layout,

        /// TOML file with datasets and pages (bundled defaults if absent)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory dataset locations are relative to
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        /// Write the page here instead of to stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Render an area map from an outline file
    Map {
        input: PathBuf,

        #[arg(long, default_value = AREA_MAP_TITLE)]
        title: String,

        /// Write the page here instead of to stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    Csv,
    Json,
    Nested,
}

impl From<InputFormat> for DatasetFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Csv => DatasetFormat::Csv,
            InputFormat::Json => DatasetFormat::Json,
            InputFormat::Nested => DatasetFormat::Nested,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tree {
            input,
            variant,
            path_column,
            weight_column,
            root_label,
            format,
            lenient,
            reject_conflicts,
            print,
            pretty,
        } => {
            let dataset = DatasetConfig {
                path_column,
                weight_column,
                root_label,
                format: format.map(Into::into),
                row_policy: if lenient { RowPolicy::Lenient } else { RowPolicy::Strict },
                conflict_policy: if reject_conflicts {
                    ConflictPolicy::Reject
                } else {
                    ConflictPolicy::LastWins
                },
                ..DatasetConfig::new(dataset_name(&input), input.display().to_string(), variant)
            };
            let text = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let tree = build_dataset(&dataset, &text)?;

            if print {
                tree.print_tree();
            } else if pretty {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                println!("{}", serde_json::to_string(&tree)?);
            }
        }
        Commands::Page {
            layout,
            config,
            data_dir,
            output,
        } => {
            let config = match config {
                Some(path) => Config::load(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => Config::default(),
            };
            let handler = PageHandler::new(config, DirSource::new(data_dir));
            let html = handler
                .render(layout)
                .with_context(|| format!("failed to render page '{layout}'"))?;
            write_output(output.as_deref(), &html)?;
        }
        Commands::Map {
            input,
            title,
            output,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let outlines = parse_outlines(&text)
                .with_context(|| format!("failed to parse outlines in {}", input.display()))?;
            let html = render_area_map(&title, &outlines)?;
            write_output(output.as_deref(), &html)?;
        }
    }

    Ok(())
}

fn dataset_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

fn write_output(output: Option<&Path>, html: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = html.len(), "wrote page");
        }
        None => print!("{html}"),
    }
    Ok(())
}

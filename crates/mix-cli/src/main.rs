//! # mix-cli
//!
//! Command-line interface for MIX technical metadata.
//!
//! `mixer sort` puts an XML document into schema order, `mixer map` applies
//! a rule file to a source document and `mixer enrich` runs the full report
//! enrichment and writes one enriched record per report.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use mix_adapter_xml::{XmlParser, XmlSerializer};
use mix_ir::{Document, Element};
use mix_mapping::{MappingDsl, MappingEngine, TransformPolicy};
use mix_pipeline::{EnrichmentConfig, EnrichmentStats, Enricher, InMemoryHost};
use mix_schema::{SchemaLoader, SchemaOrderSorter, UnknownPlacement};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mixer")]
#[command(about = "MIX technical metadata tools")]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reorder an XML document into schema declaration order
    Sort {
        /// Input XML file
        input: PathBuf,

        /// Schema (XSD) whose element declarations define the order
        #[arg(short, long)]
        schema: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Placement of elements the schema does not declare
        #[arg(long, value_enum, default_value_t = Placement::First)]
        unknown: Placement,
    },

    /// Apply mapping rules to a source document
    Map {
        /// Source XML file the rule queries run against
        source: PathBuf,

        /// YAML rule file
        #[arg(short, long)]
        rules: PathBuf,

        /// Existing destination document to extend
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Root element name for a new destination
        #[arg(long, default_value = "mix", conflicts_with = "destination")]
        root: String,

        /// Treat unknown transform tokens as rational-to-decimal
        #[arg(long)]
        lenient: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Enrich the MIX records of characterization reports
    Enrich {
        /// Report files; the image name of each is its file stem and must be
        /// unique
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Enrichment configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory receiving `<report-stem>.mix.xml` files
        #[arg(long)]
        output_dir: PathBuf,

        /// Image names present in the host document (default: every report)
        #[arg(long = "page")]
        pages: Vec<String>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Placement {
    First,
    Last,
}

impl From<Placement> for UnknownPlacement {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::First => UnknownPlacement::First,
            Placement::Last => UnknownPlacement::Last,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sort {
            input,
            schema,
            output,
            unknown,
        } => sort(&input, &schema, output.as_deref(), unknown.into()),
        Commands::Map {
            source,
            rules,
            destination,
            root,
            lenient,
            output,
        } => map(
            &source,
            &rules,
            destination.as_deref(),
            &root,
            lenient,
            output.as_deref(),
        ),
        Commands::Enrich {
            reports,
            config,
            output_dir,
            pages,
            json,
        } => enrich(&reports, &config, &output_dir, pages, json),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn sort(
    input: &Path,
    schema: &Path,
    output: Option<&Path>,
    placement: UnknownPlacement,
) -> anyhow::Result<()> {
    let order = SchemaLoader::new()
        .load_from_file(schema)
        .with_context(|| format!("loading schema {}", schema.display()))?;
    let mut document = parse(input)?;

    tracing::info!("Sorting {} by {}", input.display(), schema.display());
    SchemaOrderSorter::with_placement(order, placement).fix_order(&mut document.root);

    emit(&document.root, output)
}

fn map(
    source: &Path,
    rules: &Path,
    destination: Option<&Path>,
    root: &str,
    lenient: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let rule_set = MappingDsl::parse_file(rules)
        .with_context(|| format!("reading rules {}", rules.display()))?;
    let policy = if lenient {
        TransformPolicy::Lenient
    } else {
        TransformPolicy::Strict
    };
    let engine = MappingEngine::from_rule_set(&rule_set, policy)
        .with_context(|| format!("compiling rules {}", rules.display()))?;

    let source_document = parse(source)?;
    let mut target = match destination {
        Some(path) => parse(path)?.root,
        None => Element::new_in(root, engine.namespace()),
    };

    let report = engine.apply(&source_document.root, &mut target);
    tracing::info!(
        applied = report.applied,
        skipped = report.skipped,
        failed = report.failures.len(),
        "Mapped {}",
        source.display()
    );

    emit(&target, output)
}

fn enrich(
    reports: &[PathBuf],
    config_path: &Path,
    output_dir: &Path,
    pages: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let config = EnrichmentConfig::from_file(config_path)
        .with_context(|| format!("loading configuration {}", config_path.display()))?;
    let enricher = Enricher::new(&config).context("preparing enrichment")?;

    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(reports.len());
    let mut inputs = Vec::with_capacity(reports.len());
    for path in reports {
        let name = image_name(path)?;
        if let Some(first) = seen.insert(name.clone(), path) {
            bail!(
                "reports {} and {} share the image name '{name}'",
                first.display(),
                path.display()
            );
        }
        inputs.push((name, parse(path)?));
    }

    let mut host = if pages.is_empty() {
        InMemoryHost::with_pages(inputs.iter().map(|(name, _)| name.clone()))
    } else {
        InMemoryHost::with_pages(pages)
    };
    let names: Vec<String> = inputs.iter().map(|(name, _)| name.clone()).collect();

    let stats = enricher.run(inputs, &mut host).context("enriching reports")?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let serializer = XmlSerializer::new();
    for name in &names {
        if let Some(record) = host.record_for(name) {
            let path = output_dir.join(format!("{name}.mix.xml"));
            serializer
                .write_file(&path, record)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::debug!("Wrote {}", path.display());
        }
    }

    print_stats(&stats, json)
}

fn print_stats(stats: &EnrichmentStats, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        println!("reports:            {}", stats.reports);
        println!("enriched:           {}", stats.enriched);
        println!("without record:     {}", stats.without_record);
        println!("without page:       {}", stats.without_page);
        println!("transform failures: {}", stats.transform_failures);
    }
    Ok(())
}

fn image_name(path: &Path) -> anyhow::Result<String> {
    match path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) => Ok(stem.to_string()),
        None => bail!("cannot derive an image name from {}", path.display()),
    }
}

fn parse(path: &Path) -> anyhow::Result<Document> {
    XmlParser::new()
        .parse_file(path)
        .with_context(|| format!("parsing {}", path.display()))
}

fn emit(element: &Element, output: Option<&Path>) -> anyhow::Result<()> {
    let serializer = XmlSerializer::new();
    match output {
        Some(path) => serializer
            .write_file(path, element)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{}", serializer.to_string(element)?);
            Ok(())
        }
    }
}

//! triplemap CLI - Inspect and edit an auto-persisted graph file
//!
//! Usage:
//!   triplemap dump
//!   triplemap add <s> <p> <o>
//!   triplemap instances <class-iri>
//!   triplemap query "?s <urn:ex:p> ?o"
//!   triplemap describe <subject>

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use triplemap_autopersist::AutoPersistStore;
use triplemap_core::ntriples::parse_term;
use triplemap_core::vocab::rdf;
use triplemap_core::{
    AppConfig, GraphHandle, Iri, LoggingConfig, Node, Resource, Statement, TriplePattern,
};
use triplemap_graph::{MemoryStore, NamespaceRenameRule, Transformer, UriRenameRule};
use triplemap_reactor::{bridge, ClassRegistry, ReactorBase};

#[derive(Parser)]
#[command(name = "triplemap")]
#[command(about = "Inspect and edit an auto-persisted N-Triples store")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backing N-Triples file, overrides the configuration
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Mutations per commit, overrides the configuration
    #[arg(long, global = true)]
    threshold: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored graph as N-Triples
    Dump,
    /// Show statement and subject counts
    Stats,
    /// Add a statement (terms in N-Triples syntax)
    Add {
        subject: String,
        predicate: String,
        object: String,
    },
    /// Remove a statement (terms in N-Triples syntax)
    Remove {
        subject: String,
        predicate: String,
        object: String,
    },
    /// List subjects typed with a class
    Instances {
        /// Class IRI, with or without angle brackets
        class: String,
    },
    /// Replace one IRI everywhere
    RenameIri { from: String, to: String },
    /// Move every IRI from one namespace to another
    RenameNamespace { from: String, to: String },
    /// Run a single triple pattern, one JSON object per row
    Query {
        /// Pattern such as `?s <urn:ex:p> ?o`
        pattern: String,
    },
    /// Print statements about a subject and its registered types
    Describe { subject: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging);

    tracing::debug!(
        store = %config.persist.store_path.display(),
        threshold = config.persist.commit_threshold,
        "Opening store"
    );
    let store = AutoPersistStore::from_config(MemoryStore::new(), &config.persist)
        .with_context(|| format!("opening {}", config.persist.store_path.display()))?;
    let graph = GraphHandle::new(store);

    let outcome = run(&graph, cli.command);
    let closed = graph.write()?.close();

    outcome?;
    closed.context("committing store")?;
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?
            .with_env_override()?,
        None => AppConfig::from_env()?,
    };
    if let Some(store) = &cli.store {
        config.persist.store_path = store.clone();
    }
    if let Some(threshold) = cli.threshold {
        config.persist.commit_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(graph: &GraphHandle, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Dump => {
            let store = graph.read()?;
            print!("{}", triplemap_graph::dump(&*store)?);
        }
        Commands::Stats => {
            let store = graph.read()?;
            println!("statements: {}", store.size()?);
            println!("subjects:   {}", triplemap_graph::subject_count(&*store)?);
        }
        Commands::Add {
            subject,
            predicate,
            object,
        } => {
            let statement = parse_statement(&subject, &predicate, &object)?;
            tracing::info!(%statement, "Adding statement");
            graph.write()?.add_statement(statement)?;
        }
        Commands::Remove {
            subject,
            predicate,
            object,
        } => {
            let statement = parse_statement(&subject, &predicate, &object)?;
            tracing::info!(%statement, "Removing statement");
            graph.write()?.remove_statement(&statement)?;
        }
        Commands::Instances { class } => {
            let class = parse_iri(&class)?;
            for instance in ReactorBase::all_instances::<Resource>(graph, &class).to_vec()? {
                println!("{instance}");
            }
        }
        Commands::RenameIri { from, to } => {
            let transformer =
                Transformer::new().with_rule(UriRenameRule::new(parse_iri(&from)?, parse_iri(&to)?));
            let report = transformer.apply(&mut *graph.write()?)?;
            println!("{} statements rewritten", report.total());
        }
        Commands::RenameNamespace { from, to } => {
            let transformer = Transformer::new().with_rule(NamespaceRenameRule::new(from, to)?);
            let report = transformer.apply(&mut *graph.write()?)?;
            println!("{} statements rewritten", report.total());
        }
        Commands::Query { pattern } => {
            let rows = graph.read()?.query(&pattern)?;
            for row in rows {
                let json: serde_json::Map<String, serde_json::Value> = row
                    .into_iter()
                    .map(|(name, node)| (name, serde_json::Value::String(node.to_string())))
                    .collect();
                println!("{}", serde_json::Value::Object(json));
            }
        }
        Commands::Describe { subject } => {
            let subject = parse_resource(&subject)?;
            let pattern = TriplePattern::new(Some(subject.clone()), None, None);
            for statement in graph.read()?.find_statements(&pattern)? {
                println!("{statement}");
            }

            let registry = ClassRegistry::builtin();
            let classes: Vec<Iri> = bridge::get_all_values(graph, &subject, &rdf::TYPE).to_vec()?;
            for class in classes {
                match registry.type_name_for(&class) {
                    Some(type_name) => println!("# type {class} => {type_name}"),
                    None => println!("# type {class}"),
                }
            }
        }
    }
    Ok(())
}

fn parse_node(text: &str) -> anyhow::Result<Node> {
    parse_term(text).with_context(|| format!("invalid term {text:?}"))
}

fn parse_resource(text: &str) -> anyhow::Result<Resource> {
    let node = parse_node(text)?;
    node.as_resource()
        .ok_or_else(|| anyhow!("{text} is a literal, expected an IRI or blank node"))
}

/// Accepts `<iri>` or a bare IRI
fn parse_iri(text: &str) -> anyhow::Result<Iri> {
    let text = text.trim();
    if text.starts_with('<') {
        return match parse_node(text)? {
            Node::Iri(iri) => Ok(iri),
            other => bail!("{other} is not an IRI"),
        };
    }
    Ok(Iri::parse(text)?)
}

fn parse_statement(subject: &str, predicate: &str, object: &str) -> anyhow::Result<Statement> {
    Ok(Statement::new(
        parse_resource(subject)?,
        parse_iri(predicate)?,
        parse_node(object)?,
    ))
}

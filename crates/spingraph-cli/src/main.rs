//! Spingraph CLI
//!
//! Command-line front end for the SPIN algebra codec:
//! - `encode`: algebra JSON -> N-Triples
//! - `decode`: N-Triples / Turtle + root node -> algebra JSON
//! - `roundtrip`: encode, serialize, reparse and decode, then compare
//! - `vocab`: print the vocabulary schema

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use spingraph_algebra::{query_digest_v1, Query};
use spingraph_codec::{
    BuiltinRegistry, CodecConfig, FunctionMode, GraphDecoder, GraphEncoder, VocabularySchema,
};
use spingraph_rdf::ntriples::{parse_graph, parse_node};
use spingraph_rdf::{Graph, Node, RdfFormat};

/// Prefix of the root IRIs minted by `encode --named`.
const NAMED_ROOT_PREFIX: &str = "urn:spingraph:query:";

#[derive(Parser)]
#[command(name = "spingraph")]
#[command(author, version, about = "Spingraph: SPARQL algebra <-> RDF graph codec")]
struct Cli {
    #[command(flatten)]
    codec: CodecArgs,

    /// More log output on stderr (repeatable: info, debug, trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Codec settings shared by every command.
#[derive(Args, Debug, Clone, Default)]
struct CodecArgs {
    /// JSON file with codec settings (function_mode, max_depth, max_nodes, max_list_len)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit placeholders for unknown functions instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    /// Override the maximum recursion depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Register an extension function: `NAME=IRI` (repeatable)
    #[arg(long = "function", value_name = "NAME=IRI", value_parser = parse_function, global = true)]
    functions: Vec<(String, String)>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an algebra JSON file into N-Triples.
    Encode {
        /// Algebra JSON (`-` for stdin)
        input: PathBuf,
        /// Use a stable named root derived from the query digest
        #[arg(long)]
        named: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Decode the query rooted at `--root` from an RDF file.
    Decode {
        /// N-Triples (`.nt`) or Turtle (`.ttl`) file
        input: PathBuf,
        /// Root node: `<iri>`, `_:label` or a bare IRI
        #[arg(long)]
        root: String,
        /// Input syntax (`nt` or `ttl`); inferred from the extension by default
        #[arg(long)]
        format: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Encode, write N-Triples, reparse, decode and compare with the input.
    Roundtrip {
        /// Algebra JSON (`-` for stdin)
        input: PathBuf,
        /// Also print the intermediate N-Triples
        #[arg(long)]
        show_graph: bool,
    },

    /// Print the vocabulary schema.
    Vocab {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Encode { input, named, out } => {
            cmd_encode(&cli.codec, &input, named, out.as_ref())?;
        }
        Commands::Decode {
            input,
            root,
            format,
            out,
        } => {
            cmd_decode(&cli.codec, &input, &root, format.as_deref(), out.as_ref())?;
        }
        Commands::Roundtrip { input, show_graph } => {
            cmd_roundtrip(&cli.codec, &input, show_graph)?;
        }
        Commands::Vocab { json } => {
            cmd_vocab(json)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ============================================================================
// Settings
// ============================================================================

fn parse_function(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, iri)) if !name.is_empty() && !iri.is_empty() => {
            Ok((name.to_string(), iri.to_string()))
        }
        _ => Err(format!("expected NAME=IRI, got `{s}`")),
    }
}

impl CodecArgs {
    fn codec_config(&self) -> Result<CodecConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                CodecConfig::from_json(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => CodecConfig::default(),
        };
        if self.lenient {
            config.function_mode = FunctionMode::Lenient;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        debug!(?config, "codec config");
        Ok(config)
    }

    fn registry(&self) -> Arc<BuiltinRegistry> {
        let mut registry = BuiltinRegistry::sparql();
        for (name, iri) in &self.functions {
            registry = registry.with_function(name.as_str(), iri.as_str());
        }
        Arc::new(registry)
    }

    fn encoder(&self) -> Result<GraphEncoder> {
        Ok(GraphEncoder::new(self.registry()).with_config(self.codec_config()?))
    }

    fn decoder(&self) -> Result<GraphDecoder> {
        Ok(GraphDecoder::new(self.registry()).with_config(self.codec_config()?))
    }
}

// ============================================================================
// I/O helpers
// ============================================================================

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_query(path: &Path) -> Result<Query> {
    let text = read_input(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid algebra document", path.display()))
}

fn write_output(out: Option<&PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn input_format(path: &Path, explicit: Option<&str>) -> Result<RdfFormat> {
    match explicit {
        Some("nt") | Some("ntriples") => Ok(RdfFormat::NTriples),
        Some("ttl") | Some("turtle") => Ok(RdfFormat::Turtle),
        Some(other) => bail!("unknown format `{other}` (expected nt or ttl)"),
        None => RdfFormat::from_path(path).ok_or_else(|| {
            anyhow!(
                "cannot infer the syntax of {}; pass --format nt|ttl",
                path.display()
            )
        }),
    }
}

/// Accepts the N-Triples forms plus a bare IRI.
fn root_node(arg: &str) -> Result<Node> {
    let arg = arg.trim();
    if arg.starts_with('<') || arg.starts_with("_:") {
        return parse_node(arg).with_context(|| format!("invalid root `{arg}`"));
    }
    if arg.is_empty() {
        bail!("empty root");
    }
    Ok(Node::named(arg))
}

fn named_root(query: &Query) -> Result<String> {
    let digest = query_digest_v1(query).context("failed to digest query")?;
    let hex = digest.rsplit(':').next().unwrap_or(&digest);
    Ok(format!("{NAMED_ROOT_PREFIX}{hex}"))
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_encode(args: &CodecArgs, input: &Path, named: bool, out: Option<&PathBuf>) -> Result<()> {
    let query = read_query(input)?;
    let encoder = args.encoder()?;
    let mut graph = Graph::new();
    let root = if named {
        let iri = named_root(&query)?;
        encoder.encode_with_root(&query, &iri, &mut graph)
    } else {
        encoder.encode(&query, &mut graph)
    }
    .with_context(|| format!("failed to encode {}", input.display()))?;

    info!(root = %root, triples = graph.len(), "encoded");
    write_output(out, &graph.to_ntriples())?;
    eprintln!(
        "{} {} query, {} triples, root {}",
        "ok".green().bold(),
        query.form.label(),
        graph.len(),
        root.to_string().bold()
    );
    Ok(())
}

fn cmd_decode(
    args: &CodecArgs,
    input: &Path,
    root: &str,
    format: Option<&str>,
    out: Option<&PathBuf>,
) -> Result<()> {
    let format = input_format(input, format)?;
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let graph = parse_graph(&bytes, format)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let root = root_node(root)?;
    info!(triples = graph.len(), format = format.name(), "loaded graph");

    let query = args
        .decoder()?
        .decode(&graph, &root)
        .with_context(|| format!("failed to decode {root} from {}", input.display()))?;
    let mut json = serde_json::to_string_pretty(&query)?;
    json.push('\n');
    write_output(out, &json)
}

fn cmd_roundtrip(args: &CodecArgs, input: &Path, show_graph: bool) -> Result<()> {
    let query = read_query(input)?;
    let mut graph = Graph::new();
    let root = args
        .encoder()?
        .encode(&query, &mut graph)
        .with_context(|| format!("failed to encode {}", input.display()))?;

    let text = graph.to_ntriples();
    if show_graph {
        print!("{text}");
    }
    let reparsed = Graph::from_ntriples(&text).context("failed to reparse encoded graph")?;
    let decoded = args
        .decoder()?
        .decode(&reparsed, &root)
        .context("failed to decode encoded graph")?;

    if decoded != query {
        let expected = serde_json::to_string_pretty(&query)?;
        let actual = serde_json::to_string_pretty(&decoded)?;
        eprintln!("{}\n{expected}", "input:".yellow().bold());
        eprintln!("{}\n{actual}", "decoded:".yellow().bold());
        bail!("decoded query differs from {}", input.display());
    }
    eprintln!(
        "{} round trip of {} ({} triples)",
        "ok".green().bold(),
        input.display(),
        graph.len()
    );
    Ok(())
}

fn cmd_vocab(json: bool) -> Result<()> {
    let schema = VocabularySchema::v1();
    if json {
        let doc = serde_json::json!({
            "version": schema.version(),
            "types": schema.types(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} v{}", "SPIN vocabulary".bold(), schema.version());
    for ty in schema.types() {
        println!("{} {}", ty.type_iri.cyan().bold(), format!("({:?})", ty.kind).dimmed());
        for p in &ty.properties {
            println!("    {:<48} {:<9} {:?}", p.predicate, format!("{:?}", p.cardinality), p.shape);
        }
    }
    Ok(())
}

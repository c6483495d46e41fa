//! tyr CLI: inspect and verify serialized layout type graphs.
//!
//! Graphs are the full serde representation of [`tyr_core::LayoutGraph`],
//! as produced by `serde_json::to_string` on the builder side.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use tyr_core::graph::filter::{is_leaf, is_pointer_node, is_struct_node, is_union_node};
use tyr_core::{EdgeFilter, LayoutGraph, NodeId};
use tyr_observe::{eq_class_annotator, write_dot};
use tyr_verify::Verifier;

#[derive(Parser)]
#[command(name = "tyr", version, about = "Layout type graph tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the verification battery on a graph
    Verify {
        /// Input graph (JSON)
        #[arg(long)]
        input: PathBuf,
        /// Panic at the first failing check instead of reporting
        #[arg(long)]
        strict: bool,
        /// Report format (human, json)
        #[arg(long, default_value = "human")]
        report: String,
    },
    /// Print statistics or export views of a graph
    Inspect {
        /// Input graph (JSON)
        #[arg(long)]
        input: PathBuf,
        /// Write a Graphviz dot file
        #[arg(long)]
        dot: Option<PathBuf>,
        /// Write a flat JSON node/edge dump
        #[arg(long)]
        json: Option<PathBuf>,
        /// Print the equivalence class of every live node
        #[arg(long)]
        eq_classes: bool,
    },
}

fn load_graph(path: &PathBuf) -> Result<LayoutGraph> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let graph: LayoutGraph =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    graph
        .check_integrity()
        .with_context(|| format!("{} is not a well-formed graph", path.display()))?;
    Ok(graph)
}

fn cmd_verify(input: PathBuf, strict: bool, report: String) -> Result<()> {
    let graph = load_graph(&input)?;
    let verifier = if strict {
        Verifier::strict()
    } else {
        Verifier::new()
    };
    let diagnostics = verifier.report(&graph);

    match report.as_str() {
        "human" => {
            if diagnostics.is_empty() {
                println!("ok: {} nodes, all checks passed", graph.node_count());
            } else {
                for diagnostic in &diagnostics {
                    eprintln!("FAIL {diagnostic}");
                }
            }
        }
        "json" => {
            let entries: Vec<_> = diagnostics
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "check": d.check.to_string(),
                        "message": d.message,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        other => bail!("unknown report format: '{other}' (expected human or json)"),
    }

    if !diagnostics.is_empty() {
        bail!("{} check(s) failed", diagnostics.len());
    }
    Ok(())
}

fn cmd_inspect(
    input: PathBuf,
    dot: Option<PathBuf>,
    json: Option<PathBuf>,
    eq_classes: bool,
) -> Result<()> {
    let graph = load_graph(&input)?;

    let count = |filter| {
        graph
            .node_ids()
            .map(|id| graph.links_matching(id, filter).count())
            .sum::<usize>()
    };

    println!("nodes: {}", graph.node_count());
    println!("  created ever: {}", graph.next_node_id());
    println!("edges:");
    println!("  equality:    {}", count(EdgeFilter::Equality));
    println!("  inheritance: {}", count(EdgeFilter::Inheritance));
    println!("  instance:    {}", count(EdgeFilter::Instance));
    println!("  pointer:     {}", count(EdgeFilter::Pointer));

    let tally = |pred: &dyn Fn(NodeId) -> bool| graph.node_ids().filter(|&id| pred(id)).count();
    println!("node kinds:");
    println!("  struct:  {}", tally(&|id| is_struct_node(&graph, id)));
    println!("  union:   {}", tally(&|id| is_union_node(&graph, id)));
    println!("  pointer: {}", tally(&|id| is_pointer_node(&graph, id)));
    println!(
        "  leaf:    {}",
        tally(&|id| is_leaf(&graph, id, EdgeFilter::Any))
    );

    if eq_classes {
        for id in graph.node_ids() {
            let members = graph.eq_classes().members(id.raw());
            println!("{id}: {members:?}");
        }
    }

    if let Some(path) = dot {
        let mut file = fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_dot(&graph, &mut file, Some(&eq_class_annotator))?;
        println!("wrote {}", path.display());
    }

    if let Some(path) = json {
        let dump = tyr_observe::dump_json(&graph)?;
        fs::write(&path, dump).with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Verify {
            input,
            strict,
            report,
        } => cmd_verify(input, strict, report),
        Commands::Inspect {
            input,
            dot,
            json,
            eq_classes,
        } => cmd_inspect(input, dot, json, eq_classes),
    };
    if let Err(err) = result {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mmd_core::Engine;
use mmd_token::{Index, TokenArena};

#[derive(Parser)]
#[command(name = "mmd-cli", about = "Inspect a document's parse tree, references, critic spans and transclusion")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the block/pair tree for a document
    Tree { path: PathBuf },
    /// Print the link/footnote/citation/glossary/abbreviation/metadata tables
    Refs { path: PathBuf },
    /// List critic-markup spans found in a document
    Critic { path: PathBuf },
    /// Resolve critic-markup spans, accepting or rejecting every edit
    Resolve {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = ResolveMode::Accept)]
        mode: ResolveMode,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ResolveMode {
    Accept,
    Reject,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {err:?}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Tree { path } => print_tree(&path),
        Command::Refs { path } => print_refs(&path),
        Command::Critic { path } => print_critic(&path),
        Command::Resolve { path, mode } => resolve(&path, mode),
    }
}

fn read_document(path: &PathBuf) -> Result<(Engine, String)> {
    let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut engine = Engine::create(mmd_config::Config::default());
    engine.parse(&source, base_dir);
    Ok((engine, source))
}

fn print_tree(path: &PathBuf) -> Result<()> {
    let (engine, _) = read_document(path)?;
    let root = engine.root().context("document produced no root node")?;
    dump_node(engine.arena(), root, 0);
    Ok(())
}

fn dump_node(arena: &TokenArena, node: Index, depth: usize) {
    let tok = arena.get(node);
    println!("{}{:?} [{}..{}]", "  ".repeat(depth), tok.kind, tok.start, tok.start + tok.len);
    for child in arena.children(node) {
        dump_node(arena, child, depth + 1);
    }
}

fn print_refs(path: &PathBuf) -> Result<()> {
    let (engine, _) = read_document(path)?;
    let refs = engine.references();

    for (label, link) in &refs.links {
        println!("link [{label}] -> {} {}", link.url, link.title.as_deref().unwrap_or(""));
    }
    for (label, note) in &refs.footnotes {
        println!("footnote [{label}]: {}", note.body);
    }
    for (label, note) in &refs.citations {
        println!("citation [{label}]: {}", note.body);
    }
    for (label, note) in &refs.glossary {
        println!("glossary [{label}]: {}", note.body);
    }
    for (label, note) in &refs.abbreviations {
        println!("abbreviation [{label}]: {}", note.body);
    }
    for key in engine.metadata_keys() {
        println!("meta {key}: {}", engine.metadata_value(key).unwrap_or_default());
    }
    Ok(())
}

fn print_critic(path: &PathBuf) -> Result<()> {
    let (engine, _) = read_document(path)?;
    for span in engine.critic_spans() {
        println!("{:?} open={:?} close={:?}", span.kind, span.open_start..span.open_end, span.close_start..span.close_end);
    }
    Ok(())
}

fn resolve(path: &PathBuf, mode: ResolveMode) -> Result<()> {
    let (engine, _) = read_document(path)?;
    let mode = match mode {
        ResolveMode::Accept => mmd_critic::EditMode::Accept,
        ResolveMode::Reject => mmd_critic::EditMode::Reject,
    };
    print!("{}", engine.resolve_critic(mode));
    Ok(())
}

//! CLI module for research-agent
//!
//! Provides command-line interface parsing and handling for the research-agent binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// research-agent - multi-agent research assistant with semantic memory
///
/// Planner, researcher, memory, critic and executor agents cooperate over a
/// message bus to research a goal and store the result as embeddings.
#[derive(Parser, Debug)]
#[command(
    name = "research-agent",
    version,
    about = "Multi-agent research assistant with semantic memory",
    long_about = "Planner, researcher, memory, critic and executor agents cooperate over a\n\
                  message bus: the researcher searches, the memory agent stores a digest as an\n\
                  embedding, and the critic reflects on the outcome.",
    after_help = "EXAMPLES:\n    \
                  research-agent init                          # Write research-agent.toml\n    \
                  research-agent run                           # Run the research workflow\n    \
                  research-agent research \"graph networks\"     # Research one topic\n    \
                  research-agent watch diffusion               # Add a topic to the watchlist\n    \
                  research-agent store \"note\" --meta topic=ml  # Store a knowledge item\n    \
                  research-agent search \"AI papers\" --top-k 3  # Semantic search\n    \
                  research-agent triple related \"AI papers\"    # Triples mentioning a topic"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "research-agent.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default research-agent.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Run the research workflow and print its summary
    Run {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the web for a topic, store the digest and link it to the topic
    Research {
        /// Topic to research
        topic: String,

        /// Number of search results to digest
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stored item closest to a query
    Recall {
        /// Query text
        query: String,
    },

    /// Add a topic to the watchlist
    Watch {
        /// Topic to watch
        topic: String,
    },

    /// List watched topics with the latest result for each
    Watchlist,

    /// Suggest a next action from the most recent research
    Suggest,

    /// Embed and store a piece of content
    Store {
        /// Content to store
        content: String,

        /// Metadata entries as key=value (repeatable)
        #[arg(short, long = "meta", value_parser = parse_key_value)]
        meta: Vec<(String, String)>,
    },

    /// Semantic search over stored knowledge
    Search {
        /// Query text
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long, default_value_t = 3, allow_negative_numbers = true)]
        top_k: i64,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the knowledge triple log
    #[command(subcommand)]
    Triple(TripleCommands),

    /// Show each agent's status
    Status {
        /// Print statuses as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Triple log subcommands
#[derive(Subcommand, Debug)]
pub enum TripleCommands {
    /// Append a subject/predicate/object triple
    Add {
        subject: String,
        predicate: String,
        object: String,
    },

    /// List triples matching every given field exactly
    Query {
        #[arg(short, long)]
        subject: Option<String>,

        #[arg(short, long)]
        predicate: Option<String>,

        #[arg(short, long)]
        object: Option<String>,
    },

    /// List triples with the topic as subject or object
    Related {
        topic: String,
    },
}

/// Parse a `key=value` metadata argument
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

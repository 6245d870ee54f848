//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "graphloom",
    about = "Materialize row data into RDF graphs with R2RML mapping documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose diagnostics on stderr
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (NO_COLOR is also honored)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map row data through a mapping document and print Turtle
    Map {
        /// Turtle mapping document
        mapping: PathBuf,

        /// JSON row-data file with "tables" and "queries" sections
        data: PathBuf,

        /// Base IRI for resolving relative IRIs in the mapping document
        #[arg(long)]
        base: Option<String>,

        /// Write Turtle here instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Summarize the rules in a mapping document
    Inspect {
        /// Turtle mapping document
        mapping: PathBuf,

        /// Base IRI for resolving relative IRIs in the mapping document
        #[arg(long)]
        base: Option<String>,
    },
}

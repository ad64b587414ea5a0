//! CLI command definitions and subcommands

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::formatter::ThemeMode;

/// Trip planner - packing lists from destination, dates and purpose
#[derive(Debug, Parser)]
#[command(name = "trip-planner", version, about)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full planning session and export the packing list
    Plan {
        /// Destination search text
        #[arg(short, long)]
        destination: String,

        /// Which search result to use
        #[arg(long, default_value_t = 0)]
        pick: usize,

        /// First travel day (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// Last travel day (YYYY-MM-DD)
        #[arg(short, long)]
        end: NaiveDate,

        /// Trip purpose, e.g. "vacation" (see `purposes`)
        #[arg(short, long)]
        purpose: String,

        /// Page query string to start the session from
        #[arg(long)]
        query: Option<String>,

        /// Directory for packing-list.pdf (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rendering theme for the HTML preview
        #[arg(long, default_value = "light")]
        theme: ThemeMode,

        /// Also print the plan as HTML
        #[arg(long)]
        html: bool,
    },

    /// List the trip purposes offered by the planner
    Purposes,

    /// Serve the planner API and frontend over HTTP
    Serve {
        /// Port to listen on (defaults to the configured one)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

//! CLI module - Command-line interface for Marquee
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marquee - movie catalog backend
#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server (default)
    #[command(alias = "web")]
    Serve,

    /// Import movies from a TSV file
    Import {
        /// Path to the TSV file
        file: PathBuf,
    },

    /// Generate a TSV file of random movies from a mock-data document
    Generate {
        /// Number of rows to write
        count: usize,
        /// Output TSV path
        file: PathBuf,
        /// URL of the mock-data JSON document
        url: String,
    },

    /// Create default config file
    Init,
}

pub use commands::*;

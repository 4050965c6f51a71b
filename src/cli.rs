//! Command-line interface definitions for the newsitem reviewer.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Secrets can be provided via environment variables.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::extractor::MissingText;

/// Default for text fields whose element is missing or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingTextArg {
    /// Empty string
    Empty,
    /// The "N/A" sentinel
    Na,
}

impl From<MissingTextArg> for MissingText {
    fn from(arg: MissingTextArg) -> Self {
        match arg {
            MissingTextArg::Empty => MissingText::Empty,
            MissingTextArg::Na => MissingText::NotAvailable,
        }
    }
}

/// Command-line arguments for the newsitem reviewer.
///
/// # Examples
///
/// ```sh
/// # List every extracted item
/// newsitem_reviewer articles/*.xml
///
/// # Search, summarize, and export
/// newsitem_reviewer -s budget --summarize -j out/review.json -m out/review.md articles/*.xml
///
/// # Reproduce the merged-intro schema revision
/// newsitem_reviewer --merge-intro --missing-text na articles/*.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Newsitem XML files to review
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only list and export items whose headline or filename contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Request an AI summary for every listed item
    #[arg(long)]
    pub summarize: bool,

    /// API key for the summarization endpoint
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Fold the intro into the story
    #[arg(long)]
    pub merge_intro: bool,

    /// Default for missing text fields (overrides the config file)
    #[arg(long, value_enum)]
    pub missing_text: Option<MissingTextArg>,

    /// Write the reviewed items to this JSON file
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Write a Markdown report to this file
    #[arg(short, long)]
    pub markdown_output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "newsitem_reviewer",
            "--search",
            "budget",
            "--summarize",
            "--json-output",
            "./out/review.json",
            "a.xml",
            "b.xml",
        ]);

        assert_eq!(cli.files, [PathBuf::from("a.xml"), PathBuf::from("b.xml")]);
        assert_eq!(cli.search.as_deref(), Some("budget"));
        assert!(cli.summarize);
        assert_eq!(cli.json_output, Some(PathBuf::from("./out/review.json")));
        assert!(cli.markdown_output.is_none());
        assert!(!cli.merge_intro);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "newsitem_reviewer",
            "-c",
            "config.yaml",
            "-j",
            "/tmp/review.json",
            "-m",
            "/tmp/review.md",
            "-s",
            "storm",
            "one.xml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("config.yaml")));
        assert_eq!(cli.json_output, Some(PathBuf::from("/tmp/review.json")));
        assert_eq!(cli.markdown_output, Some(PathBuf::from("/tmp/review.md")));
        assert_eq!(cli.search.as_deref(), Some("storm"));
    }

    #[test]
    fn test_cli_policy_flags() {
        let cli = Cli::parse_from([
            "newsitem_reviewer",
            "--merge-intro",
            "--missing-text",
            "na",
            "one.xml",
        ]);

        assert!(cli.merge_intro);
        assert_eq!(cli.missing_text, Some(MissingTextArg::Na));
        assert_eq!(
            MissingText::from(MissingTextArg::Na),
            MissingText::NotAvailable
        );
    }

    #[test]
    fn test_cli_requires_files() {
        assert!(Cli::try_parse_from(["newsitem_reviewer"]).is_err());
    }
}

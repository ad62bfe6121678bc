//! Command-line interface definitions for the news clipper.
//!
//! Running with no subcommand collects the current week's clippings.
//! Subcommands maintain the persisted keyword taxonomy.

use clap::{Parser, Subcommand};

/// Command-line arguments for the news clipper.
///
/// # Examples
///
/// ```sh
/// # Collect this week's clippings with the default taxonomy
/// news_clipper -o ./clippings
///
/// # Query once per keyword, keep the highest-scoring duplicate
/// news_clipper --per-keyword --prefer-score
///
/// # Maintain the taxonomy
/// news_clipper add-category 수입육
/// news_clipper add-keyword 수입육 "수입 돼지고기"
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Path to the taxonomy YAML file
    #[arg(short, long, default_value = "taxonomy.yaml")]
    pub taxonomy: String,

    /// Output directory for the JSON report and XLSX export
    #[arg(short, long, default_value = "./clippings")]
    pub output_dir: String,

    /// Search language hint (Google News `hl` parameter)
    #[arg(long, default_value = "ko")]
    pub language: String,

    /// Search region hint (Google News `gl` parameter)
    #[arg(long, default_value = "KR")]
    pub country: String,

    /// Maximum hits kept per search query
    #[arg(long, default_value_t = 15)]
    pub max_results: usize,

    /// Query once per keyword instead of once per category
    #[arg(long)]
    pub per_keyword: bool,

    /// On duplicate URLs keep the highest-scoring record instead of the
    /// last-processed one
    #[arg(long)]
    pub prefer_score: bool,

    /// Export only the N highest-ranked articles to the spreadsheet
    /// (the JSON report always keeps the full list)
    #[arg(long)]
    pub top: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Taxonomy maintenance subcommands. Every mutation is persisted to the
/// taxonomy file immediately.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the current taxonomy
    Show,
    /// Add an empty category
    AddCategory { name: String },
    /// Remove a category and its keywords
    RemoveCategory { name: String },
    /// Add a keyword to an existing category
    AddKeyword { category: String, keyword: String },
    /// Remove a keyword from a category
    RemoveKeyword { category: String, keyword: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["news_clipper"]);
        assert_eq!(cli.taxonomy, "taxonomy.yaml");
        assert_eq!(cli.output_dir, "./clippings");
        assert_eq!(cli.language, "ko");
        assert_eq!(cli.country, "KR");
        assert_eq!(cli.max_results, 15);
        assert!(!cli.per_keyword);
        assert!(!cli.prefer_score);
        assert_eq!(cli.top, None);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_run_flags() {
        let cli = Cli::parse_from([
            "news_clipper",
            "-t",
            "/tmp/taxonomy.yaml",
            "-o",
            "/tmp/out",
            "--per-keyword",
            "--prefer-score",
            "--max-results",
            "30",
            "--top",
            "10",
        ]);
        assert_eq!(cli.taxonomy, "/tmp/taxonomy.yaml");
        assert_eq!(cli.output_dir, "/tmp/out");
        assert!(cli.per_keyword);
        assert!(cli.prefer_score);
        assert_eq!(cli.max_results, 30);
        assert_eq!(cli.top, Some(10));
    }

    #[test]
    fn test_cli_taxonomy_subcommands() {
        let cli = Cli::parse_from(["news_clipper", "add-keyword", "유통", "이마트"]);
        match cli.command {
            Some(Command::AddKeyword { category, keyword }) => {
                assert_eq!(category, "유통");
                assert_eq!(keyword, "이마트");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

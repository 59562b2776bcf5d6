use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "archivist", version)]
#[command(about = "Browse, search and request records from the public archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory holding catalog.json, config.json and submissions
    #[arg(long, global = true, env = "ARCHIVIST_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Use the built-in mock catalog instead of catalog.json
    #[arg(long, global = true)]
    pub mock: bool,

    /// Print the JSON wire envelope instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<usize>,

    /// Results per page (defaults to the page-size setting)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List collections
    #[command(alias = "ls")]
    Collections {
        /// Only featured collections
        #[arg(long)]
        featured: bool,

        /// Only top-level collections
        #[arg(long)]
        roots: bool,

        /// Text to match against names and descriptions
        #[arg(short, long)]
        query: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Open a collection: breadcrumb, sub-collections and documents
    #[command(alias = "cd")]
    Browse {
        /// Collection id, or a path of ids from a root (e.g. col-3 col-9)
        ids: Vec<String>,

        /// Only documents of this format (pdf, image, audio, video, text, map)
        #[arg(short, long)]
        format: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a document with its collection and related documents
    #[command(alias = "v")]
    Show { id: String },

    /// Search documents
    #[command(alias = "s")]
    Search {
        /// Search terms
        terms: Vec<String>,

        /// Only documents of this format
        #[arg(short, long)]
        format: Option<String>,

        /// Sort order: relevance, date, title or popularity
        #[arg(long)]
        sort: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Browse the audit log
    Audit {
        #[arg(long)]
        action: Option<String>,

        #[arg(long)]
        resource: Option<String>,

        #[arg(long)]
        user: Option<String>,

        /// all, true or false
        #[arg(long, default_value = "all")]
        success: String,

        /// all, true or false
        #[arg(long, default_value = "all")]
        suspicious: String,

        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Run a raw request target (e.g. "/api/search?q=harbour") and print the JSON response
    Get {
        target: String,

        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
    },

    /// Book a reading-room visit
    Book {
        /// Visit date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        #[arg(long, default_value_t = 1)]
        visitors: u8,

        #[arg(long)]
        name: String,

        #[arg(long)]
        purpose: Option<String>,

        /// Submit without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Request access to (or a copy of) a document
    Request {
        /// Document id
        id: String,

        #[arg(long)]
        reason: String,

        #[arg(long)]
        name: String,

        /// Submit without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (page-size, default-sort)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Write the built-in catalog to the data directory
    Init {
        /// Overwrite an existing catalog
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_with_paging() {
        let cli = Cli::try_parse_from([
            "archivist", "--mock", "search", "harbour", "plans", "--sort", "date", "--page", "2",
        ])
        .unwrap();
        assert!(cli.mock);
        match cli.command {
            Some(Commands::Search {
                terms, sort, page, ..
            }) => {
                assert_eq!(terms, vec!["harbour", "plans"]);
                assert_eq!(sort.as_deref(), Some("date"));
                assert_eq!(page.page, Some(2));
                assert_eq!(page.limit, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn book_requires_a_valid_date() {
        assert!(Cli::try_parse_from([
            "archivist", "book", "--date", "2024-13-01", "--name", "Ada"
        ])
        .is_err());
        let cli = Cli::try_parse_from([
            "archivist", "book", "--date", "2030-01-02", "--name", "Ada", "--yes",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Book { visitors: 1, yes: true, .. })
        ));
    }
}

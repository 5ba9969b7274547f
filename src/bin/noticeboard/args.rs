//! Command-line surface for `noticeboard`.

#![deny(clippy::all, clippy::pedantic)]

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use noticeboard::config::GlobalOverrides;
use noticeboard_api_types::{Category, SortField, SortOrder};

#[derive(Parser, Debug)]
#[command(name = "noticeboard", version, about = "Notice board API client", long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over `config/default.*` and `noticeboard.*`
    #[arg(long, value_name = "PATH", env = "NOTICEBOARD_CONFIG_FILE", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and persist the session token
    Login(LoginArgs),
    /// Forget the persisted session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Check API availability
    Health,
    /// Post browsing and management
    Posts(PostsArgs),
    /// Board-wide statistics, cleanup and mock-data import
    Admin(AdminArgs),
    /// Chart data series
    Charts(ChartsArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Path to a file containing the password (takes precedence over env)
    #[arg(long, env = "NOTICEBOARD_PASSWORD_FILE")]
    pub password_file: Option<PathBuf>,

    /// Password from env (CLI flag intentionally disabled to avoid shell history leaks)
    #[arg(hide = true, env = "NOTICEBOARD_PASSWORD")]
    pub password_env: Option<String>,
}

/// Filters shared by `posts list` and `posts browse`.
#[derive(Args, Debug, Clone, Default)]
pub struct ListFilters {
    /// Search text matched against title and body
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub category: Option<CategoryArg>,
    /// Earliest creation date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,
    /// Latest creation date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,
    #[arg(long, default_value_t = SortFieldArg::CreatedAt)]
    pub sort: SortFieldArg,
    #[arg(long, default_value_t = SortOrderArg::Desc)]
    pub order: SortOrderArg,
    /// Page size; defaults to `api.page_size`
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Subcommand, Debug)]
pub enum PostsCmd {
    /// Fetch a single page of posts
    List {
        #[command(flatten)]
        filters: ListFilters,
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Page through posts interactively (reads commands from stdin)
    Browse {
        #[command(flatten)]
        filters: ListFilters,
    },
    /// Get a post by id
    Get { id: String },
    /// Create a post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long, default_value_t = CategoryArg::Free)]
        category: CategoryArg,
        /// Comma-separated tags (at most 5, each up to 24 characters)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Update only the given fields of a post
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long)]
        category: Option<CategoryArg>,
        /// Comma-separated tags replacing the current ones
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a post
    Delete { id: String },
}

#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminCmd,
}

#[derive(Subcommand, Debug)]
pub enum AdminCmd {
    /// Post count and category distribution
    Stats,
    /// Delete every post
    DeleteAll {
        /// Confirm the deletion
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Generate mock posts and create them one by one
    Import {
        /// Number of posts to request (1-500); defaults to `import.default_count`
        #[arg(long)]
        count: Option<u32>,
    },
}

#[derive(Parser, Debug)]
pub struct ChartsArgs {
    #[command(subcommand)]
    pub action: ChartsCmd,
}

#[derive(Subcommand, Debug)]
pub enum ChartsCmd {
    /// Most popular coffee brands
    TopBrands,
    /// Weekly mood percentages
    MoodTrend,
    /// Coffee intake against bugs and productivity per team
    Coffee,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CategoryArg {
    Notice,
    Qna,
    Free,
}

impl CategoryArg {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        Category::from(self).as_str()
    }
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Notice => Category::Notice,
            CategoryArg::Qna => Category::Qna,
            CategoryArg::Free => Category::Free,
        }
    }
}

impl fmt::Display for CategoryArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_lowercase())
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum SortFieldArg {
    #[default]
    CreatedAt,
    Title,
}

impl From<SortFieldArg> for SortField {
    fn from(value: SortFieldArg) -> Self {
        match value {
            SortFieldArg::CreatedAt => SortField::CreatedAt,
            SortFieldArg::Title => SortField::Title,
        }
    }
}

impl fmt::Display for SortFieldArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreatedAt => "created-at",
            Self::Title => "title",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum SortOrderArg {
    Asc,
    #[default]
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(value: SortOrderArg) -> Self {
        match value {
            SortOrderArg::Asc => SortOrder::Asc,
            SortOrderArg::Desc => SortOrder::Desc,
        }
    }
}

impl fmt::Display for SortOrderArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SortOrder::from(*self).as_str())
    }
}

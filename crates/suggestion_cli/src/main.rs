//! Command-line boundary for the suggestion store.
//!
//! # Responsibility
//! - Parse raw arguments into typed hierarchy operations.
//! - Run exactly one operation per invocation and print JSON results.
//! - Map faults to stable error codes and distinct exit statuses.
//!
//! # Invariants
//! - Identifier arguments are validated before the store is opened.

use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use suggestion_core::db::DbError;
use suggestion_core::{
    init_logging, parse_entity_id, CategoryId, FaultKind, HierarchyError, HierarchyResult,
    NewCategory, NewSuggestion, NewTopic, StoreConfig, SuggestionId, SuggestionStore, TopicId,
};

#[derive(Parser, Debug)]
#[command(
    name = "suggestion",
    version,
    about = "Manage topics, categories and suggestions in a local SQLite store"
)]
struct Cli {
    /// SQLite database file (overrides SUGGESTION_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides SUGGESTION_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check core linkage without opening the store
    Ping,
    /// List all topics
    Topics,
    /// Show one topic with its categories and suggestions
    Tree {
        #[arg(allow_hyphen_values = true)]
        topic_id: String,
    },
    /// Create a topic
    CreateTopic {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Create a category under a topic
    CreateCategory {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        topic_id: Option<String>,
    },
    /// Create a suggestion under a category
    CreateSuggestion {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        category_id: Option<String>,
    },
    /// Delete a topic with all of its categories and suggestions
    DeleteTopic {
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Delete a category with all of its suggestions
    DeleteCategory {
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Delete a single suggestion
    DeleteSuggestion {
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
}

/// Fully typed store request, produced before any store access.
#[derive(Debug, PartialEq, Eq)]
enum Operation {
    Topics,
    Tree(TopicId),
    CreateTopic(NewTopic),
    CreateCategory(NewCategory),
    CreateSuggestion(NewSuggestion),
    DeleteTopic(TopicId),
    DeleteCategory(CategoryId),
    DeleteSuggestion(SuggestionId),
}

impl Command {
    /// Returns `None` for commands that never touch the store.
    fn into_operation(self) -> HierarchyResult<Option<Operation>> {
        let operation = match self {
            Self::Ping => return Ok(None),
            Self::Topics => Operation::Topics,
            Self::Tree { topic_id } => Operation::Tree(parse_entity_id(&topic_id)?),
            Self::CreateTopic { name, description } => {
                Operation::CreateTopic(NewTopic { name, description })
            }
            Self::CreateCategory { name, topic_id } => Operation::CreateCategory(NewCategory {
                name,
                topic_id: parse_optional_id(topic_id)?,
            }),
            Self::CreateSuggestion {
                name,
                content,
                category_id,
            } => Operation::CreateSuggestion(NewSuggestion {
                name,
                content,
                category_id: parse_optional_id(category_id)?,
            }),
            Self::DeleteTopic { id } => Operation::DeleteTopic(parse_entity_id(&id)?),
            Self::DeleteCategory { id } => Operation::DeleteCategory(parse_entity_id(&id)?),
            Self::DeleteSuggestion { id } => Operation::DeleteSuggestion(parse_entity_id(&id)?),
        };
        Ok(Some(operation))
    }
}

fn parse_optional_id(raw: Option<String>) -> HierarchyResult<Option<i64>> {
    raw.as_deref().map(parse_entity_id).transpose()
}

#[derive(Debug)]
enum CliFailure {
    Open(DbError),
    Operation(HierarchyError),
    Encode(serde_json::Error),
}

impl CliFailure {
    fn code(&self) -> &'static str {
        match self {
            Self::Open(_) => "store_open_failed",
            Self::Operation(err) => err.code(),
            Self::Encode(_) => "encode_failed",
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Open(_) => 5,
            Self::Operation(err) => match err.kind() {
                FaultKind::MalformedInput => 2,
                FaultKind::NotFound => 3,
                FaultKind::ConstraintViolation => 4,
                FaultKind::StoreUnavailable => 5,
                FaultKind::Internal => 1,
            },
            Self::Encode(_) => 1,
        }
    }
}

impl Display for CliFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "failed to open store: {err}"),
            Self::Operation(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode result: {err}"),
        }
    }
}

impl From<HierarchyError> for CliFailure {
    fn from(value: HierarchyError) -> Self {
        Self::Operation(value)
    }
}

impl From<serde_json::Error> for CliFailure {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = StoreConfig::from_env();
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }
    if let Some(level) = cli.log_level {
        config = config.with_log_level(level);
    }

    let log_dir = config
        .log_dir
        .as_ref()
        .map(|dir| dir.to_string_lossy().into_owned());
    if let Err(err) = init_logging(&config.log_level, log_dir.as_deref()) {
        eprintln!("error_code=logging_init_failed error={err}");
        return ExitCode::from(1);
    }

    match run(cli.command, &config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("error_code={} error={failure}", failure.code());
            ExitCode::from(failure.exit_code())
        }
    }
}

fn run(command: Command, config: &StoreConfig) -> Result<String, CliFailure> {
    let Some(operation) = command.into_operation()? else {
        return Ok(format!(
            "suggestion_core ping={} version={}",
            suggestion_core::ping(),
            suggestion_core::core_version()
        ));
    };

    let store = SuggestionStore::open(config).map_err(CliFailure::Open)?;
    info!(
        "event=cli_store_open module=cli status=ok db_path={}",
        config.db_path.display()
    );
    execute(operation, &store)
}

fn execute(operation: Operation, store: &SuggestionStore) -> Result<String, CliFailure> {
    match operation {
        Operation::Topics => to_json(&store.get_topics()?),
        Operation::Tree(topic_id) => to_json(&store.get_topic_tree(topic_id)?),
        Operation::CreateTopic(topic) => to_json(&store.create_topic(topic)?),
        Operation::CreateCategory(category) => to_json(&store.create_category(category)?),
        Operation::CreateSuggestion(suggestion) => {
            to_json(&store.create_suggestion(suggestion)?)
        }
        Operation::DeleteTopic(id) => {
            store.delete_topic(id)?;
            to_json(&id)
        }
        Operation::DeleteCategory(id) => {
            store.delete_category(id)?;
            to_json(&id)
        }
        Operation::DeleteSuggestion(id) => {
            store.delete_suggestion(id)?;
            to_json(&id)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliFailure> {
    Ok(serde_json::to_string_pretty(value)?)
}

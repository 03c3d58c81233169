//! `mcstatus` CLI - Command-line interface for per-group Minecraft server lists
//!
//! Provides commands for listing, adding, editing and removing servers,
//! exchanging configurations with the web editor, and rendering a status view
//! from a saved status snapshot.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use mcstatus_core::config::{AppSettings, ConfigManager};
use mcstatus_core::display::{format_tree_listing, DisplayView, EnrichedNode};
use mcstatus_core::error::ConfigError;
use mcstatus_core::models::{NewServer, ServerAttribute, IDENTITY_FIELD};
use mcstatus_core::status::{fetch_all, query_targets, SnapshotFetcher};
use mcstatus_core::store::{AddOutcome, ServerStore};
use mcstatus_core::validation::{is_valid_server_address, parse_flag};
use mcstatus_core::{codec, LiveStatus};
use tracing_subscriber::EnvFilter;

/// `mcstatus` command-line interface for managing group server lists
#[derive(Parser)]
#[command(name = "mcstatus-cli")]
#[command(author, version, about = "mcstatus command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration directory (defaults to ~/.config/mcstatus)
    #[arg(short, long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Chat group the command applies to
    #[arg(short, long)]
    pub group: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List configured servers as a tree
    #[command(about = "List the servers configured for the group")]
    List,

    /// Render the status view from a status snapshot
    #[command(about = "Show live status for every configured server")]
    Show {
        /// Include offline servers
        #[arg(short, long)]
        all: bool,

        /// JSON object mapping server addresses to status records
        #[arg(short, long)]
        status_file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Show the status of a single server
    #[command(about = "Show live status for one server")]
    Query {
        /// Server address
        ip: String,

        /// JSON object mapping server addresses to status records
        #[arg(short, long)]
        status_file: PathBuf,
    },

    /// Add a server
    #[command(about = "Add a server, optionally under a parent server")]
    Add {
        /// Server address, optionally with :port
        ip: String,

        /// Address of the parent server
        #[arg(short, long)]
        parent: Option<String>,

        /// Badge label
        #[arg(short, long)]
        tag: Option<String>,

        /// Badge colour as six hex digits
        #[arg(long)]
        tag_color: Option<String>,

        /// Free-text label
        #[arg(long)]
        comment: Option<String>,

        /// Sort priority, lower first
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i64>,
    },

    /// Remove a server and everything under it
    #[command(visible_alias = "rm", about = "Remove a server and its sub-servers")]
    Remove {
        /// Server address
        ip: String,
    },

    /// Set a server attribute
    #[command(about = "Set a server attribute")]
    Set {
        /// Server address
        ip: String,

        /// Attribute name
        attribute: String,

        /// New value; multiple words are joined with spaces
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        value: Vec<String>,
    },

    /// Reset a server attribute to its default
    #[command(about = "Reset a server attribute to its default")]
    Clear {
        /// Server address
        ip: String,

        /// Attribute name
        attribute: String,
    },

    /// Show, set or clear the group footer
    #[command(about = "Show, set or clear the group footer")]
    Footer {
        /// New footer text; multiple words are joined with spaces
        text: Vec<String>,

        /// Remove the footer
        #[arg(long, conflicts_with = "text")]
        clear: bool,
    },

    /// Print a web editor link for the group configuration
    #[command(visible_aliases = ["edit", "editor"], about = "Print a web editor link")]
    Export,

    /// Print the group configuration as JSON
    #[command(about = "Print the group configuration as JSON")]
    ExportJson,

    /// Replace the group configuration from a web editor string
    #[command(about = "Import a configuration string from the web editor")]
    Import {
        /// Encoded configuration
        data: String,
    },

    /// Replace the group configuration from a JSON file
    #[command(about = "Import a configuration from a JSON file")]
    ImportJson {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Show or set whether offline servers are listed by default
    #[command(about = "Show or set whether offline servers are listed by default")]
    ShowOffline {
        /// true/false, yes/no or 1/0
        value: Option<String>,
    },
}

/// Output format for the show command
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// The display view as JSON
    Json,
}

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, codec or IO errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Rejected - the target server does not exist or the change was refused
    pub const REJECTED: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration or storage error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Server not found in the group
    #[error("Server not found: {0}")]
    NotFound(String),

    /// Change refused by the store
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Editor string could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Status snapshot error
    #[error("Status error: {0}")]
    Status(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) | Self::Rejected(_) => exit_codes::REJECTED,
            Self::Config(_)
            | Self::Validation(_)
            | Self::Codec(_)
            | Self::Status(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        if matches!(e, ConfigError::Validation { .. }) {
            Self::Validation(e.to_string())
        } else {
            Self::Config(e.to_string())
        }
    }
}

/// Everything a command needs
pub struct Context {
    /// Server store for the configured data file
    pub store: ServerStore,
    /// Loaded application settings
    pub settings: AppSettings,
    /// Group the command applies to
    pub group: String,
}

impl Context {
    /// Opens the store and settings in `config_dir`, or the default directory
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if the directory cannot be determined or
    /// the settings file cannot be parsed.
    pub fn open(config_dir: Option<&Path>, group: &str) -> Result<Self, CliError> {
        let manager = match config_dir {
            Some(dir) => ConfigManager::with_config_dir(dir.to_path_buf()),
            None => ConfigManager::new()
                .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}")))?,
        };
        let settings = manager
            .load_settings()
            .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;
        let manager = manager.with_data_file(settings.storage.data_file.clone());

        Ok(Self {
            store: ServerStore::new(Arc::new(manager)),
            settings,
            group: group.trim().to_string(),
        })
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let context = Context::open(cli.config_dir.as_deref(), &cli.group);
    let level = context
        .as_ref()
        .map_or("info", |ctx| ctx.settings.logging.level.as_str());
    init_logging(level);

    let result = context.and_then(|ctx| run(&ctx, cli.command));

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Dispatches one command
///
/// # Errors
///
/// Returns the command's error.
pub fn run(ctx: &Context, command: Commands) -> Result<(), CliError> {
    tracing::debug!(group = %ctx.group, "Running command");
    match command {
        Commands::List => cmd_list(ctx),
        Commands::Show {
            all,
            status_file,
            format,
        } => cmd_show(ctx, all, &status_file, format),
        Commands::Query { ip, status_file } => cmd_query(ctx, &ip, &status_file),
        Commands::Add {
            ip,
            parent,
            tag,
            tag_color,
            comment,
            priority,
        } => {
            let mut server = NewServer::new(ip);
            server.tag = tag;
            server.tag_color = tag_color;
            server.comment = comment;
            server.priority = priority;
            cmd_add(ctx, server, parent.as_deref())
        }
        Commands::Remove { ip } => cmd_remove(ctx, &ip),
        Commands::Set {
            ip,
            attribute,
            value,
        } => cmd_set(ctx, &ip, &attribute, &value.join(" ")),
        Commands::Clear { ip, attribute } => cmd_clear(ctx, &ip, &attribute),
        Commands::Footer { text, clear } => cmd_footer(ctx, &text.join(" "), clear),
        Commands::Export => cmd_export(ctx),
        Commands::ExportJson => cmd_export_json(ctx),
        Commands::Import { data } => cmd_import(ctx, &data),
        Commands::ImportJson { file } => cmd_import_json(ctx, &file),
        Commands::ShowOffline { value } => cmd_show_offline(ctx, value.as_deref()),
    }
}

// ========== Listing ==========

fn cmd_list(ctx: &Context) -> Result<(), CliError> {
    let tree = ctx.store.get_tree(&ctx.group)?;
    if tree.is_empty() {
        println!("No servers configured.");
    } else {
        println!("Configured servers:\n{}", format_tree_listing(&tree));
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<SnapshotFetcher, CliError> {
    let content = std::fs::read_to_string(path)?;
    SnapshotFetcher::from_json_str(&content).map_err(|e| CliError::Status(e.to_string()))
}

fn cmd_show(
    ctx: &Context,
    all: bool,
    status_file: &Path,
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = ctx.store.export(&ctx.group)?;
    if config.servers.is_empty() {
        println!("No servers configured.");
        return Ok(());
    }

    let fetcher = load_snapshot(status_file)?;
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Status(format!("Failed to create async runtime: {e}")))?;
    let statuses = runtime.block_on(fetch_all(
        &fetcher,
        &query_targets(&config.servers),
        ctx.settings.status.query_timeout(),
    ));

    let show_all = all || config.show_offline_by_default;
    let view = DisplayView::build(&config, &statuses, show_all);
    print_view(&view, format)
}

fn cmd_query(ctx: &Context, ip: &str, status_file: &Path) -> Result<(), CliError> {
    if !is_valid_server_address(ip) {
        return Err(CliError::Validation(format!("'{ip}' is not a valid server address")));
    }

    let stored = ctx.store.find(&ctx.group, ip)?;
    let fetcher = load_snapshot(status_file)?;
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Status(format!("Failed to create async runtime: {e}")))?;
    let mut statuses = runtime.block_on(fetch_all(
        &fetcher,
        &[ip],
        ctx.settings.status.query_timeout(),
    ));
    let status = statuses
        .remove(ip)
        .unwrap_or_else(|| LiveStatus::offline(ip, "no status reported"));

    print_view(&DisplayView::single(ip, stored.as_ref(), status), OutputFormat::Text)
}

fn print_view(view: &DisplayView, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => println!("{}", format_view(view)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(view)
                .map_err(|e| CliError::Config(format!("Failed to serialize view: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Formats a display view as indented text
#[must_use]
pub fn format_view(view: &DisplayView) -> String {
    let mut output = String::new();
    if view.is_empty() {
        output.push_str("No servers online.\n");
    }
    write_nodes(&mut output, &view.servers, 0);
    let _ = writeln!(output, "Active servers: {}", view.active_count);
    if !view.footer.is_empty() {
        let _ = writeln!(output, "\n{}", view.footer);
    }
    output.trim_end().to_string()
}

fn write_nodes(output: &mut String, nodes: &[EnrichedNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        let connector = if depth > 0 { "↳ " } else { "" };
        let tag = if node.tag.is_empty() {
            String::new()
        } else {
            format!("[{}] ", node.tag)
        };
        let state = if node.is_online() {
            let players = node.status.players.as_ref();
            let mut state = format!(
                "online {}/{}",
                players.map_or(0, |p| p.online),
                players.map_or(0, |p| p.max)
            );
            if let Some(ping) = node.status.ping {
                let _ = write!(state, ", {ping:.0} ms");
            }
            if let Some(names) = players
                .and_then(|p| p.sample.as_ref())
                .filter(|s| !s.is_empty())
                .map(|s| s.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", "))
            {
                let _ = write!(state, " ({names})");
            }
            state
        } else {
            "offline".to_string()
        };

        let _ = writeln!(output, "{indent}{connector}{tag}{} - {state}", node.address_label());
        write_nodes(output, &node.children, depth + 1);
    }
}

// ========== Editing ==========

fn cmd_add(ctx: &Context, server: NewServer, parent: Option<&str>) -> Result<(), CliError> {
    if !is_valid_server_address(&server.ip) {
        return Err(CliError::Validation(format!(
            "'{}' is not a valid server address",
            server.ip
        )));
    }
    let ip = server.ip.clone();

    match ctx.store.add(&ctx.group, server, parent)? {
        AddOutcome::Added => println!("Added server {ip}"),
        AddOutcome::AddedAtRoot => println!(
            "Parent server {} not found; added {ip} at the top level",
            parent.unwrap_or_default()
        ),
        AddOutcome::Duplicate => {
            return Err(CliError::Rejected(format!("server {ip} already exists")));
        }
    }
    Ok(())
}

fn cmd_remove(ctx: &Context, ip: &str) -> Result<(), CliError> {
    if !ctx.store.remove(&ctx.group, ip)? {
        return Err(CliError::NotFound(ip.to_string()));
    }
    println!("Removed server {ip} and its sub-servers");
    Ok(())
}

fn cmd_set(ctx: &Context, ip: &str, attribute: &str, value: &str) -> Result<(), CliError> {
    if attribute.trim().eq_ignore_ascii_case(IDENTITY_FIELD) {
        return Err(CliError::Rejected(
            "the server address cannot be changed; remove the server and add it again".to_string(),
        ));
    }
    if !ctx.store.set_attribute(&ctx.group, ip, attribute, value)? {
        return Err(CliError::NotFound(ip.to_string()));
    }
    println!("Set {attribute} of {ip} to '{value}'");
    Ok(())
}

fn cmd_clear(ctx: &Context, ip: &str, attribute: &str) -> Result<(), CliError> {
    let parsed: ServerAttribute = attribute.parse()?;
    if !ctx.store.clear_attribute(&ctx.group, ip, parsed.as_str())? {
        return Err(CliError::NotFound(ip.to_string()));
    }
    println!("Cleared {parsed} of {ip}");
    Ok(())
}

fn cmd_footer(ctx: &Context, text: &str, clear: bool) -> Result<(), CliError> {
    if clear {
        if ctx.store.clear_footer(&ctx.group)? {
            println!("Footer cleared");
        } else {
            println!("No footer set");
        }
    } else if text.trim().is_empty() {
        let footer = ctx.store.get_footer(&ctx.group)?;
        if footer.is_empty() {
            println!("No footer set");
        } else {
            println!("{footer}");
        }
    } else {
        ctx.store.set_footer(&ctx.group, text)?;
        println!("Footer set");
    }
    Ok(())
}

fn cmd_show_offline(ctx: &Context, value: Option<&str>) -> Result<(), CliError> {
    match value {
        None => {
            let show = ctx.store.get_show_offline_default(&ctx.group)?;
            println!("Offline servers shown by default: {show}");
        }
        Some(raw) => {
            let show = parse_flag(raw)
                .ok_or_else(|| CliError::Validation(format!("'{raw}' is not true or false")))?;
            ctx.store.set_show_offline_default(&ctx.group, show)?;
            println!("Offline servers shown by default: {show}");
        }
    }
    Ok(())
}

// ========== Import / Export ==========

fn cmd_export(ctx: &Context) -> Result<(), CliError> {
    let config = ctx.store.export(&ctx.group)?;
    let encoded = codec::encode(&config).map_err(|e| CliError::Codec(e.to_string()))?;
    println!("{}", codec::editor_url(&ctx.settings.editor.base_url, &encoded));
    Ok(())
}

fn cmd_export_json(ctx: &Context) -> Result<(), CliError> {
    let config = ctx.store.export(&ctx.group)?;
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| CliError::Config(format!("Failed to serialize: {e}")))?;
    println!("{json}");
    Ok(())
}

fn cmd_import(ctx: &Context, data: &str) -> Result<(), CliError> {
    let config = codec::decode(data).map_err(|e| CliError::Codec(e.to_string()))?;
    let count = config.server_count();
    if !ctx.store.import(&ctx.group, config)? {
        return Err(CliError::Rejected(
            "configuration contains duplicate or invalid servers".to_string(),
        ));
    }
    println!("Imported {count} servers");
    Ok(())
}

fn cmd_import_json(ctx: &Context, file: &Path) -> Result<(), CliError> {
    let content = std::fs::read_to_string(file)?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| CliError::Validation(format!("{} is not valid JSON: {e}", file.display())))?;
    if !ctx.store.import_value(&ctx.group, value)? {
        return Err(CliError::Rejected(format!(
            "{} is not a valid group configuration",
            file.display()
        )));
    }
    println!(
        "Imported {} servers",
        ctx.store.get_flat(&ctx.group)?.len()
    );
    Ok(())
}

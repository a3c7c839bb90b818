//! Filedeck CLI: upload files, list and filter uploaded files, check login input.
//!
//! Reads FILEDECK_API_URL and FILEDECK_TOKEN (or `--token`). Uses bearer auth.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use filedeck_api_client::ApiClient;
use filedeck_cli::render::{file_listing_json, file_table, transfer_line};
use filedeck_cli::{init_tracing, DashboardState};
use filedeck_core::models::{
    DateRange, FilterSpec, LoginRequest, MimeFilter, RawFile, SizeRange, TransferId,
};
use filedeck_core::validation::ensure_login_valid;
use filedeck_core::{ClientConfig, EnvToken, StaticToken, TokenSource};
use filedeck_upload::{OrchestratorConfig, UploadOrchestrator};

#[derive(Parser)]
#[command(name = "filedeck", about = "Upload and browse files")]
struct Cli {
    /// API base URL (overrides FILEDECK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides FILEDECK_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more files concurrently
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Maximum simultaneous uploads (overrides FILEDECK_MAX_CONCURRENT_UPLOADS)
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
    /// List uploaded files, optionally filtered
    List(ListArgs),
    /// Validate login form input without contacting the server
    LoginCheck {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive filename search
    #[arg(long, default_value = "")]
    search: String,

    /// MIME substring, e.g. image or pdf ("all" disables the filter)
    #[arg(long, default_value = MimeFilter::ALL)]
    mime: MimeFilter,

    /// Minimum size in KB
    #[arg(long, default_value = "0")]
    min_kb: u64,

    /// Maximum size in KB
    #[arg(long)]
    max_kb: Option<u64>,

    /// Uploaded at or after (RFC 3339)
    #[arg(long, value_name = "TIMESTAMP")]
    from: Option<DateTime<Utc>>,

    /// Uploaded at or before (RFC 3339)
    #[arg(long, value_name = "TIMESTAMP")]
    to: Option<DateTime<Utc>>,

    /// Tag to match; repeat for several (any one matches)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Uploader substring
    #[arg(long, default_value = "")]
    uploader: String,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,
}

impl ListArgs {
    fn filter_spec(&self) -> FilterSpec {
        let date_range = if self.from.is_some() || self.to.is_some() {
            Some(DateRange {
                from: self.from,
                to: self.to,
            })
        } else {
            None
        };

        FilterSpec {
            search: self.search.clone(),
            mime_type: self.mime.clone(),
            size_range: SizeRange::new(self.min_kb, self.max_kb.unwrap_or(u64::MAX)),
            date_range,
            tags: self.tags.iter().cloned().collect::<BTreeSet<_>>(),
            uploader: self.uploader.clone(),
        }
    }
}

fn load_config(api_url: Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.api_url = url;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn token_source(token: Option<String>) -> Arc<dyn TokenSource> {
    match token {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(EnvToken::default()),
    }
}

async fn upload(
    config: ClientConfig,
    tokens: Arc<dyn TokenSource>,
    paths: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = RawFile::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }

    let client = ApiClient::new(&config).context("Failed to create API client")?;
    let orchestrator = UploadOrchestrator::new(
        Arc::new(client),
        tokens,
        OrchestratorConfig::from(&config),
        Some(Arc::new(|| tracing::debug!("Remote file listing changed"))),
    );

    let mut view = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        let mut printed: HashMap<TransferId, String> = HashMap::new();
        while view.changed().await.is_ok() {
            let records = view.borrow_and_update().clone();
            for record in &records {
                let line = transfer_line(record);
                if printed.get(&record.id) != Some(&line) {
                    println!("{}", line);
                    printed.insert(record.id.clone(), line);
                }
            }
        }
    });

    let result = orchestrator.submit(files).await;
    orchestrator.shutdown();
    let _ = printer.await;

    let report = result?;
    if !report.all_succeeded() {
        anyhow::bail!("{} of {} uploads failed", report.failed.len(), report.total());
    }
    println!("Uploaded {} file(s)", report.succeeded.len());
    Ok(())
}

async fn list(config: ClientConfig, tokens: Arc<dyn TokenSource>, args: ListArgs) -> anyhow::Result<()> {
    let client = ApiClient::new(&config).context("Failed to create API client")?;
    let state = DashboardState::load(&client, tokens.as_ref()).await;

    if let Some(message) = state.message() {
        anyhow::bail!(message);
    }

    let spec = args.filter_spec();
    let visible = state.visible(&spec);
    let summary = state.summary(&spec);

    match args.format.as_str() {
        "json" => {
            let out = file_listing_json(&visible, summary).context("Serialize file listing")?;
            println!("{}", out);
        }
        _ => {
            print!("{}", file_table(&visible, summary));
        }
    }

    Ok(())
}

fn login_check(email: String, password: String) -> anyhow::Result<()> {
    ensure_login_valid(&LoginRequest { email, password })
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("Login input is valid");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            files,
            max_concurrent,
        } => {
            let mut config = load_config(cli.api_url)?;
            if max_concurrent.is_some() {
                config.max_concurrent_uploads = max_concurrent;
                config.validate().context("Invalid configuration")?;
            }
            upload(config, token_source(cli.token), files).await?;
        }
        Commands::List(args) => {
            let config = load_config(cli.api_url)?;
            list(config, token_source(cli.token), args).await?;
        }
        Commands::LoginCheck { email, password } => {
            login_check(email, password)?;
        }
    }

    Ok(())
}

//! Command line definitions and handlers

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use msgscope_core::{
    render_text, run_group, run_report, AnalysisKind, Lookup, ReportTier, TargetQuery,
};

use crate::config::AppConfig;
use crate::export::ExportSource;
use crate::persist::save_report;
use crate::retry::{resolve_with_retry, RetryPolicy};

#[derive(Parser, Debug)]
#[command(name = "msgscope")]
#[command(about = "Profile an account from its message history")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: configured level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ./msgscope.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a profile report for one account
    Analyze {
        /// @username, bare username, phone digits, numeric id or "First Last"
        target: String,
        /// Conversation export to read messages from
        #[arg(short, long)]
        input: PathBuf,
        /// Report tier: complete, enhanced or premium
        #[arg(short, long)]
        tier: Option<ReportTier>,
        /// Run only these analyses (comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<AnalysisKind>,
        /// Directory for the saved report files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Print the report without writing files
        #[arg(long)]
        no_save: bool,
    },
    /// Summarize who posts in a group export
    Group {
        /// Group conversation export
        #[arg(short, long)]
        input: PathBuf,
        /// Maximum number of messages to read
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show the effective configuration
    CheckConfig,
}

pub async fn dispatch(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Analyze {
            target,
            input,
            tier,
            only,
            output_dir,
            no_save,
        } => {
            handle_analyze(
                &config,
                AnalyzeArgs {
                    target,
                    input,
                    tier,
                    only,
                    output_dir,
                    no_save,
                },
            )
            .await
        }
        Commands::Group { input, limit } => handle_group(&config, input, limit).await,
        Commands::CheckConfig => handle_check_config(&config),
    }
}

pub struct AnalyzeArgs {
    pub target: String,
    pub input: PathBuf,
    pub tier: Option<ReportTier>,
    pub only: Vec<AnalysisKind>,
    pub output_dir: Option<PathBuf>,
    pub no_save: bool,
}

pub async fn handle_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let credentials = config
        .credentials()
        .context("platform credentials are not usable")?;
    tracing::debug!(
        api_id = credentials.api_id,
        api_hash = %mask(&credentials.api_hash),
        "credentials accepted"
    );
    let settings = config.analysis_settings(args.tier, &args.only)?;
    let lexicons = config.lexicons()?;

    let source = ExportSource::open(&args.input).await?;
    tracing::debug!(
        path = %source.path().display(),
        messages = source.message_count(),
        "message source ready"
    );
    let query = TargetQuery::parse(&args.target);
    println!("🔍 Looking up {query}");

    let target = match resolve_with_retry(&source, &query, RetryPolicy::default()).await {
        Lookup::Found(profile) => profile,
        Lookup::NotFound => {
            tracing::warn!(%query, "target not found");
            print_not_found(&query);
            return Ok(());
        }
        Lookup::Transient(reason) => {
            anyhow::bail!("lookup for {query} kept failing: {reason}");
        }
    };

    let searched_at = Utc::now();
    let report = run_report(&source, &target, &lexicons, &settings, searched_at).await;
    println!("{}", render_text(&report));

    let failed = report.failed_sections();
    if !failed.is_empty() {
        tracing::warn!(sections = ?failed, "some analyses failed");
    }

    if args.no_save || !config.output.save {
        return Ok(());
    }
    let dir = args
        .output_dir
        .unwrap_or_else(|| config.output.directory.clone());
    let saved = save_report(&report, &dir, None, searched_at)?;
    println!("💾 Report saved to {}", saved.json.display());
    println!("📄 Text report saved to {}", saved.text.display());
    Ok(())
}

fn print_not_found(query: &TargetQuery) {
    println!("❌ No account matches {query}");
    println!("Suggestions:");
    println!("  - Usernames take the form @user");
    println!("  - Phone numbers must include the country code");
    println!("  - Check that the account exists and is not private");
    if let TargetQuery::Name { suggested, .. } = query {
        println!("  - Try the username {suggested}");
    }
}

pub async fn handle_group(
    config: &AppConfig,
    input: PathBuf,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let source = ExportSource::open(&input).await?;
    let group = source.profile().clone();
    let limit = limit.unwrap_or(config.analysis.group_limit);

    let activity = run_group(&source, &group, limit)
        .await
        .with_context(|| format!("analyzing group {}", group.handle()))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&activity).context("serializing group activity")?
    );
    Ok(())
}

pub fn handle_check_config(config: &AppConfig) -> anyhow::Result<()> {
    println!("📋 Configuration:");
    println!("  Platform:");
    println!("    - api_id: {}", mask(&config.platform.api_id));
    println!("    - api_hash: {}", mask(&config.platform.api_hash));
    println!("    - session: {}", config.platform.session_name);
    println!("  Logging:");
    println!("    - level: {}", config.logging.level);
    println!("    - directory: {}", config.logging.directory.display());
    println!("  Analysis:");
    println!("    - tier: {}", config.analysis.tier.version());
    println!("    - stock stopwords: {}", config.analysis.use_stock_stopwords);
    match &config.analysis.lexicon_file {
        Some(path) => println!("    - lexicon file: {}", path.display()),
        None => println!("    - lexicon file: built-in"),
    }
    for (name, limit) in &config.analysis.limits {
        println!("    - limit {name}: {limit}");
    }
    println!("    - group limit: {}", config.analysis.group_limit);
    println!("  Output:");
    println!("    - directory: {}", config.output.directory.display());
    println!("    - save: {}", config.output.save);

    match config.credentials() {
        Ok(_) => println!("✅ Credentials look usable"),
        Err(err) => println!("⚠️  {err}"),
    }
    config.lexicons()?;
    println!("✅ Lexicons compile");
    Ok(())
}

/// Keep the first and last two characters.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return "(unset)".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

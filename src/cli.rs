//! Command-line interface.
//!
//! Every command reads JSON records from files, runs the core and prints
//! JSON (or a plain-text report) to stdout.

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{OutreachEngine, ProspectInput};
use crate::feedback::{
    generate_feedback_report, get_conversion_stats, get_winning_patterns, score_reply_sentiment,
    ConversionStats,
};
use crate::langbase::LangbaseClient;
use crate::refine::{polish_variant, GenerativeRefiner, RuleBasedRefiner};
use crate::render::{Channel, Tone};
use crate::research::ResearchArtifact;
use crate::scoring::Tier;
use crate::sequence::{get_cadence_schedule, SequenceOptions};
use crate::storage::{OutreachStore, SqliteStorage};

/// Command-line entry point.
#[derive(Parser, Debug)]
#[command(name = "bdr-outreach", version, about = "Evidence-grounded outreach drafting")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Prospect record files shared by several commands.
#[derive(clap::Args, Debug, Clone)]
pub struct ProspectFiles {
    /// Contact JSON file
    #[arg(long)]
    pub contact: PathBuf,

    /// Account JSON file
    #[arg(long)]
    pub account: Option<PathBuf>,

    /// Person research JSON file
    #[arg(long)]
    pub person: Option<PathBuf>,

    /// Cached company research JSON file
    #[arg(long)]
    pub company: Option<PathBuf>,

    /// Enrichment input JSON file (job postings, funding, news)
    #[arg(long)]
    pub enrichment: Option<PathBuf>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a multi-touch sequence
    Generate {
        #[command(flatten)]
        files: ProspectFiles,

        /// friendly, direct or curious
        #[arg(long, default_value = "friendly")]
        tone: String,

        /// Include the email touch even without an email on file
        #[arg(long)]
        has_email: bool,

        /// First send date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        start: Option<String>,

        /// Re-rank pains with the Langbase pain-refiner pipe
        #[arg(long)]
        refine: bool,

        /// Polish written touches with the Langbase polish pipe
        #[arg(long)]
        polish: bool,

        /// Save draft rows to the database
        #[arg(long)]
        save: bool,

        /// Let conversion history from the database pick the first proof point
        #[arg(long)]
        use_feedback: bool,
    },

    /// Score a prospect against the ICP
    Score {
        #[command(flatten)]
        files: ProspectFiles,
    },

    /// Score reply sentiment
    Sentiment {
        /// Reply text
        text: String,

        /// Intent already recorded for the reply
        #[arg(long, default_value = "")]
        intent: String,
    },

    /// Show the cadence for a tier
    Cadence {
        /// hot, warm, cool or cold
        #[arg(long)]
        tier: String,

        /// First send date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        start: Option<String>,
    },

    /// Render the three tone variants of the first touch
    Variants {
        #[command(flatten)]
        files: ProspectFiles,

        /// linkedin or email
        #[arg(long, default_value = "linkedin")]
        channel: String,
    },

    /// Split prospects into stratified A/B groups for one test variable
    AbAssign {
        /// JSON array of prospect inputs, each with a contact id
        #[arg(long)]
        prospects: PathBuf,

        /// Variable under test: pain_hook, proof_point_style, opener_style,
        /// ask_intensity or message_length
        #[arg(long, default_value = "pain_hook")]
        variable: String,
    },

    /// Print the conversion feedback report from the database
    Report {
        /// Look-back window in days (defaults to FEEDBACK_WINDOW_DAYS)
        #[arg(long)]
        days: Option<i64>,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Text printed on completion.
    pub message: String,
}

impl CliResult {
    /// Exit 0 with `message`.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Exit 1 with `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(json) => Self::success(json),
            Err(e) => Self::error(format!("Failed to serialize output: {}", e)),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn read_optional<T: DeserializeOwned>(path: Option<&PathBuf>) -> Result<Option<T>, String> {
    path.map(|p| read_json(p)).transpose()
}

fn load_prospect(files: &ProspectFiles) -> Result<ProspectInput, String> {
    Ok(ProspectInput {
        contact: read_json(&files.contact)?,
        account: read_optional(files.account.as_ref())?,
        person: read_optional(files.person.as_ref())?,
        company_research: read_optional(files.company.as_ref())?,
        signals: Vec::new(),
        enrichment: read_optional(files.enrichment.as_ref())?,
    })
}

fn parse_start(start: Option<&str>) -> Result<NaiveDate, String> {
    match start {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| format!("Invalid start date '{}': {}", raw, e)),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Execute a CLI command.
pub async fn execute_command(command: Commands, config: &Config, engine: &OutreachEngine) -> CliResult {
    let result = match command {
        Commands::Generate {
            files,
            tone,
            has_email,
            start,
            refine,
            polish,
            save,
            use_feedback,
        } => {
            let flags = GenerateFlags {
                has_email,
                refine,
                polish,
                save,
                use_feedback,
            };
            execute_generate(config, engine, &files, &tone, start.as_deref(), flags).await
        }
        Commands::Score { files } => execute_score(engine, &files),
        Commands::Sentiment { text, intent } => Ok(CliResult::json(&score_reply_sentiment(&text, &intent))),
        Commands::Cadence { tier, start } => execute_cadence(&tier, start.as_deref()),
        Commands::Variants { files, channel } => execute_variants(engine, &files, &channel),
        Commands::AbAssign {
            prospects,
            variable,
        } => execute_ab_assign(engine, &prospects, &variable),
        Commands::Report { days } => execute_report(config, engine, days).await,
    };
    result.unwrap_or_else(CliResult::error)
}

#[derive(Debug, Clone, Copy)]
struct GenerateFlags {
    has_email: bool,
    refine: bool,
    polish: bool,
    save: bool,
    use_feedback: bool,
}

fn langbase_client(config: &Config) -> Result<Option<LangbaseClient>, String> {
    let Some(langbase) = &config.langbase else {
        return Ok(None);
    };
    LangbaseClient::new(langbase, config.request.clone())
        .map(Some)
        .map_err(|e| format!("Failed to initialize Langbase client: {}", e))
}

async fn execute_generate(
    config: &Config,
    engine: &OutreachEngine,
    files: &ProspectFiles,
    tone: &str,
    start: Option<&str>,
    flags: GenerateFlags,
) -> Result<CliResult, String> {
    let tone: Tone = tone.parse()?;
    let start = parse_start(start)?;
    let input = load_prospect(files)?;
    let outcome = engine.research(&input).map_err(|e| e.to_string())?;
    let mut artifact = outcome.artifact;

    let client = if flags.refine || flags.polish {
        let client = langbase_client(config)?;
        match &client {
            Some(client) => {
                if let Err(e) = client.ensure_refinement_pipes(&config.pipes).await {
                    warn!(error = %e, "Could not upsert refinement pipes; calls may fail");
                }
            }
            None => warn!("LANGBASE_API_KEY not set; skipping generative refinement"),
        }
        client
    } else {
        None
    };

    if let (true, Some(client)) = (flags.refine, &client) {
        let refiner = GenerativeRefiner::new(
            client.clone(),
            config.pipes.pain_refiner.clone(),
            RuleBasedRefiner,
        );
        artifact = engine.refine(&refiner, &artifact).await;
    }

    let scoring = engine.score(&artifact);
    let has_email = flags.has_email || input.contact.has_email();
    let stats = if flags.use_feedback {
        Some(load_stats(config, engine, engine.policy().feedback_window_days).await?)
    } else {
        None
    };
    let mut options = SequenceOptions::new(tone, has_email, start);
    if let Some(stats) = &stats {
        options = options.with_feedback(stats, engine.policy().feedback_min_sample);
    }
    let mut sequence = engine
        .sequence(&artifact, &scoring, &options)
        .map_err(|e| e.to_string())?;

    if let (true, Some(client)) = (flags.polish, &client) {
        for touch in sequence.touches.iter_mut() {
            touch.message = polish_variant(
                client,
                &config.pipes.message_polish,
                &touch.message,
                &artifact,
                engine.catalog(),
            )
            .await;
        }
    }

    if flags.save {
        let contact_id = input
            .contact
            .id
            .clone()
            .ok_or_else(|| "--save needs a contact with an id".to_string())?;
        let store = SqliteStorage::new(&config.database)
            .await
            .map_err(|e| e.to_string())?;
        let saved = engine
            .save_sequence(&store, &contact_id, &artifact, &sequence)
            .await
            .map_err(|e| e.to_string())?;
        info!(contact_id = %contact_id, saved, "Saved drafts");
    }

    Ok(CliResult::json(&sequence))
}

fn scored_artifact(engine: &OutreachEngine, files: &ProspectFiles) -> Result<ResearchArtifact, String> {
    let input = load_prospect(files)?;
    engine
        .research(&input)
        .map(|outcome| outcome.artifact)
        .map_err(|e| e.to_string())
}

fn execute_score(engine: &OutreachEngine, files: &ProspectFiles) -> Result<CliResult, String> {
    let artifact = scored_artifact(engine, files)?;
    Ok(CliResult::json(&engine.score(&artifact)))
}

fn execute_cadence(tier: &str, start: Option<&str>) -> Result<CliResult, String> {
    let tier: Tier = tier.parse()?;
    let start = parse_start(start)?;
    Ok(CliResult::json(&get_cadence_schedule(tier, start)))
}

fn execute_variants(
    engine: &OutreachEngine,
    files: &ProspectFiles,
    channel: &str,
) -> Result<CliResult, String> {
    let channel: Channel = channel.parse()?;
    if channel == Channel::Phone {
        return Err("Variants are rendered for linkedin or email".to_string());
    }
    let artifact = scored_artifact(engine, files)?;
    let scoring = engine.score(&artifact);
    let variants = engine
        .variants(&artifact, &scoring, channel)
        .map_err(|e| e.to_string())?;
    Ok(CliResult::json(&variants))
}

fn execute_ab_assign(
    engine: &OutreachEngine,
    prospects: &Path,
    variable: &str,
) -> Result<CliResult, String> {
    let inputs: Vec<ProspectInput> = read_json(prospects)?;
    let mut researched = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let contact_id = input
            .contact
            .id
            .clone()
            .ok_or_else(|| {
                format!(
                    "Prospect '{} {}' has no contact id",
                    input.contact.first_name, input.contact.last_name
                )
            })?;
        let artifact = engine
            .research(input)
            .map_err(|e| e.to_string())?
            .artifact;
        researched.push((contact_id, artifact));
    }
    let assignment = engine.assign_ab_groups(&researched, variable);
    info!(
        variable,
        group_a = assignment.group_a_count,
        group_b = assignment.group_b_count,
        "Split prospects"
    );
    Ok(CliResult::json(&assignment))
}

async fn load_stats(
    config: &Config,
    engine: &OutreachEngine,
    days: i64,
) -> Result<ConversionStats, String> {
    let store = SqliteStorage::new(&config.database)
        .await
        .map_err(|e| e.to_string())?;
    let now = Utc::now();
    let history = store
        .load_history(now - Duration::days(days))
        .await
        .map_err(|e| e.to_string())?;
    let stats = get_conversion_stats(&history, days, now);
    debug!(
        touches = stats.totals.touches_sent,
        policy = %engine.policy().version,
        "Loaded conversion history"
    );
    Ok(stats)
}

async fn execute_report(
    config: &Config,
    engine: &OutreachEngine,
    days: Option<i64>,
) -> Result<CliResult, String> {
    let days = days.unwrap_or(engine.policy().feedback_window_days);
    if days <= 0 {
        return Err(format!("--days must be positive, got {}", days));
    }
    let stats = load_stats(config, engine, days).await?;
    let patterns = get_winning_patterns(&stats, engine.policy().feedback_min_sample);
    Ok(CliResult::success(generate_feedback_report(&stats, &patterns)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    use crate::config::{
        CatalogPaths, DatabaseConfig, FeedbackConfig, LogFormat, LoggingConfig, PipeConfig,
        ProductConfig, RequestConfig,
    };

    fn test_config() -> Config {
        Config {
            langbase: None,
            database: DatabaseConfig {
                path: PathBuf::from(":memory:"),
                max_connections: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
            request: RequestConfig::default(),
            pipes: PipeConfig::default(),
            catalog: CatalogPaths::default(),
            feedback: FeedbackConfig::default(),
        }
    }

    fn json_file(value: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    fn sarah_files() -> (NamedTempFile, NamedTempFile) {
        let contact = json_file(serde_json::json!({
            "id": "c-1",
            "first_name": "Sarah",
            "last_name": "Chen",
            "title": "Director of QA",
            "company_name": "PayFlow",
            "email": "sarah@payflow.io"
        }));
        let account = json_file(serde_json::json!({
            "name": "PayFlow",
            "industry": "FinTech",
            "employee_count": 350,
            "buyer_intent": true,
            "known_tools": "[\"Selenium\", \"Jira\"]"
        }));
        (contact, account)
    }

    fn files(contact: &NamedTempFile, account: &NamedTempFile) -> ProspectFiles {
        ProspectFiles {
            contact: contact.path().to_path_buf(),
            account: Some(account.path().to_path_buf()),
            person: None,
            company: None,
            enrichment: None,
        }
    }

    fn engine() -> OutreachEngine {
        OutreachEngine::new(Arc::new(ProductConfig::builtin()))
    }

    #[test]
    fn test_cli_result_codes() {
        assert_eq!(CliResult::success("ok").exit_code, 0);
        assert_eq!(CliResult::error("bad").exit_code, 1);
    }

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "bdr-outreach",
            "generate",
            "--contact",
            "c.json",
            "--tone",
            "direct",
            "--has-email",
            "--start",
            "2026-01-05",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                files,
                tone,
                has_email,
                start,
                ..
            } => {
                assert_eq!(files.contact, PathBuf::from("c.json"));
                assert_eq!(tone, "direct");
                assert!(has_email);
                assert_eq!(start.as_deref(), Some("2026-01-05"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_prints_sequence() {
        let (contact, account) = sarah_files();
        let command = Commands::Generate {
            files: files(&contact, &account),
            tone: "friendly".to_string(),
            has_email: false,
            start: Some("2026-01-05".to_string()),
            refine: false,
            polish: false,
            save: false,
            use_feedback: false,
        };
        let result = execute_command(command, &test_config(), &engine()).await;
        assert_eq!(result.exit_code, 0, "{}", result.message);
        let value: serde_json::Value = serde_json::from_str(&result.message).unwrap();
        assert_eq!(value["touches"].as_array().unwrap().len(), 6);
        assert_eq!(value["cadence"]["tier"], "hot");
    }

    #[tokio::test]
    async fn test_generate_saves_and_uses_feedback() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.database.path = dir.path().join("outreach.db");
        let (contact, account) = sarah_files();

        let command = Commands::Generate {
            files: files(&contact, &account),
            tone: "direct".to_string(),
            has_email: true,
            start: Some("2026-01-05".to_string()),
            refine: false,
            polish: false,
            save: true,
            use_feedback: true,
        };
        let result = execute_command(command, &config, &engine()).await;
        assert_eq!(result.exit_code, 0, "{}", result.message);

        let store = SqliteStorage::new(&config.database).await.unwrap();
        assert_eq!(store.list_drafts("c-1").await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_score_and_variants() {
        let (contact, account) = sarah_files();
        let score = execute_command(
            Commands::Score {
                files: files(&contact, &account),
            },
            &test_config(),
            &engine(),
        )
        .await;
        let value: serde_json::Value = serde_json::from_str(&score.message).unwrap();
        assert_eq!(value["tier"], "hot");

        let variants = execute_command(
            Commands::Variants {
                files: files(&contact, &account),
                channel: "email".to_string(),
            },
            &test_config(),
            &engine(),
        )
        .await;
        let value: serde_json::Value = serde_json::from_str(&variants.message).unwrap();
        assert_eq!(value["variants"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_bad_inputs_exit_nonzero() {
        let result = execute_command(
            Commands::Cadence {
                tier: "lukewarm".to_string(),
                start: None,
            },
            &test_config(),
            &engine(),
        )
        .await;
        assert_eq!(result.exit_code, 1);

        let missing = ProspectFiles {
            contact: PathBuf::from("/nonexistent/contact.json"),
            account: None,
            person: None,
            company: None,
            enrichment: None,
        };
        let result = execute_command(Commands::Score { files: missing }, &test_config(), &engine()).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.message.contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_ab_assign_splits_prospects() {
        let prospects = json_file(serde_json::json!([
            { "contact": { "id": "c-1", "first_name": "Sarah", "last_name": "Chen",
                           "title": "Director of QA", "company_name": "PayFlow" } },
            { "contact": { "id": "c-2", "first_name": "Maya", "last_name": "Ortiz",
                           "title": "Director of QA", "company_name": "Ledgerly" } },
            { "contact": { "id": "c-3", "first_name": "Alex", "last_name": "Doe",
                           "title": "Coordinator", "company_name": "Unknown Co" } }
        ]));
        let result = execute_command(
            Commands::AbAssign {
                prospects: prospects.path().to_path_buf(),
                variable: "ask_intensity".to_string(),
            },
            &test_config(),
            &engine(),
        )
        .await;
        assert_eq!(result.exit_code, 0, "{}", result.message);
        let value: serde_json::Value = serde_json::from_str(&result.message).unwrap();
        assert_eq!(value["variable"], "ask_intensity");
        assert_eq!(value["assignments"].as_object().unwrap().len(), 3);
        assert_ne!(value["assignments"]["c-1"], value["assignments"]["c-2"]);
    }

    #[tokio::test]
    async fn test_ab_assign_needs_contact_ids() {
        let prospects = json_file(serde_json::json!([
            { "contact": { "first_name": "Sarah", "last_name": "Chen",
                           "title": "Director of QA", "company_name": "PayFlow" } }
        ]));
        let result = execute_command(
            Commands::AbAssign {
                prospects: prospects.path().to_path_buf(),
                variable: "pain_hook".to_string(),
            },
            &test_config(),
            &engine(),
        )
        .await;
        assert_eq!(result.exit_code, 1);
        assert!(result.message.contains("no contact id"));
    }

    #[tokio::test]
    async fn test_cadence_and_sentiment() {
        let result = execute_command(
            Commands::Cadence {
                tier: "cool".to_string(),
                start: Some("2026-01-05".to_string()),
            },
            &test_config(),
            &engine(),
        )
        .await;
        let rows: serde_json::Value = serde_json::from_str(&result.message).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2]["send_date"], "2026-01-26");

        let result = execute_command(
            Commands::Sentiment {
                text: "Not interested".to_string(),
                intent: String::new(),
            },
            &test_config(),
            &engine(),
        )
        .await;
        let value: serde_json::Value = serde_json::from_str(&result.message).unwrap();
        assert_eq!(value["action"], "mark_dnc");
    }
}

//! autogrow CLI
//!
//! 自動化バックエンドを呼び出し、結果をストアに反映して JSON で出力する。
//!
//! ```bash
//! autogrow login <token>
//! autogrow content generate --topic "Career Advice" --audience Students --tone Casual
//! autogrow alumni campaign --kind connection --ids alumni_1,alumni_2
//! autogrow workflows start content_creation --config '{"postsPerWeek": 15}'
//! ```

use anyhow::{Context, Result};
use autogrow::api::{
    CreateAdCampaign, DateRange, FileCredentialStore, GenerateContent, ImportSource, WorkflowKind,
};
use autogrow::config::{self, ConfigManager};
use autogrow::models::OutreachKind;
use autogrow::{logging, ApiError, AutomationClient, ResultApplier, SessionState, Store};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "autogrow")]
#[command(version)]
#[command(about = "Growth automation command line client", long_about = None)]
struct Cli {
    /// 設定ファイル（省略時はプラットフォームの設定ディレクトリ）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// APIのベースURL
    #[arg(long, env = config::API_URL_ENV, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an API token
    Login { token: String },
    /// Remove the stored API token
    Logout,
    /// Show dashboard statistics
    Dashboard,
    /// Check backend health
    Health,
    /// Content generation
    Content {
        #[command(subcommand)]
        action: ContentCommands,
    },
    /// Alumni engagement
    Alumni {
        #[command(subcommand)]
        action: AlumniCommands,
    },
    /// Ad campaigns
    Ads {
        #[command(subcommand)]
        action: AdsCommands,
    },
    /// Competitor tracking
    Competitors {
        #[command(subcommand)]
        action: CompetitorCommands,
    },
    /// Automation workflows
    Workflows {
        #[command(subcommand)]
        action: WorkflowCommands,
    },
    /// Generate an analytics report
    Report {
        #[arg(long = "type", default_value = "weekly")]
        report_type: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
}

#[derive(Subcommand)]
enum ContentCommands {
    /// Generate draft posts
    Generate {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = "Students")]
        audience: String,
        #[arg(long, default_value = "Professional")]
        tone: String,
    },
}

#[derive(Subcommand)]
enum AlumniCommands {
    /// Import alumni contacts
    Import {
        #[arg(long, default_value = "csv")]
        source: ImportSource,
        /// 取り込みデータ（JSON）
        #[arg(long, default_value = "{}")]
        data: String,
    },
    /// Start an engagement campaign
    Campaign {
        #[arg(long)]
        kind: OutreachKind,
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum AdsCommands {
    /// Create an ad campaign
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        budget: f64,
        #[arg(long, default_value = "students")]
        audience: String,
        #[arg(long = "headline", required = true)]
        headlines: Vec<String>,
    },
    /// Optimize an ad campaign
    Optimize { id: String },
    /// Pause low-performing ads
    PauseLow,
}

#[derive(Subcommand)]
enum CompetitorCommands {
    /// Start tracking a competitor
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
    },
    /// Refresh competitor data
    Refresh { id: String },
}

#[derive(Subcommand)]
enum WorkflowCommands {
    /// List workflows
    List,
    /// Start a workflow
    Start {
        id: String,
        /// ワークフロー設定（JSONオブジェクト）
        #[arg(long, default_value = "{}")]
        config: String,
    },
    /// Stop a workflow
    Stop { id: String },
    /// Show workflow status
    Status { id: String },
}

/// コマンド結果とストアのスナップショット
#[derive(Serialize)]
struct Output<'a, T: Serialize> {
    result: &'a T,
    snapshot: &'a autogrow::Snapshot,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn print_with_snapshot<T: Serialize>(result: &T, applier: &ResultApplier) -> Result<()> {
    let snapshot = applier.store().snapshot();
    print_json(&Output {
        result,
        snapshot: &snapshot,
    })
}

fn parse_json(label: &str, raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).with_context(|| format!("--{} is not valid JSON", label))
}

async fn run(cli: Cli) -> Result<()> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut app_config = manager.load_effective_config()?;
    if let Some(url) = cli.api_url {
        app_config.api.base_url = url;
    }

    let _log_guard = logging::init_logging(&app_config.log)?;
    debug!("Using backend at {}", app_config.api.base_url);

    let credentials = Arc::new(FileCredentialStore::new(config::token_path(
        &app_config.auth,
    )?));
    let client = AutomationClient::new(&app_config.api, credentials)?;
    let applier = ResultApplier::new(Store::new().into_handle());

    match cli.command {
        Commands::Login { token } => {
            client.login(&token)?;
            eprintln!("Logged in.");
        }
        Commands::Logout => {
            client.logout()?;
            eprintln!("Logged out.");
        }
        Commands::Dashboard => {
            let stats = applier.track_loading(client.dashboard_summary()).await?;
            applier.dashboard(&stats);
            print_with_snapshot(&stats, &applier)?;
        }
        Commands::Health => {
            let health = client.health().await?;
            print_json(&health)?;
        }
        Commands::Content { action } => match action {
            ContentCommands::Generate {
                topic,
                audience,
                tone,
            } => {
                let request = GenerateContent::new(topic, audience, tone);
                let generated = applier
                    .track_loading(client.generate_content(&request))
                    .await?;
                applier.generated_content(&generated);
                print_with_snapshot(&generated, &applier)?;
            }
        },
        Commands::Alumni { action } => match action {
            AlumniCommands::Import { source, data } => {
                let data = parse_json("data", &data)?;
                let imported = applier
                    .track_loading(client.import_alumni(source, data))
                    .await?;
                applier.imported_alumni(&imported);
                if imported.alumni.is_empty() {
                    let list = client.list_alumni().await?;
                    applier.alumni_list(&list);
                }
                print_with_snapshot(&imported, &applier)?;
            }
            AlumniCommands::Campaign { kind, ids } => {
                let list = client.list_alumni().await?;
                applier.alumni_list(&list);
                let handle = applier
                    .track_loading(client.start_engagement_campaign(ids.clone(), kind))
                    .await?;
                applier.campaign_started(&ids, kind, &handle);
                print_with_snapshot(&handle, &applier)?;
            }
        },
        Commands::Ads { action } => match action {
            AdsCommands::Create {
                name,
                budget,
                audience,
                headlines,
            } => {
                let request = CreateAdCampaign {
                    name,
                    budget,
                    target_audience: audience,
                    headlines,
                };
                let created = applier
                    .track_loading(client.create_ad_campaign(&request))
                    .await?;
                applier.ad_campaign(&created);
                print_with_snapshot(&created, &applier)?;
            }
            AdsCommands::Optimize { id } => {
                let list = client.list_ad_campaigns().await?;
                applier.ad_campaign_list(&list);
                let optimized = applier
                    .track_loading(client.optimize_ad_campaign(&id))
                    .await?;
                applier.ad_campaign(&optimized);
                print_with_snapshot(&optimized, &applier)?;
            }
            AdsCommands::PauseLow => {
                let list = client.list_ad_campaigns().await?;
                applier.ad_campaign_list(&list);
                let paused = applier
                    .track_loading(client.pause_low_performing_ads())
                    .await?;
                let applied = applier.paused_ads(&paused);
                info!("⏸️ Paused {} campaigns", applied);
                print_with_snapshot(&paused, &applier)?;
            }
        },
        Commands::Competitors { action } => match action {
            CompetitorCommands::Add { name, url } => {
                let added = applier
                    .track_loading(client.add_competitor(name, url))
                    .await?;
                applier.competitor(&added);
                print_with_snapshot(&added, &applier)?;
            }
            CompetitorCommands::Refresh { id } => {
                let list = client.list_competitors().await?;
                applier.competitor_list(&list);
                let refreshed = applier
                    .track_loading(client.refresh_competitor(&id))
                    .await?;
                applier.competitor(&refreshed);
                print_with_snapshot(&refreshed, &applier)?;
            }
        },
        Commands::Workflows { action } => match action {
            WorkflowCommands::List => print_json(&client.list_workflows().await?)?,
            WorkflowCommands::Start { id, config } => {
                let configuration = parse_json("config", &config)?;
                let control = client
                    .start_workflow(WorkflowKind::from(id.as_str()), configuration)
                    .await?;
                print_json(&control)?;
            }
            WorkflowCommands::Stop { id } => {
                print_json(&client.stop_workflow(WorkflowKind::from(id.as_str())).await?)?
            }
            WorkflowCommands::Status { id } => print_json(
                &client
                    .workflow_status(WorkflowKind::from(id.as_str()))
                    .await?,
            )?,
        },
        Commands::Report {
            report_type,
            start,
            end,
        } => {
            let report = applier
                .track_loading(client.generate_report(&report_type, DateRange { start, end }))
                .await?;
            print_json(&report)?;
        }
    }

    if client.session_state() == SessionState::LoginRequired {
        eprintln!("Session expired. Run `autogrow login <token>` to sign in again.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let login_required = e
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_unauthorized);
            if login_required {
                eprintln!("Login required: run `autogrow login <token>` first.");
                ExitCode::from(2)
            } else {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        }
    }
}

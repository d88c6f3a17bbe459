use anyhow::Context;
use clap::{Parser, Subcommand};
use etfwise_core::clients::{
    DecisionClient, HomeFeedClient, HttpReasonApi, NewsClient, OfflineReasonApi, PortfolioClient,
    ReasonApi,
};
use etfwise_core::config::Settings;
use etfwise_core::domain::checkup::{CheckupInput, CheckupRef, RecomposeInput, Tone};
use etfwise_core::domain::portfolio::{RiskTolerance, SurveyForm};
use etfwise_core::error::ApiError;
use etfwise_core::poller::{result_path, JobPoller, PollConfig, PollState};
use etfwise_core::store::{FileStore, KeyValueStore};
use etfwise_core::time::{Clock, SystemClock};
use etfwise_core::transport::{HttpTransport, Transport};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "etfwise")]
struct Args {
    /// Serve the checkup lifecycle from the in-process offline backend.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// ETF news cards, optionally filtered by ticker.
    News {
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Decision brief per ticker.
    Decision {
        #[arg(long, value_delimiter = ',', required = true)]
        tickers: Vec<String>,
        #[arg(long, default_value_t = etfwise_core::clients::decision::DEFAULT_LIMIT_PER_TICKER)]
        limit_per_ticker: u32,
    },

    /// Sector and ETF cards for the landing page.
    HomeFeed,

    /// Survey-driven ETF portfolio.
    Portfolio {
        #[arg(long)]
        age: u32,
        #[arg(long)]
        seed_money: u64,
        /// 안정형, 중립형 or 공격형.
        #[arg(long, default_value = "중립형")]
        risk_tolerance: String,
        #[arg(long)]
        goal: String,
    },

    /// Submit a checkup, wait for its job, then print the result.
    Checkup {
        #[arg(long)]
        goal: String,
        #[arg(long)]
        concern: String,
        #[arg(long, default_value_t = 4)]
        horizon_weeks: u32,
    },

    /// Wait on an existing job.
    Status {
        #[arg(long)]
        job_id: String,
        #[arg(long)]
        checkup_id: Option<String>,
    },

    /// Print the result of a checkup.
    #[command(name = "result")]
    Readout {
        #[arg(long)]
        job_id: Option<String>,
        #[arg(long)]
        checkup_id: Option<String>,
    },

    /// Reframe a checkup with another tone and focus.
    Recompose {
        #[arg(long)]
        job_id: Option<String>,
        #[arg(long)]
        checkup_id: Option<String>,
        /// balanced, optimistic or conservative.
        #[arg(long, default_value = "balanced")]
        tone: String,
        #[arg(long, default_value = "전환율 개선")]
        focus: String,
    },

    /// Meeting-ready talking points for a checkup.
    Briefing {
        #[arg(long)]
        job_id: Option<String>,
        #[arg(long)]
        checkup_id: Option<String>,
    },

    /// Check the live `/etf-news` and `/etf-decision-brief` contracts.
    IntegrationCheck,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(&settings, args).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        match err.downcast_ref::<ApiError>() {
            Some(api_err) => tracing::error!(error = %api_err, "request rejected"),
            None => tracing::error!(error = %err, "command failed"),
        }
    }
    res
}

async fn run(settings: &Settings, args: Args) -> anyhow::Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::from_settings(settings)?);
    tracing::debug!(base_url = %settings.api_base_url, offline = args.offline, "starting");

    match args.command {
        Command::News { tickers, limit } => {
            let cards = NewsClient::new(transport)
                .fetch_etf_news(&tickers, limit)
                .await?;
            print_json(&cards)
        }
        Command::Decision {
            tickers,
            limit_per_ticker,
        } => {
            let cards = DecisionClient::new(transport)
                .with_limit_per_ticker(limit_per_ticker)
                .fetch_decision_brief(&tickers)
                .await?;
            print_json(&cards)
        }
        Command::HomeFeed => {
            let feed = HomeFeedClient::new(transport).fetch_home_feed().await?;
            print_json(&feed)
        }
        Command::Portfolio {
            age,
            seed_money,
            risk_tolerance,
            goal,
        } => {
            let risk_tolerance = RiskTolerance::parse(&risk_tolerance).ok_or_else(|| {
                ApiError::invalid_input("risk_tolerance", "투자 성향을 다시 선택해주세요.")
            })?;
            let form = SurveyForm {
                age,
                seed_money,
                risk_tolerance,
                goal,
            };
            let portfolio = PortfolioClient::new(transport)
                .generate_portfolio(&form)
                .await?;
            print_json(&portfolio)
        }
        Command::Checkup {
            goal,
            concern,
            horizon_weeks,
        } => {
            let api = reason_api(settings, transport, args.offline);
            let ticket = api
                .submit_checkup(&CheckupInput::new(&goal, &concern, horizon_weeks))
                .await?;
            print_json(&ticket)?;
            wait_and_show(settings, api, ticket.job_id, ticket.checkup_id).await
        }
        Command::Status { job_id, checkup_id } => {
            let api = reason_api(settings, transport, args.offline);
            wait_and_show(settings, api, job_id, checkup_id).await
        }
        Command::Readout { job_id, checkup_id } => {
            let api = reason_api(settings, transport, args.offline);
            let result = api.get_result(&CheckupRef { job_id, checkup_id }).await?;
            print_json(&result)
        }
        Command::Recompose {
            job_id,
            checkup_id,
            tone,
            focus,
        } => {
            let tone = Tone::parse(&tone).ok_or_else(|| {
                ApiError::invalid_input("tone", "tone must be balanced, optimistic or conservative")
            })?;
            let api = reason_api(settings, transport, args.offline);
            let result = api
                .recompose(&RecomposeInput {
                    tone,
                    focus,
                    job_id,
                    checkup_id,
                })
                .await?;
            print_json(&result)
        }
        Command::Briefing { job_id, checkup_id } => {
            let api = reason_api(settings, transport, args.offline);
            let briefing = api.get_briefing(&CheckupRef { job_id, checkup_id }).await?;
            print_json(&briefing)
        }
        Command::IntegrationCheck => {
            tracing::info!(base_url = %settings.api_base_url, "running integration checks");
            let report = etfwise_core::smoke::run_integration_checks(transport.as_ref()).await?;
            tracing::info!(
                news_items = report.news_items,
                decision_results = report.decision_results,
                "all integration checks passed"
            );
            Ok(())
        }
    }
}

fn reason_api(
    settings: &Settings,
    transport: Arc<dyn Transport>,
    offline: bool,
) -> Arc<dyn ReasonApi> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&settings.local_store_path));
    if offline {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Arc::new(OfflineReasonApi::new(store, clock))
    } else {
        Arc::new(HttpReasonApi::new(transport, store))
    }
}

/// Polls the job like the processing screen does, then prints the result.
async fn wait_and_show(
    settings: &Settings,
    api: Arc<dyn ReasonApi>,
    job_id: String,
    checkup_id: Option<String>,
) -> anyhow::Result<()> {
    let poller = JobPoller::new(
        api.clone(),
        Arc::new(SystemClock),
        PollConfig::from_settings(settings),
        job_id.clone(),
        checkup_id.clone(),
    );
    let dispose = poller.dispose_handle();

    let outcome = tokio::select! {
        outcome = poller.run() => outcome,
        _ = tokio::signal::ctrl_c() => {
            dispose.dispose();
            tracing::warn!(%job_id, "interrupted while waiting for job");
            None
        }
    };

    match outcome.unwrap_or_else(|| poller.state()) {
        PollState::Completed { checkup_id } => {
            tracing::info!(next = %result_path(&job_id, checkup_id.as_deref()), "job completed");
            let result = api
                .get_result(&CheckupRef {
                    job_id: Some(job_id),
                    checkup_id,
                })
                .await?;
            print_json(&result)
        }
        PollState::Failed => {
            anyhow::bail!("job {job_id} failed; retry with `etfwise status --job-id {job_id}`")
        }
        PollState::TimedOut => {
            anyhow::bail!(
                "job {job_id} is taking longer than expected; re-check with `etfwise status --job-id {job_id}`"
            )
        }
        PollState::Processing => anyhow::bail!("stopped waiting for job {job_id}"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{text}");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

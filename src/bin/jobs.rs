//! Runs the CRM's scheduled jobs against a running API.
//!
//! ```bash
//! # run every job on its configured interval
//! jobs
//!
//! # run one job now and exit
//! jobs --once weekly_report
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use axum_crm_api::{
    config::JobConfig,
    jobs::{
        Scheduler,
        client::CrmClient,
        heartbeat::Heartbeat,
        low_stock::LowStockRestock,
        order_reminders::OrderReminders,
        sink::{LogSink, Stamp},
        weekly_report::WeeklyReport,
    },
};

#[derive(Parser)]
#[command(name = "jobs", about = "CRM scheduled jobs")]
struct Cli {
    /// Run a single job immediately and exit
    #[arg(long, value_name = "JOB")]
    once: Option<String>,

    /// GraphQL endpoint, overriding CRM_GRAPHQL_ENDPOINT
    #[arg(long)]
    endpoint: Option<String>,
}

fn scheduler(config: &JobConfig, client: &CrmClient) -> Scheduler {
    Scheduler::new()
        .with(Heartbeat::new(
            client.clone(),
            LogSink::new(&config.heartbeat_log, Stamp::DayFirst),
            config.heartbeat_every,
        ))
        .with(LowStockRestock::new(
            client.clone(),
            LogSink::new(&config.low_stock_log, Stamp::DayFirst),
            config.low_stock_every,
        ))
        .with(OrderReminders::new(
            client.clone(),
            LogSink::new(&config.order_reminders_log, Stamp::Iso),
            config.order_reminders_every,
            config.reminder_lookback_days,
        ))
        .with(WeeklyReport::new(
            client.clone(),
            LogSink::new(&config.report_log, Stamp::Iso),
            config.report_every,
        ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,axum_crm_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = JobConfig::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        config.graphql_endpoint = endpoint;
    }

    let client = CrmClient::new(&config.graphql_endpoint)?;
    let scheduler = scheduler(&config, &client);

    if let Some(name) = cli.once {
        if !scheduler.run_once(&name).await? {
            anyhow::bail!("job {name} failed");
        }
        return Ok(());
    }

    tracing::info!(
        endpoint = %config.graphql_endpoint,
        jobs = ?scheduler.job_names(),
        "starting scheduler"
    );
    scheduler
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
        })
        .await;
    Ok(())
}

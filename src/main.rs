#![allow(clippy::result_large_err)]

use chrono::Utc;
use dotenvy::dotenv;
use hearth::{
    config::{self, database},
    context::AppContext,
    errors::{Error, Result},
    jobs::{self, Job},
    mail::mailgun::MailgunMailer,
    web,
};
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: hearth [serve | run-job <job>]";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))?;

    let mailer = Arc::new(MailgunMailer::new(&app_config.mail));
    let ctx = AppContext::new(db, mailer, Arc::new(app_config));

    // 5. Serve, or run one job for the scheduler
    let args: Vec<String> = env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => web::serve(ctx).await,
        ["run-job", name] => {
            let job: Job = name.parse()?;
            let report = jobs::run_job(&ctx, job, Utc::now()).await?;
            info!("{} sent {} email(s), {} failed", job, report.sent, report.failed);
            Ok(())
        }
        _ => Err(Error::Config {
            message: USAGE.to_string(),
        }),
    }
}

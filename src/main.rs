use budget_ledger::{
    config::{database, settings},
    core::{owner, reminder},
    errors::Result,
};
use chrono::Utc;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load config.toml, or defaults when absent
    let config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and create tables
    let database_url = config.database_url();
    database::ensure_parent_dir(&database_url)?;
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Register configured owners
    let added = owner::seed_owners(&db, &config.owners).await?;
    if added > 0 {
        info!(added, "Registered owners from config.toml");
    }

    // 6. Run today's reminders and alerts
    let today = Utc::now().date_naive();
    let report = reminder::run_daily_checks(&db, today, &config.ledger).await?;
    for reminder in &report.reminders {
        if reminder.is_overdue() {
            warn!(
                email = %reminder.email,
                bill = %reminder.bill_name,
                amount = reminder.amount,
                due = %reminder.due_date,
                "Bill is overdue"
            );
        } else {
            info!(
                email = %reminder.email,
                bill = %reminder.bill_name,
                amount = reminder.amount,
                due = %reminder.due_date,
                "Bill is due in {} days",
                reminder.days_until_due
            );
        }
    }
    for alert in &report.alerts {
        warn!(
            email = %alert.email,
            budget = alert.current_budget,
            threshold = alert.threshold,
            "Budget is running low"
        );
    }

    Ok(())
}

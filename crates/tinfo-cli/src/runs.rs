use tinfo_core::AppConfig;
use tinfo_db::PoolConfig;

pub(crate) async fn list_runs(config: &AppConfig, limit: i64) -> anyhow::Result<()> {
    let pool = tinfo_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    let runs = tinfo_db::list_ingest_runs(&pool, limit.clamp(1, 500)).await?;

    if runs.is_empty() {
        println!("no ingest runs recorded");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<10} {:<12} {:>5} {:>5} {:>5} {:>5} {:>5}  message",
        "id", "started", "status", "country", "raw", "dup", "old", "kept", "saved"
    );
    for run in runs {
        println!(
            "{:<6} {:<20} {:<10} {:<12} {:>5} {:>5} {:>5} {:>5} {:>5}  {}",
            run.id,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            run.status,
            run.country,
            run.raw_fetched,
            run.duplicate_skipped,
            run.old_skipped,
            run.retained,
            run.persisted,
            run.message.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

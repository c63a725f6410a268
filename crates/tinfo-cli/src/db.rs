use tinfo_core::AppConfig;
use tinfo_db::PoolConfig;

pub(crate) async fn ping(config: &AppConfig) -> anyhow::Result<()> {
    let pool = tinfo_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    tinfo_db::ping(&pool).await?;
    println!("database reachable");
    Ok(())
}

pub(crate) async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = tinfo_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    let applied = tinfo_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}

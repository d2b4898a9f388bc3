use tracing::info;

use crate::config::Config;

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::connect(config).await?;
    crate::db::apply_schema(&pool).await?;
    info!("schema is up to date");
    crate::db::close(&pool).await;
    Ok(())
}

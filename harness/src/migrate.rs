use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

pub async fn run(database_url: &str) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .context("connect to database for migration")?;

    sqlx::migrate!("../crates/store/migrations")
        .run(&pool)
        .await
        .context("run migrations")?;

    tracing::info!("migrations applied");
    Ok(())
}

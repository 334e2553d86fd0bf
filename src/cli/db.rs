use anyhow::bail;
use sqlx::PgPool;
use tokio::process::Command;
use tracing::info;

use crate::settings::Config;

async fn sqlx_cli(args: &[&str]) -> anyhow::Result<()> {
    let status = Command::new("sqlx").arg("migrate").args(args).status().await?;
    if !status.success() {
        bail!("sqlx migrate {} exited with {}", args.join(" "), status);
    }
    Ok(())
}

pub async fn db_generate(migration_name: &str) -> anyhow::Result<()> {
    sqlx_cli(&["add", migration_name, "-r"]).await
}

pub async fn db_list(config: &Config) -> anyhow::Result<()> {
    sqlx_cli(&["info", "-D", &config.database_url]).await
}

pub async fn db_revert(config: &Config) -> anyhow::Result<()> {
    sqlx_cli(&["revert", "-D", &config.database_url]).await
}

/// Applies pending migrations with the embedded migrator, no sqlx-cli needed.
pub async fn db_migrate(pool: &PgPool) -> anyhow::Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    migrator.run(pool).await?;
    info!("migrations applied: {}", migrator.iter().count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::db_migrate;

    #[sqlx::test(migrations = false)]
    async fn test_db_migrate(pool: PgPool) -> anyhow::Result<()> {
        // When
        db_migrate(&pool).await?;
        // running again is a no-op
        db_migrate(&pool).await?;

        // Expect
        let tables: Vec<(String,)> = sqlx::query_as(
            r#"SELECT table_name::text FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name <> '_sqlx_migrations'
            ORDER BY table_name"#,
        )
        .fetch_all(&pool)
        .await?;
        let tables: Vec<String> = tables.into_iter().map(|x| x.0).collect();
        assert_eq!(
            tables,
            vec![
                "application_link",
                "employee",
                "job",
                "job_application",
                "notification",
                "user"
            ]
        );
        Ok(())
    }
}

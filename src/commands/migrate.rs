//! Migrate command - Schema management for the bizlens tables.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config).await?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            tracing::info!("Rolled back the latest migration");
        }
        MigrateAction::Status => print!("{}", status_report(&db.migration_status().await?)),
        MigrateAction::Fresh => {
            tracing::warn!("Dropping users, analyses, comparisons and sentiment history");
            db.fresh_migrations().await?;
            tracing::info!("Schema recreated from scratch");
        }
    }

    Ok(())
}

/// One aligned line per migration, then a pending count.
fn status_report(status: &[(String, bool)]) -> String {
    let width = status.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out: String = status
        .iter()
        .map(|(name, applied)| {
            let state = if *applied { "applied" } else { "pending" };
            format!("{:width$}  {}\n", name, state, width = width)
        })
        .collect();

    let pending = status.iter().filter(|(_, applied)| !applied).count();
    out.push_str(&format!("{} of {} pending\n", pending, status.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_report_alignment() {
        let report = status_report(&[
            ("m20240101_000001_create_users_table".to_string(), true),
            ("m20240301_000001_create_monitoring_tables".to_string(), false),
        ]);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("       applied"));
        assert!(lines[1].ends_with("  pending"));
        assert_eq!(lines[2], "1 of 2 pending");
    }
}

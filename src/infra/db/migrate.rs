use std::collections::HashSet;

use tracing::{info, warn};

use super::dialect::Dialect;
use super::gateway::Gateway;
use crate::error::{is_unique_violation, AppError};
use crate::params;

/// A named schema change bundled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

const SQLITE_MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_create_events.sql",
        sql: include_str!("../../../migrations/sqlite/0001_create_events.sql"),
    },
    Migration {
        name: "0002_create_registrations.sql",
        sql: include_str!("../../../migrations/sqlite/0002_create_registrations.sql"),
    },
    Migration {
        name: "0003_create_settings.sql",
        sql: include_str!("../../../migrations/sqlite/0003_create_settings.sql"),
    },
];

const POSTGRES_MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_create_events.sql",
        sql: include_str!("../../../migrations/postgres/0001_create_events.sql"),
    },
    Migration {
        name: "0002_create_registrations.sql",
        sql: include_str!("../../../migrations/postgres/0002_create_registrations.sql"),
    },
    Migration {
        name: "0003_create_settings.sql",
        sql: include_str!("../../../migrations/postgres/0003_create_settings.sql"),
    },
];

/// The migration set shipped for a dialect.
pub fn bundled(dialect: Dialect) -> &'static [Migration] {
    match dialect {
        Dialect::Embedded => SQLITE_MIGRATIONS,
        Dialect::ClientServer => POSTGRES_MIGRATIONS,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

const CREATE_TRACKING_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Applies every migration not yet recorded in `schema_migrations`, in name order.
///
/// Each migration runs in its own transaction together with its tracking row, so a
/// failure leaves earlier migrations applied and the failing one untouched. The
/// tracking row is inserted first; if another process already claimed the version,
/// the unique key rejects the insert and the version is skipped.
pub async fn migrate(gateway: &Gateway, migrations: &[Migration]) -> Result<MigrationReport, AppError> {
    gateway
        .execute(CREATE_TRACKING_TABLE, &[])
        .await
        .map_err(|source| AppError::Migration { version: "schema_migrations".into(), source })?;

    let applied: HashSet<String> = gateway
        .query::<(String,)>("SELECT version FROM schema_migrations", &[])
        .await
        .map_err(|source| AppError::Migration { version: "schema_migrations".into(), source })?
        .into_iter()
        .map(|(version,)| version)
        .collect();

    let mut ordered: Vec<&Migration> = migrations.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(b.name));

    let mut report = MigrationReport::default();

    for migration in ordered {
        if applied.contains(migration.name) {
            report.skipped.push(migration.name.to_string());
            continue;
        }

        let fail = |source: sqlx::Error| AppError::Migration { version: migration.name.to_string(), source };

        let mut tx = gateway.begin().await.map_err(fail)?;

        match tx
            .execute("INSERT INTO schema_migrations (version) VALUES (?)", &params![migration.name])
            .await
        {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                warn!("Migration {} was applied concurrently, skipping", migration.name);
                tx.rollback().await.map_err(fail)?;
                report.skipped.push(migration.name.to_string());
                continue;
            }
            Err(e) => return Err(fail(e)),
        }

        if let Err(e) = tx.execute_script(migration.sql).await {
            let _ = tx.rollback().await;
            return Err(fail(e));
        }
        tx.commit().await.map_err(fail)?;

        info!("Applied migration: {}", migration.name);
        report.applied.push(migration.name.to_string());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundles_are_sorted_and_aligned() {
        let sqlite: Vec<_> = bundled(Dialect::Embedded).iter().map(|m| m.name).collect();
        let postgres: Vec<_> = bundled(Dialect::ClientServer).iter().map(|m| m.name).collect();

        let mut sorted = sqlite.clone();
        sorted.sort();
        assert_eq!(sqlite, sorted);
        assert_eq!(sqlite, postgres);
    }
}

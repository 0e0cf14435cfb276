use crate::connection::DbPool;
use crate::repositories::RepositoryError;
use serde::Serialize;
use sqlx::Executor;
use tracing::info;

/// Row contract for the deterministic fee master data.
const SEED_TABLES: &[SeedTableContract] = &[
    SeedTableContract {
        table: "master_country",
        ids: &["ctry-us", "ctry-in", "ctry-de"],
    },
    SeedTableContract { table: "master_organization_type", ids: &["org-large", "org-startup"] },
    SeedTableContract { table: "master_entity_type", ids: &["ent-profit", "ent-nonprofit"] },
    SeedTableContract {
        table: "complexity_level",
        ids: &["cx-low", "cx-medium", "cx-high", "cx-legacy"],
    },
    SeedTableContract {
        table: "engagement_model",
        ids: &[
            "em-aggregator",
            "em-mkt-general",
            "em-mkt-program",
            "em-paas",
            "em-market-place",
            "em-retired",
        ],
    },
    SeedTableContract {
        table: "engagement_model_fee_mapping",
        ids: &[
            "map-agg-platform",
            "map-agg-advance",
            "map-gen-platform",
            "map-gen-management",
            "map-pm-platform",
            "map-pm-management",
            "map-pm-consulting",
            "map-paas-platform",
            "map-paas-consulting",
            "map-mp-platform",
            "map-mp-management",
        ],
    },
    SeedTableContract {
        table: "fee_component_parameter",
        ids: &[
            "fee-us-platform",
            "fee-us-management",
            "fee-us-consulting",
            "fee-us-management-old",
            "fee-in-platform",
            "fee-in-management",
            "fee-in-consulting",
            "fee-in-advance",
        ],
    },
];

/// Scopes the seed configures parameters for.
const SEED_SCOPES: &[SeedScope] = &[
    SeedScope {
        country: "United States",
        organization_type: "Large Enterprise",
        entity_type: "For Profit",
        currency_code: "USD",
    },
    SeedScope {
        country: "India",
        organization_type: "Startup",
        entity_type: "For Profit",
        currency_code: "INR",
    },
];

/// Fee master dataset: catalogs, complexity levels, engagement models with
/// their component mappings, and parameters for two scopes.
pub struct FeeMasterSeed;

impl FeeMasterSeed {
    pub const SQL: &str = include_str!("../../../config/fixtures/fee_master_seed.sql");

    /// Loads the dataset. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let tables = SEED_TABLES
            .iter()
            .map(|contract| SeededTable { table: contract.table, rows: contract.ids.len() })
            .collect::<Vec<_>>();
        let scopes = SEED_SCOPES.iter().map(SeedScope::label).collect::<Vec<_>>();

        info!(
            event_name = "db.seed.loaded",
            tables = tables.len(),
            scopes = scopes.len(),
            "fee master seed loaded"
        );
        Ok(SeedResult { tables, scopes })
    }

    /// Checks that every seeded row exists and each scope resolves to its currency.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for contract in SEED_TABLES {
            let quoted = sql_array_from_ids(contract.ids);
            let count: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(1) FROM {} WHERE id IN {quoted}",
                contract.table
            ))
            .fetch_one(pool)
            .await?;
            checks.push(VerificationCheck {
                label: contract.table.to_string(),
                passed: count == contract.ids.len() as i64,
            });
        }

        for scope in SEED_SCOPES {
            let currencies: Vec<String> = sqlx::query_scalar(
                r#"
                SELECT DISTINCT c.currency_code
                FROM fee_component_parameter p
                JOIN master_country c ON c.id = p.country_id
                JOIN master_organization_type o ON o.id = p.organization_type_id
                JOIN master_entity_type e ON e.id = p.entity_type_id
                WHERE c.name = ?1 AND o.name = ?2 AND e.name = ?3 AND p.is_active = 1
                "#,
            )
            .bind(scope.country)
            .bind(scope.organization_type)
            .bind(scope.entity_type)
            .fetch_all(pool)
            .await?;
            checks.push(VerificationCheck {
                label: format!("scope {}", scope.label()),
                passed: currencies == [scope.currency_code],
            });
        }

        let all_present = checks.iter().all(|check| check.passed);
        Ok(VerificationResult { all_present, checks })
    }
}

struct SeedTableContract {
    table: &'static str,
    ids: &'static [&'static str],
}

struct SeedScope {
    country: &'static str,
    organization_type: &'static str,
    entity_type: &'static str,
    currency_code: &'static str,
}

impl SeedScope {
    fn label(&self) -> String {
        format!("{}/{}/{}", self.country, self.organization_type, self.entity_type)
    }
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted =
        ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect::<Vec<_>>().join(", ");
    format!("({quoted})")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeededTable {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub tables: Vec<SeededTable>,
    pub scopes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationCheck {
    pub label: String,
    pub passed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<VerificationCheck>,
}

impl VerificationResult {
    pub fn failed_checks(&self) -> impl Iterator<Item = &VerificationCheck> {
        self.checks.iter().filter(|check| !check.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::{sql_array_from_ids, FeeMasterSeed};
    use crate::{connect_with_settings, migrations};

    #[test]
    fn id_lists_are_quoted_and_escaped() {
        assert_eq!(sql_array_from_ids(&["a", "b'c"]), "('a', 'b''c')");
    }

    #[tokio::test]
    async fn load_is_repeatable_and_verifies() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let first = FeeMasterSeed::load(&pool).await.expect("first load");
        let second = FeeMasterSeed::load(&pool).await.expect("second load");
        assert_eq!(first, second);

        let verification = FeeMasterSeed::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "failed: {:?}", verification.failed_checks().collect::<Vec<_>>());

        let parameter_rows: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM fee_component_parameter")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(parameter_rows, 8);
    }

    #[tokio::test]
    async fn verify_reports_missing_rows_before_load() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let verification = FeeMasterSeed::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.failed_checks().any(|check| check.label == "complexity_level"));
    }
}

use std::str::FromStr;

use async_trait::async_trait;
use engagefee_core::domain::fee::{
    ComplexityMultiplier, EngagementModelFeeMapping, FeeComponentRequirement, FeeComponentType,
    FeeParameter, FeeParameterRecord, RateType,
};
use engagefee_core::errors::LookupError;
use engagefee_core::pricing::source::FeeDataSource;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed fee master data.
///
/// Country, organization type and entity type are stored as catalog rows and
/// joined here, so callers receive flattened records keyed by display name.
pub struct SqlFeeDataSource {
    pool: DbPool,
}

impl SqlFeeDataSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn db_error(error: sqlx::Error) -> LookupError {
        RepositoryError::Database(error).into()
    }

    /// Row-level failures are data problems, not connectivity problems.
    fn decode_error(error: sqlx::Error) -> LookupError {
        RepositoryError::Decode(error.to_string()).into()
    }

    fn parse_decimal(field: &str, value: &str) -> Result<Decimal, LookupError> {
        Decimal::from_str(value.trim())
            .map_err(|error| LookupError::Decode(format!("invalid decimal for {field}: {error}")))
    }

    fn parse_component_type(value: &str) -> Result<FeeComponentType, LookupError> {
        FeeComponentType::parse(value)
            .ok_or_else(|| LookupError::Decode(format!("unknown fee component type `{value}`")))
    }

    fn parameter_record_from_row(row: &SqliteRow) -> Result<FeeParameterRecord, LookupError> {
        let component_type: String = row.try_get("component_type").map_err(Self::decode_error)?;
        let rate_type: String = row.try_get("rate_type").map_err(Self::decode_error)?;
        let amount_text: String = row.try_get("amount_text").map_err(Self::decode_error)?;
        let complexity_applicable: i64 =
            row.try_get("complexity_applicable").map_err(Self::decode_error)?;
        let is_active: i64 = row.try_get("is_active").map_err(Self::decode_error)?;

        Ok(FeeParameterRecord {
            parameter: FeeParameter {
                id: row.try_get("id").map_err(Self::decode_error)?,
                component_type: Self::parse_component_type(&component_type)?,
                name: row.try_get("name").map_err(Self::decode_error)?,
                amount: Self::parse_decimal("amount", &amount_text)?,
                rate_type: RateType::parse(&rate_type).ok_or_else(|| {
                    LookupError::Decode(format!("unknown rate type `{rate_type}`"))
                })?,
                complexity_applicable: complexity_applicable != 0,
                currency_code: row.try_get("currency_code").map_err(Self::decode_error)?,
                currency_symbol: row.try_get("currency_symbol").map_err(Self::decode_error)?,
            },
            country: row.try_get("country_name").map_err(Self::decode_error)?,
            organization_type: row.try_get("organization_type_name").map_err(Self::decode_error)?,
            entity_type: row.try_get("entity_type_name").map_err(Self::decode_error)?,
            active: is_active != 0,
        })
    }
}

#[async_trait]
impl FeeDataSource for SqlFeeDataSource {
    async fn fee_parameters(
        &self,
        country: &str,
        organization_type: &str,
        entity_type: &str,
    ) -> Result<Vec<FeeParameterRecord>, LookupError> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.id,
                p.component_type,
                p.name,
                CAST(p.amount AS TEXT) AS amount_text,
                p.rate_type,
                p.complexity_applicable,
                p.is_active,
                c.name AS country_name,
                c.currency_code,
                c.currency_symbol,
                o.name AS organization_type_name,
                e.name AS entity_type_name
            FROM fee_component_parameter p
            JOIN master_country c ON c.id = p.country_id
            JOIN master_organization_type o ON o.id = p.organization_type_id
            JOIN master_entity_type e ON e.id = p.entity_type_id
            WHERE c.name = ?1
              AND o.name = ?2
              AND e.name = ?3
              AND p.is_active = 1
            ORDER BY p.display_order, p.id
            "#,
        )
        .bind(country)
        .bind(organization_type)
        .bind(entity_type)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_error)?;

        debug!(
            event_name = "db.fee_parameters.fetched",
            country,
            organization_type,
            entity_type,
            rows = rows.len(),
            "fee parameter rows fetched"
        );
        rows.iter().map(Self::parameter_record_from_row).collect()
    }

    async fn complexity_multiplier(
        &self,
        name: &str,
    ) -> Result<Option<ComplexityMultiplier>, LookupError> {
        let row = sqlx::query(
            r#"
            SELECT
                name,
                CAST(management_fee_multiplier AS TEXT) AS management_text,
                CAST(consulting_fee_multiplier AS TEXT) AS consulting_text
            FROM complexity_level
            WHERE name = ?1 AND is_active = 1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let management_text: String = row.try_get("management_text").map_err(Self::decode_error)?;
        let consulting_text: String = row.try_get("consulting_text").map_err(Self::decode_error)?;
        Ok(Some(ComplexityMultiplier {
            name: row.try_get("name").map_err(Self::decode_error)?,
            management: Self::parse_decimal("management_fee_multiplier", &management_text)?,
            consulting: Self::parse_decimal("consulting_fee_multiplier", &consulting_text)?,
        }))
    }

    async fn engagement_model_fee_mapping(
        &self,
        engagement_model: &str,
    ) -> Result<EngagementModelFeeMapping, LookupError> {
        let rows = sqlx::query(
            r#"
            SELECT m.fee_component_type, m.is_required, m.application_order
            FROM engagement_model_fee_mapping m
            JOIN engagement_model em ON em.id = m.engagement_model_id
            WHERE em.name = ?1 AND em.is_active = 1
            ORDER BY m.application_order, m.id
            "#,
        )
        .bind(engagement_model)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_error)?;

        let components = rows
            .iter()
            .map(|row| {
                let component_type: String =
                    row.try_get("fee_component_type").map_err(Self::decode_error)?;
                let is_required: i64 = row.try_get("is_required").map_err(Self::decode_error)?;
                let application_order: i64 =
                    row.try_get("application_order").map_err(Self::decode_error)?;
                Ok(FeeComponentRequirement {
                    component_type: Self::parse_component_type(&component_type)?,
                    is_required: is_required != 0,
                    application_order: i32::try_from(application_order).map_err(|_| {
                        LookupError::Decode(format!(
                            "application_order `{application_order}` does not fit in i32"
                        ))
                    })?,
                })
            })
            .collect::<Result<Vec<_>, LookupError>>()?;

        Ok(EngagementModelFeeMapping { engagement_model: engagement_model.to_string(), components })
    }

    async fn engagement_model_exists(&self, engagement_model: &str) -> Result<bool, LookupError> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM engagement_model WHERE name = ?1 AND is_active = 1)",
        )
        .bind(engagement_model)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::db_error)?;
        Ok(exists == 1)
    }
}

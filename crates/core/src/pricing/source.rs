use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::fee::{ComplexityMultiplier, EngagementModelFeeMapping, FeeParameterRecord};
use crate::errors::LookupError;

/// Read-only lookups against the master-data store.
///
/// Implementations return already-flattened records; join strategy and
/// transport belong to the implementation.
#[async_trait]
pub trait FeeDataSource: Send + Sync {
    async fn fee_parameters(
        &self,
        country: &str,
        organization_type: &str,
        entity_type: &str,
    ) -> Result<Vec<FeeParameterRecord>, LookupError>;

    /// Active complexity record by exact name.
    async fn complexity_multiplier(
        &self,
        name: &str,
    ) -> Result<Option<ComplexityMultiplier>, LookupError>;

    async fn engagement_model_fee_mapping(
        &self,
        engagement_model: &str,
    ) -> Result<EngagementModelFeeMapping, LookupError>;

    async fn engagement_model_exists(&self, engagement_model: &str) -> Result<bool, LookupError>;
}

#[async_trait]
impl<T> FeeDataSource for Arc<T>
where
    T: FeeDataSource + ?Sized,
{
    async fn fee_parameters(
        &self,
        country: &str,
        organization_type: &str,
        entity_type: &str,
    ) -> Result<Vec<FeeParameterRecord>, LookupError> {
        (**self).fee_parameters(country, organization_type, entity_type).await
    }

    async fn complexity_multiplier(
        &self,
        name: &str,
    ) -> Result<Option<ComplexityMultiplier>, LookupError> {
        (**self).complexity_multiplier(name).await
    }

    async fn engagement_model_fee_mapping(
        &self,
        engagement_model: &str,
    ) -> Result<EngagementModelFeeMapping, LookupError> {
        (**self).engagement_model_fee_mapping(engagement_model).await
    }

    async fn engagement_model_exists(&self, engagement_model: &str) -> Result<bool, LookupError> {
        (**self).engagement_model_exists(engagement_model).await
    }
}

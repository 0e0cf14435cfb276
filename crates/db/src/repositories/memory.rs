use std::collections::HashMap;

use tokio::sync::RwLock;

use engagefee_core::domain::fee::{
    ComplexityMultiplier, EngagementModelFeeMapping, FeeParameterRecord,
};
use engagefee_core::errors::LookupError;
use engagefee_core::pricing::source::FeeDataSource;

/// Fee master data held in process memory.
///
/// Parameter rows keep insertion order, which is the order the calculator
/// sees them in.
#[derive(Default)]
pub struct InMemoryFeeDataSource {
    parameters: RwLock<Vec<FeeParameterRecord>>,
    complexities: RwLock<HashMap<String, ComplexityMultiplier>>,
    models: RwLock<HashMap<String, EngagementModelFeeMapping>>,
}

impl InMemoryFeeDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_parameter(&self, record: FeeParameterRecord) {
        let mut parameters = self.parameters.write().await;
        parameters.push(record);
    }

    /// Replaces the multiplier pair for `multiplier.name`.
    pub async fn upsert_complexity(&self, multiplier: ComplexityMultiplier) {
        let mut complexities = self.complexities.write().await;
        complexities.insert(multiplier.name.clone(), multiplier);
    }

    pub async fn remove_complexity(&self, name: &str) -> Option<ComplexityMultiplier> {
        let mut complexities = self.complexities.write().await;
        complexities.remove(name)
    }

    /// Registers an engagement model together with its component mapping.
    pub async fn register_model(&self, mapping: EngagementModelFeeMapping) {
        let mut models = self.models.write().await;
        models.insert(mapping.engagement_model.clone(), mapping);
    }

    pub async fn retire_model(&self, name: &str) -> bool {
        let mut models = self.models.write().await;
        models.remove(name).is_some()
    }
}

#[async_trait::async_trait]
impl FeeDataSource for InMemoryFeeDataSource {
    async fn fee_parameters(
        &self,
        country: &str,
        organization_type: &str,
        entity_type: &str,
    ) -> Result<Vec<FeeParameterRecord>, LookupError> {
        let parameters = self.parameters.read().await;
        Ok(parameters
            .iter()
            .filter(|record| {
                record.active && record.matches_scope(country, organization_type, entity_type)
            })
            .cloned()
            .collect())
    }

    async fn complexity_multiplier(
        &self,
        name: &str,
    ) -> Result<Option<ComplexityMultiplier>, LookupError> {
        let complexities = self.complexities.read().await;
        Ok(complexities.get(name).cloned())
    }

    async fn engagement_model_fee_mapping(
        &self,
        engagement_model: &str,
    ) -> Result<EngagementModelFeeMapping, LookupError> {
        let models = self.models.read().await;
        Ok(models.get(engagement_model).cloned().unwrap_or_else(|| EngagementModelFeeMapping {
            engagement_model: engagement_model.to_string(),
            components: Vec::new(),
        }))
    }

    async fn engagement_model_exists(&self, engagement_model: &str) -> Result<bool, LookupError> {
        let models = self.models.read().await;
        Ok(models.contains_key(engagement_model))
    }
}

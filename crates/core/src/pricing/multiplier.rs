use tracing::{debug, warn};

use super::source::FeeDataSource;
use crate::domain::fee::ComplexityMultiplier;
use crate::domain::result::ComplexityFallback;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexityResolution {
    pub multiplier: ComplexityMultiplier,
    pub fallback: Option<ComplexityFallback>,
}

impl ComplexityResolution {
    fn resolved(multiplier: ComplexityMultiplier) -> Self {
        Self { multiplier, fallback: None }
    }

    fn degraded(reason: ComplexityFallback) -> Self {
        Self { multiplier: ComplexityMultiplier::neutral(), fallback: Some(reason) }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Resolves complexity multipliers, degrading to the neutral `{1, 1}` pair
/// instead of failing.
pub struct ComplexityResolver<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S> ComplexityResolver<'a, S>
where
    S: FeeDataSource + ?Sized,
{
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, complexity_level: &str) -> ComplexityResolution {
        let resolution = match self.source.complexity_multiplier(complexity_level).await {
            Ok(Some(multiplier)) if multiplier.is_valid() => {
                ComplexityResolution::resolved(multiplier)
            }
            Ok(Some(multiplier)) => {
                warn!(
                    event_name = "pricing.complexity.invalid_multiplier",
                    complexity_level,
                    management = %multiplier.management,
                    consulting = %multiplier.consulting,
                    "complexity multipliers must be positive; using neutral default"
                );
                ComplexityResolution::degraded(ComplexityFallback::InvalidMultiplier)
            }
            Ok(None) => {
                warn!(
                    event_name = "pricing.complexity.not_found",
                    complexity_level,
                    "no active complexity record; using neutral default"
                );
                ComplexityResolution::degraded(ComplexityFallback::NotFound)
            }
            Err(error) => {
                warn!(
                    event_name = "pricing.complexity.lookup_failed",
                    complexity_level,
                    error = %error,
                    "complexity lookup failed; using neutral default"
                );
                ComplexityResolution::degraded(ComplexityFallback::LookupFailed {
                    reason: error.to_string(),
                })
            }
        };

        debug!(
            event_name = "pricing.complexity.resolved",
            complexity_level,
            multiplier_name = %resolution.multiplier.name,
            fallback = resolution.is_fallback(),
            "complexity multiplier resolved"
        );
        resolution
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ComplexityResolver;
    use crate::domain::fee::ComplexityMultiplier;
    use crate::domain::result::ComplexityFallback;
    use crate::pricing::testing::StubFeeSource;

    #[tokio::test]
    async fn resolves_active_record_by_exact_name() {
        let source = StubFeeSource::standard();
        let resolution = ComplexityResolver::new(&source).resolve("High").await;

        assert_eq!(
            resolution.multiplier,
            ComplexityMultiplier::new("High", Decimal::TWO, Decimal::new(15, 1))
        );
        assert!(!resolution.is_fallback());
    }

    #[tokio::test]
    async fn name_match_is_case_sensitive() {
        let source = StubFeeSource::standard();
        let resolution = ComplexityResolver::new(&source).resolve("high").await;

        assert_eq!(resolution.multiplier, ComplexityMultiplier::neutral());
        assert_eq!(resolution.fallback, Some(ComplexityFallback::NotFound));
    }

    #[tokio::test]
    async fn negative_multiplier_degrades_to_neutral() {
        let source = StubFeeSource::standard().with_complexity(ComplexityMultiplier::new(
            "High",
            Decimal::TWO,
            Decimal::new(-1, 0),
        ));
        let resolution = ComplexityResolver::new(&source).resolve("High").await;

        assert_eq!(resolution.multiplier, ComplexityMultiplier::neutral());
        assert_eq!(resolution.fallback, Some(ComplexityFallback::InvalidMultiplier));
    }

    #[tokio::test]
    async fn store_errors_degrade_with_reason() {
        let source = StubFeeSource { fail_complexity: true, ..StubFeeSource::standard() };
        let resolution = ComplexityResolver::new(&source).resolve("Medium").await;

        assert_eq!(resolution.multiplier, ComplexityMultiplier::neutral());
        assert!(matches!(
            resolution.fallback,
            Some(ComplexityFallback::LookupFailed { ref reason }) if reason.contains("connection reset")
        ));
    }
}

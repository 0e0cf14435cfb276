pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::context::{CalculationContext, MembershipStatus};
pub use domain::fee::{
    ComplexityMultiplier, EngagementModel, EngagementModelFeeMapping, FeeComponentRequirement,
    FeeComponentType, FeeParameter, FeeParameterRecord, RateType,
};
pub use domain::result::{
    CalculationBreakdown, CalculationDiagnostic, CalculationResult, ComplexityFallback,
    ComponentBreakdown, ComposedFees,
};
pub use errors::{ApplicationError, FormulaError, InterfaceError, LookupError, PricingError};
pub use pricing::formula::{evaluate_formula, FormulaEvaluator, FormulaOutcome, FormulaPreview};
pub use pricing::source::FeeDataSource;
pub use pricing::{PricingCalculator, PricingSettings};

use thiserror::Error;

/// Failure reported by an external fee data source.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("could not decode stored record: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("fee parameter resolution failed: {0}")]
    ParameterResolution(#[source] LookupError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl PricingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormulaError {
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The fee calculation inputs are invalid. Check them and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "Fee configuration is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Pricing(PricingError::InvalidInput(message))
            | ApplicationError::Formula(FormulaError::InvalidExpression(message)) => {
                Self::BadRequest { message, correlation_id }
            }
            ApplicationError::Pricing(error @ PricingError::ParameterResolution(_))
            | ApplicationError::Pricing(error @ PricingError::Lookup(_)) => {
                Self::ServiceUnavailable { message: error.to_string(), correlation_id }
            }
            ApplicationError::Persistence(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

use std::fmt;

/// Value the optional fields take when the user leaves them alone.
pub const DEFAULT_OPTIONAL_ABILITY: &str = "None";

/// One ability triple as typed by the user, trimmed but otherwise raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub ability1: String,
    pub ability2: String,
    pub hidden_ability: String,
}

/// A request that should not reach the predictor. Not an error: the caller
/// shows the message and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationWarning {
    MissingAbility1,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MissingAbility1 => write!(f, "Please enter at least Ability 1."),
        }
    }
}

impl std::error::Error for ValidationWarning {}

impl PredictionRequest {
    pub fn new(ability1: &str, ability2: Option<&str>, hidden_ability: Option<&str>) -> Self {
        PredictionRequest {
            ability1: ability1.trim().to_string(),
            ability2: ability2.unwrap_or(DEFAULT_OPTIONAL_ABILITY).trim().to_string(),
            hidden_ability: hidden_ability
                .unwrap_or(DEFAULT_OPTIONAL_ABILITY)
                .trim()
                .to_string(),
        }
    }

    /// Only `ability1` is mandatory. Blank optional fields are fine; the
    /// predictor treats them like "None".
    pub fn validate(self) -> Result<Self, ValidationWarning> {
        if self.ability1.is_empty() {
            return Err(ValidationWarning::MissingAbility1);
        }
        Ok(self)
    }
}

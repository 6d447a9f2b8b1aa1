//! Generation parameters with fail-fast validation.

use orgpulse_model::{ClimatePreset, Department, ModuleCode};

/// Invalid generation parameters. Raised before any store write.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("respondent count must be positive")]
    ZeroRespondents,

    #[error("attention-check fail rate must be within [0, 1], got {0}")]
    FailRateOutOfRange(f64),

    #[error("at least one department is required")]
    NoDepartments,

    #[error("department headcounts sum to {total}, below {respondents} respondents")]
    InsufficientHeadcount { total: u32, respondents: u32 },

    #[error(transparent)]
    UnknownPreset(#[from] orgpulse_model::ParsePresetError),

    #[error(transparent)]
    UnknownModule(#[from] orgpulse_model::ParseModuleError),
}

/// Everything one simulated campaign needs. Built once, validated once, then
/// threaded through generation and verification so both sides agree on the
/// expected population.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub organization_name: String,
    pub preset: ClimatePreset,
    pub respondents: u32,
    pub departments: Vec<Department>,
    pub modules: Vec<ModuleCode>,
    /// Probability that a respondent flunks an attention check.
    pub fail_rate: f64,
    /// Master seed. Equal seeds reproduce byte-identical populations.
    pub seed: u64,
    /// Share of passing respondents who leave free-text comments.
    pub open_text_rate: f64,
}

impl GenerationParams {
    /// Standard department mix used when the caller does not supply one.
    #[must_use]
    pub fn default_departments() -> Vec<Department> {
        [
            ("Engineering", 40),
            ("Sales", 30),
            ("Operations", 30),
            ("Marketing", 30),
            ("People", 20),
        ]
        .into_iter()
        .map(|(name, headcount)| Department { name: name.to_string(), headcount })
        .collect()
    }

    #[must_use]
    pub fn new(organization_name: &str, preset: ClimatePreset, respondents: u32, seed: u64) -> Self {
        Self {
            organization_name: organization_name.to_string(),
            preset,
            respondents,
            departments: Self::default_departments(),
            modules: Vec::new(),
            fail_rate: 0.08,
            seed,
            open_text_rate: 0.2,
        }
    }

    /// Validate before generation touches the store.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.respondents == 0 {
            return Err(ConfigError::ZeroRespondents);
        }
        if !(0.0..=1.0).contains(&self.fail_rate) {
            return Err(ConfigError::FailRateOutOfRange(self.fail_rate));
        }
        if self.departments.is_empty() {
            return Err(ConfigError::NoDepartments);
        }
        let total: u32 = self.departments.iter().map(|d| d.headcount).sum();
        if total < self.respondents {
            return Err(ConfigError::InsufficientHeadcount { total, respondents: self.respondents });
        }
        Ok(())
    }

    /// Total headcount across departments; doubles as the organization's
    /// employee count.
    #[must_use]
    pub fn employee_count(&self) -> u32 {
        self.departments.iter().map(|d| d.headcount).sum()
    }
}

/// Parse a `Name:count,Name:count` department list.
pub fn parse_departments(raw: &str) -> Result<Vec<Department>, ConfigError> {
    let mut departments = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, count) = part.split_once(':').ok_or(ConfigError::NoDepartments)?;
        let headcount: u32 = count.trim().parse().map_err(|_| ConfigError::NoDepartments)?;
        departments.push(Department { name: name.trim().to_string(), headcount });
    }
    if departments.is_empty() {
        return Err(ConfigError::NoDepartments);
    }
    Ok(departments)
}

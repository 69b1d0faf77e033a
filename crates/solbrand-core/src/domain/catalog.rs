//! Step catalog: the ordered list of branding steps.
//!
//! Declaration order is the sole sequencing authority. The catalog is pure
//! and stateless; the only failure mode is a lookup miss.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Step identifier (value object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub String);

impl StepId {
    /// Convenience constructor
    pub fn new(id: impl Into<String>) -> Self {
        StepId(id.into())
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        StepId(id.to_string())
    }
}

/// Immutable definition of one branding step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Unique step id
    pub id: StepId,
    /// Human-readable title, used verbatim in activity descriptions
    pub title: String,
    /// Short description surfaced by step listings
    pub description: String,
    /// Whether the step is mandatory for a finished brand
    pub required: bool,
    /// Cost in whole tokens charged on first completion
    pub cost: u64,
}

impl StepDefinition {
    fn new(id: &str, title: &str, description: &str, required: bool, cost: u64) -> Self {
        StepDefinition {
            id: StepId::new(id),
            title: title.to_string(),
            description: description.to_string(),
            required,
            cost,
        }
    }
}

/// Ordered collection of step definitions.
///
/// Invariant: non-empty with unique ids, enforced at construction.
#[derive(Debug, Clone)]
pub struct StepCatalog {
    steps: Vec<StepDefinition>,
}

impl StepCatalog {
    /// Build a catalog from explicit definitions
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self, CoreError> {
        if steps.is_empty() {
            return Err(CoreError::ConfigurationError(
                "step catalog must not be empty".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.clone()) {
                return Err(CoreError::ConfigurationError(format!(
                    "duplicate step id in catalog: {}",
                    step.id
                )));
            }
        }
        Ok(StepCatalog { steps })
    }

    /// The standard SolBrand branding sequence
    pub fn standard() -> Self {
        StepCatalog {
            steps: vec![
                StepDefinition::new(
                    "brandName",
                    "Brand Name",
                    "Generate creative brand names",
                    true,
                    1,
                ),
                StepDefinition::new("logo", "Logo Design", "Create visual identity", false, 5),
                StepDefinition::new(
                    "ideaValidation",
                    "Idea Validation",
                    "Score and validate concept",
                    false,
                    1,
                ),
                StepDefinition::new("typography", "Typography", "Choose perfect fonts", false, 1),
                StepDefinition::new(
                    "colorPalette",
                    "Color Palette",
                    "Generate brand colors",
                    false,
                    1,
                ),
                StepDefinition::new(
                    "pitchDeck",
                    "Pitch Deck",
                    "Build investor presentation",
                    false,
                    1,
                ),
                StepDefinition::new("summary", "Brand Summary", "Review and download", false, 0),
            ],
        }
    }

    /// All steps in declaration order
    pub fn list_steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Look up a step by id
    pub fn get_step(&self, id: &StepId) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| &step.id == id)
    }

    /// The entry step of the workflow
    pub fn first_step(&self) -> &StepDefinition {
        &self.steps[0]
    }

    /// The terminal step of the workflow
    pub fn terminal_step(&self) -> &StepDefinition {
        &self.steps[self.steps.len() - 1]
    }

    /// True when `id` names the entry step
    pub fn is_first(&self, id: &StepId) -> bool {
        &self.first_step().id == id
    }

    /// True when `id` names the terminal step
    pub fn is_terminal(&self, id: &StepId) -> bool {
        &self.terminal_step().id == id
    }

    /// Number of steps in the catalog
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: catalogs cannot be empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for StepCatalog {
    fn default() -> Self {
        StepCatalog::standard()
    }
}

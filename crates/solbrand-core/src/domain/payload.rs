//! Typed step payloads and their merge reducers.
//!
//! Each catalog step owns one payload variant, keyed by the step id on the
//! wire (`step` tag). Re-completing a step merges the incoming payload into
//! the stored one through the variant's reducer: required fields always take
//! the incoming value, optional fields take the incoming value when present,
//! and list fields take the incoming value when non-empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::catalog::StepId;
use crate::error::CoreError;

fn merge_opt(slot: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

fn merge_list<T>(slot: &mut Vec<T>, incoming: Vec<T>) {
    if !incoming.is_empty() {
        *slot = incoming;
    }
}

/// Output of the brand-name step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandNamePayload {
    /// The chosen name; unlocks every later step
    pub selected_name: String,
    /// What the business does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
    /// Industry or sector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Audience the brand targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    /// Core values stated by the founder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_values: Option<String>,
    /// Preferred naming style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_style: Option<String>,
    /// Keywords the name should evoke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Every generated suggestion, kept for later review
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_suggestions: Vec<Value>,
}

impl BrandNamePayload {
    fn merge(&mut self, incoming: Self) {
        self.selected_name = incoming.selected_name;
        merge_opt(&mut self.business_description, incoming.business_description);
        merge_opt(&mut self.industry, incoming.industry);
        merge_opt(&mut self.target_audience, incoming.target_audience);
        merge_opt(&mut self.core_values, incoming.core_values);
        merge_opt(&mut self.name_style, incoming.name_style);
        merge_opt(&mut self.keywords, incoming.keywords);
        merge_list(&mut self.all_suggestions, incoming.all_suggestions);
    }
}

/// Output of the logo step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoPayload {
    /// Identifier of the chosen logo concept
    pub selected_logo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_mood: Option<String>,
    /// Rendered logo image, base64-encoded by the producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl LogoPayload {
    fn merge(&mut self, incoming: Self) {
        self.selected_logo = incoming.selected_logo;
        merge_opt(&mut self.visual_style, incoming.visual_style);
        merge_opt(&mut self.icon_preference, incoming.icon_preference);
        merge_opt(&mut self.brand_mood, incoming.brand_mood);
        merge_opt(&mut self.image_data, incoming.image_data);
    }
}

/// Output of the idea-validation step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaValidationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniqueness: Option<String>,
    /// Scored validation criteria as produced by the validator
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_results: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
}

impl IdeaValidationPayload {
    fn merge(&mut self, incoming: Self) {
        merge_opt(&mut self.detailed_description, incoming.detailed_description);
        merge_opt(&mut self.target_market, incoming.target_market);
        merge_opt(&mut self.uniqueness, incoming.uniqueness);
        merge_list(&mut self.validation_results, incoming.validation_results);
        merge_list(&mut self.insights, incoming.insights);
    }
}

/// Output of the typography step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyPayload {
    /// Identifier of the chosen heading/body font pairing
    pub selected_font_pair: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_personality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_preferences: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_font_pairs: Vec<Value>,
}

impl TypographyPayload {
    fn merge(&mut self, incoming: Self) {
        self.selected_font_pair = incoming.selected_font_pair;
        merge_opt(&mut self.brand_personality, incoming.brand_personality);
        merge_opt(&mut self.font_preferences, incoming.font_preferences);
        merge_list(&mut self.all_font_pairs, incoming.all_font_pairs);
    }
}

/// Output of the color-palette step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPalettePayload {
    /// Identifier of the chosen palette
    pub selected_palette: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_emotions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_palettes: Vec<Value>,
}

impl ColorPalettePayload {
    fn merge(&mut self, incoming: Self) {
        self.selected_palette = incoming.selected_palette;
        merge_list(&mut self.selected_emotions, incoming.selected_emotions);
        merge_opt(&mut self.dominant_color, incoming.dominant_color);
        merge_list(&mut self.all_palettes, incoming.all_palettes);
    }
}

/// Output of the pitch-deck step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchDeckPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_advantage: Option<String>,
    /// Ordered slides of the generated deck
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pitch_deck_structure: Vec<Value>,
}

impl PitchDeckPayload {
    fn merge(&mut self, incoming: Self) {
        merge_opt(&mut self.business_summary, incoming.business_summary);
        merge_opt(&mut self.funding_target, incoming.funding_target);
        merge_opt(&mut self.team_info, incoming.team_info);
        merge_opt(&mut self.traction, incoming.traction);
        merge_opt(&mut self.market_size, incoming.market_size);
        merge_opt(&mut self.revenue_model, incoming.revenue_model);
        merge_opt(&mut self.competitive_advantage, incoming.competitive_advantage);
        merge_list(&mut self.pitch_deck_structure, incoming.pitch_deck_structure);
    }
}

/// Output of the terminal summary step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    /// Final brand summary text
    pub summary: String,
}

impl SummaryPayload {
    fn merge(&mut self, incoming: Self) {
        self.summary = incoming.summary;
    }
}

/// Step output payload, keyed by step id on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step")]
pub enum StepPayload {
    /// Brand-name step output
    #[serde(rename = "brandName")]
    BrandName(BrandNamePayload),
    /// Logo step output
    #[serde(rename = "logo")]
    Logo(LogoPayload),
    /// Idea-validation step output
    #[serde(rename = "ideaValidation")]
    IdeaValidation(IdeaValidationPayload),
    /// Typography step output
    #[serde(rename = "typography")]
    Typography(TypographyPayload),
    /// Color-palette step output
    #[serde(rename = "colorPalette")]
    ColorPalette(ColorPalettePayload),
    /// Pitch-deck step output
    #[serde(rename = "pitchDeck")]
    PitchDeck(PitchDeckPayload),
    /// Terminal summary output
    #[serde(rename = "summary")]
    Summary(SummaryPayload),
}

impl StepPayload {
    /// The catalog step this payload belongs to
    pub fn step_id(&self) -> StepId {
        let id = match self {
            StepPayload::BrandName(_) => "brandName",
            StepPayload::Logo(_) => "logo",
            StepPayload::IdeaValidation(_) => "ideaValidation",
            StepPayload::Typography(_) => "typography",
            StepPayload::ColorPalette(_) => "colorPalette",
            StepPayload::PitchDeck(_) => "pitchDeck",
            StepPayload::Summary(_) => "summary",
        };
        StepId::new(id)
    }

    /// Merge `incoming` into this payload through the variant's reducer.
    ///
    /// Fails when the variants disagree; the stored payload is untouched in
    /// that case.
    pub fn merge_from(&mut self, incoming: StepPayload) -> Result<(), CoreError> {
        match (self, incoming) {
            (StepPayload::BrandName(current), StepPayload::BrandName(incoming)) => {
                current.merge(incoming)
            }
            (StepPayload::Logo(current), StepPayload::Logo(incoming)) => current.merge(incoming),
            (StepPayload::IdeaValidation(current), StepPayload::IdeaValidation(incoming)) => {
                current.merge(incoming)
            }
            (StepPayload::Typography(current), StepPayload::Typography(incoming)) => {
                current.merge(incoming)
            }
            (StepPayload::ColorPalette(current), StepPayload::ColorPalette(incoming)) => {
                current.merge(incoming)
            }
            (StepPayload::PitchDeck(current), StepPayload::PitchDeck(incoming)) => {
                current.merge(incoming)
            }
            (StepPayload::Summary(current), StepPayload::Summary(incoming)) => {
                current.merge(incoming)
            }
            (current, incoming) => {
                return Err(CoreError::InvalidParameters(format!(
                    "payload for step {} cannot merge into output of step {}",
                    incoming.step_id(),
                    current.step_id()
                )))
            }
        }
        Ok(())
    }

    /// Brand-name view, used by the unlock predicate
    pub fn as_brand_name(&self) -> Option<&BrandNamePayload> {
        match self {
            StepPayload::BrandName(payload) => Some(payload),
            _ => None,
        }
    }
}

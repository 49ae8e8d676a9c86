//! Disease diagnosis payloads and the offline sample report.

use serde::{Deserialize, Serialize};

use crate::lang::Language;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How far the infection has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// Report structs
// ---------------------------------------------------------------------------

/// Free-text description of the disease, as returned by the AI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseDescription {
    pub cause: String,
    pub symptoms: String,
    pub impact: String,
    pub prevention: String,
}

/// The medicine the AI recommends for the diagnosed disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub name: String,
    /// Product category, e.g. `"Fungicide"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub dosage: String,
    pub application: String,
    /// Price in rupees (mock checkout only).
    pub price: f64,
    pub organic: bool,
}

/// Full diagnosis for one analysed leaf photo.
///
/// Field names follow the upstream JSON (`camelCase`) so the AI response
/// deserialises directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseReport {
    pub crop_name: String,
    pub disease_name: String,
    /// Model confidence in `[0, 1]`.
    pub accuracy: f64,
    pub severity: Severity,
    pub description: DiseaseDescription,
    pub recommended_medicine: Option<Medicine>,
}

// ---------------------------------------------------------------------------
// Spray advisory
// ---------------------------------------------------------------------------

/// Growth stage the spray advisory is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropStage {
    Initial,
    Growth,
    Flowering,
}

impl CropStage {
    pub fn label(&self) -> &'static str {
        match self {
            CropStage::Initial => "Initial",
            CropStage::Growth => "Growth",
            CropStage::Flowering => "Flowering",
        }
    }
}

/// Fallback product photo used when the AI returns a non-HTTP image URL.
const SPRAY_IMAGE_FALLBACK: &str =
    "https://images.unsplash.com/photo-1589923158776-cb4485d99fd6?auto=format&fit=crop&q=80&w=400";

/// One recommended spray for a crop/stage combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprayRecommendation {
    /// Product name, always in English.
    pub name: String,
    /// What the spray treats or prevents, in the user's language.
    pub use_for: String,
    /// Application tip, in the user's language.
    pub tip: String,
    pub dosage: String,
    pub image_url: String,
}

impl SprayRecommendation {
    /// Replace a missing or non-HTTP image URL with the stock photo.
    pub fn normalise_image(&mut self) {
        if !self.image_url.starts_with("http") {
            self.image_url = SPRAY_IMAGE_FALLBACK.to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// sample_report
// ---------------------------------------------------------------------------

/// Canned Tomato / Early Blight report — the "try sample" escape hatch shown
/// when the service is throttled or offline.  Crop and disease names are
/// localised; the agronomy text stays in English.
pub fn sample_report(language: Language) -> DiseaseReport {
    let (crop_name, disease_name) = match language {
        Language::Marathi => ("टोमॅटो", "अर्ली ब्लाइट"),
        Language::Hindi => ("टमाटर", "अर्ली ब्लाइट"),
        Language::English => ("Tomato", "Early Blight"),
    };

    DiseaseReport {
        crop_name: crop_name.to_string(),
        disease_name: disease_name.to_string(),
        accuracy: 0.98,
        severity: Severity::Medium,
        description: DiseaseDescription {
            cause: "Alternaria solani fungus".into(),
            symptoms: "Target-shaped brown spots on leaves".into(),
            impact: "Reduces yield and quality of fruit".into(),
            prevention: "Rotate crops and use drip irrigation".into(),
        },
        recommended_medicine: Some(Medicine {
            name: "Mancozeb 75% WP".into(),
            kind: "Fungicide".into(),
            dosage: "30g per 15L water".into(),
            application: "Foliar Spray".into(),
            price: 450.0,
            organic: false,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

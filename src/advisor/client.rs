//! Guarded non-voice AI calls: expert chat, leaf-photo analysis, the spray
//! advisory, and the village lookup.
//!
//! Unlike the voice path, these calls do **not** fall back silently —
//! quota and upstream errors propagate as typed [`GuardError`]s so the UI
//! can show a cooldown timer and the "try sample" escape hatch.

use std::sync::Arc;

use thiserror::Error;

use crate::advisor::report::{CropStage, DiseaseReport, SprayRecommendation};
use crate::config::SynthConfig;
use crate::lang::Language;
use crate::quota::{GuardError, QuotaBreaker};

// ---------------------------------------------------------------------------
// AdvisorError (internal; surfaces through GuardError)
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
enum AdvisorError {
    #[error("advisory request failed: {0}")]
    Request(String),

    #[error("failed to parse advisory response: {0}")]
    Parse(String),

    #[error("advisory returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AdvisorError {
    fn from(e: reqwest::Error) -> Self {
        AdvisorError::Request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A village or taluka returned by the location lookup.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub name: String,
    pub district: String,
    /// Map link, when the lookup can provide one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

// ---------------------------------------------------------------------------
// ChatContext
// ---------------------------------------------------------------------------

/// Optional crop/disease context carried into the expert chat so answers
/// stay on topic after a scan.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub crop_name: Option<String>,
    pub disease_name: Option<String>,
}

// ---------------------------------------------------------------------------
// AdvisorClient
// ---------------------------------------------------------------------------

/// HTTP client for the non-voice AI capabilities, sharing the same
/// [`QuotaBreaker`] as the voice path — one throttled call opens the
/// breaker for everything.
pub struct AdvisorClient {
    client: reqwest::Client,
    config: SynthConfig,
    breaker: Arc<QuotaBreaker>,
}

impl AdvisorClient {
    pub fn from_config(config: &SynthConfig, breaker: Arc<QuotaBreaker>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            breaker,
        }
    }

    /// Ask the expert assistant a question, replying in `language`.
    pub async fn chat(
        &self,
        message: &str,
        language: Language,
        context: &ChatContext,
    ) -> Result<String, GuardError> {
        let mut system = format!(
            "You are an expert agricultural assistant for AgroAI Pro. \
             Always reply in {}. \
             Keep advice practical, simple, and safe for farmers.",
            language.label()
        );
        if let Some(crop) = &context.crop_name {
            system.push_str(&format!(" Current crop: {crop}."));
        }
        if let Some(disease) = &context.disease_name {
            system.push_str(&format!(" Detected disease: {disease}."));
        }

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": message }] }],
            "systemInstruction": { "parts": [{ "text": system }] },
            "generationConfig": { "temperature": 0.7 }
        });

        self.breaker
            .guard(|| async {
                let text = self.generate(&body).await?;
                Ok::<_, AdvisorError>(text)
            })
            .await
    }

    /// Diagnose a leaf photo (base64 JPEG) and recommend a medicine.
    pub async fn analyze_leaf(&self, jpeg_base64: &str) -> Result<DiseaseReport, GuardError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [
                { "inlineData": { "mimeType": "image/jpeg", "data": jpeg_base64 } },
                { "text": "Identify plant disease AND recommend medicine. \
                           Return JSON only: { cropName, diseaseName, accuracy, severity, \
                           description: {cause, symptoms, impact, prevention}, \
                           recommendedMedicine: {name, type, dosage, application, price, organic} }" }
            ] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        self.breaker
            .guard(|| async {
                let text = self.generate(&body).await?;
                serde_json::from_str::<DiseaseReport>(text.trim())
                    .map_err(|e| AdvisorError::Parse(e.to_string()))
            })
            .await
    }

    /// Suggest up to five real villages or talukas matching `query`, for the
    /// profile's location picker.
    pub async fn village_suggestions(&self, query: &str) -> Result<Vec<Location>, GuardError> {
        let prompt = format!(
            "List 5 real villages or talukas in Maharashtra that match or are near \"{query}\". \
             Return as JSON array of objects with 'name' and 'district' properties."
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        self.breaker
            .guard(|| async {
                let text = self.generate(&body).await?;
                serde_json::from_str::<Vec<Location>>(text.trim())
                    .map_err(|e| AdvisorError::Parse(e.to_string()))
            })
            .await
    }

    /// Recommend one spray for `crop` at `stage`, preventive unless a
    /// `disease` was previously detected.  `useFor` and `tip` come back in
    /// `language`.
    pub async fn spray_advisory(
        &self,
        crop: &str,
        stage: CropStage,
        language: Language,
        disease: Option<&str>,
    ) -> Result<SprayRecommendation, GuardError> {
        let context = match disease {
            Some(d) => format!("Previously detected disease: {d}."),
            None => "Preventive spray advisory.".to_string(),
        };
        // The date anchors the advice to the current season.
        let today = chrono::Local::now().format("%a %b %d %Y");
        let prompt = format!(
            "Recommend one best chemical or organic spray for {crop} at the {} stage \
             for today ({today}). {context} \
             Return JSON only: {{ name (English), useFor, tip, dosage, imageUrl }}. \
             Use {} for 'useFor' and 'tip'.",
            stage.label(),
            language.label()
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let mut rec = self
            .breaker
            .guard(|| async {
                let text = self.generate(&body).await?;
                serde_json::from_str::<SprayRecommendation>(text.trim())
                    .map_err(|e| AdvisorError::Parse(e.to_string()))
            })
            .await?;
        rec.normalise_image();
        Ok(rec)
    }

    /// Send one `generateContent` request and extract the text part.
    async fn generate(&self, body: &serde_json::Value) -> Result<String, AdvisorError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.chat_model
        );

        let mut req = self.client.post(&url).json(body);
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.header("x-goog-api-key", key);
        }

        let response = req.send().await?;

        // Status line stays in the error text for breaker classification.
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Request(format!("HTTP {status}: {detail}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdvisorError::Parse(e.to_string()))?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(AdvisorError::EmptyResponse)?
            .to_string();

        if text.is_empty() {
            return Err(AdvisorError::EmptyResponse);
        }

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Non-voice AI advisory calls — expert chat, leaf-photo diagnosis, spray
//! advisory, village lookup, and the offline sample report.
//!
//! All network calls share the voice path's [`crate::quota::QuotaBreaker`],
//! but unlike voice they propagate quota errors as typed values: the UI
//! shows a cooldown timer and offers [`sample_report`] as the offline
//! escape hatch instead of silently degrading.

pub mod client;
pub mod report;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{AdvisorClient, ChatContext, Location};
pub use report::{
    sample_report, CropStage, DiseaseDescription, DiseaseReport, Medicine, Severity,
    SprayRecommendation,
};

use serde::{Deserialize, Serialize};

use crate::profile::CurrencyProfile;

pub const SYMBOL_WEIGHT: u32 = 2;
pub const KEYWORD_WEIGHT: u32 = 3;
pub const DENOMINATION_WEIGHT: u32 = 2;

/// A profile qualifies only when its confidence is strictly above this.
pub const CONFIDENCE_THRESHOLD: f64 = 30.0;

/// A positive currency judgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub currency: String,
    pub denomination: String,
    /// Heuristic percentage. Not clamped: strong matches exceed 100.
    pub confidence: f64,
}

/// How a single profile scored against normalized text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileScore {
    pub currency: String,
    pub score: u32,
    /// Last matching denomination token in declaration order.
    pub denomination: Option<String>,
    pub confidence: f64,
}

impl ProfileScore {
    pub fn qualifies(&self) -> bool {
        self.denomination.is_some() && meets_threshold(self.confidence)
    }
}

pub fn meets_threshold(confidence: f64) -> bool {
    confidence > CONFIDENCE_THRESHOLD
}

/// Score one profile against text that is already upper-cased.
pub fn score_profile(normalized: &str, profile: &CurrencyProfile) -> ProfileScore {
    let mut score = 0;
    let mut denomination = None;

    for symbol in &profile.symbols {
        if normalized.contains(symbol.as_str()) {
            score += SYMBOL_WEIGHT;
        }
    }
    for keyword in &profile.keywords {
        if normalized.contains(keyword.as_str()) {
            score += KEYWORD_WEIGHT;
        }
    }
    for token in &profile.denominations {
        if normalized.contains(token.as_str()) {
            score += DENOMINATION_WEIGHT;
            denomination = Some(token.clone());
        }
    }

    let confidence = f64::from(score) / profile.weight_base() as f64 * 100.0;

    ProfileScore {
        currency: profile.code.clone(),
        score,
        denomination,
        confidence,
    }
}

/// Decide whether OCR text reads as a known currency note.
///
/// Profiles are tried in slice order and the first one that qualifies wins;
/// later profiles are never scored, even if they would score higher.
/// `None` means nothing crossed the threshold with a denomination.
pub fn classify(text: &str, profiles: &[CurrencyProfile]) -> Option<ClassificationResult> {
    if text.is_empty() {
        return None;
    }
    let normalized = text.to_uppercase();

    for profile in profiles {
        let scored = score_profile(&normalized, profile);
        tracing::debug!(
            currency = %scored.currency,
            score = scored.score,
            confidence = scored.confidence,
            denomination = scored.denomination.as_deref().unwrap_or(""),
            "scored currency profile"
        );
        if scored.qualifies() {
            return scored.denomination.map(|denomination| ClassificationResult {
                currency: scored.currency,
                denomination,
                confidence: scored.confidence,
            });
        }
    }
    None
}

/// Every profile's score, in table order. Used for `--explain` output.
pub fn explain(text: &str, profiles: &[CurrencyProfile]) -> Vec<ProfileScore> {
    let normalized = text.to_uppercase();
    profiles.iter().map(|p| score_profile(&normalized, p)).collect()
}

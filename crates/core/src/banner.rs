//! Banner bias rules and banner validation.

use serde::{Deserialize, Serialize};

use crate::error::GachaError;

/// Upper bound on the reroll probability, whatever the bonus.
pub const MAX_REROLL_CHANCE: f64 = 0.95;

/// Maximum length of a banner name.
const MAX_NAME_LEN: usize = 100;

/// Maximum number of focus labels on one banner.
const MAX_FOCUS_LABELS: usize = 25;

/// The bias a banner applies to candidate drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerBias {
    /// Lowercased group-label substrings to favor.
    focus_labels: Vec<String>,
    bonus_percent: i32,
}

impl BannerBias {
    pub fn new<I, S>(focus_labels: I, bonus_percent: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let focus_labels = focus_labels
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            focus_labels,
            bonus_percent,
        }
    }

    pub fn focus_labels(&self) -> &[String] {
        &self.focus_labels
    }

    pub fn bonus_percent(&self) -> i32 {
        self.bonus_percent
    }

    /// Case-insensitive substring match of `group` against any focus label.
    pub fn matches(&self, group: &str) -> bool {
        let group = group.to_lowercase();
        self.focus_labels.iter().any(|label| group.contains(label.as_str()))
    }

    /// Probability of discarding a non-matching candidate.
    pub fn reroll_chance(&self) -> f64 {
        (f64::from(self.bonus_percent) / 100.0).clamp(0.0, MAX_REROLL_CHANCE)
    }
}

/// Split a `;`- or `,`-separated filter string into trimmed labels.
pub fn parse_focus_labels(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a banner definition before it is stored.
pub fn validate_banner(name: &str, focus_labels: &[String], bonus_percent: i32) -> Result<(), GachaError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GachaError::Validation(
            "Banner name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(GachaError::Validation(format!(
            "Banner name must not exceed {MAX_NAME_LEN} characters"
        )));
    }
    if focus_labels.iter().all(|l| l.trim().is_empty()) {
        return Err(GachaError::Validation(
            "Banner needs at least one focus label".to_string(),
        ));
    }
    if focus_labels.len() > MAX_FOCUS_LABELS {
        return Err(GachaError::Validation(format!(
            "A banner may have at most {MAX_FOCUS_LABELS} focus labels"
        )));
    }
    if !(0..=100).contains(&bonus_percent) {
        return Err(GachaError::Validation(format!(
            "Bonus percent must be within 0..=100, got {bonus_percent}"
        )));
    }
    Ok(())
}

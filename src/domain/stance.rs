use std::fmt;

pub const UNKNOWN_LABEL: &str = "Unbekannt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stance {
    Agreement,
    Contradiction,
    Neutrality,
    Unknown,
}

impl Stance {
    pub fn label(self) -> &'static str {
        match self {
            Stance::Agreement => "Zustimmung",
            Stance::Contradiction => "Widerspruch",
            Stance::Neutrality => "Neutralität",
            Stance::Unknown => UNKNOWN_LABEL,
        }
    }

    /// Classifies a free-form answer line. Anything outside the three allowed
    /// polarities is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_lowercase();
        match normalized.as_str() {
            "zustimmung" | "agreement" => Stance::Agreement,
            "widerspruch" | "contradiction" => Stance::Contradiction,
            "neutralität" | "neutralitaet" | "neutral" | "neutrality" => Stance::Neutrality,
            _ => Stance::Unknown,
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parsed answer of one stance prompt. `label` keeps the model's wording,
/// `stance` is its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanceResult {
    pub label: String,
    pub stance: Stance,
    pub rationale: String,
}

impl StanceResult {
    pub fn new(label: impl Into<String>, rationale: impl Into<String>) -> Self {
        let label = label.into();
        let stance = Stance::from_label(&label);
        Self {
            label,
            stance,
            rationale: rationale.into(),
        }
    }

    pub fn unknown(rationale: impl Into<String>) -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            stance: Stance::Unknown,
            rationale: rationale.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_stances() {
        assert_eq!(Stance::from_label("Zustimmung"), Stance::Agreement);
        assert_eq!(Stance::from_label(" widerspruch."), Stance::Contradiction);
        assert_eq!(Stance::from_label("Neutralität"), Stance::Neutrality);
        assert_eq!(Stance::from_label("Agreement"), Stance::Agreement);
        assert_eq!(Stance::from_label("Vielleicht"), Stance::Unknown);
        assert_eq!(Stance::from_label(""), Stance::Unknown);
    }

    #[test]
    fn result_keeps_model_wording() {
        let result = StanceResult::new("Zustimmung.", "weil X");
        assert_eq!(result.label, "Zustimmung.");
        assert_eq!(result.stance, Stance::Agreement);

        let unknown = StanceResult::unknown("irgendwas");
        assert_eq!(unknown.label, "Unbekannt");
        assert_eq!(unknown.stance, Stance::Unknown);
    }
}

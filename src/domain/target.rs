use super::ContributionId;
use anyhow::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Targets per contribution, in the order the model listed them.
pub type TargetMap = BTreeMap<ContributionId, Vec<Target>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetCategory {
    Problem,
    Praise,
    Suggestion,
}

impl TargetCategory {
    pub fn label(self) -> &'static str {
        match self {
            TargetCategory::Problem => "Problem",
            TargetCategory::Praise => "Lob",
            TargetCategory::Suggestion => "Vorschlag",
        }
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TargetCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let category = match normalized.as_str() {
            "problem" | "probleme" | "issue" => TargetCategory::Problem,
            "lob" | "praise" => TargetCategory::Praise,
            "vorschlag" | "vorschläge" | "suggestion" => TargetCategory::Suggestion,
            _ => anyhow::bail!("unbekannte Kategorie: {}", s),
        };
        Ok(category)
    }
}

/// A core statement of a contribution, exactly as the model wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

impl Target {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Category named by the trailing `(Problem)`, `(Lob)` or `(Vorschlag)` tag.
    pub fn category(&self) -> Option<TargetCategory> {
        static TAG: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\(\s*([^()]+?)\s*\)[\s.:]*$").unwrap());
        let captures = TAG.captures(&self.0)?;
        captures.get(1)?.as_str().parse().ok()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_comes_from_trailing_tag() {
        assert_eq!(
            Target::from("1. Aufwertung des Erdkampsweg (Lob)").category(),
            Some(TargetCategory::Praise)
        );
        assert_eq!(
            Target::from("2. Parkraum kreuzt Fußwege (problem).").category(),
            Some(TargetCategory::Problem)
        );
        assert_eq!(
            Target::from("3. Verkehrsberuhigung ( Vorschlag )").category(),
            Some(TargetCategory::Suggestion)
        );
    }

    #[test]
    fn untagged_or_unknown_tags_have_no_category() {
        assert_eq!(Target::from("Hauptaussage ohne Kategorie").category(), None);
        assert_eq!(Target::from("Radwege (Frage)").category(), None);
        assert_eq!(Target::from("(Lob) steht am Anfang").category(), None);
    }
}

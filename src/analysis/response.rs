use super::prompt::{STANCE_MARKER, TARGET_MARKER};
use crate::domain::{StanceResult, Target};

/// Targets are the non-empty lines after the last `Hauptaussagen:` marker,
/// taken verbatim apart from surrounding whitespace.
pub fn parse_targets(generated_text: &str) -> Vec<Target> {
    let answer = generated_text
        .trim()
        .rsplit(TARGET_MARKER)
        .next()
        .unwrap_or_default();
    answer
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Target::from)
        .collect()
}

/// The first line after the last `Polarität:` marker is the label, the rest
/// is the rationale. Without a marker the whole text becomes the rationale of
/// an unknown stance.
pub fn parse_stance(generated_text: &str) -> StanceResult {
    let text = generated_text.trim();
    let Some(index) = text.rfind(STANCE_MARKER) else {
        return StanceResult::unknown(text);
    };
    let answer = text[index + STANCE_MARKER.len()..].trim();
    match answer.split_once('\n') {
        Some((label, rationale)) => StanceResult::new(label.trim(), rationale.trim()),
        None => StanceResult::new(answer, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stance;

    #[test]
    fn targets_follow_last_marker() {
        let targets = parse_targets("Hauptaussagen:\n1. A\n2. B");
        assert_eq!(targets, vec![Target::from("1. A"), Target::from("2. B")]);

        let echoed = "Beispiel\nHauptaussagen:\n1. alt\n[INST]\nHauptaussagen:\n\n  1. neu (Lob)  \n\n2. auch neu\n";
        let targets = parse_targets(echoed);
        assert_eq!(
            targets,
            vec![Target::from("1. neu (Lob)"), Target::from("2. auch neu")]
        );
    }

    #[test]
    fn targets_without_marker_use_whole_text() {
        let targets = parse_targets("- Lärm\n- Parkplätze");
        assert_eq!(targets.len(), 2);
        assert!(parse_targets("Hauptaussagen:\n   \n").is_empty());
    }

    #[test]
    fn stance_with_rationale() {
        let result = parse_stance("... Polarität:\nZustimmung\nweil X");
        assert_eq!(result.label, "Zustimmung");
        assert_eq!(result.stance, Stance::Agreement);
        assert_eq!(result.rationale, "weil X");
    }

    #[test]
    fn stance_uses_last_marker() {
        let text = "Polarität:\nWiderspruch\n[INST] ... Polarität:\n Neutralität \n";
        let result = parse_stance(text);
        assert_eq!(result.label, "Neutralität");
        assert_eq!(result.stance, Stance::Neutrality);
        assert_eq!(result.rationale, "");
    }

    #[test]
    fn stance_without_marker_is_unknown() {
        let text = "Der Kommentar passt nicht.";
        let result = parse_stance(text);
        assert_eq!(result.label, "Unbekannt");
        assert_eq!(result.stance, Stance::Unknown);
        assert_eq!(result.rationale, text);
    }

    #[test]
    fn multi_line_rationale_is_kept() {
        let result = parse_stance("Polarität: Widerspruch\nGrund 1\nGrund 2");
        assert_eq!(result.label, "Widerspruch");
        assert_eq!(result.rationale, "Grund 1\nGrund 2");
    }
}

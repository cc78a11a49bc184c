use crate::domain::{CommentId, ContributionId, Target, TargetMap};
use crate::ingestion::{Contributions, JoinedData};

pub const TARGET_MARKER: &str = "Hauptaussagen:";
pub const STANCE_MARKER: &str = "Polarität:";

const TARGET_SYSTEM: &str = r#"<s>[INST] <<SYS>>
Du bist ein hilfreicher, respektvoller und ehrlicher Assistent eines Stadtplaners.
Deine Aufgabe ist es, aus Beiträgen die enthaltenen Hauptaussagen herauszuarbeiten.
Fasse die Hauptaussagen auf Deutsch und stichpunktartig zusammen.
Stelle sicher, dass jede Hauptaussage entweder ein Problem, ein Lob oder ein Vorschlag ist.
Es sind ausschließlich diese Kategorien zulässig. Andere Kategorien sollen nicht ausgegeben werden.
Die Hauptaussagen sollen als nummerierte Liste ausgegeben werden.

Definitionen:
- Problem: Eine negative Beobachtung, ein Hindernis oder eine Gefahr, das bzw. die angesprochen wird.
- Lob: Positive Rückmeldung oder Anerkennung für etwas, das gut funktioniert.
- Vorschlag: Vorschläge oder Ideen zur Verbesserung einer Situation.
<</SYS>>
"#;

const TARGET_EXAMPLES: &str = r#"
Ermittle die Hauptaussagen des folgenden Beitrages.
Beitrag:
Der Erdkampsweg ist zwischen Ratsmühlendamm und Wacholderstraße das gewerbliche Zentrum von Fuhlsbüttel. In den letzten Jahren wurde viel erreicht durch neue Aufpflasterungen, Bänke und zaghafte Schritte zur Verkehrsberuhigung.
Bei Neubauten wie zuletzt dem ReweCity wird leider immer noch Parkraum geschaffen, der die Fußwege kreuzt. Ein verkehrsberuhigtes, fußgänger- und radfahrerfreundliches Fuhlsbüttel könnte die Lebensqualität noch einmal erhöhen.
[/INST]
Hauptaussagen:
1. Aufwertung des Erdkampsweg (Lob)
2. Parkraum bei Neubauten kreuzt Fußwege (Problem)
3. Verkehrsberuhigung (Vorschlag)
"#;

const TARGET_TASK: &str = r#"
[INST]
Ermittle die Hauptaussagen des folgenden Beitrages.
Beitrag:
{contribution}
[/INST]
Hauptaussagen:
"#;

const STANCE_SYSTEM: &str = r#"<s>[INST] <<SYS>>
Du bist ein hilfreicher, respektvoller und ehrlicher Assistent eines Stadtplaners.
Deine Aufgabe ist es zu bewerten, wie ein Kommentar sich zu einer Hauptaussage positioniert.
Gib diese Polarität auf Deutsch wieder.
Stelle sicher, dass jede Polarität entweder Zustimmung, Widerspruch oder Neutralität ist.
Es sind ausschließlich diese Polaritäten zulässig. Andere Polaritäten sollen nicht ausgegeben werden.
Gib ausschließlich die Polarität aus. Andere Ergebnisse sollen nicht ausgegeben werden.

Definitionen:
- Zustimmung: Der Kommentar stimmt der Hauptaussage zu oder zeigt eine positive Reaktion auf den Inhalt der Hauptaussage. Das Problem, das Lob oder der Vorschlag wird befürwortet.
- Widerspruch: Der Kommentar widerspricht der Hauptaussage oder zeigt eine negative Reaktion auf den Inhalt der Hauptaussage. Das Problem, das Lob oder der Vorschlag wird abgelehnt.
- Neutralität: Der Kommentar thematisiert die Hauptaussage nicht und stellt keinen Bezug zu ihr her.
<</SYS>>
"#;

const STANCE_EXAMPLES: &str = r#"
Klassifiziere, ob der folgende Kommentar der folgenden Hauptaussage zustimmt, widerspricht oder neutral gegenüber ist.
Hauptaussage:
- Gehwege in schlechtem Zustand (Problem)
Kommentar:
- Einige Gehwege sind in schlechtem Zustand mit Stolperfallen durch Unebenheiten und teilweise abschüssig und sollten dringend saniert werden.
[/INST]
Polarität:
Zustimmung
[INST]
Klassifiziere, ob der folgende Kommentar der folgenden Hauptaussage zustimmt, widerspricht oder neutral gegenüber ist.
Hauptaussage:
- Lärmbelästigung durch Feuerwehreinsätze (Problem)
Kommentar:
- Die Feuerwehr fährt mit Sicherheit nicht mega schnell - man sollte froh sein, dass diese schnell zum Einsatzort fahren kann und die „Lärmbelästigung „ ist auch nicht wirklich gegeben da oft - gerade in der Nacht - auf das Martinshorn verzichtet wird !
[/INST]
Polarität:
Widerspruch
[INST]
Klassifiziere, ob der folgende Kommentar der folgenden Hauptaussage zustimmt, widerspricht oder neutral gegenüber ist.
Hauptaussage:
- Fehlende Parkmöglichkeit für Lastenräder und mit Verankerung (Problem)
Kommentar:
- Mich stören schon E-Roller. Bitte keine klobigen Drahtesel überall im Stadtbild.
[/INST]
Polarität:
Neutralität
"#;

const STANCE_TASK: &str = r#"
[INST]
Klassifiziere, ob der folgende Kommentar der folgenden Hauptaussage zustimmt, widerspricht oder neutral gegenüber ist.
Hauptaussage:
- {target}
Kommentar:
- {comment}
[/INST]
Polarität:
"#;

/// Fixed instructions, worked examples and a per-item task with
/// `{placeholder}` slots.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub system: String,
    pub examples: String,
    pub task: String,
}

impl PromptTemplate {
    pub fn target_identification() -> Self {
        Self {
            system: TARGET_SYSTEM.to_string(),
            examples: TARGET_EXAMPLES.to_string(),
            task: TARGET_TASK.to_string(),
        }
    }

    pub fn stance_detection() -> Self {
        Self {
            system: STANCE_SYSTEM.to_string(),
            examples: STANCE_EXAMPLES.to_string(),
            task: STANCE_TASK.to_string(),
        }
    }

    pub fn render(&self, values: &[(&str, &str)]) -> String {
        format!(
            "{}{}{}",
            self.system,
            self.examples,
            fill_placeholders(&self.task, values)
        )
    }
}

/// Substitutes `{name}` slots in one pass, so inserted text is never scanned
/// for further placeholders.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find(|(name, _)| {
            tail.len() > name.len() + 1
                && tail[1..].starts_with(name)
                && tail[1 + name.len()..].starts_with('}')
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// One (target, comment) pair with its rendered stance prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StancePrompt {
    pub contribution_id: ContributionId,
    pub target: Target,
    pub comment_id: CommentId,
    pub comment_text: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    targets: PromptTemplate,
    stance: PromptTemplate,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(
            PromptTemplate::target_identification(),
            PromptTemplate::stance_detection(),
        )
    }
}

impl PromptBuilder {
    pub fn new(targets: PromptTemplate, stance: PromptTemplate) -> Self {
        Self { targets, stance }
    }

    pub fn target_prompt(&self, contribution: &str) -> String {
        self.targets.render(&[("contribution", contribution)])
    }

    pub fn stance_prompt(&self, target: &Target, comment: &str) -> String {
        self.stance
            .render(&[("target", target.text()), ("comment", comment)])
    }

    pub fn target_prompts(&self, contributions: &Contributions) -> Vec<(ContributionId, String)> {
        contributions
            .iter()
            .map(|(id, text)| (id.clone(), self.target_prompt(text)))
            .collect()
    }

    /// One prompt per (target, comment) of the same contribution, ordered by
    /// contribution, then target, then comment. Contributions missing from
    /// `joined` have no comments and yield nothing.
    pub fn stance_prompts(&self, targets: &TargetMap, joined: &JoinedData) -> Vec<StancePrompt> {
        let mut prompts = Vec::new();
        for (contribution_id, contribution_targets) in targets {
            let Some(entry) = joined.get(contribution_id) else {
                continue;
            };
            for target in contribution_targets {
                for (comment_id, comment_text) in &entry.comments {
                    prompts.push(StancePrompt {
                        contribution_id: contribution_id.clone(),
                        target: target.clone(),
                        comment_id: comment_id.clone(),
                        comment_text: comment_text.clone(),
                        prompt: self.stance_prompt(target, comment_text),
                    });
                }
            }
        }
        prompts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::JoinedEntry;

    #[test]
    fn target_prompt_ends_with_marker_after_contribution() {
        let prompt = PromptBuilder::default().target_prompt("Mehr Bäume am Marktplatz");
        assert!(prompt.starts_with("<s>[INST] <<SYS>>"));
        let contribution_at = prompt.find("Mehr Bäume am Marktplatz").unwrap();
        let last_marker = prompt.rfind(TARGET_MARKER).unwrap();
        assert!(contribution_at < last_marker);
        assert!(prompt.trim_end().ends_with(TARGET_MARKER));
    }

    #[test]
    fn stance_prompt_contains_pair_and_ends_with_marker() {
        let prompt = PromptBuilder::default()
            .stance_prompt(&Target::from("1. Tempo 30 (Vorschlag)"), "Unbedingt!");
        assert!(prompt.contains("- 1. Tempo 30 (Vorschlag)\nKommentar:\n- Unbedingt!"));
        assert!(prompt.trim_end().ends_with(STANCE_MARKER));
        assert_eq!(prompt.matches(STANCE_MARKER).count(), 4);
    }

    #[test]
    fn placeholders_inside_values_are_left_alone() {
        let filled = fill_placeholders(
            "{target} / {comment} {unknown}",
            &[("target", "{comment}"), ("comment", "x")],
        );
        assert_eq!(filled, "{comment} / x {unknown}");
    }

    #[test]
    fn stance_prompts_pair_every_target_with_every_comment() {
        let mut targets = TargetMap::new();
        targets.insert(
            ContributionId::Numeric(1),
            vec![Target::from("A"), Target::from("B")],
        );
        targets.insert(ContributionId::Numeric(2), vec![Target::from("C")]);

        let mut joined = JoinedData::new();
        joined.insert(
            ContributionId::Numeric(1),
            JoinedEntry {
                contribution_text: "Beitrag".into(),
                comments: vec![
                    (CommentId::from("k1"), "eins".into()),
                    (CommentId::from("k2"), "zwei".into()),
                ],
            },
        );

        let prompts = PromptBuilder::default().stance_prompts(&targets, &joined);
        let pairs: Vec<(String, String)> = prompts
            .iter()
            .map(|p| (p.target.to_string(), p.comment_id.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "k1".to_string()),
                ("A".to_string(), "k2".to_string()),
                ("B".to_string(), "k1".to_string()),
                ("B".to_string(), "k2".to_string()),
            ]
        );
        assert!(prompts[3].prompt.contains("- B\nKommentar:\n- zwei"));
    }
}

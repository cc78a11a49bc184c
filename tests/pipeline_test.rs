use stance::analysis::{MockTextGenerator, StanceDetectionPipeline};
use stance::config::{GenerationParams, OutputConfig};
use stance::export::{read_stances, read_targets};
use stance::ingestion::{join_contributions_comments, CommentLoader, ContributionLoader};
use stance::ContributionId;
use std::fs;
use std::sync::Arc;

const CONTRIBUTIONS: &str = "contribution_id;contribution_content
12;Der Radweg an der Alster ist zu schmal.
7;Toller neuer Spielplatz!
30;Niemand hat hierzu etwas gesagt.
";

const COMMENTS: &str = r#"[
    {"c-1": {"related_node_id": "12", "text": "Stimmt, da wird es oft eng &amp; gef&auml;hrlich."}},
    {"c-2": {"related_node_id": "7", "text": "Finde ich auch."}},
    null,
    {"c-3": {"related_node_id": "999", "text": "Gehört nirgendwohin."}},
    {"c-4": {"related_node_id": 12, "text": "Breiter geht nicht."}}
]"#;

#[test]
fn batch_run_from_files_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let contributions_path = dir.path().join("beitraege.csv");
    let comments_path = dir.path().join("kommentare.json");
    fs::write(&contributions_path, CONTRIBUTIONS).unwrap();
    fs::write(&comments_path, COMMENTS).unwrap();

    let contributions = ContributionLoader::load_from_path(&contributions_path).unwrap();
    let comments = CommentLoader::load_from_path(&comments_path).unwrap();
    let joined = join_contributions_comments(&contributions, &comments);

    assert_eq!(contributions.len(), 3);
    assert_eq!(joined.len(), 2);
    assert!(!joined.contains_key(&ContributionId::Numeric(30)));
    assert!(joined
        .values()
        .flat_map(|entry| entry.comments.iter())
        .all(|(id, _)| id.as_str() != "c-3"));

    // Target prompts run in id order: 7, 12, 30.
    let mock = MockTextGenerator::default();
    mock.push_response("\n1. Neuer Spielplatz (Lob)");
    mock.push_response("\n1. Radweg zu schmal (Problem)\n2. Radweg verbreitern (Vorschlag)");
    mock.push_response("\n1. Keine Aussage (Problem)");
    // Stance prompts: contribution 7 x c-2, then contribution 12 targets x (c-1, c-4).
    mock.push_response("\nZustimmung");
    mock.push_response("\nZustimmung\nbestätigt die Enge");
    mock.push_response("\nWiderspruch\nhält es für unmöglich");
    mock.push_response("\nNeutralität");
    mock.push_response("Das Modell hat sich verlaufen.");

    let output = OutputConfig::default()
        .with_targets_path(dir.path().join("Targets.csv"))
        .with_stance_path(dir.path().join("Stance.csv"));
    let pipeline = StanceDetectionPipeline::new(Arc::new(mock.clone()), GenerationParams::default());
    let summary = pipeline.run(&contributions, &joined, &output).unwrap();

    assert_eq!(summary.contributions, 3);
    assert_eq!(summary.targets, 4);
    assert_eq!(summary.stance_rows, 5);
    assert_eq!(mock.prompts().len(), 8);

    let targets = read_targets(&output.targets_path).unwrap();
    assert_eq!(targets.len(), 3);
    assert_eq!(targets[1].contribution_id, "12");
    assert_eq!(targets[1].contribution_text, "Der Radweg an der Alster ist zu schmal.");
    assert_eq!(
        targets[1].target_list(),
        vec!["1. Radweg zu schmal (Problem)", "2. Radweg verbreitern (Vorschlag)"]
    );

    let stances = read_stances(&output.stance_path).unwrap();
    assert_eq!(stances.len(), 5);
    assert_eq!(stances[0].contribution_id, "7");
    assert_eq!(stances[0].comment_id, "c-2");
    assert_eq!(stances[1].comment_text, "Stimmt, da wird es oft eng & gefährlich.");
    assert_eq!(stances[1].rationale, "bestätigt die Enge");
    assert_eq!(stances[2].comment_id, "c-4");
    assert_eq!(stances[2].stance, "Widerspruch");
    assert_eq!(stances[3].target, "2. Radweg verbreitern (Vorschlag)");
    // The echoed prompt still carries the marker, so the stray answer is kept as the label.
    assert_eq!(stances[4].stance, "Das Modell hat sich verlaufen.");
    assert!(stances[4].rationale.is_empty());
}

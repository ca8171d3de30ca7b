// Checks over the tracks compiled into the binary.

use bughunt::catalog::Catalog;

#[test]
fn every_shipped_track_is_playable() {
    let catalog = Catalog::embedded().unwrap();

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.rejected().count(), 0);
    for track in catalog.tracks() {
        assert!(!track.bugs().is_empty(), "{} has no bugs", track.id());
        assert_eq!(track.defect_lines().len(), track.bugs().len());
        for bug in track.bugs() {
            let text = track.line(bug.line).unwrap();
            assert!(!text.trim().is_empty(), "{} line {} is blank", track.id(), bug.line);
            assert!(!bug.description.is_empty());
        }
    }
}

#[test]
fn shipped_tracks_match_their_languages() {
    let catalog = Catalog::embedded().unwrap();
    let summary: Vec<_> = catalog
        .tracks()
        .map(|t| (t.id().to_string(), t.language().to_string(), t.bugs().len()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("python".to_string(), "Python".to_string(), 7),
            ("java".to_string(), "Java".to_string(), 9),
            ("c".to_string(), "C".to_string(), 10),
        ]
    );
}

#[test]
fn python_bug_lines_point_at_the_defects() {
    let catalog = Catalog::embedded().unwrap();
    let python = catalog.get("python").unwrap();

    assert!(python.line(10).unwrap().contains("== None"));
    assert!(python.is_defect(10));
    assert!(!python.is_defect(1));
    assert_eq!(python.max_score(), 140);
}

#[test]
fn samples_carry_no_answer_hints() {
    let catalog = Catalog::embedded().unwrap();
    for track in catalog.tracks() {
        assert!(
            !track.code().contains("Bug "),
            "{} leaks a bug marker",
            track.id()
        );
    }
}

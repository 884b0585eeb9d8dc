use serde_json::json;
use trackstore_rs::{
    ConfidencePair, Feature, MergeSummary, Rect, TrackBuilder, TrackCollection, UnknownFields,
};

fn clip() -> TrackCollection {
    [
        TrackBuilder::new(1)
            .confidence("fish", 0.9)
            .feature(Feature::at(0).with_bounds(Rect::from_tlbr(0.0, 0.0, 10.0, 10.0)))
            .build(),
        TrackBuilder::new(2)
            .confidence("crab", 0.5)
            .feature(Feature::at(3))
            .build(),
        TrackBuilder::new(3).confidence("shark", 0.3).build(),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_upsert_wins_over_delete_in_one_batch() {
    let mut tracks: TrackCollection = [TrackBuilder::new(1).confidence("fish", 0.2).build()]
        .into_iter()
        .collect();

    let summary = tracks
        .merge(
            &[json!({"trackId": 1, "confidencePairs": [["whale", 0.8]]})],
            &["1"],
            UnknownFields::Preserve,
        )
        .unwrap();

    assert_eq!(summary, MergeSummary { updated: 1, deleted: 1 });
    assert_eq!(tracks.len(), 1);
    assert_eq!(
        tracks.get(1).unwrap().confidence_pairs,
        vec![ConfidencePair::new("whale", 0.8)]
    );
}

#[test]
fn test_delete_is_idempotent() {
    let delete = ["2", "3", "99"];

    let mut once = clip();
    once.merge(&[], &delete, UnknownFields::Preserve).unwrap();

    let mut twice = clip();
    twice.merge(&[], &delete, UnknownFields::Preserve).unwrap();
    twice.merge(&[], &delete, UnknownFields::Preserve).unwrap();

    assert_eq!(once, twice);
    assert_eq!(once.len(), 1);
    assert!(once.contains(1));
}

#[test]
fn test_merge_is_atomic_on_validation_failure() {
    let mut tracks = clip();
    let err = tracks
        .merge(
            &[
                json!({"trackId": 10}),
                json!({"trackId": 11, "features": [{"frame": 2}, {"frame": 1}]}),
            ],
            &["1", "2"],
            UnknownFields::Preserve,
        )
        .unwrap_err();

    assert_eq!(err.field, "upsert[1].features[1].frame");
    assert_eq!(tracks, clip());
}

#[test]
fn test_upsert_stores_none_omitted_form() {
    let mut tracks = TrackCollection::new();
    tracks
        .merge::<&str>(
            &[json!({
                "trackId": 5,
                "begin": 0,
                "end": 0,
                "meta": null,
                "features": [{"frame": 0, "bounds": null, "fishLength": null}]
            })],
            &[],
            UnknownFields::Preserve,
        )
        .unwrap();

    let stored = serde_json::to_value(&tracks).unwrap();
    assert_eq!(
        stored,
        json!({
            "5": {
                "trackId": 5,
                "begin": 0,
                "end": 0,
                "confidencePairs": [],
                "features": [{"frame": 0}]
            }
        })
    );
}

#[test]
fn test_delete_matches_canonical_ids_only() {
    let mut tracks = clip();
    let empty: [serde_json::Value; 0] = [];

    tracks
        .merge(&empty, &[" 1", "+2", "03", "x"], UnknownFields::Preserve)
        .unwrap();
    assert_eq!(tracks.len(), 3);

    tracks.merge(&empty, &["3"], UnknownFields::Preserve).unwrap();
    assert_eq!(tracks.len(), 2);
    assert!(!tracks.contains(3));
}

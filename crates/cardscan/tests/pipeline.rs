mod common;

use cardscan::{
    build_database, CardInfo, CardPipeline, DisplayState, InfoPanel, JsonCatalog, NoCatalog,
    PipelineParams, OUTLINE_COLOR,
};
use common::*;

#[derive(Default)]
struct RecordingPanel {
    shown: Vec<(String, Option<String>)>,
}

impl InfoPanel for RecordingPanel {
    fn show(&mut self, identifier: &str, info: Option<&CardInfo>) {
        self.shown
            .push((identifier.to_string(), info.map(|i| i.name.clone())));
    }
}

#[test]
fn upright_card_is_identified_and_outlined() {
    let refs = tempfile::tempdir().expect("tempdir");
    let db = reference_database(refs.path());
    let pipeline = CardPipeline::new(&db, &NoCatalog, PipelineParams::default()).expect("pipeline");

    let mut frame = frame_with_card(640, 480, 200, 90, 200, 300, GAMMA);
    let mut panel = RecordingPanel::default();
    let detections = pipeline.process_frame(&mut frame, &mut DisplayState::default(), &mut panel);

    assert_eq!(detections.len(), 1, "{detections:?}");
    let d = &detections[0];
    assert_eq!(d.identifier.as_deref(), Some("gamma-3"));
    assert!(d.metadata.is_none());
    assert!(d.shown);
    assert_eq!(panel.shown, [("gamma-3".to_string(), None)]);

    assert!(frame.pixels().any(|p| *p == OUTLINE_COLOR));
    assert_eq!(*frame.get_pixel(5, 5), PAPER);
}

#[test]
fn sideways_card_is_turned_upright_before_matching() {
    let refs = tempfile::tempdir().expect("tempdir");
    let db = reference_database(refs.path());
    let pipeline = CardPipeline::new(&db, &NoCatalog, PipelineParams::default()).expect("pipeline");

    let mut frame = frame_with_sideways_card(640, 480, 170, 140, 200, 300, ALPHA);
    let detections =
        pipeline.process_frame(&mut frame, &mut DisplayState::default(), &mut RecordingPanel::default());

    assert_eq!(detections.len(), 1, "{detections:?}");
    assert_eq!(detections[0].identifier.as_deref(), Some("alpha-1"));
}

#[test]
fn info_panel_only_fires_when_the_card_changes() {
    let refs = tempfile::tempdir().expect("tempdir");
    let db = reference_database(refs.path());
    let catalog = JsonCatalog::from_entries([(
        "beta-2".to_string(),
        CardInfo {
            name: "Beta".into(),
            market_price: Some(1.5),
            ..CardInfo::default()
        },
    )]);
    let pipeline = CardPipeline::new(&db, &catalog, PipelineParams::default()).expect("pipeline");

    let beta = frame_with_card(640, 480, 220, 100, 200, 300, BETA);
    let alpha = frame_with_card(640, 480, 220, 100, 200, 300, ALPHA);
    let mut state = DisplayState::default();
    let mut panel = RecordingPanel::default();

    let mut shown_flags = Vec::new();
    for source in [&beta, &beta, &alpha, &beta] {
        let mut frame = source.clone();
        let found = pipeline.process_frame(&mut frame, &mut state, &mut panel);
        assert_eq!(found.len(), 1);
        shown_flags.push(found[0].shown);
    }

    assert_eq!(shown_flags, [true, false, true, true]);
    assert_eq!(
        panel.shown,
        [
            ("beta-2".to_string(), Some("Beta".to_string())),
            ("alpha-1".to_string(), None),
            ("beta-2".to_string(), Some("Beta".to_string())),
        ]
    );
    assert_eq!(state.last_shown(), Some("beta-2"));
}

#[test]
fn distance_gate_withholds_the_identifier() {
    let refs = tempfile::tempdir().expect("tempdir");
    write_layouts(refs.path(), &[("alpha-1", ALPHA), ("beta-2", BETA)]);
    let db = build_database(refs.path(), &fingerprint_params()).expect("database");
    let frame = frame_with_card(640, 480, 200, 90, 200, 300, GAMMA);

    let open = CardPipeline::new(&db, &NoCatalog, PipelineParams::default()).expect("pipeline");
    let nearest = open.identify(&frame, &mut DisplayState::default(), &mut RecordingPanel::default());
    assert_eq!(nearest.len(), 1);
    let distance = nearest[0].distance;
    assert!(distance > 0, "gamma has no reference of its own");

    let gated = |max_distance| {
        CardPipeline::new(
            &db,
            &NoCatalog,
            PipelineParams {
                max_distance: Some(max_distance),
                ..PipelineParams::default()
            },
        )
        .expect("pipeline")
    };

    let mut panel = RecordingPanel::default();
    let mut state = DisplayState::default();
    let found = gated(distance - 1).process_frame(&mut frame.clone(), &mut state, &mut panel);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].identifier, None);
    assert!(!found[0].shown);
    assert!(panel.shown.is_empty());
    assert_eq!(state.last_shown(), None);

    let found = gated(distance).identify(&frame, &mut state, &mut panel);
    assert!(found[0].identifier.is_some());
    assert_eq!(panel.shown.len(), 1);
}

fn marked_database(dir: &std::path::Path) -> cardscan::FingerprintDatabase {
    write_layouts(
        dir,
        &[
            ("marked", MARKED),
            ("marked-flipped", MARKED_FLIPPED),
            ("marked-mirrored", MARKED_MIRRORED),
            ("marked-turned", MARKED_TURNED),
        ],
    );
    build_database(dir, &fingerprint_params()).expect("database")
}

#[test]
fn corner_mark_survives_rectification_at_any_offset() {
    let refs = tempfile::tempdir().expect("tempdir");
    let db = marked_database(refs.path());
    let pipeline = CardPipeline::new(&db, &NoCatalog, PipelineParams::default()).expect("pipeline");

    let frames = [
        frame_with_card(560, 720, 40, 50, 400, 600, MARKED),
        frame_with_card(560, 720, 120, 80, 400, 600, MARKED),
        frame_with_sideways_card(760, 520, 40, 50, 400, 600, MARKED),
        frame_with_sideways_card(760, 520, 120, 70, 400, 600, MARKED),
    ];
    for (i, frame) in frames.iter().enumerate() {
        let found = pipeline.identify(frame, &mut DisplayState::default(), &mut RecordingPanel::default());
        assert_eq!(found.len(), 1, "frame {i}: {found:?}");
        assert_eq!(found[0].identifier.as_deref(), Some("marked"), "frame {i}");
        assert!(found[0].distance <= 6, "frame {i}: distance {}", found[0].distance);
    }
}

#[test]
fn outlines_are_drawn_after_every_card_is_matched() {
    let refs = tempfile::tempdir().expect("tempdir");
    let db = reference_database(refs.path());
    let pipeline = CardPipeline::new(&db, &NoCatalog, PipelineParams::default()).expect("pipeline");

    // the tilted card's bounding box reaches into the upright card
    let alone = frame_with_card(600, 680, 350, 320, 200, 300, GAMMA);
    let mut both = alone.clone();
    paint_tilted_card(&mut both, (220.0, 300.0), 200.0, 300.0, 25.0);

    let reference = pipeline.identify(&alone, &mut DisplayState::default(), &mut RecordingPanel::default());
    assert_eq!(reference.len(), 1);

    let mut annotated = both.clone();
    let found = pipeline.process_frame(&mut annotated, &mut DisplayState::default(), &mut RecordingPanel::default());
    assert_eq!(found.len(), 2, "{found:?}");
    let upright = found
        .iter()
        .find(|d| d.quad.iter().all(|p| p.x >= 340.0))
        .expect("upright card");
    assert_eq!(upright.quad, reference[0].quad);
    assert_eq!(upright.distance, reference[0].distance);
    assert_eq!(upright.identifier.as_deref(), Some("gamma-3"));

    let untouched = pipeline.identify(&both, &mut DisplayState::default(), &mut RecordingPanel::default());
    assert_eq!(found, untouched);

    let crosses_upright = (360..540)
        .flat_map(|x| (330..610).map(move |y| (x, y)))
        .any(|(x, y)| *annotated.get_pixel(x, y) == OUTLINE_COLOR);
    assert!(crosses_upright);
}

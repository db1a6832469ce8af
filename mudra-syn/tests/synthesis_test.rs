//! End-to-end synthesis against small on-disk asset trees

use mudra_core::{DatasetEntry, DatasetIndex, MissPolicy, SignFormat, SignLanguageCode};
use mudra_lmk::{write_landmarks, PreprocessConfig, COORDS, KEYPOINTS};
use mudra_syn::{
    ConcatenativeSynthesis, FallbackMatch, GlossMapper, SegmentLayout, SignSequence,
    SynthesisConfig, SynthesisError, TextToSign, TranslationOutcome,
};
use ndarray::Array3;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const PSL_MAP: &[(&str, &str)] = &[
    ("salaam", "hello"),
    ("ghar", "house"),
    ("bank(river)", "bank"),
    ("bank(finance)", "bank"),
];

fn mapper() -> Arc<GlossMapper> {
    let index = DatasetIndex::new(
        [("00101", "hello"), ("00102", "hello"), ("00201", "house"), ("00301", "book")]
            .iter()
            .map(|(video, label)| DatasetEntry {
                video_name: video.to_string(),
                label: label.to_string(),
            })
            .collect(),
    );
    Arc::new(GlossMapper::from_parts(PSL_MAP.iter().copied(), &index))
}

fn write_segment(landmarks_dir: &Path, folder: &str, frames: usize) {
    let dir = landmarks_dir.join(folder);
    fs::create_dir_all(&dir).unwrap();
    let lm = Array3::<f32>::from_shape_fn((frames, KEYPOINTS, COORDS), |(f, k, _)| {
        0.1 + f as f32 * 0.01 + k as f32 * 0.0001
    });
    write_landmarks(dir.join("landmarks_preprocessed.npy"), &lm).unwrap();
}

fn config(root: &TempDir, sign_language: SignLanguageCode) -> SynthesisConfig {
    SynthesisConfig {
        sign_language,
        layout: SegmentLayout {
            landmarks_dir: root.path().join("landmarks"),
            videos_dir: root.path().join("videos"),
            ..SegmentLayout::default()
        },
        ..SynthesisConfig::default()
    }
}

fn translated(outcome: TranslationOutcome) -> SignSequence {
    match outcome {
        TranslationOutcome::Translated(sign) => sign,
        TranslationOutcome::NeedsDisambiguation(request) => {
            panic!("unexpected disambiguation request for '{}'", request.word)
        }
    }
}

#[test]
fn test_single_word_wlasl_landmarks() {
    let root = tempfile::tempdir().unwrap();
    write_segment(&root.path().join("landmarks"), "hello_00101", 23);

    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Wlasl), mapper()).unwrap();
    let sign = translated(engine.translate("hello").unwrap());

    assert!(sign.name().contains("hello"));
    assert_eq!(sign.len(), 23);
    assert_eq!(sign.format(), SignFormat::Landmarks);
    assert!(sign.skipped().is_empty());
}

#[test]
fn test_second_recording_used_when_first_missing() {
    let root = tempfile::tempdir().unwrap();
    write_segment(&root.path().join("landmarks"), "hello_00102", 9);

    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Wlasl), mapper()).unwrap();
    let sign = translated(engine.translate("Hello!").unwrap());
    assert_eq!(sign.len(), 9);
}

#[test]
fn test_unknown_word_is_no_translatable_content() {
    let root = tempfile::tempdir().unwrap();
    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Wlasl), mapper()).unwrap();
    let err = engine.translate("xyzzznotaword").unwrap_err();
    assert!(matches!(err, SynthesisError::NoTranslatableContent { .. }));
}

#[test]
fn test_empty_text_is_no_translatable_content() {
    let root = tempfile::tempdir().unwrap();
    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Wlasl), mapper()).unwrap();
    assert!(matches!(
        engine.translate("   ,.  "),
        Err(SynthesisError::NoTranslatableContent { .. })
    ));
}

#[test]
fn test_concatenation_length_and_skips() {
    let root = tempfile::tempdir().unwrap();
    let landmarks = root.path().join("landmarks");
    write_segment(&landmarks, "hello_00101", 12);
    write_segment(&landmarks, "house_00201", 30);

    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Wlasl), mapper()).unwrap();
    let sign = translated(engine.translate("hello zzz house book").unwrap());

    assert_eq!(sign.name(), "hello_house");
    assert_eq!(sign.len(), 42);
    assert_eq!(sign.segment_lengths().unwrap(), [12, 30]);
    // "zzz" has no gloss, "book" has a gloss but no segment
    assert_eq!(sign.skipped(), ["zzz", "book"]);
}

#[test]
fn test_fail_policy_aborts_on_miss() {
    let root = tempfile::tempdir().unwrap();
    write_segment(&root.path().join("landmarks"), "hello_00101", 12);

    let config = SynthesisConfig {
        miss_policy: MissPolicy::Fail,
        ..config(&root, SignLanguageCode::Wlasl)
    };
    let engine = ConcatenativeSynthesis::new(config, mapper()).unwrap();
    match engine.translate("hello zzz") {
        Err(SynthesisError::UnresolvedToken { token }) => assert_eq!(token, "zzz"),
        other => panic!("expected UnresolvedToken, got {:?}", other),
    }
}

#[test]
fn test_psl_gloss_reaches_wlasl_through_english() {
    let root = tempfile::tempdir().unwrap();
    write_segment(&root.path().join("landmarks"), "house_00201", 8);

    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Wlasl), mapper()).unwrap();
    let sign = translated(engine.translate("ghar").unwrap());
    assert_eq!(sign.name(), "house");
    assert_eq!(sign.len(), 8);
}

#[test]
fn test_fallback_folder_is_lexicographically_first() {
    let root = tempfile::tempdir().unwrap();
    let landmarks = root.path().join("landmarks");
    write_segment(&landmarks, "house_b", 5);
    write_segment(&landmarks, "house_a", 7);

    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Wlasl), mapper()).unwrap();
    assert_eq!(translated(engine.translate("house").unwrap()).len(), 7);

    let strict = SynthesisConfig {
        fallback: FallbackMatch::Disabled,
        ..config(&root, SignLanguageCode::Wlasl)
    };
    let engine = ConcatenativeSynthesis::new(strict, mapper()).unwrap();
    assert!(matches!(
        engine.translate("house"),
        Err(SynthesisError::NoTranslatableContent { .. })
    ));
}

#[test]
fn test_psl_ambiguity_then_choice() {
    let root = tempfile::tempdir().unwrap();
    let landmarks = root.path().join("landmarks");
    write_segment(&landmarks, "salaam", 5);
    write_segment(&landmarks, "bank(river)", 7);

    let engine = ConcatenativeSynthesis::new(config(&root, SignLanguageCode::Psl), mapper()).unwrap();
    let text = "hello, bank";
    let request = match engine.translate(text).unwrap() {
        TranslationOutcome::NeedsDisambiguation(request) => request,
        TranslationOutcome::Translated(sign) => panic!("translated to {}", sign.name()),
    };
    assert_eq!(request.word, "bank");
    assert_eq!(request.candidates, vec!["bank(finance)", "bank(river)"]);

    let corrected = request.apply(text, "bank(river)").unwrap();
    let sign = translated(engine.translate(&corrected).unwrap());
    assert_eq!(sign.name(), "salaam_bank(river)");
    assert_eq!(sign.len(), 12);
}

#[test]
fn test_ingest_preprocessing_fixes_segment_length() {
    let root = tempfile::tempdir().unwrap();
    let landmarks = root.path().join("landmarks");
    write_segment(&landmarks, "hello_00101", 12);
    write_segment(&landmarks, "house_00201", 300);

    let config = SynthesisConfig {
        preprocess: Some(PreprocessConfig {
            target_frames: 20,
            ..PreprocessConfig::default()
        }),
        ..config(&root, SignLanguageCode::Wlasl)
    };
    let engine = ConcatenativeSynthesis::new(config, mapper()).unwrap();
    let sign = translated(engine.translate("hello house").unwrap());
    assert_eq!(sign.segment_lengths().unwrap(), [20, 20]);
    assert_eq!(sign.len(), 40);
}

#[test]
fn test_video_format_collects_clips_in_order() {
    let root = tempfile::tempdir().unwrap();
    let videos = root.path().join("videos");
    fs::create_dir_all(&videos).unwrap();
    fs::write(videos.join("house.mp4"), b"").unwrap();
    fs::write(videos.join("00101.mp4"), b"").unwrap();

    let config = SynthesisConfig {
        sign_format: SignFormat::Video,
        ..config(&root, SignLanguageCode::Wlasl)
    };
    let engine = ConcatenativeSynthesis::new(config, mapper()).unwrap();
    let sign = translated(engine.translate("house hello").unwrap());

    let clips = sign.clips().unwrap();
    assert_eq!(sign.len(), 2);
    assert_eq!(clips[0].path, videos.join("house.mp4"));
    assert_eq!(clips[1].path, videos.join("00101.mp4"));
    assert!(sign.landmarks().is_none());
}

#[test]
fn test_invalid_config_rejected() {
    let root = tempfile::tempdir().unwrap();
    let config = SynthesisConfig {
        text_language: mudra_core::TextLanguageCode::Hindi,
        ..config(&root, SignLanguageCode::Wlasl)
    };
    assert!(matches!(
        ConcatenativeSynthesis::new(config, mapper()),
        Err(SynthesisError::Configuration(_))
    ));
}

#[test]
fn test_custom_text_rules_file() {
    let root = tempfile::tempdir().unwrap();
    write_segment(&root.path().join("landmarks"), "hello_00101", 4);
    let rules = root.path().join("text_preprocessing.json");
    fs::write(&rules, r#"{"replace": {"english": {"(?i)\\bhi\\b": "hello"}}}"#).unwrap();

    let config = SynthesisConfig {
        text_rules: Some(rules),
        ..config(&root, SignLanguageCode::Wlasl)
    };
    let engine = ConcatenativeSynthesis::new(config, mapper()).unwrap();
    let sign = translated(engine.translate("Hi").unwrap());
    assert_eq!(sign.name(), "hello");
}

#[test]
fn test_engine_loads_from_mudra_config() {
    let root = tempfile::tempdir().unwrap();
    let mappings = root.path().join("mappings");
    fs::create_dir_all(&mappings).unwrap();
    fs::write(
        mappings.join("psl_to_wlasl_mapping.json"),
        r#"{"salaam": "Hello"}"#,
    )
    .unwrap();
    fs::write(mappings.join("dataset.csv"), "video_name,label\n00101,hello\n").unwrap();
    write_segment(&root.path().join("landmarks"), "hello_00101", 6);

    let mut core = mudra_core::MudraConfig::default();
    core.assets.root = root.path().to_path_buf();
    let engine = ConcatenativeSynthesis::from_mudra_config(&core).unwrap();
    assert!(engine.mapper().is_psl_gloss("salaam"));
    assert_eq!(translated(engine.translate("hello").unwrap()).len(), 6);
}

#[test]
fn test_missing_mapping_file() {
    let root = tempfile::tempdir().unwrap();
    let mut core = mudra_core::MudraConfig::default();
    core.assets.root = root.path().to_path_buf();
    assert!(matches!(
        ConcatenativeSynthesis::from_mudra_config(&core),
        Err(SynthesisError::MappingIo { .. })
    ));
}

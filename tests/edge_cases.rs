// Edge cases across crate boundaries


use fixtures::{ramp, Assets};
use mudra_core::{DatasetIndex, MissPolicy};
use mudra_lmk::{
    augment_dataset, preprocess_landmarks, read_landmarks, read_parts_dir, write_landmarks,
    AugmentConfig, PreprocessConfig, COMPLETE_FILE, COORDS, KEYPOINTS,
};
use mudra_syn::{
    ConcatenativeSynthesis, SynthesisConfig, SynthesisError, TextToSign, TranslationOutcome,
};
use ndarray::{s, Array3};
use ndarray_npy::write_npy;
use std::fs;

#[test]
fn test_repeated_word_repeats_segment() {
    let assets = Assets::new();
    assets.segment("hello_00101", 7);
    let config = assets.config("english", "wlasl", "landmarks");

    let engine = ConcatenativeSynthesis::from_mudra_config(&config).unwrap();
    let sign = engine.translate("hello hello HELLO").unwrap().sign().unwrap();
    assert_eq!(sign.name(), "hello_hello_hello");
    assert_eq!(sign.len(), 21);

    let frames = sign.landmarks().unwrap();
    assert_eq!(frames.slice(s![0..7, .., ..]), frames.slice(s![14..21, .., ..]));
}

#[test]
fn test_every_resolved_gloss_missing_segment() {
    let assets = Assets::new();
    let config = assets.config("english", "wlasl", "landmarks");

    let engine = ConcatenativeSynthesis::from_mudra_config(&config).unwrap();
    assert!(matches!(
        engine.translate("hello house book"),
        Err(SynthesisError::NoTranslatableContent { .. })
    ));
}

#[test]
fn test_unreadable_segment_falls_through_to_next_recording() {
    let assets = Assets::new();
    let broken = assets.landmarks_dir().join("hello_00101");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("landmarks_preprocessed.npy"), b"not a numpy file").unwrap();
    assets.segment("hello_00102", 5);
    let config = assets.config("english", "wlasl", "landmarks");

    let engine = ConcatenativeSynthesis::from_mudra_config(&config).unwrap();
    let sign = engine.translate("hello").unwrap().sign().unwrap();
    assert_eq!(sign.len(), 5);
}

#[test]
fn test_mis_shaped_segment_is_a_miss() {
    let assets = Assets::new();
    let dir = assets.landmarks_dir().join("house_00201");
    fs::create_dir_all(&dir).unwrap();
    write_npy(dir.join("landmarks_preprocessed.npy"), &Array3::<f32>::zeros((4, 10, COORDS))).unwrap();
    assets.segment("hello_00101", 3);
    let config = assets.config("english", "wlasl", "landmarks");

    let engine = ConcatenativeSynthesis::from_mudra_config(&config).unwrap();
    let sign = engine.translate("hello house").unwrap().sign().unwrap();
    assert_eq!(sign.name(), "hello");
    assert_eq!(sign.skipped(), ["house"]);
}

#[test]
fn test_fail_policy_from_synthesis_config() {
    let assets = Assets::new();
    assets.segment("hello_00101", 3);
    let core = assets.config("english", "wlasl", "landmarks");

    let mapper = ConcatenativeSynthesis::from_mudra_config(&core)
        .unwrap()
        .mapper()
        .clone();
    let config = SynthesisConfig {
        miss_policy: MissPolicy::Fail,
        ..SynthesisConfig::from_core(&core)
    };
    let engine = ConcatenativeSynthesis::new(config, mapper).unwrap();
    assert!(matches!(
        engine.translate("hello there"),
        Err(SynthesisError::UnresolvedToken { .. })
    ));
}

#[test]
fn test_choice_for_other_word_keeps_asking() {
    let assets = Assets::new();
    assets.segment("bank(river)", 4);
    let config = assets.config("english", "psl", "landmarks");

    let engine = ConcatenativeSynthesis::from_mudra_config(&config).unwrap();
    let request = match engine.translate("bank and bank").unwrap() {
        TranslationOutcome::NeedsDisambiguation(request) => request,
        TranslationOutcome::Translated(_) => panic!("expected a disambiguation request"),
    };
    let text = request.apply("bank and bank", "bank(river)").unwrap();
    assert_eq!(text, "bank(river) and bank(river)");

    // "and" has no PSL gloss and is skipped
    let sign = engine.translate(&text).unwrap().sign().unwrap();
    assert_eq!(sign.len(), 8);
    assert_eq!(sign.skipped(), ["and"]);
}

#[test]
fn test_parts_directory_feeds_preprocessing() {
    let dir = tempfile::tempdir().unwrap();
    let full = ramp(12);
    write_npy(dir.path().join("face.npy"), &full.slice(s![.., 0..468, ..]).to_owned()).unwrap();
    write_npy(dir.path().join("pose.npy"), &full.slice(s![.., 510..543, ..]).to_owned()).unwrap();

    // both hands absent: zero-filled
    let landmarks = read_parts_dir(dir.path()).unwrap();
    assert_eq!(landmarks.dim(), (12, KEYPOINTS, COORDS));
    assert_eq!(landmarks[[5, 470, 0]], 0.0);
    assert_eq!(landmarks[[5, 520, 1]], full[[5, 520, 1]]);

    let out = preprocess_landmarks(&landmarks, &PreprocessConfig::default()).unwrap();
    assert_eq!(out.dim().0, 190);
}

#[test]
fn test_augmented_dataset_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("hello_00101");
    let target = dir.path().join("hello_00102");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&target).unwrap();
    write_landmarks(source.join(COMPLETE_FILE), &ramp(30)).unwrap();

    let index = DatasetIndex::from_csv_reader(
        "video_name,label\nhello_00101,hello\nhello_00102,hello\n".as_bytes(),
    )
    .unwrap();
    let report = augment_dataset(&index, dir.path(), 1, &AugmentConfig::default()).unwrap();
    assert_eq!(report.processed, 1);

    let augmented = read_landmarks(target.join(COMPLETE_FILE)).unwrap();
    assert!(augmented.dim().0 >= 1);
    assert_eq!(augmented.dim().1, KEYPOINTS);
}

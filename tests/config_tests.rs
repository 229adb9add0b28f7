use opal_slider::Error;
use opal_slider::config::Configuration;
use opal_slider::timeline::Easing;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn empty_config_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.transition_duration, Duration::from_secs(5));
    assert_eq!(cfg.autoplay_interval, Duration::from_secs(5));
    assert_eq!(cfg.resize_debounce, Duration::from_millis(100));
    assert_eq!(cfg.transition_easing, Easing::Power1Out);
    assert!(cfg.slides.is_none());
    assert_eq!(cfg.catalog().unwrap().len(), 4);
}

#[test]
fn parse_kebab_case_timings() {
    let yaml = r#"
transition-duration: 1500ms
transition-easing: power3-out
autoplay-interval: 8s
frame-interval: 33ms
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let settings = cfg.slider_settings();
    assert_eq!(settings.blend.duration, Duration::from_millis(1500));
    assert_eq!(settings.blend.easing, Easing::Power3Out);
    assert_eq!(settings.autoplay_interval, Duration::from_secs(8));
    assert_eq!(cfg.frame_interval, Duration::from_millis(33));
}

#[test]
fn gsap_style_none_easing_is_linear() {
    let cfg: Configuration = serde_yaml::from_str("transition-easing: none").unwrap();
    assert_eq!(cfg.transition_easing, Easing::Linear);
}

#[test]
fn parse_custom_slides() {
    let yaml = r#"
slides:
  - title: "Echo Forms"
    description: "Sound made visible."
    type: "Experimental Visual"
    field: "Creative Coding"
    date: "March 2025"
    image: "img/one.jpeg"
  - title: "Dream Mesh"
    description: "Grids that melt."
    type: "Visual Series"
    field: "Digital Art"
    date: "February 2025"
    image: "/abs/two.png"
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let catalog = cfg.catalog().unwrap();
    assert_eq!(catalog.len(), 2);
    let first = catalog.get(0).unwrap();
    assert_eq!(first.kind, "Experimental Visual");
    assert_eq!(first.image, PathBuf::from("img/one.jpeg"));
}

#[test]
fn unknown_easing_is_rejected() {
    let err = serde_yaml::from_str::<Configuration>("transition-easing: bouncy").unwrap_err();
    assert!(err.to_string().contains("bouncy"));
}

#[test]
fn zero_interval_fails_validation() {
    let cfg: Configuration = serde_yaml::from_str("autoplay-interval: 0s").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn empty_slide_list_fails_validation() {
    let cfg: Configuration = serde_yaml::from_str("slides: []").unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("at least one slide"));
}

#[test]
fn relative_images_resolve_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slider.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"slides:
  - title: "Mist UI"
    description: "Atmosphere over clarity."
    type: "UI Concept"
    field: "Product Design"
    date: "April 2025"
    image: "slides/mist.png""#
    )
    .unwrap();

    let cfg = Configuration::from_yaml_file(&path).unwrap().validated().unwrap();
    let catalog = cfg.catalog().unwrap();
    assert_eq!(catalog.get(0).unwrap().image, dir.path().join("slides/mist.png"));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Configuration::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
    match err {
        Error::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "autoplay-interval: [not, a, duration]").unwrap();
    let err = Configuration::from_yaml_file(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

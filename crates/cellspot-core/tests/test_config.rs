use cellspot_core::background::{AdaptiveMethod, BackgroundConfig, Polarity};
use cellspot_core::detection::{CoordinateSpace, DetectionConfig};
use cellspot_core::pipeline::{PipelineConfig, PipelineStage};

#[test]
fn test_defaults() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.background.window_size, 1);
    assert_eq!(cfg.background.block_size, 1001);
    assert_eq!(cfg.background.subtracted_constant, -10.0);
    assert_eq!(cfg.background.polarity, Polarity::DarkBackground);
    assert_eq!(cfg.background.method, AdaptiveMethod::Gaussian);
    assert_eq!(cfg.detection.min_box_weight, 0.2);
    assert_eq!(cfg.detection.min_local_max_dist, 7);
    assert_eq!(cfg.detection.coordinate_space, CoordinateSpace::Mask);
    assert!(!cfg.tuning_mode);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_toml_round_trip() {
    let cfg = PipelineConfig {
        background: BackgroundConfig {
            window_size: 3,
            block_size: 51,
            subtracted_constant: 4.5,
            polarity: Polarity::LightBackground,
            method: AdaptiveMethod::Mean,
        },
        detection: DetectionConfig {
            min_box_weight: 0.5,
            min_local_max_dist: 12,
            coordinate_space: CoordinateSpace::Source,
        },
        tuning_mode: true,
    };
    let text = toml::to_string_pretty(&cfg).unwrap();
    let parsed: PipelineConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, cfg);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let text = r#"
        [background]
        block_size = 201
        polarity = "LightBackground"

        [detection]
        min_local_max_dist = 4
    "#;
    let cfg: PipelineConfig = toml::from_str(text).unwrap();
    assert_eq!(cfg.background.block_size, 201);
    assert_eq!(cfg.background.polarity, Polarity::LightBackground);
    assert_eq!(cfg.background.window_size, 1);
    assert_eq!(cfg.background.method, AdaptiveMethod::Gaussian);
    assert_eq!(cfg.detection.min_local_max_dist, 4);
    assert_eq!(cfg.detection.min_box_weight, 0.2);
    assert!(!cfg.tuning_mode);

    let empty: PipelineConfig = toml::from_str("").unwrap();
    assert_eq!(empty, PipelineConfig::default());
}

#[test]
fn test_polarity_flag() {
    assert_eq!(Polarity::from_flag(0).unwrap(), Polarity::DarkBackground);
    assert_eq!(Polarity::from_flag(1).unwrap(), Polarity::LightBackground);
    assert!(Polarity::from_flag(2).is_err());
    assert_eq!(Polarity::LightBackground.as_flag(), 1);
}

#[test]
fn test_display_names() {
    assert_eq!(Polarity::DarkBackground.to_string(), "Dark background");
    assert_eq!(AdaptiveMethod::Mean.to_string(), "Mean");
    assert_eq!(CoordinateSpace::Source.to_string(), "Source");
    assert_eq!(PipelineStage::Detecting.to_string(), "Detecting cells");
}

#[test]
fn test_pipeline_validation_covers_both_stages() {
    let mut cfg = PipelineConfig::default();
    cfg.detection.min_box_weight = -1.0;
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::default();
    cfg.background.window_size = 0;
    assert!(cfg.validate().is_err());
}

use super::*;

fn pack_config(output: &str, inputs: &[&str]) -> PackConfig {
    PackConfig {
        output: Some(PathBuf::from(output)),
        inputs: inputs.iter().map(PathBuf::from).collect(),
        ..PackConfig::default()
    }
}

// -------------------- validate --------------------

#[test]
fn pack_mode_keeps_input_order() {
    let cfg = pack_config("out.pkg", &["b.txt", "a.txt"]);
    assert_eq!(
        cfg.validate().unwrap(),
        Mode::Pack {
            output: PathBuf::from("out.pkg"),
            inputs: vec![PathBuf::from("b.txt"), PathBuf::from("a.txt")],
        }
    );
}

#[test]
fn list_mode() {
    let cfg = PackConfig {
        list: Some(PathBuf::from("in.pkg")),
        ..PackConfig::default()
    };
    assert_eq!(
        cfg.validate().unwrap(),
        Mode::List {
            package: PathBuf::from("in.pkg")
        }
    );
}

#[test]
fn no_mode_is_rejected() {
    let err = PackConfig::default().validate().unwrap_err();
    assert!(err.to_string().contains("nothing to do"));
}

#[test]
fn output_without_inputs_is_rejected() {
    let err = pack_config("out.pkg", &[]).validate().unwrap_err();
    assert!(err.to_string().contains("no input files"));
}

#[test]
fn output_and_list_together_are_rejected() {
    let mut cfg = pack_config("out.pkg", &["a"]);
    cfg.list = Some(PathBuf::from("in.pkg"));
    assert!(cfg.validate().is_err());
}

// -------------------- log_level --------------------

#[test]
fn verbosity_raises_log_level() {
    let mut cfg = PackConfig::default();
    assert_eq!(cfg.log_level(), LevelFilter::Warn);
    cfg.verbosity = 1;
    assert_eq!(cfg.log_level(), LevelFilter::Info);
    cfg.verbosity = 2;
    assert_eq!(cfg.log_level(), LevelFilter::Debug);
    cfg.verbosity = 9;
    assert_eq!(cfg.log_level(), LevelFilter::Trace);
}

// -------------------- from_env --------------------

// Environment is process-wide, so every variable is exercised in one test.
#[test]
fn from_env_reads_and_falls_back() {
    std::env::set_var(ENV_OUTPUT, "env.pkg");
    std::env::set_var(ENV_FORMAT_VERSION, "3");
    let cfg = PackConfig::from_env();
    assert_eq!(cfg.output, Some(PathBuf::from("env.pkg")));
    assert_eq!(cfg.format_version, 3);
    assert!(cfg.inputs.is_empty());

    std::env::set_var(ENV_FORMAT_VERSION, "not a number");
    std::env::set_var(ENV_OUTPUT, "");
    let cfg = PackConfig::from_env();
    assert_eq!(cfg.format_version, 0);
    assert_eq!(cfg.output, None);

    std::env::remove_var(ENV_OUTPUT);
    std::env::remove_var(ENV_FORMAT_VERSION);
}

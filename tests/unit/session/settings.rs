use super::*;

fn write_temp(name: &str, body: &str) -> PathBuf {
    let dir = crate::test_support::scratch_dir(&format!("settings_{name}"));
    let path = dir.join("settings.json");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn empty_object_takes_every_default() {
    let path = write_temp("empty", "{}");
    let s = TextToolSettings::from_path(&path).unwrap();
    assert_eq!(s, TextToolSettings::default());
    assert_eq!(s.limits.max_task, 20);
    assert_eq!(s.limits.max_chars_per_task, 20_000);
    assert_eq!(s.limits.max_images_per_task, 1_000);
    assert_eq!(s.fonts_path(), PathBuf::from("./fonts.json"));
}

#[test]
fn partial_sections_merge_with_defaults() {
    let path = write_temp(
        "partial",
        r#"{ "data_dir": "/srv/texttool", "limits": { "max_task": 3 }, "render": { "batch_timeout_ms": 1500 } }"#,
    );
    let s = TextToolSettings::from_path(&path).unwrap();
    assert_eq!(s.limits.max_task, 3);
    assert_eq!(s.limits.max_images_per_task, 1_000);
    assert_eq!(s.fonts_path(), PathBuf::from("/srv/texttool/fonts.json"));

    let opts = s.render.batch_opts();
    assert_eq!(opts.threads, None);
    assert_eq!(opts.timeout, Some(Duration::from_millis(1500)));
}

#[test]
fn unknown_fields_and_bad_values_are_config_errors() {
    let path = write_temp("unknown", r#"{ "max_tasks": 3 }"#);
    assert!(matches!(
        TextToolSettings::from_path(&path),
        Err(TextToolError::Config(_))
    ));

    let path = write_temp("zero", r#"{ "limits": { "max_task": 0 } }"#);
    assert!(matches!(
        TextToolSettings::from_path(&path),
        Err(TextToolError::Config(_))
    ));

    let path = write_temp("threads", r#"{ "render": { "threads": 0 } }"#);
    assert!(matches!(
        TextToolSettings::from_path(&path),
        Err(TextToolError::Config(_))
    ));
}

#[test]
fn missing_file_is_config_error() {
    let err = TextToolSettings::from_path(Path::new("/nonexistent/texttool.json")).unwrap_err();
    assert!(err.to_string().starts_with("config error:"));
}

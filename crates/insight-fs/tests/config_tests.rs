use insight_fs::{ConfigStore, Error, FileSettings, ServiceInfo, SettingsStore};
use rstest::rstest;
use tempfile::TempDir;

#[rstest]
#[case("service.toml")]
#[case("service.json")]
#[case("service.yaml")]
#[case("service.YML")]
fn service_info_round_trips_in_every_format(#[case] file: &str) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(file);
    let store = ConfigStore::new();

    let info = ServiceInfo {
        base_address: Some("http://localhost".into()),
        port: "6520".into(),
        namespace: Some("Insight.Base".into()),
        compress: true,
        ..Default::default()
    };
    store.save(&path, &info).unwrap();

    let loaded: ServiceInfo = store.load(&path).unwrap();
    assert_eq!(loaded, info);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = ConfigStore::new().save(&dir.path().join("service.ini"), &ServiceInfo::default());
    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
}

#[test]
fn malformed_file_reports_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ConfigStore::new().load::<ServiceInfo>(&path).unwrap_err();
    match err {
        Error::ConfigParse { format, .. } => assert_eq!(format, "JSON"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn settings_written_by_one_store_are_read_by_the_next() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.yaml");

    {
        let mut settings = FileSettings::open(&path).unwrap();
        settings.set("ApiUrl", "http://10.0.0.2:6520");
        settings.set("Theme", "dark");
        settings.flush().unwrap();
    }

    let mut settings = FileSettings::open(&path).unwrap();
    assert_eq!(settings.get("Theme").as_deref(), Some("dark"));
    settings.set("Theme", "light");
    settings.flush().unwrap();

    let reread = FileSettings::open(&path).unwrap();
    assert_eq!(reread.get("Theme").as_deref(), Some("light"));
    assert_eq!(reread.get("ApiUrl").as_deref(), Some("http://10.0.0.2:6520"));
}

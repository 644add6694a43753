use std::time::Duration;
use super::{parse,Settings,Error};

#[test]
fn empty_object_gives_defaults() {
    let settings = parse("{}").expect("parse failed");
    assert_eq!(settings,Settings::new());
    assert_eq!(settings.baud,403_200);
    assert_eq!(settings.engine.drives,4);
    assert_eq!(settings.engine.command_timeout,Duration::from_millis(50));
}

#[test]
fn full_settings() {
    let json = r#"{
        "port": "COM3",
        "baud": 460800,
        "drives": 3,
        "mount": ["cpm22.dsk", null, "games.dsk"],
        "timing": { "pollMs": 5, "commandMs": 80, "payloadMs": 400, "payloadAttemptMs": 120, "writeMs": 2000 },
        "theme": "dark"
    }"#;
    let settings = parse(json).expect("parse failed");
    assert_eq!(settings.port,Some("COM3".to_string()));
    assert_eq!(settings.baud,460_800);
    assert_eq!(settings.engine.drives,3);
    assert_eq!(settings.mount_requests(),vec![(0,"cpm22.dsk".to_string()),(2,"games.dsk".to_string())]);
    assert_eq!(settings.engine.poll,Duration::from_millis(5));
    assert_eq!(settings.engine.command_timeout,Duration::from_millis(80));
    assert_eq!(settings.engine.payload_timeout,Duration::from_millis(400));
    assert_eq!(settings.engine.payload_attempt,Duration::from_millis(120));
    assert_eq!(settings.engine.write_timeout,Duration::from_millis(2000));
}

#[test]
fn wrong_types_keep_defaults() {
    let settings = parse(r#"{"port": 7, "baud": "fast", "timing": {"commandMs": -1}}"#).expect("parse failed");
    assert_eq!(settings.port,None);
    assert_eq!(settings.baud,403_200);
    assert_eq!(settings.engine.command_timeout,Duration::from_millis(50));
}

#[test]
fn bad_settings() {
    assert!(parse("[1,2]").is_err());
    assert!(parse("{ not json").is_err());
    assert!(parse(r#"{"drives": 0}"#).is_err());
    assert!(parse(r#"{"drives": 17}"#).is_err());
    assert!(parse(r#"{"drives": 2, "mount": ["a.dsk","b.dsk","c.dsk"]}"#).is_err());
    assert!(parse(r#"{"drives": 16}"#).is_ok());
}

#[test]
fn timing_out_of_range() {
    for json in [
        r#"{"timing": {"commandMs": 0}}"#,
        r#"{"timing": {"pollMs": 0}}"#,
        r#"{"timing": {"payloadMs": 60000}}"#
    ] {
        let err = parse(json).expect_err("timing was accepted");
        assert!(matches!(err.downcast_ref::<Error>(),Some(Error::Timing(..))));
    }
    assert!(parse(r#"{"timing": {"commandMs": 1, "writeMs": 59999}}"#).is_ok());
}

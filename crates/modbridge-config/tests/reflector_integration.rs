//! Reflector behavior against a realistic configuration type

use modbridge_config::*;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

#[derive(Debug, Default)]
struct AudioConfig {
    volume: i32,
    music: bool,
    brightness: f32,
    open_menu: KeybindList,
}

static AUDIO: Lazy<PropertyTable<AudioConfig>> = Lazy::new(|| {
    PropertyTable::builder()
        .property("Volume", |c: &AudioConfig| &c.volume, |c: &mut AudioConfig| &mut c.volume)
        .default_value(50)
        .category("Audio")
        .property("Music", |c: &AudioConfig| &c.music, |c: &mut AudioConfig| &mut c.music)
        .default_value(true)
        .category("Audio")
        .property("Brightness", |c: &AudioConfig| &c.brightness, |c: &mut AudioConfig| &mut c.brightness)
        .default_value(0.8f32)
        .category("Video")
        .property("OpenMenu", |c: &AudioConfig| &c.open_menu, |c: &mut AudioConfig| &mut c.open_menu)
        .build()
});

impl Configurable for AudioConfig {
    fn properties() -> &'static PropertyTable<Self> {
        &AUDIO
    }
}

fn setup() -> (Reflector, SharedConfig<AudioConfig>, Arc<Mutex<Vec<ChangeEvent>>>) {
    let reflector = Reflector::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    reflector.subscribe(move |event| sink.lock().push(event.clone()));

    let config = Arc::new(RwLock::new(AudioConfig {
        volume: 10,
        music: false,
        brightness: 0.2,
        open_menu: KeybindList::default(),
    }));
    (reflector, config, events)
}

#[test]
fn test_reset_audio_category_leaves_video_untouched() {
    let (reflector, config, events) = setup();
    let mut saves = 0;

    let report = reflector.reset_to_defaults(&config, Some("Audio"), || saves += 1);

    assert_eq!(saves, 1);
    assert_eq!(report.written, ["Volume", "Music"]);
    let state = config.read();
    assert_eq!(state.volume, 50);
    assert!(state.music);
    assert_eq!(state.brightness, 0.2);

    let events = events.lock();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        ChangeEvent {
            property: "Volume".into(),
            old_value: Value::Int(10),
            new_value: Value::Int(50),
        }
    );
}

#[test]
fn test_full_reset_writes_every_annotated_property() {
    let (reflector, config, events) = setup();
    let mut saves = 0;

    let report = reflector.reset_to_defaults(&config, None, || saves += 1);

    assert_eq!(saves, 1);
    assert_eq!(report.written.len(), 3);
    assert_eq!(events.lock().len(), 3);
    assert!((config.read().brightness - 0.8).abs() < f32::EPSILON);
}

#[test]
fn test_set_then_read_returns_coerced_value() {
    let (reflector, config, _) = setup();

    reflector
        .set_property(&config, "Volume", Value::Text("75".into()))
        .unwrap();
    assert_eq!(reflector.get_property(&config, "Volume").unwrap(), Value::Int(75));

    reflector
        .set_property(&config, "OpenMenu", Value::KeybindList("LeftShift + F5".parse().unwrap()))
        .unwrap();
    assert_eq!(config.read().open_menu.to_string(), "LeftShift + F5");
}

#[test]
fn test_unconvertible_value_leaves_property_unchanged() {
    let (reflector, config, events) = setup();

    let err = reflector
        .set_property(&config, "Volume", Value::Text("very loud".into()))
        .unwrap_err();

    assert!(matches!(err, ReflectError::ConversionFailure { ref property, .. } if property == "Volume"));
    assert_eq!(config.read().volume, 10);
    assert!(events.lock().is_empty());
}

#[test]
fn test_missing_property_never_yields_accessor() {
    let (reflector, config, _) = setup();

    for name in ["volume", "", "Volume ", "Sound"] {
        assert_eq!(
            reflector.accessor(&config, name).unwrap_err(),
            ReflectError::PropertyNotFound(name.to_string())
        );
    }
}

#[test]
fn test_value_kinds() {
    let (reflector, config, _) = setup();
    let kinds: Vec<_> = ["Volume", "Music", "Brightness", "OpenMenu"]
        .iter()
        .map(|name| reflector.value_kind(&config, name).unwrap())
        .collect();
    assert_eq!(
        kinds,
        [ValueKind::Integer, ValueKind::Boolean, ValueKind::Float, ValueKind::KeybindList]
    );
}

#[test]
fn test_two_instances_share_one_reflector() {
    let reflector = Reflector::new();
    let first: SharedConfig<AudioConfig> = Arc::new(RwLock::new(AudioConfig::default()));
    let second: SharedConfig<AudioConfig> = Arc::new(RwLock::new(AudioConfig::default()));

    let a = reflector.accessor(&first, "Volume").unwrap();
    let b = reflector.accessor(&second, "Volume").unwrap();
    a.write(1).unwrap();
    b.write(2).unwrap();

    assert_eq!(first.read().volume, 1);
    assert_eq!(second.read().volume, 2);
}

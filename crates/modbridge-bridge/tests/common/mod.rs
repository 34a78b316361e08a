//! Recording fakes for the settings menu and presentation layer

#![allow(dead_code)]

use modbridge_bridge::*;
use modbridge_config::{
    Button, ChangeEvent, Configurable, KeybindList, PropertyTable, SharedConfig,
};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;

pub const MOD_ID: &str = "Author.AudioTweaks";

#[derive(Debug, Default, Clone, Serialize)]
pub struct AudioConfig {
    pub volume: i32,
    pub music: bool,
    pub brightness: f32,
    pub nickname: String,
    pub open_menu: KeybindList,
    pub pause_key: Button,
    pub tint: Vec<i32>,
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
        .default_value(0.75f32)
        .category("Video")
        .property("Nickname", |c: &AudioConfig| &c.nickname, |c: &mut AudioConfig| &mut c.nickname)
        .property("OpenMenu", |c: &AudioConfig| &c.open_menu, |c: &mut AudioConfig| &mut c.open_menu)
        .default_value(Button::new("F5").unwrap())
        .property("PauseKey", |c: &AudioConfig| &c.pause_key, |c: &mut AudioConfig| &mut c.pause_key)
        .property("Tint", |c: &AudioConfig| &c.tint, |c: &mut AudioConfig| &mut c.tint)
        .build()
});

impl Configurable for AudioConfig {
    fn properties() -> &'static PropertyTable<Self> {
        &AUDIO
    }
}

pub fn shared_config() -> SharedConfig<AudioConfig> {
    Arc::new(RwLock::new(AudioConfig {
        volume: 10,
        brightness: 0.2,
        ..AudioConfig::default()
    }))
}

pub fn manifest() -> Manifest {
    Manifest::new(MOD_ID, "Audio Tweaks", "1.0.0")
}

pub fn translations() -> Arc<StaticTranslations> {
    Arc::new(
        StaticTranslations::new()
            .with("Config.AudioTweaks.Volume.Name", "Volume level")
            .with("Config.AudioTweaks.Volume.Description", "Master volume")
            .with("Config.AudioTweaks.Audio.Title", "Audio settings")
            .with("Config.AudioTweaks.AudioTip.Description", "Everything you hear")
            .with("Config.AudioTweaks.Reset.Title", "Reset audio")
            .with("Config.AudioTweaks.Reset.Button", "Reset")
            .with("Config.AudioTweaks.Reset.Hover", "Restores the audio defaults"),
    )
}

/// Capabilities offering `menu` under the default id, or nothing
pub fn capabilities(menu: Option<Arc<RecordingMenu>>) -> Arc<StaticCapabilities> {
    let mut caps = StaticCapabilities::new();
    if let Some(menu) = menu {
        let menu: Arc<dyn ConfigMenu> = menu;
        caps.insert(BridgeOptions::default().menu_capability_id, Capability::handle(menu));
    }
    Arc::new(caps)
}

pub fn record_changes(bridge: &ConfigBridge<AudioConfig>) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    bridge
        .reflector()
        .subscribe(move |event| sink.lock().push(event.clone()));
    events
}

/// Settings menu that records every registration
#[derive(Default)]
pub struct RecordingMenu {
    pub calls: Mutex<Vec<String>>,
    pub reset: Mutex<Option<Callback>>,
    pub save: Mutex<Option<Callback>>,
    pub ints: Mutex<Vec<OptionSpec<i32>>>,
    pub bools: Mutex<Vec<OptionSpec<bool>>>,
    pub texts: Mutex<Vec<OptionSpec<String>>>,
    pub complex: Mutex<Vec<ComplexOption>>,
    pub field_changed: Mutex<Vec<FieldChanged>>,
}

impl RecordingMenu {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl ConfigMenu for RecordingMenu {
    fn register(&self, manifest: &Manifest, reset: Callback, save: Callback) {
        self.record(format!("register:{}", manifest.unique_id));
        *self.reset.lock() = Some(reset);
        *self.save.lock() = Some(save);
    }

    fn add_bool_option(&self, _: &Manifest, option: OptionSpec<bool>) {
        self.record(format!("bool:{}", (option.name)()));
        self.bools.lock().push(option);
    }

    fn add_int_option(&self, _: &Manifest, option: OptionSpec<i32>) {
        self.record(format!("int:{}", (option.name)()));
        self.ints.lock().push(option);
    }

    fn add_float_option(&self, _: &Manifest, option: OptionSpec<f32>) {
        self.record(format!("float:{}", (option.name)()));
    }

    fn add_text_option(&self, _: &Manifest, option: OptionSpec<String>) {
        self.record(format!("text:{}", (option.name)()));
        self.texts.lock().push(option);
    }

    fn add_keybind_option(&self, _: &Manifest, option: OptionSpec<Button>) {
        self.record(format!("keybind:{}", (option.name)()));
    }

    fn add_keybind_list_option(&self, _: &Manifest, option: OptionSpec<KeybindList>) {
        self.record(format!("keybind-list:{}", (option.name)()));
    }

    fn add_section_title(&self, _: &Manifest, text: TextProvider, tooltip: Option<TextProvider>) {
        let tooltip = tooltip.map(|t| t()).unwrap_or_default();
        self.record(format!("section:{}|{}", text(), tooltip));
    }

    fn add_page_link(&self, _: &Manifest, page_id: &str, text: TextProvider, _: Option<TextProvider>) {
        self.record(format!("link:{}|{}", page_id, text()));
    }

    fn add_page(&self, _: &Manifest, page_id: &str, title: TextProvider) {
        self.record(format!("page:{}|{}", page_id, title()));
    }

    fn add_complex_option(&self, _: &Manifest, option: ComplexOption) {
        self.record(format!("complex:{}", option.field_id.as_deref().unwrap_or("-")));
        self.complex.lock().push(option);
    }

    fn on_field_changed(&self, _: &Manifest, callback: FieldChanged) {
        self.record("field-changed".into());
        self.field_changed.lock().push(callback);
    }
}

/// Presenter with a scripted pointer state that records what it draws
#[derive(Default)]
pub struct RecordingPresenter {
    pub frame: Mutex<ButtonFrame>,
    pub buttons: Mutex<Vec<(String, String)>>,
    pub separators: Mutex<usize>,
    pub tooltips: Mutex<Vec<Tooltip>>,
}

impl RecordingPresenter {
    pub fn hovering_right_and_clicking() -> Self {
        let presenter = Self::default();
        *presenter.frame.lock() = ButtonFrame {
            left_hovered: false,
            right_hovered: true,
            clicked: true,
        };
        presenter
    }
}

impl Presenter for RecordingPresenter {
    fn draw_button(&self, _: &dyn Any, _: Point, left: &str, right: &str) -> ButtonFrame {
        self.buttons.lock().push((left.to_string(), right.to_string()));
        *self.frame.lock()
    }

    fn draw_separator(&self, _: &dyn Any, _: Point) {
        *self.separators.lock() += 1;
    }

    fn draw_tooltip(&self, _: &dyn Any, tooltip: &Tooltip) {
        self.tooltips.lock().push(tooltip.clone());
    }

    fn text_height(&self, _: &str) -> f32 {
        48.0
    }
}

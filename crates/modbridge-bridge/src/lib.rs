//! Settings-menu binding for configuration objects
//!
//! [`ConfigBridge`] takes a [`Configurable`](modbridge_config::Configurable)
//! configuration object and registers its properties with an external
//! settings menu ([`ConfigMenu`]) acquired through a host capability lookup:
//!
//! - **Options**: each property is registered with the control its
//!   [`ValueKind`](modbridge_config::ValueKind) maps to ([`control_for`])
//! - **Text**: names, descriptions and titles resolve lazily through a
//!   [`Translator`]
//! - **Layout**: section titles, pages, page links, buttons and separators
//! - **Reset/save**: the menu's reset restores declared defaults through the
//!   reflector; save goes to a [`ConfigStore`]
//! - **Patches**: with an
//!   [`InterceptionEngine`](modbridge_intercept::InterceptionEngine), hooks on
//!   the menu's internals draw bridge tooltips and track the open page
//!
//! The menu is optional. Without it the bridge is inert and every call is a
//! no-op.

mod binding;
mod bridge;
mod capability;
mod error;
mod i18n;
mod menu;
mod options;
mod patches;
mod presentation;
mod store;

pub use binding::{control_for, ControlKind, PropertyBinding};
pub use bridge::{ConfigBridge, Environment};
pub use capability::{
    Capability, CapabilityCache, CapabilityHandle, CapabilitySource, StaticCapabilities,
};
pub use error::{BridgeError, Result};
pub use i18n::{StaticTranslations, Translations, Translator};
pub use menu::{
    Callback, ComplexOption, ConfigMenu, DrawFn, FieldChanged, Getter, Manifest, OptionSpec,
    Setter, TextProvider,
};
pub use options::{BridgeOptions, MenuTargets};
pub use patches::{PageOpener, PatchReport};
pub use presentation::{
    ButtonClick, ButtonFrame, ButtonOption, ButtonSpec, Point, Presenter, RenderRequest, Tooltip,
};
pub use store::{ConfigStore, JsonFileStore};

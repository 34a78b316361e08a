//! Bridge options
//!
//! ```toml
//! menu_capability_id = "spacechase0.GenericModConfigMenu"
//! enable_patches = true
//! key_prefix = "Config"
//!
//! [menu_targets]
//! menu_type = "GenericModConfigMenu.Framework.SpecificModConfigMenu"
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Where the menu's internals live, for the interception patches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuTargets {
    /// Qualified name of the menu page type
    pub menu_type: String,
    /// Its per-frame draw method
    pub draw_method: String,
    /// Parameter types of the draw method
    pub draw_params: Vec<String>,
    /// Parameter types of the page constructor
    pub page_ctor_params: Vec<String>,
}

impl Default for MenuTargets {
    fn default() -> Self {
        Self {
            menu_type: "GenericModConfigMenu.Framework.SpecificModConfigMenu".into(),
            draw_method: "draw".into(),
            draw_params: vec!["Microsoft.Xna.Framework.Graphics.SpriteBatch".into()],
            page_ctor_params: vec![
                "GenericModConfigMenu.Framework.ModConfig".into(),
                "System.Int32".into(),
                "System.String".into(),
                "System.Action`1[System.String]".into(),
                "System.Action".into(),
            ],
        }
    }
}

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeOptions {
    /// Capability id of the settings menu
    pub menu_capability_id: String,
    /// Install the page-capture and tooltip patches when possible
    pub enable_patches: bool,
    /// First segment of option translation keys
    pub key_prefix: String,
    pub menu_targets: MenuTargets,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            menu_capability_id: "spacechase0.GenericModConfigMenu".into(),
            enable_patches: true,
            key_prefix: "Config".into(),
            menu_targets: MenuTargets::default(),
        }
    }
}

impl BridgeOptions {
    /// Parse options from TOML; missing fields take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

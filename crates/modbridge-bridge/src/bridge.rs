//! Configuration bridge
//!
//! Wires one configuration object to the external settings menu. The menu is
//! a soft dependency: when the host does not provide it, the bridge is inert
//! and every registration call is a no-op (logged once).
//!
//! ## Example
//!
//! ```rust,ignore
//! let bridge = ConfigBridge::<AudioConfig>::new(BridgeOptions::default());
//! bridge.initialize(
//!     manifest,
//!     config.clone(),
//!     Environment::new(host.capabilities())
//!         .with_translator(host.translations())
//!         .with_store(Arc::new(JsonFileStore::new("config.json")))
//!         .with_interception(engine),
//! )?;
//!
//! bridge.add_section_title("Audio", None);
//! bridge.add_option("Volume");
//! bridge.add_button_option(ButtonSpec::new("ResetAudio").render_right(true));
//! ```

use crate::binding::{control_for, ControlKind, PropertyBinding};
use crate::capability::{CapabilityCache, CapabilitySource};
use crate::error::{BridgeError, Result};
use crate::i18n::{Translations, Translator};
use crate::menu::{Callback, ComplexOption, ConfigMenu, DrawFn, Manifest, OptionSpec, TextProvider};
use crate::options::BridgeOptions;
use crate::patches::{self, PageOpener, PatchReport};
use crate::presentation::{ButtonClick, ButtonOption, ButtonSpec, Point, Presenter, RenderRequest, Tooltip};
use crate::store::ConfigStore;
use modbridge_config::{
    Accessor, ConfigValue, Configurable, Reflector, ResetReport, SharedConfig, Value,
};
use modbridge_intercept::InterceptionEngine;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Host services handed to [`ConfigBridge::initialize`]
pub struct Environment<C> {
    pub capabilities: Arc<dyn CapabilitySource>,
    pub translator: Option<Arc<dyn Translator>>,
    pub store: Option<Arc<dyn ConfigStore<C>>>,
    pub presenter: Option<Arc<dyn Presenter>>,
    pub interception: Option<Arc<InterceptionEngine>>,
}

impl<C> Environment<C> {
    pub fn new(capabilities: Arc<dyn CapabilitySource>) -> Self {
        Self {
            capabilities,
            translator: None,
            store: None,
            presenter: None,
            interception: None,
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ConfigStore<C>>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn with_interception(mut self, engine: Arc<InterceptionEngine>) -> Self {
        self.interception = Some(engine);
        self
    }
}

type ClickListener = Arc<dyn Fn(&ButtonClick) + Send + Sync>;

struct PageCapture {
    current: Option<String>,
    opener: Option<PageOpener>,
}

/// Per-bridge display state shared with draw closures and hooks
#[derive(Default)]
pub(crate) struct FrameState {
    tooltip: Mutex<Option<Tooltip>>,
    page: RwLock<Option<PageCapture>>,
    clicks: RwLock<Vec<ClickListener>>,
}

impl FrameState {
    fn apply(&self, request: RenderRequest) {
        if let Some(tooltip) = request.tooltip {
            *self.tooltip.lock() = Some(tooltip);
        }
        if let Some(click) = request.click {
            let listeners = self.clicks.read().clone();
            debug!(category = "bridge", field_id = %click.field_id, listeners = listeners.len(), "button clicked");
            for listener in &listeners {
                listener(&click);
            }
        }
    }

    pub(crate) fn take_tooltip(&self) -> Option<Tooltip> {
        self.tooltip.lock().take()
    }

    pub(crate) fn capture_page(&self, current: Option<String>, opener: Option<PageOpener>) {
        trace!(category = "bridge", page = current.as_deref().unwrap_or(""), "menu page captured");
        *self.page.write() = Some(PageCapture { current, opener });
    }
}

struct BridgeState<C> {
    manifest: Manifest,
    config: SharedConfig<C>,
    menu: Option<Arc<dyn ConfigMenu>>,
    translations: Translations,
    presenter: Option<Arc<dyn Presenter>>,
    save: Callback,
    patches: PatchReport,
}

/// Registers a configuration object's properties with the settings menu
pub struct ConfigBridge<C: Configurable> {
    options: BridgeOptions,
    reflector: Reflector,
    state: OnceCell<BridgeState<C>>,
    frame: Arc<FrameState>,
    bindings: Mutex<Vec<PropertyBinding>>,
    reported_uninitialized: AtomicBool,
    reported_menu_absent: AtomicBool,
}

impl<C: Configurable> ConfigBridge<C> {
    pub fn new(options: BridgeOptions) -> Self {
        Self::with_reflector(options, Reflector::new())
    }

    /// A bridge whose writes go through (and notify the listeners of) `reflector`
    pub fn with_reflector(options: BridgeOptions, reflector: Reflector) -> Self {
        Self {
            options,
            reflector,
            state: OnceCell::new(),
            frame: Arc::new(FrameState::default()),
            bindings: Mutex::new(Vec::new()),
            reported_uninitialized: AtomicBool::new(false),
            reported_menu_absent: AtomicBool::new(false),
        }
    }

    /// Acquire the settings menu and register reset/save with it
    ///
    /// A missing menu is not an error: the bridge becomes inert. A manifest
    /// whose id has no namespace segment is, since no option text could be
    /// resolved.
    pub fn initialize(
        &self,
        manifest: Manifest,
        config: SharedConfig<C>,
        env: Environment<C>,
    ) -> Result<()> {
        if self.state.get().is_some() {
            return Err(BridgeError::AlreadyInitialized);
        }
        let namespace = manifest.namespace().ok_or_else(|| {
            BridgeError::MissingInput(format!(
                "manifest id `{}` has no namespace segment",
                manifest.unique_id
            ))
        })?;
        let translations = Translations::new(env.translator, &self.options.key_prefix, namespace);

        let capabilities = CapabilityCache::new(env.capabilities);
        let menu = capabilities.get_capability::<dyn ConfigMenu>(&self.options.menu_capability_id, true)?;

        let save: Callback = {
            let store = env.store;
            let config = Arc::clone(&config);
            Arc::new(move || persist(store.as_deref(), &config))
        };

        let patches = match &menu {
            Some(menu) => {
                let reset: Callback = {
                    let reflector = self.reflector.clone();
                    let config = Arc::clone(&config);
                    let save = Arc::clone(&save);
                    Arc::new(move || {
                        reflector.reset_to_defaults(&config, None, || save());
                    })
                };
                menu.register(&manifest, reset, Arc::clone(&save));
                info!(category = "bridge", unique_id = %manifest.unique_id, "registered with settings menu");

                match &env.interception {
                    Some(engine) if self.options.enable_patches => patches::apply(
                        engine,
                        &self.options.menu_targets,
                        &manifest.unique_id,
                        &self.frame,
                        env.presenter.clone(),
                    ),
                    _ => PatchReport::default(),
                }
            }
            None => {
                info!(
                    category = "bridge",
                    capability = %self.options.menu_capability_id,
                    "settings menu not present; options are disabled"
                );
                PatchReport::default()
            }
        };

        let state = BridgeState {
            manifest,
            config,
            menu,
            translations,
            presenter: env.presenter,
            save,
            patches,
        };
        self.state
            .set(state)
            .map_err(|_| BridgeError::AlreadyInitialized)
    }

    /// The state and menu, or `None` after logging (once) why not
    fn ready(&self) -> Option<(&BridgeState<C>, &dyn ConfigMenu)> {
        match self.state.get() {
            Some(state) => {
                if let Some(menu) = &state.menu {
                    return Some((state, menu.as_ref()));
                }
                if !self.reported_menu_absent.swap(true, Ordering::Relaxed) {
                    debug!(category = "bridge", "settings menu absent; skipping menu operations");
                }
            }
            None => {
                if !self.reported_uninitialized.swap(true, Ordering::Relaxed) {
                    warn!(category = "bridge", "configuration objects not initialized");
                }
            }
        }
        None
    }

    /// Whether the settings menu was acquired
    pub fn is_active(&self) -> bool {
        self.state.get().is_some_and(|state| state.menu.is_some())
    }

    /// The reflector writes go through; subscribe to it for change events
    pub fn reflector(&self) -> &Reflector {
        &self.reflector
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.state.get().map(|state| &state.manifest)
    }

    /// Which menu patches are active
    pub fn patch_report(&self) -> PatchReport {
        self.state.get().map(|state| state.patches).unwrap_or_default()
    }

    /// Properties registered so far
    pub fn bindings(&self) -> Vec<PropertyBinding> {
        self.bindings.lock().clone()
    }

    /// Register the property `name` with the control for its value kind
    pub fn add_option(&self, name: &str) {
        self.add_option_inner(name, None);
    }

    /// Like [`add_option`](Self::add_option), with a field id for
    /// field-changed notifications
    pub fn add_option_with_id(&self, name: &str, field_id: impl Into<String>) {
        self.add_option_inner(name, Some(field_id.into()));
    }

    fn add_option_inner(&self, name: &str, field_id: Option<String>) {
        let Some((state, menu)) = self.ready() else {
            return;
        };
        match self.bind_option(state, menu, name, field_id) {
            Ok(binding) => {
                debug!(category = "bridge", property = name, control = %binding.control, "option registered");
                self.bindings.lock().push(binding);
            }
            Err(err) => error!(category = "bridge", property = name, "option skipped: {}", err),
        }
    }

    fn bind_option(
        &self,
        state: &BridgeState<C>,
        menu: &dyn ConfigMenu,
        name: &str,
        field_id: Option<String>,
    ) -> Result<PropertyBinding> {
        let accessor = self.reflector.accessor(&state.config, name)?;
        let kind = accessor.value_kind()?;
        let control = control_for(kind);

        let title = state.translations.provider(name, "Name", name);
        let description = state.translations.provider(name, "Description", "");
        let manifest = &state.manifest;
        let id = field_id.clone();

        match control {
            ControlKind::Checkbox => {
                menu.add_bool_option(manifest, option_spec(&accessor, control, title, description, id)?)
            }
            ControlKind::IntegerField => {
                menu.add_int_option(manifest, option_spec(&accessor, control, title, description, id)?)
            }
            ControlKind::FloatField => {
                menu.add_float_option(manifest, option_spec(&accessor, control, title, description, id)?)
            }
            ControlKind::TextField => {
                menu.add_text_option(manifest, option_spec(&accessor, control, title, description, id)?)
            }
            ControlKind::KeybindPicker => menu
                .add_keybind_option(manifest, option_spec(&accessor, control, title, description, id)?),
            ControlKind::KeybindListPicker => menu.add_keybind_list_option(
                manifest,
                option_spec(&accessor, control, title, description, id)?,
            ),
        }

        Ok(PropertyBinding {
            property: name.to_string(),
            kind,
            control,
            field_id,
        })
    }

    /// Add a section heading; `tooltip` names a `.Description` key
    pub fn add_section_title(&self, title: &str, tooltip: Option<&str>) {
        let Some((state, menu)) = self.ready() else {
            return;
        };
        let text = state.translations.provider(title, "Title", title);
        let tooltip = tooltip.map(|key| state.translations.provider(key, "Description", key));
        menu.add_section_title(&state.manifest, text, tooltip);
    }

    /// Add a link to the page `name`, shown as `> Title`
    pub fn add_page_link(&self, name: &str, tooltip: Option<&str>) {
        let Some((state, menu)) = self.ready() else {
            return;
        };
        let title = state.translations.provider(name, "Title", name);
        let text: TextProvider = Arc::new(move || format!("> {}", title()));
        let tooltip = tooltip.map(|key| state.translations.provider(key, "Description", key));
        menu.add_page_link(&state.manifest, name, text, tooltip);
    }

    /// Start the page `name`
    pub fn add_page(&self, name: &str) {
        let Some((state, menu)) = self.ready() else {
            return;
        };
        let title = state.translations.provider(name, "Title", name);
        menu.add_page(&state.manifest, name, title);
    }

    /// Add a label-plus-button row drawn by the presenter
    pub fn add_button_option(&self, spec: ButtonSpec) {
        let Some((state, menu)) = self.ready() else {
            return;
        };
        let Some(presenter) = state.presenter.clone() else {
            warn!(category = "bridge", button = %spec.left, "button skipped: no presenter attached");
            return;
        };

        let t = &state.translations;
        let left_key = spec.left.as_str();
        let right_key = spec.right.as_deref().unwrap_or(left_key);
        let description_key = spec.description.as_deref().unwrap_or(left_key);
        let hover_key = spec.hover.as_deref().unwrap_or(left_key);

        let left = t.provider(left_key, "Title", left_key);
        let field_id = spec.field_id.clone().unwrap_or_else(|| left());
        let button = Arc::new(ButtonOption {
            left,
            right: t.provider(right_key, "Button", right_key),
            description: t.provider(description_key, "Description", description_key),
            hover: t.provider(hover_key, "Hover", hover_key),
            render_left: spec.render_left,
            render_right: spec.render_right,
            field_id,
        });

        let draw: DrawFn = {
            let button = Arc::clone(&button);
            let presenter = Arc::clone(&presenter);
            let frame = Arc::clone(&self.frame);
            Arc::new(move |surface: &dyn Any, at: Point| {
                frame.apply(button.draw(presenter.as_ref(), surface, at));
            })
        };
        let height: Arc<dyn Fn() -> f32 + Send + Sync> = {
            let button = Arc::clone(&button);
            Arc::new(move || button.height(presenter.as_ref()))
        };

        menu.add_complex_option(
            &state.manifest,
            ComplexOption {
                name: Arc::new(String::new),
                draw,
                height: Some(height),
                before_menu_opened: None,
                before_save: None,
                after_reset: spec.after_reset,
                field_id: spec.field_id,
            },
        );
    }

    /// Add a horizontal rule drawn by the presenter
    pub fn add_horizontal_separator(&self) {
        let Some((state, menu)) = self.ready() else {
            return;
        };
        let Some(presenter) = state.presenter.clone() else {
            warn!(category = "bridge", "separator skipped: no presenter attached");
            return;
        };
        let draw: DrawFn = Arc::new(move |surface: &dyn Any, at: Point| {
            presenter.draw_separator(surface, at);
        });
        menu.add_complex_option(
            &state.manifest,
            ComplexOption {
                name: Arc::new(String::new),
                draw,
                height: None,
                before_menu_opened: None,
                before_save: None,
                after_reset: None,
                field_id: None,
            },
        );
    }

    /// Forward the menu's own field-changed notifications to `callback`
    ///
    /// These fire only for menu edits of fields this bridge registered; use
    /// [`reflector`](Self::reflector) to observe every write.
    pub fn on_field_changed<F>(&self, callback: F)
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        let Some((state, menu)) = self.ready() else {
            return;
        };
        menu.on_field_changed(&state.manifest, Arc::new(callback));
    }

    /// Run `callback` whenever a button option is clicked
    pub fn on_button_clicked<F>(&self, callback: F)
    where
        F: Fn(&ButtonClick) + Send + Sync + 'static,
    {
        self.frame.clicks.write().push(Arc::new(callback));
    }

    /// Reset the properties tagged `category`, then save
    pub fn reset_category(&self, category: &str) -> Option<ResetReport> {
        let (state, _) = self.ready()?;
        let save = Arc::clone(&state.save);
        Some(
            self.reflector
                .reset_to_defaults(&state.config, Some(category), || save()),
        )
    }

    /// Take the tooltip requested by the last drawn button
    ///
    /// The tooltip patch does this after every menu draw; hosts without
    /// interception can call it themselves.
    pub fn take_tooltip(&self) -> Option<Tooltip> {
        self.frame.take_tooltip()
    }

    /// The menu page currently open, once the page-capture patch has fired
    pub fn current_page(&self) -> Option<String> {
        self.frame
            .page
            .read()
            .as_ref()
            .and_then(|page| page.current.clone())
    }

    /// Open the menu page `page_id`; `false` if no page opener was captured
    pub fn open_page(&self, page_id: &str) -> bool {
        let opener = self
            .frame
            .page
            .read()
            .as_ref()
            .and_then(|page| page.opener.clone());
        match opener {
            Some(open) => {
                open(page_id);
                true
            }
            None => {
                debug!(category = "bridge", page = page_id, "no page opener captured");
                false
            }
        }
    }
}

/// Getter/setter pair for `control`; the property must be declared exactly `T`
fn option_spec<C, T>(
    accessor: &Accessor<C>,
    control: ControlKind,
    name: TextProvider,
    description: TextProvider,
    field_id: Option<String>,
) -> Result<OptionSpec<T>>
where
    C: Configurable,
    T: ConfigValue + Default,
{
    let expected = T::declared_type();
    if *accessor.declared_type() != expected {
        return Err(BridgeError::ControlMismatch {
            property: accessor.name().to_string(),
            declared: accessor.declared_type().to_string(),
            control,
            expected: expected.to_string(),
        });
    }

    let reader = accessor.clone();
    let writer = accessor.clone();
    Ok(OptionSpec {
        getter: Arc::new(move || {
            reader.read_as::<T>().unwrap_or_else(|err| {
                trace!(category = "bridge", "{}", err);
                T::default()
            })
        }),
        setter: Arc::new(move |value: T| {
            if let Err(err) = writer.write(value.to_value()) {
                warn!(category = "bridge", property = %writer.name(), "value rejected: {}", err);
            }
        }),
        name,
        description,
        field_id,
    })
}

fn persist<C>(store: Option<&dyn ConfigStore<C>>, config: &SharedConfig<C>) {
    match store {
        Some(store) => {
            if let Err(err) = store.write_config(&config.read()) {
                error!(category = "bridge", "saving config failed: {:#}", err);
            }
        }
        None => debug!(category = "bridge", "no config store attached; save skipped"),
    }
}

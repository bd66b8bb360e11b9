use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const MIN_SPEED: f64 = 1.0;
pub const MAX_SPEED: f64 = 10.0;
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 2.0;

/// Where the pet is allowed to move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PetMode {
    /// Top band of every display except the primary one.
    SecondaryOnly,
    /// Top band spanning all displays.
    #[default]
    CrossScreen,
    /// The whole union of all displays.
    FreeRoam,
}

impl PetMode {
    pub fn is_band(self) -> bool {
        !matches!(self, Self::FreeRoam)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PetType {
    #[default]
    Dragon,
    NyanCat,
    Ghost,
}

impl PetType {
    pub const ALL: [PetType; 3] = [PetType::Dragon, PetType::NyanCat, PetType::Ghost];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub pet_type: PetType,
    #[serde(default, deserialize_with = "lenient")]
    pub mode: PetMode,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// When enabled the logger is initialised at debug level and honours
    /// `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional log file; stdout only when absent.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_speed() -> f64 {
    3.0
}

fn default_scale() -> f64 {
    1.0
}

impl Default for PetSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            pet_type: PetType::default(),
            mode: PetMode::default(),
            speed: default_speed(),
            scale: default_scale(),
            debug_logging: false,
            log_file: None,
        }
    }
}

/// Falls back to the default variant for unknown identifiers instead of
/// rejecting the whole file.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Ok(parsed),
        Err(_) => {
            tracing::warn!(%value, "unknown settings value; using default");
            Ok(T::default())
        }
    }
}

impl PetSettings {
    pub fn sanitize(&mut self) {
        self.speed = clamp_or(self.speed, MIN_SPEED, MAX_SPEED, default_speed());
        self.scale = clamp_or(self.scale, MIN_SCALE, MAX_SCALE, default_scale());
    }

    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    /// One entry per field the pet runtime reacts to.
    pub fn changes_from(&self, previous: &PetSettings) -> Vec<SettingsChange> {
        let mut changes = Vec::new();
        if self.enabled != previous.enabled {
            changes.push(SettingsChange::Enabled(self.enabled));
        }
        if self.pet_type != previous.pet_type {
            changes.push(SettingsChange::PetType(self.pet_type));
        }
        if self.mode != previous.mode {
            changes.push(SettingsChange::Mode(self.mode));
        }
        if self.speed != previous.speed {
            changes.push(SettingsChange::Speed(self.speed));
        }
        if self.scale != previous.scale {
            changes.push(SettingsChange::Scale(self.scale));
        }
        changes
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    Enabled(bool),
    PetType(PetType),
    Mode(PetMode),
    Speed(f64),
    Scale(f64),
}

type Listener = Box<dyn Fn(SettingsChange) + Send>;

/// Publish point for the settings collaborator. Readers take a consistent
/// snapshot; writers notify every listener once per changed field.
#[derive(Clone, Default)]
pub struct SharedSettings {
    current: Arc<Mutex<PetSettings>>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl SharedSettings {
    pub fn new(settings: PetSettings) -> Self {
        Self {
            current: Arc::new(Mutex::new(settings.sanitized())),
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn snapshot(&self) -> PetSettings {
        self.current
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(SettingsChange) + Send + 'static,
    {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(listener));
        }
    }

    pub fn publish(&self, settings: PetSettings) -> Vec<SettingsChange> {
        let settings = settings.sanitized();
        let changes = {
            let Ok(mut current) = self.current.lock() else {
                return Vec::new();
            };
            let changes = settings.changes_from(&current);
            *current = settings;
            changes
        };
        if let Ok(listeners) = self.listeners.lock() {
            for change in &changes {
                for listener in listeners.iter() {
                    listener(*change);
                }
            }
        }
        changes
    }

    pub fn update<F>(&self, edit: F) -> Vec<SettingsChange>
    where
        F: FnOnce(&mut PetSettings),
    {
        let mut next = self.snapshot();
        edit(&mut next);
        self.publish(next)
    }
}

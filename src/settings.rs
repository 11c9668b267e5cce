//! Driver-specific settings attached to generic domain objects
//!
//! A source or beamline component knows nothing about any simulation code.
//! Each driver instance gets a [`DriverId`], and a domain object may carry
//! one settings payload per driver id. When a driver asks for settings that
//! were never attached, it receives its own default payload instead.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

static NEXT_DRIVER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one driver instance.
///
/// Two drivers of the same type get different ids, so the same lens can be
/// configured independently for each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId(u64);

impl DriverId {
    /// Issue a fresh, process-unique id
    pub fn next() -> Self {
        DriverId(NEXT_DRIVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver#{}", self.0)
    }
}

/// Anything that can key a settings lookup.
pub trait DriverIdentity {
    fn driver_id(&self) -> DriverId;
}

impl DriverIdentity for DriverId {
    fn driver_id(&self) -> DriverId {
        *self
    }
}

/// An engine-specific configuration payload.
pub trait DriverSettings: fmt::Debug + Send + Sync + 'static {
    /// Flatten into the positional parameter list the engine expects
    fn to_parameter_list(&self) -> Vec<f64>;

    fn as_any(&self) -> &dyn Any;

    fn clone_box(&self) -> Box<dyn DriverSettings>;
}

/// Typed lookup found a payload of another type under the driver's id
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{driver} has settings {found} attached, expected {expected}")]
pub struct SettingsError {
    pub driver: DriverId,
    pub expected: &'static str,
    pub found: String,
}

/// Per-object map from driver identity to settings payload
#[derive(Default)]
pub struct SettingsBag {
    entries: HashMap<DriverId, Box<dyn DriverSettings>>,
}

impl SettingsBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a payload for `driver`, replacing any previous one
    pub fn insert(&mut self, driver: DriverId, settings: Box<dyn DriverSettings>) {
        self.entries.insert(driver, settings);
    }

    pub fn remove(&mut self, driver: DriverId) -> Option<Box<dyn DriverSettings>> {
        self.entries.remove(&driver)
    }

    pub fn contains(&self, driver: DriverId) -> bool {
        self.entries.contains_key(&driver)
    }

    pub fn get(&self, driver: DriverId) -> Option<&dyn DriverSettings> {
        self.entries.get(&driver).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payload of type `S` for `driver`, or `S::default()` when nothing is attached
    pub fn resolve<S>(&self, driver: DriverId) -> Result<S, SettingsError>
    where
        S: DriverSettings + Default + Clone,
    {
        match self.get(driver) {
            Some(payload) => payload
                .as_any()
                .downcast_ref::<S>()
                .cloned()
                .ok_or_else(|| SettingsError {
                    driver,
                    expected: std::any::type_name::<S>(),
                    found: format!("{:?}", payload),
                }),
            None => Ok(S::default()),
        }
    }

    /// Parameter list of whatever payload is attached for `driver`, or of `S::default()`
    pub fn parameter_list<S>(&self, driver: DriverId) -> Vec<f64>
    where
        S: DriverSettings + Default,
    {
        match self.get(driver) {
            Some(payload) => payload.to_parameter_list(),
            None => S::default().to_parameter_list(),
        }
    }
}

impl Clone for SettingsBag {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(id, settings)| (*id, settings.clone_box()))
                .collect(),
        }
    }
}

impl fmt::Debug for SettingsBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Domain objects that can carry driver settings
pub trait HasSettings {
    fn settings_bag(&self) -> &SettingsBag;

    fn settings_bag_mut(&mut self) -> &mut SettingsBag;

    fn has_settings<D: DriverIdentity + ?Sized>(&self, driver: &D) -> bool {
        self.settings_bag().contains(driver.driver_id())
    }

    /// Settings for `driver`, or that driver's defaults if none were attached
    fn settings<S, D>(&self, driver: &D) -> Result<S, SettingsError>
    where
        S: DriverSettings + Default + Clone,
        D: DriverIdentity + ?Sized,
    {
        self.settings_bag().resolve(driver.driver_id())
    }

    /// Engine parameter list for `driver`; `S` supplies the defaults
    fn settings_parameters<S, D>(&self, driver: &D) -> Vec<f64>
    where
        S: DriverSettings + Default,
        D: DriverIdentity + ?Sized,
    {
        self.settings_bag().parameter_list::<S>(driver.driver_id())
    }

    fn add_settings<S, D>(&mut self, driver: &D, settings: S)
    where
        S: DriverSettings,
        D: DriverIdentity + ?Sized,
    {
        self.settings_bag_mut()
            .insert(driver.driver_id(), Box::new(settings));
    }
}

/// Implement the `as_any`/`clone_box` plumbing of [`DriverSettings`]
#[macro_export]
macro_rules! settings_boilerplate {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn clone_box(&self) -> Box<dyn $crate::settings::DriverSettings> {
            Box::new(self.clone())
        }
    };
}

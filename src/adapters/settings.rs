//! Settings store adapter.
//!
//! Implements [`ConfigPort`] — read side only.  The settings task owns
//! writes; this component is told about them via `ConfigurationChanged`.
//!
//! The configuration travels as a postcard blob under a single NVS key.
//!
//! - **`target_os = "espidf"`** — NVS namespace `clocksync`, key `synccfg`.
//!   Atomicity comes from `nvs_commit` in the owning task.
//! - **all other targets** — an in-memory map with a `store` helper so host
//!   tests can script configuration changes.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SyncConfig;

#[cfg(not(target_os = "espidf"))]
use std::cell::RefCell;
#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "clocksync";
const CONFIG_KEY: &str = "synccfg";

pub struct SettingsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl SettingsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase run from the single
            // main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("settings: erasing and re-initialising NVS flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("settings: NVS backend, namespace '{CONFIG_NAMESPACE}'");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("settings: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: RefCell::new(HashMap::new()),
        })
    }

    /// Write a configuration into the simulated store.  Host tests use this
    /// to play the settings task before posting `ConfigurationChanged`.
    #[cfg(not(target_os = "espidf"))]
    pub fn store(&self, config: &SyncConfig) {
        let bytes = postcard::to_allocvec(config).unwrap_or_default();
        self.store
            .borrow_mut()
            .insert(format!("{CONFIG_NAMESPACE}::{CONFIG_KEY}"), bytes);
    }

    /// Corrupt the stored blob (host tests of the error path).
    /// One byte is too short for the two-field config, so decode fails.
    #[cfg(not(target_os = "espidf"))]
    pub fn store_garbage(&self) {
        self.store
            .borrow_mut()
            .insert(format!("{CONFIG_NAMESPACE}::{CONFIG_KEY}"), vec![0xFF]);
    }

    /// Open the NVS namespace read-only, run `f`, close the handle.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = CONFIG_NAMESPACE.as_bytes();
        ns_buf[..ns_bytes.len()].copy_from_slice(ns_bytes);

        let mut handle: nvs_handle_t = 0;
        let ret =
            unsafe { nvs_open(ns_buf.as_ptr().cast(), nvs_open_mode_t_NVS_READONLY, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

impl ConfigPort for SettingsAdapter {
    #[cfg(target_os = "espidf")]
    fn load(&self) -> Result<SyncConfig, ConfigError> {
        let mut key_buf = [0u8; 16];
        key_buf[..CONFIG_KEY.len()].copy_from_slice(CONFIG_KEY.as_bytes());

        let blob = Self::with_nvs_handle(|handle| {
            let mut len: usize = 0;
            let ret =
                unsafe { nvs_get_blob(handle, key_buf.as_ptr().cast(), core::ptr::null_mut(), &mut len) };
            if ret == ESP_ERR_NVS_NOT_FOUND {
                return Ok(None);
            }
            if ret != ESP_OK {
                return Err(ret);
            }
            let mut buf = vec![0u8; len];
            let ret =
                unsafe { nvs_get_blob(handle, key_buf.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut len) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(Some(buf))
        })
        .map_err(|_| ConfigError::IoError)?;

        match blob {
            Some(bytes) => postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted),
            None => Ok(SyncConfig::default()),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn load(&self) -> Result<SyncConfig, ConfigError> {
        match self
            .store
            .borrow()
            .get(&format!("{CONFIG_NAMESPACE}::{CONFIG_KEY}"))
        {
            Some(bytes) => postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted),
            None => Ok(SyncConfig::default()),
        }
    }
}

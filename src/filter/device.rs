use std::sync::{Arc, Mutex};

use log::{info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::error::{DenoiseError, ErrorKind};

pub struct DeviceConfig {
    pub num_threads: usize,
}

impl DeviceConfig {
    pub fn build(self) -> Result<Self, DenoiseError> {
        if self.num_threads == 0 {
            return Err(DenoiseError::config("Device needs at least one thread"));
        }

        Ok(self)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
        }
    }
}

/// Worker pool shared by every filter created on it, plus the error slot
/// filters report into.
pub struct Device {
    pool: ThreadPool,
    error: Mutex<Option<(ErrorKind, String)>>,
}

impl Device {
    pub fn new() -> Result<Arc<Self>, DenoiseError> {
        Self::new_with(DeviceConfig::default())
    }

    pub fn new_with(config: DeviceConfig) -> Result<Arc<Self>, DenoiseError> {
        let config = config.build()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(|i| format!("rt-denoise-{}", i))
            .build()?;

        info!("Device created with {} threads", config.num_threads);

        Ok(Arc::new(Self {
            pool,
            error: Mutex::new(None),
        }))
    }

    /// Returns and clears the first error recorded since the last call.
    pub fn get_error(&self) -> Option<(ErrorKind, String)> {
        match self.error.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    // Later errors are logged but do not overwrite an unread one
    pub(crate) fn set_error(&self, err: &DenoiseError) {
        warn!("{}", err);

        let mut slot = match self.error.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_none() {
            *slot = Some((err.kind(), err.to_string()));
        }
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` inside the device pool so nested rayon work uses its threads.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

//! Config storage in an NVS blob.
//!
//! NVS has no byte-addressed cells, so the record is cached in RAM: reads
//! and writes hit the cache, and `flush()` commits the whole record as one
//! blob. A missing blob reads as erased memory (`0xFF`), which the config
//! store rejects and replaces with defaults on first boot.

use core::fmt;

use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::EspError;

use crate::config::CONFIG_RECORD_SIZE;
use crate::traits::ConfigStorage;

const NAMESPACE: &str = "radial";
const KEY: &str = "config";

/// Storage failure.
#[derive(Debug)]
pub enum Esp32StorageError {
    /// Address outside the cached record.
    OutOfRange(u16),
    /// NVS rejected the operation.
    Nvs(EspError),
}

impl fmt::Display for Esp32StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Esp32StorageError::OutOfRange(addr) => write!(f, "address {} out of range", addr),
            Esp32StorageError::Nvs(e) => write!(f, "nvs: {}", e),
        }
    }
}

impl std::error::Error for Esp32StorageError {}

impl From<EspError> for Esp32StorageError {
    fn from(e: EspError) -> Self {
        Esp32StorageError::Nvs(e)
    }
}

/// The config record in NVS namespace `radial`, key `config`.
///
/// # Example
///
/// ```ignore
/// use esp_idf_svc::nvs::EspDefaultNvsPartition;
/// use radial_dial::config::ConfigStore;
/// use radial_dial::hal::esp32::Esp32Storage;
///
/// let nvs = EspDefaultNvsPartition::take()?;
/// let mut store = ConfigStore::new(Esp32Storage::new(nvs)?);
/// store.load()?;
/// ```
pub struct Esp32Storage {
    nvs: EspNvs<NvsDefault>,
    cache: [u8; CONFIG_RECORD_SIZE],
    dirty: bool,
}

impl Esp32Storage {
    /// Open the namespace and cache the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be opened or read.
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, Esp32StorageError> {
        let nvs = EspNvs::new(partition, NAMESPACE, true)?;
        let mut cache = [0xFF; CONFIG_RECORD_SIZE];
        let mut buf = [0u8; CONFIG_RECORD_SIZE];
        match nvs.get_raw(KEY, &mut buf)? {
            Some(stored) if stored.len() == CONFIG_RECORD_SIZE => cache.copy_from_slice(stored),
            Some(stored) => log::warn!("nvs config blob has {} bytes, ignoring", stored.len()),
            None => log::info!("no config in nvs"),
        }
        Ok(Self {
            nvs,
            cache,
            dirty: false,
        })
    }

    fn index(addr: u16) -> Result<usize, Esp32StorageError> {
        let index = usize::from(addr);
        if index < CONFIG_RECORD_SIZE {
            Ok(index)
        } else {
            Err(Esp32StorageError::OutOfRange(addr))
        }
    }
}

impl ConfigStorage for Esp32Storage {
    type Error = Esp32StorageError;

    fn read_byte(&mut self, addr: u16) -> Result<u8, Esp32StorageError> {
        Ok(self.cache[Self::index(addr)?])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Esp32StorageError> {
        let index = Self::index(addr)?;
        if self.cache[index] != value {
            self.cache[index] = value;
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Esp32StorageError> {
        if self.dirty {
            self.nvs.set_raw(KEY, &self.cache)?;
            self.dirty = false;
        }
        Ok(())
    }
}

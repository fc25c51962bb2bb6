//! Device persistence store.
//!
//! The controller only ever sees string keys and string values through
//! [`DeviceStore`]. Two backends ship with the crate:
//!
//! - [`MemoryDeviceStore`]: process-local map, used by tests and previews
//! - [`FileDeviceStore`]: JSON file under the storage root, survives restarts
//!
//! # Keys
//!
//! | Key | Values |
//! |---|---|
//! | `illora-logged-in` | `"true"` / absent |
//! | `illora-guest-status` | `"true"` / `"false"` / absent |

mod file;
mod memory;

pub use file::FileDeviceStore;
pub use memory::MemoryDeviceStore;

use crate::error::StoreError;

/// Remembers an authenticated session on this device.
pub const LOGGED_IN_KEY: &str = "illora-logged-in";
/// Last known on-property presence flag.
pub const GUEST_STATUS_KEY: &str = "illora-guest-status";

pub const TRUE_VALUE: &str = "true";
pub const FALSE_VALUE: &str = "false";

/// Device-scoped key-value storage.
///
/// Implementations are synchronous. A missing key is `Ok(None)`, never an error.
pub trait DeviceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub(crate) fn encode_flag(flag: bool) -> &'static str {
    if flag {
        TRUE_VALUE
    } else {
        FALSE_VALUE
    }
}

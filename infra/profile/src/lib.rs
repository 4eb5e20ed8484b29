//! File-backed simulated device.
//!
//! A [`DeviceProfile`] describes a device in TOML: the calling application's package name,
//! its flag values, installed packages, intent activities and resources. [`Device`] turns a
//! profile into a value that implements every `devcfg-flags` collaborator, so a resolver can
//! run against it outside of tests.
//!
//! Environment variables override the file with the `DEVCFG__` prefix and `__` as the nesting
//! separator (`DEVCFG__FLAGS__CONNECTIVITY__EXPERIMENT_FLAG=30`).

mod device;
mod error;
mod model;

pub use device::Device;
pub use error::{ProfileError, ProfileErrorExt};
pub use model::{ActivityEntry, DeviceProfile, PackageEntry, ResourceEntry};

//! Raw FFI surface of the RailDriver controller interface DLL.
//!
//! The vendor distributes `RailDriver64.dll` (or `RailDriver.dll` on 32-bit
//! installs) inside the simulator's `plugins` directory, with no headers and
//! no import library. All symbols are therefore resolved at runtime from a
//! caller-supplied path. This crate only declares the C signatures and loads
//! them; marshalling and any policy live in the consuming crate.
//!
//! String-returning entry points hand back pointers into memory owned by the
//! DLL; the pointers are only valid until the next call into the library and
//! must be copied out immediately. A null pointer means "no data".

use std::ffi::{c_char, c_float, c_int};
use std::path::Path;

use libloading::Library;

/// `GetControllerValue` mode selector: the controller's live value.
pub const VALUE_CURRENT: c_int = 0;
/// `GetControllerValue` mode selector: the controller's minimum bound.
pub const VALUE_MIN: c_int = 1;
/// `GetControllerValue` mode selector: the controller's maximum bound.
pub const VALUE_MAX: c_int = 2;

/// `GetControllerList() -> "Name1::Name2::..."`.
pub type GetControllerListFn = unsafe extern "C" fn() -> *const c_char;
/// `GetControllerValue(controller_id, mode)`.
pub type GetControllerValueFn = unsafe extern "C" fn(c_int, c_int) -> c_float;
/// `SetControllerValue(controller_id, value)`.
pub type SetControllerValueFn = unsafe extern "C" fn(c_int, c_float);
/// `GetLocoName()`.
pub type GetLocoNameFn = unsafe extern "C" fn() -> *const c_char;
/// `SetLocoName(name)`.
pub type SetLocoNameFn = unsafe extern "C" fn(*const c_char);
/// Signature shared by the parameterless integer queries.
pub type GetIntFn = unsafe extern "C" fn() -> c_int;
/// Signature shared by the parameterless float queries.
pub type GetFloatFn = unsafe extern "C" fn() -> c_float;
/// `SetRailDriverConnected(flag)`.
pub type SetConnectedFn = unsafe extern "C" fn(c_int);

/// Handle to a loaded RailDriver library with every exported entry point
/// resolved.
///
/// The function pointers stay valid for as long as the owning `RailDriverDll`
/// is alive, since it keeps the underlying [`Library`] mapped.
pub struct RailDriverDll {
    pub get_controller_list: GetControllerListFn,
    pub get_controller_value: GetControllerValueFn,
    pub set_controller_value: SetControllerValueFn,
    pub get_current_controller_value: GetFloatFn,
    pub get_loco_name: GetLocoNameFn,
    pub set_loco_name: SetLocoNameFn,
    pub get_rail_driver_connected: GetIntFn,
    pub set_rail_driver_connected: SetConnectedFn,
    pub get_rail_sim_connected: GetIntFn,
    pub get_rail_sim_combined_throttle_brake: GetFloatFn,
    pub get_rail_sim_value: GetFloatFn,
    pub get_rail_driver_value: GetFloatFn,
    pub get_rail_sim_loco_changed: GetIntFn,
    pub is_loco_set: GetIntFn,
    pub get_rail_driver_get_id: GetIntFn,
    pub get_rail_driver_get_type: GetIntFn,
    pub get_next_rail_driver_id: GetIntFn,
    // Keep the library mapped; dropped last.
    _lib: Library,
}

impl RailDriverDll {
    /// Loads the DLL from `path` and resolves every entry point.
    ///
    /// Fails if the library cannot be mapped or any symbol is missing.
    ///
    /// # Safety
    ///
    /// Inherits the safety contract of [`Library::new`]: loading a foreign
    /// library runs its initialization routines.
    pub unsafe fn load(path: &Path) -> Result<Self, libloading::Error> {
        let lib = Library::new(path)?;

        macro_rules! symbol {
            ($name:literal, $ty:ty) => {
                *lib.get::<$ty>($name)?
            };
        }

        let dll = Self {
            get_controller_list: symbol!(b"GetControllerList\0", GetControllerListFn),
            get_controller_value: symbol!(b"GetControllerValue\0", GetControllerValueFn),
            set_controller_value: symbol!(b"SetControllerValue\0", SetControllerValueFn),
            get_current_controller_value: symbol!(b"GetCurrentControllerValue\0", GetFloatFn),
            get_loco_name: symbol!(b"GetLocoName\0", GetLocoNameFn),
            set_loco_name: symbol!(b"SetLocoName\0", SetLocoNameFn),
            get_rail_driver_connected: symbol!(b"GetRailDriverConnected\0", GetIntFn),
            set_rail_driver_connected: symbol!(b"SetRailDriverConnected\0", SetConnectedFn),
            get_rail_sim_connected: symbol!(b"GetRailSimConnected\0", GetIntFn),
            get_rail_sim_combined_throttle_brake: symbol!(
                b"GetRailSimCombinedThrottleBrake\0",
                GetFloatFn
            ),
            get_rail_sim_value: symbol!(b"GetRailSimValue\0", GetFloatFn),
            get_rail_driver_value: symbol!(b"GetRailDriverValue\0", GetFloatFn),
            get_rail_sim_loco_changed: symbol!(b"GetRailSimLocoChanged\0", GetIntFn),
            is_loco_set: symbol!(b"IsLocoSet\0", GetIntFn),
            get_rail_driver_get_id: symbol!(b"GetRailDriverGetId\0", GetIntFn),
            get_rail_driver_get_type: symbol!(b"GetRailDriverGetType\0", GetIntFn),
            get_next_rail_driver_id: symbol!(b"GetNextRailDriverId\0", GetIntFn),
            _lib: lib,
        };

        Ok(dll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reports_missing_library() {
        let result = unsafe { RailDriverDll::load(Path::new("/nonexistent/RailDriver64.dll")) };
        assert!(result.is_err());
    }
}

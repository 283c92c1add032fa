//! Safe pass-through wrapper over the loaded vendor DLL.
#![allow(unsafe_code)]

use std::ffi::{c_char, CStr, CString};
use std::path::Path;

use log::{debug, info};
use raildriver_sys::RailDriverDll;

use crate::core::{LocoSetState, RailDriver, ValueMode};
use crate::error::{AppResult, DashError};

use super::split_controller_list;

/// Driver backed by the real RailDriver library.
///
/// Every method is a single call into the DLL. Failures are not observable
/// at this boundary: a null string pointer marshals to an empty string, and
/// numeric reads return whatever the library reports (0 when it has no
/// data).
pub struct NativeDriver {
    dll: RailDriverDll,
}

impl std::fmt::Debug for NativeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeDriver").finish_non_exhaustive()
    }
}

impl NativeDriver {
    /// Loads the vendor library from `path` and resolves its entry points.
    pub fn load(path: &Path) -> AppResult<Self> {
        let dll = unsafe { RailDriverDll::load(path) }.map_err(|e| {
            DashError::Driver(format!("failed to load '{}': {e}", path.display()))
        })?;
        info!("Loaded RailDriver library from {}", path.display());
        Ok(Self { dll })
    }

    /// Copies a library-owned C string out immediately; null reads as "".
    fn marshal_string(ptr: *const c_char) -> String {
        if ptr.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

impl RailDriver for NativeDriver {
    fn set_connected(&mut self, connected: bool) {
        unsafe { (self.dll.set_rail_driver_connected)(i32::from(connected)) }
    }

    fn driver_connected(&mut self) -> bool {
        unsafe { (self.dll.get_rail_driver_connected)() == 1 }
    }

    fn sim_connected(&mut self) -> bool {
        unsafe { (self.dll.get_rail_sim_connected)() == 1 }
    }

    fn loco_name(&mut self) -> String {
        Self::marshal_string(unsafe { (self.dll.get_loco_name)() })
    }

    fn set_loco_name(&mut self, name: &str) {
        let Ok(name) = CString::new(name) else {
            // An interior NUL cannot cross the C boundary; drop the write.
            debug!("Discarding locomotive name with embedded NUL");
            return;
        };
        unsafe { (self.dll.set_loco_name)(name.as_ptr()) }
    }

    fn controller_names(&mut self) -> Vec<String> {
        let blob = Self::marshal_string(unsafe { (self.dll.get_controller_list)() });
        split_controller_list(&blob)
    }

    fn controller_value(&mut self, id: i32, mode: ValueMode) -> f32 {
        unsafe { (self.dll.get_controller_value)(id, mode.raw()) }
    }

    fn set_controller_value(&mut self, id: i32, value: f32) {
        unsafe { (self.dll.set_controller_value)(id, value) }
    }

    fn current_controller_value(&mut self) -> f32 {
        unsafe { (self.dll.get_current_controller_value)() }
    }

    fn driver_value(&mut self) -> f32 {
        unsafe { (self.dll.get_rail_driver_value)() }
    }

    fn combined_throttle_brake(&mut self) -> f32 {
        unsafe { (self.dll.get_rail_sim_combined_throttle_brake)() }
    }

    fn sim_value(&mut self) -> f32 {
        unsafe { (self.dll.get_rail_sim_value)() }
    }

    fn loco_changed(&mut self) -> bool {
        unsafe { (self.dll.get_rail_sim_loco_changed)() == 1 }
    }

    fn loco_set(&mut self) -> LocoSetState {
        LocoSetState::from_raw(unsafe { (self.dll.is_loco_set)() })
    }

    fn device_id(&mut self) -> i32 {
        unsafe { (self.dll.get_rail_driver_get_id)() }
    }

    fn device_type(&mut self) -> i32 {
        unsafe { (self.dll.get_rail_driver_get_type)() }
    }

    fn next_device_id(&mut self) -> i32 {
        unsafe { (self.dll.get_next_rail_driver_id)() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_library_is_driver_error() {
        let err = NativeDriver::load(Path::new("/nonexistent/RailDriver64.dll")).unwrap_err();
        assert!(matches!(err, DashError::Driver(_)));
    }
}

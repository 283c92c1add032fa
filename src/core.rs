//! Core traits and data types for the dashboard.
//!
//! The central abstraction is the [`RailDriver`] trait: the pass-through
//! surface of the vendor library, expressed with high-level types. Two
//! implementations exist: the native wrapper over the loaded DLL, and a
//! simulated backend used when no hardware install is present (and by the
//! tests).
//!
//! Every read is best-effort: implementations return empty strings and zero
//! values when the library has nothing to report, mirroring the vendor
//! library's own behavior. No read can fail.

use chrono::{DateTime, Local};
use std::fmt;

/// Mode selector for controller value queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueMode {
    /// The controller's live value.
    Current,
    /// The controller's minimum bound.
    Min,
    /// The controller's maximum bound.
    Max,
}

impl ValueMode {
    /// The integer the vendor library expects for this mode.
    pub fn raw(self) -> i32 {
        match self {
            ValueMode::Current => 0,
            ValueMode::Min => 1,
            ValueMode::Max => 2,
        }
    }
}

/// Connection state of one of the two vendor links (driver hardware or
/// simulator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

impl LinkStatus {
    /// Maps the vendor library's integer flag (1 = connected).
    pub fn from_raw(raw: i32) -> Self {
        if raw == 1 {
            LinkStatus::Connected
        } else {
            LinkStatus::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        self == LinkStatus::Connected
    }
}

impl From<bool> for LinkStatus {
    fn from(connected: bool) -> Self {
        if connected {
            LinkStatus::Connected
        } else {
            LinkStatus::Disconnected
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Connected => write!(f, "CONNECTED"),
            LinkStatus::Disconnected => write!(f, "DISCONNECTED"),
        }
    }
}

/// Tri-state answer to "is a locomotive currently set?".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocoSetState {
    Set,
    NotSet,
    /// The library reported neither 0 nor 1.
    Unknown,
}

impl LocoSetState {
    /// Maps the vendor library's tri-state integer (1 = set, 0 = not set).
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => LocoSetState::Set,
            0 => LocoSetState::NotSet,
            _ => LocoSetState::Unknown,
        }
    }
}

impl fmt::Display for LocoSetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocoSetState::Set => write!(f, "TRUE"),
            LocoSetState::NotSet => write!(f, "FALSE"),
            LocoSetState::Unknown => write!(f, "N/A"),
        }
    }
}

/// One named controller channel with its current value and static bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerReading {
    pub name: String,
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

/// A timestamped copy of every displayed field, produced by one polling
/// tick and discarded on the next.
///
/// `controllers` always has the same length and ordering as the controller
/// name list reported by the same tick.
#[derive(Clone, Debug)]
pub struct CabSnapshot {
    pub taken_at: DateTime<Local>,
    pub driver_link: LinkStatus,
    pub sim_link: LinkStatus,
    pub loco_name: String,
    /// Value of the configured watched controller, 0.0 when absent.
    pub watched_value: f32,
    pub current_controller_value: f32,
    pub combined_throttle_brake: f32,
    pub sim_value: f32,
    pub driver_value: f32,
    pub loco_changed: bool,
    pub loco_set: LocoSetState,
    pub device_id: i32,
    pub device_type: i32,
    pub next_device_id: i32,
    pub controllers: Vec<ControllerReading>,
}

impl Default for CabSnapshot {
    fn default() -> Self {
        Self {
            taken_at: Local::now(),
            driver_link: LinkStatus::Disconnected,
            sim_link: LinkStatus::Disconnected,
            loco_name: String::new(),
            watched_value: 0.0,
            current_controller_value: 0.0,
            combined_throttle_brake: 0.0,
            sim_value: 0.0,
            driver_value: 0.0,
            loco_changed: false,
            loco_set: LocoSetState::Unknown,
            device_id: 0,
            device_type: 0,
            next_device_id: 0,
            controllers: Vec::new(),
        }
    }
}

/// Pass-through surface of the RailDriver vendor library.
///
/// All methods take `&mut self`: a driver is an exclusive session handle,
/// polled from a single thread. Reads never fail; when the library has no
/// data they return the empty/zero defaults noted per method.
pub trait RailDriver {
    /// `SetRailDriverConnected`, the keep-alive the vendor library expects
    /// at the top of every polling tick.
    fn set_connected(&mut self, connected: bool);

    /// Whether the driver hardware link is up.
    fn driver_connected(&mut self) -> bool;

    /// Whether the simulator link is up.
    fn sim_connected(&mut self) -> bool;

    /// The active locomotive name; empty when none is reported.
    fn loco_name(&mut self) -> String;

    /// Overwrites the active locomotive name. Fire-and-forget: success is
    /// only observable through a subsequent [`RailDriver::loco_name`].
    fn set_loco_name(&mut self, name: &str);

    /// The controller names in library order; empty when none are reported.
    fn controller_names(&mut self) -> Vec<String>;

    /// A controller's value by index in the current list; 0.0 when out of
    /// range.
    fn controller_value(&mut self, id: i32, mode: ValueMode) -> f32;

    /// Writes a controller's value by index in the current list.
    fn set_controller_value(&mut self, id: i32, value: f32);

    /// Value of the most recently moved controller.
    fn current_controller_value(&mut self) -> f32;

    /// The driver-side reading of the most recently touched input.
    fn driver_value(&mut self) -> f32;

    /// The combined throttle/brake lever reading.
    fn combined_throttle_brake(&mut self) -> f32;

    /// The simulator-side generic current value.
    fn sim_value(&mut self) -> f32;

    /// Whether the locomotive changed since the last check.
    fn loco_changed(&mut self) -> bool;

    /// Whether a locomotive is currently set.
    fn loco_set(&mut self) -> LocoSetState;

    /// The connected device's id.
    fn device_id(&mut self) -> i32;

    /// The connected device's type code.
    fn device_type(&mut self) -> i32;

    /// The id the next attached device would receive.
    fn next_device_id(&mut self) -> i32;

    /// A controller's current value looked up by name in the current list;
    /// 0.0 for an unknown name.
    fn controller_value_by_name(&mut self, name: &str) -> f32 {
        let name = name.trim();
        match self.controller_names().iter().position(|n| n == name) {
            Some(id) => self.controller_value(id as i32, ValueMode::Current),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_status_from_raw() {
        assert_eq!(LinkStatus::from_raw(1), LinkStatus::Connected);
        assert_eq!(LinkStatus::from_raw(0), LinkStatus::Disconnected);
        // Anything other than 1 reads as disconnected.
        assert_eq!(LinkStatus::from_raw(-3), LinkStatus::Disconnected);
    }

    #[test]
    fn test_link_status_display() {
        assert_eq!(LinkStatus::Connected.to_string(), "CONNECTED");
        assert_eq!(LinkStatus::Disconnected.to_string(), "DISCONNECTED");
    }

    #[test]
    fn test_loco_set_state_mapping() {
        assert_eq!(LocoSetState::from_raw(1), LocoSetState::Set);
        assert_eq!(LocoSetState::from_raw(0), LocoSetState::NotSet);
        assert_eq!(LocoSetState::from_raw(-1), LocoSetState::Unknown);
        assert_eq!(LocoSetState::Unknown.to_string(), "N/A");
    }

    #[test]
    fn test_value_mode_raw() {
        assert_eq!(ValueMode::Current.raw(), 0);
        assert_eq!(ValueMode::Min.raw(), 1);
        assert_eq!(ValueMode::Max.raw(), 2);
    }

    #[test]
    fn test_snapshot_default_is_empty() {
        let snapshot = CabSnapshot::default();
        assert!(snapshot.controllers.is_empty());
        assert!(snapshot.loco_name.is_empty());
        assert_eq!(snapshot.loco_set, LocoSetState::Unknown);
    }
}

//! Simulated driver backend.
//!
//! Stands in for the vendor library on machines without a simulator
//! install. Values are generated deterministically (no RNG, so reads are
//! reproducible in tests): the keep-alive call advances a phase counter and
//! animated channels follow slow sine curves, so the dashboard has moving
//! values to show.

use crate::core::{LocoSetState, RailDriver, ValueMode};

struct Channel {
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    animated: bool,
}

impl Channel {
    fn fixed(name: &'static str, value: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            value,
            min,
            max,
            animated: false,
        }
    }

    fn animated(name: &'static str, min: f32, max: f32) -> Self {
        Self {
            name,
            value: min,
            min,
            max,
            animated: true,
        }
    }
}

/// Deterministic in-memory stand-in for the vendor library.
pub struct SimDriver {
    connected: bool,
    loco_name: String,
    channels: Vec<Channel>,
    phase: f32,
    last_touched: Option<usize>,
    loco_changed: bool,
}

impl SimDriver {
    /// A simulated consist with a representative controller set.
    pub fn new() -> Self {
        Self {
            connected: false,
            loco_name: "ES44AC".to_string(),
            channels: vec![
                Channel::animated("SimpleThrottle", 0.0, 1.0),
                Channel::fixed("Reverser", 1.0, -1.0, 1.0),
                Channel::fixed("TrainBrakeControl", 0.0, 0.0, 1.0),
                Channel::fixed("EngineBrakeControl", 0.0, 0.0, 1.0),
                Channel::fixed("DynamicBrake", 0.0, 0.0, 1.0),
                Channel::fixed("Horn", 0.0, 0.0, 1.0),
                Channel::fixed("Bell", 0.0, 0.0, 1.0),
                Channel::fixed("Wipers", 0.0, 0.0, 1.0),
                Channel::fixed("Headlights", 1.0, 0.0, 2.0),
                Channel::animated("SpeedometerMPH", 0.0, 120.0),
            ],
            phase: 0.0,
            last_touched: None,
            loco_changed: false,
        }
    }

    /// A simulator with no locomotive and no controllers, as the vendor
    /// library reports before the simulator publishes a consist.
    pub fn empty() -> Self {
        Self {
            connected: false,
            loco_name: String::new(),
            channels: Vec::new(),
            phase: 0.0,
            last_touched: None,
            loco_changed: false,
        }
    }

    fn advance(&mut self) {
        self.phase += 0.1;
        let phase = self.phase;
        for channel in self.channels.iter_mut().filter(|c| c.animated) {
            let sweep = 0.5 + 0.5 * (phase * 0.2 + channel.max).sin();
            channel.value = channel.min + (channel.max - channel.min) * sweep;
        }
    }

    fn channel(&self, id: i32) -> Option<&Channel> {
        usize::try_from(id).ok().and_then(|id| self.channels.get(id))
    }
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RailDriver for SimDriver {
    fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if connected {
            self.advance();
        }
    }

    fn driver_connected(&mut self) -> bool {
        self.connected
    }

    fn sim_connected(&mut self) -> bool {
        // The simulated "RailWorks" is up whenever a consist exists.
        !self.channels.is_empty()
    }

    fn loco_name(&mut self) -> String {
        self.loco_name.clone()
    }

    fn set_loco_name(&mut self, name: &str) {
        if self.loco_name != name {
            self.loco_changed = true;
        }
        self.loco_name = name.to_string();
    }

    fn controller_names(&mut self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.to_string()).collect()
    }

    fn controller_value(&mut self, id: i32, mode: ValueMode) -> f32 {
        match self.channel(id) {
            Some(channel) => match mode {
                ValueMode::Current => channel.value,
                ValueMode::Min => channel.min,
                ValueMode::Max => channel.max,
            },
            None => 0.0,
        }
    }

    fn set_controller_value(&mut self, id: i32, value: f32) {
        let Some(id) = usize::try_from(id).ok().filter(|&id| id < self.channels.len()) else {
            return;
        };
        let channel = &mut self.channels[id];
        channel.value = value.clamp(channel.min, channel.max);
        // A written channel stops drifting; the operator owns it now.
        channel.animated = false;
        self.last_touched = Some(id);
    }

    fn current_controller_value(&mut self) -> f32 {
        self.last_touched
            .and_then(|id| self.channels.get(id))
            .map_or(0.0, |c| c.value)
    }

    fn driver_value(&mut self) -> f32 {
        self.current_controller_value()
    }

    fn combined_throttle_brake(&mut self) -> f32 {
        let throttle = self.controller_value_by_name("SimpleThrottle");
        let brake = self.controller_value_by_name("TrainBrakeControl");
        throttle - brake
    }

    fn sim_value(&mut self) -> f32 {
        self.channels.first().map_or(0.0, |c| c.value)
    }

    fn loco_changed(&mut self) -> bool {
        // Reads clear the latch: "changed since last check".
        std::mem::take(&mut self.loco_changed)
    }

    fn loco_set(&mut self) -> LocoSetState {
        if self.loco_name.is_empty() {
            LocoSetState::NotSet
        } else {
            LocoSetState::Set
        }
    }

    fn device_id(&mut self) -> i32 {
        210
    }

    fn device_type(&mut self) -> i32 {
        1
    }

    fn next_device_id(&mut self) -> i32 {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_alive_animates_channels() {
        let mut driver = SimDriver::new();
        driver.set_connected(true);
        let first = driver.controller_value_by_name("SpeedometerMPH");
        driver.set_connected(true);
        let second = driver.controller_value_by_name("SpeedometerMPH");
        assert_ne!(first, second);
    }

    #[test]
    fn test_written_value_reads_back_and_pins() {
        let mut driver = SimDriver::new();
        driver.set_controller_value(0, 0.75);
        assert_eq!(driver.controller_value(0, ValueMode::Current), 0.75);
        // The write also becomes the "most recently touched" reading.
        assert_eq!(driver.current_controller_value(), 0.75);
        // Subsequent keep-alives no longer move it.
        driver.set_connected(true);
        assert_eq!(driver.controller_value(0, ValueMode::Current), 0.75);
    }

    #[test]
    fn test_written_value_is_clamped_to_bounds() {
        let mut driver = SimDriver::new();
        driver.set_controller_value(0, 7.0);
        assert_eq!(driver.controller_value(0, ValueMode::Current), 1.0);
    }

    #[test]
    fn test_loco_changed_latch_clears_on_read() {
        let mut driver = SimDriver::new();
        assert!(!driver.loco_changed());
        driver.set_loco_name("SD40-2");
        assert_eq!(driver.loco_name(), "SD40-2");
        assert!(driver.loco_changed());
        assert!(!driver.loco_changed());
    }

    #[test]
    fn test_out_of_range_controller_reads_zero() {
        let mut driver = SimDriver::new();
        assert_eq!(driver.controller_value(99, ValueMode::Current), 0.0);
        assert_eq!(driver.controller_value(-1, ValueMode::Current), 0.0);
    }

    #[test]
    fn test_empty_driver_reports_nothing() {
        let mut driver = SimDriver::empty();
        assert!(driver.controller_names().is_empty());
        assert!(driver.loco_name().is_empty());
        assert_eq!(driver.loco_set(), LocoSetState::NotSet);
        assert!(!driver.sim_connected());
    }
}

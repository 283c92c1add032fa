//! The fixed-interval polling session.
//!
//! One [`Poller`] owns the driver for the process lifetime. The GUI asks
//! [`Poller::poll_due`] once per frame and, when an interval has elapsed,
//! runs [`Poller::tick`] inline on the UI thread: the keep-alive write, then
//! every accessor the vendor library exposes, copied into a fresh
//! [`CabSnapshot`]. Nothing is retained between ticks except the controller
//! list used to cache the static min/max bounds.

use std::time::{Duration, Instant};

use chrono::Local;

use crate::core::{CabSnapshot, ControllerReading, LinkStatus, RailDriver, ValueMode};

/// Polls the driver at a fixed cadence and holds the latest snapshot.
pub struct Poller {
    driver: Box<dyn RailDriver>,
    interval: Duration,
    watched: String,
    last_tick: Option<Instant>,
    known_names: Vec<String>,
    bounds: Vec<(f32, f32)>,
    latest: CabSnapshot,
}

impl Poller {
    pub fn new(driver: Box<dyn RailDriver>, interval: Duration, watched: impl Into<String>) -> Self {
        Self {
            driver,
            interval,
            watched: watched.into(),
            last_tick: None,
            known_names: Vec::new(),
            bounds: Vec::new(),
            latest: CabSnapshot::default(),
        }
    }

    /// Whether a full interval has elapsed since the last tick. Always true
    /// before the first tick.
    pub fn poll_due(&self, now: Instant) -> bool {
        self.last_tick
            .map_or(true, |last| now.duration_since(last) >= self.interval)
    }

    /// Time remaining until the next tick is due; zero when overdue.
    pub fn time_until_due(&self, now: Instant) -> Duration {
        match self.last_tick {
            None => Duration::ZERO,
            Some(last) => (last + self.interval).saturating_duration_since(now),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Name of the controller polled by name each tick.
    pub fn watched(&self) -> &str {
        &self.watched
    }

    /// The snapshot produced by the most recent tick.
    pub fn latest(&self) -> &CabSnapshot {
        &self.latest
    }

    /// Runs one polling tick: keep-alive, every scalar accessor, then the
    /// controller list and a per-controller value sweep.
    pub fn tick(&mut self) -> &CabSnapshot {
        self.last_tick = Some(Instant::now());

        // The vendor library expects the connect flag re-asserted every tick.
        self.driver.set_connected(true);

        let driver_link = LinkStatus::from(self.driver.driver_connected());
        let sim_link = LinkStatus::from(self.driver.sim_connected());
        let loco_name = self.driver.loco_name();
        let current_controller_value = self.driver.current_controller_value();
        let combined_throttle_brake = self.driver.combined_throttle_brake();
        let sim_value = self.driver.sim_value();
        let driver_value = self.driver.driver_value();
        let loco_changed = self.driver.loco_changed();
        let loco_set = self.driver.loco_set();
        let device_id = self.driver.device_id();
        let device_type = self.driver.device_type();
        let next_device_id = self.driver.next_device_id();

        let names = self.driver.controller_names();
        if names != self.known_names {
            // Min/max are static per consist; re-read them only when the
            // list itself changes.
            self.bounds = (0..names.len())
                .map(|id| {
                    let id = id as i32;
                    (
                        self.driver.controller_value(id, ValueMode::Min),
                        self.driver.controller_value(id, ValueMode::Max),
                    )
                })
                .collect();
            self.known_names = names.clone();
        }

        let controllers: Vec<ControllerReading> = names
            .iter()
            .enumerate()
            .map(|(id, name)| {
                let value = self.driver.controller_value(id as i32, ValueMode::Current);
                let (min, max) = self.bounds.get(id).copied().unwrap_or((0.0, 0.0));
                ControllerReading {
                    name: name.clone(),
                    value,
                    min,
                    max,
                }
            })
            .collect();

        let watched_value = controllers
            .iter()
            .find(|c| c.name == self.watched)
            .map_or(0.0, |c| c.value);

        self.latest = CabSnapshot {
            taken_at: Local::now(),
            driver_link,
            sim_link,
            loco_name,
            watched_value,
            current_controller_value,
            combined_throttle_brake,
            sim_value,
            driver_value,
            loco_changed,
            loco_set,
            device_id,
            device_type,
            next_device_id,
            controllers,
        };

        &self.latest
    }

    /// The set-name command: one write, then exactly one read-back whose
    /// result replaces the displayed name (no other verification).
    pub fn set_loco_name(&mut self, name: &str) -> String {
        self.driver.set_loco_name(name);
        let name = self.driver.loco_name();
        self.latest.loco_name = name.clone();
        name
    }

    /// The set-controller-value command; the next tick's sweep reflects
    /// whatever the library reports back.
    pub fn set_controller_value(&mut self, id: usize, value: f32) {
        self.driver.set_controller_value(id as i32, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LocoSetState;
    use crate::driver::SimDriver;

    /// Driver whose controller list swaps after a fixed number of ticks.
    /// Min/max reads report the tick number they happened on, which lets a
    /// test see when bounds were actually re-read.
    struct ListSwapDriver {
        ticks: u32,
        swap_after: u32,
    }

    impl RailDriver for ListSwapDriver {
        fn set_connected(&mut self, _connected: bool) {
            self.ticks += 1;
        }
        fn driver_connected(&mut self) -> bool {
            true
        }
        fn sim_connected(&mut self) -> bool {
            true
        }
        fn loco_name(&mut self) -> String {
            String::new()
        }
        fn set_loco_name(&mut self, _name: &str) {}
        fn controller_names(&mut self) -> Vec<String> {
            if self.ticks > self.swap_after {
                vec!["Regulator".to_string(), "Reverser".to_string()]
            } else {
                vec!["SimpleThrottle".to_string()]
            }
        }
        fn controller_value(&mut self, id: i32, mode: ValueMode) -> f32 {
            match mode {
                ValueMode::Current => id as f32,
                ValueMode::Min | ValueMode::Max => self.ticks as f32,
            }
        }
        fn set_controller_value(&mut self, _id: i32, _value: f32) {}
        fn current_controller_value(&mut self) -> f32 {
            0.0
        }
        fn driver_value(&mut self) -> f32 {
            0.0
        }
        fn combined_throttle_brake(&mut self) -> f32 {
            0.0
        }
        fn sim_value(&mut self) -> f32 {
            0.0
        }
        fn loco_changed(&mut self) -> bool {
            false
        }
        fn loco_set(&mut self) -> LocoSetState {
            LocoSetState::Unknown
        }
        fn device_id(&mut self) -> i32 {
            0
        }
        fn device_type(&mut self) -> i32 {
            0
        }
        fn next_device_id(&mut self) -> i32 {
            0
        }
    }

    #[test]
    fn test_cadence_gating() {
        // A long interval keeps the not-yet-due assertions stable on a
        // heavily loaded machine.
        let interval = Duration::from_secs(60);
        let mut poller = Poller::new(Box::new(SimDriver::new()), interval, "SimpleThrottle");

        let now = Instant::now();
        assert!(poller.poll_due(now));
        assert_eq!(poller.time_until_due(now), Duration::ZERO);

        poller.tick();
        let after = Instant::now();
        assert!(!poller.poll_due(after));
        assert!(poller.time_until_due(after) <= interval);
        assert!(poller.poll_due(after + interval));
    }

    #[test]
    fn test_controllers_match_name_list_in_length_and_order() {
        let mut poller = Poller::new(
            Box::new(SimDriver::new()),
            Duration::from_millis(100),
            "SimpleThrottle",
        );
        let snapshot = poller.tick();

        let mut reference = SimDriver::new();
        let names = reference.controller_names();
        assert_eq!(snapshot.controllers.len(), names.len());
        for (reading, name) in snapshot.controllers.iter().zip(&names) {
            assert_eq!(&reading.name, name);
        }
    }

    #[test]
    fn test_watched_value_matches_table_entry() {
        let mut poller = Poller::new(
            Box::new(SimDriver::new()),
            Duration::from_millis(100),
            "SimpleThrottle",
        );
        let snapshot = poller.tick();
        let table_value = snapshot
            .controllers
            .iter()
            .find(|c| c.name == "SimpleThrottle")
            .map(|c| c.value);
        assert_eq!(table_value, Some(snapshot.watched_value));
    }

    #[test]
    fn test_missing_watched_controller_reads_zero() {
        let mut poller = Poller::new(
            Box::new(SimDriver::new()),
            Duration::from_millis(100),
            "NoSuchController",
        );
        assert_eq!(poller.tick().watched_value, 0.0);
    }

    #[test]
    fn test_empty_list_yields_empty_snapshot() {
        let mut poller = Poller::new(
            Box::new(SimDriver::empty()),
            Duration::from_millis(100),
            "SimpleThrottle",
        );
        let snapshot = poller.tick();
        assert!(snapshot.controllers.is_empty());
        assert_eq!(snapshot.watched_value, 0.0);
        assert_eq!(snapshot.loco_set, LocoSetState::NotSet);
    }

    #[test]
    fn test_bounds_reread_only_when_list_changes() {
        let driver = ListSwapDriver {
            ticks: 0,
            swap_after: 2,
        };
        let mut poller = Poller::new(Box::new(driver), Duration::from_millis(100), "SimpleThrottle");

        let first = poller.tick().controllers[0].min;
        assert_eq!(first, 1.0); // bounds read on the first tick

        let second = poller.tick().controllers[0].min;
        assert_eq!(second, 1.0); // list unchanged: cached bounds served

        let third = poller.tick().controllers.clone();
        assert_eq!(third.len(), 2); // list swapped
        assert_eq!(third[0].name, "Regulator");
        assert_eq!(third[0].min, 3.0); // bounds re-read on the swap tick
    }
}

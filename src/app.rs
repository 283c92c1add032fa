//! Application assembly: settings in, polling session out.

use log::info;
use std::path::Path;

use crate::config::{Backend, Settings};
use crate::core::RailDriver;
use crate::driver::{NativeDriver, SimDriver};
use crate::error::AppResult;
use crate::poll::Poller;

/// The assembled application: resolved settings plus the polling session
/// the GUI drives.
pub struct DashApp {
    pub settings: Settings,
    pub poller: Poller,
}

impl DashApp {
    /// Selects the driver backend and builds the polling session.
    pub fn new(settings: Settings) -> AppResult<Self> {
        let driver: Box<dyn RailDriver> = match settings.driver.backend {
            Backend::Hardware => {
                Box::new(NativeDriver::load(Path::new(&settings.driver.dll_path))?)
            }
            Backend::Simulated => {
                info!("Using the simulated driver backend");
                Box::new(SimDriver::new())
            }
        };

        let poller = Poller::new(
            driver,
            settings.poll_interval(),
            settings.driver.watched_controller.clone(),
        );

        Ok(Self { settings, poller })
    }

    /// Which backend the session was built with.
    pub fn backend(&self) -> Backend {
        self.settings.driver.backend
    }
}

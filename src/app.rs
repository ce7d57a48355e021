use std::path::PathBuf;

use color_eyre::eyre::Result;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::{
    config::ConfigManager,
    engine::{Engine, SystemSampler, TickReading},
    event::{Event, EventHandler},
};

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: ConfigManager,
    pub engine: Engine<SystemSampler>,
}

impl App {
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let events = EventHandler::new();
        let sender = events.clone_sender();
        let config = ConfigManager::new(config_path, sender)?;
        let engine = Engine::new(SystemSampler::new(), &config.current());
        Ok(Self {
            running: true,
            events,
            config,
            engine,
        })
    }

    /// Run the sampling loop until shutdown.
    ///
    /// The timer is re-armed only after a tick completes, so a slow tick
    /// delays the next one but the delay never compounds into a backlog.
    pub async fn run(&mut self) -> Result<()> {
        let quitter = self.events.clone_sender();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = quitter.send(Event::Quit);
            }
        });

        let mut interval = self.config.current().interval();
        info!(target: "App", "Sampling every {:?}", interval);
        let mut rearm = Box::pin(sleep(interval));
        while self.running {
            tokio::select! {
                () = &mut rearm => {
                    self.tick();
                    rearm = Box::pin(sleep(interval));
                }
                event = self.events.next() => match event? {
                    Event::Reload => {
                        self.reload_config();
                        interval = self.config.current().interval();
                    }
                    Event::Quit => self.quit(),
                },
            }
        }
        info!(target: "App", "Shutting down");
        Ok(())
    }

    fn tick(&mut self) {
        if let Some(reading) = self.engine.tick() {
            report(&reading);
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }

    fn reload_config(&mut self) {
        debug!(target: "App", "Reload!");
        match self.config.reload() {
            Ok(config) => self.engine.apply_config(&config),
            Err(e) => error!(target: "App", "{}", e),
        }
    }
}

/// Stand-in for a display refresh: the latest reading, one line per tick.
fn report(reading: &TickReading) {
    let snapshot = &reading.snapshot;
    debug!(
        target: "App",
        "CPU {:.1}% | RAM {:.1}% | Disk {:.1}% | up {:.1} KB/s | down {:.1} KB/s",
        snapshot.cpu_pct,
        snapshot.ram_pct,
        snapshot.disk_pct,
        reading.rate.upload_kbps,
        reading.rate.download_kbps,
    );
}

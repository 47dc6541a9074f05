use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

use log::{info, warn};
use particle_id::ParticleID;

use crate::{
    analysis::{Analysis, RunSummary},
    error::Result,
    generator::{Generator, StringSeed},
    settings::{CommandFile, Settings},
};

pub const ENERGY_KEY: &str = "Beams:eCM";
pub const QUARK_KEY: &str = "Main:spareMode1";
pub const MASSLESS_KEY: &str = "Main:spareFlag1";
pub const EVENTS_KEY: &str = "Main:numberOfEvents";
pub const SUBRUNS_KEY: &str = "Main:numberOfSubruns";
pub const LABEL_KEY: &str = "Main:spareWord1";

const DEFAULT_ENERGY: f64 = 500.;
const DEFAULT_QUARK: i64 = 1;
const DEFAULT_EVENTS: i64 = 1000;

/// Event count used to normalise spectra
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EventCount {
    /// Number of requested events, even if generation stopped early
    #[default]
    Configured,
    /// Number of events that were actually generated
    Completed,
}

/// Run parameters of one subrun
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Invariant mass of the string in GeV
    pub energy: f64,
    /// Quark spanning the string together with its antiquark
    pub quark: ParticleID,
    /// Whether the quarks are treated as massless
    pub massless: bool,
    pub events: usize,
    pub label: String,
}

impl RunConfig {
    pub fn from_settings(settings: &Settings, subrun: i64) -> Result<Self> {
        let energy = settings.parm(ENERGY_KEY)?.unwrap_or(DEFAULT_ENERGY);
        if !(energy > 0.) {
            return Err(settings.invalid(ENERGY_KEY, energy, "positive energy"));
        }
        let quark = settings.mode(QUARK_KEY)?.unwrap_or(DEFAULT_QUARK);
        if !(1..=6).contains(&quark.abs()) {
            return Err(settings.invalid(QUARK_KEY, quark, "quark id"));
        }
        let events = settings.mode(EVENTS_KEY)?.unwrap_or(DEFAULT_EVENTS);
        let events = match usize::try_from(events) {
            Ok(events) if events > 0 => events,
            _ => return Err(settings.invalid(EVENTS_KEY, events, "positive event count")),
        };
        let label = settings
            .word(LABEL_KEY)
            .map(|l| l.to_owned())
            .unwrap_or_else(|| format!("run{subrun}"));
        Ok(Self {
            energy,
            quark: ParticleID::new(quark as i32),
            massless: settings.flag(MASSLESS_KEY)?.unwrap_or(false),
            events,
            label,
        })
    }
}

/// Results of one subrun
#[derive(Clone, Debug, PartialEq)]
pub struct SubrunResult {
    pub subrun: i64,
    pub config: RunConfig,
    /// Number of successfully generated events
    pub completed: usize,
    pub summary: RunSummary,
}

impl SubrunResult {
    /// Write all histograms and the species table to `dir`
    pub fn export(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let label = &self.config.label;
        for hist in &self.summary.histograms {
            let path = dir.join(format!("{}_{label}.csv", hist.name()));
            hist.write_table(BufWriter::new(File::create(path)?))?;
        }
        let path = dir.join(format!("species_{label}.csv"));
        self.summary
            .species
            .write_table(BufWriter::new(File::create(path)?))?;
        Ok(())
    }
}

/// Run all subruns of a command file
pub struct Driver<G> {
    generator: G,
    count: EventCount,
}

impl<G: Generator> Driver<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            count: EventCount::default(),
        }
    }

    /// Choose the event count used to normalise spectra
    pub fn normalise_by(self, count: EventCount) -> Self {
        Self { count, ..self }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run every subrun defined in `cmnd`
    ///
    /// Without `Main:numberOfSubruns` a single run on the common
    /// settings is performed.
    pub fn run(&mut self, cmnd: &CommandFile) -> Result<Vec<SubrunResult>> {
        let common = cmnd.common();
        let nsubruns = common.mode(SUBRUNS_KEY)?.unwrap_or(0);
        if nsubruns <= 0 {
            return Ok(vec![self.subrun(&common, 0)?]);
        }
        (1..=nsubruns)
            .map(|subrun| self.subrun(&cmnd.subrun(subrun), subrun))
            .collect()
    }

    /// Run a single subrun
    ///
    /// Configuration and initialisation errors are returned. A failure
    /// to generate an event ends the event loop early, keeping the
    /// events generated so far.
    pub fn subrun(&mut self, settings: &Settings, subrun: i64) -> Result<SubrunResult> {
        let config = RunConfig::from_settings(settings, subrun)?;
        self.generator.configure(settings, subrun)?;
        info!(
            "Initialising {} for q-qbar hadronisation, quark {}, string mass = {}",
            config.label,
            config.quark.id(),
            config.energy
        );
        self.generator.initialize()?;

        let mass = if config.massless {
            0.
        } else {
            self.generator.rest_mass(config.quark)
        };
        let seed = StringSeed::new(config.quark, config.energy, mass);
        let mut analysis = Analysis::new(config.energy)?;
        for n in 0..config.events {
            match self.generator.next_event(&seed) {
                Ok(event) => analysis.fold(&event),
                Err(err) => {
                    warn!("Event {n} in {}: {err}", config.label);
                    break;
                }
            }
        }
        let completed = analysis.events();
        if completed < config.events {
            warn!(
                "Only {completed} out of {} events generated in {}",
                config.events, config.label
            );
        }
        let norm = match self.count {
            EventCount::Configured => config.events,
            EventCount::Completed => completed,
        };
        info!("Finished {}: {completed} events", config.label);
        Ok(SubrunResult {
            subrun,
            config,
            completed,
            summary: analysis.finish(norm),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults() {
        let config = RunConfig::from_settings(&Settings::default(), 3).unwrap();
        assert_eq!(config.energy, 500.);
        assert_eq!(config.quark.id(), 1);
        assert!(!config.massless);
        assert_eq!(config.events, 1000);
        assert_eq!(config.label, "run3");
    }

    #[test]
    fn from_settings() {
        let cmnd: CommandFile = "
Beams:eCM = 100.
Main:spareMode1 = -3
Main:spareFlag1 = on
Main:numberOfEvents = 20
Main:spareWord1 = strange
"
        .parse()
        .unwrap();
        let config = RunConfig::from_settings(&cmnd.common(), 0).unwrap();
        assert_eq!(config.energy, 100.);
        assert_eq!(config.quark.id(), -3);
        assert!(config.massless);
        assert_eq!(config.events, 20);
        assert_eq!(config.label, "strange");
    }

    #[test]
    fn invalid_settings() {
        for cmnd in [
            "Beams:eCM = -1",
            "Main:spareMode1 = 21",
            "Main:numberOfEvents = -5",
            "Main:numberOfEvents = 0",
        ] {
            let cmnd: CommandFile = cmnd.parse().unwrap();
            assert!(RunConfig::from_settings(&cmnd.common(), 0).is_err());
        }
    }

    #[test]
    fn error_points_to_line() {
        let cmnd: CommandFile = "Beams:eCM = 100.\nMain:numberOfEvents = 0".parse().unwrap();
        let err = RunConfig::from_settings(&cmnd.common(), 0).unwrap_err();
        assert!(matches!(
            err,
            Error::SettingsValue { ref key, line: Some(2), .. } if key == EVENTS_KEY
        ));
    }
}

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use log::{debug, info};
use particle_id::ParticleID;

use crate::{
    error::{Error, Result},
    event::Event,
    generator::{Generator, StringSeed},
    settings::Settings,
};

type Events = Box<dyn Iterator<Item = Result<Event>>>;

/// Event record formats that can be replayed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    #[cfg(feature = "lhef")]
    Lhef,
    #[cfg(feature = "hepmc2")]
    HepMC2,
}

impl Format {
    /// Guess the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            #[cfg(feature = "lhef")]
            Some("lhe" | "lhef") => Ok(Self::Lhef),
            #[cfg(feature = "hepmc2")]
            Some("hepmc" | "hepmc2") => Ok(Self::HepMC2),
            _ => Err(Error::UnknownFormat(path.to_owned())),
        }
    }
}

/// Constituent quark masses in GeV
pub fn quark_mass(id: ParticleID) -> f64 {
    match id.id().abs() {
        1 | 2 => 0.33,
        3 => 0.5,
        4 => 1.5,
        5 => 4.8,
        6 => 171.,
        _ => 0.,
    }
}

/// Generator reading pre-generated events from files
///
/// Subrun `n` (counting from 1) reads the `n`th file. If there are
/// fewer files than subruns, the last file is read again.
///
/// Primary hadrons are identified by the generator's own status codes
/// (`81..=89` for fragmentation, `1216` for the joining step). Files
/// must be written with these raw codes. Writers that map them to the
/// final-state codes `1` and `2` leave nothing to analyse, which
/// [`Analysis`](crate::analysis::Analysis) reports with a warning.
pub struct Replay {
    inputs: Vec<PathBuf>,
    current: Option<PathBuf>,
    events: Option<Events>,
}

impl Replay {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            current: None,
            events: None,
        }
    }
}

impl Generator for Replay {
    fn configure(&mut self, _settings: &Settings, subrun: i64) -> Result<()> {
        let idx = usize::try_from(subrun.max(1) - 1).unwrap_or_default();
        let path = self
            .inputs
            .get(idx)
            .or(self.inputs.last())
            .ok_or_else(|| Error::Initialisation("no event files to replay".to_owned()))?;
        Format::from_path(path)?;
        self.current = Some(path.clone());
        self.events = None;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        let Some(path) = &self.current else {
            return Err(Error::Initialisation("replay is not configured".to_owned()));
        };
        info!("Replaying events from {}", path.display());
        self.events = Some(open(path)?);
        Ok(())
    }

    fn next_event(&mut self, seed: &StringSeed) -> Result<Event> {
        let events = self
            .events
            .as_mut()
            .ok_or_else(|| Error::Generation("replay is not initialised".to_owned()))?;
        let event = events
            .next()
            .ok_or_else(|| Error::Generation("no more events to replay".to_owned()))??;
        debug!(
            "Replayed event {:?} for string with mass {}",
            event.id,
            seed.energy()
        );
        Ok(event)
    }

    fn rest_mass(&self, id: ParticleID) -> f64 {
        quark_mass(id)
    }
}

fn open(path: &Path) -> Result<Events> {
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;
    let reader = BufReader::new(file);
    match Format::from_path(path)? {
        #[cfg(feature = "lhef")]
        Format::Lhef => {
            let mut reader = lhef::Reader::new(reader)
                .map_err(|err| Error::Initialisation(err.to_string()))?;
            let events = std::iter::from_fn(move || match reader.hepeup() {
                Ok(Some(event)) => Some(Ok(Event::from(event))),
                Ok(None) => None,
                Err(err) => Some(Err(Error::Record(err.to_string()))),
            });
            Ok(Box::new(events))
        }
        #[cfg(feature = "hepmc2")]
        Format::HepMC2 => {
            let events = hepmc2::Reader::from(reader).map(|event| {
                event
                    .map(Event::from)
                    .map_err(|err| Error::Record(err.to_string()))
            });
            Ok(Box::new(events))
        }
    }
}

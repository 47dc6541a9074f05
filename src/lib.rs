pub mod analysis;
pub mod driver;
pub mod error;
pub mod event;
pub mod gap;
pub mod generator;
pub mod hist;
pub mod primary;
pub mod rank;
pub mod replay;
pub mod settings;
pub mod species;
#[cfg(feature = "lhef")]
mod convert_lhef;
#[cfg(feature = "hepmc2")]
mod convert_hepmc2;

pub use crate::analysis::{Analysis, RunSummary};
pub use crate::error::{Error, Result};
pub use crate::event::{Event, Particle};
pub use crate::generator::{Generator, StringSeed};
pub use crate::hist::{Hist, HistSpec, NormalisedHist};

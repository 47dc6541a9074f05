use log::{debug, warn};

use crate::{
    error::Result,
    event::Event,
    gap::{self, GapKind},
    hist::{Hist, HistSpec, NormalisedHist},
    primary::PrimarySelection,
    rank::{self, ZHists},
    species::SpeciesTally,
};

const Y_BINS: usize = 100;
const Y_MAX: f64 = 10.;
const DY_MAX: f64 = 5.;
const MASS_MAX: f64 = 5.;

/// Histograms accumulated over all events of one run
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramSet {
    pub dndy: Hist,
    pub dptdy: Hist,
    pub dedy: Hist,
    pub z: ZHists,
    pub dy_regular: Hist,
    pub dy_joining: Hist,
    pub mass_regular: Hist,
    pub mass_joining: Hist,
}

impl HistogramSet {
    pub fn new() -> Result<Self> {
        let y = |name: &str, title: &str| HistSpec::spectrum(name, title, Y_BINS, -Y_MAX, Y_MAX);
        let dy = |name: &str, title: &str| HistSpec::integral(name, title, Y_BINS, -DY_MAX, DY_MAX);
        let mass = |name: &str, title: &str| HistSpec::integral(name, title, Y_BINS, 0., MASS_MAX);
        Ok(Self {
            dndy: Hist::new(y("dndy", "dN/dy distribution of primary hadrons"))?,
            dptdy: Hist::new(
                y("dptdy", "Distribution of total transverse momentum over rapidity dpT/dy").weighted(),
            )?,
            dedy: Hist::new(y("dedy", "Distribution of total energy over rapidity dE/dy").weighted())?,
            z: ZHists::new()?,
            dy_regular: Hist::new(dy(
                "dy_regular",
                "Rapidity spacing of adjacent regular-step hadrons",
            ))?,
            dy_joining: Hist::new(dy(
                "dy_joining",
                "Rapidity spacing of hadrons adjacent to the joining step",
            ))?,
            mass_regular: Hist::new(mass("mass_regular", "Mass of regular-step primary hadrons"))?,
            mass_joining: Hist::new(mass("mass_joining", "Mass of joining-step primary hadrons"))?,
        })
    }

    /// Bin-wise sum with the histograms of another worker
    pub fn merge(&mut self, other: &HistogramSet) -> Result<()> {
        for (this, other) in self.iter_mut().zip(other.iter()) {
            this.merge(other)?;
        }
        Ok(())
    }

    fn iter(&self) -> impl Iterator<Item = &Hist> {
        [
            &self.dndy,
            &self.dptdy,
            &self.dedy,
            &self.z.all,
        ]
        .into_iter()
        .chain(&self.z.by_rank)
        .chain([
            &self.z.last,
            &self.z.mid,
            &self.z.joining,
            &self.dy_regular,
            &self.dy_joining,
            &self.mass_regular,
            &self.mass_joining,
        ])
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Hist> {
        [
            &mut self.dndy,
            &mut self.dptdy,
            &mut self.dedy,
            &mut self.z.all,
        ]
        .into_iter()
        .chain(&mut self.z.by_rank)
        .chain([
            &mut self.z.last,
            &mut self.z.mid,
            &mut self.z.joining,
            &mut self.dy_regular,
            &mut self.dy_joining,
            &mut self.mass_regular,
            &mut self.mass_joining,
        ])
    }

    /// Normalise every histogram according to its booking
    pub fn normalise(self, events: usize) -> Vec<NormalisedHist> {
        let Self {
            dndy,
            dptdy,
            dedy,
            z,
            dy_regular,
            dy_joining,
            mass_regular,
            mass_joining,
        } = self;
        let mut res: Vec<_> = [dndy, dptdy, dedy]
            .into_iter()
            .map(|h| h.normalise(events))
            .collect();
        res.extend(z.normalise(events));
        res.extend(
            [dy_regular, dy_joining, mass_regular, mass_joining]
                .into_iter()
                .map(|h| h.normalise(events)),
        );
        res
    }
}

/// Folds events into the histograms of one run
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    selection: PrimarySelection,
    string_energy: f64,
    hists: HistogramSet,
    species: SpeciesTally,
    events: usize,
    without_primaries: usize,
}

impl Analysis {
    /// Start a run for strings with invariant mass `string_energy`
    pub fn new(string_energy: f64) -> Result<Self> {
        Self::with_selection(string_energy, PrimarySelection::default())
    }

    pub fn with_selection(string_energy: f64, selection: PrimarySelection) -> Result<Self> {
        Ok(Self {
            selection,
            string_energy,
            hists: HistogramSet::new()?,
            species: SpeciesTally::default(),
            events: 0,
            without_primaries: 0,
        })
    }

    pub fn histograms(&self) -> &HistogramSet {
        &self.hists
    }

    /// Number of events folded so far
    pub fn events(&self) -> usize {
        self.events
    }

    /// Number of folded events in which no primary hadron was found
    pub fn events_without_primaries(&self) -> usize {
        self.without_primaries
    }

    /// Add one event to the histograms
    pub fn fold(&mut self, event: &Event) {
        let primaries = self.selection.extract(event);
        debug!(
            "Event {:?}: {} particles, {} primary hadrons",
            event.id,
            event.len(),
            primaries.len()
        );
        if primaries.is_empty() {
            if self.without_primaries == 0 {
                warn!(
                    "Event {:?} has no primary hadrons, are the fragmentation status codes recorded?",
                    event.id
                );
            }
            self.without_primaries += 1;
        }
        for hadron in &primaries {
            let p = hadron.particle;
            let y = p.y();
            self.hists.dndy.fill(y);
            self.hists.dptdy.fill_weighted(y, p.pt());
            self.hists.dedy.fill_weighted(y, p.e());
            if hadron.is_joining {
                self.hists.mass_joining.fill(p.m);
            } else {
                self.hists.mass_regular.fill(p.m);
            }
            self.species.add(hadron);
        }

        let chain = rank::track(&primaries, self.string_energy);
        for hadron in &chain.hadrons {
            self.hists.z.fill(hadron);
        }

        for gap in gap::classify(&primaries) {
            match gap.kind {
                GapKind::Joining => self.hists.dy_joining.fill(gap.dy),
                GapKind::Regular => self.hists.dy_regular.fill(gap.dy),
            }
        }
        self.events += 1;
    }

    /// Combine with an analysis of the same run done by another worker
    pub fn merge(&mut self, other: &Analysis) -> Result<()> {
        self.hists.merge(&other.hists)?;
        self.species.merge(&other.species);
        self.events += other.events;
        self.without_primaries += other.without_primaries;
        Ok(())
    }

    /// Normalise all histograms, spectra are divided by `events`
    pub fn finish(self, events: usize) -> RunSummary {
        if self.without_primaries > 0 {
            warn!(
                "{} out of {} events had no primary hadrons",
                self.without_primaries, self.events
            );
        }
        RunSummary {
            events_folded: self.events,
            events_without_primaries: self.without_primaries,
            normalised_to: events,
            histograms: self.hists.normalise(events),
            species: self.species,
        }
    }
}

/// Normalised results of one run
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Number of events that entered the histograms
    pub events_folded: usize,
    /// Number of folded events without any primary hadron
    pub events_without_primaries: usize,
    /// Event count used for spectrum normalisation
    pub normalised_to: usize,
    pub histograms: Vec<NormalisedHist>,
    pub species: SpeciesTally,
}

impl RunSummary {
    pub fn histogram(&self, name: &str) -> Option<&NormalisedHist> {
        self.histograms.iter().find(|h| h.name() == name)
    }
}

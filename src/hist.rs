//! Binned, weighted accumulators
//!
//! A [`Hist`] is filled during the event loop and then consumed by exactly
//! one normalisation, which turns it into a read-only [`NormalisedHist`].
//! Normalising twice or filling after normalisation is a type error:
//!
//! ```compile_fail
//! use fragstat::hist::{Hist, HistSpec};
//!
//! let hist = Hist::new(HistSpec::spectrum("y", "dN/dy", 10, -5., 5.)).unwrap();
//! let once = hist.normalise_integral();
//! let twice = once.normalise_integral();
//! ```
use std::{fmt, io::Write};

use crate::error::{Error, Result};

/// How a histogram is normalised at the end of a run
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Density per unit of the binned quantity and per event
    Spectrum,
    /// Probability per bin, contents sum to one
    Integral,
}

/// Normalisation applied to a [`NormalisedHist`]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Normalisation {
    /// Divided by `events * bin width`
    Spectrum { events: usize },
    /// Divided by the sum of contents before normalisation
    Integral { sum: f64 },
}

/// Histogram booking information
#[derive(Clone, Debug, PartialEq)]
pub struct HistSpec {
    /// Short name, used for file names
    pub name: String,
    /// Human-readable title
    pub title: String,
    /// Number of bins
    pub bins: usize,
    /// Lower edge of the first bin
    pub lower: f64,
    /// Upper edge of the last bin
    pub upper: f64,
    /// Whether fills carry explicit weights
    pub weighted: bool,
    /// Normalisation applied after the event loop
    pub mode: Mode,
}

impl HistSpec {
    pub fn spectrum(name: &str, title: &str, bins: usize, lower: f64, upper: f64) -> Self {
        Self {
            name: name.to_owned(),
            title: title.to_owned(),
            bins,
            lower,
            upper,
            weighted: false,
            mode: Mode::Spectrum,
        }
    }

    pub fn integral(name: &str, title: &str, bins: usize, lower: f64, upper: f64) -> Self {
        Self {
            mode: Mode::Integral,
            ..Self::spectrum(name, title, bins, lower, upper)
        }
    }

    pub fn weighted(self) -> Self {
        Self {
            weighted: true,
            ..self
        }
    }

    pub fn width(&self) -> f64 {
        (self.upper - self.lower) / self.bins as f64
    }
}

/// Histogram that is still being filled
#[derive(Clone, Debug, PartialEq)]
pub struct Hist {
    spec: HistSpec,
    contents: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: usize,
}

impl Hist {
    pub fn new(spec: HistSpec) -> Result<Self> {
        let valid = spec.bins > 0
            && spec.lower.is_finite()
            && spec.upper.is_finite()
            && spec.lower < spec.upper;
        if !valid {
            return Err(Error::InvalidBinning {
                name: spec.name,
                bins: spec.bins,
                lower: spec.lower,
                upper: spec.upper,
            });
        }
        let contents = vec![0.; spec.bins];
        Ok(Self {
            spec,
            contents,
            underflow: 0.,
            overflow: 0.,
            entries: 0,
        })
    }

    pub fn spec(&self) -> &HistSpec {
        &self.spec
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Number of fills, including those outside the binned range
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Count `value` once
    ///
    /// Only valid for histograms booked without weights.
    pub fn fill(&mut self, value: f64) {
        debug_assert!(
            !self.spec.weighted,
            "unit fill of weighted histogram {}",
            self.spec.name
        );
        self.add(value, 1.)
    }

    /// Add `weight` to the bin containing `value`
    ///
    /// Only valid for histograms booked with [`HistSpec::weighted`].
    /// Values outside `[lower, upper)` do not enter any bin. Their
    /// weight is only kept in the underflow and overflow tallies.
    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        debug_assert!(
            self.spec.weighted,
            "weighted fill of unweighted histogram {}",
            self.spec.name
        );
        self.add(value, weight)
    }

    fn add(&mut self, value: f64, weight: f64) {
        self.entries += 1;
        if value.is_nan() {
            return;
        }
        if value < self.spec.lower {
            self.underflow += weight;
            return;
        }
        let idx = ((value - self.spec.lower) / self.spec.width()).floor();
        // rounding can push values just below `upper` into a
        // non-existent bin
        if value >= self.spec.upper || idx >= self.spec.bins as f64 {
            self.overflow += weight;
            return;
        }
        self.contents[idx as usize] += weight;
    }

    /// Add the contents of another histogram with identical binning
    pub fn merge(&mut self, other: &Hist) -> Result<()> {
        let same = self.spec.bins == other.spec.bins
            && self.spec.lower == other.spec.lower
            && self.spec.upper == other.spec.upper;
        if !same {
            return Err(Error::BinningMismatch(
                self.spec.name.clone(),
                other.spec.name.clone(),
            ));
        }
        for (c, o) in self.contents.iter_mut().zip(&other.contents) {
            *c += o;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        Ok(())
    }

    /// Convert counts into a density per unit and per event
    ///
    /// Without any events there is no density and all contents are zero.
    pub fn normalise_spectrum(mut self, events: usize) -> NormalisedHist {
        if events == 0 {
            self.contents.fill(0.);
            self.underflow = 0.;
            self.overflow = 0.;
            return self.finish(1., Normalisation::Spectrum { events });
        }
        let norm = events as f64 * self.spec.width();
        self.finish(norm, Normalisation::Spectrum { events })
    }

    /// Scale contents such that they sum to one
    ///
    /// An empty histogram stays empty.
    pub fn normalise_integral(self) -> NormalisedHist {
        let sum: f64 = self.contents.iter().sum();
        let norm = if sum == 0. { 1. } else { sum };
        self.finish(norm, Normalisation::Integral { sum })
    }

    /// Apply the normalisation requested by the booking
    pub fn normalise(self, events: usize) -> NormalisedHist {
        match self.spec.mode {
            Mode::Spectrum => self.normalise_spectrum(events),
            Mode::Integral => self.normalise_integral(),
        }
    }

    fn finish(self, norm: f64, normalisation: Normalisation) -> NormalisedHist {
        let Self {
            spec,
            mut contents,
            underflow,
            overflow,
            entries,
        } = self;
        for c in &mut contents {
            *c /= norm;
        }
        NormalisedHist {
            spec,
            contents,
            underflow: underflow / norm,
            overflow: overflow / norm,
            entries,
            normalisation,
        }
    }
}

/// Read-only histogram after normalisation
#[derive(Clone, Debug, PartialEq)]
pub struct NormalisedHist {
    spec: HistSpec,
    contents: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: usize,
    normalisation: Normalisation,
}

impl NormalisedHist {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn title(&self) -> &str {
        &self.spec.title
    }

    pub fn spec(&self) -> &HistSpec {
        &self.spec
    }

    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    pub fn normalisation(&self) -> Normalisation {
        self.normalisation
    }

    /// Bin edges, one more than the number of bins
    pub fn edges(&self) -> Vec<f64> {
        let width = self.spec.width();
        (0..=self.spec.bins)
            .map(|i| self.spec.lower + i as f64 * width)
            .collect()
    }

    pub fn centres(&self) -> impl Iterator<Item = f64> + '_ {
        let width = self.spec.width();
        (0..self.spec.bins).map(move |i| self.spec.lower + (i as f64 + 0.5) * width)
    }

    /// Write one `centre,value` row per bin
    pub fn write_table<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "# {}", self.spec.title)?;
        for (x, y) in self.centres().zip(&self.contents) {
            writeln!(out, "{x:e},{y:e}")?;
        }
        Ok(())
    }
}

impl fmt::Display for NormalisedHist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max = self.contents.iter().copied().fold(0., f64::max);
        let width = self.spec.width();
        let mean = {
            let sum: f64 = self.contents.iter().sum();
            let weighted: f64 = self.centres().zip(&self.contents).map(|(x, y)| x * y).sum();
            if sum == 0. {
                0.
            } else {
                weighted / sum
            }
        };
        writeln!(f, "{}", self.spec.title)?;
        writeln!(
            f,
            "  {} bins on [{}, {}), width {width}, {} entries",
            self.spec.bins, self.spec.lower, self.spec.upper, self.entries
        )?;
        writeln!(
            f,
            "  maximum {max:.4e}, mean {mean:.4}, underflow {:.4e}, overflow {:.4e}",
            self.underflow, self.overflow
        )
    }
}

use std::io::Write;

use ahash::AHashMap;
use itertools::Itertools;

use crate::primary::PrimaryHadron;

/// Number of primary hadrons per absolute PDG id
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeciesTally {
    regular: AHashMap<i32, u64>,
    joining: AHashMap<i32, u64>,
}

/// Fraction of hadrons of one species within its category
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeciesFraction {
    pub id: i32,
    pub regular: f64,
    pub joining: f64,
}

impl SpeciesTally {
    pub fn add(&mut self, hadron: &PrimaryHadron) {
        let id = hadron.particle.id.id().abs();
        let tally = if hadron.is_joining {
            &mut self.joining
        } else {
            &mut self.regular
        };
        *tally.entry(id).or_default() += 1;
    }

    pub fn merge(&mut self, other: &SpeciesTally) {
        for (id, n) in &other.regular {
            *self.regular.entry(*id).or_default() += n;
        }
        for (id, n) in &other.joining {
            *self.joining.entry(*id).or_default() += n;
        }
    }

    pub fn regular_total(&self) -> u64 {
        self.regular.values().sum()
    }

    pub fn joining_total(&self) -> u64 {
        self.joining.values().sum()
    }

    /// Species fractions, sorted by absolute PDG id
    pub fn fractions(&self) -> Vec<SpeciesFraction> {
        let frac = |tally: &AHashMap<i32, u64>, total: u64, id: i32| {
            if total == 0 {
                0.
            } else {
                tally.get(&id).copied().unwrap_or_default() as f64 / total as f64
            }
        };
        let (regular_total, joining_total) = (self.regular_total(), self.joining_total());
        self.regular
            .keys()
            .chain(self.joining.keys())
            .copied()
            .sorted_unstable()
            .dedup()
            .map(|id| SpeciesFraction {
                id,
                regular: frac(&self.regular, regular_total, id),
                joining: frac(&self.joining, joining_total, id),
            })
            .collect()
    }

    /// Write one `id,regular,joining` row per species
    pub fn write_table<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "# species fractions of regular and joining-step hadrons")?;
        for f in self.fractions() {
            writeln!(out, "{},{:e},{:e}", f.id, f.regular, f.joining)?;
        }
        Ok(())
    }
}

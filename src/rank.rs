use crate::{
    error::Result,
    hist::{Hist, HistSpec, NormalisedHist},
    primary::PrimaryHadron,
};

/// Highest rank with its own z histogram
pub const MAX_RANK: usize = 6;

const Z_BINS: usize = 100;

/// Primary hadron with rank and momentum fraction
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RankedHadron<'a> {
    pub hadron: PrimaryHadron<'a>,
    /// Rank counted from the first string end, `None` for joining hadrons
    pub rank: Option<u32>,
    /// Light-cone momentum `E + pz`
    pub p_plus: f64,
    /// Fraction of the light-cone momentum remaining before this hadron
    ///
    /// Not clamped, can leave [0, 1] for numerically awkward events.
    pub z: f64,
    /// Whether the next primary hadron comes from the joining step
    pub is_last: bool,
}

/// Result of walking along the fragmentation chain of one event
#[derive(Clone, Debug, PartialEq)]
pub struct Chain<'a> {
    pub hadrons: Vec<RankedHadron<'a>>,
    /// Light-cone momentum left after the last hadron
    pub remaining: f64,
}

/// Assign ranks and momentum fractions in production order
///
/// `string_energy` is the light-cone momentum available at the start
/// of the chain, i.e. the invariant mass of the string.
///
/// A hadron counts as last-rank if the next primary hadron is from
/// the joining step. The final hadron of the sequence has no successor
/// and is therefore never last-rank.
pub fn track<'a>(primaries: &[PrimaryHadron<'a>], string_energy: f64) -> Chain<'a> {
    let mut remaining = string_energy;
    let mut rank = 0;
    let mut hadrons = Vec::with_capacity(primaries.len());
    for (n, &hadron) in primaries.iter().enumerate() {
        let p_plus = hadron.particle.p_plus();
        let z = p_plus / remaining;
        let rank = if hadron.is_joining {
            None
        } else {
            rank += 1;
            Some(rank)
        };
        let is_last = !hadron.is_joining
            && primaries.get(n + 1).map(|next| next.is_joining).unwrap_or(false);
        hadrons.push(RankedHadron {
            hadron,
            rank,
            p_plus,
            z,
            is_last,
        });
        remaining -= p_plus;
    }
    Chain { hadrons, remaining }
}

/// z distributions, in total and split by rank
#[derive(Clone, Debug, PartialEq)]
pub struct ZHists {
    pub all: Hist,
    pub by_rank: [Hist; MAX_RANK],
    pub last: Hist,
    pub mid: Hist,
    pub joining: Hist,
}

impl ZHists {
    pub fn new() -> Result<Self> {
        let z = |name: &str, title: &str| Hist::new(HistSpec::spectrum(name, title, Z_BINS, 0., 1.));
        let by_rank = [
            z("z1", "z+ distribution of 1st-rank primary hadron")?,
            z("z2", "z+ distribution of 2nd-rank primary hadron")?,
            z("z3", "z+ distribution of 3rd-rank primary hadron")?,
            z("z4", "z+ distribution of 4th-rank primary hadron")?,
            z("z5", "z+ distribution of 5th-rank primary hadron")?,
            z("z6", "z+ distribution of 6th-rank primary hadron")?,
        ];
        Ok(Self {
            all: z("z", "z+ distribution of primary hadrons")?,
            by_rank,
            last: z("z_last", "z+ distribution of last-rank primary hadron")?,
            mid: z("z_mid", "z+ distribution of mid-rank primary hadrons")?,
            joining: z("z_joining", "z+ distribution of joining-step hadrons")?,
        })
    }

    pub fn fill(&mut self, hadron: &RankedHadron) {
        let z = hadron.z;
        self.all.fill(z);
        let Some(rank) = hadron.rank else {
            self.joining.fill(z);
            return;
        };
        if hadron.is_last {
            self.last.fill(z);
            return;
        }
        if rank != 1 {
            self.mid.fill(z);
        }
        if let Some(hist) = self.by_rank.get_mut(rank as usize - 1) {
            hist.fill(z);
        }
    }

    pub fn normalise(self, events: usize) -> Vec<NormalisedHist> {
        let Self {
            all,
            by_rank,
            last,
            mid,
            joining,
        } = self;
        std::iter::once(all)
            .chain(by_rank)
            .chain([last, mid, joining])
            .map(|h| h.normalise(events))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Particle;

    const EPS: f64 = 1e-12;

    fn particle(e: f64, pz: f64, status: i32) -> Particle {
        Particle {
            status,
            p: [e, 0., 0., pz],
            ..Default::default()
        }
    }

    fn primaries(particles: &[Particle]) -> Vec<PrimaryHadron<'_>> {
        particles
            .iter()
            .map(|particle| PrimaryHadron {
                particle,
                is_joining: particle.status == 1216,
            })
            .collect()
    }

    #[test]
    fn budget() {
        let energy = 100.;
        let particles = [
            particle(30., 20., 83),
            particle(15., 10., 83),
            particle(8., -2., 1216),
            particle(9., 1., 83),
        ];
        let primaries = primaries(&particles);
        let chain = track(&primaries, energy);

        let ranks: Vec<_> = chain.hadrons.iter().map(|h| h.rank).collect();
        assert_eq!(ranks, [Some(1), Some(2), None, Some(3)]);

        let mut remaining = energy;
        for h in &chain.hadrons {
            assert!((h.z - h.p_plus / remaining).abs() < EPS);
            let next = remaining - h.p_plus;
            assert!(next < remaining);
            remaining = next;
        }
        let total: f64 = particles.iter().map(|p| p.p_plus()).sum();
        assert!((chain.remaining - (energy - total)).abs() < EPS);
        assert!((chain.hadrons[0].z - 0.5).abs() < EPS);
        assert!((chain.hadrons[1].z - 0.5).abs() < EPS);
    }

    #[test]
    fn last_rank() {
        let particles = [
            particle(10., 0., 83),
            particle(10., 0., 83),
            particle(10., 0., 1216),
            particle(10., 0., 1216),
            particle(10., 0., 84),
        ];
        let primaries = primaries(&particles);
        let chain = track(&primaries, 100.);
        let last: Vec<_> = chain.hadrons.iter().map(|h| h.is_last).collect();
        assert_eq!(last, [false, true, false, false, false]);
        assert_eq!(chain.hadrons[1].rank, Some(2));
    }

    #[test]
    fn edge_cases() {
        let chain = track(&[], 10.);
        assert!(chain.hadrons.is_empty());
        assert_eq!(chain.remaining, 10.);

        let particles = [particle(4., 1., 83)];
        let primaries = primaries(&particles);
        let chain = track(&primaries, 10.);
        assert_eq!(chain.hadrons[0].rank, Some(1));
        assert!(!chain.hadrons[0].is_last);
        assert!((chain.hadrons[0].z - 0.5).abs() < EPS);
        assert!((chain.remaining - 5.).abs() < EPS);
    }

    #[test]
    fn z_outside_unit_interval_is_kept() {
        let particles = [particle(6., 5., 83)];
        let primaries = primaries(&particles);
        let chain = track(&primaries, 10.);
        assert!((chain.hadrons[0].z - 1.1).abs() < EPS);
    }

    #[test]
    fn fill_by_rank() {
        let mut particles = vec![particle(10., 0., 83); 8];
        particles.push(particle(10., 0., 1216));
        particles.push(particle(10., 0., 1216));
        let primaries = primaries(&particles);
        let chain = track(&primaries, 1000.);
        let mut hists = ZHists::new().unwrap();
        for h in &chain.hadrons {
            hists.fill(h);
        }
        let count = |h: &Hist| h.contents().iter().sum::<f64>();
        assert_eq!(count(&hists.all), 10.);
        for rank in 0..MAX_RANK {
            assert_eq!(count(&hists.by_rank[rank]), 1.);
        }
        // ranks 2 to 7, rank 8 is last
        assert_eq!(count(&hists.mid), 6.);
        assert_eq!(count(&hists.last), 1.);
        assert_eq!(count(&hists.joining), 2.);
    }

    #[test]
    fn last_rank_one_is_not_first_rank() {
        let particles = [particle(10., 0., 83), particle(10., 0., 1216)];
        let primaries = primaries(&particles);
        let chain = track(&primaries, 100.);
        let mut hists = ZHists::new().unwrap();
        for h in &chain.hadrons {
            hists.fill(h);
        }
        let count = |h: &Hist| h.contents().iter().sum::<f64>();
        assert_eq!(count(&hists.by_rank[0]), 0.);
        assert_eq!(count(&hists.last), 1.);
        assert_eq!(count(&hists.mid), 0.);
    }
}

use particle_id::ParticleID;

use crate::{
    error::Result,
    event::{Event, Particle},
    settings::Settings,
};

/// Status of the quarks spanning the string
pub const SEED_STATUS: i32 = 23;
/// Colour tag connecting the quark and the antiquark
pub const SEED_COLOUR: i32 = 101;

/// Event generator producing one fragmented string per call
pub trait Generator {
    /// Apply the settings of the given subrun
    fn configure(&mut self, settings: &Settings, subrun: i64) -> Result<()>;

    /// Prepare for event generation
    ///
    /// Errors are fatal for the whole run.
    fn initialize(&mut self) -> Result<()>;

    /// Fragment the string spanned by `seed`
    fn next_event(&mut self, seed: &StringSeed) -> Result<Event>;

    /// Rest mass in GeV
    fn rest_mass(&self, id: ParticleID) -> f64;
}

impl<G: Generator + ?Sized> Generator for &mut G {
    fn configure(&mut self, settings: &Settings, subrun: i64) -> Result<()> {
        (**self).configure(settings, subrun)
    }

    fn initialize(&mut self) -> Result<()> {
        (**self).initialize()
    }

    fn next_event(&mut self, seed: &StringSeed) -> Result<Event> {
        (**self).next_event(seed)
    }

    fn rest_mass(&self, id: ParticleID) -> f64 {
        (**self).rest_mass(id)
    }
}

/// Back-to-back quark-antiquark pair along the z axis
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StringSeed {
    /// Quark and antiquark
    pub partons: [Particle; 2],
}

impl StringSeed {
    /// String of invariant mass `energy` between a quark `quark` and its antiquark
    pub fn new(quark: ParticleID, energy: f64, quark_mass: f64) -> Self {
        let e = energy / 2.;
        let pz = (e * e - quark_mass * quark_mass).max(0.).sqrt();
        let quark = Particle {
            id: quark,
            status: SEED_STATUS,
            p: [e, 0., 0., pz],
            m: quark_mass,
            col: [SEED_COLOUR, 0],
        };
        let antiquark = Particle {
            id: ParticleID::new(-quark.id.id()),
            p: [e, 0., 0., -pz],
            col: [0, SEED_COLOUR],
            ..quark
        };
        Self {
            partons: [quark, antiquark],
        }
    }

    /// Invariant mass of the string
    pub fn energy(&self) -> f64 {
        let [q, qbar] = &self.partons;
        let e = q.e() + qbar.e();
        let pz = q.pz() + qbar.pz();
        (e * e - pz * pz).max(0.).sqrt()
    }

    /// Event record containing only the seed
    pub fn to_event(&self) -> Event {
        Event::new(self.partons.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed() {
        let seed = StringSeed::new(ParticleID::new(2), 500., 0.33);
        let [q, qbar] = seed.partons;
        assert_eq!(q.id.id(), 2);
        assert_eq!(qbar.id.id(), -2);
        assert_eq!(q.col, [101, 0]);
        assert_eq!(qbar.col, [0, 101]);
        assert_eq!(q.status, 23);
        assert_eq!(q.e(), 250.);
        assert_eq!(q.pz(), -qbar.pz());
        assert!((q.pz() - (250_f64.powi(2) - 0.33_f64.powi(2)).sqrt()).abs() < 1e-12);
        assert!((seed.energy() - 500.).abs() < 1e-9);
        assert_eq!(seed.to_event().len(), 2);
    }

    #[test]
    fn massless_seed() {
        let seed = StringSeed::new(ParticleID::new(1), 10., 0.);
        assert_eq!(seed.partons[0].pz(), 5.);
        assert_eq!(seed.partons[0].m, 0.);
    }

    #[test]
    fn heavy_quarks_at_rest() {
        let seed = StringSeed::new(ParticleID::new(6), 100., 171.);
        assert_eq!(seed.partons[0].pz(), 0.);
    }
}

use particle_id::ParticleID;

/// Smallest transverse mass used in the rapidity computation
const TINY: f64 = 1e-20;

/// Fragmentation event
///
/// Particles are stored in the order in which the generator produced
/// them. This order is meaningful and must never be changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Event id
    pub id: Option<i32>,
    /// Particles in production order
    pub particles: Vec<Particle>,
}

impl Event {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            id: None,
            particles,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// A particle
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    /// Particle type
    pub id: ParticleID,
    /// Raw generator status code
    pub status: i32,
    /// Four-momentum `[E, px, py, pz]` in GeV
    pub p: [f64; 4],
    /// Mass in GeV
    pub m: f64,
    /// Colour flow
    pub col: [i32; 2],
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            id: ParticleID::new(0),
            status: 0,
            p: [0.; 4],
            m: 0.,
            col: [0, 0],
        }
    }
}

impl Particle {
    pub fn e(&self) -> f64 {
        self.p[0]
    }

    pub fn px(&self) -> f64 {
        self.p[1]
    }

    pub fn py(&self) -> f64 {
        self.p[2]
    }

    pub fn pz(&self) -> f64 {
        self.p[3]
    }

    /// Transverse momentum
    pub fn pt(&self) -> f64 {
        self.px().hypot(self.py())
    }

    /// Transverse mass
    pub fn mt(&self) -> f64 {
        (self.m * self.m + self.pt() * self.pt()).max(0.).sqrt()
    }

    /// Rapidity along the string (z) axis
    pub fn y(&self) -> f64 {
        let y = ((self.e() + self.pz().abs()) / self.mt().max(TINY)).ln();
        if self.pz() > 0. {
            y
        } else {
            -y
        }
    }

    /// Light-cone momentum `E + pz`
    pub fn p_plus(&self) -> f64 {
        self.e() + self.pz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(p: [f64; 4], m: f64) -> Particle {
        Particle {
            p,
            m,
            ..Default::default()
        }
    }

    #[test]
    fn rapidity_is_odd_in_pz() {
        let m: f64 = 0.14;
        let pz: f64 = 3.;
        let e = (m * m + pz * pz).sqrt();
        let forward = particle([e, 0., 0., pz], m);
        let backward = particle([e, 0., 0., -pz], m);
        let expected = 0.5 * ((e + pz) / (e - pz)).ln();
        assert!((forward.y() - expected).abs() < 1e-12);
        assert!((backward.y() + expected).abs() < 1e-12);
    }

    #[test]
    fn transverse_quantities() {
        let p = particle([5., 3., 4., 0.], 0.);
        assert_eq!(p.pt(), 5.);
        assert_eq!(p.mt(), 5.);
        assert_eq!(p.y(), 0.);
        assert_eq!(p.p_plus(), 5.);
    }
}

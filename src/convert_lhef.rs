use itertools::izip;
use lhef::HEPEUP;
use particle_id::ParticleID;

use crate::event::{Event, Particle};

impl From<HEPEUP> for Event {
    fn from(source: HEPEUP) -> Self {
        // status codes are kept as written by the generator
        let particles = izip!(source.IDUP, source.ISTUP, source.PUP, source.ICOLUP)
            .map(|(id, status, p, col)| Particle {
                id: ParticleID::new(id),
                status,
                p: [p[3], p[0], p[1], p[2]],
                m: p[4],
                col,
            })
            .collect();
        Self {
            id: None,
            particles,
        }
    }
}

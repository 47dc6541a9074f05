use particle_id::ParticleID;

use crate::event::{Event, Particle};

const HEPMC_INCOMING: i32 = 4;

impl From<hepmc2::Event> for Event {
    fn from(source: hepmc2::Event) -> Self {
        let efact = if source.energy_unit == hepmc2::event::EnergyUnit::MEV {
            1e-3
        } else {
            1.
        };
        let mut particles = Vec::new();
        for vx in source.vertices {
            // every particle except for the beams leaves exactly one
            // vertex, so only outgoing particles are taken from the
            // vertices they enter
            let incoming = vx
                .particles_in
                .into_iter()
                .filter(|p| p.status == HEPMC_INCOMING);
            for particle in incoming.chain(vx.particles_out) {
                particles.push(Particle {
                    id: ParticleID::new(particle.id),
                    status: particle.status,
                    p: particle.p.0.map(|p| efact * p),
                    m: efact * particle.m,
                    col: colour(&particle.flows),
                });
            }
        }
        Self {
            id: Some(source.number),
            particles,
        }
    }
}

// HepMC flow indices 1 and 2 carry colour and anticolour
fn colour(flows: &std::collections::BTreeMap<i32, i32>) -> [i32; 2] {
    [1, 2].map(|idx| flows.get(&idx).copied().unwrap_or_default())
}

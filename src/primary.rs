use std::ops::RangeInclusive;

use crate::event::{Event, Particle};

/// Status of hadrons produced in the joining step closing the string
pub const JOINING_STATUS: i32 = 1216;
/// Absolute status codes of hadrons from ordinary fragmentation steps
pub const FRAGMENTATION_STATUS: RangeInclusive<i32> = 81..=89;

/// Status codes identifying primary hadrons
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimarySelection {
    /// Exact status of joining-step hadrons
    pub joining_status: i32,
    /// Range of absolute status codes of ordinary fragmentation hadrons
    pub fragmentation: RangeInclusive<i32>,
}

impl Default for PrimarySelection {
    fn default() -> Self {
        Self {
            joining_status: JOINING_STATUS,
            fragmentation: FRAGMENTATION_STATUS,
        }
    }
}

impl PrimarySelection {
    pub fn is_primary(&self, status: i32) -> bool {
        self.is_joining(status) || self.fragmentation.contains(&status.abs())
    }

    pub fn is_joining(&self, status: i32) -> bool {
        status == self.joining_status
    }

    /// Primary hadrons of an event, in production order
    pub fn extract<'a>(&self, event: &'a Event) -> Vec<PrimaryHadron<'a>> {
        event
            .particles
            .iter()
            .filter(|p| self.is_primary(p.status))
            .map(|particle| PrimaryHadron {
                particle,
                is_joining: self.is_joining(particle.status),
            })
            .collect()
    }
}

/// A hadron produced directly by string fragmentation
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PrimaryHadron<'a> {
    pub particle: &'a Particle,
    /// Whether the hadron was produced in the joining step
    pub is_joining: bool,
}

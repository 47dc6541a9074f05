use itertools::Itertools;

use crate::primary::PrimaryHadron;

/// Kind of step separating two adjacent primary hadrons
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GapKind {
    /// At least one of the two hadrons is from the joining step
    Joining,
    /// Ordinary fragmentation step away from the string ends
    Regular,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gap {
    /// Position of the first hadron in the primary sequence
    pub index: usize,
    pub kind: GapKind,
    /// Signed rapidity difference `y(first) - y(second)`
    pub dy: f64,
}

/// Classify the gaps between consecutive primary hadrons
///
/// Regular gaps touching either end of the sequence are dropped.
/// Gaps next to a joining hadron are always kept.
pub fn classify(primaries: &[PrimaryHadron]) -> Vec<Gap> {
    let Some(last) = primaries.len().checked_sub(2) else {
        return Vec::new();
    };
    primaries
        .iter()
        .tuple_windows()
        .enumerate()
        .filter_map(|(index, (first, second))| {
            let dy = first.particle.y() - second.particle.y();
            let kind = if first.is_joining || second.is_joining {
                GapKind::Joining
            } else if index == 0 || index == last {
                return None;
            } else {
                GapKind::Regular
            };
            Some(Gap { index, kind, dy })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Particle;

    // massless particle along the z axis with rapidity `y`
    fn particle(y: f64, status: i32) -> Particle {
        let pt = 1.;
        Particle {
            status,
            p: [pt * y.cosh(), pt, 0., pt * y.sinh()],
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
    fn regular() {
        let particles: Vec<_> = [2., 1., 0., -1., -2.]
            .into_iter()
            .map(|y| particle(y, 83))
            .collect();
        let gaps = classify(&primaries(&particles));
        // four gaps, the ones at either end are dropped
        let idx: Vec<_> = gaps.iter().map(|g| g.index).collect();
        assert_eq!(idx, [1, 2]);
        for gap in gaps {
            assert_eq!(gap.kind, GapKind::Regular);
            assert!((gap.dy - 1.).abs() < 1e-9);
        }
    }

    #[test]
    fn joining() {
        let particles = [
            particle(2., 83),
            particle(1., 83),
            particle(0.5, 1216),
            particle(-1., 84),
            particle(-2., 84),
        ];
        let gaps = classify(&primaries(&particles));
        let kinds: Vec<_> = gaps.iter().map(|g| (g.index, g.kind)).collect();
        assert_eq!(kinds, [(1, GapKind::Joining), (2, GapKind::Joining)]);
        assert!((gaps[0].dy - 0.5).abs() < 1e-9);
        assert!((gaps[1].dy - 1.5).abs() < 1e-9);
    }

    #[test]
    fn joining_at_the_ends() {
        let particles = [particle(1., 1216), particle(-1., 83), particle(-3., 1216)];
        let gaps = classify(&primaries(&particles));
        assert_eq!(gaps.len(), 2);
        assert!(gaps.iter().all(|g| g.kind == GapKind::Joining));
    }

    #[test]
    fn sign_is_kept() {
        let particles = [
            particle(0., 83),
            particle(-1., 83),
            particle(1., 83),
            particle(0., 83),
        ];
        let gaps = classify(&primaries(&particles));
        assert_eq!(gaps.len(), 1);
        assert!((gaps[0].dy + 2.).abs() < 1e-9);
    }

    #[test]
    fn short_sequences() {
        assert!(classify(&[]).is_empty());
        let particles = [particle(0., 83)];
        assert!(classify(&primaries(&particles)).is_empty());
        let particles = [particle(0., 83), particle(1., 83)];
        assert!(classify(&primaries(&particles)).is_empty());
    }
}

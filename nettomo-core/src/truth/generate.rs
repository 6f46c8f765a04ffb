use super::{GroundTruth, LinkTruth};
use crate::{link::LinkId, random};
use rand_core::Rng;
use std::f64::consts::PI;

/// A stretch of buckets following the same sinusoid.
///
/// Bucket delays are `sin(frequency * π * t) / x + base` where `t`
/// advances by the generator's time step every bucket and `x` is drawn
/// once per link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySegment {
    pub buckets: usize,
    /// angular frequency, in multiples of π
    pub frequency: f64,
    /// delay the sinusoid oscillates around, in milliseconds
    pub base: f64,
}

/// The delay profile the emulated links were driven with.
pub const DEFAULT_SEGMENTS: [DelaySegment; 4] = [
    DelaySegment {
        buckets: 60,
        frequency: 0.8,
        base: 5.0,
    },
    DelaySegment {
        buckets: 40,
        frequency: 0.6,
        base: 7.0,
    },
    DelaySegment {
        buckets: 80,
        frequency: 0.4,
        base: 6.0,
    },
    DelaySegment {
        buckets: 40,
        frequency: 0.4,
        base: 9.0,
    },
];

/// Generates a random, piecewise sinusoidal ground truth.
///
/// The randomness comes from the caller so a seeded generator gives
/// the same ground truth every time.
///
/// ```
/// # use nettomo_core::{link::LinkId, node::NodeId, truth::TruthGenerator};
/// # use rand_chacha::ChaChaRng;
/// # use rand_core::SeedableRng as _;
/// let link = LinkId::new((NodeId::new(1), NodeId::new(2)));
/// let truth = TruthGenerator::default()
///     .generate(&[link], &mut ChaChaRng::seed_from_u64(7));
///
/// assert_eq!(truth.get(link).unwrap().delay_list.len(), 220);
/// ```
#[derive(Debug, Clone)]
pub struct TruthGenerator {
    segments: Vec<DelaySegment>,
    time_step: f64,
    /// the sinusoid amplitude is `1 / x` with `x` in this range
    amplitude_divisor: (f64, f64),
    /// per bucket loss, in whole percents
    loss_percent: (u64, u64),
}

impl Default for TruthGenerator {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS.to_vec(),
            time_step: 0.25,
            amplitude_divisor: (5.0, 10.0),
            loss_percent: (1, 5),
        }
    }
}

impl TruthGenerator {
    pub fn with_segments(mut self, segments: Vec<DelaySegment>) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_loss_percent(mut self, low: u64, high: u64) -> Self {
        self.loss_percent = (low.min(high), low.max(high));
        self
    }

    /// number of buckets of every generated link.
    pub fn buckets(&self) -> usize {
        self.segments.iter().map(|segment| segment.buckets).sum()
    }

    pub fn generate<R: Rng>(&self, links: &[LinkId], rng: &mut R) -> GroundTruth {
        links
            .iter()
            .map(|link| (*link, self.link(rng)))
            .collect()
    }

    fn link<R: Rng>(&self, rng: &mut R) -> LinkTruth {
        let divisor = random::uniform(rng, self.amplitude_divisor.0, self.amplitude_divisor.1);

        let mut t = 0.0;
        let mut delay_list = Vec::with_capacity(self.buckets());
        for segment in &self.segments {
            for _ in 0..segment.buckets {
                delay_list.push((segment.frequency * PI * t).sin() / divisor + segment.base);
                t += self.time_step;
            }
        }

        let (low, high) = self.loss_percent;
        let loss_list: Vec<f64> = (0..delay_list.len())
            .map(|_| random::integer(rng, low, high) as f64)
            .collect();

        let delay = delay_list.last().copied().unwrap_or_default();
        let loss = if loss_list.is_empty() {
            0.0
        } else {
            loss_list.iter().sum::<f64>() / loss_list.len() as f64
        };

        LinkTruth {
            delay,
            loss,
            delay_list,
            loss_list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng as _;

    fn links() -> Vec<LinkId> {
        vec![
            LinkId::new((NodeId::new(1), NodeId::new(2))),
            LinkId::new((NodeId::new(2), NodeId::new(3))),
        ]
    }

    #[test]
    fn reproducible_with_same_seed() {
        let generator = TruthGenerator::default();
        let a = generator.generate(&links(), &mut ChaChaRng::seed_from_u64(99));
        let b = generator.generate(&links(), &mut ChaChaRng::seed_from_u64(99));

        assert_eq!(a, b);
    }

    #[test]
    fn delay_stays_around_segment_base() {
        let truth = TruthGenerator::default().generate(&links(), &mut ChaChaRng::seed_from_u64(1));

        for (_, link) in truth.iter() {
            assert_eq!(link.delay_list.len(), 220);
            // amplitude is at most 1/5
            for (bucket, delay) in link.delay_list.iter().enumerate() {
                let base = match bucket {
                    0..60 => 5.0,
                    60..100 => 7.0,
                    100..180 => 6.0,
                    _ => 9.0,
                };
                assert!((delay - base).abs() <= 0.2 + 1e-12, "bucket {bucket}: {delay}");
            }
            assert_eq!(link.delay, link.delay_list[219]);
        }
    }

    #[test]
    fn loss_in_whole_percents() {
        let truth = TruthGenerator::default().generate(&links(), &mut ChaChaRng::seed_from_u64(3));

        for (_, link) in truth.iter() {
            assert_eq!(link.loss_list.len(), 220);
            assert!(
                link.loss_list
                    .iter()
                    .all(|loss| (1.0..=5.0).contains(loss) && loss.fract() == 0.0)
            );
            assert!((1.0..=5.0).contains(&link.loss));
        }
    }

    #[test]
    fn custom_segments() {
        let generator = TruthGenerator::default()
            .with_segments(vec![DelaySegment {
                buckets: 3,
                frequency: 0.0,
                base: 2.0,
            }])
            .with_loss_percent(0, 0);
        let truth = generator.generate(&links()[..1], &mut ChaChaRng::seed_from_u64(0));
        let link = truth.get(links()[0]).unwrap();

        assert_eq!(link.delay_list, vec![2.0, 2.0, 2.0]);
        assert_eq!(link.loss_list, vec![0.0, 0.0, 0.0]);
        assert_eq!(link.loss, 0.0);
    }
}

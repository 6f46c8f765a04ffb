//! Synthetic ground truth the measured series are validated against.
//!
//! The ground truth is a per-link schedule of delay and loss, one value
//! per time bucket, that the emulated network was configured with
//! while the probes were running. It is only used for validation,
//! never for inference.

mod generate;

pub use self::generate::{DEFAULT_SEGMENTS, DelaySegment, TruthGenerator};
use crate::link::LinkId;
use std::collections::BTreeMap;

/// Configured behaviour of one link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTruth {
    /// representative delay, in milliseconds
    pub delay: f64,
    /// representative loss, in percent
    pub loss: f64,
    /// delay of every time bucket, in milliseconds
    pub delay_list: Vec<f64>,
    /// loss of every time bucket, in percent
    pub loss_list: Vec<f64>,
}

impl LinkTruth {
    /// a link with the same delay and loss in every bucket.
    pub fn constant(delay: f64, loss: f64, buckets: usize) -> Self {
        Self {
            delay,
            loss,
            delay_list: vec![delay; buckets],
            loss_list: vec![loss; buckets],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    links: BTreeMap<LinkId, LinkTruth>,
}

impl GroundTruth {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the truth of `link`, returns the previous one if any.
    pub fn insert(&mut self, link: LinkId, truth: LinkTruth) -> Option<LinkTruth> {
        self.links.insert(link, truth)
    }

    pub fn get(&self, link: LinkId) -> Option<&LinkTruth> {
        self.links.get(&link)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkId, &LinkTruth)> + '_ {
        self.links.iter().map(|(link, truth)| (*link, truth))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl FromIterator<(LinkId, LinkTruth)> for GroundTruth {
    fn from_iter<T: IntoIterator<Item = (LinkId, LinkTruth)>>(iter: T) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

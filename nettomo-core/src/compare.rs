//! Validation of the measured series against the ground truth.
//!
//! Measured series have one entry per probe (delay) or per loss
//! window, the ground truth has one entry per time bucket. An
//! [`Alignment`] samples the measured series and maps each sample to
//! its bucket.

use crate::{
    defaults,
    estimate::{DelayEstimate, LossEstimate},
    link::LinkId,
    topology::Topology,
    truth::GroundTruth,
};
use thiserror::Error;

/// How a measured series lines up with a ground truth series.
///
/// Sample `j` is `measured[j * stride]`, compared with the bucket
/// `((j + lead) * stride) / bucket_len` of the ground truth. The
/// `lead` is a fixed offset absorbing the lag between the schedule of
/// the emulated network and the probes; the last ground truth value is
/// repeated for the final `lead` samples.
///
/// By default a trailing stride shorter than `stride` still yields a
/// sample and every ground truth bucket is used.
/// [`whole_strides`] and [`without_last_bucket`] narrow that down.
///
/// [`whole_strides`]: Alignment::whole_strides
/// [`without_last_bucket`]: Alignment::without_last_bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub stride: usize,
    pub bucket_len: usize,
    pub lead: usize,
    /// sample the first value of an incomplete trailing stride
    pub partial_stride: bool,
    /// compare against the last ground truth bucket
    pub last_bucket: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonConfig {
    pub delay_rows: Alignment,
    pub loss_rows: Alignment,
    pub delay_error: Alignment,
    pub loss_error: Alignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkComparison {
    pub link: LinkId,
    /// `(measure, theory)` delay rows, in milliseconds
    pub delay_rows: Vec<(f64, f64)>,
    /// `(measure, theory)` loss rows, in percent. Skipped windows have
    /// no measure.
    pub loss_rows: Vec<(Option<f64>, f64)>,
    /// mean absolute relative delay error
    pub delay_error: Option<f64>,
    /// mean absolute relative loss error
    pub loss_error: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("no ground truth for link {0}")]
    MissingTruth(LinkId),
}

impl Alignment {
    pub const fn new(stride: usize, bucket_len: usize, lead: usize) -> Self {
        Self {
            stride,
            bucket_len,
            lead,
            partial_stride: true,
            last_bucket: true,
        }
    }

    /// only sample strides that are fully covered by the measured
    /// series.
    pub const fn whole_strides(mut self) -> Self {
        self.partial_stride = false;
        self
    }

    /// leave the last ground truth bucket out of the comparison.
    pub const fn without_last_bucket(mut self) -> Self {
        self.last_bucket = false;
        self
    }

    /// pair sampled measured values with their ground truth value.
    ///
    /// The result is truncated to the shortest of the two series.
    ///
    /// ```
    /// # use nettomo_core::compare::Alignment;
    /// let alignment = Alignment::new(2, 4, 1);
    /// let measured = [1.0, 1.1, 2.0, 2.1, 3.0, 3.1, 4.0, 4.1];
    /// let truth = [10.0, 20.0, 30.0];
    ///
    /// assert_eq!(
    ///     alignment.align(&measured, &truth),
    ///     vec![(1.0, 10.0), (2.0, 20.0), (3.0, 20.0), (4.0, 20.0)],
    /// );
    /// ```
    pub fn align<M: Copy>(&self, measured: &[M], truth: &[f64]) -> Vec<(M, f64)> {
        if self.stride == 0 || self.bucket_len == 0 {
            return Vec::new();
        }

        let truth = if self.last_bucket {
            truth
        } else {
            &truth[..truth.len().saturating_sub(1)]
        };
        let samples = if self.partial_stride {
            measured.len().div_ceil(self.stride)
        } else {
            measured.len() / self.stride
        };
        let theory: Vec<f64> = (0..samples)
            .map_while(|j| truth.get(j * self.stride / self.bucket_len).copied())
            .collect();
        let Some(last) = theory.last().copied() else {
            return Vec::new();
        };

        (0..theory.len())
            .map(|j| {
                let value = theory.get(j + self.lead).copied().unwrap_or(last);
                (measured[j * self.stride], value)
            })
            .collect()
    }
}

impl ComparisonConfig {
    /// the report layout for ground truth buckets of `bucket_len`
    /// sequence numbers.
    ///
    /// Delay rows only sample whole strides, loss rows also sample the
    /// last, incomplete, window. The loss error leaves the last ground
    /// truth bucket out.
    pub fn new(
        bucket_len: usize,
        delay_stride: usize,
        delay_lead: usize,
        loss_window: usize,
        loss_lead: usize,
    ) -> Self {
        Self {
            delay_rows: Alignment::new(delay_stride, bucket_len, delay_lead).whole_strides(),
            loss_rows: Alignment::new(loss_window, bucket_len, loss_lead),
            delay_error: Alignment::new(1, bucket_len, 0),
            loss_error: Alignment::new(bucket_len, bucket_len, 0).without_last_bucket(),
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self::new(
            defaults::DEFAULT_TRUTH_BUCKET as usize,
            defaults::DEFAULT_DELAY_STRIDE,
            defaults::DEFAULT_DELAY_LEAD,
            defaults::DEFAULT_LOSS_WINDOW as usize,
            defaults::DEFAULT_LOSS_LEAD,
        )
    }
}

/// mean of `|measure - theory| / theory`.
///
/// Pairs without a measure, or whose theory is `0` (the relative
/// error is undefined), are left out. Returns `None` if no pair is
/// left.
pub fn mean_relative_error<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, f64)>,
{
    let (sum, count) = pairs
        .into_iter()
        .filter_map(|(measure, theory)| measure.map(|measure| (measure, theory)))
        .filter(|(_, theory)| *theory != 0.0)
        .fold((0.0, 0usize), |(sum, count), (measure, theory)| {
            (sum + (measure - theory).abs() / theory.abs(), count + 1)
        });

    (count > 0).then(|| sum / count as f64)
}

pub struct Comparator<'a> {
    topology: &'a Topology,
    truth: &'a GroundTruth,
    config: ComparisonConfig,
}

impl<'a> Comparator<'a> {
    pub fn new(topology: &'a Topology, truth: &'a GroundTruth, config: ComparisonConfig) -> Self {
        Self {
            topology,
            truth,
            config,
        }
    }

    /// compare every link of the topology, in link index order.
    pub fn compare(
        &self,
        delay: &DelayEstimate,
        loss: &LossEstimate,
    ) -> Result<Vec<LinkComparison>, CompareError> {
        self.topology
            .links()
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let truth = self
                    .truth
                    .get(*link)
                    .ok_or(CompareError::MissingTruth(*link))?;
                let measured_delay = delay.smoothed(index).unwrap_or_default();
                let measured_loss = loss.link(index).unwrap_or_default();

                let delay_error = mean_relative_error(
                    self.config
                        .delay_error
                        .align(measured_delay, &truth.delay_list)
                        .into_iter()
                        .map(|(measure, theory)| (Some(measure), theory)),
                );
                let loss_error = mean_relative_error(
                    self.config
                        .loss_error
                        .align(measured_loss, &truth.loss_list),
                );

                Ok(LinkComparison {
                    link: *link,
                    delay_rows: self
                        .config
                        .delay_rows
                        .align(measured_delay, &truth.delay_list),
                    loss_rows: self.config.loss_rows.align(measured_loss, &truth.loss_list),
                    delay_error,
                    loss_error,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_truncates_to_truth() {
        let alignment = Alignment::new(1, 2, 0);
        let measured = [1.0; 10];
        let truth = [5.0, 6.0];

        let rows = alignment.align(&measured, &truth);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], (1.0, 6.0));
    }

    #[test]
    fn align_truncates_to_measured() {
        let alignment = Alignment::new(3, 3, 0);
        let measured = [1.0, 2.0, 3.0, 4.0];
        let truth = [7.0, 8.0, 9.0, 10.0];

        assert_eq!(
            alignment.align(&measured, &truth),
            vec![(1.0, 7.0), (4.0, 8.0)]
        );
    }

    #[test]
    fn lead_replicates_last_value() {
        let alignment = Alignment::new(1, 1, 2);
        let measured = [0.0, 1.0, 2.0, 3.0];
        let truth = [10.0, 11.0, 12.0, 13.0];

        let theory: Vec<_> = alignment
            .align(&measured, &truth)
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        assert_eq!(theory, vec![12.0, 13.0, 13.0, 13.0]);
    }

    #[test]
    fn whole_strides_drop_partial_tail() {
        let measured = [1.0, 2.0, 3.0, 4.0, 5.0];
        let truth = [7.0; 10];

        assert_eq!(Alignment::new(2, 1, 0).align(&measured, &truth).len(), 3);
        assert_eq!(
            Alignment::new(2, 1, 0)
                .whole_strides()
                .align(&measured, &truth),
            vec![(1.0, 7.0), (3.0, 7.0)]
        );
    }

    #[test]
    fn last_bucket_left_out() {
        let measured = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5];
        let truth = [10.0, 20.0, 30.0];

        assert_eq!(
            Alignment::new(2, 2, 0)
                .without_last_bucket()
                .align(&measured, &truth),
            vec![(1.0, 10.0), (2.0, 20.0)]
        );
        assert!(
            Alignment::new(1, 1, 0)
                .without_last_bucket()
                .align(&measured, &[10.0])
                .is_empty()
        );
    }

    #[test]
    fn default_layout() {
        let config = ComparisonConfig::default();

        assert!(!config.delay_rows.partial_stride);
        assert!(config.loss_rows.partial_stride);
        assert!(!config.loss_error.last_bucket);

        // 5000 probes of delay: 50 whole rows of 100, no partial 51st
        let delays = vec![1.0; 5_050];
        let truth = vec![1.0; 2];
        assert_eq!(config.delay_rows.align(&delays, &truth).len(), 50);
    }

    #[test]
    fn empty_truth() {
        let alignment = Alignment::new(1, 1, 0);
        assert!(alignment.align(&[1.0], &[]).is_empty());
    }

    #[test]
    fn relative_error() {
        let error = mean_relative_error([(Some(11.0), 10.0), (Some(9.0), 10.0)]).unwrap();
        assert!((error - 0.1).abs() < 1e-12);
    }

    #[test]
    fn relative_error_skips_gaps_and_zero_truth() {
        let error =
            mean_relative_error([(None, 10.0), (Some(3.0), 0.0), (Some(2.0), 4.0)]).unwrap();
        assert!((error - 0.5).abs() < 1e-12);

        assert_eq!(mean_relative_error([(None, 1.0), (Some(1.0), 0.0)]), None);
    }
}

/// Default loss window
///
/// Number of sequence numbers a loss window covers. A window ending at
/// sequence `t` counts the probes received in `(t - W, t]`.
///
/// See [`LossEstimator`] for more details
///
/// ```
/// # use nettomo_core::defaults::*;
/// assert_eq!(DEFAULT_LOSS_WINDOW, 1_000);
/// ```
///
/// [`LossEstimator`]: crate::estimate::LossEstimator
pub const DEFAULT_LOSS_WINDOW: u64 = 1_000;

/// Default delay warm up
///
/// the delay series never starts before this sequence number.
pub const DEFAULT_DELAY_WARMUP: u64 = 10;

/// Default delay smoothing
///
/// width of the moving average applied to the per link delay
/// series.
///
/// See [`smooth`] for more details
///
/// [`smooth`]: crate::estimate::smooth
pub const DEFAULT_DELAY_SMOOTHING: usize = 200;

/// Default ground truth bucket
///
/// Number of sequence numbers a ground truth value holds for. This is
/// also the length of a bucket when comparing measurements against the
/// ground truth.
pub const DEFAULT_TRUTH_BUCKET: u64 = 5_000;

/// Default delay stride
///
/// one delay row out of this many is written in the per link report.
pub const DEFAULT_DELAY_STRIDE: usize = 100;

/// Default delay lead
///
/// offset, in delay rows, between the measured delays and the ground
/// truth in the per link report.
pub const DEFAULT_DELAY_LEAD: usize = 15;

/// Default loss lead
///
/// offset, in loss rows, between the measured loss and the ground
/// truth in the per link report.
pub const DEFAULT_LOSS_LEAD: usize = 2;

/// Default expected link delay
///
/// one way delay, in milliseconds, every emulated link is configured
/// with when measuring the per hop error.
///
/// ```
/// # use nettomo_core::defaults::*;
/// assert_eq!(DEFAULT_EXPECTED_LINK_DELAY, 10.0);
/// ```
pub const DEFAULT_EXPECTED_LINK_DELAY: f64 = 10.0;

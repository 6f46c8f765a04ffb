use std::collections::VecDeque;

/// Sliding average over the last `width` samples.
///
/// Keeps a running total: every new sample adds its value and, once
/// the window is full, removes the value of the sample leaving the
/// window. Each step is `O(1)` regardless of the width.
///
/// ```
/// # use nettomo_core::estimate::MovingAverage;
/// let mut average = MovingAverage::new(2);
/// assert_eq!(average.push(1.0), None);
/// assert_eq!(average.push(3.0), Some(2.0));
/// assert_eq!(average.push(5.0), Some(4.0));
/// ```
#[derive(Debug, Clone)]
pub struct MovingAverage {
    width: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    /// # Panics
    ///
    /// if `width` is `0`.
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "a moving average needs a width of at least 1");
        Self {
            width,
            window: VecDeque::with_capacity(width),
            sum: 0.0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// add a sample, returns the average of the last `width` samples
    /// once at least `width` samples were pushed.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.sum += value;
        self.window.push_back(value);
        if self.window.len() > self.width {
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }

        (self.window.len() == self.width).then(|| self.sum / self.width as f64)
    }
}

/// smooth a whole series: entry `j` of the result is the mean of
/// `samples[j..j + width]`. The result has `len - width + 1` entries
/// (none if the series is shorter than the window).
///
/// # Panics
///
/// if `width` is `0`.
pub fn smooth(samples: &[f64], width: usize) -> Vec<f64> {
    let mut average = MovingAverage::new(width);
    samples
        .iter()
        .filter_map(|sample| average.push(*sample))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_is_exact() {
        let samples = vec![1.0; 1_000];
        let smoothed = smooth(&samples, 200);

        assert_eq!(smoothed.len(), 801);
        assert!(smoothed.iter().all(|value| *value == 1.0));
    }

    #[test]
    fn ramp() {
        let samples: Vec<f64> = (0..10).map(f64::from).collect();
        let smoothed = smooth(&samples, 4);

        assert_eq!(smoothed, vec![1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5]);
    }

    #[test]
    fn shorter_than_window() {
        assert!(smooth(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn width_one_is_identity() {
        let samples = [4.0, -2.0, 8.5];
        assert_eq!(smooth(&samples, 1), samples.to_vec());
    }

    #[test]
    #[should_panic]
    fn zero_width() {
        MovingAverage::new(0);
    }
}

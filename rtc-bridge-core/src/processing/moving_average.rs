use std::collections::VecDeque;

/// O(1) windowed mean over the last `capacity` samples.
///
/// Used to smooth diagnostic metrics (queue depth, audio levels). While the
/// window is filling, the mean is updated incrementally; once full, each
/// push evicts the oldest sample.
///
/// A capacity of 0 yields a no-op sink: pushes are ignored and the average
/// stays 0.0.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    capacity: usize,
    samples: VecDeque<f64>,
    average: f64,
}

impl MovingAverage {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            average: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() < self.capacity {
            self.samples.push_back(value);
            self.average += (value - self.average) / self.samples.len() as f64;
        } else if let Some(popped) = self.samples.pop_front() {
            self.samples.push_back(value);
            self.average += (value - popped) / self.capacity as f64;
        }
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reset to empty with a zero average.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.average = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn averages_while_filling() {
        let mut avg = MovingAverage::new(3);
        avg.push(2.0);
        avg.push(4.0);
        avg.push(6.0);
        assert_relative_eq!(avg.average(), 4.0);
        assert_eq!(avg.count(), 3);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut avg = MovingAverage::new(3);
        avg.push(2.0);
        avg.push(4.0);
        avg.push(6.0);
        avg.push(8.0); // evicts 2.0
        assert_relative_eq!(avg.average(), 6.0);
        assert_eq!(avg.count(), 3);
    }

    #[test]
    fn single_sample_is_exact() {
        let mut avg = MovingAverage::new(5);
        avg.push(42.0);
        assert_relative_eq!(avg.average(), 42.0);
    }

    #[test]
    fn clear_resets() {
        let mut avg = MovingAverage::new(3);
        avg.push(10.0);
        avg.clear();
        assert_eq!(avg.count(), 0);
        assert_relative_eq!(avg.average(), 0.0);

        avg.push(1.0);
        assert_relative_eq!(avg.average(), 1.0);
    }

    #[test]
    fn zero_capacity_is_noop_sink() {
        let mut avg = MovingAverage::new(0);
        avg.push(5.0);
        avg.push(9.0);
        assert_eq!(avg.count(), 0);
        assert_relative_eq!(avg.average(), 0.0);
    }

    #[test]
    fn long_run_stays_consistent() {
        let mut avg = MovingAverage::new(4);
        for i in 0..100 {
            avg.push(i as f64);
        }
        // Window holds 96, 97, 98, 99.
        assert_relative_eq!(avg.average(), 97.5, epsilon = 1e-9);
    }
}

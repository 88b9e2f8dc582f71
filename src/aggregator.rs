//! Bounded per-metric rolling windows.
//!
//! Each metric keeps the most recent `capacity` defined samples in insertion
//! order and exposes their running mean.

use crate::{
    constants::MAX_BUF,
    metrics::{Metric, MetricFrame},
    report::AggregateSnapshot,
};
use std::collections::VecDeque;

/// FIFO window of samples for one metric
#[derive(Debug, Clone)]
pub struct MetricBuffer {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
    evictions: usize,
}

impl MetricBuffer {
    /// Create an empty buffer
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Buffer capacity must be greater than 0");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
            evictions: 0,
        }
    }

    /// Append a sample, evicting the oldest past capacity
    ///
    /// Non-finite values are ignored. Returns whether the sample was stored.
    pub fn push(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }

        self.values.push_back(value);
        self.sum += value;

        while self.values.len() > self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
                self.evictions += 1;
            }
        }

        // Re-sum once per full turnover so subtraction error cannot accumulate
        if self.evictions >= self.capacity {
            self.sum = self.values.iter().sum();
            self.evictions = 0;
        }

        true
    }

    /// Arithmetic mean of the window, `None` when empty
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained samples, oldest first
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Summary statistics of the window, `None` when empty
    #[must_use]
    pub fn statistics(&self) -> Option<Statistics> {
        let mean = self.mean()?;
        let n = self.values.len() as f64;

        let variance = self.values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Statistics {
            count: self.values.len(),
            mean,
            std_dev,
            min,
            max,
            range: max - min,
        })
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.sum = 0.0;
        self.evictions = 0;
    }
}

/// Statistical summary of a metric window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Number of samples in the window
    pub count: usize,
    /// Mean value of the data
    pub mean: f64,
    /// Population standard deviation of the data
    pub std_dev: f64,
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
    /// Range (max - min) of the data
    pub range: f64,
}

/// One rolling buffer per [`Metric`]
#[derive(Debug, Clone)]
pub struct WindowedAggregator {
    buffers: [MetricBuffer; Metric::ALL.len()],
}

impl WindowedAggregator {
    /// Create an aggregator whose buffers hold `capacity` samples each
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: std::array::from_fn(|_| MetricBuffer::new(capacity)),
        }
    }

    /// Push one sample; non-finite values are a no-op
    pub fn push(&mut self, metric: Metric, value: f64) -> bool {
        self.buffers[metric.index()].push(value)
    }

    /// Push every defined sample of a frame, returning how many were stored
    pub fn push_frame(&mut self, frame: &MetricFrame) -> usize {
        frame
            .defined()
            .filter(|&(metric, value)| self.push(metric, value))
            .count()
    }

    #[must_use]
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.buffers[metric.index()].mean()
    }

    #[must_use]
    pub fn len(&self, metric: Metric) -> usize {
        self.buffers[metric.index()].len()
    }

    #[must_use]
    pub fn buffer(&self, metric: Metric) -> &MetricBuffer {
        &self.buffers[metric.index()]
    }

    #[must_use]
    pub fn statistics(&self, metric: Metric) -> Option<Statistics> {
        self.buffers[metric.index()].statistics()
    }

    /// Current per-metric means
    #[must_use]
    pub fn snapshot(&self) -> AggregateSnapshot {
        let mut snapshot = AggregateSnapshot::default();
        for metric in Metric::ALL {
            let buffer = self.buffer(metric);
            snapshot.set(metric, buffer.mean(), buffer.len());
        }
        snapshot
    }

    /// Drop every retained sample
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }
}

impl Default for WindowedAggregator {
    fn default() -> Self {
        Self::new(MAX_BUF)
    }
}

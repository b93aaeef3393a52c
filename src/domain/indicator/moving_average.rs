//! Rolling simple mean and exponential mean over a daily series.

/// Simple moving average maintained as a running sum over `values[tail..=head]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingMean {
    window: usize,
    head: usize,
    sum: f64,
}

impl RollingMean {
    /// Seed the window ending at `head`. `None` if fewer than `window` values
    /// exist up to `head`.
    pub fn seed(values: &[f64], head: usize, window: usize) -> Option<Self> {
        if window == 0 || head >= values.len() || head + 1 < window {
            return None;
        }
        let tail = head + 1 - window;
        let sum = values[tail..=head].iter().sum();
        Some(RollingMean { window, head, sum })
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.window as f64
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Slide one day forward: add the new head, drop the value leaving the window.
    pub fn advance(&mut self, values: &[f64]) -> Option<f64> {
        let head = self.head + 1;
        let incoming = *values.get(head)?;
        let outgoing = values[head - self.window];
        self.sum += incoming - outgoing;
        self.head = head;
        Some(self.mean())
    }
}

/// Exponential average: `avg += 2 / (window + 1) * (price - avg)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialMean {
    factor: f64,
    value: f64,
}

impl ExponentialMean {
    pub fn new(seed: f64, window: usize) -> Self {
        ExponentialMean {
            factor: 2.0 / (window as f64 + 1.0),
            value: seed,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn update(&mut self, price: f64) -> f64 {
        self.value += self.factor * (price - self.value);
        self.value
    }
}

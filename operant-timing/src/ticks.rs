//! Tick sources that drive trial polling.
//!
//! A tick source is either armed (delivering ticks) or disarmed (pending
//! forever). The trial controller arms it once on entering `Running` and
//! disarms it once on leaving.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

#[async_trait]
pub trait TickSource: Send {
    fn arm(&mut self);
    fn disarm(&mut self);
    fn is_armed(&self) -> bool;

    /// Resolves at the next tick. Never resolves while disarmed.
    async fn next_tick(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickStats {
    pub samples: usize,
    pub average_spacing_ms: f64,
    pub jitter_ms: f64,
    pub min_spacing_ms: f64,
    pub max_spacing_ms: f64,
}

impl TickStats {
    fn from_spacings(spacings: &[Duration]) -> Self {
        let times: Vec<f64> = spacings.iter().map(|d| d.as_secs_f64() * 1e3).collect();
        if times.is_empty() {
            return TickStats {
                samples: 0,
                average_spacing_ms: 0.0,
                jitter_ms: 0.0,
                min_spacing_ms: 0.0,
                max_spacing_ms: 0.0,
            };
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        TickStats {
            samples: times.len(),
            average_spacing_ms: avg,
            jitter_ms: var.sqrt(),
            min_spacing_ms: min,
            max_spacing_ms: max,
        }
    }
}

/// Fixed-period ticks on the tokio timer.
///
/// Ticks missed because the consumer was busy are skipped, not bunched up.
#[derive(Debug)]
pub struct IntervalTicks {
    period: Duration,
    interval: Option<Interval>,
    last_tick: Option<Instant>,
    spacings: Vec<Duration>,
    max_samples: usize,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
            last_tick: None,
            spacings: Vec::with_capacity(1000),
            max_samples: 1000,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spacing statistics over the most recent ticks.
    pub fn stats(&self) -> TickStats {
        TickStats::from_spacings(&self.spacings)
    }

    fn record_spacing(&mut self, d: Duration) {
        if self.spacings.len() >= self.max_samples {
            self.spacings.remove(0);
        }
        self.spacings.push(d);
    }
}

impl Default for IntervalTicks {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    fn arm(&mut self) {
        if self.interval.is_some() {
            return;
        }
        // First tick one period after arming.
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    fn disarm(&mut self) {
        self.interval = None;
        self.last_tick = None;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    async fn next_tick(&mut self) {
        let Some(interval) = self.interval.as_mut() else {
            return std::future::pending().await;
        };
        let at = interval.tick().await;
        if let Some(prev) = self.last_tick.replace(at) {
            self.record_spacing(at - prev);
        }
    }
}

/// Tick source for tests: ticks immediately while armed and counts every
/// arm/disarm call.
#[derive(Debug, Default, Clone)]
pub struct ManualTicks {
    armed: bool,
    pub arm_calls: usize,
    pub disarm_calls: usize,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TickSource for ManualTicks {
    fn arm(&mut self) {
        self.armed = true;
        self.arm_calls += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.disarm_calls += 1;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    async fn next_tick(&mut self) {
        if !self.armed {
            return std::future::pending().await;
        }
        tokio::task::yield_now().await;
    }
}

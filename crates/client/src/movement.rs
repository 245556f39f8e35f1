//! Tick-bucketed movement samples
//!
//! Between two `Move` reports the buffer keeps at most one position sample per
//! 100 ms window, anchored at the time it was last cleared. Within a window the
//! sample closest to the window's nominal point wins. Only windows 1 to 10 are
//! tracked; anything outside is dropped.

use realmlink_protocol::messages::data::{Location, LocationRecord};

/// Width of one window
pub const WINDOW_LEN: i64 = 100;

/// Highest window tracked per batch
pub const MAX_WINDOW: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementSample {
    pub time: i64,
    pub position: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovementBuffer {
    last_clear_time: i64,
    samples: Vec<MovementSample>,
}

impl Default for MovementBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementBuffer {
    /// Creates an unarmed buffer; samples are ignored until the first `clear`
    pub fn new() -> Self {
        Self {
            last_clear_time: -1,
            samples: Vec::new(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.last_clear_time >= 0
    }

    pub fn last_clear_time(&self) -> i64 {
        self.last_clear_time
    }

    pub fn samples(&self) -> &[MovementSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn window_id(&self, time: i64) -> i64 {
        ((time - self.last_clear_time + WINDOW_LEN / 2) as f64 / WINDOW_LEN as f64).round() as i64
    }

    fn score(&self, window_id: i64, time: i64) -> i64 {
        (time - self.last_clear_time - window_id * WINDOW_LEN).abs()
    }

    pub fn add_sample(&mut self, time: i64, position: Location) {
        if !self.is_armed() {
            return;
        }

        let window_id = self.window_id(time);
        if !(1..=MAX_WINDOW).contains(&window_id) {
            return;
        }

        let sample = MovementSample { time, position };
        if let Some(last) = self.samples.last() {
            if self.window_id(last.time) == window_id {
                if self.score(window_id, time) < self.score(window_id, last.time) {
                    let index = self.samples.len() - 1;
                    self.samples[index] = sample;
                }
                return;
            }
        }
        self.samples.push(sample);
    }

    /// Drops every sample and re-anchors the windows at `time`
    pub fn clear(&mut self, time: i64) {
        self.samples.clear();
        self.last_clear_time = time;
    }

    /// Samples as `Move` records
    pub fn records(&self) -> Vec<LocationRecord> {
        self.samples
            .iter()
            .map(|sample| LocationRecord {
                time: sample.time as i32,
                position: sample.position,
            })
            .collect()
    }
}

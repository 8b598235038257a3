//! Stream and trace set types

use serde::{Deserialize, Serialize};

/// One arrival schedule: an IAT array paired with its per-minute counts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrivalStream {
    /// Start offset followed by inter-arrival deltas, in microseconds
    pub iat: Vec<f64>,

    /// Arrivals per experiment minute, aligned by index
    pub per_minute: Vec<usize>,
}

impl ArrivalStream {
    /// A stream with no arrivals over `duration_minutes`
    pub fn empty(duration_minutes: u32) -> Self {
        Self {
            iat: Vec::new(),
            per_minute: vec![0; duration_minutes as usize],
        }
    }

    /// Number of arrivals
    pub fn len(&self) -> usize {
        self.iat.len()
    }

    /// Whether the stream never fires
    pub fn is_empty(&self) -> bool {
        self.iat.is_empty()
    }

    /// Offset of the first arrival from experiment start (µs)
    pub fn start_offset_us(&self) -> Option<f64> {
        self.iat.first().copied()
    }

    /// Absolute arrival times relative to experiment start (µs)
    pub fn arrival_times_us(&self) -> impl Iterator<Item = f64> + '_ {
        self.iat.iter().scan(0.0, |acc, delta| {
            *acc += delta;
            Some(*acc)
        })
    }

    /// Sum of the per-minute counts
    pub fn total_arrivals(&self) -> usize {
        self.per_minute.iter().sum()
    }

    /// Split into the IAT array and the per-minute counts
    pub fn into_parts(self) -> (Vec<f64>, Vec<usize>) {
        (self.iat, self.per_minute)
    }
}

/// All streams of one experiment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceSet {
    /// Experiment length in minutes
    pub duration_minutes: u32,

    /// One entry per independent stream
    pub streams: Vec<ArrivalStream>,
}

impl TraceSet {
    /// Create a trace set
    pub fn new(duration_minutes: u32, streams: Vec<ArrivalStream>) -> Self {
        Self {
            duration_minutes,
            streams,
        }
    }

    /// Arrivals per minute summed over all streams
    pub fn per_minute_totals(&self) -> Vec<usize> {
        let mut totals = vec![0; self.duration_minutes as usize];
        for stream in &self.streams {
            for (total, count) in totals.iter_mut().zip(&stream.per_minute) {
                *total += count;
            }
        }
        totals
    }

    /// Arrivals over the whole experiment
    pub fn total_arrivals(&self) -> usize {
        self.streams.iter().map(ArrivalStream::len).sum()
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether there are no streams
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

//! Bounded reservoir sampling of representative measurements.
//!
//! Each series owns one reservoir. Offers between two collections compete for
//! a fixed number of slots under the classic random-admission scheme
//! (Algorithm R): once the buffer is full, the `n`-th offer replaces a
//! uniformly-random slot with probability `capacity / n`, so no burst of
//! measurements systematically crowds out earlier ones. Collection drains the
//! buffer into immutable [`Exemplar`]s and resets the admission counter for
//! the next window.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use smallvec::SmallVec;

use crate::attributes::AttributeSet;
use crate::data::{Exemplar, TraceContext};
use crate::exemplar::ExemplarFilter;
use crate::value::NumberValue;

struct Sample {
    epoch_nanos: u64,
    value: NumberValue,
    attributes: AttributeSet,
    trace_context: Option<TraceContext>,
}

struct ReservoirState {
    samples: SmallVec<[Sample; 2]>,
    seen: u64,
    rng: Box<dyn RngCore + Send>,
}

/// Fixed-capacity sample store with uniform random admission.
///
/// The random source is injectable so tests can seed it; production
/// construction uses an OS-seeded [`StdRng`].
pub struct FixedSizeReservoir {
    capacity: usize,
    state: Mutex<ReservoirState>,
}

impl FixedSizeReservoir {
    /// Create a reservoir holding at most `capacity` samples per window.
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_os_rng())
    }

    /// Create a reservoir with an explicit random source.
    pub fn with_rng(capacity: usize, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            capacity,
            state: Mutex::new(ReservoirState {
                samples: SmallVec::new(),
                seen: 0,
                rng: Box::new(rng),
            }),
        }
    }

    /// Offer one measurement for retention.
    ///
    /// The offer is applied atomically with respect to a concurrent
    /// [`collect_and_reset`](Self::collect_and_reset): it lands fully in the
    /// current window or fully in the next, never partially.
    pub fn offer(
        &self,
        value: NumberValue,
        epoch_nanos: u64,
        attributes: &AttributeSet,
        trace_context: Option<TraceContext>,
    ) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.state.lock().unwrap();
        state.seen += 1;
        if state.samples.len() < self.capacity {
            state.samples.push(Sample {
                epoch_nanos,
                value,
                attributes: attributes.clone(),
                trace_context,
            });
            return;
        }
        let seen = state.seen;
        let slot = state.rng.random_range(0..seen) as usize;
        if slot < self.capacity {
            state.samples[slot] = Sample {
                epoch_nanos,
                value,
                attributes: attributes.clone(),
                trace_context,
            };
        }
    }

    /// Drain the retained samples as exemplars and reset for the next window.
    ///
    /// `point_attributes` is the attribute set of the point the exemplars will
    /// be attached to; attributes already present there are stripped from each
    /// exemplar (they are redundant with the bucketing key).
    pub fn collect_and_reset(&self, point_attributes: &AttributeSet) -> Vec<Exemplar> {
        let mut state = self.state.lock().unwrap();
        state.seen = 0;
        state
            .samples
            .drain(..)
            .map(|sample| Exemplar {
                epoch_nanos: sample.epoch_nanos,
                value: sample.value,
                trace_context: sample.trace_context,
                filtered_attributes: sample
                    .attributes
                    .iter()
                    .filter(|(key, _)| point_attributes.get(key).is_none())
                    .map(|(key, value)| (Arc::from(key), value.clone()))
                    .collect(),
            })
            .collect()
    }
}

/// Reservoir wrapper consulting an [`ExemplarFilter`] before admission.
pub struct FilteredReservoir {
    filter: Arc<dyn ExemplarFilter>,
    reservoir: FixedSizeReservoir,
}

impl FilteredReservoir {
    /// Wrap `reservoir` so that only measurements passing `filter` are offered.
    pub fn new(filter: Arc<dyn ExemplarFilter>, reservoir: FixedSizeReservoir) -> Self {
        Self { filter, reservoir }
    }

    /// Offer one measurement, subject to the filter.
    pub fn offer(
        &self,
        value: NumberValue,
        epoch_nanos: u64,
        attributes: &AttributeSet,
        trace_context: Option<TraceContext>,
    ) {
        if self.filter.should_sample(value, attributes, trace_context.as_ref()) {
            self.reservoir.offer(value, epoch_nanos, attributes, trace_context);
        }
    }

    /// See [`FixedSizeReservoir::collect_and_reset`].
    pub fn collect_and_reset(&self, point_attributes: &AttributeSet) -> Vec<Exemplar> {
        self.reservoir.collect_and_reset(point_attributes)
    }
}

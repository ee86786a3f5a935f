//! Upload progress aggregation.
//!
//! One commit tracks N concurrent uploads. Each upload owns a [`TaskProgress`]
//! slot holding its fractional progress in [0, 1]; the aggregate percent is
//! the mean of all slots times 100. Per-slot updates are clamped monotonic, so
//! the aggregate never decreases no matter how callbacks interleave.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

struct Slots {
    fractions: Mutex<Vec<f64>>,
    sink: Option<watch::Sender<f64>>,
}

impl Slots {
    fn percent_locked(fractions: &[f64]) -> f64 {
        if fractions.is_empty() {
            return 100.0;
        }
        let sum: f64 = fractions.iter().sum();
        (sum / fractions.len() as f64) * 100.0
    }
}

/// Aggregate progress over a batch of concurrent uploads.
#[derive(Clone)]
pub struct BatchProgress {
    slots: Arc<Slots>,
}

impl BatchProgress {
    /// Track `count` uploads, all starting at 0.
    pub fn new(count: usize) -> Self {
        Self {
            slots: Arc::new(Slots {
                fractions: Mutex::new(vec![0.0; count]),
                sink: None,
            }),
        }
    }

    /// Track `count` uploads, publishing every aggregate change to a watch
    /// channel as a percentage.
    pub fn with_sink(count: usize, sink: watch::Sender<f64>) -> Self {
        Self {
            slots: Arc::new(Slots {
                fractions: Mutex::new(vec![0.0; count]),
                sink: Some(sink),
            }),
        }
    }

    /// Handle for the upload at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range for the batch.
    pub fn task(&self, index: usize) -> TaskProgress {
        let len = self.slots.fractions.lock().unwrap().len();
        assert!(index < len, "task index {index} out of range for batch of {len}");
        TaskProgress {
            slots: Arc::clone(&self.slots),
            index,
        }
    }

    /// Current aggregate progress in [0, 100].
    ///
    /// An empty batch reads 100 (nothing left to transfer).
    pub fn percent(&self) -> f64 {
        let fractions = self.slots.fractions.lock().unwrap();
        Slots::percent_locked(&fractions)
    }

    /// True when every upload has reached terminal success.
    pub fn is_complete(&self) -> bool {
        let fractions = self.slots.fractions.lock().unwrap();
        fractions.iter().all(|f| *f >= 1.0)
    }
}

/// Per-upload progress handle.
///
/// Cloneable so transport callbacks can carry it; all clones update the same
/// slot.
#[derive(Clone)]
pub struct TaskProgress {
    slots: Arc<Slots>,
    index: usize,
}

impl TaskProgress {
    /// Standalone single-slot handle, for uploads tracked outside a batch.
    pub fn standalone() -> Self {
        BatchProgress::new(1).task(0)
    }

    /// Record this upload's fractional progress.
    ///
    /// Values are clamped to [0, 1] and never move backwards.
    pub fn set(&self, fraction: f64) {
        let percent = {
            let mut fractions = self.slots.fractions.lock().unwrap();
            let clamped = fraction.clamp(0.0, 1.0);
            if clamped > fractions[self.index] {
                fractions[self.index] = clamped;
            }
            Slots::percent_locked(&fractions)
        };
        if let Some(sink) = &self.slots.sink {
            let _ = sink.send(percent);
        }
    }

    /// Mark this upload terminally successful.
    pub fn finish(&self) {
        self.set(1.0);
    }

    /// Current fraction of this slot.
    pub fn fraction(&self) -> f64 {
        self.slots.fractions.lock().unwrap()[self.index]
    }
}

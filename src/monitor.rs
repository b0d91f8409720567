//! Sampling Loop
//!
//! Periodically pulls a [`Sample`] from a [`PowerSource`] and appends it to
//! the [`SampleStore`]. Lifecycle is Stopped -> Running -> Stopped: the loop
//! owns an atomic running flag, observed at each cycle boundary, and a
//! [`SamplerHandle`] lets the outside world request a stop without killing
//! an in-flight cycle.
//!
//! One sampler per store: nothing here defends against a second concurrent
//! writer, the caller keeps that from happening.

use crate::battery::{PowerSource, ReadError, Sample};
use crate::store::{SampleStore, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default pause between sampling cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Failure of a single sampling cycle.
#[derive(Error, Debug)]
pub enum SamplingError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Remote control for a running [`Sampler`].
#[derive(Clone)]
pub struct SamplerHandle {
    running: Arc<AtomicBool>,
}

impl SamplerHandle {
    /// Ask the loop to stop. The in-flight cycle finishes; no further
    /// samples are recorded after it.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// The background sampling loop.
pub struct Sampler {
    source: Arc<dyn PowerSource>,
    store: Arc<SampleStore>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl Sampler {
    pub fn new(source: Arc<dyn PowerSource>, store: Arc<SampleStore>, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle for stopping the loop from another task.
    pub fn handle(&self) -> SamplerHandle {
        SamplerHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Run until [`SamplerHandle::stop`] is called.
    ///
    /// A failed cycle is logged and skipped; the loop keeps going. Only the
    /// stop flag ends it.
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "monitoring");

        while self.running.load(Ordering::SeqCst) {
            match self.cycle() {
                Ok(sample) => {
                    tracing::debug!(
                        percent = sample.percent,
                        status = %sample.status,
                        "sample recorded"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sampling cycle skipped");
                }
            }

            tokio::time::sleep(self.interval).await;
        }

        tracing::info!("sampling loop stopped");
    }

    fn cycle(&self) -> Result<Sample, SamplingError> {
        let sample = self.source.read()?;
        self.store.insert(&sample)?;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::Status;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;

    /// Deterministic power source counting how often it was read.
    struct FakeBattery {
        reads: AtomicUsize,
        fail: bool,
    }

    impl FakeBattery {
        fn new(fail: bool) -> Self {
            Self {
                reads: AtomicUsize::new(0),
                fail,
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl PowerSource for FakeBattery {
        fn read(&self) -> Result<Sample, ReadError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ReadError::InvalidStatus("Unknown".to_string()));
            }
            Ok(Sample {
                timestamp: Utc::now(),
                percent: 50.0,
                status: Status::Discharging,
            })
        }
    }

    fn test_store() -> Arc<SampleStore> {
        let store = SampleStore::open_in_memory().unwrap();
        store.migrate().unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_stop_halts_sampling() {
        let source = Arc::new(FakeBattery::new(false));
        let sampler = Arc::new(Sampler::new(
            Arc::clone(&source) as Arc<dyn PowerSource>,
            test_store(),
            Duration::from_millis(10),
        ));
        let handle = sampler.handle();

        let task = {
            let sampler = Arc::clone(&sampler);
            tokio::spawn(async move { sampler.run().await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_running());
        handle.stop();
        task.await.unwrap();

        let reads_at_stop = source.reads();
        assert!(reads_at_stop >= 2, "expected several cycles before stop");

        // No further reads once the loop has exited
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.reads(), reads_at_stop);
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_read_failure_skips_cycle_but_continues() {
        let source = Arc::new(FakeBattery::new(true));
        let sampler = Arc::new(Sampler::new(
            Arc::clone(&source) as Arc<dyn PowerSource>,
            test_store(),
            Duration::from_millis(10),
        ));
        let handle = sampler.handle();

        let task = {
            let sampler = Arc::clone(&sampler);
            tokio::spawn(async move { sampler.run().await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop();
        task.await.unwrap();

        // Every cycle failed, yet the loop kept polling until stopped
        assert!(source.reads() >= 2);
    }

    #[tokio::test]
    async fn test_successful_cycles_persist_samples() {
        let store = test_store();
        let sampler = Arc::new(Sampler::new(
            Arc::new(FakeBattery::new(false)) as Arc<dyn PowerSource>,
            Arc::clone(&store),
            Duration::from_millis(10),
        ));
        let handle = sampler.handle();

        let task = {
            let sampler = Arc::clone(&sampler);
            tokio::spawn(async move { sampler.run().await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop();
        task.await.unwrap();

        let page = store.list_days(5, 0).unwrap();
        assert!(page.total_items >= 1);
    }
}

use std::{
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};

use crate::Time;

/// Simple static timesource that will always return the same time
#[derive(Debug)]
pub struct StaticTimeSource {
    now: SystemTime,
}

impl StaticTimeSource {
    /// Create a new `StaticTimeSource` that always returns the given time
    ///
    /// # Examples
    ///
    /// ```
    /// use metron_timesource::{TimeSource, fakes::StaticTimeSource};
    /// use std::time::UNIX_EPOCH;
    ///
    /// let ts = TimeSource::custom(StaticTimeSource::at_time(UNIX_EPOCH));
    /// assert_eq!(ts.system_time(), UNIX_EPOCH);
    /// ```
    pub fn at_time(time: impl Into<SystemTime>) -> Self {
        Self { now: time.into() }
    }
}

impl Time for StaticTimeSource {
    fn now(&self) -> SystemTime {
        self.now
    }
}

/// Timesource that is loaded with one time, but can be moved forward (or
/// replaced outright) via a cloned handle while the source is in use
#[derive(Debug, Clone)]
pub struct ManuallyAdvancedTimeSource(Arc<Mutex<SystemTime>>);

impl ManuallyAdvancedTimeSource {
    /// Create a new `ManuallyAdvancedTimeSource` started at the given time
    ///
    /// # Examples
    ///
    /// ```
    /// use metron_timesource::{TimeSource, fakes::ManuallyAdvancedTimeSource};
    /// use std::time::{Duration, UNIX_EPOCH};
    ///
    /// let fake = ManuallyAdvancedTimeSource::at_time(UNIX_EPOCH);
    /// let ts = TimeSource::custom(fake.clone());
    /// assert_eq!(ts.system_time(), UNIX_EPOCH);
    ///
    /// fake.advance(Duration::from_secs(5));
    /// assert_eq!(ts.system_time(), UNIX_EPOCH + Duration::from_secs(5));
    /// ```
    pub fn at_time(time: impl Into<SystemTime>) -> Self {
        Self(Arc::new(Mutex::new(time.into())))
    }

    /// Replace the time loaded into this source
    pub fn update_time(&self, time: impl Into<SystemTime>) {
        *self.0.lock().unwrap() = time.into();
    }

    /// Move the loaded time forward by `duration`
    pub fn advance(&self, duration: Duration) {
        let mut guard = self.0.lock().unwrap();
        *guard += duration;
    }
}

impl Time for ManuallyAdvancedTimeSource {
    fn now(&self) -> SystemTime {
        *self.0.lock().unwrap()
    }
}

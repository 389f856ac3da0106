use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current unix time in seconds
pub trait Timer {
    fn timestamp(&self) -> u32;
}

pub trait SetableTimer: Timer {
    fn set(&self, time: u32);
    fn add_seconds(&self, seconds: u32);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimer;

impl SystemTimer {
    pub fn new() -> Self {
        SystemTimer
    }
}

impl Timer for SystemTimer {
    fn timestamp(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or(0)
    }
}

/// Timer that only moves when told to
#[derive(Debug, Default)]
pub struct ManualTimer {
    current_time: AtomicU32,
}

impl ManualTimer {
    pub fn new(start: u32) -> Self {
        ManualTimer {
            current_time: AtomicU32::new(start),
        }
    }
}

impl Timer for ManualTimer {
    fn timestamp(&self) -> u32 {
        self.current_time.load(Ordering::Acquire)
    }
}

impl SetableTimer for ManualTimer {
    fn set(&self, time: u32) {
        self.current_time.store(time, Ordering::Release)
    }

    fn add_seconds(&self, seconds: u32) {
        self.current_time.fetch_add(seconds, Ordering::AcqRel);
    }
}

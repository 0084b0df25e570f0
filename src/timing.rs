//! Phase timing.

use std::time::Instant;
use tracing::info;

/// Measures how long a phase took and logs it when finished.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        info!("[{:.1}ms] {}", ms, self.name);
    }
}

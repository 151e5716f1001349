//! Wall-clock timing of one unit of stage work.

use std::time::Instant;

/// Records the seconds since [`StageTimer::start`] into a
/// `service`-labelled histogram when dropped.
#[must_use = "the timer records when it is dropped"]
pub struct StageTimer {
    started: Instant,
    histogram: &'static str,
    service: String,
}

impl StageTimer {
    pub fn start(histogram: &'static str, service: &str) -> Self {
        Self {
            started: Instant::now(),
            histogram,
            service: service.to_string(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let seconds = self.elapsed_secs();
        let service = std::mem::take(&mut self.service);
        ::metrics::histogram!(self.histogram, "service" => service).record(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_timer_measures_scope() {
        let timer = StageTimer::start("hadoop_exporter_test_duration_seconds", "namenode");
        thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed_secs() >= 0.005);
    }
}

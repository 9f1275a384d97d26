use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{RefreshKind, System};

#[derive(Debug, Clone)]
pub struct StageStats {
    pub stage: String,
    pub elapsed: Duration,
    /// Resident memory of this process after the stage, when available.
    pub memory_mb: Option<u64>,
}

#[cfg(feature = "cli")]
fn resident_memory_mb() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new_with_specifics(RefreshKind::everything());
    system.refresh_all();
    let process = system.process(pid)?;
    Some(process.memory() / 1024 / 1024)
}

#[cfg(not(feature = "cli"))]
fn resident_memory_mb() -> Option<u64> {
    None
}

/// Wall-clock timings for the extract / solve / load stages.
#[derive(Debug)]
pub struct StageTimer {
    start_time: Instant,
    last_mark: Instant,
    stages: Vec<StageStats>,
    enabled: bool,
}

impl StageTimer {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_mark: now,
            stages: Vec::new(),
            enabled,
        }
    }

    /// Closes the current stage and logs its duration.
    pub fn mark(&mut self, stage: &str) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_mark);
        self.last_mark = now;

        let memory_mb = resident_memory_mb();
        match memory_mb {
            Some(mb) => tracing::info!("⏱️ {} took {:?}, memory {}MB", stage, elapsed, mb),
            None => tracing::info!("⏱️ {} took {:?}", stage, elapsed),
        }
        self.stages.push(StageStats {
            stage: stage.to_string(),
            elapsed,
            memory_mb,
        });
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }

        let slowest = self.stages.iter().max_by_key(|s| s.elapsed);
        let peak_memory = self.stages.iter().filter_map(|s| s.memory_mb).max();
        match slowest {
            Some(stats) => tracing::info!(
                "⏱️ Total time: {:?} (slowest stage: {} at {:?}), peak memory: {}",
                self.start_time.elapsed(),
                stats.stage,
                stats.elapsed,
                peak_memory
                    .map(|mb| format!("{}MB", mb))
                    .unwrap_or_else(|| "n/a".to_string())
            ),
            None => tracing::info!("⏱️ Total time: {:?}", self.start_time.elapsed()),
        }
    }

    pub fn stages(&self) -> &[StageStats] {
        &self.stages
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for StageTimer {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_timer_records_nothing() {
        let mut timer = StageTimer::new(false);
        timer.mark("extract");
        assert!(timer.stages().is_empty());
    }

    #[test]
    fn test_enabled_timer_records_stages_in_order() {
        let mut timer = StageTimer::new(true);
        timer.mark("extract");
        timer.mark("solve");
        let names: Vec<&str> = timer.stages().iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(names, vec!["extract", "solve"]);
    }
}

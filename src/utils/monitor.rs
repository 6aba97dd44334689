#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// Tracks wall-clock time per pipeline phase and process memory via sysinfo.
/// Disabled monitors are no-ops so the engine can call them unconditionally.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    inner: Option<Mutex<MonitorState>>,
    start_time: Instant,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    pid: Pid,
    peak_memory_mb: u64,
    phases: Vec<(String, Duration)>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let inner = if enabled {
            let mut system = System::new_with_specifics(RefreshKind::everything());
            system.refresh_all();
            let pid = sysinfo::get_current_pid().expect("Failed to get current PID");
            Some(Mutex::new(MonitorState {
                system,
                pid,
                peak_memory_mb: 0,
                phases: Vec::new(),
            }))
        } else {
            None
        };

        Self {
            inner,
            start_time: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    fn memory_mb(state: &mut MonitorState) -> u64 {
        state.system.refresh_all();
        let memory_mb = state
            .system
            .process(state.pid)
            .map(|p| p.memory() / 1024 / 1024)
            .unwrap_or(0);
        if memory_mb > state.peak_memory_mb {
            state.peak_memory_mb = memory_mb;
        }
        memory_mb
    }

    /// 記錄並輸出當前階段的統計
    pub fn log_stats(&self, phase: &str) {
        let Some(inner) = &self.inner else { return };
        let Ok(mut state) = inner.lock() else { return };

        let elapsed = self.start_time.elapsed();
        let memory_mb = Self::memory_mb(&mut state);
        state.phases.push((phase.to_string(), elapsed));

        tracing::info!(
            "📊 {} - Memory: {}MB (peak {}MB), Elapsed: {:?}",
            phase,
            memory_mb,
            state.peak_memory_mb,
            elapsed
        );
    }

    pub fn log_final_stats(&self) {
        let Some(inner) = &self.inner else { return };
        let Ok(mut state) = inner.lock() else { return };

        // Refresh once more so the peak includes the load phase
        Self::memory_mb(&mut state);
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            self.start_time.elapsed(),
            state.peak_memory_mb
        );
        for (phase, at) in &state.phases {
            tracing::info!("   ⏱️ {} reached at {:?}", phase, at);
        }
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 為非CLI環境提供空實現
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

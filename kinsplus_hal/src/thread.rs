//! Cyclic scheduler: fixed-period invocation of registered functs.
//!
//! Components register their per-cycle functions once at setup
//! (`add_funct`); the thread then invokes every funct each cycle, in
//! registration order. That static order is the only ordering guarantee on
//! the pin boundary: a funct reading cells written by an earlier funct in
//! the same cycle needs no further synchronization.
//!
//! Two pacing strategies:
//! - default: `Instant`-based loop with `std::thread::sleep` (simulation),
//! - `rt` feature: absolute-time `clock_nanosleep(TIMER_ABSTIME)` on
//!   `CLOCK_MONOTONIC` for drift-free pacing, plus the full RT setup
//!   sequence (mlockall, stack prefault, affinity, SCHED_FIFO).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::HalError;

/// A registered per-cycle function. Receives the period in nanoseconds.
pub type Funct = Box<dyn FnMut(i64) + Send>;

struct FunctEntry {
    name: String,
    funct: Funct,
}

// ─── Timing Statistics ──────────────────────────────────────────────

/// O(1) per-cycle timing statistics. Updated every cycle, no allocation.
#[derive(Debug, Clone)]
pub struct TimingStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Cycles that exceeded the period budget.
    pub violations: u64,
}

impl TimingStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            violations: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
    }

    /// Average cycle time [ns] (0 if no cycles yet).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for TimingStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), HalError> {
    use nix::sys::mman::{MlockAllFlags, mlockall};
    mlockall(MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE)
        .map_err(|e| HalError::RtSetup(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), HalError> {
    Ok(()) // No-op in simulation mode
}

/// Prefault stack pages to prevent page faults once the loop is running.
fn prefault_stack() {
    let mut buf = [0u8; 1024 * 1024];
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to a specific CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), HalError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| HalError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| HalError::RtSetup(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), HalError> {
    Ok(()) // No-op in simulation mode
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), HalError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(HalError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), HalError> {
    Ok(()) // No-op in simulation mode
}

/// Perform the full RT setup sequence before entering the cycle loop.
///
/// In simulation mode (no `rt` feature), all RT calls are no-ops.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), HalError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

/// Detect whether the current thread runs under an RT scheduler policy.
pub fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        unsafe {
            let policy = sched_getscheduler(0);
            policy == SCHED_FIFO || policy == SCHED_RR
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

// ─── Cyclic Thread ──────────────────────────────────────────────────

/// Fixed-period scheduler invoking registered functs in registration order.
pub struct CyclicThread {
    functs: Vec<FunctEntry>,
    period: Duration,
    running: Arc<AtomicBool>,
    stats: TimingStats,
}

impl CyclicThread {
    /// Create an idle scheduler with the given cycle period.
    pub fn new(period: Duration) -> Self {
        Self {
            functs: Vec::new(),
            period,
            running: Arc::new(AtomicBool::new(false)),
            stats: TimingStats::new(),
        }
    }

    /// Register a per-cycle funct. Functs run every cycle in the order they
    /// were registered; names must be unique.
    pub fn add_funct(&mut self, name: &str, funct: Funct) -> Result<(), HalError> {
        if self.functs.iter().any(|f| f.name == name) {
            return Err(HalError::DuplicateFunct {
                name: name.to_string(),
            });
        }
        self.functs.push(FunctEntry {
            name: name.to_string(),
            funct,
        });
        Ok(())
    }

    /// Registered funct names, in invocation order.
    pub fn funct_names(&self) -> impl Iterator<Item = &str> {
        self.functs.iter().map(|f| f.name.as_str())
    }

    /// Configured cycle period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Shared running flag, for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Timing statistics collected so far.
    pub fn stats(&self) -> &TimingStats {
        &self.stats
    }

    /// Run every registered funct exactly once with the given period.
    ///
    /// This is the cycle body `run()` executes; tests call it directly to
    /// drive cycles synchronously.
    pub fn step(&mut self, period_ns: i64) {
        for entry in &mut self.functs {
            (entry.funct)(period_ns);
        }
    }

    /// Enter the cycle loop. Blocks until the running flag is cleared.
    pub fn run(&mut self) -> Result<(), HalError> {
        self.running.store(true, Ordering::SeqCst);

        if detect_rt_mode() {
            debug!("cyclic thread running under an RT scheduler policy");
        }

        #[cfg(feature = "rt")]
        {
            self.run_rt_loop()
        }

        #[cfg(not(feature = "rt"))]
        {
            self.run_sim_loop()
        }
    }

    /// RT cycle loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self) -> Result<(), HalError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let period_ns = self.period.as_nanos() as i64;
        let clock = ClockId::CLOCK_MONOTONIC;
        let mut next_wake =
            clock_gettime(clock).map_err(|e| HalError::RtSetup(format!("clock_gettime: {e}")))?;

        while self.running.load(Ordering::SeqCst) {
            next_wake = timespec_add_ns(next_wake, period_ns);

            let cycle_start = clock_gettime(clock)
                .map_err(|e| HalError::RtSetup(format!("clock_gettime: {e}")))?;

            self.step(period_ns);

            let cycle_end = clock_gettime(clock)
                .map_err(|e| HalError::RtSetup(format!("clock_gettime: {e}")))?;
            let duration_ns = timespec_diff_ns(&cycle_end, &cycle_start);
            self.record_cycle(duration_ns, period_ns);

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    /// Simulation cycle loop using `std::thread::sleep`.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self) -> Result<(), HalError> {
        use std::time::Instant;

        let period_ns = self.period.as_nanos() as i64;

        while self.running.load(Ordering::SeqCst) {
            let cycle_start = Instant::now();

            self.step(period_ns);

            let elapsed = cycle_start.elapsed();
            self.record_cycle(elapsed.as_nanos() as i64, period_ns);

            if let Some(remaining) = self.period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }

    fn record_cycle(&mut self, duration_ns: i64, period_ns: i64) {
        self.stats.record(duration_ns);

        if duration_ns > period_ns {
            self.stats.violations += 1;
            if self.stats.violations <= 10 || self.stats.violations % 1000 == 0 {
                warn!(
                    "timing violation #{}: cycle took {}ns (budget {}ns)",
                    self.stats.violations, duration_ns, period_ns
                );
            }
        }

        if self.stats.cycle_count % 1000 == 0 {
            debug!(
                "cyclic thread: {} cycles, avg={}ns, max={}ns, violations={}",
                self.stats.cycle_count,
                self.stats.avg_cycle_ns(),
                self.stats.max_cycle_ns,
                self.stats.violations
            );
        }
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// Compute the difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn timing_stats_basic() {
        let mut stats = TimingStats::new();
        assert_eq!(stats.cycle_count, 0);
        assert_eq!(stats.avg_cycle_ns(), 0);

        stats.record(500_000);
        assert_eq!(stats.cycle_count, 1);
        assert_eq!(stats.last_cycle_ns, 500_000);
        assert_eq!(stats.min_cycle_ns, 500_000);
        assert_eq!(stats.max_cycle_ns, 500_000);
        assert_eq!(stats.avg_cycle_ns(), 500_000);

        stats.record(700_000);
        assert_eq!(stats.min_cycle_ns, 500_000);
        assert_eq!(stats.max_cycle_ns, 700_000);
        assert_eq!(stats.avg_cycle_ns(), 600_000);
    }

    #[test]
    fn step_invokes_functs_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut thread = CyclicThread::new(Duration::from_millis(1));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            thread
                .add_funct(tag, Box::new(move |_| order.lock().unwrap().push(tag)))
                .unwrap();
        }

        thread.step(1_000_000);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(
            thread.funct_names().collect::<Vec<_>>(),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn step_passes_period_through() {
        let seen = Arc::new(Mutex::new(0i64));
        let mut thread = CyclicThread::new(Duration::from_millis(1));
        {
            let seen = Arc::clone(&seen);
            thread
                .add_funct("probe", Box::new(move |p| *seen.lock().unwrap() = p))
                .unwrap();
        }
        thread.step(2_000_000);
        assert_eq!(*seen.lock().unwrap(), 2_000_000);
    }

    #[test]
    fn duplicate_funct_rejected() {
        let mut thread = CyclicThread::new(Duration::from_millis(1));
        thread.add_funct("update", Box::new(|_| {})).unwrap();
        let err = thread.add_funct("update", Box::new(|_| {})).unwrap_err();
        assert!(matches!(err, HalError::DuplicateFunct { .. }));
    }

    #[test]
    fn rt_setup_no_rt_feature_is_noop() {
        #[cfg(not(feature = "rt"))]
        {
            assert!(rt_setup(0, 80).is_ok());
        }
    }
}

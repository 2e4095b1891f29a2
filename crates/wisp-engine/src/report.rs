//! Per-step and per-injection bookkeeping returned to the driver.
//!
//! Wisp surfaces non-fatal conditions as typed counters rather than a
//! logging side channel; the driver decides what to do with them.

/// Counters from one [`MigrationCoordinator::step`](crate::MigrationCoordinator::step).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles advanced by the integrator this step.
    pub advected: usize,
    /// Particles that left the local subdomain and were sent away.
    pub sent: usize,
    /// Migration items received from other processes (before ownership
    /// classification).
    pub received: usize,
    /// Received items accepted into the local active set.
    pub absorbed: usize,
    /// Received items this process declined during reconciliation. An
    /// item declined by *every* process has left the domain for good.
    pub rejected: usize,
    /// Particles whose time coordinate fell outside the cached time
    /// bracket beyond tolerance. Reported only — the particles are still
    /// processed.
    pub time_window_violations: usize,
}

/// Result of one seed injection event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InjectReport {
    /// Seeds this process accepted and now owns.
    pub local_assigned: usize,
    /// Seeds accepted across the whole group; populated on rank 0 only
    /// (the reduction root).
    pub total_assigned: Option<u64>,
    /// The reinjection counter value stamped on every candidate of this
    /// event.
    pub injected_step_id: i32,
}

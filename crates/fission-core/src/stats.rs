//! Simulation statistics collection trait

/// Trait for collecting reactor statistics
///
/// This allows fission-core to record events without depending on whatever
/// the host does with them (debug overlay, run report, nothing).
pub trait ReactorStats {
    /// Record neutrons created by emission or gas reactions
    fn record_neutrons_spawned(&mut self, count: u32);

    /// Record a neutron stopped inside a part
    fn record_neutron_absorbed(&mut self);

    /// Record neutrons that left the grid and hit the casing
    fn record_neutrons_leaked(&mut self, count: u32);

    /// Record one gas-phase reaction step
    fn record_gas_reaction(&mut self);

    /// Record that a part melted
    fn record_part_melted(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl ReactorStats for NoopStats {
    fn record_neutrons_spawned(&mut self, _count: u32) {}
    fn record_neutron_absorbed(&mut self) {}
    fn record_neutrons_leaked(&mut self, _count: u32) {}
    fn record_gas_reaction(&mut self) {}
    fn record_part_melted(&mut self) {}
}

/// Running totals, used by the headless runner and tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountingStats {
    pub spawned: u64,
    pub absorbed: u64,
    pub leaked: u64,
    pub gas_reactions: u64,
    pub melted: u64,
}

impl ReactorStats for CountingStats {
    fn record_neutrons_spawned(&mut self, count: u32) {
        self.spawned += u64::from(count);
    }

    fn record_neutron_absorbed(&mut self) {
        self.absorbed += 1;
    }

    fn record_neutrons_leaked(&mut self, count: u32) {
        self.leaked += u64::from(count);
    }

    fn record_gas_reaction(&mut self) {
        self.gas_reactions += 1;
    }

    fn record_part_melted(&mut self) {
        self.melted += 1;
    }
}

//! Run results and reporting

use anyhow::{Context, Result};
use fission_core::{CountingStats, MeltdownReport, ReactorSnapshot};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::verification::VerificationResult;

/// One row of the periodic status table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalRow {
    /// Ticks completed
    pub tick: u64,
    pub casing_temperature: f32,
    /// Hottest part, or the casing when the grid is empty
    pub peak_part_temperature: f32,
    pub thermal_power: f32,
    pub radiation_level: f32,
    pub control_rod_actual: f32,
    pub control_rod_set: f32,
    pub neutrons: usize,
    pub melted_parts: usize,
    pub alarm: bool,
}

/// What a meltdown did, and when
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeltdownSummary {
    pub tick: u64,
    pub badness: f32,
    pub explosion_intensity: f32,
    pub debris_throws: u32,
    pub tritium_released: f32,
    pub destroyed_parts: usize,
}

impl MeltdownSummary {
    pub fn new(tick: u64, report: &MeltdownReport) -> Self {
        Self {
            tick,
            badness: report.badness,
            explosion_intensity: report.explosion_intensity,
            debris_throws: report.debris_throws,
            tritium_released: report.tritium_released,
            destroyed_parts: report.destroyed_parts.len(),
        }
    }
}

/// Neutron totals over the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NeutronTotals {
    pub spawned: u64,
    pub absorbed: u64,
    pub leaked: u64,
    pub gas_reactions: u64,
    pub parts_melted: u64,
}

impl From<CountingStats> for NeutronTotals {
    fn from(stats: CountingStats) -> Self {
        Self {
            spawned: stats.spawned,
            absorbed: stats.absorbed,
            leaked: stats.leaked,
            gas_reactions: stats.gas_reactions,
            parts_melted: stats.melted,
        }
    }
}

/// Report from one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario_name: String,
    pub seed: u64,
    /// Ticks the reactor actually processed
    pub ticks_run: u64,
    /// Ticks skipped for a missing pipe or a bad timestep
    pub ticks_skipped: u64,
    pub rows: Vec<IntervalRow>,

    pub peak_casing_temperature: f32,
    pub peak_radiation: f32,
    /// Sum of the per-tick radiation level
    pub total_radiation: f32,
    /// Times the overheat alarm went off
    pub alarms: usize,
    pub totals: NeutronTotals,
    pub meltdown: Option<MeltdownSummary>,

    /// Actions the reactor refused, with the reason
    pub rejected_actions: Vec<String>,
    pub verification_failures: Vec<VerificationResult>,
    pub passed: bool,

    pub final_snapshot: ReactorSnapshot,
}

impl RunReport {
    /// Save report to a RON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize run report to RON")?;

        std::fs::write(path.as_ref(), ron)
            .with_context(|| format!("Failed to write report: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn snapshot_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(&self.final_snapshot, ron::ser::PrettyConfig::default())
            .context("Failed to serialize reactor snapshot")
    }

    /// Header and rows of the status table
    pub fn table(&self) -> String {
        let mut out = format!(
            "{:>6} {:>9} {:>9} {:>12} {:>9} {:>6} {:>6} {:>8} {:>6} {:>5}\n",
            "tick",
            "casing K",
            "peak K",
            "power W",
            "rad",
            "rods",
            "set",
            "neutrons",
            "melted",
            "alarm"
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{:>6} {:>9.1} {:>9.1} {:>12.1} {:>9.1} {:>6.2} {:>6.2} {:>8} {:>6} {:>5}\n",
                row.tick,
                row.casing_temperature,
                row.peak_part_temperature,
                row.thermal_power,
                row.radiation_level,
                row.control_rod_actual,
                row.control_rod_set,
                row.neutrons,
                row.melted_parts,
                if row.alarm { "!" } else { "" }
            ));
        }
        out
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {} (seed {})", self.scenario_name, self.seed)?;
        write!(f, "{}", self.table())?;
        writeln!(f)?;
        writeln!(
            f,
            "Ticks: {} run, {} skipped",
            self.ticks_run, self.ticks_skipped
        )?;
        writeln!(
            f,
            "Casing peak: {:.1} K | Radiation peak: {:.1}, total {:.1} | Alarms: {}",
            self.peak_casing_temperature, self.peak_radiation, self.total_radiation, self.alarms
        )?;
        writeln!(
            f,
            "Neutrons: {} spawned, {} absorbed, {} leaked | Gas reactions: {} | Parts melted: {}",
            self.totals.spawned,
            self.totals.absorbed,
            self.totals.leaked,
            self.totals.gas_reactions,
            self.totals.parts_melted
        )?;

        match &self.meltdown {
            Some(m) => writeln!(
                f,
                "MELTDOWN at tick {}: badness {:.1}, explosion {:.0}, {} debris, {:.1} mol tritium, {} parts lost",
                m.tick,
                m.badness,
                m.explosion_intensity,
                m.debris_throws,
                m.tritium_released,
                m.destroyed_parts
            )?,
            None => writeln!(f, "No meltdown")?,
        }

        for rejected in &self.rejected_actions {
            writeln!(f, "  rejected: {}", rejected)?;
        }
        for failure in &self.verification_failures {
            writeln!(f, "  ✗ {}", failure.message)?;
        }
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        write!(f, "Result: {}", verdict)
    }
}

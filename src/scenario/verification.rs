//! Checks run against a finished scenario

use serde::{Deserialize, Serialize};

use super::results::RunReport;

/// Conditions that can be verified after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VerificationCondition {
    /// Assert whether the reactor melted down
    MeltedDown { expected: bool },

    /// Assert the casing never got hotter than `max` (Kelvin)
    MaxCasingTemperature { max: f32 },

    /// Assert the radiation level never exceeded `max`
    MaxRadiation { max: f32 },

    /// Assert total radiation over the run stayed within a range
    TotalRadiationRange { min: f32, max: f32 },

    /// Assert whether the overheat alarm ever went off
    AlarmRaised { expected: bool },

    /// Assert at most `max` parts melted
    MaxPartsMelted { max: u64 },

    /// Assert how many cells are occupied at the end
    OccupiedCells { expected: usize },
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
}

impl VerificationResult {
    fn check(passed: bool, message: String) -> Self {
        Self { passed, message }
    }
}

impl VerificationCondition {
    pub fn evaluate(&self, report: &RunReport) -> VerificationResult {
        match self {
            Self::MeltedDown { expected } => {
                let melted = report.meltdown.is_some();
                VerificationResult::check(
                    melted == *expected,
                    format!("Meltdown: expected {}, got {}", expected, melted),
                )
            }

            Self::MaxCasingTemperature { max } => VerificationResult::check(
                report.peak_casing_temperature <= *max,
                format!(
                    "Casing peak {:.1} K (max {:.1} K)",
                    report.peak_casing_temperature, max
                ),
            ),

            Self::MaxRadiation { max } => VerificationResult::check(
                report.peak_radiation <= *max,
                format!(
                    "Radiation peak {:.1} (max {:.1})",
                    report.peak_radiation, max
                ),
            ),

            Self::TotalRadiationRange { min, max } => VerificationResult::check(
                (*min..=*max).contains(&report.total_radiation),
                format!(
                    "Total radiation {:.1} (expected {:.1}..={:.1})",
                    report.total_radiation, min, max
                ),
            ),

            Self::AlarmRaised { expected } => {
                let raised = report.alarms > 0;
                VerificationResult::check(
                    raised == *expected,
                    format!("Overheat alarm: expected {}, got {}", expected, raised),
                )
            }

            Self::MaxPartsMelted { max } => VerificationResult::check(
                report.totals.parts_melted <= *max,
                format!("Parts melted: {} (max {})", report.totals.parts_melted, max),
            ),

            Self::OccupiedCells { expected } => {
                let occupied = report.final_snapshot.parts.len();
                VerificationResult::check(
                    occupied == *expected,
                    format!("Occupied cells: expected {}, got {}", expected, occupied),
                )
            }
        }
    }
}

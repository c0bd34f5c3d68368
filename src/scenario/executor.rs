//! Scenario execution engine

use anyhow::{Context, Result};
use fission_core::{
    AudioCue, Compass, CountingStats, EffectLog, EffectRequest, GasMixture, GasPorts,
    GridCellFactory, Neutron, PrefabFactory, Reactor, RodAdjustment, TickStatus,
};
use glam::IVec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use super::actions::ScenarioAction;
use super::definition::ScenarioDefinition;
use super::results::{IntervalRow, MeltdownSummary, RunReport};
use crate::config::{AppConfig, AtmosphereConfig};

type HeadlessReactor = Reactor<GasMixture, Xoshiro256StarStar>;

/// Settings for one run, after the CLI and scenario have been merged
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ticks: u64,
    pub seed: u64,
    /// Seconds per tick
    pub timestep: f32,
    /// Ticks between table rows
    pub interval: u64,
    pub stop_on_meltdown: bool,
    pub atmosphere: AtmosphereConfig,
}

impl RunOptions {
    /// Command line beats scenario beats app config
    pub fn resolve(
        app: &AppConfig,
        scenario: &ScenarioDefinition,
        seed: Option<u64>,
        ticks: Option<u64>,
    ) -> Self {
        Self {
            ticks: ticks.or(scenario.ticks).unwrap_or(app.run.ticks),
            seed: seed.or(scenario.seed).unwrap_or(app.run.seed),
            timestep: app.run.timestep,
            interval: app.report.interval.max(1),
            stop_on_meltdown: app.run.stop_on_meltdown,
            atmosphere: app.atmosphere.clone(),
        }
    }
}

/// Runs a scenario against a headless reactor
pub struct ScenarioExecutor {
    options: RunOptions,
    factory: PrefabFactory,
    /// Rejected actions, with the reason
    rejected: Vec<String>,
}

impl ScenarioExecutor {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            factory: PrefabFactory::default(),
            rejected: Vec::new(),
        }
    }

    /// Execute a complete scenario
    pub fn execute(&mut self, scenario: &ScenarioDefinition) -> Result<RunReport> {
        let options = self.options.clone();
        self.factory = PrefabFactory::new(scenario.part_temperature);
        self.rejected.clear();

        log::info!(
            "Starting scenario '{}' ({} ticks, seed {})",
            scenario.name,
            options.ticks,
            options.seed
        );
        if !scenario.description.is_empty() {
            log::info!("Description: {}", scenario.description);
        }

        let air = GasMixture::new(
            options.atmosphere.casing_air_volume,
            scenario.reactor.casing_initial_temperature,
        );
        let mut reactor: HeadlessReactor = Reactor::new(
            scenario.layout.width,
            scenario.layout.height,
            scenario.reactor.clone(),
            air,
            Xoshiro256StarStar::seed_from_u64(options.seed),
        );
        reactor
            .apply_layout(&scenario.layout, &mut self.factory)
            .with_context(|| format!("Failed to build layout for '{}'", scenario.name))?;

        let mut ambient = GasMixture::new(
            options.atmosphere.ambient_volume,
            options.atmosphere.ambient_temperature,
        );
        let mut effects = EffectLog::default();
        let mut stats = CountingStats::default();

        let mut rows = Vec::new();
        let mut ticks_run = 0;
        let mut ticks_skipped = 0;
        let mut peak_casing = reactor.casing_temperature();
        let mut peak_radiation: f32 = 0.0;
        let mut total_radiation = 0.0;
        let mut meltdown = None;

        for tick in 0..options.ticks {
            for timed in scenario.timeline.iter().filter(|t| t.tick == tick) {
                if let Some(forced) = self.apply_action(
                    &mut reactor,
                    scenario,
                    &timed.action,
                    &mut ambient,
                    &mut effects,
                    tick,
                ) {
                    meltdown = Some(forced);
                }
            }

            let mut inlet = scenario.coolant.to_mixture();
            let mut outlet = GasMixture::new(
                options.atmosphere.outlet_volume,
                options.atmosphere.ambient_temperature,
            );
            let ports = GasPorts::new(&mut inlet, &mut outlet).with_ambient(&mut ambient);

            match reactor.tick(options.timestep, ports, &mut effects, &mut stats) {
                TickStatus::Inert => {}
                TickStatus::Skipped(reason) => {
                    log::debug!("Tick {} skipped: {:?}", tick, reason);
                    ticks_skipped += 1;
                }
                TickStatus::Processed(_) => ticks_run += 1,
                TickStatus::MeltedDown { report, .. } => {
                    ticks_run += 1;
                    meltdown = Some(MeltdownSummary::new(tick, &report));
                }
            }

            peak_casing = peak_casing.max(reactor.casing_temperature());
            peak_radiation = peak_radiation.max(reactor.radiation_level());
            total_radiation += reactor.radiation_level();

            let done = tick + 1;
            let stop = reactor.is_melted() && options.stop_on_meltdown;
            if done % options.interval == 0 || stop || done == options.ticks {
                rows.push(interval_row(&reactor, done));
            }
            if stop {
                log::info!("Stopping after meltdown at tick {}", tick);
                break;
            }
        }

        let alarms = effects
            .requests
            .iter()
            .filter(|r| **r == EffectRequest::Audio(AudioCue::OverheatAlarm))
            .count();

        let mut report = RunReport {
            scenario_name: scenario.name.clone(),
            seed: options.seed,
            ticks_run,
            ticks_skipped,
            rows,
            peak_casing_temperature: peak_casing,
            peak_radiation,
            total_radiation,
            alarms,
            totals: stats.into(),
            meltdown,
            rejected_actions: self.rejected.clone(),
            verification_failures: Vec::new(),
            passed: true,
            final_snapshot: reactor.snapshot(),
        };

        for condition in &scenario.verify {
            let result = condition.evaluate(&report);
            log::info!(
                "  {} {}",
                if result.passed { "✓" } else { "✗" },
                result.message
            );
            if !result.passed {
                report.verification_failures.push(result);
            }
        }
        report.passed = report.verification_failures.is_empty();

        log::info!(
            "Scenario complete: {} ({} ticks)",
            if report.passed { "PASSED" } else { "FAILED" },
            report.ticks_run
        );
        Ok(report)
    }

    /// Execute a single action. Refusals are logged and recorded, not fatal.
    /// Returns the meltdown if the action forced one.
    fn apply_action(
        &mut self,
        reactor: &mut HeadlessReactor,
        scenario: &ScenarioDefinition,
        action: &ScenarioAction,
        ambient: &mut GasMixture,
        effects: &mut EffectLog,
        tick: u64,
    ) -> Option<MeltdownSummary> {
        log::debug!("[Tick {}] {:?}", tick, action);
        let mut forced = None;

        let outcome: Result<(), String> = match action {
            ScenarioAction::SetRods { level } => reactor
                .set_control_rod_target(RodAdjustment::Absolute(*level))
                .map(|set| log::info!("Rods set to {:.2}", set))
                .map_err(|e| e.to_string()),

            ScenarioAction::AdjustRods { delta } => reactor
                .set_control_rod_target(RodAdjustment::Delta(*delta))
                .map(|set| log::info!("Rods adjusted to {:.2}", set))
                .map_err(|e| e.to_string()),

            ScenarioAction::SetRodAt { x, y, level } => reactor
                .set_rod_target_at(IVec2::new(*x, *y), *level)
                .map_err(|e| e.to_string()),

            ScenarioAction::PlacePart { x, y, prefab } => {
                let position = IVec2::new(*x, *y);
                match self.factory.create(position, prefab) {
                    Some(part) => reactor
                        .insert_part(position, part)
                        .map_err(|e| e.to_string()),
                    None => Err(format!("unknown prefab '{}'", prefab)),
                }
            }

            ScenarioAction::RemovePart { x, y } => {
                let position = IVec2::new(*x, *y);
                reactor
                    .swap_part(position, None)
                    .map(|removed| {
                        if let Some(part) = removed {
                            log::info!("Removed {} from ({}, {})", part.name, x, y);
                            self.factory.destroy(position, part);
                        }
                    })
                    .map_err(|e| e.to_string())
            }

            ScenarioAction::RepairPart { x, y } => reactor
                .repair_part(IVec2::new(*x, *y), &mut self.factory)
                .map(|repaired| {
                    if !repaired {
                        log::info!("Part at ({}, {}) needed no repair", x, y);
                    }
                })
                .map_err(|e| e.to_string()),

            ScenarioAction::InjectNeutrons {
                x,
                y,
                count,
                velocity,
            } => {
                let position = IVec2::new(*x, *y);
                let placed = (0..*count)
                    .filter(|i| {
                        let heading = Compass::CARDINALS[*i as usize % Compass::CARDINALS.len()];
                        reactor.inject_neutron(position, Neutron::new(heading, *velocity))
                    })
                    .count();
                if placed as u32 == *count {
                    Ok(())
                } else {
                    Err(format!("only {} of {} neutrons placed", placed, count))
                }
            }

            ScenarioAction::SetCasingTemperature { kelvin } => {
                reactor.set_casing_temperature(*kelvin);
                Ok(())
            }

            ScenarioAction::TriggerMeltdown => {
                match reactor.trigger_meltdown(Some(ambient), effects) {
                    Some(report) => {
                        log::info!("Forced meltdown, badness {:.1}", report.badness);
                        forced = Some(MeltdownSummary::new(tick, &report));
                        Ok(())
                    }
                    None => Err("reactor already melted down".to_string()),
                }
            }

            ScenarioAction::Reset => reactor
                .reset(&scenario.layout, &mut self.factory)
                .map(|placed| log::info!("Reactor reset with {} parts", placed))
                .map_err(|e| e.to_string()),

            ScenarioAction::Log { message } => {
                log::info!("[Tick {}] {}", tick, message);
                Ok(())
            }
        };

        if let Err(reason) = outcome {
            log::warn!("[Tick {}] {:?} rejected: {}", tick, action, reason);
            self.rejected
                .push(format!("tick {}: {:?}: {}", tick, action, reason));
        }
        forced
    }
}

fn interval_row(reactor: &HeadlessReactor, tick: u64) -> IntervalRow {
    let snapshot = reactor.snapshot();
    IntervalRow {
        tick,
        casing_temperature: snapshot.casing_temperature,
        peak_part_temperature: snapshot
            .hottest_part()
            .map(|p| p.temperature)
            .unwrap_or(snapshot.casing_temperature),
        thermal_power: snapshot.thermal_power,
        radiation_level: snapshot.radiation_level,
        control_rod_actual: snapshot.control_rod_actual,
        control_rod_set: snapshot.control_rod_set,
        neutrons: reactor.grid().total_neutrons(),
        melted_parts: snapshot.parts.iter().filter(|p| p.melted).count(),
        alarm: snapshot.overheat_alarm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::actions::TimedAction;
    use crate::scenario::verification::VerificationCondition;
    use fission_core::PartId;

    fn options(ticks: u64) -> RunOptions {
        RunOptions {
            ticks,
            seed: 5,
            timestep: 0.5,
            interval: 10,
            stop_on_meltdown: true,
            atmosphere: AtmosphereConfig::default(),
        }
    }

    fn scenario(timeline: Vec<TimedAction>) -> ScenarioDefinition {
        ScenarioDefinition::from_ron_str(
            r#"(
                name: "unit",
                layout: (
                    width: 3,
                    height: 1,
                    cells: [
                        (x: 0, y: 0, prefab: "control_rod"),
                        (x: 1, y: 0, prefab: "fuel_rod_thorium"),
                    ],
                ),
            )"#,
        )
        .map(|mut s| {
            s.timeline = timeline;
            s
        })
        .unwrap()
    }

    #[test]
    fn test_rows_follow_interval() {
        let report = ScenarioExecutor::new(options(35))
            .execute(&scenario(vec![]))
            .unwrap();

        let ticks: Vec<u64> = report.rows.iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![10, 20, 30, 35]);
        assert_eq!(report.ticks_run, 35);
        assert!(report.meltdown.is_none());
        assert!(report.passed);
    }

    #[test]
    fn test_timeline_actions_apply() {
        let timeline = vec![
            TimedAction {
                tick: 0,
                action: ScenarioAction::SetRods { level: 0.0 },
            },
            TimedAction {
                tick: 2,
                action: ScenarioAction::PlacePart {
                    x: 2,
                    y: 0,
                    prefab: PartId::MODERATOR.to_string(),
                },
            },
        ];
        let report = ScenarioExecutor::new(options(20))
            .execute(&scenario(timeline))
            .unwrap();

        assert!(
            report.rejected_actions.is_empty(),
            "{:?}",
            report.rejected_actions
        );
        assert_eq!(report.final_snapshot.parts.len(), 3);
        assert_eq!(report.final_snapshot.control_rod_set, 0.0);
        assert!(report.final_snapshot.control_rod_actual < 0.05);
    }

    #[test]
    fn test_refused_action_is_recorded() {
        let timeline = vec![TimedAction {
            tick: 1,
            action: ScenarioAction::SetRods { level: 7.0 },
        }];
        let report = ScenarioExecutor::new(options(5))
            .execute(&scenario(timeline))
            .unwrap();

        assert_eq!(report.rejected_actions.len(), 1);
        assert!(report.rejected_actions[0].contains("tick 1"));
    }

    #[test]
    fn test_forced_meltdown_stops_run() {
        let mut scenario = scenario(vec![TimedAction {
            tick: 4,
            action: ScenarioAction::TriggerMeltdown,
        }]);
        scenario.verify = vec![
            VerificationCondition::MeltedDown { expected: true },
            VerificationCondition::OccupiedCells { expected: 0 },
        ];

        let report = ScenarioExecutor::new(options(50))
            .execute(&scenario)
            .unwrap();

        // Forced outside a tick, so the run notices on the next one
        assert!(report.final_snapshot.melted);
        assert_eq!(report.rows.last().map(|r| r.tick), Some(5));
        assert!(report.passed, "{:?}", report.verification_failures);
    }

    #[test]
    fn test_reset_after_meltdown() {
        let timeline = vec![
            TimedAction {
                tick: 1,
                action: ScenarioAction::TriggerMeltdown,
            },
            TimedAction {
                tick: 3,
                action: ScenarioAction::Reset,
            },
        ];
        let mut run = options(10);
        run.stop_on_meltdown = false;
        let report = ScenarioExecutor::new(run)
            .execute(&scenario(timeline))
            .unwrap();

        assert!(!report.final_snapshot.melted);
        assert_eq!(report.final_snapshot.parts.len(), 2);
        assert_eq!(report.ticks_run, 8);
    }
}

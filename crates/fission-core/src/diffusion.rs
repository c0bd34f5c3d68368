//! Heat diffusion pass for one part
//!
//! Runs before the part's neutron interactions: channel gas first, then the
//! four cardinal neighbors, then the casing. Reaction heat released later in
//! the same tick only spreads on the next tick.

use fission_simulation::GasVolume;

use crate::grid::{ReactorGrid, CARDINAL_OFFSETS};
use crate::heat::{self, ThermalBody};

/// Pairwise heat exchange across the grid
pub struct HeatDiffusion;

impl HeatDiffusion {
    /// Exchange heat between the part at `index` and everything touching it.
    /// Returns the energy the part gave away (negative if it warmed up).
    pub fn diffuse_part<G: GasVolume>(
        grid: &mut ReactorGrid<G>,
        index: usize,
        casing: &mut ThermalBody,
    ) -> f32 {
        let mut given = 0.0;

        // Channel gas
        if let Some(part) = grid.part_at_mut(index) {
            let area = part.gas_thermal_cross_section;
            let mut body = part.thermal_body();
            if let Some(gas) = part.gas_contents.as_mut() {
                given += heat::exchange_with_gas(&mut body, gas, area);
                part.temperature = body.temperature;
            }
        } else {
            return 0.0;
        }

        // Neighbors; a missing neighbor is vacuum
        let position = grid.position_of(index);
        for offset in CARDINAL_OFFSETS {
            let Some(neighbor) = grid.index_of(position + offset) else {
                continue;
            };
            if let (Some(part), Some(other)) = grid.pair_mut(index, neighbor) {
                let area = part.thermal_cross_section.min(other.thermal_cross_section);
                let mut a = part.thermal_body();
                let mut b = other.thermal_body();
                given += heat::exchange(&mut a, &mut b, area);
                part.temperature = a.temperature;
                other.temperature = b.temperature;
            }
        }

        // Casing
        if let Some(part) = grid.part_at_mut(index) {
            let mut body = part.thermal_body();
            given += heat::exchange(&mut body, casing, part.thermal_cross_section);
            part.temperature = body.temperature;
        }

        given
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::ReactorPart;
    use fission_simulation::{Gas, GasMixture, Materials, PartDefs, PartId};
    use glam::IVec2;

    fn place(grid: &mut ReactorGrid<GasMixture>, x: i32, y: i32, id: &str, temperature: f32) {
        let defs = PartDefs::new();
        let def = defs.get(id).expect("prefab exists");
        let index = grid.index_of(IVec2::new(x, y)).expect("in bounds");
        grid.replace_at(
            index,
            Some(ReactorPart::from_def(def, &Materials::new(), temperature)),
        );
    }

    fn cold_casing() -> ThermalBody {
        ThermalBody::new(0.0, 0.0, Some(45.0))
    }

    fn temp(grid: &ReactorGrid<GasMixture>, x: i32, y: i32) -> f32 {
        grid.part(IVec2::new(x, y))
            .map(|p| p.temperature)
            .unwrap_or(-1.0)
    }

    #[test]
    fn test_empty_slot_is_noop() {
        let mut grid: ReactorGrid<GasMixture> = ReactorGrid::new(2, 1);
        let mut casing = ThermalBody::new(300.0, 1000.0, Some(45.0));
        assert_eq!(HeatDiffusion::diffuse_part(&mut grid, 0, &mut casing), 0.0);
        assert_eq!(casing.temperature, 300.0);
    }

    #[test]
    fn test_heat_flows_to_neighbor() {
        let mut grid = ReactorGrid::new(3, 1);
        place(&mut grid, 0, 0, PartId::MODERATOR, 1000.0);
        place(&mut grid, 1, 0, PartId::MODERATOR, 300.0);

        // Massless casing: no casing exchange
        let mut casing = cold_casing();
        let given = HeatDiffusion::diffuse_part(&mut grid, 0, &mut casing);

        assert!(given > 0.0);
        assert!(temp(&grid, 0, 0) < 1000.0);
        assert!(temp(&grid, 1, 0) > 300.0);
        assert!(temp(&grid, 0, 0) >= temp(&grid, 1, 0));
    }

    #[test]
    fn test_isolated_part_only_talks_to_casing() {
        let mut grid = ReactorGrid::new(3, 3);
        place(&mut grid, 1, 1, PartId::MODERATOR, 800.0);
        let mut casing = ThermalBody::new(300.0, 100_000.0, Some(45.0));

        HeatDiffusion::diffuse_part(&mut grid, 4, &mut casing);

        assert!(temp(&grid, 1, 1) < 800.0);
        assert!(casing.temperature > 300.0);
    }

    #[test]
    fn test_channel_gas_picks_up_heat() {
        let mut grid = ReactorGrid::new(1, 1);
        place(&mut grid, 0, 0, PartId::GAS_CHANNEL, 900.0);
        let gas = GasMixture::new(100.0, 300.0).with_moles(Gas::Nitrogen, 20.0);
        if let Some(part) = grid.part_at_mut(0) {
            part.gas_contents = Some(gas);
        }

        let mut casing = cold_casing();
        HeatDiffusion::diffuse_part(&mut grid, 0, &mut casing);

        let gas_temperature = grid
            .part_at(0)
            .and_then(|p| p.gas_contents.as_ref())
            .map(|g| g.temperature())
            .unwrap_or(0.0);
        assert!(gas_temperature > 300.0);
        assert!(temp(&grid, 0, 0) < 900.0);
    }

    #[test]
    fn test_total_energy_conserved_between_parts() {
        let mut grid = ReactorGrid::new(2, 1);
        place(&mut grid, 0, 0, PartId::FUEL_ROD_URANIUM, 1200.0);
        place(&mut grid, 1, 0, PartId::HEAT_EXCHANGER, 400.0);
        let energy = |g: &ReactorGrid<GasMixture>| -> f32 {
            g.parts().map(|(_, p)| p.temperature * p.thermal_mass).sum()
        };
        let before = energy(&grid);

        let mut casing = cold_casing();
        HeatDiffusion::diffuse_part(&mut grid, 0, &mut casing);

        assert!((energy(&grid) - before).abs() / before < 1e-4);
    }
}

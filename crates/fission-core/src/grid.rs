//! Reactor grid - parts and neutron flux on a fixed-size 2-D array

use glam::IVec2;

use crate::neutron::{Neutron, NeutronList};
use crate::part::ReactorPart;

/// Offsets of the 4 cardinal neighbors
pub const CARDINAL_OFFSETS: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
];

/// Part slots and the neutron flux, stored row-major with matching dimensions
#[derive(Clone, Debug)]
pub struct ReactorGrid<G> {
    width: usize,
    height: usize,
    parts: Vec<Option<ReactorPart<G>>>,
    flux: Vec<NeutronList>,
    /// Per-cell neutron count as of the last commit, for reporting
    neutron_counts: Vec<u32>,
}

impl<G> ReactorGrid<G> {
    pub fn new(width: usize, height: usize) -> Self {
        let area = width * height;
        Self {
            width,
            height,
            parts: (0..area).map(|_| None).collect(),
            flux: vec![NeutronList::new(); area],
            neutron_counts: vec![0; area],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, position: IVec2) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as usize) < self.width
            && (position.y as usize) < self.height
    }

    /// Row-major index of `position`, or `None` outside the grid
    pub fn index_of(&self, position: IVec2) -> Option<usize> {
        if self.contains(position) {
            Some(position.y as usize * self.width + position.x as usize)
        } else {
            None
        }
    }

    pub fn position_of(&self, index: usize) -> IVec2 {
        IVec2::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn part(&self, position: IVec2) -> Option<&ReactorPart<G>> {
        self.index_of(position).and_then(|i| self.parts[i].as_ref())
    }

    pub fn part_mut(&mut self, position: IVec2) -> Option<&mut ReactorPart<G>> {
        let index = self.index_of(position)?;
        self.parts[index].as_mut()
    }

    pub fn part_at(&self, index: usize) -> Option<&ReactorPart<G>> {
        self.parts.get(index).and_then(|p| p.as_ref())
    }

    pub fn part_at_mut(&mut self, index: usize) -> Option<&mut ReactorPart<G>> {
        self.parts.get_mut(index).and_then(|p| p.as_mut())
    }

    /// Put `part` in the slot at `index`, returning what was there
    pub fn replace_at(
        &mut self,
        index: usize,
        part: Option<ReactorPart<G>>,
    ) -> Option<ReactorPart<G>> {
        match self.parts.get_mut(index) {
            Some(slot) => std::mem::replace(slot, part),
            None => None,
        }
    }

    /// Two distinct slots at once, for pairwise exchanges
    pub fn pair_mut(
        &mut self,
        a: usize,
        b: usize,
    ) -> (Option<&mut ReactorPart<G>>, Option<&mut ReactorPart<G>>) {
        if a == b || a >= self.parts.len() || b >= self.parts.len() {
            return (None, None);
        }
        if a < b {
            let (low, high) = self.parts.split_at_mut(b);
            (low[a].as_mut(), high[0].as_mut())
        } else {
            let (low, high) = self.parts.split_at_mut(a);
            (high[0].as_mut(), low[b].as_mut())
        }
    }

    /// Occupied cells with their positions, in raster order
    pub fn parts(&self) -> impl Iterator<Item = (IVec2, &ReactorPart<G>)> + '_ {
        let width = self.width;
        self.parts.iter().enumerate().filter_map(move |(i, p)| {
            p.as_ref()
                .map(|p| (IVec2::new((i % width) as i32, (i / width) as i32), p))
        })
    }

    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut ReactorPart<G>> + '_ {
        self.parts.iter_mut().filter_map(|p| p.as_mut())
    }

    pub fn occupied_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| p.is_none())
    }

    pub fn neutrons_at(&self, position: IVec2) -> &[Neutron] {
        match self.index_of(position) {
            Some(i) => self.flux[i].as_slice(),
            None => &[],
        }
    }

    pub fn neutron_count(&self, position: IVec2) -> u32 {
        self.index_of(position)
            .map(|i| self.neutron_counts[i])
            .unwrap_or(0)
    }

    pub fn total_neutrons(&self) -> usize {
        self.flux.iter().map(|cell| cell.len()).sum()
    }

    /// Drop a neutron into a cell. Returns false outside the grid.
    pub fn add_neutron(&mut self, position: IVec2, neutron: Neutron) -> bool {
        match self.index_of(position) {
            Some(i) => {
                self.flux[i].push(neutron);
                self.neutron_counts[i] = self.flux[i].len() as u32;
                true
            }
            None => false,
        }
    }

    /// Hand over the current flux for read-only use during a tick
    pub(crate) fn take_flux(&mut self) -> Vec<NeutronList> {
        let area = self.area();
        std::mem::replace(&mut self.flux, vec![NeutronList::new(); area])
    }

    /// Install the flux built during a tick
    pub(crate) fn commit_flux(&mut self, next: Vec<NeutronList>) {
        debug_assert_eq!(next.len(), self.area());
        self.neutron_counts = next.iter().map(|cell| cell.len() as u32).collect();
        self.flux = next;
    }

    /// Empty every slot and the flux, returning the parts that were removed
    pub fn clear(&mut self) -> Vec<(IVec2, ReactorPart<G>)> {
        let width = self.width;
        let removed = self
            .parts
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.take()
                    .map(|p| (IVec2::new((i % width) as i32, (i / width) as i32), p))
            })
            .collect();
        for cell in &mut self.flux {
            cell.clear();
        }
        self.neutron_counts.iter_mut().for_each(|c| *c = 0);
        removed
    }
}

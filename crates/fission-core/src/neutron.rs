//! Neutrons and their compass headings

use bitflags::bitflags;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::rng_trait::ReactorRng;

bitflags! {
    /// Flag-style compass. Single flags are the cardinals; a reflection can
    /// combine two adjacent flags into a diagonal heading.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Compass: u8 {
        const NORTH = 1 << 0;
        const EAST = 1 << 1;
        const SOUTH = 1 << 2;
        const WEST = 1 << 3;
    }
}

impl Compass {
    pub const CARDINALS: [Compass; 4] = [
        Compass::NORTH,
        Compass::EAST,
        Compass::SOUTH,
        Compass::WEST,
    ];

    /// Clockwise from north, 45° apart
    const RING: [Compass; 8] = [
        Compass::NORTH,
        Compass::NORTH.union(Compass::EAST),
        Compass::EAST,
        Compass::SOUTH.union(Compass::EAST),
        Compass::SOUTH,
        Compass::SOUTH.union(Compass::WEST),
        Compass::WEST,
        Compass::NORTH.union(Compass::WEST),
    ];

    pub fn random_cardinal<R: ReactorRng>(rng: &mut R) -> Self {
        Self::CARDINALS[rng.gen_range_u32(0, 3) as usize]
    }

    fn ring_index(self) -> Option<usize> {
        Self::RING.iter().position(|c| *c == self)
    }

    /// Rotate clockwise by `steps` eighths of a turn (negative turns counter-clockwise)
    pub fn rotate(self, steps: i32) -> Self {
        match self.ring_index() {
            Some(index) => Self::RING[(index as i32 + steps).rem_euclid(8) as usize],
            None => self,
        }
    }

    pub fn opposite(self) -> Self {
        self.rotate(4)
    }

    /// Grid step for this heading. North is -y.
    pub fn step(self) -> IVec2 {
        let mut step = IVec2::ZERO;
        if self.contains(Compass::NORTH) {
            step.y -= 1;
        }
        if self.contains(Compass::SOUTH) {
            step.y += 1;
        }
        if self.contains(Compass::EAST) {
            step.x += 1;
        }
        if self.contains(Compass::WEST) {
            step.x -= 1;
        }
        step
    }
}

/// Neutrons resident in one grid cell
pub type NeutronList = SmallVec<[Neutron; 8]>;

/// One neutron in flight
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neutron {
    pub direction: Compass,
    /// Energy level; zero means the neutron is spent
    pub velocity: u32,
}

impl Neutron {
    pub fn new(direction: Compass, velocity: u32) -> Self {
        Self {
            direction,
            velocity,
        }
    }

    /// A fresh neutron heading in a random cardinal direction
    pub fn random<R: ReactorRng>(rng: &mut R, min_velocity: u32, max_velocity: u32) -> Self {
        let direction = Compass::random_cardinal(rng);
        Self::new(direction, rng.gen_range_u32(min_velocity, max_velocity))
    }

    pub fn is_spent(&self) -> bool {
        self.velocity == 0
    }

    /// Bounce back the way it came, with up to 45° of jitter either side
    pub fn reflect<R: ReactorRng>(&mut self, rng: &mut R) {
        let jitter = rng.gen_range_u32(0, 2) as i32 - 1;
        self.direction = self.direction.opposite().rotate(jitter);
    }
}

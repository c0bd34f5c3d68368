//! Whole-reactor meltdown and the side effects it requests from the host

use fission_simulation::{Gas, GasVolume};
use glam::IVec2;

use crate::config::ReactorConfig;
use crate::grid::ReactorGrid;
use crate::rng_trait::ReactorRng;

/// Smallest explosion a meltdown requests
pub const MIN_EXPLOSION_INTENSITY: f32 = 100.0;
/// Explosion intensity per point of badness
pub const EXPLOSION_PER_BADNESS: f32 = 40.0;
/// Radius and energy of the radioactive glow left behind
pub const MELTDOWN_LIGHT_RADIUS: f32 = 15.0;
pub const MELTDOWN_LIGHT_ENERGY: f32 = 8.0;

/// Sounds the reactor asks the host to play
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    OverheatAlarm,
    Meltdown,
}

/// Fire-and-forget requests to the host's effect systems
pub trait ReactorEffects {
    fn request_explosion(&mut self, intensity: f32);

    /// One piece of debris thrown from the core
    fn request_debris_throw(&mut self, index: u32);

    fn request_point_light(&mut self, radius: f32, energy: f32);

    /// Station-wide announcement
    fn announce(&mut self, message: &str);

    fn play_audio(&mut self, cue: AudioCue);
}

/// Ignores every request
#[derive(Default)]
pub struct NoopEffects;

impl ReactorEffects for NoopEffects {
    fn request_explosion(&mut self, _intensity: f32) {}
    fn request_debris_throw(&mut self, _index: u32) {}
    fn request_point_light(&mut self, _radius: f32, _energy: f32) {}
    fn announce(&mut self, _message: &str) {}
    fn play_audio(&mut self, _cue: AudioCue) {}
}

/// One recorded effect request
#[derive(Clone, Debug, PartialEq)]
pub enum EffectRequest {
    Explosion(f32),
    DebrisThrow(u32),
    PointLight { radius: f32, energy: f32 },
    Announcement(String),
    Audio(AudioCue),
}

/// Keeps every request in order, for the headless runner and tests
#[derive(Clone, Debug, Default)]
pub struct EffectLog {
    pub requests: Vec<EffectRequest>,
}

impl EffectLog {
    pub fn explosions(&self) -> impl Iterator<Item = f32> + '_ {
        self.requests.iter().filter_map(|r| match r {
            EffectRequest::Explosion(intensity) => Some(*intensity),
            _ => None,
        })
    }

    pub fn debris_throws(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r, EffectRequest::DebrisThrow(_)))
            .count()
    }

    pub fn announcements(&self) -> impl Iterator<Item = &str> + '_ {
        self.requests.iter().filter_map(|r| match r {
            EffectRequest::Announcement(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

impl ReactorEffects for EffectLog {
    fn request_explosion(&mut self, intensity: f32) {
        self.requests.push(EffectRequest::Explosion(intensity));
    }

    fn request_debris_throw(&mut self, index: u32) {
        self.requests.push(EffectRequest::DebrisThrow(index));
    }

    fn request_point_light(&mut self, radius: f32, energy: f32) {
        self.requests
            .push(EffectRequest::PointLight { radius, energy });
    }

    fn announce(&mut self, message: &str) {
        self.requests
            .push(EffectRequest::Announcement(message.to_string()));
    }

    fn play_audio(&mut self, cue: AudioCue) {
        self.requests.push(EffectRequest::Audio(cue));
    }
}

/// What a meltdown released
#[derive(Clone, Debug, PartialEq)]
pub struct MeltdownReport {
    pub badness: f32,
    pub explosion_intensity: f32,
    pub debris_throws: u32,
    /// Moles of tritium added to the casing air
    pub tritium_released: f32,
    /// Parts destroyed, with the slot each one occupied
    pub destroyed_parts: Vec<(IVec2, String)>,
}

/// Sum of every remaining part's contribution
pub fn meltdown_badness<G>(grid: &ReactorGrid<G>) -> f32 {
    grid.parts().map(|(_, part)| part.meltdown_badness()).sum()
}

/// Tear the core apart. The caller has already marked the reactor melted.
pub(crate) fn run_meltdown<G: GasVolume, R: ReactorRng>(
    grid: &mut ReactorGrid<G>,
    casing_air: &mut G,
    ambient: Option<&mut G>,
    config: &ReactorConfig,
    rng: &mut R,
    effects: &mut dyn ReactorEffects,
) -> MeltdownReport {
    let badness = meltdown_badness(grid);

    let mut destroyed_parts = Vec::new();
    for (position, mut part) in grid.clear() {
        if let Some(gas) = part.gas_contents.take() {
            casing_air.merge(gas);
        }
        destroyed_parts.push((position, part.prefab));
    }

    let tritium_released = badness * config.meltdown_tritium_per_badness;
    casing_air.adjust_moles(Gas::Tritium, tritium_released);

    if let Some(ambient) = ambient {
        let volume = casing_air.volume();
        let everything = casing_air.remove_volume(volume);
        ambient.merge(everything);
    }

    let explosion_intensity = (badness * EXPLOSION_PER_BADNESS).max(MIN_EXPLOSION_INTENSITY);
    effects.request_explosion(explosion_intensity);

    let debris_throws = rng.gen_range_u32(config.meltdown_min_throws, config.meltdown_max_throws);
    for index in 0..debris_throws {
        effects.request_debris_throw(index);
    }

    effects.request_point_light(MELTDOWN_LIGHT_RADIUS, MELTDOWN_LIGHT_ENERGY);
    effects.announce("Reactor core meltdown. Evacuate the area immediately.");
    effects.play_audio(AudioCue::Meltdown);

    log::error!(
        "Reactor meltdown: badness {:.1}, explosion {:.0}, {} parts destroyed, {:.1} mol tritium released",
        badness,
        explosion_intensity,
        destroyed_parts.len(),
        tritium_released
    );

    MeltdownReport {
        badness,
        explosion_intensity,
        debris_throws,
        tritium_released,
        destroyed_parts,
    }
}

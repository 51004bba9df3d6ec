//! Host-side aurora policy: when to spawn, fade and drop the effect.
//!
//! The aurora core knows nothing about time of day or biomes. This handler owns
//! at most one [`Aurora`], seeds it once per in-game night and routes every
//! frame through a [`RenderSelector`].

use borealis_aurora::{Aurora, AuroraRenderer, RenderError};
use borealis_core::{scoped_rng, SimTick, SimTime};
use borealis_render::{
    HeadlessShaderProgram, RenderPath, RenderSelector, ShaderProgram, ShaderRenderer,
    AURORA_SHADER_WGSL,
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AuroraConfig;

/// Scope hash separating aurora seeds from other per-night streams.
const AURORA_SCOPE: u64 = 0x4155_524f_5241;

/// What the host observes about the sky this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyConditions {
    /// Sun below the horizon.
    pub night: bool,
    /// Identifier of the current night (see [`SimTime::night`]).
    pub night_index: u64,
    /// Whether the observer stands in a biome that shows auroras.
    pub eligible_biome: bool,
}

impl SkyConditions {
    /// Read the sky off the simulation clock.
    pub fn observe(time: &SimTime, eligible_biome: bool) -> Self {
        Self {
            night: time.is_night(),
            night_index: time.night(),
            eligible_biome,
        }
    }
}

/// Lifecycle notifications for event logs and replay checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HandlerEvent {
    /// A new aurora was seeded for `night`.
    Spawned {
        tick: SimTick,
        night: u64,
        seed: u64,
        bands: usize,
    },
    /// The sky stopped qualifying and the aurora began to fade.
    Fading {
        tick: SimTick,
        seed: u64,
    },
    /// A fading aurora became eligible again before it died.
    Resumed {
        tick: SimTick,
        seed: u64,
    },
    /// The aurora faded out completely and was dropped.
    Despawned {
        tick: SimTick,
        seed: u64,
        lived: u64,
    },
    /// The shader path failed and the handler now draws triangles for good.
    ShaderDisabled {
        tick: SimTick,
        reason: String,
    },
}

impl HandlerEvent {
    /// Tick the event was raised on.
    pub fn tick(&self) -> SimTick {
        match self {
            HandlerEvent::Spawned { tick, .. }
            | HandlerEvent::Fading { tick, .. }
            | HandlerEvent::Resumed { tick, .. }
            | HandlerEvent::Despawned { tick, .. }
            | HandlerEvent::ShaderDisabled { tick, .. } => *tick,
        }
    }

    /// Stable event name used as the log `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerEvent::Spawned { .. } => "AuroraSpawned",
            HandlerEvent::Fading { .. } => "AuroraFading",
            HandlerEvent::Resumed { .. } => "AuroraResumed",
            HandlerEvent::Despawned { .. } => "AuroraDespawned",
            HandlerEvent::ShaderDisabled { .. } => "AuroraShaderDisabled",
        }
    }

    /// Compact `key=value` payload for the JSONL log.
    pub fn payload(&self) -> String {
        match self {
            HandlerEvent::Spawned {
                night, seed, bands, ..
            } => format!("night={night} seed={seed} bands={bands}"),
            HandlerEvent::Fading { seed, .. } | HandlerEvent::Resumed { seed, .. } => {
                format!("seed={seed}")
            }
            HandlerEvent::Despawned { seed, lived, .. } => format!("seed={seed} lived={lived}"),
            HandlerEvent::ShaderDisabled { reason, .. } => format!("reason={reason}"),
        }
    }
}

/// Running totals for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    /// Auroras created.
    pub spawned: u64,
    /// Auroras that faded out and were dropped.
    pub despawned: u64,
    /// Frames drawn through the shader program.
    pub shader_frames: u64,
    /// Frames drawn as a triangle mesh.
    pub triangle_frames: u64,
    /// Triangles emitted across all triangle frames.
    pub triangles: u64,
}

impl HandlerStats {
    /// Frames drawn on either path.
    pub fn frames(&self) -> u64 {
        self.shader_frames + self.triangle_frames
    }
}

/// Owns at most one aurora and decides when it lives, fades and dies.
///
/// `P` is the shader program behind the render selector; tests swap in
/// failing programs to exercise the triangle fallback.
pub struct AuroraEffectHandler<P = HeadlessShaderProgram> {
    config: AuroraConfig,
    aurora: Option<Aurora>,
    renderer: RenderSelector<P>,
    last_spawn_night: Option<u64>,
    tick: SimTick,
    events: Vec<HandlerEvent>,
    stats: HandlerStats,
}

impl AuroraEffectHandler<HeadlessShaderProgram> {
    /// Build a handler with the bundled shader when `use_shader` is set.
    pub fn new(config: AuroraConfig) -> Self {
        Self::with_shader_source(config, AURORA_SHADER_WGSL)
    }

    /// Build a handler from custom WGSL. A source that fails to compile leaves
    /// the handler on the triangle path from the first frame.
    pub fn with_shader_source(config: AuroraConfig, source: &str) -> Self {
        let shader = if config.use_shader {
            match HeadlessShaderProgram::compile(source) {
                Ok(program) => Some(ShaderRenderer::new(program, config.render_distance)),
                Err(err) => {
                    warn!(error = %err, "aurora shader failed to compile; using triangles");
                    None
                }
            }
        } else {
            None
        };
        Self::with_renderer(config, RenderSelector::new(shader))
    }
}

impl<P: ShaderProgram> AuroraEffectHandler<P> {
    /// Build a handler around an existing render selector.
    pub fn with_renderer(config: AuroraConfig, renderer: RenderSelector<P>) -> Self {
        Self {
            config,
            aurora: None,
            renderer,
            last_spawn_night: None,
            tick: SimTick::ZERO,
            events: Vec::new(),
            stats: HandlerStats::default(),
        }
    }

    /// Advance the effect by one logical tick.
    pub fn tick(&mut self, tick: SimTick, sky: SkyConditions) {
        self.tick = tick;
        let eligible = self.config.enabled && sky.night && sky.eligible_biome;

        if let Some(aurora) = self.aurora.as_mut() {
            if !eligible && !aurora.is_dying() {
                aurora.set_fading(true);
                debug!(seed = aurora.seed(), "aurora fading");
                self.events.push(HandlerEvent::Fading {
                    tick,
                    seed: aurora.seed(),
                });
            } else if eligible && aurora.is_dying() && !aurora.is_complete() {
                aurora.set_fading(false);
                debug!(seed = aurora.seed(), "aurora resumed");
                self.events.push(HandlerEvent::Resumed {
                    tick,
                    seed: aurora.seed(),
                });
            }
        } else if eligible && self.last_spawn_night != Some(sky.night_index) {
            self.spawn(sky.night_index);
        }

        let Some(aurora) = self.aurora.as_mut() else {
            return;
        };
        aurora.update();
        if aurora.is_complete() {
            info!(seed = aurora.seed(), lived = aurora.ticks(), "aurora despawned");
            self.events.push(HandlerEvent::Despawned {
                tick,
                seed: aurora.seed(),
                lived: aurora.ticks(),
            });
            self.stats.despawned += 1;
            self.aurora = None;
        }
    }

    fn spawn(&mut self, night: u64) {
        self.last_spawn_night = Some(night);
        let seed = aurora_seed(self.config.world_seed, night);
        let options = self.config.aurora_options(self.renderer.shader_active());
        match Aurora::new(seed, &options) {
            Ok(aurora) => {
                info!(
                    night,
                    seed,
                    bands = aurora.bands().len(),
                    renderer = self.renderer.name(),
                    "aurora spawned"
                );
                self.events.push(HandlerEvent::Spawned {
                    tick: self.tick,
                    night,
                    seed,
                    bands: aurora.bands().len(),
                });
                self.stats.spawned += 1;
                self.aurora = Some(aurora);
            }
            Err(err) => warn!(night, seed, error = %err, "aurora spawn rejected"),
        }
    }

    /// Draw the current aurora, if any, at `partial_tick` past the last tick.
    pub fn render(&mut self, partial_tick: f32) -> Result<(), RenderError> {
        let Some(aurora) = self.aurora.as_mut() else {
            return Ok(());
        };
        if aurora.is_complete() {
            return Ok(());
        }
        let shader_before = self.renderer.shader_active();
        aurora.render(partial_tick, &mut self.renderer)?;

        if shader_before && !self.renderer.shader_active() {
            let reason = self
                .renderer
                .shader_failure()
                .map(ToString::to_string)
                .unwrap_or_default();
            self.events.push(HandlerEvent::ShaderDisabled {
                tick: self.tick,
                reason,
            });
        }
        match self.renderer.last_path() {
            Some(RenderPath::Shader) => self.stats.shader_frames += 1,
            Some(RenderPath::Triangles) => {
                self.stats.triangle_frames += 1;
                self.stats.triangles += self.renderer.triangles().mesh().triangle_count() as u64;
            }
            None => {}
        }
        Ok(())
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<HandlerEvent> {
        std::mem::take(&mut self.events)
    }

    /// The live aurora, if one is up.
    pub fn aurora(&self) -> Option<&Aurora> {
        self.aurora.as_ref()
    }

    /// The render selector, for path and failure queries.
    pub fn renderer(&self) -> &RenderSelector<P> {
        &self.renderer
    }

    /// Totals accumulated so far.
    pub fn stats(&self) -> HandlerStats {
        self.stats
    }
}

/// Seed of the aurora shown on `night` in the world seeded with `world_seed`.
///
/// The world seed is hashed through its own generator before the night is mixed
/// in, so no two (world, night) pairs cancel out under xor.
fn aurora_seed(world_seed: u64, night: u64) -> u64 {
    let world_key: u64 = scoped_rng(world_seed, AURORA_SCOPE, SimTick::ZERO).gen();
    scoped_rng(world_key, AURORA_SCOPE, SimTick(night)).gen()
}

#[cfg(test)]
mod tests {
    use super::*;
    use borealis_render::{AuroraQuad, AuroraShaderUniform, ShaderError};
    use std::collections::HashSet;

    const NIGHT: SkyConditions = SkyConditions {
        night: true,
        night_index: 0,
        eligible_biome: true,
    };
    const DAY: SkyConditions = SkyConditions {
        night: false,
        night_index: 0,
        eligible_biome: true,
    };

    fn short_lived() -> AuroraConfig {
        AuroraConfig {
            peak_age: 4,
            world_seed: 77,
            ..AuroraConfig::default()
        }
    }

    fn kinds(events: &[HandlerEvent]) -> Vec<&'static str> {
        events.iter().map(HandlerEvent::kind).collect()
    }

    #[test]
    fn spawns_only_when_sky_is_eligible() {
        let mut handler = AuroraEffectHandler::new(short_lived());
        handler.tick(SimTick(1), DAY);
        handler.tick(
            SimTick(2),
            SkyConditions {
                eligible_biome: false,
                ..NIGHT
            },
        );
        assert!(handler.aurora().is_none());

        handler.tick(SimTick(3), NIGHT);
        assert!(handler.aurora().is_some());
        assert_eq!(kinds(&handler.drain_events()), vec!["AuroraSpawned"]);
    }

    #[test]
    fn disabled_config_never_spawns() {
        let mut handler = AuroraEffectHandler::new(AuroraConfig {
            enabled: false,
            ..short_lived()
        });
        for tick in 0..10 {
            handler.tick(SimTick(tick), NIGHT);
        }
        assert!(handler.aurora().is_none());
        assert!(handler.drain_events().is_empty());
    }

    #[test]
    fn fades_at_dawn_and_despawns() {
        let mut handler = AuroraEffectHandler::new(short_lived());
        for tick in 0..6 {
            handler.tick(SimTick(tick), NIGHT);
        }
        let age = handler.aurora().map(|a| a.tracker().age());
        assert_eq!(age, Some(4));

        for tick in 6..9 {
            handler.tick(SimTick(tick), DAY);
            assert!(handler.aurora().is_some());
        }
        handler.tick(SimTick(9), DAY);
        assert!(handler.aurora().is_none());

        let events = handler.drain_events();
        assert_eq!(
            kinds(&events),
            vec!["AuroraSpawned", "AuroraFading", "AuroraDespawned"]
        );
        assert_eq!(events[1].tick(), SimTick(6));
        assert_eq!(events[2].tick(), SimTick(9));
        assert_eq!(handler.stats().spawned, 1);
        assert_eq!(handler.stats().despawned, 1);
    }

    #[test]
    fn fading_aurora_resumes_when_sky_clears_again() {
        let mut handler = AuroraEffectHandler::new(short_lived());
        for tick in 0..4 {
            handler.tick(SimTick(tick), NIGHT);
        }
        handler.tick(SimTick(4), DAY);
        handler.tick(SimTick(5), NIGHT);
        assert_eq!(
            kinds(&handler.drain_events()),
            vec!["AuroraSpawned", "AuroraFading", "AuroraResumed"]
        );
        assert!(!handler.aurora().map_or(true, Aurora::is_dying));
    }

    #[test]
    fn one_aurora_per_night() {
        let mut handler = AuroraEffectHandler::new(short_lived());
        handler.tick(SimTick(0), NIGHT);
        for tick in 1..20 {
            handler.tick(SimTick(tick), DAY);
        }
        assert!(handler.aurora().is_none());

        handler.tick(SimTick(20), NIGHT);
        assert!(handler.aurora().is_none());

        let next_night = SkyConditions {
            night_index: 1,
            ..NIGHT
        };
        handler.tick(SimTick(21), next_night);
        assert!(handler.aurora().is_some());
        assert_eq!(handler.stats().spawned, 2);
    }

    #[test]
    fn seeds_are_stable_per_world_and_night() {
        let seed_for = |world_seed: u64, night_index: u64| {
            let mut handler = AuroraEffectHandler::new(AuroraConfig {
                world_seed,
                ..short_lived()
            });
            handler.tick(
                SimTick(0),
                SkyConditions {
                    night_index,
                    ..NIGHT
                },
            );
            handler.aurora().map(Aurora::seed)
        };
        assert_eq!(seed_for(5, 3), seed_for(5, 3));
        assert_ne!(seed_for(5, 3), seed_for(5, 4));
        assert_ne!(seed_for(5, 3), seed_for(6, 3));
        // 5 ^ 3 == 6 ^ 0
        assert_ne!(seed_for(5, 3), seed_for(6, 0));
    }

    #[test]
    fn nearby_worlds_and_nights_never_share_a_seed() {
        let seeds: HashSet<u64> = (0..8)
            .flat_map(|world| (0..8).map(move |night| aurora_seed(world, night)))
            .collect();
        assert_eq!(seeds.len(), 64);
    }

    #[test]
    fn spawns_once_for_each_night_of_a_real_clock() {
        let mut handler = AuroraEffectHandler::new(short_lived());
        let mut time = SimTime::default();
        for _ in 0..48_000 {
            time.advance();
            handler.tick(time.tick, SkyConditions::observe(&time, true));
        }
        let nights: Vec<u64> = handler
            .drain_events()
            .iter()
            .filter_map(|event| match event {
                HandlerEvent::Spawned { night, .. } => Some(*night),
                _ => None,
            })
            .collect();
        assert_eq!(nights, vec![0, 1, 2]);
    }

    #[test]
    fn renders_triangles_by_default() {
        let mut handler = AuroraEffectHandler::new(short_lived());
        handler.render(0.0).expect("nothing to draw is fine");
        assert_eq!(handler.stats().frames(), 0);

        handler.tick(SimTick(0), NIGHT);
        handler.render(0.0).expect("renders");
        handler.render(0.5).expect("renders");
        let stats = handler.stats();
        assert_eq!(stats.triangle_frames, 2);
        assert_eq!(stats.shader_frames, 0);
        assert!(stats.triangles > 0);
    }

    #[test]
    fn shader_auroras_use_flat_untapered_bands() {
        let mut handler = AuroraEffectHandler::new(AuroraConfig {
            use_shader: true,
            ..short_lived()
        });
        handler.tick(SimTick(0), NIGHT);
        let shape = handler.aurora().map(|a| a.bands()[0].shape());
        assert_eq!(shape.map(|s| (s.no_taper, s.fixed_height)), Some((true, true)));

        handler.render(0.25).expect("renders");
        assert_eq!(handler.stats().shader_frames, 1);
        assert_eq!(handler.renderer().last_path(), Some(RenderPath::Shader));
    }

    #[test]
    fn uncompilable_shader_source_falls_back_to_triangles() {
        let mut handler = AuroraEffectHandler::with_shader_source(
            AuroraConfig {
                use_shader: true,
                ..short_lived()
            },
            "@fragment fn fs_main() -> @location(0) vec4<f32> { return oops; }",
        );
        assert!(!handler.renderer().shader_active());

        handler.tick(SimTick(0), NIGHT);
        let shape = handler.aurora().map(|a| a.bands()[0].shape());
        assert_eq!(shape.map(|s| s.no_taper), Some(false));

        handler.render(0.0).expect("renders");
        assert_eq!(handler.renderer().last_path(), Some(RenderPath::Triangles));
        assert_eq!(handler.stats().shader_frames, 0);
    }

    struct BrokenProgram;

    impl ShaderProgram for BrokenProgram {
        fn bind(&mut self, _uniform: &AuroraShaderUniform) -> Result<(), ShaderError> {
            Err(ShaderError::Unbound)
        }

        fn draw(&mut self, _quad: &AuroraQuad) -> Result<(), ShaderError> {
            Err(ShaderError::Unbound)
        }
    }

    #[test]
    fn shader_failure_is_reported_once_and_later_auroras_use_triangles() {
        let renderer = RenderSelector::new(Some(ShaderRenderer::new(BrokenProgram, 512.0)));
        let mut handler = AuroraEffectHandler::with_renderer(short_lived(), renderer);
        handler.tick(SimTick(0), NIGHT);
        handler.render(0.0).expect("falls back");
        handler.render(0.5).expect("renders");
        assert_eq!(handler.stats().triangle_frames, 2);

        let events = handler.drain_events();
        assert_eq!(
            kinds(&events),
            vec!["AuroraSpawned", "AuroraShaderDisabled"]
        );

        for tick in 1..10 {
            handler.tick(SimTick(tick), DAY);
        }
        handler.tick(
            SimTick(10),
            SkyConditions {
                night_index: 1,
                ..NIGHT
            },
        );
        let shape = handler.aurora().map(|a| a.bands()[0].shape());
        assert_eq!(shape.map(|s| s.no_taper), Some(false));
    }
}

pub mod assets;
pub mod config;
pub mod enemy;
pub mod entity;
pub mod level;
pub mod objects;
pub mod player;
pub mod presentation;
pub mod resolver;
pub mod tilemap;

use trot_core::game_trait::{FixedStepGame, GameEvent, GameMetadata};
use trot_core::input::MoveIntent;

use config::PlatformerConfig;
use entity::{EntityKind, HitOutcome};
use level::Level;
use presentation::{EntityView, FrameSnapshot};
use resolver::{EnemyContact, FrameReport, World};

/// A single-player run through one level.
pub struct GoblinTrot {
    level: Level,
    config: PlatformerConfig,
    tick: u64,
    paused: bool,
    level_complete: bool,
    round_complete: bool,
}

impl GoblinTrot {
    pub fn new(level: Level, config: PlatformerConfig) -> Self {
        Self {
            level,
            config,
            tick: 0,
            paused: false,
            level_complete: false,
            round_complete: false,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    /// Render-facing view of the current frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        let mut hazards = Vec::new();
        let mut blocks = Vec::new();
        let mut goal = None;
        for obj in &self.level.objects {
            match obj.kind {
                EntityKind::Hazard => hazards.push(obj.shape.bounds),
                EntityKind::Block => blocks.push(obj.shape.bounds),
                EntityKind::Goal => goal = Some(obj.shape.bounds),
                EntityKind::Player | EntityKind::Enemy | EntityKind::Tile => {},
            }
        }

        FrameSnapshot {
            tick: self.tick,
            player: EntityView::of_player(&self.level.player),
            enemies: self.level.enemies.iter().map(EntityView::of_enemy).collect(),
            hazards,
            blocks,
            goal,
            map_width: self.level.map.map_width(),
            map_height: self.level.map.map_height(),
            level_complete: self.level_complete,
        }
    }

    /// Kill the player once it has fallen well clear of the map.
    fn apply_kill_plane(&mut self) -> bool {
        let floor = self.level.map.map_height() + self.config.physics.kill_margin;
        let player = &mut self.level.player;
        if player.is_alive() && player.bounds().top() > floor {
            player.kill();
            tracing::debug!(y = player.bounds().y, "Player fell out of the world");
            return true;
        }
        false
    }

    fn player_hit_events(&self, outcome: HitOutcome, events: &mut Vec<GameEvent>) {
        if outcome == HitOutcome::Ignored {
            return;
        }
        events.push(GameEvent::PlayerHit {
            health: self.level.player.state.health.current,
        });
        if outcome == HitOutcome::Killed {
            events.push(GameEvent::PlayerDied);
        }
    }

    fn collect_events(&mut self, report: &FrameReport, fell: bool) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if let Some(outcome) = report.hazard_hit {
            self.player_hit_events(outcome, &mut events);
        }

        for contact in &report.enemy_contacts {
            match *contact {
                EnemyContact::Stomp { enemy, outcome } => {
                    if outcome == HitOutcome::Ignored {
                        continue;
                    }
                    let health = self
                        .level
                        .enemies
                        .get(enemy)
                        .map_or(0, |e| e.state.health.current);
                    events.push(GameEvent::EnemyHit { enemy, health });
                    if outcome == HitOutcome::Killed {
                        tracing::debug!(enemy, "Enemy defeated");
                        events.push(GameEvent::EnemyDefeated { enemy });
                    }
                },
                EnemyContact::Struck { outcome, .. } => self.player_hit_events(outcome, &mut events),
            }
        }

        if fell {
            events.push(GameEvent::PlayerDied);
        }

        if report.reached_goal && self.level.player.is_alive() && !self.level_complete {
            self.level_complete = true;
            tracing::info!(tick = self.tick, "Level complete");
            events.push(GameEvent::LevelComplete);
        }

        if !self.level.player.is_alive() || self.level_complete {
            if !self.level.player.is_alive() {
                tracing::info!(tick = self.tick, "Player died");
            }
            self.round_complete = true;
            events.push(GameEvent::RoundComplete);
        }

        events
    }
}

impl FixedStepGame for GoblinTrot {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Goblin Trot".to_string(),
            description: "Stomp goblins, dodge runes, reach the exit.".to_string(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.physics.fps as f32
    }

    fn update(&mut self, intent: &MoveIntent) -> Vec<GameEvent> {
        if self.paused || self.round_complete {
            return Vec::new();
        }
        self.tick += 1;

        let physics = &self.config.physics;
        let Level {
            map,
            player,
            enemies,
            objects,
        } = &mut self.level;

        if intent.jump {
            player.jump(physics.jump_velocity);
        }
        player.tick_physics(physics);
        for enemy in enemies.iter_mut() {
            enemy.tick(physics);
        }

        let world = World::new(map, objects);
        let report = resolver::resolve_frame(player, enemies, intent, &world, physics);

        let fell = self.apply_kill_plane();
        self.collect_events(&report, fell)
    }

    fn serialize_state(&self) -> Vec<u8> {
        match rmp_serde::to_vec(&self.snapshot()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to encode frame snapshot: {e}");
                Vec::new()
            },
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_round_complete(&self) -> bool {
        self.round_complete
    }
}

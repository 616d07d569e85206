//! In-memory world state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use placeholder_engine::Subject;

/// Payload carried by player subjects.
#[derive(Debug, Clone)]
pub struct PlayerTag {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub type_name: String,
    pub name: String,
    pub pos: (i32, i32, i32),
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub name: String,
    pub pos: Position,
    pub money: i64,
    pub look_block: Option<Block>,
}

#[derive(Debug, Default)]
pub struct World {
    players: RwLock<HashMap<String, PlayerState>>,
    mobs: AtomicU64,
    drops: AtomicU64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// A world with two players online and a few mobs and dropped items.
    pub fn sample() -> Self {
        let world = Self::new();
        world.mobs.store(12, Ordering::Relaxed);
        world.drops.store(3, Ordering::Relaxed);

        world.join("p-1", "Alice", Position { x: 1.0, y: 64.0, z: -3.5 }, 250);
        world.join("p-2", "Bob", Position { x: -120.0, y: 70.0, z: 33.0 }, 40);
        world.set_look_block(
            "p-1",
            Block {
                type_name: "minecraft:oak_log".into(),
                name: "Oak Log".into(),
                pos: (2, 64, -3),
            },
        );
        world
    }

    /// Put a player online and return the subject representing them.
    pub fn join(&self, id: &str, name: &str, pos: Position, money: i64) -> Subject {
        self.players.write().insert(
            id.to_string(),
            PlayerState {
                name: name.to_string(),
                pos,
                money,
                look_block: None,
            },
        );
        Self::subject(id, name)
    }

    pub fn set_look_block(&self, id: &str, block: Block) {
        if let Some(player) = self.players.write().get_mut(id) {
            player.look_block = Some(block);
        }
    }

    pub fn player(&self, id: &str) -> Option<PlayerState> {
        self.players.read().get(id).cloned()
    }

    /// Online players, ordered by id.
    pub fn online_players(&self) -> Vec<Subject> {
        let players = self.players.read();
        let mut online: Vec<_> = players
            .iter()
            .map(|(id, state)| Self::subject(id, &state.name))
            .collect();
        online.sort_by(|a, b| a.id().cmp(b.id()));
        online
    }

    pub fn total_entities(&self, exclude_drops: bool) -> u64 {
        let players = self.players.read().len() as u64;
        let mobs = self.mobs.load(Ordering::Relaxed);
        if exclude_drops {
            players + mobs
        } else {
            players + mobs + self.drops.load(Ordering::Relaxed)
        }
    }

    /// Advance the world: players walk east, items drop and despawn.
    pub fn step(&self) {
        for player in self.players.write().values_mut() {
            player.pos.x += 0.5;
        }
        let drops = self.drops.load(Ordering::Relaxed);
        self.drops.store((drops + 1) % 8, Ordering::Relaxed);
    }

    fn subject(id: &str, name: &str) -> Subject {
        Subject::with_payload(
            id,
            PlayerTag {
                name: name.to_string(),
            },
        )
    }
}

//! Action Resolution and Laser Sweep
//!
//! Synchronous rules over `&mut GameState`. The engine calls these while
//! holding the exclusive lock; nothing here blocks or sleeps.
//!
//! Move gates run in order and the first failure drops the action:
//! round admission, entity exists, position capability, throttle, wall,
//! player occupancy. Lasers never block movement.

use std::time::Duration;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::coord::{Coordinate, Direction};
use crate::game::action::{Action, ActionKind};
use crate::game::entity::{EntityId, EntityTable, Identifier, Laser};
use crate::game::events::Change;
use crate::game::map::ArenaMap;
use crate::game::state::GameState;
use crate::game::throttle::ThrottleKey;

/// Why an action was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Arena is between rounds
    Waiting,
    /// Actor is not in the table
    UnknownEntity,
    /// Actor cannot be positioned or moved
    MissingCapability,
    /// Too soon after the last accepted action of this kind
    Throttled,
    /// Target cell is a wall or off the grid
    WallCollision,
    /// Target cell holds another player
    PlayerCollision,
    /// Fire without a direction
    NoDirection,
}

/// Outcome of one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// State mutated
    Applied,
    /// Dropped without side effects
    Rejected(Rejection),
}

/// Result of applying an action.
#[derive(Debug)]
pub struct ActionResult {
    /// Changes produced, in order
    pub changes: Vec<Change>,
    /// Applied or why not
    pub outcome: ActionOutcome,
}

impl ActionResult {
    /// Whether the action mutated state.
    pub fn is_applied(&self) -> bool {
        self.outcome == ActionOutcome::Applied
    }
}

/// Resolve one action against the state.
pub fn apply_action(state: &mut GameState, action: &Action) -> ActionResult {
    let resolved = if state.wait_for_round {
        // Rejected before resolution, throttle untouched
        Err(Rejection::Waiting)
    } else {
        match *action {
            Action::Move { actor, direction, created_at } => {
                resolve_move(state, actor, direction, created_at)
            }
            Action::Fire { actor, direction, created_at } => {
                resolve_fire(state, actor, direction, created_at)
            }
        }
    };

    let outcome = match resolved {
        Ok(()) => ActionOutcome::Applied,
        Err(rejection) => {
            debug!(actor = ?action.actor(), kind = ?action.kind(), ?rejection, "Action dropped");
            ActionOutcome::Rejected(rejection)
        }
    };

    ActionResult {
        changes: state.take_changes(),
        outcome,
    }
}

fn resolve_move(
    state: &mut GameState,
    actor: EntityId,
    direction: Direction,
    created_at: DateTime<Utc>,
) -> Result<(), Rejection> {
    let entity = state.entities.get_mut(actor).ok_or(Rejection::UnknownEntity)?;
    let position = entity.position().ok_or(Rejection::MissingCapability)?;
    if entity.as_mover().is_none() {
        return Err(Rejection::MissingCapability);
    }

    let key = ThrottleKey::new(ActionKind::Move, actor);
    if !state.throttle.allow(key, created_at, state.config.move_throttle) {
        return Err(Rejection::Throttled);
    }

    // Stop resolves to the current cell and applies as a no-op move
    let candidate = position.step(direction);
    if is_blocked(&state.map, candidate) {
        return Err(Rejection::WallCollision);
    }
    if occupied_by_other_player(&state.entities, candidate, actor) {
        return Err(Rejection::PlayerCollision);
    }

    if let Some(mover) = state.entities.get_mut(actor).and_then(|e| e.as_mover()) {
        mover.set_position(candidate);
    }
    state.throttle.record(key, created_at);
    state.pending.push(Change::Move {
        entity: actor,
        direction,
        position: candidate,
    });
    Ok(())
}

fn resolve_fire(
    state: &mut GameState,
    actor: EntityId,
    direction: Direction,
    created_at: DateTime<Utc>,
) -> Result<(), Rejection> {
    let entity = state.entities.get(actor).ok_or(Rejection::UnknownEntity)?;
    let position = entity.position().ok_or(Rejection::MissingCapability)?;
    if !direction.is_moving() {
        return Err(Rejection::NoDirection);
    }

    let key = ThrottleKey::new(ActionKind::Fire, actor);
    if !state.throttle.allow(key, created_at, state.config.laser_throttle) {
        return Err(Rejection::Throttled);
    }

    let spawn = position.step(direction);
    if is_blocked(&state.map, spawn) {
        return Err(Rejection::WallCollision);
    }

    state.throttle.record(key, created_at);
    state.add_entity(Box::new(Laser::new(actor, spawn, direction)));
    Ok(())
}

/// Walls and cells off the grid are impassable.
#[inline]
pub fn is_blocked(map: &ArenaMap, coord: Coordinate) -> bool {
    map.is_wall(coord) || !map.contains(coord)
}

/// Whether a player other than `actor` stands on `coord`.
pub fn occupied_by_other_player(entities: &EntityTable, coord: Coordinate, actor: EntityId) -> bool {
    entities
        .collision_map()
        .get(&coord)
        .is_some_and(|occupants| occupants.iter().any(|e| e.is_player() && e.id() != actor))
}

// =============================================================================
// LASER SWEEP
// =============================================================================

/// Advance every laser by `elapsed`, resolving hits and wall impacts.
///
/// Does nothing while waiting for a round. Stops early if a hit ends the
/// round part-way through.
pub fn sweep(state: &mut GameState, elapsed: Duration, now: DateTime<Utc>) -> Vec<Change> {
    if state.wait_for_round {
        return state.take_changes();
    }

    let speed = state.config.laser_speed;
    let lasers: Vec<EntityId> = state.entities.lasers().map(|l| l.id).collect();
    for id in lasers {
        if state.wait_for_round {
            break;
        }
        advance_laser(state, id, elapsed, speed, now);
    }

    state.take_changes()
}

fn advance_laser(
    state: &mut GameState,
    id: EntityId,
    elapsed: Duration,
    speed: u32,
    now: DateTime<Utc>,
) {
    let Some(mut laser) = state.entities.get(id).and_then(|e| e.as_laser()).cloned() else {
        return;
    };
    laser.age = laser.age.saturating_add(elapsed);
    let due = laser.due_steps(speed);

    // Hits are checked before the first step and after every step
    loop {
        if let Some(victim) = player_hit(&state.entities, &laser) {
            store_laser(state, &laser);
            resolve_hit(state, &laser, victim, now);
            return;
        }
        if laser.steps >= due {
            break;
        }

        let next = laser.position.step(laser.direction);
        if is_blocked(&state.map, next) {
            store_laser(state, &laser);
            state.remove_entity(id);
            return;
        }
        laser.position = next;
        laser.steps += 1;
        state.pending.push(Change::Move {
            entity: id,
            direction: laser.direction,
            position: next,
        });
    }

    store_laser(state, &laser);
}

fn store_laser(state: &mut GameState, laser: &Laser) {
    if let Some(slot) = state.entities.get_mut(laser.id).and_then(|e| e.as_laser_mut()) {
        *slot = laser.clone();
    }
}

fn player_hit(entities: &EntityTable, laser: &Laser) -> Option<EntityId> {
    entities
        .players()
        .find(|p| p.position == laser.position && p.id != laser.owner)
        .map(|p| p.id)
}

fn resolve_hit(state: &mut GameState, laser: &Laser, victim: EntityId, now: DateTime<Utc>) {
    state.remove_entity(laser.id);

    let spawn = state.next_spawn_point();
    if let Some(mover) = state.entities.get_mut(victim).and_then(|e| e.as_mover()) {
        mover.set_position(spawn);
    }
    if let Some(player) = state.entities.get(victim).and_then(|e| e.as_player()).cloned() {
        state.pending.push(Change::PlayerRespawn {
            player,
            killed_by: laser.owner,
        });
    }

    debug!(shooter = ?laser.owner, ?victim, ?spawn, "Player hit");
    // Only shooters still in the arena score
    if state.entities.contains(laser.owner) {
        state.add_score(laser.owner, now);
    }
}

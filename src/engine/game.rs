//! Serialized Game Engine
//!
//! Async wrapper that owns the game state. A single worker task applies
//! queued actions one at a time under the write lock; a sweep task
//! advances lasers on a fixed period; round restarts run on one-shot
//! timers. Observers read through a shared guard.

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::game::action::Action;
use crate::game::entity::{Entity, EntityId, Identifier};
use crate::game::events::Change;
use crate::game::map::{ArenaMap, MapError};
use crate::game::state::{GameConfig, GameState};
use crate::game::tick::{apply_action, sweep};
use crate::engine::notifier::{self, ChangeNotifier, ChangeStream};
use crate::COLLISION_CHECK_FREQUENCY;

/// Runtime parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Period of the laser sweep.
    pub sweep_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval: COLLISION_CHECK_FREQUENCY,
        }
    }
}

/// Engine errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The worker has shut down.
    #[error("Engine has stopped")]
    Stopped,

    /// The arena asset is malformed.
    #[error("Invalid arena: {0}")]
    Map(#[from] MapError),
}

struct Shared {
    state: RwLock<GameState>,
    notifier: ChangeNotifier,
    round_wait: Duration,
}

impl Shared {
    /// Arm a restart timer for every round that ended, then publish the
    /// latest change of the batch.
    fn commit(self: &Arc<Self>, changes: Vec<Change>) {
        for round in changes.iter().filter_map(Change::ended_round) {
            Self::schedule_new_round(self.clone(), round);
        }
        if let Some(latest) = changes.into_iter().last() {
            self.notifier.publish(latest);
        }
    }

    fn schedule_new_round(shared: Arc<Self>, round: u64) {
        let wait = shared.round_wait;
        debug!(round, ?wait, "Round restart scheduled");

        tokio::spawn(async move {
            sleep(wait).await;
            let changes = {
                let mut state = shared.state.write().await;
                if !state.start_new_round(round) {
                    debug!(round, "Stale round timer ignored");
                    return;
                }
                state.take_changes()
            };
            shared.commit(changes);
        });
    }
}

/// Handle to a running arena. Cheap to clone.
#[derive(Clone)]
pub struct Game {
    shared: Arc<Shared>,
    actions: mpsc::Sender<Action>,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Game {
    /// Start the worker and sweep tasks. Must run inside a tokio runtime.
    pub fn start(state: GameState, config: EngineConfig) -> (Self, ChangeStream) {
        let (notifier, stream) = notifier::channel();
        let (actions_tx, actions_rx) = mpsc::channel(1);
        let (shutdown_tx, _) = broadcast::channel(1);

        let shared = Arc::new(Shared {
            round_wait: state.config().new_round_wait,
            state: RwLock::new(state),
            notifier,
        });

        let worker = tokio::spawn(run_worker(
            shared.clone(),
            actions_rx,
            shutdown_tx.subscribe(),
        ));
        let sweeper = tokio::spawn(run_sweep(
            shared.clone(),
            config.sweep_interval,
            shutdown_tx.subscribe(),
        ));

        info!(sweep_interval = ?config.sweep_interval, "Game engine started");

        let game = Self {
            shared,
            actions: actions_tx,
            shutdown_tx,
            tasks: Arc::new(Mutex::new(vec![worker, sweeper])),
        };
        (game, stream)
    }

    /// Start on the standard arena.
    pub fn with_default_arena(
        game_config: GameConfig,
        config: EngineConfig,
    ) -> Result<(Self, ChangeStream), EngineError> {
        let map = ArenaMap::default_arena()?;
        Ok(Self::start(GameState::new(map, game_config), config))
    }

    /// Queue an action. Waits while the intake slot is occupied.
    ///
    /// There is no acknowledgement; rejected actions vanish silently.
    pub async fn submit(&self, action: Action) -> Result<(), EngineError> {
        self.actions
            .send(action)
            .await
            .map_err(|_| EngineError::Stopped)
    }

    /// Register an entity. Returns the entity it replaced.
    pub async fn add_entity(&self, entity: Box<dyn Entity>) -> Option<Box<dyn Entity>> {
        let id = entity.id();
        let (replaced, changes) = {
            let mut state = self.shared.state.write().await;
            let replaced = state.add_entity(entity);
            (replaced, state.take_changes())
        };
        info!(id = ?id, "Entity registered");
        self.shared.commit(changes);
        replaced
    }

    /// Register a new player on the next spawn point.
    pub async fn spawn_player(&self, name: impl Into<String>, icon: char) -> EntityId {
        let (id, changes) = {
            let mut state = self.shared.state.write().await;
            let id = state.spawn_player(name, icon);
            (id, state.take_changes())
        };
        info!(id = ?id, "Player joined");
        self.shared.commit(changes);
        id
    }

    /// Unregister an entity.
    pub async fn remove_entity(&self, id: EntityId) -> Option<Box<dyn Entity>> {
        let (removed, changes) = {
            let mut state = self.shared.state.write().await;
            let removed = state.remove_entity(id);
            (removed, state.take_changes())
        };
        if removed.is_some() {
            info!(id = ?id, "Entity unregistered");
        }
        self.shared.commit(changes);
        removed
    }

    /// Shared read access to the state.
    pub async fn read(&self) -> RwLockReadGuard<'_, GameState> {
        self.shared.state.read().await
    }

    /// Stop the worker and sweep and wait for them to exit.
    ///
    /// Pending round timers still fire once.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for task in tasks {
            let _ = task.await;
        }
    }
}

#[instrument(skip_all)]
async fn run_worker(
    shared: Arc<Shared>,
    mut actions: mpsc::Receiver<Action>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            action = actions.recv() => {
                let Some(action) = action else {
                    break;
                };
                let result = {
                    let mut state = shared.state.write().await;
                    apply_action(&mut state, &action)
                };
                shared.commit(result.changes);
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
}

#[instrument(skip(shared, shutdown_rx))]
async fn run_sweep(
    shared: Arc<Shared>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let elapsed = now.duration_since(last);
                last = now;

                let changes = {
                    let mut state = shared.state.write().await;
                    sweep(&mut state, elapsed, Utc::now())
                };
                shared.commit(changes);
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coord::{Coordinate, Direction};
    use crate::game::entity::Player;

    fn corridor(config: GameConfig) -> GameState {
        let map = ArenaMap::parse("#########\n#S     S#\n#########").unwrap();
        GameState::new(map, config)
    }

    fn player(n: u128, at: Coordinate) -> Box<Player> {
        Box::new(Player::with_id(EntityId::from_u128(n), format!("p{n}"), 'p', at))
    }

    async fn settle() {
        sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_through_engine() {
        let (game, mut stream) = Game::start(corridor(GameConfig::default()), EngineConfig::default());
        let id = game.spawn_player("ann", 'A').await;
        assert!(matches!(stream.recv().await, Some(Change::AddEntity { .. })));

        game.submit(Action::movement(id, Direction::Right, Utc::now())).await.unwrap();
        assert_eq!(
            stream.recv().await,
            Some(Change::Move { entity: id, direction: Direction::Right, position: Coordinate::new(-2, 0) })
        );

        // Wall on the left of the spawn
        game.submit(Action::movement(id, Direction::Up, Utc::now())).await.unwrap();
        settle().await;
        assert_eq!(stream.try_recv(), None);
        assert_eq!(
            game.read().await.entities.get(id).and_then(|e| e.position()),
            Some(Coordinate::new(-2, 0))
        );

        game.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_cycle() {
        let mut state = corridor(GameConfig::default());
        let a = EntityId::from_u128(1);
        let b = EntityId::from_u128(2);
        state.add_entity(player(1, Coordinate::new(-1, 0)));
        state.add_entity(player(2, Coordinate::new(3, 0)));
        state.score.insert(a, 9);
        state.take_changes();

        let (game, _stream) = Game::start(state, EngineConfig::default());
        game.submit(Action::fire(a, Direction::Right, Utc::now())).await.unwrap();
        sleep(Duration::from_millis(200)).await;

        {
            let state = game.read().await;
            assert!(state.wait_for_round);
            assert_eq!(state.round_winner, Some(a));
            assert_eq!(state.score_of(a), 10);
            assert!(state.new_round_at.is_some());
        }

        // Frozen while waiting
        game.submit(Action::movement(a, Direction::Left, Utc::now())).await.unwrap();
        sleep(Duration::from_secs(9)).await;
        {
            let state = game.read().await;
            assert!(state.wait_for_round);
            assert_eq!(state.round, 0);
            assert_eq!(state.entities.get(a).and_then(|e| e.position()), Some(Coordinate::new(-1, 0)));
        }

        sleep(Duration::from_secs(2)).await;
        {
            let state = game.read().await;
            assert!(!state.wait_for_round);
            assert_eq!(state.round, 1);
            assert!(state.score.is_empty());
            assert_eq!(state.entities.get(a).and_then(|e| e.position()), Some(Coordinate::new(-3, 0)));
            assert_eq!(state.entities.get(b).and_then(|e| e.position()), Some(Coordinate::new(3, 0)));
        }

        game.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_draining_observer_sees_round_over() {
        let mut state = corridor(GameConfig::default());
        let a = EntityId::from_u128(1);
        state.add_entity(player(1, Coordinate::new(-1, 0)));
        state.add_entity(player(2, Coordinate::new(3, 0)));
        state.score.insert(a, 9);
        state.take_changes();

        let (game, mut stream) = Game::start(state, EngineConfig::default());
        let collector = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(change) = stream.recv().await {
                let done = change.ended_round().is_some();
                seen.push(change);
                if done {
                    break;
                }
            }
            seen
        });

        game.submit(Action::fire(a, Direction::Right, Utc::now())).await.unwrap();
        sleep(Duration::from_millis(500)).await;

        assert!(game.read().await.wait_for_round);
        let seen = collector.await.unwrap();
        assert!(matches!(seen.first(), Some(Change::AddEntity { .. })));
        assert_eq!(seen.last(), Some(&Change::RoundOver { winner: a, round: 0 }));

        game.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_registration_and_shutdown() {
        let (game, mut stream) = Game::start(corridor(GameConfig::default()), EngineConfig::default());
        let id = EntityId::from_u128(5);

        assert!(game.add_entity(player(5, Coordinate::ORIGIN)).await.is_none());
        assert!(matches!(stream.recv().await, Some(Change::AddEntity { entity }) if entity.id() == id));

        assert!(game.remove_entity(id).await.is_some());
        assert!(matches!(stream.recv().await, Some(Change::RemoveEntity { .. })));
        assert!(game.remove_entity(id).await.is_none());

        game.shutdown().await;
        let err = game.submit(Action::movement(id, Direction::Up, Utc::now())).await.unwrap_err();
        assert!(matches!(err, EngineError::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_arena_engine() {
        let (game, _stream) = Game::with_default_arena(GameConfig::default(), EngineConfig::default()).unwrap();
        assert_eq!(game.read().await.map().dimensions(), (40, 40));
        game.shutdown().await;
    }
}

//! Game manager - owns every board and drives them in lockstep
//!
//! Games are independent; the manager only fixes their order (index order) so
//! that ticks and render frames are reproducible.

use tracing::debug;

use crate::game::TetrisGame;
use crate::rng::SimpleRng;
use crate::types::TetrisAction;

/// Consumer of render frames
pub trait RenderSink {
    /// The number of games changed
    fn set_games(&mut self, count: usize);

    /// Serialize every game, in index order
    fn render_games(&mut self, games: &[TetrisGame]);
}

impl<T: RenderSink + ?Sized> RenderSink for &mut T {
    fn set_games(&mut self, count: usize) {
        (**self).set_games(count);
    }

    fn render_games(&mut self, games: &[TetrisGame]) {
        (**self).render_games(games);
    }
}

impl<T: RenderSink + ?Sized> RenderSink for Box<T> {
    fn set_games(&mut self, count: usize) {
        (**self).set_games(count);
    }

    fn render_games(&mut self, games: &[TetrisGame]) {
        (**self).render_games(games);
    }
}

/// Sink that drops every frame (headless runs, benches)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn set_games(&mut self, _count: usize) {}

    fn render_games(&mut self, _games: &[TetrisGame]) {}
}

/// Owns N games and renders them after every change
#[derive(Debug)]
pub struct GameManager<R: RenderSink> {
    games: Vec<TetrisGame>,
    renderer: R,
    running: bool,
    seeds: SimpleRng,
}

impl<R: RenderSink> GameManager<R> {
    /// `seed` derives the per-game seeds, so equal seeds give equal runs
    pub fn new(renderer: R, seed: u32) -> Self {
        Self {
            games: Vec::new(),
            renderer,
            running: false,
            seeds: SimpleRng::new(seed),
        }
    }

    /// Append a `Ready` game and return its index
    pub fn add_game(&mut self) -> usize {
        let game = TetrisGame::new(self.seeds.next_u32());
        debug!(index = self.games.len(), seed = game.seed(), "game added");
        self.games.push(game);
        self.renderer.set_games(self.games.len());
        self.render();
        self.games.len() - 1
    }

    /// Start every `Ready` game. A second call while running does nothing.
    pub fn play_game(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        for game in &mut self.games {
            game.start();
        }
        self.render();
        true
    }

    /// Forward an action to one game. Unknown indices are ignored.
    pub fn push_action(&mut self, game_index: usize, action: TetrisAction) -> bool {
        let Some(game) = self.games.get_mut(game_index) else {
            debug!(game_index, ?action, "action for unknown game dropped");
            return false;
        };
        let changed = game.apply_action(action);
        self.render();
        changed
    }

    /// Tick every game in index order, then render once
    pub fn run_tick(&mut self) {
        for game in &mut self.games {
            game.tick();
        }
        self.render();
    }

    pub fn render(&mut self) {
        self.renderer.render_games(&self.games);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games(&self) -> &[TetrisGame] {
        &self.games
    }

    pub fn game(&self, index: usize) -> Option<&TetrisGame> {
        self.games.get(index)
    }

    pub fn game_mut(&mut self, index: usize) -> Option<&mut TetrisGame> {
        self.games.get_mut(index)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

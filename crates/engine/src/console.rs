//! Console - ties sessions, slots and games together
//!
//! The console is the only owner of the session registry and the game
//! manager. Transport events, slot assignment, ticks and the start/halt
//! commands all run on the thread that owns it, so no state is shared.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::ConsoleConfig;
use crate::core::{GameManager, RenderSink};
use crate::session::{ControllerLink, SessionRegistry, TransportEvent};
use crate::types::{PeerAddress, PlayerId};

/// Slot numbers travel as one byte
pub const MAX_SLOTS: usize = u8::MAX as usize + 1;

/// Operator commands read from the console's standard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Quit,
}

impl ConsoleCommand {
    /// Blank line or `start` starts, `quit`/`q`/`exit` quits
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "start" | "s" => Some(Self::Start),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub struct Console<R: RenderSink, L: ControllerLink> {
    config: ConsoleConfig,
    registry: SessionRegistry,
    games: GameManager<R>,
    link: L,
    /// Player driving each game, by game index
    slots: Vec<PlayerId>,
    slot_of: HashMap<PlayerId, usize>,
    started: bool,
}

impl<R: RenderSink, L: ControllerLink> Console<R, L> {
    pub fn new(mut config: ConsoleConfig, renderer: R, link: L) -> Self {
        config.max_players = config.max_players.min(MAX_SLOTS);
        let seed = config.resolve_seed();
        info!(seed, max_players = config.max_players, "console created");
        Self {
            registry: SessionRegistry::with_queue_cap(config.queue_cap),
            games: GameManager::new(renderer, seed),
            link,
            slots: Vec::new(),
            slot_of: HashMap::new(),
            started: false,
            config,
        }
    }

    /// Apply a transport event.
    ///
    /// Signals can only reach a controller once it has confirmed its
    /// capabilities on the current link. At that point an assigned player
    /// gets its slot again and, after the start, every player gets ready.
    pub fn handle_event(&mut self, event: TransportEvent) {
        let Some(player_id) = self.registry.handle_event(event) else {
            return;
        };

        if let TransportEvent::CapabilityConfirmed(address) = event {
            if let Some(&slot) = self.slot_of.get(&player_id) {
                self.link.send_player_slot(address, slot as u8);
                debug!(player_id, slot, "slot signal restored");
            }
            if self.started {
                self.link.send_ready(address);
            }
        }
    }

    /// Give each validated, unassigned player its own game until the
    /// player cap is reached. Does nothing once the game has started.
    ///
    /// Returns the number of players assigned in this pass.
    pub fn assign_slots(&mut self) -> usize {
        if self.started {
            return 0;
        }

        let mut assigned = 0;
        for player_id in self.registry.valid_player_ids() {
            if self.slots.len() >= self.config.max_players {
                break;
            }
            if self.slot_of.contains_key(&player_id) {
                continue;
            }
            let Some(address) = self.registry.session(player_id).map(|s| s.address()) else {
                continue;
            };

            let slot = self.games.add_game();
            self.slots.push(player_id);
            self.slot_of.insert(player_id, slot);
            self.link.send_player_slot(address, slot as u8);
            info!(player_id, slot, %address, "player assigned");
            assigned += 1;
        }
        assigned
    }

    /// Send ready to every connected controller and start every game.
    ///
    /// Returns `false` if the console had already started.
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;

        for address in self.registry.connected_addresses() {
            self.link.send_ready(address);
        }
        self.games.play_game();
        info!(games = self.games.len(), "game started");
        true
    }

    /// One frame: at most one queued action per game, then a tick.
    pub fn run_frame(&mut self) {
        for slot in 0..self.slots.len() {
            let player_id = self.slots[slot];
            let (action, magnitude) = self.registry.dequeue(player_id);
            if let Some(action) = action.to_tetris() {
                debug!(slot, ?action, magnitude, "action applied");
                self.games.push_action(slot, action);
            }
        }
        self.games.run_tick();
    }

    /// Tell every connected controller the game is paused
    pub fn halt(&mut self) {
        for address in self.registry.connected_addresses() {
            self.link.send_pause(address);
        }
        info!("console halted");
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn games(&self) -> &GameManager<R> {
        &self.games
    }

    pub fn games_mut(&mut self) -> &mut GameManager<R> {
        &mut self.games
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Game index assigned to a player
    pub fn slot_of(&self, player_id: PlayerId) -> Option<usize> {
        self.slot_of.get(&player_id).copied()
    }

    /// Player driving a game
    pub fn player_in_slot(&self, slot: usize) -> Option<PlayerId> {
        self.slots.get(slot).copied()
    }

    /// Game index driven by the controller at `address`
    pub fn slot_of_address(&self, address: &PeerAddress) -> Option<usize> {
        self.registry
            .player_id(address)
            .and_then(|id| self.slot_of(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NullSink;
    use crate::session::RecordingLink;
    use crate::types::{Action, ControllerSignal, GameStatus, PieceKind};

    fn addr(n: u8) -> PeerAddress {
        PeerAddress([0x24, 0x0a, 0xc4, 0, 0, n])
    }

    fn console() -> Console<NullSink, RecordingLink> {
        let config = ConsoleConfig {
            seed: Some(7),
            ..ConsoleConfig::default()
        };
        Console::new(config, NullSink, RecordingLink::new())
    }

    fn join(c: &mut Console<NullSink, RecordingLink>, a: PeerAddress) {
        c.handle_event(TransportEvent::PeerConnected(a));
        c.handle_event(TransportEvent::CapabilityConfirmed(a));
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(ConsoleCommand::parse(""), Some(ConsoleCommand::Start));
        assert_eq!(ConsoleCommand::parse(" START\n"), Some(ConsoleCommand::Start));
        assert_eq!(ConsoleCommand::parse("q"), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("dance"), None);
    }

    #[test]
    fn test_only_validated_players_get_slots() {
        let mut c = console();
        join(&mut c, addr(1));
        c.handle_event(TransportEvent::PeerConnected(addr(2)));

        assert_eq!(c.assign_slots(), 1);
        assert_eq!(c.games().len(), 1);
        assert_eq!(
            c.link().sent_to(addr(1)),
            vec![ControllerSignal::PlayerSlot(0)]
        );
        assert!(c.link().sent_to(addr(2)).is_empty());
    }

    #[test]
    fn test_assignment_is_stable_across_passes() {
        let mut c = console();
        join(&mut c, addr(1));
        c.assign_slots();
        join(&mut c, addr(2));
        assert_eq!(c.assign_slots(), 1);
        assert_eq!(c.assign_slots(), 0);
        assert_eq!(c.slot_of_address(&addr(1)), Some(0));
        assert_eq!(c.slot_of_address(&addr(2)), Some(1));
    }

    #[test]
    fn test_player_cap() {
        let mut c = console();
        for n in 1..=5 {
            join(&mut c, addr(n));
        }
        assert_eq!(c.assign_slots(), 3);
        assert_eq!(c.games().len(), 3);
        assert_eq!(c.slot_of_address(&addr(4)), None);
    }

    #[test]
    fn test_no_assignment_after_start() {
        let mut c = console();
        join(&mut c, addr(1));
        c.assign_slots();
        assert!(c.start());
        join(&mut c, addr(2));
        assert_eq!(c.assign_slots(), 0);
        assert!(!c.start());
    }

    #[test]
    fn test_start_readies_connected_controllers() {
        let mut c = console();
        join(&mut c, addr(1));
        c.handle_event(TransportEvent::PeerConnected(addr(2)));
        c.assign_slots();
        c.start();

        assert_eq!(
            c.link().sent_to(addr(1)),
            vec![ControllerSignal::PlayerSlot(0), ControllerSignal::Ready]
        );
        assert_eq!(c.link().sent_to(addr(2)), vec![ControllerSignal::Ready]);
        assert_eq!(c.games().game(0).unwrap().status(), GameStatus::Playing);
    }

    #[test]
    fn test_frame_applies_one_action_per_game() {
        let mut c = console();
        join(&mut c, addr(1));
        c.assign_slots();
        c.start();
        c.games_mut()
            .game_mut(0)
            .unwrap()
            .spawn_piece(Some(PieceKind::Square));

        for _ in 0..2 {
            c.handle_event(TransportEvent::ActionReceived {
                address: addr(1),
                action: Action::MoveLeft,
                magnitude: 0,
            });
        }
        c.run_frame();

        let game = c.games().game(0).unwrap();
        let min_x = game.current_piece().unwrap().cells.iter().map(|c| c.0).min();
        assert_eq!(min_x, Some(3));
        let player = c.player_in_slot(0).unwrap();
        assert_eq!(c.registry().session(player).unwrap().pending_len(), 1);
    }

    #[test]
    fn test_reconnect_restores_slot_and_ready() {
        let mut c = console();
        join(&mut c, addr(1));
        c.assign_slots();
        c.start();
        c.handle_event(TransportEvent::PeerDisconnected(addr(1)));
        c.handle_event(TransportEvent::PeerConnected(addr(1)));
        assert_eq!(c.link().sent_to(addr(1)).len(), 2);

        c.handle_event(TransportEvent::CapabilityConfirmed(addr(1)));
        assert_eq!(
            c.link().sent_to(addr(1)),
            vec![
                ControllerSignal::PlayerSlot(0),
                ControllerSignal::Ready,
                ControllerSignal::PlayerSlot(0),
                ControllerSignal::Ready,
            ]
        );
    }

    #[test]
    fn test_late_capability_still_gets_ready() {
        let mut c = console();
        join(&mut c, addr(1));
        c.handle_event(TransportEvent::PeerConnected(addr(2)));
        c.assign_slots();
        c.start();
        c.handle_event(TransportEvent::CapabilityConfirmed(addr(2)));

        assert_eq!(
            c.link().sent_to(addr(2)),
            vec![ControllerSignal::Ready, ControllerSignal::Ready]
        );
    }

    #[test]
    fn test_player_cap_is_clamped_to_slot_range() {
        let config = ConsoleConfig {
            max_players: 1000,
            seed: Some(1),
            ..ConsoleConfig::default()
        };
        let c = Console::new(config, NullSink, RecordingLink::new());
        assert_eq!(c.config().max_players, MAX_SLOTS);
    }

    #[test]
    fn test_halt_pauses_only_connected() {
        let mut c = console();
        join(&mut c, addr(1));
        join(&mut c, addr(2));
        c.handle_event(TransportEvent::PeerDisconnected(addr(2)));
        c.halt();
        assert_eq!(c.link().sent_to(addr(1)), vec![ControllerSignal::Paused]);
        assert!(c.link().sent_to(addr(2)).is_empty());
    }
}

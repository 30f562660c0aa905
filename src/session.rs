//! One game session: board, turn, mode and network identity behind a single
//! transition function.
//!
//! Every input (a click, a received move, a countdown tick, the computer's
//! turn) is an [`Event`]. [`GameSession::handle`] is the only code that
//! mutates the session and reports what happened as a list of [`Effect`]s for
//! the host to act on. Hosts that batch inputs push them with
//! [`GameSession::enqueue`] and process them in arrival order with
//! [`GameSession::drain`].

use std::collections::VecDeque;

use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{ConfigError, DesyncRisk, GameError};
use crate::opponent::{MoveSelector, RandomMoveSelector};
use crate::rules;
use crate::sync::{self, MoveMessage, RoomJoined, SessionIdentity};
use crate::turn::TurnController;
use crate::types::{GameMode, GameView, Move, Outcome, Player, Position};
use crate::win;

/// The side the computer plays in single-player mode.
pub const COMPUTER: Player = Player::Black;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Starts an offline or single-player game. Networked games start from
    /// [`Event::RoomJoined`].
    Start(GameMode),
    Click(Position),
    LocalMove(Move),
    RemoteMove(MoveMessage),
    Tick,
    OpponentTurn,
    RoomCreated(String),
    RoomJoined(RoomJoined),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    /// Selection changed. `from` is `None` when it was cleared.
    Selected {
        from: Option<Position>,
        destinations: Vec<Position>,
    },
    Moved {
        #[serde(rename = "move")]
        mv: Move,
    },
    /// Forward to the relay as a `move` event.
    Send { message: MoveMessage },
    #[serde(rename_all = "camelCase")]
    TurnChanged { player: Player, local_may_act: bool },
    /// Trigger [`Event::OpponentTurn`] after the delay.
    #[serde(rename_all = "camelCase")]
    ScheduleOpponent { delay_ms: u32 },
    /// The computer has no legal move; the turn does not advance.
    OpponentStalled,
    #[serde(rename_all = "camelCase")]
    WaitingForPeer { room_id: String },
    GameEnded { outcome: Outcome },
    /// A remote move was applied but the boards no longer agree.
    Desync {
        #[serde(serialize_with = "display")]
        risk: DesyncRisk,
    },
    /// A queued event failed; later events were still processed.
    Rejected {
        #[serde(serialize_with = "display")]
        error: GameError,
    },
}

fn display<T: std::fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    WaitingForPeer,
    Playing,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub from: Position,
    pub destinations: Vec<Position>,
}

pub struct GameSession {
    config: GameConfig,
    mode: Option<GameMode>,
    phase: Phase,
    board: Board,
    turn: TurnController,
    identity: Option<SessionIdentity>,
    names: [String; 2],
    selection: Option<Selection>,
    outcome: Option<Outcome>,
    opponent: Box<dyn MoveSelector>,
    queue: VecDeque<Event>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let opponent: Box<dyn MoveSelector> = match config.opponent_seed {
            Some(seed) => Box::new(RandomMoveSelector::with_seed(seed)),
            None => Box::new(RandomMoveSelector::new()),
        };
        Self::with_opponent(config, opponent)
    }

    pub fn with_opponent(
        config: GameConfig,
        opponent: Box<dyn MoveSelector>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut turn = TurnController::new(config.turn_seconds, None);
        turn.halt();
        Ok(Self {
            config,
            mode: None,
            phase: Phase::Idle,
            board: Board::new(),
            turn,
            identity: None,
            names: default_names(),
            selection: None,
            outcome: None,
            opponent,
            queue: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> &TurnController {
        &self.turn
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn names(&self) -> &[String; 2] {
        &self.names
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn enqueue(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Processes queued events in order. A failing event becomes
    /// [`Effect::Rejected`] and does not stop the rest.
    pub fn drain(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            match self.handle(event) {
                Ok(mut out) => effects.append(&mut out),
                Err(error) => effects.push(Effect::Rejected { error }),
            }
        }
        effects
    }

    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, GameError> {
        match event {
            Event::Start(mode) => self.start(mode),
            Event::Click(pos) => self.click(pos),
            Event::LocalMove(mv) => self.local_move(mv),
            Event::RemoteMove(msg) => self.remote_move(msg),
            Event::Tick => Ok(self.tick()),
            Event::OpponentTurn => self.opponent_turn(),
            Event::RoomCreated(room_id) => self.room_created(room_id),
            Event::RoomJoined(joined) => self.room_joined(joined),
        }
    }

    pub fn view(&self) -> GameView {
        let (red_count, black_count) = self.board.count();
        let (selected, highlighted) = match &self.selection {
            Some(sel) => (Some(sel.from), sel.destinations.clone()),
            None => (None, Vec::new()),
        };
        let current = self.turn.current();
        GameView {
            board: self.board.to_array().to_vec(),
            mode: self.mode,
            current_player: current.index(),
            local_may_act: self.phase == Phase::Playing && self.turn.local_may_act(),
            red_count,
            black_count,
            time_left: self.turn.time_left(),
            player_names: self.names.clone(),
            selected,
            highlighted,
            room_id: self.identity.as_ref().map(|id| id.room_id.clone()),
            player_index: self.identity.as_ref().map(|id| id.player.index()),
            is_game_over: self.phase == Phase::Finished,
            outcome: self.outcome,
            end_message: self.outcome.map(|o| o.to_string()),
            turn_text: format!("{}'s Turn", current.name()),
            timer_text: format!("Time left: {}s", self.turn.time_left()),
        }
    }

    fn start(&mut self, mode: GameMode) -> Result<Vec<Effect>, GameError> {
        let names = match mode {
            GameMode::Offline => ["You", "Player 2"],
            GameMode::Ai => ["You", "Computer"],
            GameMode::Online => return Err(GameError::WrongMode(mode.as_str())),
        };
        self.identity = None;
        self.names = names.map(String::from);
        Ok(self.begin(mode, None))
    }

    fn room_created(&mut self, room_id: String) -> Result<Vec<Effect>, GameError> {
        let room_id = sync::validate_room_id(&room_id, self.config.max_room_id_len)?;
        info!(room = %room_id, "room created, waiting for opponent");
        self.mode = Some(GameMode::Online);
        self.phase = Phase::WaitingForPeer;
        self.board = Board::new();
        self.outcome = None;
        self.selection = None;
        self.turn = TurnController::new(self.config.turn_seconds, Some(Player::Red));
        self.turn.halt();
        self.identity = Some(SessionIdentity {
            room_id: room_id.clone(),
            player: Player::Red,
        });
        Ok(vec![Effect::WaitingForPeer { room_id }])
    }

    fn room_joined(&mut self, joined: RoomJoined) -> Result<Vec<Effect>, GameError> {
        let room_id = sync::validate_room_id(&joined.room_id, self.config.max_room_id_len)?;
        let player = Player::from_index(joined.player_index)
            .ok_or(GameError::InvalidPlayerIndex(joined.player_index))?;
        if let Some(name) = joined.player_names.red {
            self.names[0] = name;
        }
        if let Some(name) = joined.player_names.black {
            self.names[1] = name;
        }
        info!(room = %room_id, player = player.name(), "joined room");
        self.identity = Some(SessionIdentity { room_id, player });
        Ok(self.begin(GameMode::Online, Some(player)))
    }

    fn begin(&mut self, mode: GameMode, local_player: Option<Player>) -> Vec<Effect> {
        self.mode = Some(mode);
        self.phase = Phase::Playing;
        self.board = Board::new();
        self.turn = TurnController::new(self.config.turn_seconds, local_player);
        self.selection = None;
        self.outcome = None;
        debug!(mode = mode.as_str(), "game started");
        vec![self.turn_changed()]
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::Finished => Err(GameError::GameOver),
            Phase::Idle | Phase::WaitingForPeer => Err(GameError::NoSession),
        }
    }

    fn click(&mut self, pos: Position) -> Result<Vec<Effect>, GameError> {
        let pos = Position::new(pos.row, pos.col)?;
        self.ensure_playing()?;
        if !self.turn.local_may_act() {
            return Ok(Vec::new());
        }

        if let Some(sel) = &self.selection {
            if sel.destinations.contains(&pos) {
                let mv = Move::new(sel.from, pos);
                return self.local_move(mv);
            }
        }

        let current = self.turn.current();
        self.selection = if self.board.get(pos).owner() == Some(current) {
            Some(Selection {
                from: pos,
                destinations: rules::legal_destinations(&self.board, pos, current),
            })
        } else {
            None
        };
        Ok(vec![match &self.selection {
            Some(sel) => Effect::Selected {
                from: Some(sel.from),
                destinations: sel.destinations.clone(),
            },
            None => Effect::Selected {
                from: None,
                destinations: Vec::new(),
            },
        }])
    }

    fn local_move(&mut self, mv: Move) -> Result<Vec<Effect>, GameError> {
        for end in [mv.from, mv.to] {
            Position::new(end.row, end.col)?;
        }
        self.ensure_playing()?;
        if !self.turn.local_may_act() {
            return Err(GameError::NotYourTurn);
        }
        let mover = self.turn.current();
        if !rules::is_legal(&self.board, mv, mover) {
            return Err(GameError::IllegalMove {
                from: mv.from,
                to: mv.to,
            });
        }

        let mut effects = self.commit(mv)?;
        if let (Some(GameMode::Online), Some(identity)) = (self.mode, &self.identity) {
            let message = sync::outbound(identity, mv, &self.board);
            effects.insert(1, Effect::Send { message });
        }
        if self.mode == Some(GameMode::Ai)
            && self.phase == Phase::Playing
            && self.turn.current() == COMPUTER
        {
            effects.push(Effect::ScheduleOpponent {
                delay_ms: self.config.opponent_delay_ms,
            });
        }
        Ok(effects)
    }

    fn remote_move(&mut self, msg: MoveMessage) -> Result<Vec<Effect>, GameError> {
        if self.mode != Some(GameMode::Online) {
            return Err(GameError::WrongMode(
                self.mode.map_or("idle", GameMode::as_str),
            ));
        }
        self.ensure_playing()?;
        let identity = self.identity.as_ref().ok_or(GameError::NoSession)?;
        let mv = sync::verify_remote(&self.board, &self.turn, identity, &msg)?;

        let mut effects = self.commit(mv)?;
        if let Err(risk) = sync::check_fingerprint(&self.board, &msg) {
            warn!(%mv, %risk, "boards diverged after remote move");
            effects.push(Effect::Desync { risk });
        }
        Ok(effects)
    }

    fn tick(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        match self.turn.tick() {
            Some(outcome) => vec![self.finish(outcome)],
            None => Vec::new(),
        }
    }

    fn opponent_turn(&mut self) -> Result<Vec<Effect>, GameError> {
        if self.mode != Some(GameMode::Ai) {
            return Err(GameError::WrongMode(
                self.mode.map_or("idle", GameMode::as_str),
            ));
        }
        self.ensure_playing()?;
        if self.turn.current() != COMPUTER {
            return Err(GameError::NotYourTurn);
        }

        match self.opponent.select_move(&self.board, COMPUTER) {
            Some(mv) => {
                debug!(selector = self.opponent.name(), %mv, "computer move");
                self.commit(mv)
            }
            None => {
                debug!("computer has no legal move");
                Ok(vec![Effect::OpponentStalled])
            }
        }
    }

    /// Applies an already validated move, hands over the turn and runs the
    /// end checks.
    fn commit(&mut self, mv: Move) -> Result<Vec<Effect>, GameError> {
        self.board.apply(mv)?;
        self.selection = None;
        debug!(%mv, capture = mv.is_capture(), "move committed");

        let mut effects = vec![Effect::Moved { mv }];
        let next = self.turn.advance();
        effects.push(self.turn_changed());

        let outcome = win::check_win(&self.board).or_else(|| {
            if self.config.stalemate_ends_game {
                win::check_stalemate(&self.board, next)
            } else {
                None
            }
        });
        if let Some(outcome) = outcome {
            effects.push(self.finish(outcome));
        }
        Ok(effects)
    }

    fn finish(&mut self, outcome: Outcome) -> Effect {
        self.turn.halt();
        self.phase = Phase::Finished;
        self.outcome = Some(outcome);
        self.selection = None;
        info!(%outcome, "game over");
        Effect::GameEnded { outcome }
    }

    fn turn_changed(&self) -> Effect {
        Effect::TurnChanged {
            player: self.turn.current(),
            local_may_act: self.turn.local_may_act(),
        }
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, current: Player) {
        self.board = board;
        while self.turn.current() != current {
            self.turn.advance();
        }
    }
}

fn default_names() -> [String; 2] {
    [
        sync::DEFAULT_CREATOR_NAME.to_string(),
        sync::DEFAULT_JOINER_NAME.to_string(),
    ]
}

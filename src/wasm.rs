//! JavaScript-facing wrapper around [`GameSession`].
//!
//! The page keeps the canvas, the DOM and the relay socket. It forwards
//! clicks, socket events and timer callbacks here and acts on the returned
//! effect list (draw, emit `move`, schedule the computer, show the end
//! message).
//!
//! No `tracing` subscriber is installed here; the host sets one up before
//! constructing a game if it wants the engine's structured events.

use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::console;
use web_time::Instant;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::rules;
use crate::session::{Effect, Event, GameSession};
use crate::sync::{self, MoveMessage, RoomJoined};
use crate::turn::TurnClock;
use crate::types::{GameMode, Move, Position};

#[wasm_bindgen]
pub struct CheckersGame {
    session: GameSession,
    clock: TurnClock,
}

#[wasm_bindgen]
impl CheckersGame {
    /// `config` may be `undefined` or a partial settings object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CheckersGame, JsValue> {
        console_error_panic_hook::set_once();

        let config = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<GameConfig>(config)
                .map_err(|e| to_js(ConfigError::Decode(e.to_string())))?
        };
        let session = GameSession::new(config).map_err(to_js)?;
        Ok(CheckersGame {
            session,
            clock: TurnClock::new(Instant::now()),
        })
    }

    pub fn start_offline(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(Event::Start(GameMode::Offline))
    }

    pub fn start_vs_ai(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(Event::Start(GameMode::Ai))
    }

    pub fn click(&mut self, row: u8, col: u8) -> Result<JsValue, JsValue> {
        self.dispatch(Event::Click(Position { row, col }))
    }

    pub fn play(
        &mut self,
        from_row: u8,
        from_col: u8,
        to_row: u8,
        to_col: u8,
    ) -> Result<JsValue, JsValue> {
        let mv = Move::new(
            Position::new(from_row, from_col).map_err(to_js)?,
            Position::new(to_row, to_col).map_err(to_js)?,
        );
        self.dispatch(Event::LocalMove(mv))
    }

    /// Destinations for the piece at `(row, col)` for the player to move.
    pub fn legal_destinations(&self, row: u8, col: u8) -> Result<JsValue, JsValue> {
        let from = Position::new(row, col).map_err(to_js)?;
        let destinations = rules::legal_destinations(
            self.session.board(),
            from,
            self.session.turn().current(),
        );
        to_value(&destinations)
    }

    /// Handles a `move` event from the relay.
    pub fn receive_move(&mut self, payload: JsValue) -> Result<JsValue, JsValue> {
        let msg: MoveMessage = serde_wasm_bindgen::from_value(payload).map_err(to_js)?;
        self.dispatch(Event::RemoteMove(msg))
    }

    pub fn room_created(&mut self, room_id: String) -> Result<JsValue, JsValue> {
        self.dispatch(Event::RoomCreated(room_id))
    }

    pub fn room_joined(&mut self, payload: JsValue) -> Result<JsValue, JsValue> {
        let joined: RoomJoined = serde_wasm_bindgen::from_value(payload).map_err(to_js)?;
        self.dispatch(Event::RoomJoined(joined))
    }

    /// One countdown second, for hosts running their own interval.
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(Event::Tick)
    }

    /// Feeds the countdown with however many whole seconds passed since the
    /// last poll.
    pub fn poll_clock(&mut self) -> Result<JsValue, JsValue> {
        let ticks = self.clock.elapsed_ticks(Instant::now());
        for _ in 0..ticks {
            self.session.enqueue(Event::Tick);
        }
        let effects = self.session.drain();
        self.observe(&effects);
        to_value(&effects)
    }

    /// Lets the computer move; call after the `scheduleOpponent` delay.
    pub fn opponent_move(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(Event::OpponentTurn)
    }

    pub fn create_room_request(&self, name: &str) -> Result<JsValue, JsValue> {
        to_value(&sync::create_room_request(name))
    }

    /// Builds the `joinRoom` payload, rejecting a blank room id before
    /// anything is sent.
    pub fn join_room_request(&self, name: &str, room_id: &str) -> Result<JsValue, JsValue> {
        let request =
            sync::join_room_request(name, room_id, self.session.config().max_room_id_len)
                .map_err(to_js)?;
        to_value(&request)
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.view())
    }
}

impl CheckersGame {
    fn dispatch(&mut self, event: Event) -> Result<JsValue, JsValue> {
        let effects = self.session.handle(event).map_err(to_js)?;
        self.observe(&effects);
        to_value(&effects)
    }

    fn observe(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::TurnChanged { .. } => self.clock.reset(Instant::now()),
                Effect::WaitingForPeer { room_id } => {
                    console::log_1(&format!("waiting for opponent in room {room_id}").into());
                }
                Effect::GameEnded { outcome } => {
                    console::log_1(&format!("game over: {outcome}").into());
                }
                Effect::Desync { risk } => {
                    console::warn_1(&format!("desync: {risk}").into());
                }
                Effect::Rejected { error } => {
                    console::warn_1(&format!("event rejected: {error}").into());
                }
                _ => {}
            }
        }
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js)
}

fn to_js(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

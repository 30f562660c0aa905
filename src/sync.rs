//! Peer synchronisation through the relay.
//!
//! The relay forwards JSON payloads between the two sessions of a room and
//! never looks at the game. Every remote move is re-checked against the local
//! board before it is applied.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::Board;
use crate::error::{DesyncRisk, GameError};
use crate::rules;
use crate::turn::TurnController;
use crate::types::{Move, Player, Position};

pub const DEFAULT_CREATOR_NAME: &str = "Player 1";
pub const DEFAULT_JOINER_NAME: &str = "Player 2";

/// `createRoom`, client to relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// `joinRoom`, client to relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub name: String,
}

/// Display names keyed by player index, as the relay sends them. Missing
/// entries leave the local name unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNames {
    #[serde(rename = "1", default, skip_serializing_if = "Option::is_none")]
    pub red: Option<String>,
    #[serde(rename = "2", default, skip_serializing_if = "Option::is_none")]
    pub black: Option<String>,
}

/// `roomJoined`, relay to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoined {
    pub room_id: String,
    #[serde(default)]
    pub player_names: PlayerNames,
    pub player_index: u8,
}

/// A move as `[row, col]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    pub from: [u8; 2],
    pub to: [u8; 2],
}

impl From<Move> for WireMove {
    fn from(mv: Move) -> Self {
        Self {
            from: [mv.from.row, mv.from.col],
            to: [mv.to.row, mv.to.col],
        }
    }
}

impl TryFrom<WireMove> for Move {
    type Error = GameError;

    fn try_from(wire: WireMove) -> Result<Self, Self::Error> {
        Ok(Move::new(
            Position::new(wire.from[0], wire.from[1])?,
            Position::new(wire.to[0], wire.to[1])?,
        ))
    }
}

/// `move`, client to relay to opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMessage {
    pub room_id: String,
    #[serde(rename = "move")]
    pub mv: WireMove,
    /// Sender's board fingerprint after the move. Optional so that plain
    /// `{roomId, move}` payloads are still accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_crc: Option<u32>,
}

/// Room and seat assigned by the relay. Lives until the page is reloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub room_id: String,
    pub player: Player,
}

/// Trims `raw` and rejects empty, over-long or control-character ids.
pub fn validate_room_id(raw: &str, max_len: usize) -> Result<String, GameError> {
    let id = raw.trim();
    if id.is_empty() || id.chars().count() > max_len || id.chars().any(char::is_control) {
        return Err(GameError::InvalidRoomId(raw.to_string()));
    }
    Ok(id.to_string())
}

pub fn create_room_request(name: &str) -> CreateRoomRequest {
    CreateRoomRequest {
        name: name_or(name, DEFAULT_CREATOR_NAME),
    }
}

pub fn join_room_request(
    name: &str,
    room_id: &str,
    max_len: usize,
) -> Result<JoinRoomRequest, GameError> {
    Ok(JoinRoomRequest {
        room_id: validate_room_id(room_id, max_len)?,
        name: name_or(name, DEFAULT_JOINER_NAME),
    })
}

fn name_or(name: &str, fallback: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

/// Builds the message for a move already applied to `board_after`.
pub fn outbound(identity: &SessionIdentity, mv: Move, board_after: &Board) -> MoveMessage {
    MoveMessage {
        room_id: identity.room_id.clone(),
        mv: mv.into(),
        board_crc: Some(board_after.fingerprint()),
    }
}

/// Checks a received move against the local board and turn before it is
/// applied. The mover is always the current player, who must not be the
/// local seat.
pub fn verify_remote(
    board: &Board,
    turn: &TurnController,
    identity: &SessionIdentity,
    msg: &MoveMessage,
) -> Result<Move, GameError> {
    let mv = Move::try_from(msg.mv)?;
    let risk = if msg.room_id != identity.room_id {
        Some(DesyncRisk::WrongRoom {
            joined: identity.room_id.clone(),
            received: msg.room_id.clone(),
        })
    } else if turn.local_may_act() {
        Some(DesyncRisk::OutOfTurn)
    } else if board.get(mv.from).owner().is_none() {
        Some(DesyncRisk::EmptyOrigin(mv.from))
    } else if !rules::is_legal(board, mv, turn.current()) {
        Some(DesyncRisk::IllegalMove {
            from: mv.from,
            to: mv.to,
        })
    } else {
        None
    };

    match risk {
        Some(risk) => {
            warn!(room = %identity.room_id, %mv, %risk, "rejecting remote move");
            Err(risk.into())
        }
        None => Ok(mv),
    }
}

/// Compares the peer's fingerprint, when present, with the local board after
/// the move has been applied.
pub fn check_fingerprint(board_after: &Board, msg: &MoveMessage) -> Result<(), DesyncRisk> {
    let actual = board_after.fingerprint();
    match msg.board_crc {
        Some(expected) if expected != actual => {
            Err(DesyncRisk::ChecksumMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(player: Player) -> SessionIdentity {
        SessionIdentity {
            room_id: "abc123".to_string(),
            player,
        }
    }

    fn message(from: [u8; 2], to: [u8; 2]) -> MoveMessage {
        MoveMessage {
            room_id: "abc123".to_string(),
            mv: WireMove { from, to },
            board_crc: None,
        }
    }

    #[test]
    fn move_message_wire_format() {
        let json = r#"{"roomId":"abc123","move":{"from":[5,2],"to":[4,3]}}"#;
        let msg: MoveMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, message([5, 2], [4, 3]));
        assert_eq!(serde_json::to_string(&msg).unwrap(), json);
    }

    #[test]
    fn outbound_carries_fingerprint() {
        let mut board = Board::new();
        let mv = Move::new(Position { row: 5, col: 2 }, Position { row: 4, col: 3 });
        board.apply(mv).unwrap();

        let msg = outbound(&identity(Player::Red), mv, &board);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["move"]["from"], serde_json::json!([5, 2]));
        assert_eq!(value["boardCrc"], serde_json::json!(board.fingerprint()));
    }

    #[test]
    fn room_joined_payload_decodes() {
        let json = r#"{"roomId":"r1","playerNames":{"1":"Ann","2":"Bo"},"playerIndex":2}"#;
        let joined: RoomJoined = serde_json::from_str(json).unwrap();
        assert_eq!(joined.player_index, 2);
        assert_eq!(joined.player_names.red.as_deref(), Some("Ann"));
        assert_eq!(joined.player_names.black.as_deref(), Some("Bo"));
    }

    #[test]
    fn room_id_validation() {
        assert_eq!(validate_room_id("  xyz \n", 64).unwrap(), "xyz");
        assert!(matches!(
            validate_room_id("   ", 64),
            Err(GameError::InvalidRoomId(_))
        ));
        assert!(validate_room_id("abcdef", 5).is_err());
        assert!(validate_room_id("ab\u{7}c", 64).is_err());
    }

    #[test]
    fn request_builders_fill_default_names() {
        assert_eq!(create_room_request("").name, "Player 1");
        let join = join_room_request(" ", " r9 ", 64).unwrap();
        assert_eq!(join.name, "Player 2");
        assert_eq!(join.room_id, "r9");
        assert_eq!(
            serde_json::to_string(&join).unwrap(),
            r#"{"roomId":"r9","name":"Player 2"}"#
        );
        assert!(join_room_request("Ann", "", 64).is_err());
    }

    #[test]
    fn verify_accepts_peer_move_on_peer_turn() {
        let board = Board::new();
        // local is black, red (the peer) is to move
        let turn = TurnController::new(30, Some(Player::Black));
        let mv = verify_remote(&board, &turn, &identity(Player::Black), &message([5, 2], [4, 3]))
            .unwrap();
        assert_eq!(mv.to, Position { row: 4, col: 3 });
    }

    #[test]
    fn verify_rejects_empty_origin() {
        let board = Board::new();
        let turn = TurnController::new(30, Some(Player::Black));
        let err = verify_remote(&board, &turn, &identity(Player::Black), &message([4, 1], [3, 2]))
            .unwrap_err();
        assert_eq!(
            err,
            GameError::Desync(DesyncRisk::EmptyOrigin(Position { row: 4, col: 1 }))
        );
    }

    #[test]
    fn verify_rejects_move_on_local_turn() {
        let board = Board::new();
        let turn = TurnController::new(30, Some(Player::Red));
        let err = verify_remote(&board, &turn, &identity(Player::Red), &message([2, 1], [3, 0]))
            .unwrap_err();
        assert_eq!(err, GameError::Desync(DesyncRisk::OutOfTurn));
    }

    #[test]
    fn verify_rejects_illegal_and_foreign_room_moves() {
        let board = Board::new();
        let turn = TurnController::new(30, Some(Player::Black));
        let me = identity(Player::Black);

        // moving a black piece while red is to move
        let err = verify_remote(&board, &turn, &me, &message([2, 1], [3, 0])).unwrap_err();
        assert!(matches!(err, GameError::Desync(DesyncRisk::IllegalMove { .. })));

        let mut other_room = message([5, 2], [4, 3]);
        other_room.room_id = "zzz".to_string();
        let err = verify_remote(&board, &turn, &me, &other_room).unwrap_err();
        assert!(matches!(err, GameError::Desync(DesyncRisk::WrongRoom { .. })));

        let err = verify_remote(&board, &turn, &me, &message([9, 2], [4, 3])).unwrap_err();
        assert_eq!(err, GameError::OutOfRange { row: 9, col: 2 });
    }

    #[test]
    fn fingerprint_check() {
        let board = Board::new();
        let mut msg = message([5, 2], [4, 3]);
        assert!(check_fingerprint(&board, &msg).is_ok());

        msg.board_crc = Some(board.fingerprint());
        assert!(check_fingerprint(&board, &msg).is_ok());

        msg.board_crc = Some(board.fingerprint() ^ 1);
        assert!(matches!(
            check_fingerprint(&board, &msg),
            Err(DesyncRisk::ChecksumMismatch { .. })
        ));
    }
}

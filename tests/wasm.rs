#![cfg(target_arch = "wasm32")]

use checkers::CheckersGame;
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

/// Plain JS object (not a `Map`), as the page would pass it.
fn js(value: Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

fn to_json(value: JsValue) -> Value {
    serde_wasm_bindgen::from_value(value).unwrap()
}

fn seeded() -> CheckersGame {
    let config = js(json!({"opponentSeed": 11}));
    CheckersGame::new(config).unwrap()
}

#[wasm_bindgen_test]
fn ready_flag() {
    assert!(checkers::wasm_ready());
}

#[wasm_bindgen_test]
fn constructor_accepts_undefined_and_rejects_bad_config() {
    assert!(CheckersGame::new(JsValue::UNDEFINED).is_ok());

    let bad = js(json!({"turnSeconds": 0}));
    let err = CheckersGame::new(bad).err().unwrap();
    assert_eq!(
        err.as_string().as_deref(),
        Some("config validation error: turnSeconds must be > 0")
    );
}

#[wasm_bindgen_test]
fn offline_click_flow() {
    let mut game = seeded();
    game.start_offline().unwrap();

    let selected = to_json(game.click(5, 2).unwrap());
    assert_eq!(selected[0]["type"], "selected");
    assert_eq!(selected[0]["destinations"].as_array().unwrap().len(), 2);

    let moved = to_json(game.click(4, 3).unwrap());
    assert_eq!(moved[0]["type"], "moved");

    let state = to_json(game.state().unwrap());
    assert_eq!(state["current_player"], 2);
    assert_eq!(state["turn_text"], "Black's Turn");
}

#[wasm_bindgen_test]
fn computer_replies_after_schedule() {
    let mut game = seeded();
    game.start_vs_ai().unwrap();

    let effects = to_json(game.play(5, 2, 4, 3).unwrap());
    let last = effects.as_array().unwrap().last().unwrap().clone();
    assert_eq!(last, json!({"type": "scheduleOpponent", "delayMs": 800}));

    let effects = to_json(game.opponent_move().unwrap());
    assert_eq!(effects[0]["type"], "moved");
    assert_eq!(to_json(game.state().unwrap())["current_player"], 1);
}

#[wasm_bindgen_test]
fn online_messages_round_trip_between_two_games() {
    let mut red = seeded();
    let mut black = seeded();
    let joined = |index: u8| {
        js(json!({
            "roomId": "r1",
            "playerNames": {"1": "Ann", "2": "Bo"},
            "playerIndex": index,
        }))
    };
    red.room_joined(joined(1)).unwrap();
    black.room_joined(joined(2)).unwrap();

    let effects = to_json(red.play(5, 2, 4, 3).unwrap());
    let message = effects[1]["message"].clone();
    assert_eq!(message["roomId"], "r1");

    let payload = js(message.clone());
    let applied = to_json(black.receive_move(payload).unwrap());
    assert_eq!(applied[0]["type"], "moved");
    assert_eq!(
        to_json(red.state().unwrap())["board"],
        to_json(black.state().unwrap())["board"]
    );

    // a replay arrives on black's own turn
    let payload = js(message.clone());
    assert!(black.receive_move(payload).is_err());
}

#[wasm_bindgen_test]
fn join_request_rejects_blank_room() {
    let game = seeded();
    assert!(game.join_room_request("Ann", "   ").is_err());

    let request = to_json(game.join_room_request("", " abc ").unwrap());
    assert_eq!(request, json!({"roomId": "abc", "name": "Player 2"}));
}

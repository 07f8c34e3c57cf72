//! End-to-end flows through the full handler chain.

use serde_json::json;
use std::time::Duration;

use crate::models::{types, Event, Message, Socket};
use crate::server::Dispatcher;
use crate::testing::{Inbox, RecordingConnection};
use crate::{build_dispatcher, ConfigError, ServerConfig};

/// Full pipeline whose games always have 40 as the answer.
fn pipeline(timeout_ms: u64) -> Dispatcher {
    build_dispatcher(&ServerConfig {
        match_timeout_ms: timeout_ms,
        answer_min: 40,
        answer_max: 40,
        ..ServerConfig::default()
    })
    .unwrap()
}

/// Feeds a raw client frame through the same decoding the WebSocket actor uses.
fn send_frame(dispatcher: &Dispatcher, socket: &Socket, frame: serde_json::Value) {
    let message: Message = serde_json::from_value(frame).unwrap();
    dispatcher.dispatch(Event::from_message(message, socket.clone()));
}

fn queue_up(dispatcher: &Dispatcher, socket: &Socket) {
    send_frame(dispatcher, socket, json!({"type": "queue_up"}));
}

fn confirm(dispatcher: &Dispatcher, socket: &Socket, match_id: u64) {
    send_frame(
        dispatcher,
        socket,
        json!({"type": "match_confirmed", "payload": {"matchId": match_id}}),
    );
}

fn game_id(inbox: &Inbox) -> u64 {
    inbox.last_of(types::GUESS).unwrap().payload["gameId"]
        .as_u64()
        .unwrap()
}

async fn settle() {
    actix_rt::time::sleep(Duration::from_millis(20)).await;
}

#[actix_rt::test]
async fn two_players_queue_confirm_and_play_to_victory() {
    let dispatcher = pipeline(5_000);
    let (a, a_inbox) = RecordingConnection::socket();
    let (b, b_inbox) = RecordingConnection::socket();

    queue_up(&dispatcher, &a);
    queue_up(&dispatcher, &b);
    assert_eq!(a_inbox.messages(), vec![Message::wait_for_match(), Message::match_found(1)]);
    assert_eq!(b_inbox.messages(), vec![Message::wait_for_match(), Message::match_found(1)]);

    confirm(&dispatcher, &a, 1);
    confirm(&dispatcher, &b, 1);
    settle().await;

    assert_eq!(
        a_inbox.types(),
        vec!["wait_for_match", "match_found", "wait_for_players", "guess"]
    );
    assert_eq!(
        b_inbox.types(),
        vec!["wait_for_match", "match_found", "wait_for_players", "guess"]
    );
    let game = game_id(&a_inbox);
    assert_eq!(game, game_id(&b_inbox));

    send_frame(
        &dispatcher,
        &a,
        json!({"type": "guess", "payload": {"gameId": game, "guess": "4\n"}}),
    );
    assert_eq!(a_inbox.last().unwrap(), Message::feedback("Try a greater number"));

    send_frame(
        &dispatcher,
        &b,
        json!({"Type": "guess", "Payload": {"gameId": game, "guess": 69}}),
    );
    assert_eq!(b_inbox.last().unwrap(), Message::feedback("Try a smaller number"));

    send_frame(
        &dispatcher,
        &a,
        json!({"type": "guess", "payload": {"gameId": game, "guess": "40"}}),
    );
    assert_eq!(a_inbox.last().unwrap().message_type, "victory");
    assert_eq!(b_inbox.last().unwrap().message_type, "loss");

    // The game is over; another guess on it is ignored.
    send_frame(
        &dispatcher,
        &b,
        json!({"type": "guess", "payload": {"gameId": game, "guess": "40"}}),
    );
    assert_eq!(b_inbox.count_of("victory"), 0);
}

#[actix_rt::test]
async fn decline_returns_the_confirmer_to_the_queue() {
    let dispatcher = pipeline(5_000);
    let (a, a_inbox) = RecordingConnection::socket();
    let (b, b_inbox) = RecordingConnection::socket();

    queue_up(&dispatcher, &a);
    queue_up(&dispatcher, &b);
    confirm(&dispatcher, &a, 1);
    send_frame(
        &dispatcher,
        &b,
        json!({"type": "match_declined", "payload": {"matchId": 1}}),
    );

    assert_eq!(
        a_inbox.types(),
        vec!["wait_for_match", "match_found", "wait_for_players", "match_canceled", "wait_for_match"]
    );
    assert_eq!(b_inbox.types(), vec!["wait_for_match", "match_found", "match_canceled"]);

    // The requeued player is paired with the next arrival.
    let (c, c_inbox) = RecordingConnection::socket();
    queue_up(&dispatcher, &c);
    assert_eq!(a_inbox.last().unwrap(), Message::match_found(2));
    assert_eq!(c_inbox.last().unwrap(), Message::match_found(2));

    settle().await;
    assert_eq!(a_inbox.count_of(types::GUESS), 0);
}

#[actix_rt::test]
async fn unconfirmed_match_times_out_for_both_players() {
    let dispatcher = pipeline(30);
    let (a, a_inbox) = RecordingConnection::socket();
    let (b, b_inbox) = RecordingConnection::socket();

    queue_up(&dispatcher, &a);
    queue_up(&dispatcher, &b);
    actix_rt::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(a_inbox.last().unwrap(), Message::match_canceled(1));
    assert_eq!(b_inbox.last().unwrap(), Message::match_canceled(1));
    assert_eq!(a_inbox.count_of(types::WAIT_FOR_MATCH), 1);
    assert_eq!(b_inbox.count_of(types::WAIT_FOR_MATCH), 1);

    // Nobody is left waiting: a newcomer is not paired with anyone.
    let (c, c_inbox) = RecordingConnection::socket();
    queue_up(&dispatcher, &c);
    assert_eq!(c_inbox.types(), vec!["wait_for_match"]);
}

#[actix_rt::test]
async fn disconnect_mid_game_hands_the_win_to_the_opponent() {
    let dispatcher = pipeline(5_000);
    let (a, a_inbox) = RecordingConnection::socket();
    let (b, b_inbox) = RecordingConnection::socket();

    queue_up(&dispatcher, &a);
    queue_up(&dispatcher, &b);
    confirm(&dispatcher, &a, 1);
    confirm(&dispatcher, &b, 1);
    settle().await;
    let game = game_id(&a_inbox);

    b.close();
    dispatcher.disconnect(&b);

    assert_eq!(a_inbox.last().unwrap().message_type, "victory");
    assert_eq!(b_inbox.count_of("victory"), 0);

    send_frame(
        &dispatcher,
        &a,
        json!({"type": "guess", "payload": {"gameId": game, "guess": 40}}),
    );
    assert_eq!(a_inbox.count_of("victory"), 1);
}

#[actix_rt::test]
async fn waiting_player_who_drops_is_not_matched() {
    let dispatcher = pipeline(5_000);
    let (a, _) = RecordingConnection::socket();
    let (b, b_inbox) = RecordingConnection::socket();

    queue_up(&dispatcher, &a);
    dispatcher.disconnect(&a);
    queue_up(&dispatcher, &b);

    assert_eq!(b_inbox.types(), vec!["wait_for_match"]);
}

#[actix_rt::test]
async fn dequeue_then_queue_again_keeps_arrival_order() {
    let dispatcher = pipeline(5_000);
    let (a, a_inbox) = RecordingConnection::socket();
    let (b, b_inbox) = RecordingConnection::socket();
    let (c, c_inbox) = RecordingConnection::socket();

    queue_up(&dispatcher, &a);
    send_frame(&dispatcher, &a, json!({"type": "dequeue"}));
    queue_up(&dispatcher, &b);
    queue_up(&dispatcher, &c);

    assert_eq!(a_inbox.types(), vec!["wait_for_match"]);
    assert_eq!(b_inbox.last().unwrap(), Message::match_found(1));
    assert_eq!(c_inbox.last().unwrap(), Message::match_found(1));
}

#[test]
fn invalid_config_builds_no_pipeline() {
    let config = ServerConfig {
        answer_min: 10,
        answer_max: 3,
        ..ServerConfig::default()
    };
    assert!(matches!(
        build_dispatcher(&config),
        Err(ConfigError::EmptyAnswerRange { min: 10, max: 3 })
    ));
}

mod common;

use common::*;
use pretty_assertions::assert_eq;
use ular_client::board::{CellDecoration, CellIndex, CellOffset};
use ular_client::client::{Action, Panel, ResponseOutcome, Tab, UiEvent};
use ular_client::error::{ActionError, CommandError, UNCLASSIFIED_FAILURE_MESSAGE};
use ular_client::marker::MarkerEvent;
use ular_client::protocol::{ApiRequest, DEFAULT_API_PREFIX};
use ular_client::session::RoomRole;
use ular_client::view::{NodeContent, ViewNode};


#[test]
fn create_room_enters_room_and_starts_polling() {
    let mut client = TestClient::new();
    let id = client.state.create_room("P1", "", "");
    let sent = client.sent_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, Action::CreateRoom);
    assert_eq!(
        sent[0].request.path_and_query(DEFAULT_API_PREFIX),
        "/api/ular/createroom?player=P1&color=black&maxbox=28&topic=biologi"
    );
    assert_eq!(statuses(&client.events()), vec!["Creating room...".to_owned()]);

    let outcome = client.state.process_response(
        id,
        r#"{"status":"ok","code":"ABCD","player":"P1","color":"black","state":"waiting","pos":0,"message":"Game ABCD created!"}"#,
    );
    assert_eq!(outcome, Ok(ResponseOutcome::Applied));
    let events = client.events();

    assert_eq!(client.state.session().code(), Some("ABCD"));
    assert_eq!(client.state.session().player(), Some("P1"));
    assert!(events.contains(&UiEvent::SessionFields {
        code: "ABCD".to_owned(),
        player: "P1".to_owned(),
    }));
    assert_eq!(final_visibility(&events, Panel::Board), Some(true));
    assert_eq!(final_visibility(&events, Panel::RefreshGame), Some(true));
    assert_eq!(final_visibility(&events, Panel::CreateJoin), Some(false));
    assert_eq!(final_visibility(&events, Panel::Question), Some(false));
    assert!(events.contains(&UiEvent::PollingStarted));
    assert!(client.state.is_polling());
    assert_eq!(statuses(&events), vec!["Game ABCD created!".to_owned()]);

    // The room is refreshed right away, without waiting for the first tick.
    let sent = client.sent_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, Action::AutoRefresh);
    assert_eq!(sent[0].request, ApiRequest::State { code: "ABCD".to_owned() });
}

#[test]
fn join_falls_back_to_submitted_values() {
    let mut client = TestClient::new();
    let id = client.state.join_room(" WXYZ ", "P2", "blue");
    let reply = r#"{"status":"ok","message":"Rejoin"}"#;
    assert_eq!(client.state.process_response(id, reply), Ok(ResponseOutcome::Applied));
    let room = client.state.session().room().unwrap();
    assert_eq!(room.code, "WXYZ");
    assert_eq!(room.player, "P2");
    assert_eq!(room.role, RoomRole::Player);
}

#[test]
fn spectate_enters_room_as_spectator() {
    let mut client = TestClient::new();
    let id = client.state.spectate("ABCD", "Viewer");
    assert_eq!(
        client.state.process_response(
            id,
            r#"{"status":"ok","code":"ABCD","players":[],"message":"Spectating","state":"playing"}"#
        ),
        Ok(ResponseOutcome::Applied)
    );
    assert!(client.state.session().is_spectator());
    assert!(client.state.is_polling());
}

#[test]
fn application_error_is_shown_verbatim() {
    let mut client = TestClient::new();
    let id = client.state.join_room("ABCD", "P3", "green");
    client.events();
    let result = client.state.process_response(id, r#"{"status":"error","message":"Room full"}"#);
    assert_eq!(result, Err(ActionError::Application("Room full".to_owned())));
    let events = client.events();
    assert_eq!(statuses(&events), vec!["Room full".to_owned()]);
    assert!(panel_changes(&events).is_empty());
    assert!(!client.state.is_polling());
    assert_eq!(client.state.session().code(), None);
}

#[test]
fn unknown_status_is_unclassified() {
    let mut client = TestClient::new();
    let id = client.state.create_room("P1", "red", "");
    client.events();
    let result = client.state.process_response(id, r#"{"status":"maintenance","message":"brb"}"#);
    assert_eq!(result, Err(ActionError::Unclassified));
    assert_eq!(statuses(&client.events()), vec![UNCLASSIFIED_FAILURE_MESSAGE.to_owned()]);
}

#[test]
fn transport_failures() {
    let mut client = TestClient::new();
    let id = client.state.create_room("P1", "red", "");
    client.events();
    let err = client.state.process_failure(id, "TypeError: Failed to fetch");
    assert_eq!(err.to_string(), "Error: TypeError: Failed to fetch");
    assert_eq!(statuses(&client.events()), vec!["Error: TypeError: Failed to fetch".to_owned()]);

    let id = client.state.create_room("P1", "red", "");
    client.events();
    let result = client.state.process_response(id, "<html>502 Bad Gateway</html>");
    assert!(matches!(result, Err(ActionError::Transport(_))));
    assert!(statuses(&client.events())[0].starts_with("Error: "));
}

#[test]
fn commands_need_a_room() {
    let mut client = TestClient::new();
    assert_eq!(client.state.refresh(), Err(CommandError::NoRoom));
    assert_eq!(client.state.start_game(), Err(CommandError::NoRoom));
    assert_eq!(client.state.roll_dice(), Err(CommandError::NoRoom));
    assert_eq!(client.state.submit_answer("Skin"), Err(CommandError::NoRoom));
    assert!(client.sent_requests().is_empty());
}

#[test]
fn state_with_question_switches_to_question_mode() {
    let mut client = TestClient::in_room();
    let id = client.state.refresh().unwrap();
    assert_eq!(client.state.process_response(id, STATE_WITH_QUESTION), Ok(ResponseOutcome::Applied));
    let events = client.events();

    assert_eq!(final_visibility(&events, Panel::Question), Some(true));
    assert_eq!(final_visibility(&events, Panel::BoardInfo), Some(false));
    assert_eq!(final_visibility(&events, Panel::Board), Some(true));
    let question = events
        .iter()
        .find_map(|e| match e {
            UiEvent::Question(q) => Some(q.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(question.answerer, "Answerer: P1");
    assert_eq!(question.question, "Largest organ?");
    assert_eq!(question.answers, ["Skin", "Liver", "Heart", "Lung"].map(str::to_owned));

    assert!(events.contains(&UiEvent::Node(ViewNode::Color, NodeContent::Empty)));
    assert!(events.contains(&UiEvent::Node(ViewNode::Pos, NodeContent::Empty)));
    assert!(events.contains(&UiEvent::Node(ViewNode::Code, NodeContent::Text("code: ABCD".to_owned()))));
    // No "player" in a state reply: the node is cleared.
    assert!(events.contains(&UiEvent::Node(ViewNode::Player, NodeContent::Empty)));

    assert_eq!(client.state.player_cell("P1"), Some(CellIndex(9)));
    assert_eq!(client.state.player_cell("P2"), Some(CellIndex(4)));
    assert_eq!(client.state.markers().color("P2"), "blue");
    assert!(events.contains(&UiEvent::Marker(MarkerEvent::Moved {
        player: "P1".to_owned(),
        cell: CellIndex(9),
        placement: CellOffset::new(155, 65),
    })));
}

#[test]
fn waiting_state_offers_start_button() {
    let mut client = TestClient::in_room();
    let id = client.state.refresh().unwrap();
    assert_eq!(client.state.process_response(id, STATE_WAITING), Ok(ResponseOutcome::Applied));
    let events = client.events();
    let state_html = events
        .iter()
        .find_map(|e| match e {
            UiEvent::Node(ViewNode::State, NodeContent::Html(html)) => Some(html.clone()),
            _ => None,
        })
        .unwrap();
    assert!(state_html.contains("<button"));
    assert_eq!(final_visibility(&events, Panel::Question), Some(false));
    assert_eq!(final_visibility(&events, Panel::BoardInfo), Some(true));
}

#[test]
fn roll_dice_moves_known_markers_only() {
    let mut client = TestClient::in_room();
    let id = client.state.refresh().unwrap();
    assert_eq!(client.state.process_response(id, STATE_WAITING), Ok(ResponseOutcome::Applied));
    client.events();

    let id = client.state.roll_dice().unwrap();
    assert_eq!(client.sent_requests().last().unwrap().request, ApiRequest::RollDice {
        code: "ABCD".to_owned(),
        player: "P1".to_owned(),
    });
    let reply = r#"{
        "status": "ok", "code": "ABCD", "player": "P1", "beforepos": "0", "pos": 5,
        "message": "Roll dice: 5, Turn now: P2", "turn": "P2", "question": [], "questionid": "",
        "state": "playing", "steps": [1, 2, 3, 4, 5], "dice": 5, "ended": false,
        "players": [
            {"player": "P1", "pos": "5", "color": "red"},
            {"player": "Ghost", "pos": "3", "color": "white"}
        ]
    }"#;
    assert_eq!(client.state.process_response(id, reply), Ok(ResponseOutcome::Applied));
    let events = client.events();
    assert!(events.contains(&UiEvent::DiceRolled(5)));
    assert!(events.contains(&UiEvent::Node(ViewNode::Dice, NodeContent::Text("Dice: 5".to_owned()))));
    assert!(events.contains(&UiEvent::RollDetails {
        before: Some(0),
        steps: vec![1, 2, 3, 4, 5],
        ended: false,
    }));
    assert_eq!(client.state.player_cell("P1"), Some(CellIndex(5)));
    // Roll replies don't introduce new markers.
    assert!(!client.state.markers().contains("Ghost"));
}

#[test]
fn submit_answer_alerts_and_returns_to_board() {
    let mut client = TestClient::in_room();
    let id = client.state.refresh().unwrap();
    assert_eq!(client.state.process_response(id, STATE_WITH_QUESTION), Ok(ResponseOutcome::Applied));
    client.events();

    let id = client.state.submit_answer("Skin").unwrap();
    let reply = r#"{
        "status": "ok", "message": "Congrats! Your answer is right! You got ladder!",
        "answer": true, "pos": 16, "ladderorsnake": "ladder", "state": "playing", "ended": false,
        "players": [{"player": "P1", "pos": "16", "color": "red"}, {"player": "P2", "pos": "4", "color": "blue"}]
    }"#;
    assert_eq!(client.state.process_response(id, reply), Ok(ResponseOutcome::Applied));
    let events = client.events();
    assert!(events.contains(&UiEvent::Alert(
        "Congrats! Your answer is right! You got ladder!".to_owned()
    )));
    assert_eq!(final_visibility(&events, Panel::Question), Some(false));
    assert_eq!(final_visibility(&events, Panel::BoardInfo), Some(true));
    assert_eq!(client.state.player_cell("P1"), Some(CellIndex(16)));
    assert!(client.state.room_view().question.is_none());
}

#[test]
fn start_game_clears_player_and_writes_state() {
    let mut client = TestClient::in_room();
    let id = client.state.start_game().unwrap();
    assert_eq!(statuses(&client.events()), vec!["Starting game...".to_owned()]);
    let reply = r#"{"status":"ok","code":"ABCD","players":[{"player":"P1","pos":"0","color":"red"}],"message":"Room ABCD started!","state":"playing"}"#;
    assert_eq!(client.state.process_response(id, reply), Ok(ResponseOutcome::Applied));
    let events = client.events();
    assert!(events.contains(&UiEvent::Node(ViewNode::Player, NodeContent::Empty)));
    assert!(events.contains(&UiEvent::Node(
        ViewNode::State,
        NodeContent::Html("state: playing".to_owned())
    )));
    assert_eq!(client.state.room_view().state.as_deref(), Some("playing"));
}

#[test]
fn stale_poll_reply_is_dropped() {
    let mut client = TestClient::in_room();
    let older = client.state.poll_tick().unwrap();
    let newer = client.state.refresh().unwrap();
    assert!(older < newer);

    let at = |pos: u32| {
        format!(
            r#"{{"status":"ok","code":"ABCD","message":"P1's turn","state":"playing","question":[],
                "players":[{{"player":"P1","pos":"{}","color":"red"}}]}}"#,
            pos
        )
    };
    assert_eq!(client.state.process_response(newer, &at(12)), Ok(ResponseOutcome::Applied));
    assert_eq!(client.state.process_response(older, &at(7)), Ok(ResponseOutcome::Stale));
    assert_eq!(client.state.player_cell("P1"), Some(CellIndex(12)));
}

#[test]
fn stale_user_action_still_reports_its_message() {
    let mut client = TestClient::in_room();
    let roll = client.state.roll_dice().unwrap();
    let poll = client.state.poll_tick().unwrap();
    let state = r#"{"status":"ok","code":"ABCD","message":"P2's turn","state":"playing","question":[],
        "players":[{"player":"P1","pos":"6","color":"red"}]}"#;
    assert_eq!(client.state.process_response(poll, state), Ok(ResponseOutcome::Applied));
    client.events();
    let roll_reply = r#"{"status":"ok","message":"Roll dice: 2, Turn now: P2","dice":2,"state":"playing",
        "question":[],"players":[{"player":"P1","pos":"4","color":"red"}]}"#;
    assert_eq!(client.state.process_response(roll, roll_reply), Ok(ResponseOutcome::Stale));
    let events = client.events();
    assert_eq!(statuses(&events), vec!["Roll dice: 2, Turn now: P2".to_owned()]);
    // Markers keep the fresher state, but the roll itself is not lost.
    assert_eq!(client.state.player_cell("P1"), Some(CellIndex(6)));
    assert!(events.contains(&UiEvent::Node(ViewNode::Dice, NodeContent::Text("Dice: 2".to_owned()))));
    assert!(events.contains(&UiEvent::DiceRolled(2)));
    assert!(events.contains(&UiEvent::RollDetails { before: None, steps: vec![], ended: false }));
    assert_eq!(client.state.room_view().dice, Some(2));
    assert!(!events.iter().any(|e| matches!(e, UiEvent::Node(ViewNode::Players, _))));
}

#[test]
fn poll_tick_waits_for_pending_refresh() {
    let mut client = TestClient::in_room();
    let first = client.state.poll_tick().unwrap();
    for _ in 0..50 {
        assert_eq!(client.state.poll_tick(), None);
    }
    assert_eq!(client.sent_requests().len(), 1);
    assert_eq!(client.state.num_pending_requests(), 1);
    // User actions are not held back by a pending refresh.
    assert!(client.state.roll_dice().is_ok());

    assert_eq!(client.state.process_response(first, STATE_WAITING), Ok(ResponseOutcome::Applied));
    assert!(client.state.poll_tick().is_some());

    assert_eq!(client.state.poll_tick(), None);
    let pending = client.sent_requests().last().unwrap().id;
    client.state.process_failure(pending, "TypeError: Failed to fetch");
    assert!(client.state.poll_tick().is_some());
}

#[test]
fn setup_doesnt_make_state_replies_stale() {
    let mut client = TestClient::in_room();
    let refresh = client.state.refresh().unwrap();
    let setup = client.state.load_setup();
    let setup_reply = r#"{"conf":[],"cells":[]}"#;
    assert_eq!(client.state.process_response(setup, setup_reply), Ok(ResponseOutcome::Applied));
    assert_eq!(
        client.state.process_response(refresh, STATE_WAITING),
        Ok(ResponseOutcome::Applied)
    );
    assert_eq!(client.state.player_cell("P1"), Some(CellIndex(0)));
}

#[test]
fn odd_fields_dont_blank_the_reply() {
    let mut client = TestClient::in_room();
    let id = client.state.poll_tick().unwrap();
    let reply = r#"{
        "status": "ok", "code": "ABCD", "message": "P1's turn, Please answer question",
        "turn": "P1", "state": "playing", "questionid": 7,
        "players": [
            {"player": "P1", "pos": "9", "color": "red"},
            {"player": "P2", "pos": "?", "color": null}
        ],
        "question": [
            {"question": "Largest organ?", "a1": "Skin", "a2": "Liver", "a3": "Heart", "a4": null}
        ]
    }"#;
    assert_eq!(client.state.process_response(id, reply), Ok(ResponseOutcome::Applied));
    let events = client.events();
    assert_eq!(statuses(&events), vec!["P1's turn, Please answer question".to_owned()]);
    assert_eq!(final_visibility(&events, Panel::Question), Some(true));
    let question = client.state.room_view().question.clone().unwrap();
    assert_eq!(question.answers, ["Skin", "Liver", "Heart", ""].map(str::to_owned));
    assert_eq!(client.state.player_cell("P1"), Some(CellIndex(9)));
    // P2 gets a marker at the start slot; only its move is skipped.
    assert_eq!(client.state.player_cell("P2"), Some(CellIndex(0)));
    assert_eq!(client.state.markers().color("P2"), "gray");
    assert_eq!(client.state.room_view().players.len(), 2);
    assert!(events.iter().any(|e| matches!(e, UiEvent::Node(ViewNode::Players, _))));
}

#[test]
fn stopping_auto_refresh_stops_ticks() {
    let mut client = TestClient::in_room();
    assert!(client.state.poll_tick().is_some());
    assert!(client.state.stop_auto_refresh());
    assert!(client.state.poll_tick().is_none());
    assert_eq!(client.events(), vec![UiEvent::PollingStopped]);
    assert!(client.state.start_auto_refresh());
    assert!(!client.state.start_auto_refresh());
    assert_eq!(client.events(), vec![UiEvent::PollingStarted]);
}

#[test]
fn leave_ignores_late_replies() {
    let mut client = TestClient::in_room();
    let id = client.state.refresh().unwrap();
    client.state.leave();
    assert_eq!(client.state.session().code(), None);
    assert!(!client.state.is_polling());
    assert_eq!(client.state.process_response(id, STATE_WAITING), Ok(ResponseOutcome::Ignored));
    let events = client.events();
    assert_eq!(final_visibility(&events, Panel::CreateJoin), Some(true));
    assert_eq!(final_visibility(&events, Panel::Board), Some(false));
}

#[test]
fn tabs() {
    let mut client = TestClient::new();
    client.state.open_tab(Tab::Join);
    let events = client.events();
    assert_eq!(final_visibility(&events, Panel::JoinRoom), Some(true));
    assert_eq!(final_visibility(&events, Panel::CreateRoom), Some(false));
    assert!(events.contains(&UiEvent::TabSelected(Tab::Join)));
}

#[test]
fn setup_replaces_board_geometry() {
    let mut client = TestClient::in_room();
    let id = client.state.refresh().unwrap();
    assert_eq!(client.state.process_response(id, STATE_WAITING), Ok(ResponseOutcome::Applied));
    client.events();

    let id = client.state.load_setup();
    let setup = r#"{
        "conf": [
            {"id": 1, "start": "4", "end": "14", "type": "ladder"},
            {"id": 2, "start": "20", "end": "2", "type": "snake"}
        ],
        "cells": [{"x": 0, "y": 200}, {"x": 10, "y": 20}],
        "gaps": 5
    }"#;
    assert_eq!(client.state.process_response(id, setup), Ok(ResponseOutcome::Applied));
    let events = client.events();
    assert!(events.contains(&UiEvent::BoardRebuilt));
    assert!(events.contains(&UiEvent::Marker(MarkerEvent::Moved {
        player: "P1".to_owned(),
        cell: CellIndex(0),
        placement: CellOffset::new(5, 205),
    })));
    let layout = client.state.layout();
    assert_eq!(layout.decoration(CellIndex(4)), CellDecoration::Ladder);
    assert_eq!(layout.decoration(CellIndex(20)), CellDecoration::Snake);
    assert_eq!(layout.decoration(CellIndex(15)), CellDecoration::Plain);
}

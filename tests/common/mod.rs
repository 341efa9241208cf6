// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use std::sync::mpsc;

use itertools::Itertools;
use ular_client::client::{ClientState, OutgoingRequest, Panel, ResponseOutcome, UiEvent};
use ular_client::config::ClientConfig;


pub struct TestClient {
    pub state: ClientState,
    pub requests_rx: mpsc::Receiver<OutgoingRequest>,
}

impl TestClient {
    #[allow(dead_code)]
    pub fn new() -> Self {
        let (requests_tx, requests_rx) = mpsc::channel();
        TestClient {
            state: ClientState::new(ClientConfig::default(), requests_tx),
            requests_rx,
        }
    }

    #[allow(dead_code)]
    pub fn sent_requests(&self) -> Vec<OutgoingRequest> { self.requests_rx.try_iter().collect() }

    #[allow(dead_code)]
    pub fn events(&mut self) -> Vec<UiEvent> { self.state.drain_ui_events() }

    // Creates a room "ABCD" as "P1", answers the follow-up refresh with an empty room and
    // consumes everything that produced.
    #[allow(dead_code)]
    pub fn in_room() -> Self {
        let mut client = TestClient::new();
        let id = client.state.create_room("P1", "red", "");
        let reply = r#"{"status":"ok","code":"ABCD","player":"P1","message":"Game ABCD created!"}"#;
        assert_eq!(client.state.process_response(id, reply), Ok(ResponseOutcome::Applied));
        let follow_up = client.sent_requests().pop().unwrap();
        assert_eq!(
            client.state.process_response(follow_up.id, STATE_EMPTY),
            Ok(ResponseOutcome::Applied)
        );
        client.events();
        client
    }
}

#[allow(dead_code)]
pub fn panel_changes(events: &[UiEvent]) -> Vec<(Panel, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Panel(panel, visible) => Some((*panel, *visible)),
            _ => None,
        })
        .collect_vec()
}

// Final visibility of `panel` after applying `events` in order, if they mention it at all.
#[allow(dead_code)]
pub fn final_visibility(events: &[UiEvent], panel: Panel) -> Option<bool> {
    panel_changes(events).into_iter().filter(|(p, _)| *p == panel).map(|(_, v)| v).last()
}

#[allow(dead_code)]
pub fn statuses(events: &[UiEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Status(s) => Some(s.clone()),
            _ => None,
        })
        .collect_vec()
}

#[allow(dead_code)]
pub const STATE_WITH_QUESTION: &str = r#"{
    "status": "ok",
    "code": "ABCD",
    "message": "P1's turn, Please answer question",
    "turn": "P1",
    "state": "playing",
    "questionid": "7",
    "players": [
        {"player": "P1", "pos": "9", "color": "red"},
        {"player": "P2", "pos": 4, "color": "blue"}
    ],
    "question": [
        {"id": "7", "topic": "biologi", "question": "Largest organ?", "a1": "Skin", "a2": "Liver", "a3": "Heart", "a4": "Lung", "answer": "Skin"}
    ]
}"#;

#[allow(dead_code)]
pub const STATE_WAITING: &str = r#"{
    "status": "ok",
    "code": "ABCD",
    "message": "Waiting players...",
    "turn": "P1",
    "state": "waiting",
    "questionid": "",
    "players": [
        {"player": "P1", "pos": "0", "color": "red"}
    ],
    "question": []
}"#;

#[allow(dead_code)]
pub const STATE_EMPTY: &str = r#"{
    "status": "ok",
    "code": "ABCD",
    "message": "Waiting players...",
    "state": "waiting",
    "players": [],
    "question": []
}"#;

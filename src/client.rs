// Client-side state machine. Front-ends feed it user commands and HTTP results; it emits
// outgoing requests through a channel and UI changes through an event queue. It never talks to
// the network or the DOM directly.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::mpsc;

use instant::Instant;
use log::{debug, warn};
use strum::{EnumIter, IntoStaticStr};

use crate::board::{BoardLayout, CellIndex, CellTable};
use crate::config::ClientConfig;
use crate::error::{ActionError, CommandError};
use crate::marker::{MarkerBoard, MarkerEvent};
use crate::poll::PollSchedule;
use crate::protocol::{ApiRequest, ApiResponse, BoardSetup, PlayerEntry, ResponseStatus};
use crate::session::{RoomRole, RoomSession, Session};
use crate::view::{self, NodeContent, QuestionView, ViewNode};


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RequestId(u64);

impl RequestId {
    pub fn from_raw(id: u64) -> Self { RequestId(id) }
    pub fn to_raw(self) -> u64 { self.0 }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    CreateRoom,
    JoinRoom,
    Spectate,
    // Refresh requested by the user.
    Refresh,
    // Refresh issued by the timer or as a follow-up to entering a room. Doesn't touch the status
    // region until the reply arrives.
    AutoRefresh,
    StartGame,
    RollDice,
    SubmitAnswer,
    LoadSetup,
}

impl Action {
    pub fn progress_message(self) -> Option<&'static str> {
        match self {
            Action::CreateRoom => Some("Creating room..."),
            Action::JoinRoom => Some("Joining room..."),
            Action::Spectate => Some("Spectating..."),
            Action::Refresh => Some("Refreshing..."),
            Action::StartGame => Some("Starting game..."),
            Action::RollDice => Some("Rolling dice..."),
            Action::SubmitAnswer => Some("Submitting answer..."),
            Action::AutoRefresh | Action::LoadSetup => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OutgoingRequest {
    pub id: RequestId,
    pub action: Action,
    pub request: ApiRequest,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, EnumIter, IntoStaticStr)]
pub enum Panel {
    #[strum(serialize = "divcreatejoin")]
    CreateJoin,
    #[strum(serialize = "divcreateroom")]
    CreateRoom,
    #[strum(serialize = "divjoinroom")]
    JoinRoom,
    #[strum(serialize = "divrefreshgame")]
    RefreshGame,
    #[strum(serialize = "divboard")]
    Board,
    #[strum(serialize = "divquestion")]
    Question,
    #[strum(serialize = "boardinfo2")]
    BoardInfo,
}

impl Panel {
    pub fn element_id(self) -> &'static str { self.into() }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Create,
    Join,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum UiEvent {
    Status(String),
    // Message the user must acknowledge (answer feedback).
    Alert(String),
    Node(ViewNode, NodeContent),
    Panel(Panel, bool),
    TabSelected(Tab),
    SessionFields { code: String, player: String },
    Marker(MarkerEvent),
    Question(QuestionView),
    DiceRolled(u32),
    RollDetails { before: Option<u32>, steps: Vec<u32>, ended: bool },
    BoardRebuilt,
    PollingStarted,
    PollingStopped,
}

#[must_use]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResponseOutcome {
    Applied,
    // A reply to a newer request has already been applied; this one was dropped.
    Stale,
    // Not a request we're waiting for (e.g. it was issued before `leave`).
    Ignored,
}

// What the last applied replies said about the room. Used by front-ends that redraw everything
// from scratch instead of applying `UiEvent`s.
#[derive(Clone, Debug, Default)]
pub struct RoomView {
    pub status: String,
    pub players: Vec<PlayerEntry>,
    pub state: Option<String>,
    pub turn: Option<String>,
    pub dice: Option<u32>,
    pub question: Option<QuestionView>,
    pub last_alert: Option<String>,
}

struct PendingRequest {
    action: Action,
    request: ApiRequest,
}

pub struct ClientState {
    config: ClientConfig,
    requests_tx: mpsc::Sender<OutgoingRequest>,
    session: Session,
    layout: BoardLayout,
    markers: MarkerBoard,
    poll: PollSchedule,
    next_request_id: u64,
    pending: HashMap<RequestId, PendingRequest>,
    latest_applied: Option<RequestId>,
    room_view: RoomView,
    ui_events: VecDeque<UiEvent>,
}

impl ClientState {
    pub fn new(config: ClientConfig, requests_tx: mpsc::Sender<OutgoingRequest>) -> Self {
        let poll = PollSchedule::new(config.poll_interval);
        ClientState {
            config,
            requests_tx,
            session: Session::NoRoom,
            layout: BoardLayout::new(),
            markers: MarkerBoard::new(CellTable::default()),
            poll,
            next_request_id: 1,
            pending: HashMap::new(),
            latest_applied: None,
            room_view: RoomView::default(),
            ui_events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig { &self.config }
    pub fn session(&self) -> &Session { &self.session }
    pub fn layout(&self) -> &BoardLayout { &self.layout }
    pub fn markers(&self) -> &MarkerBoard { &self.markers }
    pub fn room_view(&self) -> &RoomView { &self.room_view }
    pub fn is_polling(&self) -> bool { self.poll.is_active() }
    pub fn num_pending_requests(&self) -> usize { self.pending.len() }

    pub fn next_ui_event(&mut self) -> Option<UiEvent> { self.ui_events.pop_front() }
    pub fn drain_ui_events(&mut self) -> Vec<UiEvent> { self.ui_events.drain(..).collect() }

    // Panel visibility before any room is entered.
    pub fn show_start_screen(&mut self) {
        use Panel::*;
        for (panel, visible) in [
            (CreateJoin, true),
            (CreateRoom, true),
            (JoinRoom, false),
            (RefreshGame, false),
            (Board, false),
            (Question, false),
        ] {
            self.emit(UiEvent::Panel(panel, visible));
        }
        self.emit(UiEvent::TabSelected(Tab::Create));
    }

    pub fn open_tab(&mut self, tab: Tab) {
        let (shown, hidden) = match tab {
            Tab::Create => (Panel::CreateRoom, Panel::JoinRoom),
            Tab::Join => (Panel::JoinRoom, Panel::CreateRoom),
        };
        self.emit(UiEvent::Panel(shown, true));
        self.emit(UiEvent::Panel(hidden, false));
        self.emit(UiEvent::Panel(Panel::Board, false));
        self.emit(UiEvent::TabSelected(tab));
    }

    pub fn create_room(&mut self, player: &str, color: &str, topic: &str) -> RequestId {
        let request = ApiRequest::CreateRoom {
            player: player.trim().to_owned(),
            color: self.color_or_default(color),
            max_box: self.config.max_box,
            topic: if topic.trim().is_empty() {
                self.config.default_topic.clone()
            } else {
                topic.trim().to_owned()
            },
        };
        self.send(Action::CreateRoom, request)
    }

    pub fn join_room(&mut self, code: &str, player: &str, color: &str) -> RequestId {
        let request = ApiRequest::JoinRoom {
            code: code.trim().to_owned(),
            player: player.trim().to_owned(),
            color: self.color_or_default(color),
        };
        self.send(Action::JoinRoom, request)
    }

    pub fn spectate(&mut self, code: &str, player: &str) -> RequestId {
        let request = ApiRequest::Spectate {
            code: code.trim().to_owned(),
            player: player.trim().to_owned(),
        };
        self.send(Action::Spectate, request)
    }

    pub fn load_setup(&mut self) -> RequestId { self.send(Action::LoadSetup, ApiRequest::GetSetup) }

    pub fn refresh(&mut self) -> Result<RequestId, CommandError> {
        let code = self.room()?.code.clone();
        Ok(self.send(Action::Refresh, ApiRequest::State { code }))
    }

    pub fn start_game(&mut self) -> Result<RequestId, CommandError> {
        let code = self.room()?.code.clone();
        Ok(self.send(Action::StartGame, ApiRequest::StartGame { code }))
    }

    pub fn roll_dice(&mut self) -> Result<RequestId, CommandError> {
        let room = self.room()?;
        let request = ApiRequest::RollDice { code: room.code.clone(), player: room.player.clone() };
        Ok(self.send(Action::RollDice, request))
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<RequestId, CommandError> {
        let room = self.room()?;
        let request = ApiRequest::SubmitAnswer {
            code: room.code.clone(),
            player: room.player.clone(),
            answer: answer.to_owned(),
        };
        Ok(self.send(Action::SubmitAnswer, request))
    }

    pub fn start_auto_refresh(&mut self) -> bool {
        let started = self.poll.start(Instant::now());
        if started {
            self.emit(UiEvent::PollingStarted);
        }
        started
    }

    pub fn stop_auto_refresh(&mut self) -> bool {
        let stopped = self.poll.stop();
        if stopped {
            self.emit(UiEvent::PollingStopped);
        }
        stopped
    }

    // For front-ends that drive the schedule from their own clock.
    pub fn take_poll_due(&mut self, now: Instant) -> bool { self.poll.take_due(now) }

    // One timer tick. Issues a quiet state refresh if polling is on and a room is known. Skipped
    // while the previous one is still in flight, so a slow server doesn't pile up requests.
    pub fn poll_tick(&mut self) -> Option<RequestId> {
        if !self.poll.is_active() {
            return None;
        }
        if self.is_pending(Action::AutoRefresh) {
            debug!("Skipping poll tick: previous refresh still pending");
            return None;
        }
        let code = self.session.code()?.to_owned();
        Some(self.send(Action::AutoRefresh, ApiRequest::State { code }))
    }

    // Forgets the room. Replies to requests issued before this point are ignored.
    pub fn leave(&mut self) {
        self.stop_auto_refresh();
        self.session.leave();
        self.pending.clear();
        self.room_view = RoomView::default();
        self.show_start_screen();
    }

    pub fn process_response(
        &mut self, id: RequestId, body: &str,
    ) -> Result<ResponseOutcome, ActionError> {
        let Some(pending) = self.pending.remove(&id) else {
            warn!("Ignoring reply to unknown request {}", id);
            return Ok(ResponseOutcome::Ignored);
        };
        // Setup carries no room state, so it stays out of the ordering.
        if pending.action == Action::LoadSetup {
            return self.apply_setup(body);
        }
        let stale = self.latest_applied.is_some_and(|latest| id < latest);
        if !stale {
            self.latest_applied = Some(id);
        }
        if stale && pending.action == Action::AutoRefresh {
            debug!("Dropping stale state reply {}", id);
            return Ok(ResponseOutcome::Stale);
        }

        let response = match ApiResponse::parse(body) {
            Ok(response) => response,
            Err(err) => return Err(self.fail(ActionError::Transport(err.to_string()))),
        };
        match response.status() {
            ResponseStatus::Ok => {}
            ResponseStatus::Error => {
                return Err(self.fail(ActionError::Application(response.message().to_owned())));
            }
            ResponseStatus::Other(status) => {
                debug!("Unexpected status {:?} in reply {}", status, id);
                return Err(self.fail(ActionError::Unclassified));
            }
        }

        match pending.action {
            Action::CreateRoom | Action::JoinRoom | Action::Spectate => {
                self.apply_room_entered(pending.action, &pending.request, &response);
            }
            _ if stale => {
                // The user still gets feedback for their own action, but the board and the
                // info regions keep the fresher data.
                debug!("Reply {} is stale, only showing its message", id);
                self.surface_message(pending.action, &response);
                // State replies never carry the dice, so nothing fresher can replace it.
                if pending.action == Action::RollDice {
                    self.apply_dice(&response);
                }
                return Ok(ResponseOutcome::Stale);
            }
            Action::Refresh | Action::AutoRefresh => self.apply_state(&response),
            Action::StartGame => self.apply_game_started(&response),
            Action::RollDice => self.apply_dice_rolled(&response),
            Action::SubmitAnswer => self.apply_answer_submitted(&response),
            Action::LoadSetup => unreachable!("handled above"),
        }
        Ok(ResponseOutcome::Applied)
    }

    pub fn process_failure(&mut self, id: RequestId, error: &str) -> ActionError {
        if self.pending.remove(&id).is_none() {
            debug!("Failure of unknown request {}: {}", id, error);
        }
        self.fail(ActionError::Transport(error.to_owned()))
    }

    fn room(&self) -> Result<&RoomSession, CommandError> {
        self.session.room().ok_or(CommandError::NoRoom)
    }

    fn is_pending(&self, action: Action) -> bool {
        self.pending.values().any(|pending| pending.action == action)
    }

    fn color_or_default(&self, color: &str) -> String {
        let color = color.trim();
        if color.is_empty() { self.config.default_color.clone() } else { color.to_owned() }
    }

    fn send(&mut self, action: Action, request: ApiRequest) -> RequestId {
        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        if let Some(message) = action.progress_message() {
            self.set_status(message.to_owned());
        }
        self.pending.insert(id, PendingRequest { action, request: request.clone() });
        if self.requests_tx.send(OutgoingRequest { id, action, request }).is_err() {
            warn!("Request {} dropped: network side is gone", id);
        }
        id
    }

    fn emit(&mut self, event: UiEvent) { self.ui_events.push_back(event); }

    fn set_status(&mut self, status: String) {
        self.room_view.status = status.clone();
        self.emit(UiEvent::Status(status));
    }

    fn fail(&mut self, error: ActionError) -> ActionError {
        self.set_status(error.to_string());
        error
    }

    fn set_node(&mut self, node: ViewNode, content: NodeContent) {
        self.emit(UiEvent::Node(node, content));
    }

    fn surface_message(&mut self, action: Action, response: &ApiResponse) {
        if action == Action::SubmitAnswer {
            self.alert(response.message().to_owned());
        } else {
            self.set_status(response.message().to_owned());
        }
    }

    fn alert(&mut self, message: String) {
        self.room_view.last_alert = Some(message.clone());
        self.emit(UiEvent::Alert(message));
    }

    fn apply_room_entered(&mut self, action: Action, request: &ApiRequest, response: &ApiResponse) {
        let (submitted_code, submitted_player) = match request {
            ApiRequest::CreateRoom { player, .. } => ("", player.as_str()),
            ApiRequest::JoinRoom { code, player, .. } | ApiRequest::Spectate { code, player } => {
                (code.as_str(), player.as_str())
            }
            _ => ("", ""),
        };
        let code = response.code.clone().unwrap_or_else(|| submitted_code.to_owned());
        let player = response.player.clone().unwrap_or_else(|| submitted_player.to_owned());
        let role = if action == Action::Spectate { RoomRole::Spectator } else { RoomRole::Player };

        self.set_status(response.message().to_owned());
        for panel in [Panel::CreateJoin, Panel::CreateRoom, Panel::JoinRoom, Panel::Question] {
            self.emit(UiEvent::Panel(panel, false));
        }
        self.session =
            Session::InRoom(RoomSession { code: code.clone(), player: player.clone(), role });
        self.emit(UiEvent::SessionFields { code, player });
        self.emit(UiEvent::Panel(Panel::RefreshGame, true));
        self.emit(UiEvent::Panel(Panel::Board, true));

        if let Some(code) = self.session.code().map(str::to_owned) {
            self.send(Action::AutoRefresh, ApiRequest::State { code });
        }
        self.start_auto_refresh();
    }

    fn apply_state(&mut self, response: &ApiResponse) {
        self.set_status(response.message().to_owned());
        self.set_node(ViewNode::Code, view::code_view(response.code.as_deref()));
        self.set_node(ViewNode::Player, view::player_view(response.player.as_deref()));
        self.write_players(&response.players);
        self.clear_color_and_pos();
        self.write_state(response.state.as_deref());
        self.emit(UiEvent::Panel(Panel::Board, true));
        self.emit(UiEvent::Panel(Panel::CreateRoom, false));
        self.emit(UiEvent::Panel(Panel::JoinRoom, false));
        self.sync_markers(&response.players, true);
        self.show_question_if_any(response);
    }

    fn apply_game_started(&mut self, response: &ApiResponse) {
        self.set_status(response.message().to_owned());
        self.set_node(ViewNode::Player, NodeContent::Empty);
        self.write_players(&response.players);
        self.clear_color_and_pos();
        self.write_state(response.state.as_deref());
    }

    fn apply_dice_rolled(&mut self, response: &ApiResponse) {
        self.set_status(response.message().to_owned());
        self.set_node(ViewNode::Code, view::code_view(response.code.as_deref()));
        self.set_node(ViewNode::Player, view::player_view(response.player.as_deref()));
        self.write_players(&response.players);
        self.clear_color_and_pos();
        self.write_state(response.state.as_deref());
        self.apply_dice(response);
        self.sync_markers(&response.players, false);
        self.show_question_if_any(response);
    }

    fn apply_dice(&mut self, response: &ApiResponse) {
        self.set_node(ViewNode::Dice, view::dice_view(response.dice));
        self.room_view.dice = response.dice;
        if let Some(dice) = response.dice {
            self.emit(UiEvent::DiceRolled(dice));
        }
        self.emit(UiEvent::RollDetails {
            before: response.beforepos,
            steps: response.steps.clone(),
            ended: response.ended.unwrap_or(false),
        });
    }

    fn apply_answer_submitted(&mut self, response: &ApiResponse) {
        self.alert(response.message().to_owned());
        self.write_players(&response.players);
        self.write_state(response.state.as_deref());
        self.sync_markers(&response.players, false);
        self.room_view.question = None;
        self.emit(UiEvent::Panel(Panel::Question, false));
        self.emit(UiEvent::Panel(Panel::BoardInfo, true));
    }

    fn apply_setup(&mut self, body: &str) -> Result<ResponseOutcome, ActionError> {
        let setup = match BoardSetup::parse(body) {
            Ok(setup) => setup,
            Err(err) => return Err(self.fail(ActionError::Transport(err.to_string()))),
        };
        if !setup.cells.is_empty() {
            let events = self.markers.set_cell_table(CellTable::new(setup.cells.clone()));
            self.ui_events.extend(events.into_iter().map(UiEvent::Marker));
        }
        let decorations: Vec<_> = setup.conf.iter().filter_map(|jump| jump.decoration()).collect();
        if !decorations.is_empty() {
            self.layout = BoardLayout::new().with_decorations(decorations);
        }
        self.emit(UiEvent::BoardRebuilt);
        Ok(ResponseOutcome::Applied)
    }

    fn write_players(&mut self, players: &[PlayerEntry]) {
        self.room_view.players = players.to_vec();
        self.set_node(ViewNode::Players, view::players_view(players));
    }

    fn write_state(&mut self, state: Option<&str>) {
        self.room_view.state = state.map(str::to_owned);
        self.set_node(ViewNode::State, view::state_view(state));
    }

    fn clear_color_and_pos(&mut self) {
        self.set_node(ViewNode::Color, NodeContent::Empty);
        self.set_node(ViewNode::Pos, NodeContent::Empty);
    }

    fn sync_markers(&mut self, players: &[PlayerEntry], add_missing: bool) {
        for entry in players {
            let mut events = vec![];
            events.extend(self.markers.set_color(&entry.player, &entry.color));
            if add_missing {
                events.extend(self.markers.add_player(&entry.player, &entry.color));
            }
            if let Some(cell) = entry.cell() {
                events.extend(self.markers.move_player(&entry.player, cell));
            }
            self.ui_events.extend(events.into_iter().map(UiEvent::Marker));
        }
    }

    fn show_question_if_any(&mut self, response: &ApiResponse) {
        self.room_view.turn = response.turn.clone();
        self.emit(UiEvent::Panel(Panel::Question, false));
        self.emit(UiEvent::Panel(Panel::BoardInfo, true));
        match response.first_question() {
            Some(question) => {
                let question = QuestionView::new(response.turn.as_deref(), question);
                self.room_view.question = Some(question.clone());
                self.emit(UiEvent::Panel(Panel::Question, true));
                self.emit(UiEvent::Panel(Panel::BoardInfo, false));
                self.emit(UiEvent::Question(question));
            }
            None => {
                self.room_view.question = None;
            }
        }
    }

    // Where the marker of `player` currently stands, if they have one.
    pub fn player_cell(&self, player: &str) -> Option<CellIndex> {
        self.markers.get(player).map(|marker| marker.cell)
    }
}

// Browser front-end. Owns the page: reads form fields, performs HTTP requests on behalf of
// `ClientState` and applies its `UiEvent`s to the DOM.

#![cfg_attr(feature = "strict", deny(warnings))]

pub mod board_ui;
pub mod fetch;
pub mod web_document;
pub mod web_element_ext;
pub mod web_error_handling;
pub mod web_logger;

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::mpsc;

use gloo::timers::callback::{Interval, Timeout};
use itertools::Itertools;
use log::{debug, error, info, warn};
use strum::IntoEnumIterator;
use ular_client::client::{ClientState, OutgoingRequest, RequestId, Tab, UiEvent};
use ular_client::config::ClientConfig;
use ular_client::error::CommandError;
use ular_client::view::{
    NodeContent, QuestionView, START_GAME_ACTION, START_GAME_ACTION_ATTRIBUTE, ViewNode,
};
use wasm_bindgen::prelude::*;

use crate::board_ui::{BoardUi, DICE_SPIN_MS};
use crate::web_document::{WebDocument, web_document, web_window};
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::{JsResult, js_error_message};


const STATUS_ID: &str = "outputall";
const SESSION_CODE_ID: &str = "statecode";
const SESSION_PLAYER_ID: &str = "playercode";
const CREATE_TAB_BUTTON_ID: &str = "btnCreate";
const JOIN_TAB_BUTTON_ID: &str = "btnJoin";

struct FormField;
impl FormField {
    const CREATE_PLAYER: &'static str = "playercreateroom";
    const CREATE_COLOR: &'static str = "colorcreateroom";
    const CREATE_TOPIC: &'static str = "topiccreateroom";
    const JOIN_CODE: &'static str = "codejoinroom";
    const JOIN_PLAYER: &'static str = "playerjoinroom";
    const JOIN_COLOR: &'static str = "colorjoinroom";
}

struct Inner {
    state: ClientState,
    requests_rx: mpsc::Receiver<OutgoingRequest>,
    board_ui: BoardUi,
    // Dropping the handle cancels the timer.
    poll_timer: Option<Interval>,
    dice_timer: Option<Timeout>,
    start_listener_installed: bool,
}

type SharedInner = Rc<RefCell<Inner>>;

#[wasm_bindgen]
pub struct WebClient {
    inner: SharedInner,
}

#[wasm_bindgen]
impl WebClient {
    pub fn new_client(config_json: Option<String>) -> JsResult<WebClient> {
        web_error_handling::set_panic_hook();
        web_logger::init_logger(log::Level::Info);
        let config = match config_json {
            Some(json) => ClientConfig::from_json(&json)
                .map_err(|err| rust_error!("Invalid client config: {}", err))?,
            None => ClientConfig::default(),
        };
        info!("Starting client with {:?}", config);
        let (requests_tx, requests_rx) = mpsc::channel();
        let inner = Inner {
            state: ClientState::new(config, requests_tx),
            requests_rx,
            board_ui: BoardUi::default(),
            poll_timer: None,
            dice_timer: None,
            start_listener_installed: false,
        };
        Ok(WebClient { inner: Rc::new(RefCell::new(inner)) })
    }

    pub fn init_page(&self) -> JsResult<()> {
        let document = web_document()?;
        {
            let inner = self.inner.borrow();
            inner.board_ui.render_cells(&document, inner.state.layout())?;
        }
        for node in ViewNode::iter() {
            document.get_existing_element_by_id(node.element_id())?.set_inner_html("");
        }
        install_start_listener(&self.inner, &document)?;
        self.inner.borrow_mut().state.show_start_screen();
        pump(&self.inner)
    }

    pub fn open_tab(&self, tab: &str) -> JsResult<()> {
        let tab = match tab {
            "create" => Tab::Create,
            "join" => Tab::Join,
            _ => return Err(rust_error!("Unknown tab \"{}\"", tab)),
        };
        self.inner.borrow_mut().state.open_tab(tab);
        pump(&self.inner)
    }

    pub fn create_room(&self) -> JsResult<()> {
        let document = web_document()?;
        let player = document.input_value(FormField::CREATE_PLAYER);
        let color = document.input_value(FormField::CREATE_COLOR);
        let topic = document.input_value(FormField::CREATE_TOPIC);
        run_command(&self.inner, |state| Ok(state.create_room(&player, &color, &topic)))
    }

    pub fn join_room(&self) -> JsResult<()> {
        let document = web_document()?;
        let code = document.input_value(FormField::JOIN_CODE);
        let player = document.input_value(FormField::JOIN_PLAYER);
        let color = document.input_value(FormField::JOIN_COLOR);
        run_command(&self.inner, |state| Ok(state.join_room(&code, &player, &color)))
    }

    pub fn spectate(&self) -> JsResult<()> {
        let document = web_document()?;
        let code = document.input_value(FormField::JOIN_CODE);
        let player = document.input_value(FormField::JOIN_PLAYER);
        run_command(&self.inner, |state| Ok(state.spectate(&code, &player)))
    }

    pub fn refresh(&self) -> JsResult<()> { run_command(&self.inner, |state| state.refresh()) }

    pub fn start_game(&self) -> JsResult<()> {
        run_command(&self.inner, |state| state.start_game())
    }

    pub fn roll_dice(&self) -> JsResult<()> { run_command(&self.inner, |state| state.roll_dice()) }

    pub fn submit_answer(&self, answer: &str) -> JsResult<()> {
        run_command(&self.inner, |state| state.submit_answer(answer))
    }

    // Submits the text currently shown in answer slot `index` (0-based).
    pub fn submit_answer_choice(&self, index: usize) -> JsResult<()> {
        let id = QuestionView::ANSWER_IDS
            .get(index)
            .ok_or_else(|| rust_error!("Answer index out of range: {}", index))?;
        let answer =
            web_document()?.get_existing_element_by_id(id)?.text_content().unwrap_or_default();
        self.submit_answer(&answer)
    }

    pub fn load_setup(&self) -> JsResult<()> {
        run_command(&self.inner, |state| Ok(state.load_setup()))
    }

    pub fn stop_auto_refresh(&self) -> JsResult<()> {
        self.inner.borrow_mut().state.stop_auto_refresh();
        pump(&self.inner)
    }

    pub fn leave(&self) -> JsResult<()> {
        self.inner.borrow_mut().state.leave();
        pump(&self.inner)
    }

    pub fn is_polling(&self) -> bool { self.inner.borrow().state.is_polling() }
}

fn report(result: JsResult<()>) {
    if let Err(err) = result {
        error!("{}", js_error_message(&err));
    }
}

fn run_command(
    inner: &SharedInner, command: impl FnOnce(&mut ClientState) -> Result<RequestId, CommandError>,
) -> JsResult<()> {
    let result = command(&mut inner.borrow_mut().state);
    match result {
        Ok(id) => debug!("Issued request {}", id),
        Err(err) => {
            warn!("Command rejected: {}", err);
            set_status(&web_document()?, &err.to_string())?;
        }
    }
    pump(inner)
}

// Sends everything the client has queued and applies everything it wants shown. Must not be
// called while `inner` is borrowed.
fn pump(inner: &SharedInner) -> JsResult<()> {
    let (requests, events, api_prefix) = {
        let mut inner = inner.borrow_mut();
        let requests = inner.requests_rx.try_iter().collect_vec();
        let events = inner.state.drain_ui_events();
        (requests, events, inner.state.config().api_prefix.clone())
    };
    for request in requests {
        spawn_request(inner, request, &api_prefix);
    }
    let document = web_document()?;
    for event in events {
        apply_ui_event(inner, &document, event)?;
    }
    Ok(())
}

fn spawn_request(inner: &SharedInner, request: OutgoingRequest, api_prefix: &str) {
    let url = request.request.path_and_query(api_prefix);
    let inner = Rc::clone(inner);
    wasm_bindgen_futures::spawn_local(async move {
        debug!("{} GET {}", request.id, url);
        let result = fetch::fetch_text(&url).await;
        {
            let mut inner = inner.borrow_mut();
            match result {
                Ok(body) => match inner.state.process_response(request.id, &body) {
                    Ok(outcome) => debug!("{} {:?}: {:?}", request.id, request.action, outcome),
                    Err(err) => info!("{} {:?} failed: {}", request.id, request.action, err),
                },
                Err(err) => {
                    let err = inner.state.process_failure(request.id, &js_error_message(&err));
                    warn!("{} {:?} failed: {}", request.id, request.action, err);
                }
            }
        }
        report(pump(&inner));
    });
}

fn set_status(document: &WebDocument, status: &str) -> JsResult<()> {
    document.get_existing_element_by_id(STATUS_ID)?.set_text_content(Some(status));
    Ok(())
}

fn apply_ui_event(inner: &SharedInner, document: &WebDocument, event: UiEvent) -> JsResult<()> {
    match event {
        UiEvent::Status(status) => set_status(document, &status)?,
        UiEvent::Alert(message) => web_window()?.alert_with_message(&message)?,
        UiEvent::Node(node, content) => {
            let element = document.get_existing_element_by_id(node.element_id())?;
            match &content {
                NodeContent::Empty => element.set_inner_html(""),
                NodeContent::Text(text) => element.set_text_content(Some(text)),
                NodeContent::Html(html) => element.set_inner_html(html),
            }
        }
        UiEvent::Panel(panel, visible) => {
            document.get_existing_element_by_id(panel.element_id())?.set_displayed(visible)?;
        }
        UiEvent::TabSelected(tab) => {
            for (id, selected) in
                [(CREATE_TAB_BUTTON_ID, tab == Tab::Create), (JOIN_TAB_BUTTON_ID, tab == Tab::Join)]
            {
                document
                    .get_existing_element_by_id(id)?
                    .class_list()
                    .toggle_with_force("active", selected)?;
            }
        }
        UiEvent::SessionFields { code, player } => {
            document.set_input_value(SESSION_CODE_ID, &code)?;
            document.set_input_value(SESSION_PLAYER_ID, &player)?;
        }
        UiEvent::Marker(event) => inner.borrow_mut().board_ui.apply(document, &event)?,
        UiEvent::Question(question) => {
            let texts = [
                (QuestionView::ANSWERER_ID, &question.answerer),
                (QuestionView::QUESTION_ID, &question.question),
            ];
            let answers = QuestionView::ANSWER_IDS.iter().copied().zip(question.answers.iter());
            for (id, text) in texts.into_iter().chain(answers) {
                document.get_existing_element_by_id(id)?.set_text_content(Some(text));
            }
        }
        UiEvent::DiceRolled(dice) => {
            debug!("Rolled {}", dice);
            let icon = board_ui::start_dice_spin(document)?;
            let timer =
                Timeout::new(DICE_SPIN_MS, move || report(board_ui::finish_dice_spin(&icon)));
            inner.borrow_mut().dice_timer = Some(timer);
        }
        UiEvent::RollDetails { before, steps, ended } => {
            debug!("Moved from {:?} via {:?}, ended: {}", before, steps, ended);
        }
        UiEvent::BoardRebuilt => {
            let inner = inner.borrow();
            inner.board_ui.render_cells(document, inner.state.layout())?;
        }
        UiEvent::PollingStarted => {
            let interval = inner.borrow().state.config().poll_interval;
            let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
            let weak = Rc::downgrade(inner);
            let timer = Interval::new(millis, move || poll_tick(&weak));
            inner.borrow_mut().poll_timer = Some(timer);
        }
        UiEvent::PollingStopped => {
            inner.borrow_mut().poll_timer = None;
        }
    }
    Ok(())
}

fn poll_tick(inner: &Weak<RefCell<Inner>>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let id = inner.borrow_mut().state.poll_tick();
    if id.is_some() {
        report(pump(&inner));
    }
}

// One delegated listener on the state node serves every start button written into it.
fn install_start_listener(inner: &SharedInner, document: &WebDocument) -> JsResult<()> {
    if inner.borrow().start_listener_installed {
        return Ok(());
    }
    let state_node = document.get_existing_element_by_id(ViewNode::State.element_id())?;
    let selector = format!("[{}='{}']", START_GAME_ACTION_ATTRIBUTE, START_GAME_ACTION);
    let weak = Rc::downgrade(inner);
    state_node.add_event_listener_and_forget("click", move |event: web_sys::Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return Ok(());
        };
        if target.closest(&selector)?.is_none() {
            return Ok(());
        }
        let Some(inner) = weak.upgrade() else {
            return Ok(());
        };
        run_command(&inner, |state| state.start_game())
    })?;
    inner.borrow_mut().start_listener_installed = true;
    Ok(())
}

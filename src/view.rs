// Formatters for the informational regions of the page. Each writer turns a single server value
// into the full content of one node; an empty or missing value clears the node.

use itertools::Itertools;
use strum::{EnumIter, IntoStaticStr};

use crate::protocol::{PlayerEntry, QuestionEntry, RoomState};


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, EnumIter, IntoStaticStr)]
pub enum ViewNode {
    #[strum(serialize = "codeR")]
    Code,
    #[strum(serialize = "playerR")]
    Player,
    #[strum(serialize = "playersR")]
    Players,
    #[strum(serialize = "colorR")]
    Color,
    #[strum(serialize = "posR")]
    Pos,
    #[strum(serialize = "stateR")]
    State,
    #[strum(serialize = "diceR")]
    Dice,
}

impl ViewNode {
    pub fn element_id(self) -> &'static str { self.into() }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NodeContent {
    Empty,
    Text(String),
    // Already escaped.
    Html(String),
}

impl NodeContent {
    pub fn is_empty(&self) -> bool { matches!(self, NodeContent::Empty) }

    // Plain-text rendition, used by front-ends that cannot display HTML.
    pub fn to_plain_text(&self) -> String {
        match self {
            NodeContent::Empty => String::new(),
            NodeContent::Text(text) => text.clone(),
            NodeContent::Html(html) => strip_tags(html),
        }
    }
}

// Data attribute that marks the start button inside the state node. The button is recreated on
// every write, so front-ends listen for clicks on the node itself and match on this attribute.
pub const START_GAME_ACTION_ATTRIBUTE: &str = "data-ular-action";
pub const START_GAME_ACTION: &str = "startgame";

fn labeled(label: &str, value: Option<&str>) -> NodeContent {
    match value {
        None | Some("") => NodeContent::Empty,
        Some(value) => NodeContent::Text(format!("{}: {}", label, value)),
    }
}

pub fn code_view(code: Option<&str>) -> NodeContent { labeled("code", code) }

pub fn player_view(player: Option<&str>) -> NodeContent { labeled("player", player) }

pub fn color_view(color: Option<&str>) -> NodeContent { labeled("color", color) }

pub fn pos_view(pos: Option<u32>) -> NodeContent {
    labeled("pos", pos.map(|p| p.to_string()).as_deref())
}

pub fn dice_view(dice: Option<u32>) -> NodeContent {
    match dice {
        None => NodeContent::Empty,
        Some(dice) => NodeContent::Text(format!("Dice: {}", dice)),
    }
}

pub fn state_view(state: Option<&str>) -> NodeContent {
    let Some(state) = state.filter(|s| !s.is_empty()) else {
        return NodeContent::Empty;
    };
    let escaped = html_escape::encode_text(state);
    if RoomState::from_wire(state) == RoomState::Waiting {
        NodeContent::Html(format!(
            "state: {}<button class='btn btn-success' {}='{}'>Start</button>",
            escaped, START_GAME_ACTION_ATTRIBUTE, START_GAME_ACTION
        ))
    } else {
        NodeContent::Html(format!("state: {}", escaped))
    }
}

pub fn players_view(players: &[PlayerEntry]) -> NodeContent {
    if players.is_empty() {
        return NodeContent::Empty;
    }
    let rows = players
        .iter()
        .map(|p| {
            let pos = p.pos.map(|pos| pos.to_string()).unwrap_or_default();
            format!(
                "<div class='player-row' style='display:flex;justify-content:center;align-items:center;'>\
                 {} - {} \
                 <div class='player-swatch' style='border-radius:24px;background-color:{};width:28px;height:28px;'> </div>\
                 </div>",
                html_escape::encode_text(&p.player),
                pos,
                html_escape::encode_single_quoted_attribute(&p.color),
            )
        })
        .join("");
    NodeContent::Html(format!("<div>{}</div>", rows))
}


#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QuestionView {
    pub answerer: String,
    pub question: String,
    pub answers: [String; 4],
}

impl QuestionView {
    pub const ANSWERER_ID: &'static str = "questionplayertext";
    pub const QUESTION_ID: &'static str = "questiontext";
    pub const ANSWER_IDS: [&'static str; 4] = ["a1text", "a2text", "a3text", "a4text"];

    pub fn new(turn: Option<&str>, question: &QuestionEntry) -> Self {
        QuestionView {
            answerer: format!("Answerer: {}", turn.unwrap_or("")),
            question: question.question.clone(),
            answers: question.answers().map(str::to_owned),
        }
    }
}


fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&text).into_owned()
}

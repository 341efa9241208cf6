// Wire format of the game server API. All endpoints are plain GET requests with query
// parameters; all replies are JSON.
//
// The server keeps most values as text, so numbers may arrive either as JSON numbers or as
// numeric strings. Fields are optional across the board: each endpoint returns its own subset.
// Nothing beyond the JSON syntax is validated: a `null` or an unreadable number only blanks that
// one field, the rest of the reply is still used.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;
use url::form_urlencoded;

use crate::board::{CellDecoration, CellIndex, CellOffset};


pub const DEFAULT_API_PREFIX: &str = "/api/ular/";

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";


#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ApiRequest {
    CreateRoom { player: String, color: String, max_box: u32, topic: String },
    JoinRoom { code: String, player: String, color: String },
    State { code: String },
    StartGame { code: String },
    RollDice { code: String, player: String },
    SubmitAnswer { code: String, player: String, answer: String },
    Spectate { code: String, player: String },
    GetSetup,
}

impl ApiRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ApiRequest::CreateRoom { .. } => "createroom",
            ApiRequest::JoinRoom { .. } => "joinroom",
            ApiRequest::State { .. } => "state",
            ApiRequest::StartGame { .. } => "startgame",
            ApiRequest::RollDice { .. } => "rolldice",
            ApiRequest::SubmitAnswer { .. } => "submitanswer",
            ApiRequest::Spectate { .. } => "spectate",
            ApiRequest::GetSetup => "getsetup",
        }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            ApiRequest::CreateRoom { player, color, max_box, topic } => vec![
                ("player", player.clone()),
                ("color", color.clone()),
                ("maxbox", max_box.to_string()),
                ("topic", topic.clone()),
            ],
            ApiRequest::JoinRoom { code, player, color } => vec![
                ("code", code.clone()),
                ("player", player.clone()),
                ("color", color.clone()),
            ],
            ApiRequest::State { code } | ApiRequest::StartGame { code } => {
                vec![("code", code.clone())]
            }
            ApiRequest::RollDice { code, player } | ApiRequest::Spectate { code, player } => {
                vec![("code", code.clone()), ("player", player.clone())]
            }
            ApiRequest::SubmitAnswer { code, player, answer } => vec![
                ("code", code.clone()),
                ("player", player.clone()),
                ("answer", answer.clone()),
            ],
            ApiRequest::GetSetup => vec![],
        }
    }

    // Origin-relative URL, e.g. "/api/ular/state?code=ABCD". This is what the browser fetches.
    pub fn path_and_query(&self, api_prefix: &str) -> String {
        let mut path = api_prefix.to_owned();
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(self.endpoint());
        let params = self.query_params();
        if !params.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            path.push('?');
            path.push_str(&query);
        }
        path
    }

    // Absolute URL for clients that are not served by the game server itself.
    pub fn to_url(&self, server: &Url, api_prefix: &str) -> Result<Url, url::ParseError> {
        server.join(&self.path_and_query(api_prefix))
    }
}


#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ResponseStatus {
    Ok,
    Error,
    Other(String),
}

impl ResponseStatus {
    pub fn from_wire(status: Option<&str>) -> Self {
        match status {
            Some(STATUS_OK) => ResponseStatus::Ok,
            Some(STATUS_ERROR) => ResponseStatus::Error,
            Some(other) => ResponseStatus::Other(other.to_owned()),
            None => ResponseStatus::Other(String::new()),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RoomState {
    Waiting,
    Playing,
    Ended,
    Other(String),
}

impl RoomState {
    pub const WAITING: &'static str = "waiting";

    pub fn from_wire(s: &str) -> Self {
        match s {
            Self::WAITING => RoomState::Waiting,
            "playing" => RoomState::Playing,
            "ended" => RoomState::Ended,
            other => RoomState::Other(other.to_owned()),
        }
    }
}


#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerEntry {
    #[serde(deserialize_with = "deserialize_or_default")]
    pub player: String,
    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub pos: Option<u32>,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub color: String,
}

impl PlayerEntry {
    pub fn cell(&self) -> Option<CellIndex> { self.pos.map(CellIndex) }
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionEntry {
    #[serde(deserialize_with = "deserialize_or_default")]
    pub question: String,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub a1: String,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub a2: String,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub a3: String,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub a4: String,
}

impl QuestionEntry {
    pub fn answers(&self) -> [&str; 4] { [&self.a1, &self.a2, &self.a3, &self.a4] }
}

// Superset of all endpoint replies except `getsetup`.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub status: Option<String>,
    pub message: Option<String>,
    pub code: Option<String>,
    pub player: Option<String>,
    pub color: Option<String>,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub players: Vec<PlayerEntry>,
    pub state: Option<String>,
    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub dice: Option<u32>,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub question: Vec<QuestionEntry>,
    // Id of the question in `question`, if any. Empty string when there is none.
    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub questionid: Option<u32>,
    pub turn: Option<String>,
    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub pos: Option<u32>,
    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub beforepos: Option<u32>,
    #[serde(deserialize_with = "deserialize_steps")]
    pub steps: Vec<u32>,
    pub ended: Option<bool>,
    pub answer: Option<bool>,
    pub ladderorsnake: Option<String>,
}

impl ApiResponse {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> { serde_json::from_str(body) }

    pub fn status(&self) -> ResponseStatus { ResponseStatus::from_wire(self.status.as_deref()) }
    pub fn message(&self) -> &str { self.message.as_deref().unwrap_or("") }
    pub fn room_state(&self) -> Option<RoomState> {
        self.state.as_deref().map(RoomState::from_wire)
    }
    pub fn first_question(&self) -> Option<&QuestionEntry> { self.question.first() }
}


#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpEntry {
    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub start: Option<u32>,
    #[serde(deserialize_with = "deserialize_loose_u32")]
    pub end: Option<u32>,
    #[serde(rename = "type", deserialize_with = "deserialize_or_default")]
    pub kind: String,
}

impl JumpEntry {
    pub fn decoration(&self) -> Option<(CellIndex, CellDecoration)> {
        let decoration = match self.kind.as_str() {
            "snake" => CellDecoration::Snake,
            "ladder" => CellDecoration::Ladder,
            _ => return None,
        };
        Some((CellIndex(self.start?), decoration))
    }
}

// Reply to `getsetup`. Unlike other endpoints it has no `status` field.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSetup {
    #[serde(deserialize_with = "deserialize_or_default")]
    pub conf: Vec<JumpEntry>,
    #[serde(deserialize_with = "deserialize_or_default")]
    pub cells: Vec<CellOffset>,
    pub gaps: Option<i32>,
}

impl BoardSetup {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> { serde_json::from_str(body) }
}


// `null` reads as the default value.
fn deserialize_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn loose_u32(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// Accepts `5` and `"5"`. Anything else, including `""` (how the server spells "no value"),
// negative numbers and garbage, reads as `None`.
fn deserialize_loose_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(loose_u32(&value))
}

// Unreadable steps are skipped: the path is informational only.
fn deserialize_steps<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let steps: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(steps.unwrap_or_default().iter().filter_map(loose_u32).collect())
}

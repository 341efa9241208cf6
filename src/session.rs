use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSession {
    pub code: String,
    pub player: String,
    pub role: RoomRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomRole {
    Player,
    Spectator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    #[default]
    NoRoom,
    InRoom(RoomSession),
}

impl Session {
    pub fn room(&self) -> Option<&RoomSession> {
        match self {
            Session::NoRoom => None,
            Session::InRoom(room) => Some(room),
        }
    }
    pub fn code(&self) -> Option<&str> { self.room().map(|room| room.code.as_str()) }
    pub fn player(&self) -> Option<&str> { self.room().map(|room| room.player.as_str()) }
    pub fn is_spectator(&self) -> bool {
        self.room().is_some_and(|room| room.role == RoomRole::Spectator)
    }
    pub fn leave(&mut self) { *self = Session::NoRoom; }
}

// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod marker;
pub mod poll;
pub mod protocol;
pub mod session;
pub mod view;

pub use board::{BoardLayout, CellDecoration, CellIndex, CellOffset, CellTable};
pub use client::{
    Action, ClientState, OutgoingRequest, Panel, RequestId, ResponseOutcome, Tab, UiEvent,
};
pub use config::ClientConfig;
pub use error::{ActionError, CommandError};
pub use marker::{MarkerBoard, MarkerEvent};
pub use protocol::{ApiRequest, ApiResponse, PlayerEntry, QuestionEntry, RoomState};
pub use session::{RoomRole, RoomSession, Session};
pub use view::{NodeContent, QuestionView, ViewNode};

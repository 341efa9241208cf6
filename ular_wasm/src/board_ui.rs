// DOM side of the board: numbered cells and player markers inside the `board` container.

use std::collections::HashMap;

use ular_client::board::BoardLayout;
use ular_client::marker::MarkerEvent;

use crate::web_document::WebDocument;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;


pub const BOARD_ID: &str = "board";
pub const DICE_ICON_ID: &str = "diceR2";
pub const DICE_SPIN_MS: u32 = 500;

const PLAYER_ID_ATTRIBUTE: &str = "data-player-id";

// Marker elements by player. Markers are never removed while the page lives.
#[derive(Default)]
pub struct BoardUi {
    markers: HashMap<String, web_sys::Element>,
}

impl BoardUi {
    // Redraws all cells. Existing markers are re-attached on top.
    pub fn render_cells(&self, document: &WebDocument, layout: &BoardLayout) -> JsResult<()> {
        let board = document.get_existing_element_by_id(BOARD_ID)?;
        board.remove_all_children();
        for cell in layout.render_order() {
            let classes = ["cell"].into_iter().chain(layout.decoration(cell).css_class());
            board
                .append_new_element("div")?
                .with_classes(classes)?
                .with_text_content(&cell.to_string());
        }
        for marker in self.markers.values() {
            board.append_child(marker)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, document: &WebDocument, event: &MarkerEvent) -> JsResult<()> {
        match event {
            MarkerEvent::Added { player, color } => {
                if self.markers.contains_key(player) {
                    return Ok(());
                }
                let board = document.get_existing_element_by_id(BOARD_ID)?;
                let marker = board
                    .append_new_element("div")?
                    .with_classes(["player"])?
                    .with_attribute(PLAYER_ID_ATTRIBUTE, player)?;
                marker.set_style("background-color", color)?;
                self.markers.insert(player.clone(), marker);
            }
            MarkerEvent::Recolored { player, color } => {
                if let Some(marker) = self.markers.get(player) {
                    marker.set_style("background-color", color)?;
                }
            }
            MarkerEvent::Moved { player, placement, .. } => {
                if let Some(marker) = self.markers.get(player) {
                    marker.set_style("transform", &placement.to_css_translate())?;
                }
            }
        }
        Ok(())
    }
}

// Kicks off the dice spin. Returns the element so that the caller can schedule the reset.
pub fn start_dice_spin(document: &WebDocument) -> JsResult<web_sys::Element> {
    let icon = document.get_existing_element_by_id(DICE_ICON_ID)?;
    icon.set_text_content(Some("🎲"));
    icon.set_style("transition", &format!("transform {}ms ease", DICE_SPIN_MS))?;
    icon.set_style("transform", "rotate(360deg)")?;
    Ok(icon)
}

pub fn finish_dice_spin(icon: &web_sys::Element) -> JsResult<()> {
    icon.set_style("transform", "rotate(0deg)")
}

use std::collections::HashMap;

use crate::board::{CellIndex, CellOffset, CellTable, START_CELL};


// Shown for unknown players and for markers added without a color.
pub const FALLBACK_MARKER_COLOR: &str = "gray";


#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Marker {
    pub color: String,
    pub cell: CellIndex,
}

// What a front-end has to do to keep its marker elements in sync.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MarkerEvent {
    Added { player: String, color: String },
    Recolored { player: String, color: String },
    Moved { player: String, cell: CellIndex, placement: CellOffset },
}

// Player tokens currently on the board. Markers are never removed: a player who left simply
// stays where they were last seen.
#[derive(Clone, Debug, Default)]
pub struct MarkerBoard {
    table: CellTable,
    markers: HashMap<String, Marker>,
    // Insertion order, so that front-ends can draw overlapping markers consistently.
    order: Vec<String>,
}

impl MarkerBoard {
    pub fn new(table: CellTable) -> Self {
        MarkerBoard { table, markers: HashMap::new(), order: vec![] }
    }

    pub fn cell_table(&self) -> &CellTable { &self.table }

    // Replaces cell offsets and re-emits placements for every marker.
    pub fn set_cell_table(&mut self, table: CellTable) -> Vec<MarkerEvent> {
        self.table = table;
        self.order
            .iter()
            .filter_map(|player| {
                let cell = self.markers[player].cell;
                let placement = self.table.marker_placement(cell)?;
                Some(MarkerEvent::Moved { player: player.clone(), cell, placement })
            })
            .collect()
    }

    pub fn get(&self, player: &str) -> Option<&Marker> { self.markers.get(player) }
    pub fn contains(&self, player: &str) -> bool { self.markers.contains_key(player) }
    pub fn len(&self) -> usize { self.markers.len() }
    pub fn is_empty(&self) -> bool { self.markers.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Marker)> {
        self.order.iter().map(|player| (player.as_str(), &self.markers[player]))
    }

    // Creates a marker at the start slot. Does nothing if the player already has one.
    pub fn add_player(&mut self, player: &str, color: &str) -> Vec<MarkerEvent> {
        if self.markers.contains_key(player) {
            return vec![];
        }
        self.markers.insert(player.to_owned(), Marker {
            color: color.to_owned(),
            cell: START_CELL,
        });
        self.order.push(player.to_owned());
        let mut events = vec![MarkerEvent::Added {
            player: player.to_owned(),
            color: color.to_owned(),
        }];
        events.extend(self.move_player(player, START_CELL));
        events
    }

    // Returns `None` without touching anything if either the player or the cell is unknown.
    pub fn move_player(&mut self, player: &str, cell: CellIndex) -> Option<MarkerEvent> {
        let marker = self.markers.get_mut(player)?;
        let placement = self.table.marker_placement(cell)?;
        marker.cell = cell;
        Some(MarkerEvent::Moved { player: player.to_owned(), cell, placement })
    }

    pub fn set_color(&mut self, player: &str, color: &str) -> Option<MarkerEvent> {
        let marker = self.markers.get_mut(player)?;
        if color.is_empty() || marker.color == color {
            return None;
        }
        marker.color = color.to_owned();
        Some(MarkerEvent::Recolored { player: player.to_owned(), color: color.to_owned() })
    }

    pub fn color(&self, player: &str) -> &str {
        match self.markers.get(player) {
            Some(marker) if !marker.color.is_empty() => marker.color.as_str(),
            _ => FALLBACK_MARKER_COLOR,
        }
    }

    pub fn players_at(&self, cell: CellIndex) -> impl Iterator<Item = (&str, &Marker)> {
        self.iter().filter(move |(_, marker)| marker.cell == cell)
    }
}

use pretty_assertions::assert_eq;
use ular_client::board::{BoardLayout, CellIndex, CellOffset, CellTable, NUM_CELLS, START_CELL};
use ular_client::config::ClientConfig;
use ular_client::marker::{FALLBACK_MARKER_COLOR, MarkerBoard, MarkerEvent};


#[test]
fn placement_is_inset_from_cell_offset() {
    let table = CellTable::default();
    assert_eq!(table.len(), NUM_CELLS as usize + 1);
    for n in 1..=NUM_CELLS {
        let cell = CellIndex(n);
        let offset = table.offset(cell).unwrap();
        let placement = table.marker_placement(cell).unwrap();
        assert_eq!(placement, CellOffset::new(offset.x + 5, offset.y + 5));
        // Placement is a pure function of the cell.
        assert_eq!(table.marker_placement(cell), Some(placement));
    }
}

#[test]
fn adding_twice_keeps_one_marker() {
    let mut board = MarkerBoard::new(CellTable::default());
    let events = board.add_player("P1", "red");
    assert_eq!(events, vec![
        MarkerEvent::Added { player: "P1".to_owned(), color: "red".to_owned() },
        MarkerEvent::Moved {
            player: "P1".to_owned(),
            cell: START_CELL,
            placement: CellOffset::new(-5, 115),
        },
    ]);
    board.move_player("P1", CellIndex(6)).unwrap();
    assert!(board.add_player("P1", "blue").is_empty());
    assert_eq!(board.len(), 1);
    // Re-adding doesn't reset the position.
    assert_eq!(board.get("P1").unwrap().cell, CellIndex(6));
}

#[test]
fn unknown_cell_leaves_marker_in_place() {
    let mut board = MarkerBoard::new(CellTable::default());
    board.add_player("P1", "red");
    board.move_player("P1", CellIndex(11)).unwrap();
    assert_eq!(board.move_player("P1", CellIndex(NUM_CELLS + 7)), None);
    assert_eq!(board.get("P1").unwrap().cell, CellIndex(11));
    assert_eq!(board.move_player("Nobody", CellIndex(3)), None);
    assert!(!board.contains("Nobody"));
}

#[test]
fn colors() {
    let mut board = MarkerBoard::new(CellTable::default());
    assert_eq!(board.color("P1"), FALLBACK_MARKER_COLOR);
    let events = board.add_player("P1", "");
    assert_eq!(events[0], MarkerEvent::Added { player: "P1".to_owned(), color: String::new() });
    assert_eq!(board.get("P1").unwrap().color, "");
    assert_eq!(board.color("P1"), FALLBACK_MARKER_COLOR);
    assert_eq!(board.set_color("P1", "green"), Some(MarkerEvent::Recolored {
        player: "P1".to_owned(),
        color: "green".to_owned(),
    }));
    assert_eq!(board.set_color("P1", "green"), None);
    assert_eq!(board.set_color("P1", ""), None);
    assert_eq!(board.color("P1"), "green");
}

#[test]
fn shared_cells_keep_insertion_order() {
    let mut board = MarkerBoard::new(CellTable::default());
    for player in ["C", "A", "B"] {
        board.add_player(player, "red");
    }
    board.move_player("A", CellIndex(2)).unwrap();
    let at_start: Vec<&str> = board.players_at(START_CELL).map(|(p, _)| p).collect();
    assert_eq!(at_start, vec!["C", "B"]);
}

#[test]
fn replacing_table_moves_markers() {
    let mut board = MarkerBoard::new(CellTable::default());
    board.add_player("P1", "red");
    board.add_player("P2", "blue");
    board.move_player("P2", CellIndex(2)).unwrap();
    let events = board.set_cell_table(CellTable::new(vec![
        CellOffset::new(0, 0),
        CellOffset::new(10, 10),
    ]));
    // P2 stands on a cell the new table doesn't know: nothing to draw.
    assert_eq!(events, vec![MarkerEvent::Moved {
        player: "P1".to_owned(),
        cell: START_CELL,
        placement: CellOffset::new(5, 5),
    }]);
    assert_eq!(board.get("P2").unwrap().cell, CellIndex(2));
}

#[test]
fn board_layout_covers_every_cell() {
    let layout = BoardLayout::new();
    let rows = layout.display_rows();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.len() == 7));
    assert_eq!(rows[3][0], CellIndex(1));
    assert_eq!(rows[0][0], CellIndex(28));
}

#[test]
fn config_from_yaml() {
    let config: ClientConfig = serde_yaml::from_str(
        "api_prefix: /ular/\npoll_interval: 2s 500ms\ndefault_topic: kimia\n",
    )
    .unwrap();
    assert_eq!(config.api_prefix, "/ular/");
    assert_eq!(config.poll_interval, std::time::Duration::from_millis(2500));
    assert_eq!(config.default_topic, "kimia");
    assert_eq!(config.max_box, 28);
    assert_eq!(config.default_color, "black");
}

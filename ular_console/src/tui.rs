// Improvement potential. Use `crossterm` styling instead of `console` for consistency with the
//   rest of the terminal code.

use console::Style;
use itertools::Itertools;
use ular_client::board::{BoardLayout, CellDecoration, CellIndex, START_CELL};
use ular_client::marker::MarkerBoard;
use ular_client::protocol::PlayerEntry;
use ular_client::view::QuestionView;


// Markers shown inside a cell before collapsing into "+".
const MAX_MARKERS_PER_CELL: usize = 3;

pub fn marker_style(color: &str) -> Style {
    let style = Style::new().bold();
    match color.trim().to_ascii_lowercase().as_str() {
        "red" => style.red(),
        "green" => style.green(),
        "blue" => style.blue(),
        "yellow" => style.yellow(),
        "magenta" | "purple" => style.magenta(),
        "cyan" => style.cyan(),
        "white" => style.white(),
        "black" => style.black().on_white(),
        "gray" | "grey" => style.dim(),
        _ => style,
    }
}

fn marker_glyph(player: &str) -> String {
    player.chars().next().map_or("?".to_owned(), |ch| ch.to_uppercase().collect())
}

fn render_markers(markers: &MarkerBoard, cell: CellIndex) -> (String, usize) {
    let here = markers.players_at(cell).collect_vec();
    let mut glyphs = here
        .iter()
        .take(MAX_MARKERS_PER_CELL)
        .map(|(player, marker)| {
            marker_style(markers.color(player)).apply_to(marker_glyph(player)).to_string()
        })
        .collect_vec();
    if here.len() > MAX_MARKERS_PER_CELL {
        glyphs.pop();
        glyphs.push("+".to_owned());
    }
    let width = glyphs.len();
    (glyphs.join(""), width)
}

fn render_cell(layout: &BoardLayout, markers: &MarkerBoard, cell: CellIndex) -> String {
    let number_style = match layout.decoration(cell) {
        CellDecoration::Plain => Style::new(),
        CellDecoration::Snake => Style::new().on_red(),
        CellDecoration::Ladder => Style::new().on_green(),
    };
    let (glyphs, width) = render_markers(markers, cell);
    let padding = " ".repeat(MAX_MARKERS_PER_CELL - width);
    format!("[{} {}{}]", number_style.apply_to(format!("{:>2}", cell.0)), glyphs, padding)
}

// Board as it looks in the browser: cell 28 top left, cell 1 bottom left. Tokens that haven't
// moved yet are listed under the board.
pub fn render_board(layout: &BoardLayout, markers: &MarkerBoard) -> String {
    let mut lines = layout
        .display_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|cell| render_cell(layout, markers, cell)).join(""))
        .collect_vec();
    let (waiting, _) = render_markers(markers, START_CELL);
    if !waiting.is_empty() {
        lines.push(format!("start: {}", waiting));
    }
    lines.join("\n")
}

pub fn render_players(players: &[PlayerEntry], turn: Option<&str>) -> String {
    players
        .iter()
        .map(|p| {
            let bullet = marker_style(&p.color).apply_to("•");
            let pos = p.pos.map_or("-".to_owned(), |pos| pos.to_string());
            let active = if turn == Some(p.player.as_str()) { " <" } else { "" };
            format!("  {} {} ({}){}", bullet, p.player, pos, active)
        })
        .join("\n")
}

pub fn render_question(question: &QuestionView) -> String {
    let mut lines = vec![
        Style::new().bold().apply_to(&question.question).to_string(),
        question.answerer.clone(),
    ];
    for (i, answer) in question.answers.iter().enumerate() {
        lines.push(format!("  {}) {}", i + 1, answer));
    }
    lines.join("\n")
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ular_client::board::CellTable;

    use super::*;

    fn plain(s: &str) -> String { console::strip_ansi_codes(s).into_owned() }

    #[test]
    fn board_shows_markers() {
        let layout = BoardLayout::new();
        let mut markers = MarkerBoard::new(CellTable::default());
        markers.add_player("ana", "red");
        markers.add_player("bo", "blue");
        markers.move_player("ana", CellIndex(28));
        let board = plain(&render_board(&layout, &markers));
        let lines = board.lines().collect_vec();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("[28 A  ][27    ]"));
        assert!(lines[3].starts_with("[ 1    ][ 2    ]"));
        assert_eq!(lines[4], "start: B");
    }

    #[test]
    fn crowded_cell() {
        let layout = BoardLayout::new();
        let mut markers = MarkerBoard::new(CellTable::default());
        for player in ["a", "b", "c", "d"] {
            markers.add_player(player, "");
            markers.move_player(player, CellIndex(1));
        }
        let board = plain(&render_board(&layout, &markers));
        assert!(board.lines().nth(3).unwrap().starts_with("[ 1 AB+]"));
    }

    #[test]
    fn players_list() {
        let players = vec![
            PlayerEntry { player: "ana".to_owned(), pos: Some(3), color: "red".to_owned() },
            PlayerEntry { player: "bo".to_owned(), pos: None, color: "".to_owned() },
        ];
        assert_eq!(plain(&render_players(&players, Some("bo"))), "  • ana (3)\n  • bo (-) <");
    }
}

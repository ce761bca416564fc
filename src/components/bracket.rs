use liga_api::{PlayoffBracket, PlayoffMatch, TeamDirectory};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Modifier, Style};
use tui::widgets::Widget;

use crate::components::theme::{Theme, Tint, resolve, team_style};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per match cell: home line, status line, away line.
pub const MATCH_HEIGHT: u16 = 3;

/// Slot heights per depth (0 = quarterfinals, 2 = final).
/// SH[0] = MATCH_HEIGHT; SH[d] = 2 * SH[d-1] + 1.
const SH: [u16; 3] = [
    MATCH_HEIGHT,                     // QF:     3
    2 * MATCH_HEIGHT + 1,             // SF:     7
    2 * (2 * MATCH_HEIGHT + 1) + 1,   // Final: 15
];

/// Rows consumed by the whole bracket.
pub const BRACKET_HEIGHT: u16 = SH[2];

/// Width of the connector zone between two stage columns.
pub const CONNECTOR_WIDTH: u16 = 3;

const CELL_W_FULL: u16 = 26;

// ---------------------------------------------------------------------------
// MatchCell
// ---------------------------------------------------------------------------

/// What a grid position shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSlot {
    /// Table leader waiting in sf1; drawn in the quarterfinal column.
    Bye,
    Match(&'static str),
}

#[derive(Debug, Clone)]
pub struct MatchCell {
    /// Row of the status line, relative to the bracket origin.
    pub center_row: u16,
    pub col: u16,
    pub cell_width: u16,
    pub depth: usize,
    pub slot: CellSlot,
}

/// Column-major cell order. Each parent at depth d+1 sits between cells 2j
/// and 2j+1 of depth d.
const SLOTS: [(usize, CellSlot); 7] = [
    (0, CellSlot::Bye),
    (0, CellSlot::Match("qf1")),
    (0, CellSlot::Match("qf2")),
    (0, CellSlot::Match("qf3")),
    (1, CellSlot::Match("sf1")),
    (1, CellSlot::Match("sf2")),
    (2, CellSlot::Match("final")),
];

// ---------------------------------------------------------------------------
// PlayoffGrid
// ---------------------------------------------------------------------------

/// Pre-computed layout for QF | conn | SF | conn | Final.
#[derive(Debug, Clone)]
pub struct PlayoffGrid {
    pub cells: Vec<MatchCell>,
    pub stage_cols: [u16; 3],
    pub total_width: u16,
    pub cell_width: u16,
}

impl PlayoffGrid {
    /// Three match columns and two connector columns:
    /// `3 * cell_width + 2 * CONNECTOR_WIDTH <= terminal_width`.
    ///
    /// Center rows follow center[d][i] = SH[d]/2 + i * (SH[d+1] - SH[d]):
    ///   QF    (d=0): [1, 5, 9, 13]  (row 1 is the bye)
    ///   SF    (d=1): [3, 11]
    ///   Final (d=2): [7]
    pub fn compute(terminal_width: u16) -> Self {
        let per_col = terminal_width.saturating_sub(CONNECTOR_WIDTH * 2) / 3;
        let cell_width = per_col.clamp(1, CELL_W_FULL);
        let stride = cell_width + CONNECTOR_WIDTH;
        let stage_cols = [0, stride, stride * 2];

        let first_center = [SH[0] / 2, SH[1] / 2, SH[2] / 2];
        let spacing = [SH[1] - SH[0], SH[2] - SH[1], 0];

        let mut index_in_depth = [0u16; 3];
        let cells = SLOTS
            .iter()
            .map(|&(depth, slot)| {
                let i = index_in_depth[depth];
                index_in_depth[depth] += 1;
                MatchCell {
                    center_row: first_center[depth] + i * spacing[depth],
                    col: stage_cols[depth],
                    cell_width,
                    depth,
                    slot,
                }
            })
            .collect();

        Self { cells, stage_cols, total_width: stride * 2 + cell_width, cell_width }
    }

    pub fn cells_for_depth(&self, depth: usize) -> &[MatchCell] {
        const OFFSETS: [usize; 4] = [0, 4, 6, 7];
        &self.cells[OFFSETS[depth]..OFFSETS[depth + 1]]
    }
}

// ---------------------------------------------------------------------------
// PlayoffView widget
// ---------------------------------------------------------------------------

pub struct PlayoffView<'a> {
    pub bracket: &'a PlayoffBracket,
    pub teams: &'a TeamDirectory,
    pub grid: &'a PlayoffGrid,
    /// Highlighted match id.
    pub selected: Option<&'a str>,
    pub scroll_offset: u16,
    pub theme: Theme,
}

impl Widget for PlayoffView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < MATCH_HEIGHT {
            return;
        }

        for cell in &self.grid.cells {
            self.draw_cell(cell, area, buf);
        }

        for depth in 0..2usize {
            let children = self.grid.cells_for_depth(depth);
            let parents = self.grid.cells_for_depth(depth + 1);
            let conn_x = area.x + self.grid.stage_cols[depth] + self.grid.cell_width;
            for (j, parent) in parents.iter().enumerate() {
                draw_connector(
                    children[2 * j].center_row,
                    parent.center_row,
                    children[2 * j + 1].center_row,
                    conn_x,
                    area,
                    self.scroll_offset,
                    self.theme,
                    buf,
                );
            }
        }
    }
}

impl PlayoffView<'_> {
    fn team_label(&self, team_id: Option<&str>) -> String {
        match team_id {
            Some(id) => self
                .teams
                .get(id)
                .map(|t| t.short_name.clone())
                .unwrap_or_else(|| id.to_owned()),
            None => "TBD".to_owned(),
        }
    }

    fn team_line_style(&self, team_id: Option<&str>, m: Option<&PlayoffMatch>) -> Style {
        let winner = m.and_then(|m| m.winner_id.as_deref());
        let is_winner = matches!((team_id, winner), (Some(t), Some(w)) if t == w);
        if is_winner {
            return resolve(Tint::Winner, self.theme);
        }
        let selected = m.is_some_and(|m| self.selected == Some(m.id.as_str()));
        let style = team_style(team_id.and_then(|id| self.teams.get(id)));
        if selected {
            style.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            style
        }
    }

    fn draw_cell(&self, cell: &MatchCell, area: Rect, buf: &mut Buffer) {
        let x = area.x + cell.col;
        if x >= area.x + area.width {
            return;
        }
        let avail_w = (area.x + area.width).saturating_sub(x) as usize;
        let width = cell.cell_width as usize;

        let rows: [(String, Style); 3] = match cell.slot {
            CellSlot::Bye => {
                let leader = self.bracket.find_match("sf1").and_then(|m| m.home_team_id.as_deref());
                [
                    (
                        format_team_line(&self.team_label(leader), None, None, width),
                        self.team_line_style(leader, None),
                    ),
                    (pad(" bye to SF1", width), resolve(Tint::Bye, self.theme)),
                    (" ".repeat(width), Style::default()),
                ]
            }
            CellSlot::Match(id) => {
                let Some(m) = self.bracket.find_match(id) else {
                    return;
                };
                let home = m.home_team_id.as_deref();
                let away = m.away_team_id.as_deref();
                let status_style = if self.selected == Some(id) {
                    resolve(Tint::Accent, self.theme)
                } else {
                    resolve(Tint::Dim, self.theme)
                };
                [
                    (
                        format_team_line(
                            &self.team_label(home),
                            m.home_score,
                            m.home_score_p,
                            width,
                        ),
                        self.team_line_style(home, Some(m)),
                    ),
                    (format_status_line(m, width), status_style),
                    (
                        format_team_line(
                            &self.team_label(away),
                            m.away_score,
                            m.away_score_p,
                            width,
                        ),
                        self.team_line_style(away, Some(m)),
                    ),
                ]
            }
        };

        let top_row = cell.center_row.saturating_sub(1);
        for (offset, (text, style)) in rows.into_iter().enumerate() {
            let Some(sy) = screen_y(top_row + offset as u16, self.scroll_offset, area) else {
                continue;
            };
            let clipped: String = text.chars().take(avail_w).collect();
            buf.set_string(x, sy, &clipped, style);
        }
    }
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

/// Bracket-relative row to absolute screen y. None when scrolled out.
fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

fn pad(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{clipped:<width$}")
}

/// `"[name          ] [score] [(pens)] "`, exactly `width` columns.
fn format_team_line(
    name: &str,
    score: Option<u16>,
    penalties: Option<u16>,
    width: usize,
) -> String {
    // name + " " + score(2) + " " + pens(3) + " "
    let name_w = width.saturating_sub(8);
    let name: String = name.chars().take(name_w).collect();
    let score = score.map(|s| s.to_string()).unwrap_or_default();
    let penalties = penalties.map(|p| format!("({p})")).unwrap_or_default();
    pad(&format!("{name:<name_w$} {score:>2} {penalties:>3} "), width)
}

fn format_status_line(m: &PlayoffMatch, width: usize) -> String {
    let state = if m.home_team_id.is_none() || m.away_team_id.is_none() {
        "waiting"
    } else if m.winner_id.is_some() {
        if m.home_score == m.away_score { "FT pens" } else { "FT" }
    } else if m.shootout_pending() {
        "level, pens?"
    } else {
        "-"
    };
    pad(&format!(" {} {state}", m.id.to_uppercase()), width)
}

/// Box-drawing connector from two children into their parent.
///
/// ```text
///  child_top  ──┐
///               │
///  parent     ──├──
///               │
///  child_bot  ──┘
/// ```
#[allow(clippy::too_many_arguments)]
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    conn_base_x: u16,
    area: Rect,
    scroll: u16,
    theme: Theme,
    buf: &mut Buffer,
) {
    let style = resolve(Tint::Dim, theme);
    let col_a = conn_base_x;
    let col_b = conn_base_x + 1;
    let col_c = conn_base_x + 2;
    let limit_x = area.x + area.width;

    let mut put = |x: u16, row: u16, ch: char| {
        if x < limit_x
            && let Some(sy) = screen_y(row, scroll, area)
        {
            put_char(buf, x, sy, ch, style);
        }
    };

    put(col_a, r_top, '─');
    put(col_b, r_top, '┐');
    for row in (r_top + 1)..r_mid {
        put(col_b, row, '│');
    }
    put(col_a, r_mid, '─');
    put(col_b, r_mid, '├');
    put(col_c, r_mid, '─');
    for row in (r_mid + 1)..r_bot {
        put(col_b, row, '│');
    }
    put(col_a, r_bot, '─');
    put(col_b, r_bot, '┘');
}

fn put_char(buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use liga_api::client::sample_season;
    use liga_api::{Scoreline, generate_playoff_bracket, update_playoff_bracket};

    fn centers(grid: &PlayoffGrid, depth: usize) -> Vec<u16> {
        grid.cells_for_depth(depth).iter().map(|c| c.center_row).collect()
    }

    #[test]
    fn test_slot_heights() {
        assert_eq!(SH, [3, 7, 15]);
        assert_eq!(BRACKET_HEIGHT, 15);
    }

    #[test]
    fn test_grid_has_bye_plus_six_matches() {
        let grid = PlayoffGrid::compute(80);
        assert_eq!(grid.cells.len(), 7);
        assert_eq!(grid.cells[0].slot, CellSlot::Bye);
        let ids: Vec<CellSlot> = grid.cells[1..].iter().map(|c| c.slot).collect();
        assert_eq!(
            ids,
            ["qf1", "qf2", "qf3", "sf1", "sf2", "final"].map(CellSlot::Match).to_vec()
        );
    }

    #[test]
    fn test_center_rows() {
        let grid = PlayoffGrid::compute(80);
        assert_eq!(centers(&grid, 0), vec![1, 5, 9, 13]);
        assert_eq!(centers(&grid, 1), vec![3, 11]);
        assert_eq!(centers(&grid, 2), vec![7]);
        for depth in 0..3usize {
            assert!(grid.cells_for_depth(depth).iter().all(|c| c.depth == depth));
        }
    }

    #[test]
    fn test_parent_center_is_midpoint_of_children() {
        let grid = PlayoffGrid::compute(80);
        for depth in 0..2usize {
            let children = grid.cells_for_depth(depth);
            for (j, parent) in grid.cells_for_depth(depth + 1).iter().enumerate() {
                let mid = (children[2 * j].center_row + children[2 * j + 1].center_row) / 2;
                assert_eq!(parent.center_row, mid, "depth={depth} parent={j}");
            }
        }
    }

    #[test]
    fn test_cell_width_follows_terminal_and_caps() {
        let grid = PlayoffGrid::compute(66);
        assert_eq!(grid.cell_width, 20);
        assert_eq!(grid.stage_cols, [0, 23, 46]);
        assert_eq!(grid.total_width, 66);
        assert_eq!(PlayoffGrid::compute(300).cell_width, CELL_W_FULL);
    }

    #[test]
    fn test_team_line_width() {
        let line = format_team_line("Estrela", Some(3), Some(4), 20);
        assert_eq!(line.chars().count(), 20, "line: {line:?}");
        assert!(line.contains("(4)"));

        let long = format_team_line("A Very Long Club Name Indeed", None, None, 14);
        assert_eq!(long.chars().count(), 14, "line: {long:?}");
    }

    #[test]
    fn test_status_line_states() {
        let season = sample_season().unwrap();
        let bracket = generate_playoff_bracket(&season.standings(), &season.teams).unwrap();
        assert!(format_status_line(bracket.find_match("sf2").unwrap(), 20).contains("waiting"));

        let bracket = update_playoff_bracket(&bracket, "qf1", Scoreline::regulation(1, 1)).unwrap();
        assert!(format_status_line(bracket.find_match("qf1").unwrap(), 20).contains("pens?"));

        let scoreline = Scoreline::regulation(1, 1).with_penalties(3, 2);
        let bracket = update_playoff_bracket(&bracket, "qf1", scoreline).unwrap();
        assert!(format_status_line(bracket.find_match("qf1").unwrap(), 20).contains("FT pens"));
    }

    #[test]
    fn test_render_draws_connectors_and_leader() {
        let season = sample_season().unwrap();
        let table = season.standings();
        let bracket = generate_playoff_bracket(&table, &season.teams).unwrap();
        let grid = PlayoffGrid::compute(80);
        let area = Rect::new(0, 0, 80, BRACKET_HEIGHT);
        let mut buf = Buffer::empty(area);

        PlayoffView {
            bracket: &bracket,
            teams: &season.teams,
            grid: &grid,
            selected: Some("qf1"),
            scroll_offset: 0,
            theme: Theme::Dark,
        }
        .render(area, &mut buf);

        let cw = grid.cell_width;
        assert_eq!(buf[(cw + 1, 3)].symbol(), "├", "sf1 joins bye and qf1");
        assert_eq!(buf[(cw + 1, 11)].symbol(), "├", "sf2 joins qf2 and qf3");
        assert_eq!(buf[(grid.stage_cols[1] + cw + 1, 7)].symbol(), "├", "final joins the semis");

        let leader = &season.teams[&table[0].team_id].short_name;
        let first_row: String = (0..cw).map(|x| buf[(x, 0)].symbol()).collect();
        assert!(first_row.starts_with(leader.as_str()), "row 0: {first_row:?}");
    }
}

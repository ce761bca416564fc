use chrono::Local;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BRACKET_HEIGHT, PlayoffGrid, PlayoffView};
use crate::components::theme::{Theme, Tint, legend_style, resolve, team_style};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use liga_api::{Match, PlayoffStage, PositionLegend, Season, Standing};

static TABS: &[&str; 3] = &["Standings", "Fixtures", "Playoffs"];

const HELP_LINES: [(&str, &str); 17] = [
    ("1 / 2 / 3", "Standings / Fixtures / Playoffs"),
    ("?  Esc", "help, back"),
    ("h/l  ←/→", "fixtures: previous / next round"),
    ("j/k  ↑/↓", "select match"),
    ("a / z", "home score +1 / -1"),
    ("s / x", "away score +1 / -1"),
    ("p / P", "playoffs: home penalties +1 / -1"),
    ("o / O", "playoffs: away penalties +1 / -1"),
    ("Backspace", "clear the selected result"),
    ("g", "playoffs: reseed from the current table"),
    ("R", "reset the simulation (drops saved edits)"),
    ("r", "reload season data"),
    ("f", "full screen"),
    ("\"", "toggle log pane"),
    ("q", "quit"),
    ("", ""),
    ("", "Edits are saved per season under $XDG_CONFIG_HOME/ligatui/"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Standings => draw_standings(f, layout.main, app),
            MenuItem::Fixtures => draw_fixtures(f, layout.main, app),
            MenuItem::Playoffs => draw_playoffs(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_for = |item: MenuItem| match item {
        MenuItem::Standings => 0,
        MenuItem::Fixtures => 1,
        MenuItem::Playoffs => 2,
        MenuItem::Help => 0,
    };
    let tab_index = if app.state.active_tab == MenuItem::Help {
        tab_for(app.state.previous_tab)
    } else {
        tab_for(app.state.active_tab)
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let season_name = app
        .state
        .season
        .season
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or("no season");
    let help = Paragraph::new(format!("{season_name}  ? "))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Shown while no season is loaded.
fn draw_waiting(f: &mut Frame, area: Rect, app: &App) {
    let msg = if let Some(err) = app.state.last_error.as_deref() {
        format!("Season load failed:\n{err}\n\nPress r to retry")
    } else {
        "Loading season data...".to_string()
    };
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

/// Last error, or the key reminder for the current tab.
fn footer_line<'a>(app: &App, keys: &'a str) -> Line<'a> {
    match app.state.last_error.as_deref() {
        Some(err) => Line::from(Span::styled(format!("! {err}"), Style::default().fg(Color::Red))),
        None => Line::from(Span::styled(keys, Style::default().fg(Color::DarkGray))),
    }
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

fn draw_standings(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Standings ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(season) = app.state.season.season.as_ref() else {
        draw_waiting(f, inner, app);
        return;
    };

    let [table_area, legend_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(2)]).areas(inner);

    let name_w = (table_area.width as usize).saturating_sub(40).clamp(8, 28);
    let mut lines = Vec::with_capacity(app.state.season.standings.len() + 1);
    lines.push(Line::from(Span::styled(
        format!(
            "{:>3}  {:<name_w$} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
            "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
        ),
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
    )));

    for (idx, row) in app.state.season.standings.iter().enumerate() {
        lines.push(standing_line(idx + 1, row, season, name_w));
    }

    f.render_widget(Paragraph::new(lines), table_area);

    let theme = Theme::Dark;
    let legend = Line::from(vec![
        Span::styled(
            format!("■ {}  ", PositionLegend::Semifinal.label()),
            legend_style(Some(PositionLegend::Semifinal), theme),
        ),
        Span::styled(
            format!("■ {}  ", PositionLegend::Quarterfinal.label()),
            legend_style(Some(PositionLegend::Quarterfinal), theme),
        ),
        Span::styled(
            format!("{} edited results", app.league_edit_count()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(vec![Line::from(""), legend]), legend_area);
}

fn standing_line<'a>(position: usize, row: &Standing, season: &Season, name_w: usize) -> Line<'a> {
    let name: String = row.name.chars().take(name_w).collect();
    Line::from(vec![
        Span::styled(format!("{position:>3}  "), legend_style(row.position_legend, Theme::Dark)),
        Span::styled(format!("{name:<name_w$}"), team_style(season.teams.get(&row.team_id))),
        Span::raw(format!(
            " {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4}",
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.goals_for,
            row.goals_against,
            row.goal_difference
        )),
        Span::styled(
            format!(" {:>4}", row.points),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn draw_fixtures(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Fixtures ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(season) = app.state.season.season.as_ref() else {
        draw_waiting(f, inner, app);
        return;
    };

    let [header, content, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let Some(round) = app.state.season.current_round() else {
        f.render_widget(Paragraph::new("No rounds published"), content);
        return;
    };

    let round_state = if round.ended { "ended" } else { "open" };
    f.render_widget(
        Paragraph::new(format!(
            "{} ({}/{}) | {round_state}",
            round.name,
            app.state.season.selected_round + 1,
            season.rounds.len()
        )),
        header,
    );

    let lines: Vec<Line> = round
        .matches
        .iter()
        .enumerate()
        .map(|(idx, m)| fixture_line(m, season, idx == app.state.season.selected_match))
        .collect();
    f.render_widget(Paragraph::new(lines), content);

    f.render_widget(
        Paragraph::new(footer_line(
            app,
            "h/l round  j/k match  a/z home ±1  s/x away ±1  Backspace clear  R reset",
        )),
        footer,
    );
}

fn fixture_line<'a>(m: &Match, season: &Season, selected: bool) -> Line<'a> {
    let marker = if selected { "> " } else { "  " };
    let date = m
        .date
        .map(|d| d.with_timezone(&Local).format("%a %d/%m %H:%M").to_string())
        .unwrap_or_else(|| "date tbc".to_string());
    let score = match (m.home_score, m.away_score) {
        (Some(h), Some(a)) => format!("{h:>2} - {a:<2}"),
        _ => " -  - ".to_string(),
    };
    let base = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let home = season.team_name(&m.home_team_id);
    let away = season.team_name(&m.away_team_id);
    let home_style = team_style(season.teams.get(&m.home_team_id)).patch(base);
    let away_style = team_style(season.teams.get(&m.away_team_id)).patch(base);

    Line::from(vec![
        Span::styled(marker, base.fg(Color::Yellow)),
        Span::styled(format!("{date:<16} "), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{home:>14} "), home_style),
        Span::styled(score, base.fg(Color::White)),
        Span::styled(format!(" {away:<14}"), away_style),
        Span::styled(format!("  [{}]", m.status.label()), Style::default().fg(Color::DarkGray)),
    ])
}

// ---------------------------------------------------------------------------
// Playoffs
// ---------------------------------------------------------------------------

fn draw_playoffs(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Playoffs ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(season) = app.state.season.season.as_ref() else {
        draw_waiting(f, inner, app);
        return;
    };

    let Some(bracket) = app.state.playoffs.bracket.as_ref() else {
        let msg = app
            .state
            .playoffs
            .seeding_error
            .clone()
            .unwrap_or_else(|| "No bracket yet. Press g to seed from the table.".to_string());
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let [header, content, champion_area, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(BRACKET_HEIGHT),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .areas(inner);

    let grid = PlayoffGrid::compute(content.width);
    let x_pad = content.width.saturating_sub(grid.total_width) / 2;
    let bracket_area = Rect::new(
        content.x + x_pad,
        content.y,
        grid.total_width.min(content.width),
        content.height,
    );

    let stages = std::iter::successors(Some(PlayoffStage::Quarterfinal), |s| s.next());
    for (stage, col) in stages.zip(grid.stage_cols) {
        let x = bracket_area.x + col;
        if x >= header.x + header.width {
            continue;
        }
        let w = grid.cell_width.min(header.x + header.width - x);
        f.render_widget(
            Paragraph::new(stage.label()).style(resolve(Tint::Accent, Theme::Dark)),
            Rect::new(x, header.y, w, 1),
        );
    }

    let selected = app.state.playoffs.selected_match_id();
    f.render_widget(
        PlayoffView {
            bracket,
            teams: &season.teams,
            grid: &grid,
            selected: selected.as_deref(),
            scroll_offset: 0,
            theme: Theme::Dark,
        },
        bracket_area,
    );

    let champion = match bracket.champion() {
        Some(id) => Line::from(vec![
            Span::raw("Champion: "),
            Span::styled(season.team_name(id), resolve(Tint::Winner, Theme::Dark)),
        ]),
        None => Line::from(Span::styled(
            "Champion: to be decided",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(
        Paragraph::new(vec![Line::from(""), champion]).alignment(Alignment::Center),
        champion_area,
    );

    f.render_widget(
        Paragraph::new(footer_line(
            app,
            "j/k match  a/z s/x score  p/P o/O penalties  Backspace clear  g reseed",
        )),
        footer,
    );
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{keys:>12}  "), resolve(Tint::Accent, Theme::Dark)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(3), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

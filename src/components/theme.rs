use liga_api::{PositionLegend, Team};
use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tint {
    Primary,
    Accent,
    Dim,
    Winner,
    Bye,
    Qualified,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Theme {
    #[default]
    Dark,
}

pub fn resolve(tint: Tint, _theme: Theme) -> Style {
    match tint {
        Tint::Primary => Style::default().fg(Color::Rgb(0, 150, 110)),
        Tint::Accent => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Tint::Dim => Style::default().fg(Color::Indexed(240)),
        Tint::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Tint::Bye => Style::default().fg(Color::Rgb(255, 176, 59)),
        Tint::Qualified => Style::default().fg(Color::Cyan),
    }
}

/// Row colour for a table position.
pub fn legend_style(legend: Option<PositionLegend>, theme: Theme) -> Style {
    match legend {
        Some(PositionLegend::Semifinal) => resolve(Tint::Bye, theme),
        Some(PositionLegend::Quarterfinal) => resolve(Tint::Qualified, theme),
        None => Style::default().fg(Color::Gray),
    }
}

/// Team name in the club's primary colour, when it has a usable one.
pub fn team_style(team: Option<&Team>) -> Style {
    team.and_then(|t| t.colors.primary.as_deref())
        .and_then(parse_hex)
        .map(|c| Style::default().fg(c))
        .unwrap_or_else(|| Style::default().fg(Color::Gray))
}

/// `#rrggbb` or `#rgb`, leading `#` optional.
pub fn parse_hex(raw: &str) -> Option<Color> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => format!("#{hex}").parse::<Color>().ok(),
        3 => {
            let short = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some(Color::Rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liga_api::TeamColors;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(parse_hex("#1d4e89"), Some(Color::Rgb(0x1d, 0x4e, 0x89)));
        assert_eq!(parse_hex("FFF"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex("#f0a"), Some(Color::Rgb(255, 0, 170)));
        assert_eq!(parse_hex(" 00FF7f "), Some(Color::Rgb(0, 255, 127)));
    }

    #[test]
    fn rejects_bad_hex() {
        assert_eq!(parse_hex("blue"), None);
        assert_eq!(parse_hex("12"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#ééé"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn team_style_falls_back_to_gray() {
        let mut team = Team::default();
        assert_eq!(team_style(Some(&team)).fg, Some(Color::Gray));
        assert_eq!(team_style(None).fg, Some(Color::Gray));

        team.colors = TeamColors { primary: Some("#00ff00".into()), secondary: None };
        assert_eq!(team_style(Some(&team)).fg, Some(Color::Rgb(0, 255, 0)));
    }

    #[test]
    fn legend_colours_differ() {
        let bye = legend_style(Some(PositionLegend::Semifinal), Theme::Dark);
        let qf = legend_style(Some(PositionLegend::Quarterfinal), Theme::Dark);
        let out = legend_style(None, Theme::Dark);
        assert_ne!(bye, qf);
        assert_ne!(qf, out);
    }
}

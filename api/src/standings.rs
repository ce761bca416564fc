use crate::{PositionLegend, Round, Standing, TeamDirectory};
use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Table positions that qualify for the playoffs: index 0 gets the semifinal
/// bye, indices 1..=6 play the quarterfinals.
pub const PLAYOFF_SPOTS: usize = 7;

/// Rank every team from the played matches in `rounds`.
///
/// `seed` only contributes identity (name, short name, logo); its counters and
/// legend are discarded. Teams missing from both `seed` and `teams` get a
/// placeholder name instead of failing the whole table.
pub fn calculate_standings(
    rounds: &[Round],
    teams: &TeamDirectory,
    seed: &[Standing],
) -> Vec<Standing> {
    let mut table: HashMap<String, Standing> = seed
        .iter()
        .map(|s| {
            let entry = Standing {
                team_id: s.team_id.clone(),
                name: s.name.clone(),
                short_name: s.short_name.clone(),
                logo_url: s.logo_url.clone(),
                ..Standing::default()
            };
            (s.team_id.clone(), entry)
        })
        .collect();

    for m in rounds.iter().flat_map(|r| r.matches.iter()) {
        let (Some(home_goals), Some(away_goals)) = (m.home_score, m.away_score) else {
            continue;
        };
        let (home_goals, away_goals) = (u32::from(home_goals), u32::from(away_goals));

        let home = entry_for(&mut table, &m.home_team_id, teams);
        home.played += 1;
        home.goals_for += home_goals;
        home.goals_against += away_goals;
        match home_goals.cmp(&away_goals) {
            Ordering::Greater => {
                home.won += 1;
                home.points += 3;
            }
            Ordering::Less => home.lost += 1,
            Ordering::Equal => {
                home.drawn += 1;
                home.points += 1;
            }
        }

        let away = entry_for(&mut table, &m.away_team_id, teams);
        away.played += 1;
        away.goals_for += away_goals;
        away.goals_against += home_goals;
        match away_goals.cmp(&home_goals) {
            Ordering::Greater => {
                away.won += 1;
                away.points += 3;
            }
            Ordering::Less => away.lost += 1,
            Ordering::Equal => {
                away.drawn += 1;
                away.points += 1;
            }
        }
    }

    let mut standings: Vec<Standing> = table
        .into_values()
        .map(|mut s| {
            s.goal_difference = s.goals_for as i32 - s.goals_against as i32;
            s
        })
        .collect();
    standings.sort_by(compare_standings);

    for (idx, s) in standings.iter_mut().enumerate() {
        s.position_legend = legend_for_position(idx);
    }
    standings
}

/// Points, goal difference and goals scored (all descending), then name.
/// Team id breaks the tie between two identically named entries so the order
/// stays total.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

pub fn legend_for_position(index: usize) -> Option<PositionLegend> {
    match index {
        0 => Some(PositionLegend::Semifinal),
        i if i < PLAYOFF_SPOTS => Some(PositionLegend::Quarterfinal),
        _ => None,
    }
}

fn entry_for<'a>(
    table: &'a mut HashMap<String, Standing>,
    team_id: &str,
    teams: &TeamDirectory,
) -> &'a mut Standing {
    table.entry(team_id.to_owned()).or_insert_with(|| {
        let (name, short_name, logo_url) = match teams.get(team_id) {
            Some(team) => (team.name.clone(), team.short_name.clone(), team.logo_url.clone()),
            None => {
                debug!("team {team_id} missing from directory, using placeholder");
                (format!("Team {team_id}"), team_id.to_owned(), None)
            }
        };
        Standing {
            team_id: team_id.to_owned(),
            name,
            short_name,
            logo_url,
            ..Standing::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Match, Team};

    fn played(id: &str, home: &str, away: &str, score: (u16, u16)) -> Match {
        Match {
            id: id.into(),
            round_id: "r1".into(),
            home_team_id: home.into(),
            away_team_id: away.into(),
            home_score: Some(score.0),
            away_score: Some(score.1),
            ..Default::default()
        }
    }

    fn team(id: &str, name: &str) -> (String, Team) {
        (
            id.to_owned(),
            Team {
                id: id.into(),
                name: name.into(),
                short_name: name.into(),
                ..Default::default()
            },
        )
    }

    fn directory() -> TeamDirectory {
        [
            team("ana", "Anadia"),
            team("bra", "Braga Velha"),
            team("cas", "Castelo"),
            team("dou", "Douro"),
        ]
        .into_iter()
        .collect()
    }

    fn round(matches: Vec<Match>) -> Round {
        Round {
            id: "r1".into(),
            name: "Round 1".into(),
            ended: true,
            matches,
        }
    }

    fn find<'a>(table: &'a [Standing], id: &str) -> &'a Standing {
        table.iter().find(|s| s.team_id == id).expect("team in table")
    }

    #[test]
    fn win_draw_and_loss_are_scored() {
        let rounds = vec![round(vec![
            played("m1", "ana", "bra", (2, 0)),
            played("m2", "cas", "dou", (1, 1)),
        ])];
        let table = calculate_standings(&rounds, &directory(), &[]);

        let ana = find(&table, "ana");
        assert_eq!((ana.points, ana.won, ana.played), (3, 1, 1));
        assert_eq!((ana.goals_for, ana.goals_against, ana.goal_difference), (2, 0, 2));

        let bra = find(&table, "bra");
        assert_eq!((bra.points, bra.lost, bra.goal_difference), (0, 1, -2));

        for id in ["cas", "dou"] {
            let s = find(&table, id);
            assert_eq!((s.points, s.drawn, s.played), (1, 1, 1));
        }
    }

    #[test]
    fn unplayed_matches_are_skipped() {
        let mut pending = played("m2", "cas", "dou", (0, 0));
        pending.home_score = None;
        let rounds = vec![round(vec![played("m1", "ana", "bra", (1, 0)), pending])];

        let table = calculate_standings(&rounds, &directory(), &[]);
        assert_eq!(table.len(), 2, "teams only appear once they have played");
    }

    #[test]
    fn seed_keeps_identity_but_not_counters_or_legend() {
        let seed = vec![Standing {
            team_id: "dou".into(),
            name: "Douro SC".into(),
            short_name: "DOU".into(),
            logo_url: Some("https://img.example/dou.png".into()),
            points: 40,
            won: 13,
            played: 14,
            position_legend: Some(PositionLegend::Semifinal),
            ..Default::default()
        }];
        let rounds = vec![round(vec![played("m1", "ana", "dou", (3, 1))])];

        let table = calculate_standings(&rounds, &directory(), &seed);
        let dou = find(&table, "dou");
        assert_eq!(dou.name, "Douro SC");
        assert_eq!(dou.logo_url.as_deref(), Some("https://img.example/dou.png"));
        assert_eq!((dou.points, dou.played, dou.lost), (0, 1, 1));
        assert_eq!(dou.position_legend, Some(PositionLegend::Quarterfinal));
        assert_eq!(table[0].team_id, "ana");
    }

    #[test]
    fn unknown_team_gets_placeholder() {
        let rounds = vec![round(vec![played("m1", "ana", "zzz", (0, 1))])];
        let table = calculate_standings(&rounds, &directory(), &[]);

        let ghost = find(&table, "zzz");
        assert_eq!(ghost.name, "Team zzz");
        assert_eq!(ghost.points, 3);
    }

    #[test]
    fn tie_breaks_follow_goal_difference_then_goals_then_name() {
        // Everyone on 3 points.
        let rounds = vec![round(vec![
            played("m1", "ana", "bra", (3, 0)),
            played("m2", "bra", "cas", (4, 2)),
            played("m3", "cas", "dou", (2, 1)),
            played("m4", "dou", "ana", (2, 1)),
        ])];
        let table = calculate_standings(&rounds, &directory(), &[]);
        let order: Vec<&str> = table.iter().map(|s| s.team_id.as_str()).collect();
        // ana +2, dou 0, then bra and cas level on -1 with 4 scored: name decides.
        assert_eq!(order, vec!["ana", "dou", "bra", "cas"]);
    }

    #[test]
    fn legend_follows_new_position() {
        assert_eq!(legend_for_position(0), Some(PositionLegend::Semifinal));
        assert_eq!(legend_for_position(1), Some(PositionLegend::Quarterfinal));
        assert_eq!(legend_for_position(6), Some(PositionLegend::Quarterfinal));
        assert_eq!(legend_for_position(7), None);
    }

    #[test]
    fn identical_names_still_order_deterministically() {
        let twins: TeamDirectory = [team("b", "Same"), team("a", "Same")].into_iter().collect();
        let rounds = vec![round(vec![played("m1", "a", "b", (0, 0))])];
        let first = calculate_standings(&rounds, &twins, &[]);
        let second = calculate_standings(&rounds, &twins, &[]);
        assert_eq!(first, second);
        assert_eq!(first[0].team_id, "a");
    }

    #[test]
    fn results_are_conserved() {
        let rounds = vec![
            round(vec![
                played("m1", "ana", "bra", (2, 0)),
                played("m2", "cas", "dou", (1, 1)),
            ]),
            round(vec![
                played("m3", "bra", "cas", (0, 0)),
                played("m4", "dou", "ana", (3, 2)),
            ]),
        ];
        let table = calculate_standings(&rounds, &directory(), &[]);

        let won: u32 = table.iter().map(|s| s.won).sum();
        let lost: u32 = table.iter().map(|s| s.lost).sum();
        let drawn: u32 = table.iter().map(|s| s.drawn).sum();
        assert_eq!(won, 2);
        assert_eq!(lost, 2);
        assert_eq!(drawn, 4);

        for pair in table.windows(2) {
            assert_ne!(compare_standings(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}

use hexfront_protocol::{Event, Team, VictoryReason};

use crate::state::{GameState, GameStatus};

/// Elimination first (Red checked before Blue), then control of every city on the board.
pub fn check_winner(state: &GameState) -> Option<(Team, VictoryReason)> {
    for loser in [Team::Red, Team::Blue] {
        if state.units_of(loser).next().is_none() {
            return Some((loser.opponent(), VictoryReason::Elimination));
        }
    }

    let mut owners = state.board.cities().map(|(_, city)| city.owner);
    let first = owners.next()??;
    if owners.all(|owner| owner == Some(first)) {
        return Some((first, VictoryReason::CityControl));
    }
    None
}

/// Moves a still-running game to `GameOver` when a winner exists.
pub fn update_status(state: &mut GameState) -> Option<Event> {
    if state.status.is_over() {
        return None;
    }
    let (winner, reason) = check_winner(state)?;
    state.status = GameStatus::GameOver { winner, reason };
    state.selected_unit = None;
    tracing::info!(winner = %winner, reason = ?reason, turn = state.turn, "game over");
    Some(Event::GameEnded { winner, reason })
}

#[cfg(test)]
mod tests {
    use hexfront_protocol::{Hex, Terrain, UnitId, UnitType};

    use super::*;
    use crate::board::{Board, Tile};
    use crate::rules::{load_rules, RulesSource};
    use crate::unit::Unit;

    fn state_with(units: &[(u32, Team)], cities: &[Option<Team>]) -> GameState {
        let rules = load_rules(RulesSource::Embedded).expect("rules load");
        let mut board = Board::hexagon(4, Terrain::Plains);
        for (i, owner) in cities.iter().enumerate() {
            board.set(Tile::city(Hex::new(i as i32, -2), *owner, 10));
        }
        GameState::new(
            board,
            units.iter().enumerate().map(|(i, &(id, team))| {
                Unit::from_rules(UnitId(id), UnitType::Infantry, team, Hex::new(i as i32, 2), &rules)
            }),
        )
    }

    #[test]
    fn elimination_wins() {
        let state = state_with(&[(1, Team::Blue)], &[Some(Team::Red)]);
        assert_eq!(
            check_winner(&state),
            Some((Team::Blue, VictoryReason::Elimination))
        );
    }

    #[test]
    fn red_elimination_is_checked_first() {
        let state = state_with(&[], &[]);
        assert_eq!(
            check_winner(&state),
            Some((Team::Blue, VictoryReason::Elimination))
        );
    }

    #[test]
    fn owning_every_city_wins() {
        let state = state_with(
            &[(1, Team::Blue), (2, Team::Red)],
            &[Some(Team::Red), Some(Team::Red)],
        );
        assert_eq!(
            check_winner(&state),
            Some((Team::Red, VictoryReason::CityControl))
        );
    }

    #[test]
    fn split_or_neutral_cities_do_not_win() {
        let units = [(1, Team::Blue), (2, Team::Red)];
        assert_eq!(check_winner(&state_with(&units, &[])), None);
        assert_eq!(
            check_winner(&state_with(&units, &[Some(Team::Red), None])),
            None
        );
        assert_eq!(
            check_winner(&state_with(&units, &[None, None])),
            None
        );
        assert_eq!(
            check_winner(&state_with(&units, &[Some(Team::Blue), Some(Team::Red)])),
            None
        );
    }

    #[test]
    fn status_is_set_once() {
        let mut state = state_with(&[(1, Team::Red)], &[]);
        assert_eq!(
            update_status(&mut state),
            Some(Event::GameEnded {
                winner: Team::Red,
                reason: VictoryReason::Elimination
            })
        );
        assert_eq!(state.status.winner(), Some(Team::Red));
        assert_eq!(update_status(&mut state), None);
    }
}

//! Control tracking and victory evaluation.
//!
//! Three independent ways to end the game:
//! - control: hold every key junction for `control_threshold` consecutive
//!   round boundaries;
//! - decapitation: capture a command node (checked inline after a battle);
//! - influence: once the turn limit is passed, the higher influence score
//!   wins, equal scores draw.

use crate::board::{
    BattleOutcome, BattleReport, Faction, GameResult, GameState, NodeKind, Verdict,
    VictoryCondition, ALL_FACTIONS,
};

/// Influence weight applied to per-turn node income.
pub const INCOME_WEIGHT: u32 = 5;
/// Influence weight applied to the deployment cost of owned units.
pub const UNIT_WEIGHT: u32 = 1;

/// Advances the key-junction control streaks by one round boundary.
///
/// The holder's streak grows by one and the other side's resets; a neutral
/// junction resets both.
pub fn update_control(state: &mut GameState) {
    let junctions = state.key_junctions.clone();
    for kj in &junctions {
        let holder = state.node(kj).and_then(|n| n.owner);
        for player in state.players.values_mut() {
            let streak = player.control_streaks.entry(kj.clone()).or_insert(0);
            if holder == Some(player.faction) {
                *streak += 1;
            } else {
                *streak = 0;
            }
        }
    }
}

/// Returns the faction whose streak has reached the threshold on every key
/// junction. A map without key junctions, or a zero threshold, never
/// produces a control winner.
pub fn control_winner(state: &GameState) -> Option<Faction> {
    let threshold = state.rules.control_threshold;
    if state.key_junctions.is_empty() || threshold == 0 {
        return None;
    }
    ALL_FACTIONS.into_iter().find(|&faction| {
        state.player(faction).is_some_and(|p| {
            state
                .key_junctions
                .iter()
                .all(|kj| p.streak(kj) >= threshold)
        })
    })
}

/// Banked resources + 5 x owned income + 1 x cost of owned units.
pub fn influence(state: &GameState, faction: Faction) -> u32 {
    let banked = state.resources(faction);
    let income = super::economy::income(state, faction);
    let army: u32 = state
        .units_of(faction)
        .map(|u| u.unit_type.cost())
        .fold(0u32, u32::saturating_add);
    banked
        .saturating_add(income.saturating_mul(INCOME_WEIGHT))
        .saturating_add(army.saturating_mul(UNIT_WEIGHT))
}

/// Scores both factions and declares the higher one, or a draw.
pub fn influence_verdict(state: &GameState) -> GameResult {
    let blue = influence(state, Faction::Blue);
    let red = influence(state, Faction::Red);
    let verdict = match blue.cmp(&red) {
        std::cmp::Ordering::Greater => Verdict::Victory(Faction::Blue),
        std::cmp::Ordering::Less => Verdict::Victory(Faction::Red),
        std::cmp::Ordering::Equal => Verdict::Draw,
    };
    let outcome = match verdict {
        Verdict::Victory(f) => format!("{} wins on influence", f),
        Verdict::Draw => "Draw on influence".to_string(),
    };
    GameResult {
        verdict,
        condition: VictoryCondition::Influence,
        message: format!(
            "Turn limit {} passed. {}: Blue {} vs Red {}",
            state.rules.turn_limit, outcome, blue, red
        ),
    }
}

/// Runs the round-boundary evaluation on a freshly incremented turn:
/// update streaks, then check control, then the turn limit.
pub fn evaluate_round(state: &mut GameState) -> Option<GameResult> {
    update_control(state);

    if let Some(faction) = control_winner(state) {
        return Some(GameResult {
            verdict: Verdict::Victory(faction),
            condition: VictoryCondition::Control,
            message: format!(
                "{} held every key junction for {} consecutive rounds",
                faction, state.rules.control_threshold
            ),
        });
    }

    if state.turn > state.rules.turn_limit {
        return Some(influence_verdict(state));
    }

    None
}

/// Checks a just-applied battle for the capture of a command node.
pub fn decapitation(state: &GameState, report: &BattleReport) -> Option<GameResult> {
    if report.outcome != BattleOutcome::AttackerWins || !report.node_captured {
        return None;
    }
    let node = state.node(&report.target)?;
    if node.kind != NodeKind::Command {
        return None;
    }
    Some(GameResult {
        verdict: Verdict::Victory(report.attacker),
        condition: VictoryCondition::Decapitation,
        message: format!("{} captured {}", report.attacker, node.name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MapTemplate, NodeId, NodeTemplate};
    use crate::config::GameConfig;

    fn standard() -> GameState {
        MapTemplate::standard().build(&GameConfig::default()).unwrap()
    }

    fn give(state: &mut GameState, node: &str, owner: Option<Faction>) {
        if let Some(n) = state.nodes.get_mut(&NodeId::new(node)) {
            n.owner = owner;
        }
    }

    #[test]
    fn holder_streak_grows_and_other_resets() {
        let mut state = standard();
        let north = NodeId::new("north_junction");
        if let Some(p) = state.players.get_mut(&Faction::Red) {
            p.control_streaks.insert(north.clone(), 3);
        }
        give(&mut state, "north_junction", Some(Faction::Blue));
        update_control(&mut state);
        assert_eq!(state.player(Faction::Blue).unwrap().streak(&north), 1);
        assert_eq!(state.player(Faction::Red).unwrap().streak(&north), 0);
    }

    #[test]
    fn neutral_junction_resets_both() {
        let mut state = standard();
        let south = NodeId::new("south_junction");
        for p in state.players.values_mut() {
            p.control_streaks.insert(south.clone(), 2);
        }
        update_control(&mut state);
        for p in state.players.values() {
            assert_eq!(p.streak(&south), 0);
        }
    }

    #[test]
    fn control_victory_needs_the_full_threshold() {
        let mut state = standard();
        give(&mut state, "north_junction", Some(Faction::Blue));
        give(&mut state, "south_junction", Some(Faction::Blue));

        state.turn = 2;
        assert_eq!(evaluate_round(&mut state), None);

        state.turn = 3;
        let result = evaluate_round(&mut state).unwrap();
        assert_eq!(result.verdict, Verdict::Victory(Faction::Blue));
        assert_eq!(result.condition, VictoryCondition::Control);
    }

    #[test]
    fn holding_one_of_two_junctions_is_not_enough() {
        let mut state = standard();
        give(&mut state, "north_junction", Some(Faction::Blue));
        for turn in 2..6 {
            state.turn = turn;
            assert_eq!(evaluate_round(&mut state), None);
        }
    }

    #[test]
    fn map_without_junctions_never_wins_by_control() {
        let template = MapTemplate {
            name: "bare".to_string(),
            nodes: vec![
                NodeTemplate {
                    id: NodeId::new("a"),
                    name: String::new(),
                    kind: NodeKind::Command,
                    owner: Some(Faction::Blue),
                    resources_per_turn: 1,
                    hub: true,
                    adjacent: vec![NodeId::new("b")],
                    objective: false,
                },
                NodeTemplate {
                    id: NodeId::new("b"),
                    name: String::new(),
                    kind: NodeKind::Command,
                    owner: Some(Faction::Red),
                    resources_per_turn: 1,
                    hub: true,
                    adjacent: Vec::new(),
                    objective: false,
                },
            ],
            units: Vec::new(),
            starting_resources: 0,
        };
        let mut state = template.build(&GameConfig::default()).unwrap();
        for turn in 2..=10 {
            state.turn = turn;
            assert_eq!(evaluate_round(&mut state), None);
        }
    }

    #[test]
    fn zero_threshold_never_wins_by_control() {
        let config = GameConfig {
            control_threshold: 0,
            ..GameConfig::default()
        };
        let mut state = MapTemplate::standard().build(&config).unwrap();
        assert_eq!(control_winner(&state), None);
        for turn in 2..=5 {
            state.turn = turn;
            assert_eq!(evaluate_round(&mut state), None);
        }

        // Even a full hold does not count.
        give(&mut state, "north_junction", Some(Faction::Blue));
        give(&mut state, "south_junction", Some(Faction::Blue));
        state.turn = 6;
        assert_eq!(evaluate_round(&mut state), None);
    }

    #[test]
    fn influence_formula() {
        let state = standard();
        // 10 banked + 5 * 8 income + (4 infantry * 3 + 1 armor * 6)
        assert_eq!(influence(&state, Faction::Blue), 68);
    }

    #[test]
    fn influence_higher_score_wins() {
        let mut state = standard();
        state.turn = 21;
        if let Some(p) = state.players.get_mut(&Faction::Red) {
            p.resources = 5;
        }
        let result = evaluate_round(&mut state).unwrap();
        assert_eq!(result.verdict, Verdict::Victory(Faction::Blue));
        assert_eq!(result.condition, VictoryCondition::Influence);
        assert!(result.message.contains("Blue 68"));
        assert!(result.message.contains("Red 63"));
    }

    #[test]
    fn equal_influence_is_a_draw() {
        let mut state = standard();
        state.turn = 21;
        let result = evaluate_round(&mut state).unwrap();
        assert_eq!(result.verdict, Verdict::Draw);
        assert!(result.winner().is_none());
    }

    #[test]
    fn turn_at_limit_does_not_end_the_game() {
        let mut state = standard();
        state.turn = 20;
        assert_eq!(evaluate_round(&mut state), None);
    }
}

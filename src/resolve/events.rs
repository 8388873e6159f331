//! Fluctuation events.
//!
//! On every FLUCTUATION entry an [`EventSource`] may offer one template. The
//! template's abstract criteria are resolved to concrete nodes with the
//! shared generator and the effect is applied to the active faction's half
//! of the turn. Effects that cannot take hold are kept as unresolved events
//! so the presentation layer can surface them.

use crate::board::{
    ActiveEvent, EventEffect, EventResolution, EventTemplate, Faction, GameState, NodeEffect,
    NodeId, TargetCriteria, UnitType,
};
use crate::journal::EntryKind;
use crate::rng::{DrawPurpose, GameRng};

/// Supplies fluctuation events.
pub trait EventSource {
    /// Offers the event for this FLUCTUATION entry, if any.
    fn draw(&mut self, state: &GameState, rng: &mut GameRng) -> Option<EventTemplate>;
}

/// A source that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calm;

impl EventSource for Calm {
    fn draw(&mut self, _state: &GameState, _rng: &mut GameRng) -> Option<EventTemplate> {
        None
    }
}

/// A fixed deck sampled uniformly after a chance roll.
#[derive(Debug, Clone)]
pub struct EventDeck {
    templates: Vec<EventTemplate>,
}

impl EventDeck {
    pub fn new(templates: Vec<EventTemplate>) -> Self {
        EventDeck { templates }
    }

    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }

    /// The built-in deck.
    pub fn standard() -> Self {
        EventDeck::new(vec![
            EventTemplate::new(
                "Supply Windfall",
                "A convoy arrives early at one of your nodes: +3 QR.",
                EventEffect::ResourceNodeBonus { amount: 3 },
                TargetCriteria::ActivePlayerNode,
            ),
            EventTemplate::new(
                "Sensor Blackout",
                "Enemy sensors fail across a region: defenders there roll at -1.",
                EventEffect::RegionalDefenseDebuff { penalty: 1 },
                TargetCriteria::OpponentNode,
            ),
            EventTemplate::new(
                "Rapid Fabrication",
                "A fabrication hub completes a spare unit of infantry.",
                EventEffect::FreeUnitDeployment {
                    unit_type: UnitType::Infantry,
                },
                TargetCriteria::ActivePlayerHub,
            ),
            EventTemplate::new(
                "Forced March",
                "Your forces may maneuver twice this turn.",
                EventEffect::ExtraManeuverPhase,
                TargetCriteria::NoTarget,
            ),
            EventTemplate::new(
                "Ion Storm",
                "Auroras light up the sky over the front.",
                EventEffect::Narrative,
                TargetCriteria::AnyNode,
            ),
        ])
    }
}

impl Default for EventDeck {
    fn default() -> Self {
        EventDeck::standard()
    }
}

impl EventSource for EventDeck {
    fn draw(&mut self, state: &GameState, rng: &mut GameRng) -> Option<EventTemplate> {
        if self.templates.is_empty() {
            return None;
        }
        let roll = rng.percent(DrawPurpose::EventChance);
        if roll > state.rules.event_chance_percent {
            return None;
        }
        let idx = rng.index(self.templates.len(), DrawPurpose::EventSelection)?;
        Some(self.templates[idx].clone())
    }
}

/// Nodes matching `criteria` from `faction`'s point of view, in id order.
pub fn candidate_targets(state: &GameState, faction: Faction, criteria: TargetCriteria) -> Vec<NodeId> {
    let matches = |owner: Option<Faction>, hub: bool| match criteria {
        TargetCriteria::ActivePlayerNode => owner == Some(faction),
        TargetCriteria::OpponentNode => owner == Some(faction.opponent()),
        TargetCriteria::ActivePlayerHub => owner == Some(faction) && hub,
        TargetCriteria::AnyNode => true,
        TargetCriteria::NoTarget => false,
    };
    state
        .nodes
        .values()
        .filter(|n| matches(n.owner, n.has_hub))
        .map(|n| n.id.clone())
        .collect()
}

/// First hub node owned by `faction`, in id order.
pub fn first_hub(state: &GameState, faction: Faction) -> Option<NodeId> {
    state
        .nodes_owned_by(Some(faction))
        .find(|n| n.has_hub)
        .map(|n| n.id.clone())
}

/// Returns a copy of `state` with `template` applied for the active faction.
pub fn resolve_event(state: &GameState, template: EventTemplate, rng: &mut GameRng) -> GameState {
    let mut next = state.clone();
    trigger_event(&mut next, template, rng);
    next
}

/// Clears the previous event and every transient node tag.
pub(crate) fn expire_event(state: &mut GameState) {
    state.active_event = None;
    state.extra_maneuver_pending = false;
    for node in state.nodes.values_mut() {
        node.effects.clear();
    }
}

/// Resolves targets, applies the effect, and records the active event.
pub(crate) fn trigger_event(state: &mut GameState, template: EventTemplate, rng: &mut GameRng) {
    let faction = state.current_player;
    let (targets, resolution) = match template.effect {
        EventEffect::ResourceNodeBonus { amount } => {
            match pick_target(state, faction, template.target, rng) {
                Some(target) => {
                    let owner = state.node(&target).and_then(|n| n.owner);
                    if let Some(n) = state.nodes.get_mut(&target) {
                        n.effects.push(NodeEffect::ResourceSurge { amount });
                    }
                    let resolution = match owner.and_then(|f| state.players.get_mut(&f)) {
                        Some(player) => {
                            player.resources = player.resources.saturating_add(amount);
                            EventResolution::Applied
                        }
                        None => unresolved("target node has no owner"),
                    };
                    (vec![target], resolution)
                }
                None => (Vec::new(), unresolved("no eligible target")),
            }
        }
        EventEffect::RegionalDefenseDebuff { penalty } => {
            match pick_target(state, faction, template.target, rng) {
                Some(target) => {
                    let mut region = vec![target.clone()];
                    if let Some(n) = state.node(&target) {
                        region.extend(n.adjacent.iter().cloned());
                    }
                    for id in &region {
                        if let Some(n) = state.nodes.get_mut(id) {
                            n.effects.push(NodeEffect::DefenseDebuff { penalty });
                        }
                    }
                    (region, EventResolution::Applied)
                }
                None => (Vec::new(), unresolved("no eligible target")),
            }
        }
        EventEffect::FreeUnitDeployment { unit_type } => match first_hub(state, faction) {
            Some(hub) => {
                state.spawn_unit(Some(faction), unit_type, &hub, true);
                (vec![hub], EventResolution::Applied)
            }
            None => (Vec::new(), unresolved("no fabrication hub held")),
        },
        EventEffect::ExtraManeuverPhase => {
            state.extra_maneuver_pending = true;
            (Vec::new(), EventResolution::Applied)
        }
        EventEffect::Narrative => (Vec::new(), unresolved("narrative only")),
    };

    let event = ActiveEvent {
        template,
        faction,
        targets,
        resolution,
    };
    match &event.resolution {
        EventResolution::Applied => {
            tracing::info!(%faction, event = %event.template.name, "event applied");
        }
        EventResolution::Unresolved { reason } => {
            tracing::warn!(%faction, event = %event.template.name, %reason, "event unresolved");
        }
    }
    let line = event.describe();
    state.note(Some(faction), EntryKind::Event, line);
    state.active_event = Some(event);
}

fn pick_target(
    state: &GameState,
    faction: Faction,
    criteria: TargetCriteria,
    rng: &mut GameRng,
) -> Option<NodeId> {
    let candidates = candidate_targets(state, faction, criteria);
    let idx = rng.index(candidates.len(), DrawPurpose::EventTarget)?;
    candidates.into_iter().nth(idx)
}

fn unresolved(reason: &str) -> EventResolution {
    EventResolution::Unresolved {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MapTemplate;
    use crate::config::GameConfig;

    fn standard() -> GameState {
        MapTemplate::standard().build(&GameConfig::default()).unwrap()
    }

    fn template(effect: EventEffect, target: TargetCriteria) -> EventTemplate {
        EventTemplate::new("Test", "test event", effect, target)
    }

    #[test]
    fn resource_bonus_credits_active_player() {
        let state = standard();
        let mut rng = GameRng::seed_from_u64(4);
        let next = resolve_event(
            &state,
            template(
                EventEffect::ResourceNodeBonus { amount: 3 },
                TargetCriteria::ActivePlayerNode,
            ),
            &mut rng,
        );
        assert_eq!(next.resources(Faction::Blue), 13);
        let event = next.active_event.as_ref().unwrap();
        assert_eq!(event.resolution, EventResolution::Applied);
        assert_eq!(event.targets.len(), 1);
        let target = next.node(&event.targets[0]).unwrap();
        assert_eq!(target.owner, Some(Faction::Blue));
        assert!(target.effects.contains(&NodeEffect::ResourceSurge { amount: 3 }));
    }

    #[test]
    fn defense_debuff_tags_region() {
        let state = standard();
        let mut rng = GameRng::seed_from_u64(8);
        let next = resolve_event(
            &state,
            template(
                EventEffect::RegionalDefenseDebuff { penalty: 1 },
                TargetCriteria::OpponentNode,
            ),
            &mut rng,
        );
        let event = next.active_event.as_ref().unwrap();
        assert!(event.targets.len() > 1);
        let centre = next.node(&event.targets[0]).unwrap();
        assert_eq!(centre.owner, Some(Faction::Red));
        for id in &event.targets {
            assert_eq!(next.node(id).unwrap().defense_penalty(), 1);
        }
    }

    #[test]
    fn free_unit_lands_on_first_hub_already_acted() {
        let state = standard();
        let mut rng = GameRng::seed_from_u64(0);
        let before = state.units.len();
        let next = resolve_event(
            &state,
            template(
                EventEffect::FreeUnitDeployment {
                    unit_type: UnitType::Armor,
                },
                TargetCriteria::ActivePlayerHub,
            ),
            &mut rng,
        );
        assert_eq!(next.units.len(), before + 1);
        // "blue_forge" sorts before "blue_hq".
        let hub = NodeId::new("blue_forge");
        let spawned = next.units_at(&hub).into_iter().last().unwrap();
        assert_eq!(spawned.unit_type, UnitType::Armor);
        assert!(spawned.acted);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn extra_maneuver_sets_flag() {
        let state = standard();
        let mut rng = GameRng::seed_from_u64(0);
        let next = resolve_event(
            &state,
            template(EventEffect::ExtraManeuverPhase, TargetCriteria::NoTarget),
            &mut rng,
        );
        assert!(next.extra_maneuver_pending);
    }

    #[test]
    fn narrative_event_is_surfaced_as_unresolved() {
        let state = standard();
        let mut rng = GameRng::seed_from_u64(0);
        let next = resolve_event(
            &state,
            template(EventEffect::Narrative, TargetCriteria::AnyNode),
            &mut rng,
        );
        let event = next.active_event.as_ref().unwrap();
        assert!(matches!(event.resolution, EventResolution::Unresolved { .. }));
        assert_eq!(next.nodes, state.nodes);
    }

    #[test]
    fn missing_target_is_unresolved() {
        let state = standard();
        let mut rng = GameRng::seed_from_u64(0);
        let next = resolve_event(
            &state,
            template(
                EventEffect::RegionalDefenseDebuff { penalty: 2 },
                TargetCriteria::NoTarget,
            ),
            &mut rng,
        );
        assert_eq!(
            next.active_event.unwrap().resolution,
            EventResolution::Unresolved {
                reason: "no eligible target".to_string()
            }
        );
    }

    #[test]
    fn deck_respects_zero_chance() {
        let mut state = standard();
        state.rules.event_chance_percent = 0;
        let mut deck = EventDeck::standard();
        let mut rng = GameRng::seed_from_u64(2);
        for _ in 0..20 {
            assert!(deck.draw(&state, &mut rng).is_none());
        }
    }

    #[test]
    fn deck_always_fires_at_full_chance() {
        let mut state = standard();
        state.rules.event_chance_percent = 100;
        let mut deck = EventDeck::standard();
        let mut rng = GameRng::seed_from_u64(2);
        for _ in 0..20 {
            assert!(deck.draw(&state, &mut rng).is_some());
        }
        assert_eq!(rng.draws(), 40);
    }

    #[test]
    fn expire_clears_tags_and_event() {
        let state = standard();
        let mut rng = GameRng::seed_from_u64(8);
        let mut next = resolve_event(
            &state,
            template(
                EventEffect::RegionalDefenseDebuff { penalty: 1 },
                TargetCriteria::OpponentNode,
            ),
            &mut rng,
        );
        expire_event(&mut next);
        assert!(next.active_event.is_none());
        assert!(next.nodes.values().all(|n| n.effects.is_empty()));
    }
}

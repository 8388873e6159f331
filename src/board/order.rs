//! Order types for the three order-taking phases.
//!
//! The set is closed: deploy, attack, maneuver, and pass. Each variant
//! carries its required fields statically, and the serde representation
//! doubles as the wire format accepted from decision sources.

use serde::{Deserialize, Serialize};

use super::node::NodeId;
use super::state::Phase;
use super::unit::{UnitId, UnitType};

/// An order issued by the active faction.
///
/// Serialized as a JSON object tagged by `"type"`, with camelCase fields:
/// `{"type":"MANEUVER","unitId":"b-3","toNodeId":"relay_w"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Order {
    /// Fabricate `quantity` units of `unit_type` at a hub node.
    #[serde(rename_all = "camelCase")]
    Deploy {
        unit_type: UnitType,
        node_id: NodeId,
        quantity: u32,
    },

    /// Commit units at `from_node_id` against an adjacent node.
    #[serde(rename_all = "camelCase")]
    Attack {
        from_node_id: NodeId,
        to_node_id: NodeId,
        unit_ids: Vec<UnitId>,
    },

    /// Relocate one unit to an adjacent friendly node.
    #[serde(rename_all = "camelCase")]
    Maneuver { unit_id: UnitId, to_node_id: NodeId },

    /// Do nothing.
    Pass,
}

/// The discriminant of an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Deploy,
    Attack,
    Maneuver,
    Pass,
}

impl Order {
    pub fn kind(&self) -> OrderKind {
        match self {
            Order::Deploy { .. } => OrderKind::Deploy,
            Order::Attack { .. } => OrderKind::Attack,
            Order::Maneuver { .. } => OrderKind::Maneuver,
            Order::Pass => OrderKind::Pass,
        }
    }

    /// Returns true if this order may be issued during `phase`.
    /// Pass is allowed in every phase.
    pub fn allowed_in(&self, phase: Phase) -> bool {
        matches!(
            (self.kind(), phase),
            (OrderKind::Pass, _)
                | (OrderKind::Deploy, Phase::Deployment)
                | (OrderKind::Attack, Phase::Attack)
                | (OrderKind::Maneuver, Phase::Maneuver)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_wire_format() {
        let order = Order::Deploy {
            unit_type: UnitType::Infantry,
            node_id: NodeId::new("blue_hq"),
            quantity: 2,
        };
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(
            json,
            r#"{"type":"DEPLOY","unitType":"infantry","nodeId":"blue_hq","quantity":2}"#
        );
    }

    #[test]
    fn attack_parses_from_camel_case() {
        let order: Order = serde_json::from_str(
            r#"{"type":"ATTACK","fromNodeId":"a","toNodeId":"b","unitIds":["b-1","b-2"]}"#,
        )
        .unwrap();
        assert_eq!(
            order,
            Order::Attack {
                from_node_id: NodeId::new("a"),
                to_node_id: NodeId::new("b"),
                unit_ids: vec![UnitId::new("b-1"), UnitId::new("b-2")],
            }
        );
    }

    #[test]
    fn missing_field_is_rejected_at_the_boundary() {
        let result = serde_json::from_str::<Order>(r#"{"type":"MANEUVER","unitId":"b-1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn pass_is_allowed_everywhere() {
        for phase in [Phase::Fluctuation, Phase::Deployment, Phase::Attack, Phase::Maneuver] {
            assert!(Order::Pass.allowed_in(phase));
        }
    }

    #[test]
    fn maneuver_only_in_maneuver_phase() {
        let order = Order::Maneuver {
            unit_id: UnitId::new("b-1"),
            to_node_id: NodeId::new("x"),
        };
        assert!(order.allowed_in(Phase::Maneuver));
        assert!(!order.allowed_in(Phase::Attack));
        assert!(!order.allowed_in(Phase::Deployment));
    }
}

//! # Node Tiers
//!
//! Physical nodes are registered in one of four tiers. The raw wire value
//! is `1..=4`; anything else is rejected with `LedgerError::InvalidNodeType`.
//!
//! | Tier | Name | Capacity units | Reward weight |
//! |------|------|----------------|---------------|
//! | 1 | Basic | 1 | 100% of capacity |
//! | 2 | Standard | 1 | 125% of capacity |
//! | 3 | Premium | 1 | 150% of capacity |
//! | 4 | Commodity | configurable (default 10) | 200% of capacity |
//!
//! Commodity nodes additionally require a minimum monetary value
//! (see `LedgerConfig::commodity_min_value`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;

/// Node tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    Basic,
    Standard,
    Premium,
    /// Tier 4. Value-gated and consumes more of the global ceiling.
    Commodity,
}

impl NodeType {
    /// Wire value in `1..=4`.
    pub const fn as_u8(&self) -> u8 {
        match self {
            NodeType::Basic => 1,
            NodeType::Standard => 2,
            NodeType::Premium => 3,
            NodeType::Commodity => 4,
        }
    }

    pub const fn is_commodity(&self) -> bool {
        matches!(self, NodeType::Commodity)
    }

    /// Units of the global capacity ceiling this node consumes.
    pub const fn capacity_units(&self, commodity_units: u64) -> u64 {
        match self {
            NodeType::Commodity => commodity_units,
            _ => 1,
        }
    }

    /// Reward weight multiplier applied to node capacity, in percent.
    pub const fn reward_weight_percent(&self) -> u64 {
        match self {
            NodeType::Basic => 100,
            NodeType::Standard => 125,
            NodeType::Premium => 150,
            NodeType::Commodity => 200,
        }
    }

    /// Reward weight of a node of this tier with the given capacity.
    ///
    /// Saturates instead of overflowing.
    pub fn reward_weight(&self, capacity: u64) -> u64 {
        capacity.saturating_mul(self.reward_weight_percent()) / 100
    }
}

impl TryFrom<u8> for NodeType {
    type Error = LedgerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(NodeType::Basic),
            2 => Ok(NodeType::Standard),
            3 => Ok(NodeType::Premium),
            4 => Ok(NodeType::Commodity),
            other => Err(LedgerError::InvalidNodeType(other)),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Basic => write!(f, "Basic"),
            NodeType::Standard => write!(f, "Standard"),
            NodeType::Premium => write!(f, "Premium"),
            NodeType::Commodity => write!(f, "Commodity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_roundtrip() {
        for raw in 1u8..=4 {
            let t = NodeType::try_from(raw).unwrap();
            assert_eq!(t.as_u8(), raw);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(NodeType::try_from(0), Err(LedgerError::InvalidNodeType(0)));
        assert_eq!(NodeType::try_from(5), Err(LedgerError::InvalidNodeType(5)));
    }

    #[test]
    fn commodity_consumes_configured_units() {
        assert_eq!(NodeType::Basic.capacity_units(10), 1);
        assert_eq!(NodeType::Premium.capacity_units(10), 1);
        assert_eq!(NodeType::Commodity.capacity_units(10), 10);
        assert!(NodeType::Commodity.is_commodity());
        assert!(!NodeType::Standard.is_commodity());
    }

    #[test]
    fn reward_weight_scales_with_tier() {
        assert_eq!(NodeType::Basic.reward_weight(100), 100);
        assert_eq!(NodeType::Standard.reward_weight(100), 125);
        assert_eq!(NodeType::Premium.reward_weight(100), 150);
        assert_eq!(NodeType::Commodity.reward_weight(100), 200);
        assert_eq!(NodeType::Commodity.reward_weight(u64::MAX), u64::MAX / 100);
    }
}

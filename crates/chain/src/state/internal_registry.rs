//! # Node Registry
//!
//! Registration, queries and the administrative node namespace.
//!
//! ## Invariant Preservation
//!
//! Every mutating function preserves:
//!
//! 1. `sum(counters.per_user) == counters.total`.
//! 2. Every entry in `nodes` has its id in `owner_nodes[record.owner]`, and
//!    `owner_nodes` holds no other ids.
//! 3. `counters.capacity_used <= config.max_capacity_units`.
//!
//! `register_nodes` validates the whole batch before the first insert. If
//! any entry fails, nothing is modified.

use std::collections::HashSet;

use pnode_common::{Address, LedgerError, LedgerResult, NodeType};
use tracing::{debug, info};

use super::{
    CallContext, DeployedNode, LedgerEventKind, LedgerState, NodeInfo, NodeRecord, NodeSpec,
};

// ════════════════════════════════════════════════════════════════════════════════
// REGISTRATION
// ════════════════════════════════════════════════════════════════════════════════

impl LedgerState {
    /// Register a batch of nodes as one all-or-nothing unit.
    ///
    /// ## Validations (per entry, in order)
    ///
    /// 1. `node_type` in `1..=4` → else `InvalidNodeType`.
    /// 2. `id` not registered, and not repeated earlier in the batch → else `DuplicateNodeId`.
    /// 3. Commodity nodes: `monetary_value >= commodity_min_value` → else `NodeValueTooLow`.
    /// 4. Weighted capacity stays within `max_capacity_units` → else `CapacityExceeded`.
    /// 5. `owner` is not the null account → else `ZeroAddress`.
    ///
    /// Caller must be the administrator or whitelisted.
    ///
    /// Returns the registered ids in batch order. An empty batch succeeds
    /// without emitting an event.
    pub fn register_nodes(&mut self, ctx: &CallContext, batch: &[NodeSpec]) -> LedgerResult<Vec<u64>> {
        let role = self.require_admin_or_whitelisted(&ctx.caller)?;
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.validate_batch(ctx, batch)?;

        // All validations passed: apply.
        let mut ids = Vec::with_capacity(records.len());
        for (record, units) in records {
            let per_user = self.counters.per_user.entry(record.owner).or_insert(0);
            *per_user += 1;
            self.counters.total += 1;
            self.counters.capacity_used += units;
            self.owner_nodes.entry(record.owner).or_default().insert(record.id);
            debug!(id = record.id, owner = %record.owner, node_type = %record.node_type, "node registered");
            ids.push(record.id);
            self.nodes.insert(record.id, record);
        }

        info!(
            caller = %ctx.caller,
            role = ?role,
            count = ids.len(),
            total = self.counters.total,
            capacity_used = self.counters.capacity_used,
            "node batch registered"
        );
        self.emit(
            ctx.caller,
            ctx.timestamp,
            LedgerEventKind::NodesRegistered { node_ids: ids.clone() },
        );
        Ok(ids)
    }

    /// Build the records of a batch without touching state.
    ///
    /// Also proves the counters cannot overflow: the total and per-user
    /// counts are checked against the post-batch values.
    fn validate_batch(
        &self,
        ctx: &CallContext,
        batch: &[NodeSpec],
    ) -> LedgerResult<Vec<(NodeRecord, u64)>> {
        let mut seen: HashSet<u64> = HashSet::with_capacity(batch.len());
        let mut capacity_used = self.counters.capacity_used;
        let mut records = Vec::with_capacity(batch.len());

        for spec in batch {
            let node_type = NodeType::try_from(spec.node_type)?;

            if self.nodes.contains_key(&spec.id) || !seen.insert(spec.id) {
                return Err(LedgerError::DuplicateNodeId(spec.id));
            }

            if node_type.is_commodity() && spec.monetary_value < self.config.commodity_min_value {
                return Err(LedgerError::NodeValueTooLow {
                    required: self.config.commodity_min_value,
                    actual: spec.monetary_value,
                });
            }

            let units = node_type.capacity_units(self.config.commodity_capacity_units);
            let requested = capacity_used
                .checked_add(units)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            if requested > self.config.max_capacity_units {
                return Err(LedgerError::CapacityExceeded {
                    max_units: self.config.max_capacity_units,
                    requested_units: requested,
                });
            }

            if spec.owner.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }

            capacity_used = requested;
            records.push((
                NodeRecord {
                    id: spec.id,
                    owner: spec.owner,
                    is_active: spec.is_active,
                    node_type,
                    capacity: spec.capacity,
                    monetary_value: spec.monetary_value,
                    created_at: ctx.timestamp,
                    origin_block: ctx.block_height,
                },
                units,
            ));
        }

        self.counters
            .total
            .checked_add(records.len() as u64)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(records)
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ════════════════════════════════════════════════════════════════════════════════

    /// Nodes owned by `owner` with `id_from <= id <= id_to`, ascending by id.
    ///
    /// An inverted range or an owner without nodes yields an empty vector.
    pub fn get_nodes_in_range(&self, owner: &Address, id_from: u64, id_to: u64) -> Vec<NodeRecord> {
        if id_from > id_to {
            return Vec::new();
        }
        let Some(ids) = self.owner_nodes.get(owner) else {
            return Vec::new();
        };
        ids.range(id_from..=id_to)
            .filter_map(|id| self.nodes.get(id))
            .cloned()
            .collect()
    }

    #[inline]
    pub fn get_node(&self, id: u64) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// All nodes of `owner`, ascending by id.
    pub fn nodes_of(&self, owner: &Address) -> impl Iterator<Item = &NodeRecord> {
        self.owner_nodes
            .get(owner)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(move |id| self.nodes.get(id))
    }

    /// Number of active nodes owned by `owner`.
    pub fn active_node_count(&self, owner: &Address) -> usize {
        self.nodes_of(owner).filter(|n| n.is_active).count()
    }

    // ════════════════════════════════════════════════════════════════════════════════
    // ADMINISTRATIVE NAMESPACE
    // ════════════════════════════════════════════════════════════════════════════════

    /// Record a server node deployed by the administrator.
    ///
    /// These nodes live in their own index space and do not count towards
    /// the registry counters or rewards. Returns the new index.
    pub fn create_node(&mut self, ctx: &CallContext, info: NodeInfo) -> LedgerResult<u64> {
        self.require_admin(&ctx.caller)?;
        let node_type = NodeType::try_from(info.node_type)?;

        let index = self.deployed_nodes.len() as u64;
        self.deployed_nodes.push(DeployedNode {
            index,
            ip: info.ip,
            describe: info.describe,
            name: info.name,
            is_active: info.is_active,
            node_type,
            capacity: info.capacity,
            created_at: ctx.timestamp,
            origin_block: ctx.block_height,
        });

        info!(index, node_type = %node_type, "administrative node created");
        self.emit(ctx.caller, ctx.timestamp, LedgerEventKind::NodeDeployed { index });
        Ok(index)
    }

    /// Look up an administrative node by index.
    pub fn deploy_node(&self, index: u64) -> LedgerResult<&DeployedNode> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.deployed_nodes.get(i))
            .ok_or(LedgerError::NodeNotFound(index))
    }

    pub fn deployed_node_count(&self) -> u64 {
        self.deployed_nodes.len() as u64
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;
use crate::types::{AgentId, AgentType, EconomyName, ReceiptId};

/// Any user of the system. Holds an inventory, submits requests and
/// donation responses, and issues or receives donation receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub economies: BTreeSet<EconomyName>,
    pub agent_type: AgentType,
    pub receipts: Vec<ReceiptId>,
    pub inventory: Inventory,
}

impl Agent {
    pub fn new(id: AgentId, economies: BTreeSet<EconomyName>, agent_type: AgentType) -> Self {
        Self {
            id,
            economies,
            agent_type,
            receipts: Vec::new(),
            inventory: Inventory::new(),
        }
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn participates_in(&self, economy: &str) -> bool {
        self.economies.contains(economy)
    }

    pub fn record_receipt(&mut self, receipt: ReceiptId) {
        self.receipts.push(receipt);
    }
}

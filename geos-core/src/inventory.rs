// Inventory: resource stock held by the global pool or by a single agent

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GeosError, Result};
use crate::types::{Quantity, ResourceId};

/// Holdings of one resource.
///
/// `idle_stock` is the part of `quantity` not in active use and eligible for
/// donation. `locked` is reserved for pending donations and stays 0 during
/// setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub resource: ResourceId,
    pub quantity: Quantity,
    pub idle_stock: Quantity,
    pub locked: Quantity,
}

impl StockRecord {
    fn new(resource: ResourceId, quantity: Quantity, idle_stock: Quantity) -> Result<Self> {
        if idle_stock > quantity {
            return Err(GeosError::IdleExceedsQuantity {
                resource,
                idle: idle_stock,
                quantity,
            });
        }
        Ok(Self {
            resource,
            quantity,
            idle_stock,
            locked: 0,
        })
    }

    /// Units not marked idle.
    pub fn active(&self) -> Quantity {
        self.quantity - self.idle_stock
    }
}

/// Mapping from resource to stock record.
///
/// Keys are ordered so that iteration, and therefore any sampling over the
/// key set, is reproducible for a given random source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    stock: BTreeMap<ResourceId, StockRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any existing holdings of `resource`.
    pub fn add_resource(
        &mut self,
        resource: ResourceId,
        quantity: Quantity,
        idle_stock: Quantity,
    ) -> Result<()> {
        let record = StockRecord::new(resource, quantity, idle_stock)?;
        self.stock.insert(resource, record);
        Ok(())
    }

    /// Add units on top of any existing holdings of `resource`.
    ///
    /// Fails without changing anything if the new totals would overflow.
    pub fn deposit(
        &mut self,
        resource: ResourceId,
        quantity: Quantity,
        idle_stock: Quantity,
    ) -> Result<()> {
        let incoming = StockRecord::new(resource, quantity, idle_stock)?;
        match self.stock.get_mut(&resource) {
            Some(r) => {
                let quantity = r
                    .quantity
                    .checked_add(incoming.quantity)
                    .ok_or(GeosError::QuantityOverflow("deposited quantity"))?;
                r.quantity = quantity;
                r.idle_stock += incoming.idle_stock;
            }
            None => {
                self.stock.insert(resource, incoming);
            }
        }
        Ok(())
    }

    /// Remove `amount` units of `resource`.
    ///
    /// Withdrawn units are taken from the idle portion first, so
    /// `idle_stock` drops by `min(idle_stock, amount)` and never exceeds the
    /// remaining quantity.
    pub fn withdraw(&mut self, resource: ResourceId, amount: Quantity) -> Result<StockRecord> {
        let available = self.quantity(resource);
        let record = match self.stock.get_mut(&resource) {
            Some(r) if r.quantity >= amount => r,
            _ => {
                return Err(GeosError::InsufficientStock {
                    resource,
                    requested: amount,
                    available,
                });
            }
        };
        record.quantity -= amount;
        record.idle_stock = record.idle_stock.saturating_sub(amount);
        Ok(*record)
    }

    /// Update the inventory policy: how much of the held quantity is idle.
    pub fn set_idle_stock(&mut self, resource: ResourceId, idle_stock: Quantity) -> Result<()> {
        let record = self.record_mut(resource, idle_stock)?;
        if idle_stock > record.quantity {
            return Err(GeosError::IdleExceedsQuantity {
                resource,
                idle: idle_stock,
                quantity: record.quantity,
            });
        }
        record.idle_stock = idle_stock;
        Ok(())
    }

    /// Overwrite the held quantity. Idle stock is clamped to the new quantity.
    pub fn set_quantity(&mut self, resource: ResourceId, quantity: Quantity) -> Result<()> {
        let record = self.record_mut(resource, quantity)?;
        record.quantity = quantity;
        record.idle_stock = record.idle_stock.min(quantity);
        Ok(())
    }

    fn record_mut(&mut self, resource: ResourceId, requested: Quantity) -> Result<&mut StockRecord> {
        self.stock
            .get_mut(&resource)
            .ok_or(GeosError::InsufficientStock {
                resource,
                requested,
                available: 0,
            })
    }

    pub fn get(&self, resource: ResourceId) -> Option<&StockRecord> {
        self.stock.get(&resource)
    }

    pub fn contains(&self, resource: ResourceId) -> bool {
        self.stock.contains_key(&resource)
    }

    pub fn quantity(&self, resource: ResourceId) -> Quantity {
        self.stock.get(&resource).map_or(0, |r| r.quantity)
    }

    pub fn idle_stock(&self, resource: ResourceId) -> Quantity {
        self.stock.get(&resource).map_or(0, |r| r.idle_stock)
    }

    /// True if the inventory holds a nonzero amount of `resource`.
    pub fn holds(&self, resource: ResourceId) -> bool {
        self.quantity(resource) > 0
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.stock.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &StockRecord)> {
        self.stock.iter()
    }

    pub fn len(&self) -> usize {
        self.stock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }

    pub fn total_quantity(&self) -> Result<Quantity> {
        checked_total(self.stock.values().map(|r| r.quantity), "inventory quantity")
    }

    pub fn total_idle(&self) -> Result<Quantity> {
        checked_total(self.stock.values().map(|r| r.idle_stock), "inventory idle stock")
    }
}

/// Sum quantities, failing with [`GeosError::QuantityOverflow`] instead of wrapping.
pub fn checked_total(
    values: impl IntoIterator<Item = Quantity>,
    what: &'static str,
) -> Result<Quantity> {
    values
        .into_iter()
        .try_fold(0, |acc: Quantity, q| acc.checked_add(q))
        .ok_or(GeosError::QuantityOverflow(what))
}

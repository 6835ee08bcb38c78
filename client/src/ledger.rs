//! In-memory mirror of the server's party ledger.
//!
//! The mirror is keyed by the server-assigned id and is strictly
//! read-through: it is replaced wholesale on every successful fetch and
//! touched in place only after the server acknowledges a write. Everything
//! mutating lives behind crate-visible methods so the update service stays
//! the single writer.

use std::collections::HashSet;

use shared::{Party, Transaction};

#[derive(Debug, Default)]
pub struct PartyLedger {
    parties: Vec<Party>,
    selected: Option<String>,
    in_flight: HashSet<String>,
}

impl PartyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All mirrored parties in server order.
    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn get(&self, id: &str) -> Option<&Party> {
        self.parties.iter().find(|party| party.id == id)
    }

    /// The current aggregate balance of one party.
    pub fn balance(&self, id: &str) -> Option<f64> {
        self.get(id).map(|party| party.total_credit)
    }

    /// Transaction history in append order.
    pub fn history(&self, id: &str) -> Option<&[Transaction]> {
        self.get(id).map(|party| party.transactions.as_slice())
    }

    /// Select a party card; ignored for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&Party> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// True while a credit update for this party is awaiting the server.
    pub fn is_submitting(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Replace the whole mirror after a successful fetch. The selection
    /// survives only if the selected party still exists.
    pub(crate) fn replace_all(&mut self, parties: Vec<Party>) {
        self.parties = parties;
        if let Some(id) = self.selected.clone() {
            if self.get(&id).is_none() {
                self.selected = None;
            }
        }
    }

    pub(crate) fn insert(&mut self, party: Party) {
        self.parties.push(party);
    }

    /// Drop a party from the mirror, clearing the selection if it pointed
    /// at the removed entry. Returns false for unknown ids.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.parties.len();
        self.parties.retain(|party| party.id != id);
        let removed = self.parties.len() < before;
        if removed && self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        removed
    }

    /// Claim the per-party submission slot. Returns false if an update is
    /// already in flight.
    pub(crate) fn begin_submission(&mut self, id: &str) -> bool {
        self.in_flight.insert(id.to_string())
    }

    pub(crate) fn end_submission(&mut self, id: &str) {
        self.in_flight.remove(id);
    }

    /// Commit an acknowledged credit update to the mirror.
    pub(crate) fn apply_credit(
        &mut self,
        id: &str,
        new_balance: f64,
        transaction: Transaction,
    ) -> bool {
        match self.parties.iter_mut().find(|party| party.id == id) {
            Some(party) => {
                party.total_credit = new_balance;
                party.transactions.push(transaction);
                true
            }
            None => false,
        }
    }
}

use {
    crate::ledger::types::Entry,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Running totals for one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAggregate {
    pub line_count: u64,
    pub total_amount: i64,
}

/// Per-account aggregation of ledger entries
///
/// Owned by the engine's coordinator task and fed only through the results
/// channel, so there is never more than one writer and no lock is needed.
/// Accounts are kept in a `BTreeMap` so serialized output is stable.
#[derive(Debug, Default)]
pub struct LedgerAggregator {
    accounts: BTreeMap<String, AccountAggregate>,
    entries_seen: u64,
    batches_seen: u64,
}

impl LedgerAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single entry into its account (created on first sight)
    pub fn add_entry(&mut self, entry: Entry) {
        let aggregate = self.accounts.entry(entry.account_id).or_default();
        aggregate.line_count += 1;
        aggregate.total_amount = aggregate.total_amount.wrapping_add(entry.amount);

        self.entries_seen += 1;
    }

    /// Fold one page worth of entries, preserving their source order
    pub fn add_batch(&mut self, entries: Vec<Entry>) {
        for entry in entries {
            log::debug!(
                "received id: {}, account: {}, amount: {}",
                entry.id,
                entry.account_id,
                entry.amount
            );
            self.add_entry(entry);
        }
        self.batches_seen += 1;
    }

    /// Get totals for a specific account
    pub fn get_account(&self, account_id: &str) -> Option<&AccountAggregate> {
        self.accounts.get(account_id)
    }

    /// Get all account totals
    pub fn accounts(&self) -> &BTreeMap<String, AccountAggregate> {
        &self.accounts
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Entries folded so far, across all batches
    pub fn entries_seen(&self) -> u64 {
        self.entries_seen
    }

    pub fn batches_seen(&self) -> u64 {
        self.batches_seen
    }

    /// Sum of `line_count` over every account
    ///
    /// Always equal to `entries_seen()`; kept separate so callers can check it.
    pub fn total_line_count(&self) -> u64 {
        self.accounts.values().map(|a| a.line_count).sum()
    }

    pub fn into_accounts(self) -> BTreeMap<String, AccountAggregate> {
        self.accounts
    }
}

use std::sync::atomic::{AtomicU32, Ordering};

/// Credits granted by one completed purchase
pub const TOP_UP_CREDITS: u32 = 10;

/// Balance a new user starts with
pub const DEFAULT_STARTING_CREDITS: u32 = 10;

/// Per-user credit balance shared by all of that user's sessions.
///
/// Starting a session reserves one credit up front and either keeps it (the
/// opening question arrived) or refunds it (generation failed), so concurrent
/// sessions can never spend the same credit twice.
#[derive(Debug)]
pub struct CreditLedger {
    balance: AtomicU32,
}

impl CreditLedger {
    pub fn new(balance: u32) -> Self {
        Self {
            balance: AtomicU32::new(balance),
        }
    }

    pub fn balance(&self) -> u32 {
        self.balance.load(Ordering::SeqCst)
    }

    /// Take one credit if any remain
    pub fn try_reserve(&self) -> bool {
        self.balance
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| b.checked_sub(1))
            .is_ok()
    }

    /// Return a credit taken by [`try_reserve`](Self::try_reserve)
    pub fn refund(&self) {
        self.balance.fetch_add(1, Ordering::SeqCst);
    }

    /// Add credits and return the new balance
    pub fn top_up(&self, amount: u32) -> u32 {
        let previous = self
            .balance
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| {
                Some(b.saturating_add(amount))
            })
            .unwrap_or_else(|b| b);
        previous.saturating_add(amount)
    }
}

impl Default for CreditLedger {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_CREDITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_until_empty() {
        let ledger = CreditLedger::new(2);
        assert!(ledger.try_reserve());
        assert!(ledger.try_reserve());
        assert!(!ledger.try_reserve());
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_refund_restores_balance() {
        let ledger = CreditLedger::new(1);
        assert!(ledger.try_reserve());
        ledger.refund();
        assert_eq!(ledger.balance(), 1);
    }

    #[test]
    fn test_top_up_returns_new_balance() {
        let ledger = CreditLedger::new(3);
        assert_eq!(ledger.top_up(TOP_UP_CREDITS), 13);
        assert_eq!(ledger.balance(), 13);
    }

    #[test]
    fn test_default_balance() {
        assert_eq!(CreditLedger::default().balance(), 10);
    }
}

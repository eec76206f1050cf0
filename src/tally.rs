//! Cosmetic miner-credit standings.
//!
//! A random wallet claims credit for "mining an empty block" and a
//! leaderboard counts the credits. Purely decorative: the driver updates
//! this side table, nothing else reads it, and it carries no invariants
//! of its own.

use std::collections::BTreeMap;

use rand::Rng;

use crate::account::AccountRegistry;

/// Count of mining credits per account id.
#[derive(Debug, Default)]
pub struct MiningTally {
    credits: BTreeMap<String, u64>,
}

impl MiningTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `id` with one mined block.
    pub fn credit(&mut self, id: impl Into<String>) {
        *self.credits.entry(id.into()).or_insert(0) += 1;
    }

    /// Credits a uniformly random registered account and returns its id,
    /// or `None` if the registry is empty.
    pub fn credit_random<R: Rng>(
        &mut self,
        rng: &mut R,
        accounts: &AccountRegistry,
    ) -> Option<String> {
        let ids: Vec<&str> = accounts.ids().collect();
        if ids.is_empty() {
            return None;
        }

        let winner = ids[rng.gen_range(0..ids.len())].to_string();
        self.credit(winner.clone());
        Some(winner)
    }

    /// Standings in descending credit order; equal counts fall back to id
    /// order.
    pub fn standings(&self) -> Vec<(&str, u64)> {
        let mut rows: Vec<(&str, u64)> = self
            .credits
            .iter()
            .map(|(id, &count)| (id.as_str(), count))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::account::AccountRegistry;

    use super::MiningTally;

    #[test]
    fn empty_registry_yields_no_credit() {
        let accounts = AccountRegistry::new();
        let mut tally = MiningTally::new();

        let credited =
            tally.credit_random(&mut rand::thread_rng(), &accounts);
        assert!(credited.is_none());
        assert!(tally.is_empty());
    }

    #[test]
    fn random_credit_lands_on_a_registered_account() {
        let mut accounts = AccountRegistry::new();
        accounts.register("ana", Decimal::ZERO).unwrap();
        accounts.register("bruno", Decimal::ZERO).unwrap();

        let mut tally = MiningTally::new();
        let credited = tally
            .credit_random(&mut rand::thread_rng(), &accounts)
            .unwrap();
        assert!(accounts.contains(&credited));
    }

    #[test]
    fn standings_rank_by_count_then_id() {
        let mut tally = MiningTally::new();
        tally.credit("bruno");
        tally.credit("bruno");
        tally.credit("ana");
        tally.credit("carla");

        assert_eq!(
            tally.standings(),
            vec![("bruno", 2), ("ana", 1), ("carla", 1)]
        );
    }
}

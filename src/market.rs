//! Forward contracts, sealed-bid collection, and adjudication settlement.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use crate::{
    account::{AccountError, AccountRegistry},
    batch::{BatchId, BatchRegistry},
    ledger::Ledger,
};

/// Index of a contract within the book's ordered sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub struct ContractId(usize);

impl From<usize> for ContractId {
    fn from(value: usize) -> Self {
        ContractId(value)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract#{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("{0} is not a recorded batch")]
    BatchNotFound(BatchId),
    #[error(
        "contract against {batch} exceeds remaining capacity \
         ({requested} requested, {available} available)"
    )]
    CapacityExceeded {
        batch: BatchId,
        requested: u32,
        available: u32,
    },
    #[error("{0} does not exist")]
    ContractNotFound(ContractId),
    #[error("{0} has already been adjudicated")]
    ContractAlreadyAdjudicated(ContractId),
    #[error("{0} has no bids to adjudicate")]
    NoBids(ContractId),
    #[error(
        "market holds {registered} accounts but adjudication requires \
         {required}"
    )]
    InsufficientBidders { registered: usize, required: usize },
    #[error("bidder {0} is not registered")]
    UnknownBidder(String),
    #[error("bid of {amount} exceeds {bidder}'s current balance")]
    InsufficientFunds { bidder: String, amount: Decimal },
    #[error("settlement transfer failed")]
    SettlementFailed(#[source] AccountError),
}

/// A sealed bid against an open contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bid {
    pub bidder: String,
    pub amount: Decimal,
}

/// Lifecycle of a futures contract: `Open` accepts bids until a single
/// adjudication moves it to the terminal `Adjudicated` state. There is no
/// cancellation path.
#[derive(Debug, Clone)]
pub enum ContractStatus {
    Open,
    Adjudicated(Bid),
}

/// A forward contract drawn against a recorded batch's capacity.
#[derive(Debug, Clone)]
pub struct FuturesContract {
    pub producer: String,
    pub batch: BatchId,
    /// Head count promised for delivery; positive (caller pre-validated).
    pub quantity: u32,
    pub delivery: NaiveDate,
    bids: Vec<Bid>,
    status: ContractStatus,
}

impl FuturesContract {
    /// Bids in submission order.
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn status(&self) -> &ContractStatus {
        &self.status
    }

    pub fn is_adjudicated(&self) -> bool {
        matches!(self.status, ContractStatus::Adjudicated(_))
    }

    /// The settled winning bid, once adjudicated.
    pub fn winner(&self) -> Option<&Bid> {
        match &self.status {
            ContractStatus::Open => None,
            ContractStatus::Adjudicated(bid) => Some(bid),
        }
    }

    /// Highest bid on the contract. Ties resolve to the earliest
    /// submission: the scan replaces the running best only on a strictly
    /// greater amount, keeping the first maximal element in insertion
    /// order.
    pub fn best_bid(&self) -> Option<&Bid> {
        self.bids.iter().reduce(|best, bid| {
            if bid.amount > best.amount {
                bid
            } else {
                best
            }
        })
    }
}

/// Market policy applied at adjudication time.
#[derive(Debug, Clone)]
pub struct SettlementTerms {
    /// Fraction of the winning amount paid to the producer. The complement
    /// flows back to the winning bidder as a bonus.
    pub producer_share: Decimal,
    /// Minimum number of registered accounts before any contract may be
    /// adjudicated.
    pub min_bidders: usize,
}

impl Default for SettlementTerms {
    fn default() -> Self {
        SettlementTerms {
            producer_share: Decimal::new(9, 1),
            min_bidders: 3,
        }
    }
}

/// The auction engine: holds every futures contract, collects bids, and
/// adjudicates winners, settling funds through the [AccountRegistry] and
/// recording each adjudication on the [Ledger].
///
/// Contracts are owned by value; batches are referenced only by
/// [BatchId].
#[derive(Debug, Default)]
pub struct FuturesBook {
    contracts: Vec<FuturesContract>,
    terms: SettlementTerms,
}

impl FuturesBook {
    /// Creates a book with [SettlementTerms::default].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms(terms: SettlementTerms) -> Self {
        FuturesBook {
            contracts: Vec::new(),
            terms,
        }
    }

    pub fn terms(&self) -> &SettlementTerms {
        &self.terms
    }

    pub fn get(&self, id: ContractId) -> Option<&FuturesContract> {
        self.contracts.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Contracts with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ContractId, &FuturesContract)> {
        self.contracts
            .iter()
            .enumerate()
            .map(|(i, contract)| (ContractId(i), contract))
    }

    /// Opens a forward contract drawing `quantity` head from `batch`.
    ///
    /// Fails with [MarketError::BatchNotFound] for an unknown batch, and
    /// with [MarketError::CapacityExceeded] if this producer's cumulative
    /// contracted quantity against the batch (open or adjudicated) plus
    /// `quantity` would exceed the batch's declared head count. The check
    /// happens at creation time only, never retroactively.
    pub fn open_contract(
        &mut self,
        producer: impl Into<String>,
        batch: BatchId,
        quantity: u32,
        delivery: NaiveDate,
        batches: &BatchRegistry,
    ) -> Result<ContractId, MarketError> {
        let producer = producer.into();
        let lot = batches.get(batch).ok_or(MarketError::BatchNotFound(batch))?;

        let committed: u32 = self
            .contracts
            .iter()
            .filter(|c| c.batch == batch && c.producer == producer)
            .map(|c| c.quantity)
            .sum();
        if committed + quantity > lot.quantity {
            return Err(MarketError::CapacityExceeded {
                batch,
                requested: quantity,
                available: lot.quantity - committed,
            });
        }

        self.contracts.push(FuturesContract {
            producer,
            batch,
            quantity,
            delivery,
            bids: Vec::new(),
            status: ContractStatus::Open,
        });

        Ok(ContractId(self.contracts.len() - 1))
    }

    /// Appends a bid to an open contract.
    ///
    /// The bidder's balance is checked live against the registry, never
    /// cached; nothing is escrowed, so the balance is re-validated again
    /// at adjudication time.
    pub fn submit_bid(
        &mut self,
        id: ContractId,
        bidder: impl Into<String>,
        amount: Decimal,
        accounts: &AccountRegistry,
    ) -> Result<(), MarketError> {
        let bidder = bidder.into();
        let contract = self
            .contracts
            .get_mut(id.0)
            .ok_or(MarketError::ContractNotFound(id))?;
        if contract.is_adjudicated() {
            return Err(MarketError::ContractAlreadyAdjudicated(id));
        }

        let balance = accounts
            .balance(&bidder)
            .ok_or_else(|| MarketError::UnknownBidder(bidder.clone()))?;
        if amount > balance {
            return Err(MarketError::InsufficientFunds { bidder, amount });
        }

        contract.bids.push(Bid { bidder, amount });
        Ok(())
    }

    /// Selects the winning bid, settles funds, and records the outcome.
    ///
    /// Checks, in order: the contract exists and is still open, has at
    /// least one bid, and the registry holds at least
    /// [SettlementTerms::min_bidders] accounts. The highest bid wins (ties
    /// to the earliest submission, see [FuturesContract::best_bid]); the
    /// winner pays the full amount, split between the producer at
    /// [SettlementTerms::producer_share] and the winner's own bonus at the
    /// complement.
    ///
    /// Settlement is atomic: because bids are not escrowed, the winner's
    /// balance may have gone stale since submission, in which case the
    /// transfer fails wholesale, the error surfaces as
    /// [MarketError::SettlementFailed], and the contract stays `Open` with
    /// every balance untouched. Only after a successful transfer is the
    /// winner recorded and a settlement block appended to the ledger, so
    /// each successful adjudication produces exactly one block.
    pub fn adjudicate(
        &mut self,
        id: ContractId,
        accounts: &mut AccountRegistry,
        ledger: &mut Ledger,
    ) -> Result<&Bid, MarketError> {
        let contract = self
            .contracts
            .get_mut(id.0)
            .ok_or(MarketError::ContractNotFound(id))?;
        if contract.is_adjudicated() {
            return Err(MarketError::ContractAlreadyAdjudicated(id));
        }
        if contract.bids.is_empty() {
            return Err(MarketError::NoBids(id));
        }
        if accounts.len() < self.terms.min_bidders {
            return Err(MarketError::InsufficientBidders {
                registered: accounts.len(),
                required: self.terms.min_bidders,
            });
        }

        let winner = contract
            .best_bid()
            .expect("bids checked non-empty")
            .clone();
        let bonus_share = Decimal::ONE - self.terms.producer_share;
        accounts
            .transfer_with_split(
                &winner.bidder,
                &contract.producer,
                &winner.bidder,
                winner.amount,
                bonus_share,
            )
            .map_err(MarketError::SettlementFailed)?;

        contract.status = ContractStatus::Adjudicated(winner.clone());
        tracing::info!(
            contract = %id,
            winner = %winner.bidder,
            amount = %winner.amount,
            "contract adjudicated"
        );
        ledger.append(json!({
            "contract": id,
            "producer": contract.producer,
            "winner": winner.bidder,
            "amount": winner.amount,
        }));

        match &self.contracts[id.0].status {
            ContractStatus::Adjudicated(bid) => Ok(bid),
            ContractStatus::Open => unreachable!("winner was just recorded"),
        }
    }
}

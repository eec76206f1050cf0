/*!
Append-only proof-of-work ledger and sealed-bid forward auction engine
for livestock lots.

Producers declare [batches](batch) of livestock, open
[futures contracts](market) against a batch's remaining capacity, and
collect bids from registered [accounts](account). Adjudicating a contract
selects the highest bid, settles funds atomically with a producer/bonus
split, and appends a sealed record of the outcome to the [ledger].

State lives in four explicitly owned objects — [ledger::Ledger],
[account::AccountRegistry], [batch::BatchRegistry], and
[market::FuturesBook] — constructed by the caller and passed into each
operation; there are no ambient globals and no persistence. All mutation
goes through `&mut` receivers, so the single-writer discipline the chain
and the balances rely on is enforced by the borrow checker; concurrent
drivers wrap each object in a `Mutex`.
*/

pub mod account;
pub mod batch;
pub mod block;
pub mod ledger;
pub mod market;
pub mod prelude;
pub mod tally;

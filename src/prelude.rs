/*!
Re-export of the common types for driving a market session. Must be
imported manually.

```
use stockyard::prelude::*;
```
*/

use crate::{account, batch, block, ledger, market, tally};

pub use account::{Account, AccountError, AccountRegistry, KeyMaterial};

pub use batch::{Batch, BatchId, BatchRegistry};

pub use block::Block;

pub use ledger::{Ledger, LedgerError, DEFAULT_DIFFICULTY};

pub use market::{
    Bid, ContractId, ContractStatus, FuturesBook, FuturesContract,
    MarketError, SettlementTerms,
};

pub use tally::MiningTally;

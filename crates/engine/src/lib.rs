//! Debt ledger and settlement engine of FairSplit.
//!
//! The engine turns posted group expenses into pairwise [`Debt`]s, keeps at
//! most one open debt per `(group, currency, pair)` in its canonical
//! direction, suggests simplified [`Transfer`]s, and mediates settlement and
//! dispute [`BalanceRequest`]s between the two parties of a debt.

pub use balance_requests::{BalanceRequest, RequestKind, RequestStatus};
pub use commands::{CreateDisputeCmd, CreateSettlementCmd, ExpenseShare, PaymentMethod, PostExpenseCmd};
pub use currency::Currency;
pub use debts::{Debt, DebtStatus};
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    CurrencyTotals, Engine, EngineBuilder, PendingRequest, SettlementOutcome, UserSummary,
};
pub use simplify::Transfer;
pub use stats::{GroupStats, StatsAdjuster, StoredStats};

mod balance_requests;
mod commands;
mod currency;
mod debts;
mod error;
mod locks;
mod money;
mod netting;
mod ops;
pub mod simplify;
mod stats;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

//! Netting of a new expense share against the existing exposure of a pair.
//!
//! The decision is kept free of storage so the three-way branch can be
//! checked on its own; `ops::ledger` applies the resulting [`NettingPlan`]
//! inside the pair's serialized unit of work, and `ops::settlement` reuses
//! it to move a debt by an accepted dispute's difference.

use crate::{EngineError, Money, ResultEngine};

/// Open exposure between a participant and the payer before a new share is
/// applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Exposure {
    None,
    /// The participant already owes the payer this amount.
    Forward(Money),
    /// The payer owes the participant this amount.
    Reverse(Money),
}

/// What to do with the pair's rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NettingPlan {
    /// Raise the forward row to `amount`.
    Increase { amount: Money },
    /// Lower the reverse row to `amount` (direction unchanged).
    Reduce { amount: Money },
    /// Close the reverse row and open a forward row for `amount`.
    Flip { amount: Money },
    /// Close the reverse row; the pair is now even.
    Close,
    /// Open a forward row for `amount`.
    Create { amount: Money },
}

pub(crate) fn plan(existing: Exposure, share: Money) -> ResultEngine<NettingPlan> {
    if !share.is_positive() {
        return Err(EngineError::InvalidAmount(
            "share amount must be > 0".to_string(),
        ));
    }
    let plan = match existing {
        Exposure::None => NettingPlan::Create { amount: share },
        Exposure::Forward(current) => NettingPlan::Increase {
            amount: current.try_add(share)?,
        },
        Exposure::Reverse(current) if current > share => NettingPlan::Reduce {
            amount: current - share,
        },
        Exposure::Reverse(current) if current < share => NettingPlan::Flip {
            amount: share - current,
        },
        Exposure::Reverse(_) => NettingPlan::Close,
    };
    Ok(plan)
}

//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, Money, ResultEngine};

/// One participant's share of an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub user_id: String,
    pub amount: Money,
}

impl ExpenseShare {
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount: Money) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
        }
    }
}

/// Post an expense paid by `payer_id` and split into `shares`.
#[derive(Clone, Debug)]
pub struct PostExpenseCmd {
    pub group_id: String,
    pub currency: Currency,
    pub payer_id: String,
    pub shares: Vec<ExpenseShare>,
}

impl PostExpenseCmd {
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        currency: Currency,
        payer_id: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            currency,
            payer_id: payer_id.into(),
            shares: Vec::new(),
        }
    }

    #[must_use]
    pub fn share(mut self, user_id: impl Into<String>, amount: Money) -> Self {
        self.shares.push(ExpenseShare::new(user_id, amount));
        self
    }

    #[must_use]
    pub fn shares(mut self, shares: impl IntoIterator<Item = ExpenseShare>) -> Self {
        self.shares.extend(shares);
        self
    }

    /// The whole expense total, the payer's own share included.
    pub fn total(&self) -> ResultEngine<Money> {
        self.shares
            .iter()
            .map(|s| s.amount)
            .try_fold(Money::ZERO, Money::try_add)
    }
}

/// How the counter-party was paid when requesting a settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    /// A payment rail whose success the client reports and the engine trusts
    /// without an acknowledgment step.
    #[serde(alias = "upi")]
    TrustedInstant,
    Other,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::TrustedInstant => "trusted-instant",
            Self::Other => "other",
        }
    }

    /// Settlements through this method skip the two-party handshake.
    pub fn is_trusted_instant(self) -> bool {
        self == Self::TrustedInstant
    }
}

/// Ask the counter-party to acknowledge that a debt was paid.
#[derive(Clone, Debug)]
pub struct CreateSettlementCmd {
    pub debt_id: Uuid,
    pub requested_by: String,
    pub payment_method: PaymentMethod,
}

impl CreateSettlementCmd {
    #[must_use]
    pub fn new(debt_id: Uuid, requested_by: impl Into<String>) -> Self {
        Self {
            debt_id,
            requested_by: requested_by.into(),
            payment_method: PaymentMethod::default(),
        }
    }

    #[must_use]
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}

/// Propose a different amount for a debt.
#[derive(Clone, Debug)]
pub struct CreateDisputeCmd {
    pub debt_id: Uuid,
    pub requested_by: String,
    pub reason: Option<String>,
    pub proposed_amount: Money,
}

impl CreateDisputeCmd {
    #[must_use]
    pub fn new(debt_id: Uuid, requested_by: impl Into<String>, proposed_amount: Money) -> Self {
        Self {
            debt_id,
            requested_by: requested_by.into(),
            reason: None,
            proposed_amount,
        }
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

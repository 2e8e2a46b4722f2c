use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
    Jpy,
    Aud,
    Cad,
    Sgd,
    Aed,
    Chf,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareNew {
        pub user_id: String,
        pub amount_minor: i64,
    }

    /// An expense paid by `payer_id` and split into `shares`.
    ///
    /// The payer may appear in `shares` with their own part; it counts
    /// towards the group's spending but never creates a debt.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: String,
        pub currency: Option<Currency>,
        pub payer_id: String,
        pub shares: Vec<ShareNew>,
    }
}

pub mod debt {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DebtStatus {
        Pending,
        Completed,
        Disputed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtView {
        pub id: Uuid,
        pub group_id: String,
        pub currency: Currency,
        pub ower_id: String,
        pub owed_to_id: String,
        pub amount_minor: i64,
        pub status: DebtStatus,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtList {
        pub debts: Vec<DebtView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub from: String,
        pub to: String,
        pub amount_minor: i64,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferList {
        pub transfers: Vec<TransferView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CurrencyTotalsView {
        pub currency: Currency,
        pub owed_minor: i64,
        pub receivable_minor: i64,
        /// `receivable_minor - owed_minor`.
        pub net_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSummaryView {
        pub user_id: String,
        pub owed: Vec<DebtView>,
        pub receivable: Vec<DebtView>,
        pub totals: Vec<CurrencyTotalsView>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupStatsView {
        pub group_id: String,
        pub budget_minor: i64,
        pub spent_minor: i64,
        pub money_left_minor: i64,
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub budget_minor: i64,
    }
}

pub mod request {
    use super::*;

    /// How the debt was paid. `upi` is accepted as an alias of
    /// `trusted-instant`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum PaymentMethod {
        #[default]
        Cash,
        #[serde(alias = "upi")]
        TrustedInstant,
        Other,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RequestKind {
        Settlement,
        Dispute,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RequestStatus {
        Pending,
        Accepted,
        Rejected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementNew {
        pub debt_id: Uuid,
        pub user_id: String,
        pub payment_method: Option<PaymentMethod>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DisputeNew {
        pub debt_id: Uuid,
        pub user_id: String,
        pub reason: Option<String>,
        pub proposed_amount_minor: i64,
    }

    /// Accept or reject on behalf of `user_id`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestAction {
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceRequestView {
        pub id: Uuid,
        pub kind: RequestKind,
        pub debt_id: Uuid,
        pub group_id: String,
        pub requested_by: String,
        pub target_user_id: String,
        pub status: RequestStatus,
        pub reason: Option<String>,
        pub proposed_amount_minor: Option<i64>,
        /// Debt amount when the dispute was raised.
        pub disputed_amount_minor: Option<i64>,
        pub created_at: DateTime<Utc>,
        pub resolved_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceRequestList {
        pub requests: Vec<BalanceRequestView>,
    }

    /// Either the debt was closed on the spot or a request was opened.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "outcome", rename_all = "snake_case")]
    pub enum SettlementCreated {
        AutoCompleted { debt: super::debt::DebtView },
        Request { request: BalanceRequestView },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingRequestView {
        #[serde(flatten)]
        pub request: BalanceRequestView,
        /// Current amount of the referenced debt.
        pub debt_amount_minor: i64,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingRequestList {
        pub requests: Vec<PendingRequestView>,
    }
}

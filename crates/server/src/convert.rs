//! Mapping between engine values and wire types.

use api_types::{
    Currency,
    debt::{CurrencyTotalsView, DebtStatus, DebtView, TransferView, UserSummaryView},
    request::{BalanceRequestView, PaymentMethod, PendingRequestView, RequestKind, RequestStatus},
    stats::GroupStatsView,
};

pub(crate) fn currency_in(currency: Currency) -> engine::Currency {
    match currency {
        Currency::Inr => engine::Currency::Inr,
        Currency::Usd => engine::Currency::Usd,
        Currency::Eur => engine::Currency::Eur,
        Currency::Gbp => engine::Currency::Gbp,
        Currency::Jpy => engine::Currency::Jpy,
        Currency::Aud => engine::Currency::Aud,
        Currency::Cad => engine::Currency::Cad,
        Currency::Sgd => engine::Currency::Sgd,
        Currency::Aed => engine::Currency::Aed,
        Currency::Chf => engine::Currency::Chf,
    }
}

pub(crate) fn currency_out(currency: engine::Currency) -> Currency {
    match currency {
        engine::Currency::Inr => Currency::Inr,
        engine::Currency::Usd => Currency::Usd,
        engine::Currency::Eur => Currency::Eur,
        engine::Currency::Gbp => Currency::Gbp,
        engine::Currency::Jpy => Currency::Jpy,
        engine::Currency::Aud => Currency::Aud,
        engine::Currency::Cad => Currency::Cad,
        engine::Currency::Sgd => Currency::Sgd,
        engine::Currency::Aed => Currency::Aed,
        engine::Currency::Chf => Currency::Chf,
    }
}

pub(crate) fn payment_method_in(method: PaymentMethod) -> engine::PaymentMethod {
    match method {
        PaymentMethod::Cash => engine::PaymentMethod::Cash,
        PaymentMethod::TrustedInstant => engine::PaymentMethod::TrustedInstant,
        PaymentMethod::Other => engine::PaymentMethod::Other,
    }
}

pub(crate) fn debt_view(debt: &engine::Debt) -> DebtView {
    DebtView {
        id: debt.id,
        group_id: debt.group_id.clone(),
        currency: currency_out(debt.currency),
        ower_id: debt.ower_id.clone(),
        owed_to_id: debt.owed_to_id.clone(),
        amount_minor: debt.amount.minor(),
        status: match debt.status {
            engine::DebtStatus::Pending => DebtStatus::Pending,
            engine::DebtStatus::Completed => DebtStatus::Completed,
            engine::DebtStatus::Disputed => DebtStatus::Disputed,
        },
        created_at: debt.created_at,
        updated_at: debt.updated_at,
    }
}

pub(crate) fn transfer_view(transfer: &engine::Transfer) -> TransferView {
    TransferView {
        from: transfer.from.clone(),
        to: transfer.to.clone(),
        amount_minor: transfer.amount.minor(),
        currency: currency_out(transfer.currency),
    }
}

pub(crate) fn summary_view(summary: &engine::UserSummary) -> UserSummaryView {
    UserSummaryView {
        user_id: summary.user_id.clone(),
        owed: summary.owed.iter().map(debt_view).collect(),
        receivable: summary.receivable.iter().map(debt_view).collect(),
        totals: summary
            .totals
            .iter()
            .map(|t| CurrencyTotalsView {
                currency: currency_out(t.currency),
                owed_minor: t.owed.minor(),
                receivable_minor: t.receivable.minor(),
                net_minor: t.net().minor(),
            })
            .collect(),
    }
}

pub(crate) fn stats_view(stats: &engine::GroupStats) -> GroupStatsView {
    GroupStatsView {
        group_id: stats.group_id.clone(),
        budget_minor: stats.budget.minor(),
        spent_minor: stats.spent.minor(),
        money_left_minor: stats.money_left().minor(),
        updated_at: stats.updated_at,
    }
}

pub(crate) fn request_view(request: &engine::BalanceRequest) -> BalanceRequestView {
    BalanceRequestView {
        id: request.id,
        kind: match request.kind {
            engine::RequestKind::Settlement => RequestKind::Settlement,
            engine::RequestKind::Dispute => RequestKind::Dispute,
        },
        debt_id: request.debt_id,
        group_id: request.group_id.clone(),
        requested_by: request.requested_by.clone(),
        target_user_id: request.target_user_id.clone(),
        status: match request.status {
            engine::RequestStatus::Pending => RequestStatus::Pending,
            engine::RequestStatus::Accepted => RequestStatus::Accepted,
            engine::RequestStatus::Rejected => RequestStatus::Rejected,
        },
        reason: request.reason.clone(),
        proposed_amount_minor: request.proposed_amount.map(engine::Money::minor),
        disputed_amount_minor: request.disputed_amount.map(engine::Money::minor),
        created_at: request.created_at,
        resolved_at: request.resolved_at,
    }
}

pub(crate) fn pending_view(pending: &engine::PendingRequest) -> PendingRequestView {
    PendingRequestView {
        request: request_view(&pending.request),
        debt_amount_minor: pending.debt_amount.minor(),
        currency: currency_out(pending.currency),
    }
}

use tracing::debug;

use crate::models::summary::{FinanceSummary, ReportingPeriod, SeriesBucket};
use crate::models::transaction::{CategoryKind, Transaction, TransactionType};

/// Derives every dashboard figure for one reporting window.
///
/// Pure computation over an already loaded transaction list: same input,
/// same output, no I/O and no failure modes. Recomputed from scratch on
/// every call.
pub struct AggregatorService;

impl AggregatorService {
    pub fn new() -> Self {
        Self
    }

    /// Summarize the full transaction history for `period`.
    ///
    /// Rules:
    /// - only settled transactions move any total or chart bucket
    /// - vault withdrawals are not income: they offset the period's expenses
    /// - the vault balance always spans the whole history, not the window
    pub fn summarize(&self, transactions: &[Transaction], period: &ReportingPeriod) -> FinanceSummary {
        let start = period.start();

        let mut carried_balance = 0.0;
        let mut vault_deposits = 0.0;
        let mut vault_withdrawals = 0.0;
        let mut inflow_total = 0.0;
        let mut outflow_gross_total = 0.0;
        let mut vault_withdrawals_in_period = 0.0;

        let mut period_transactions = Vec::new();
        let mut vault_ledger = Vec::new();
        let mut series = Self::empty_series(period);

        for transaction in transactions {
            let category_kind = transaction.category_kind();

            if category_kind.is_vault() {
                vault_ledger.push(transaction.clone());
            }

            if transaction.settled {
                match (category_kind, transaction.kind) {
                    (CategoryKind::VaultDeposit, TransactionType::Outflow) => {
                        vault_deposits += transaction.amount;
                    }
                    (CategoryKind::VaultWithdrawal, TransactionType::Inflow) => {
                        vault_withdrawals += transaction.amount;
                    }
                    _ => {}
                }
                if transaction.date < start {
                    carried_balance += transaction.signed_amount();
                }
            }

            if !period.contains(transaction.date) {
                continue;
            }
            period_transactions.push(transaction.clone());

            if !transaction.settled {
                continue;
            }

            match transaction.kind {
                TransactionType::Inflow if category_kind != CategoryKind::VaultWithdrawal => {
                    inflow_total += transaction.amount;
                }
                TransactionType::Inflow => {}
                TransactionType::Outflow => outflow_gross_total += transaction.amount,
            }
            if category_kind == CategoryKind::VaultWithdrawal {
                vault_withdrawals_in_period += transaction.amount;
            }

            if let Some(bucket) = series.get_mut(period.bucket_index(transaction.date)) {
                match transaction.kind {
                    TransactionType::Inflow => bucket.inflow += transaction.amount,
                    TransactionType::Outflow => bucket.outflow += transaction.amount,
                }
            }
        }

        let mut running = carried_balance;
        for bucket in &mut series {
            running += bucket.inflow - bucket.outflow;
            bucket.running_balance = running;
        }

        let outflow_net_total = (outflow_gross_total - vault_withdrawals_in_period).max(0.0);
        let accumulated_balance =
            carried_balance + inflow_total - (outflow_gross_total - vault_withdrawals_in_period);
        let savings_rate_percent = if inflow_total > 0.0 {
            (inflow_total - outflow_net_total) / inflow_total * 100.0
        } else {
            0.0
        };

        debug!(
            start = %period.start(),
            end = %period.end(),
            in_period = period_transactions.len(),
            "summarized reporting window"
        );

        FinanceSummary {
            period: *period,
            carried_balance,
            period_transactions,
            inflow_total,
            outflow_gross_total,
            vault_withdrawals_in_period,
            outflow_net_total,
            vault_total: vault_deposits - vault_withdrawals,
            vault_ledger,
            accumulated_balance,
            savings_rate_percent,
            series,
        }
    }

    /// Vault balance over the whole history (deposits minus withdrawals).
    pub fn vault_total(&self, transactions: &[Transaction]) -> f64 {
        transactions
            .iter()
            .filter(|t| t.settled)
            .map(|t| match (t.category_kind(), t.kind) {
                (CategoryKind::VaultDeposit, TransactionType::Outflow) => t.amount,
                (CategoryKind::VaultWithdrawal, TransactionType::Inflow) => -t.amount,
                _ => 0.0,
            })
            .sum()
    }

    fn empty_series(period: &ReportingPeriod) -> Vec<SeriesBucket> {
        (0..period.bucket_count())
            .map(|idx| SeriesBucket {
                label: period.bucket_label(idx),
                inflow: 0.0,
                outflow: 0.0,
                running_balance: 0.0,
            })
            .collect()
    }
}

impl Default for AggregatorService {
    fn default() -> Self {
        Self::new()
    }
}

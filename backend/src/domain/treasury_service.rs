//! Cash ledger. Entries are append-only apart from deletion of mistakes.

use chrono::Utc;
use log::info;
use shared::{
    CategoryTotal, CreateTreasuryTransactionRequest, TransactionKind, TreasuryQuery,
    TreasurySummary, TreasuryTransaction,
};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::calculations::round_cents;
use crate::domain::error::{require_positive, require_text, DomainError, DomainResult};
use crate::storage::{CollectionRepository, StoreConnection};

pub fn matches_query(tx: &TreasuryTransaction, query: &TreasuryQuery) -> bool {
    query.kind.map_or(true, |kind| tx.kind == kind)
        && query
            .category
            .as_ref()
            .map_or(true, |c| tx.category.eq_ignore_ascii_case(c.trim()))
        && query.from.map_or(true, |from| tx.date >= from)
        && query.to.map_or(true, |to| tx.date <= to)
}

/// Totals over a set of transactions; `balance == total_in - total_out`
pub fn summarize(transactions: &[TreasuryTransaction]) -> TreasurySummary {
    let total_in = sum_kind(transactions, TransactionKind::In);
    let total_out = sum_kind(transactions, TransactionKind::Out);
    TreasurySummary {
        total_in,
        total_out,
        balance: round_cents(total_in - total_out),
        transaction_count: transactions.len(),
    }
}

pub fn sum_kind(transactions: &[TreasuryTransaction], kind: TransactionKind) -> f64 {
    round_cents(
        transactions
            .iter()
            .filter(|tx| tx.kind == kind)
            .map(|tx| tx.amount)
            .sum(),
    )
}

#[derive(Clone)]
pub struct TreasuryService {
    transactions: CollectionRepository<TreasuryTransaction>,
}

impl TreasuryService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            transactions: connection.repository(),
        }
    }

    pub async fn record(
        &self,
        request: CreateTreasuryTransactionRequest,
    ) -> DomainResult<TreasuryTransaction> {
        let tx = TreasuryTransaction {
            id: Uuid::new_v4().to_string(),
            date: request.date.unwrap_or_else(|| Utc::now().date_naive()),
            kind: request.kind,
            amount: round_cents(require_positive("Amount", request.amount)?),
            category: require_text("Category", &request.category)?,
            reference_number: request
                .reference_number
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            note: request.note,
        };
        let tx = self.transactions.insert(tx).await?;
        info!(
            "Recorded treasury {:?} of {:.2} ({})",
            tx.kind, tx.amount, tx.category
        );
        Ok(tx)
    }

    /// Matching transactions, newest first
    pub async fn list(&self, query: &TreasuryQuery) -> DomainResult<Vec<TreasuryTransaction>> {
        let mut transactions: Vec<TreasuryTransaction> = self
            .transactions
            .load_all()
            .await?
            .into_iter()
            .filter(|tx| matches_query(tx, query))
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        if !self.transactions.delete(id).await? {
            return Err(DomainError::not_found("Transaction", id));
        }
        info!("Deleted treasury transaction {}", id);
        Ok(())
    }

    pub async fn summary(&self, query: &TreasuryQuery) -> DomainResult<TreasurySummary> {
        Ok(summarize(&self.list(query).await?))
    }

    /// In/out totals per category, alphabetical
    pub async fn by_category(&self, query: &TreasuryQuery) -> DomainResult<Vec<CategoryTotal>> {
        let mut totals: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for tx in self.list(query).await? {
            let entry = totals.entry(tx.category).or_insert((0.0, 0.0));
            match tx.kind {
                TransactionKind::In => entry.0 += tx.amount,
                TransactionKind::Out => entry.1 += tx.amount,
            }
        }
        Ok(totals
            .into_iter()
            .map(|(category, (total_in, total_out))| CategoryTotal {
                category,
                total_in: round_cents(total_in),
                total_out: round_cents(total_out),
            })
            .collect())
    }
}

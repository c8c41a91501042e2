use crate::model::Transaction;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalanceSummary {
    pub total: i64,
    pub unlocked: i64,
}

impl BalanceSummary {
    pub fn locked(&self) -> i64 {
        self.total.saturating_sub(self.unlocked)
    }
}

/// Signed balance over the committed ledger and the pending set.
///
/// With `at_height == None` every output counts. With `Some(h)` an output counts
/// only once its transaction is confirmed at or below `h`. Inputs are subtracted
/// whatever their confirmation state. Committed transactions that are not fully
/// checked contribute nothing; pending ones have no such gate.
pub fn unlocked_amount(
    committed: &[Transaction],
    pending: &[Transaction],
    at_height: Option<u64>,
) -> i64 {
    let committed_sum: i128 = committed
        .iter()
        .filter(|tx| tx.fully_checked)
        .map(|tx| contribution(tx, at_height))
        .sum();
    let pending_sum: i128 = pending.iter().map(|tx| contribution(tx, at_height)).sum();
    saturate(committed_sum + pending_sum)
}

pub fn summarize(
    committed: &[Transaction],
    pending: &[Transaction],
    at_height: Option<u64>,
) -> BalanceSummary {
    BalanceSummary {
        total: unlocked_amount(committed, pending, None),
        unlocked: unlocked_amount(committed, pending, at_height),
    }
}

fn contribution(tx: &Transaction, at_height: Option<u64>) -> i128 {
    let counts_outputs = at_height.map_or(true, |h| tx.is_confirmed(h));
    let outs = if counts_outputs { tx.total_out() } else { 0 };
    outs - tx.total_in()
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

//! Derived statistics over a completed balance trajectory.

use crate::domain::trade::{count_by_operator, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub final_balance: f64,
    pub peak_balance: f64,
    pub trough_balance: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub trades_processed: usize,
    /// Per-operator trade counts, sorted by operator name.
    pub trades_by_operator: Vec<(String, usize)>,
}

impl SimulationSummary {
    pub fn compute(trajectory: &[f64], trades: &[TradeRecord]) -> Self {
        let initial = trajectory.first().copied().unwrap_or(0.0);
        let final_balance = trajectory.last().copied().unwrap_or(initial);

        let peak_balance = trajectory.iter().copied().fold(f64::MIN, f64::max);
        let trough_balance = trajectory.iter().copied().fold(f64::MAX, f64::min);

        let total_return = if initial > 0.0 {
            (final_balance - initial) / initial
        } else {
            0.0
        };

        let mut counts: Vec<(String, usize)> = count_by_operator(trades).into_iter().collect();
        counts.sort_by(|a, b| a.0.cmp(&b.0));

        SimulationSummary {
            final_balance,
            peak_balance,
            trough_balance,
            total_return,
            max_drawdown: compute_drawdown(trajectory),
            trades_processed: trades.len(),
            trades_by_operator: counts,
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak.
fn compute_drawdown(trajectory: &[f64]) -> f64 {
    if trajectory.is_empty() {
        return 0.0;
    }

    let mut peak = trajectory[0];
    let mut max_dd = 0.0_f64;

    for &balance in trajectory {
        if balance > peak {
            peak = balance;
        } else if peak > 0.0 {
            let dd = (peak - balance) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

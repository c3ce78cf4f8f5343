use sha2::{Digest, Sha256};

use crate::matcher::MatchOutput;
use crate::model::{ReconSummary, Winner};

/// Compute summary statistics from one matching pass.
pub fn compute_summary(rows_a: usize, rows_b: usize, output: &MatchOutput, coerced_cells: usize) -> ReconSummary {
    let mut summary = ReconSummary {
        rows_a,
        rows_b,
        matched: output.matched.len(),
        only_a_keys: output.only_a_keys,
        only_b_keys: output.only_b_keys,
        coerced_cells,
        ..ReconSummary::default()
    };

    for m in &output.matched {
        match m.winner {
            Winner::A => summary.a_wins += 1,
            Winner::B => summary.b_wins += 1,
            Winner::Tie => summary.ties += 1,
        }
    }

    summary
}

/// SHA-256 over both inputs (length-prefixed), lowercase hex.
pub fn input_fingerprint(table_a: &[u8], table_b: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for table in [table_a, table_b] {
        hasher.update((table.len() as u64).to_le_bytes());
        hasher.update(table);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

//! End-to-end scenarios over synthetic player tables

mod test_churn;
mod test_experiment;
mod test_loader;

use retention_analytics::{PlayerRecord, PlayerTable};

/// `players` rows for `variant`, the first `retained_7` of which return on day 7.
pub fn arm(variant: &str, players: usize, retained_7: usize, id_offset: u64) -> Vec<PlayerRecord> {
    (0..players)
        .map(|i| {
            let rounds = (i % 97) as u32;
            PlayerRecord::new(
                id_offset + i as u64,
                variant,
                rounds,
                i % 3 != 0,
                i < retained_7,
            )
        })
        .collect()
}

pub fn two_arm_table(control: (usize, usize), treatment: (usize, usize)) -> PlayerTable {
    let mut records = arm("control", control.0, control.1, 0);
    records.extend(arm("treatment", treatment.0, treatment.1, 1_000_000));
    PlayerTable::from_records(records)
}

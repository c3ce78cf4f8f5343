use std::collections::HashMap;

use crate::config::{DuplicatePolicy, TiePolicy};
use crate::error::{DuplicateKey, ReconError};
use crate::model::{CanonicalRecord, MatchKey, MatchedRecord, Source, Winner};

/// Records of one side grouped by key, in first-seen order.
pub(crate) struct KeyIndex<'a> {
    order: Vec<MatchKey>,
    groups: HashMap<MatchKey, Vec<&'a CanonicalRecord>>,
}

impl<'a> KeyIndex<'a> {
    pub(crate) fn build(records: &'a [CanonicalRecord]) -> Self {
        let mut order = Vec::new();
        let mut groups: HashMap<MatchKey, Vec<&'a CanonicalRecord>> = HashMap::new();
        for record in records {
            let key = record.match_key();
            match groups.get_mut(&key) {
                Some(group) => group.push(record),
                None => {
                    order.push(key.clone());
                    groups.insert(key, vec![record]);
                }
            }
        }
        Self { order, groups }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn get(&self, key: &MatchKey) -> Option<&[&'a CanonicalRecord]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub(crate) fn contains(&self, key: &MatchKey) -> bool {
        self.groups.contains_key(key)
    }

    /// (key, records) in first-seen order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&MatchKey, &[&'a CanonicalRecord])> {
        self.order
            .iter()
            .map(move |key| (key, self.groups[key].as_slice()))
    }

    fn duplicates(&self, source: Source, out: &mut Vec<DuplicateKey>) {
        for (key, group) in self.iter() {
            if group.len() > 1 {
                out.push(DuplicateKey {
                    source,
                    key: key.to_string(),
                    lines: group.iter().map(|r| r.line).collect(),
                });
            }
        }
    }
}

/// Decide the winner of one pair. `result` is always the larger total.
pub fn resolve_winner(total_a: f64, total_b: f64, ties: TiePolicy) -> (Winner, f64) {
    let result = total_a.max(total_b);
    let winner = if total_a > total_b {
        Winner::A
    } else if total_b > total_a {
        Winner::B
    } else {
        match ties {
            TiePolicy::FavorA => Winner::A,
            TiePolicy::FavorB => Winner::B,
            TiePolicy::Tie => Winner::Tie,
        }
    };
    (winner, result)
}

#[derive(Debug)]
pub struct MatchOutput {
    pub matched: Vec<MatchedRecord>,
    pub only_a_keys: usize,
    pub only_b_keys: usize,
}

/// Inner-join both sides on MatchKey, in first-seen-in-A order.
pub fn match_records(
    a: &[CanonicalRecord],
    b: &[CanonicalRecord],
    duplicates: DuplicatePolicy,
    ties: TiePolicy,
) -> Result<MatchOutput, ReconError> {
    let a_index = KeyIndex::build(a);
    let b_index = KeyIndex::build(b);

    if duplicates == DuplicatePolicy::Reject {
        let mut found = Vec::new();
        a_index.duplicates(Source::A, &mut found);
        b_index.duplicates(Source::B, &mut found);
        if !found.is_empty() {
            return Err(ReconError::DuplicateKeys(found));
        }
    }

    let mut matched = Vec::new();
    let mut only_a_keys = 0;

    for (key, a_group) in a_index.iter() {
        let Some(b_group) = b_index.get(key) else {
            only_a_keys += 1;
            continue;
        };

        let pairs: Vec<(&CanonicalRecord, &CanonicalRecord)> = match duplicates {
            DuplicatePolicy::Reject | DuplicatePolicy::PairInOrder => {
                if a_group.len() != b_group.len() {
                    log::warn!(
                        "key {key}: {} row(s) in A, {} in B; pairing by row order, surplus dropped",
                        a_group.len(),
                        b_group.len()
                    );
                }
                a_group.iter().copied().zip(b_group.iter().copied()).collect()
            }
            DuplicatePolicy::Cartesian => a_group
                .iter()
                .flat_map(|ra| b_group.iter().map(move |rb| (*ra, *rb)))
                .collect(),
        };

        for (ra, rb) in pairs {
            let (winner, result) = resolve_winner(ra.total_commission, rb.total_commission, ties);
            matched.push(MatchedRecord {
                key: key.clone(),
                a: ra.clone(),
                b: rb.clone(),
                winner,
                result,
            });
        }
    }

    let only_b_keys = b_index.iter().filter(|(key, _)| !a_index.contains(key)).count();

    log::debug!(
        "matched {} pair(s) from {} A key(s) and {} B key(s); {only_a_keys} only in A, {only_b_keys} only in B",
        matched.len(),
        a_index.len(),
        b_index.len(),
    );

    Ok(MatchOutput {
        matched,
        only_a_keys,
        only_b_keys,
    })
}

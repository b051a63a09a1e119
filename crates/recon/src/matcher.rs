use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::key::NormalizedKey;
use crate::model::{MatchedPair, PairMatchOutput};

/// Multi-key outer join of bank keys against books keys.
///
/// Records sharing a key pair up position-wise in input order: the k-th bank
/// record with key K takes the k-th books record with key K, and whatever is
/// left on the longer side stays unmatched. Keys with a null component never
/// match, even against an identical null-bearing key.
///
/// `matched` and `bank_only` follow bank input order, `books_only` follows
/// books input order. Runs in O(n + m).
pub fn match_keys(bank: &[NormalizedKey], books: &[NormalizedKey]) -> PairMatchOutput {
    // Books buckets: key -> row indices, insertion (input) order.
    let mut buckets: FxHashMap<&NormalizedKey, VecDeque<usize>> = FxHashMap::default();
    let mut books_unmatchable = 0;
    for (idx, key) in books.iter().enumerate() {
        if key.is_matchable() {
            buckets.entry(key).or_default().push_back(idx);
        } else {
            books_unmatchable += 1;
        }
    }

    let mut books_used = vec![false; books.len()];
    let mut matched = Vec::new();
    let mut bank_only = Vec::new();
    let mut bank_unmatchable = 0;

    for (idx, key) in bank.iter().enumerate() {
        if !key.is_matchable() {
            bank_unmatchable += 1;
            bank_only.push(idx);
            continue;
        }
        match buckets.get_mut(key).and_then(VecDeque::pop_front) {
            Some(books_idx) => {
                books_used[books_idx] = true;
                matched.push(MatchedPair { bank: idx, books: books_idx });
            }
            None => bank_only.push(idx),
        }
    }

    let books_only = books_used
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(idx, _)| idx)
        .collect();

    PairMatchOutput {
        matched,
        bank_only,
        books_only,
        bank_unmatchable,
        books_unmatchable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActiveFields, ResolvedColumns};
    use crate::key::build_key;
    use crate::model::{Cell, Record};

    fn amount_keys(amounts: &[&str]) -> Vec<NormalizedKey> {
        let cols = ResolvedColumns { amount: 0, date: None, narration: None };
        amounts
            .iter()
            .map(|a| build_key(&Record::new(vec![Cell::from(*a)]), &cols, ActiveFields::default()))
            .collect()
    }

    fn pair(bank: usize, books: usize) -> MatchedPair {
        MatchedPair { bank, books }
    }

    #[test]
    fn exact_match_and_remainders() {
        let bank = amount_keys(&["100", "250", "75"]);
        let books = amount_keys(&["75", "-100", "999"]);
        let out = match_keys(&bank, &books);
        assert_eq!(out.matched, vec![pair(0, 1), pair(2, 0)]);
        assert_eq!(out.bank_only, vec![1]);
        assert_eq!(out.books_only, vec![2]);
    }

    #[test]
    fn duplicate_keys_pair_first_in_order() {
        // bank [A:100, B:100], books [X:100] -> (A, X), B left over
        let bank = amount_keys(&["100", "100"]);
        let books = amount_keys(&["100"]);
        let out = match_keys(&bank, &books);
        assert_eq!(out.matched, vec![pair(0, 0)]);
        assert_eq!(out.bank_only, vec![1]);
        assert!(out.books_only.is_empty());
    }

    #[test]
    fn duplicate_surplus_on_books_side() {
        let bank = amount_keys(&["5", "9"]);
        let books = amount_keys(&["5", "5", "5", "9"]);
        let out = match_keys(&bank, &books);
        assert_eq!(out.matched, vec![pair(0, 0), pair(1, 3)]);
        assert_eq!(out.books_only, vec![1, 2]);
    }

    #[test]
    fn null_keys_never_match() {
        let bank = amount_keys(&["abc", "", "10"]);
        let books = amount_keys(&["abc", "", "10"]);
        let out = match_keys(&bank, &books);
        assert_eq!(out.matched, vec![pair(2, 2)]);
        assert_eq!(out.bank_only, vec![0, 1]);
        assert_eq!(out.books_only, vec![0, 1]);
        assert_eq!(out.bank_unmatchable, 2);
        assert_eq!(out.books_unmatchable, 2);
    }

    #[test]
    fn empty_books_side() {
        let bank = amount_keys(&["1", "2", "3"]);
        let out = match_keys(&bank, &[]);
        assert!(out.matched.is_empty());
        assert_eq!(out.bank_only, vec![0, 1, 2]);
        assert!(out.books_only.is_empty());
    }

    #[test]
    fn empty_bank_side() {
        let books = amount_keys(&["1", "2"]);
        let out = match_keys(&[], &books);
        assert!(out.matched.is_empty());
        assert!(out.bank_only.is_empty());
        assert_eq!(out.books_only, vec![0, 1]);
    }

    #[test]
    fn books_only_keeps_input_order() {
        let bank = amount_keys(&["3"]);
        let books = amount_keys(&["9", "3", "1", "x", "7"]);
        let out = match_keys(&bank, &books);
        assert_eq!(out.books_only, vec![0, 2, 3, 4]);
    }
}

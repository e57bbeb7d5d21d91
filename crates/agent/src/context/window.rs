//! Budgeted windows over conversation history and retrieved pairs.
//!
//! Both selectors stop at the first item that would overflow the budget.
//! Nothing after that point is considered, even if it would fit, so the
//! result is always a contiguous run of the input. Returning a subslice
//! makes that contiguity part of the signature.

use crate::context::token::{Tokenizer, count_pair, count_turn};
use recall_core::message::Turn;

/// A retrieved `(question, answer)` pair.
pub type QaPair = (String, String);

/// The longest suffix of `history` whose total turn cost fits in `budget`.
///
/// Scans newest to oldest. Order within the window is preserved.
pub fn select_recent<'a>(tokenizer: &dyn Tokenizer, history: &'a [Turn], budget: usize) -> &'a [Turn] {
    let mut used = 0usize;
    let mut start = history.len();

    for (i, turn) in history.iter().enumerate().rev() {
        let cost = count_turn(tokenizer, turn);
        if used + cost > budget {
            break;
        }
        used += cost;
        start = i;
    }

    &history[start..]
}

/// The longest prefix of `pairs` whose total pair cost fits in `budget`.
///
/// `pairs` is expected in rank order, most relevant first.
pub fn select_within_budget<'a>(
    tokenizer: &dyn Tokenizer,
    pairs: &'a [QaPair],
    budget: usize,
) -> &'a [QaPair] {
    let mut used = 0usize;
    let mut end = 0usize;

    for (question, answer) in pairs {
        let cost = count_pair(tokenizer, question, answer);
        if used + cost > budget {
            break;
        }
        used += cost;
        end += 1;
    }

    &pairs[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::token::{HeuristicTokenizer, count_turns};

    /// Counts every non-empty text as exactly one token.
    struct UnitTokenizer;

    impl Tokenizer for UnitTokenizer {
        fn name(&self) -> &str {
            "unit"
        }

        fn count(&self, text: &str) -> usize {
            usize::from(!text.is_empty())
        }
    }

    fn pair(q: &str, a: &str) -> QaPair {
        (q.to_string(), a.to_string())
    }

    #[test]
    fn recent_keeps_last_turns_that_fit() {
        let history = vec![
            Turn::user("one"),
            Turn::assistant("two"),
            Turn::user("three"),
            Turn::assistant("four"),
        ];
        let window = select_recent(&UnitTokenizer, &history, 2);
        assert_eq!(window, &history[2..]);
    }

    #[test]
    fn recent_with_zero_budget_is_empty() {
        let history = vec![Turn::user("hello")];
        assert!(select_recent(&UnitTokenizer, &history, 0).is_empty());
    }

    #[test]
    fn recent_of_empty_history_is_empty() {
        assert!(select_recent(&HeuristicTokenizer, &[], 1200).is_empty());
    }

    #[test]
    fn recent_stops_at_first_overflow() {
        // The oversized middle turn blocks the short first one.
        let history = vec![
            Turn::user("hi"),
            Turn::assistant("x".repeat(400)),
            Turn::user("ok"),
        ];
        let window = select_recent(&HeuristicTokenizer, &history, 20);
        assert_eq!(window, &history[2..]);
    }

    #[test]
    fn recent_whole_history_when_it_fits() {
        let history = vec![Turn::user("short"), Turn::assistant("also short")];
        let budget = count_turns(&HeuristicTokenizer, &history);
        assert_eq!(select_recent(&HeuristicTokenizer, &history, budget), &history[..]);
        assert_eq!(
            select_recent(&HeuristicTokenizer, &history, budget - 1),
            &history[1..]
        );
    }

    #[test]
    fn recent_window_never_exceeds_budget() {
        let history: Vec<Turn> = (0..30)
            .map(|i| Turn::user(format!("message number {i} {}", "word ".repeat(i % 7))))
            .collect();
        for budget in [0, 1, 5, 17, 60, 200, 10_000] {
            let window = select_recent(&HeuristicTokenizer, &history, budget);
            assert!(count_turns(&HeuristicTokenizer, window) <= budget);
        }
    }

    #[test]
    fn within_budget_keeps_ranked_prefix() {
        let pairs = vec![pair("q1", "a1"), pair("q2", "a2"), pair("q3", "a3")];
        let kept = select_within_budget(&UnitTokenizer, &pairs, 2);
        assert_eq!(kept, &pairs[..2]);
    }

    #[test]
    fn within_budget_stops_at_first_overflow() {
        let pairs = vec![
            pair("short", "short"),
            pair("long", &"x".repeat(1000)),
            pair("short", "again"),
        ];
        let kept = select_within_budget(&HeuristicTokenizer, &pairs, 50);
        assert_eq!(kept, &pairs[..1]);
    }

    #[test]
    fn within_budget_oversized_first_pair_yields_nothing() {
        let pairs = vec![pair("q", &"x".repeat(1000)), pair("q", "a")];
        assert!(select_within_budget(&HeuristicTokenizer, &pairs, 10).is_empty());
    }

    #[test]
    fn within_budget_of_no_pairs_is_empty() {
        assert!(select_within_budget(&HeuristicTokenizer, &[], 800).is_empty());
    }

    #[test]
    fn within_budget_is_idempotent() {
        let pairs: Vec<QaPair> = (0..10)
            .map(|i| pair(&format!("question {i}"), &"answer ".repeat(i * 3 + 1)))
            .collect();
        for budget in [0, 5, 20, 60, 500] {
            let once = select_within_budget(&HeuristicTokenizer, &pairs, budget);
            let twice = select_within_budget(&HeuristicTokenizer, once, budget);
            assert_eq!(twice, once, "budget {budget}");
        }
    }

    #[test]
    fn recent_is_idempotent() {
        let history: Vec<Turn> = (0..10)
            .map(|i| Turn::user(format!("turn {i} {}", "word ".repeat(i * 2))))
            .collect();
        for budget in [0, 5, 20, 60, 500] {
            let once = select_recent(&HeuristicTokenizer, &history, budget);
            let twice = select_recent(&HeuristicTokenizer, once, budget);
            assert_eq!(twice, once, "budget {budget}");
        }
    }
}

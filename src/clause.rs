//! Clause assembly
//!
//! A clause is its head plus every descendant reachable without passing
//! through another clause head. A nested head cuts its whole branch: neither
//! it nor anything below it belongs to the enclosing clause.

use crate::tree::{Sentence, TokenIdx, mean};

/// A clause: head, non-clausal descendants, and their surface string
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    head: TokenIdx,
    /// Non-clausal descendants in pre-order, head excluded
    descendants: Vec<TokenIdx>,
    form: String,
    mean_distance: f64,
}

impl Clause {
    /// Assemble the clause headed by `head`
    pub fn assemble(sentence: &Sentence, head: TokenIdx) -> Self {
        let descendants = non_clausal_descendants(sentence, head);

        let mut form = String::new();
        for &idx in &descendants {
            form.push_str(&sentence.token(idx).form);
            form.push(' ');
        }
        form.push_str(&sentence.token(head).form);

        let distances: Vec<usize> = descendants
            .iter()
            .map(|&idx| sentence.token(idx))
            .filter(|t| !t.is_clause_head() && !t.is_punct())
            .map(|t| t.distance)
            .collect();

        Self {
            head,
            descendants,
            form,
            mean_distance: mean(&distances),
        }
    }

    pub fn head(&self) -> TokenIdx {
        self.head
    }

    /// Members other than the head, in pre-order
    pub fn descendants(&self) -> &[TokenIdx] {
        &self.descendants
    }

    /// All members: descendants in pre-order, then the head
    pub fn tokens(&self) -> impl Iterator<Item = TokenIdx> + '_ {
        self.descendants
            .iter()
            .copied()
            .chain(std::iter::once(self.head))
    }

    pub fn contains(&self, idx: TokenIdx) -> bool {
        idx == self.head || self.descendants.contains(&idx)
    }

    /// Member forms, pre-order with the head last
    pub fn form(&self) -> &str {
        &self.form
    }

    pub fn mean_distance(&self) -> f64 {
        self.mean_distance
    }

    /// Number of members, head included; never zero
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.descendants.len() + 1
    }

    /// Total character count of the non-head member forms
    pub fn char_length(&self, sentence: &Sentence) -> usize {
        self.descendants
            .iter()
            .map(|&idx| sentence.token(idx).form.chars().count())
            .sum()
    }
}

/// Descendants of `head` not gated behind another clause head, in pre-order
pub fn non_clausal_descendants(sentence: &Sentence, head: TokenIdx) -> Vec<TokenIdx> {
    let mut collected = Vec::new();
    let mut stack: Vec<TokenIdx> = sentence
        .token(head)
        .direct_children()
        .iter()
        .rev()
        .copied()
        .collect();

    while let Some(idx) = stack.pop() {
        let token = sentence.token(idx);
        if token.is_clause_head() {
            continue;
        }
        collected.push(idx);
        stack.extend(token.direct_children().iter().rev().copied());
    }

    collected
}

impl Sentence {
    /// Rebuild the clause list from the current clause tags
    ///
    /// Clauses are ordered by ascending id of their heads.
    pub fn identify_clauses(&mut self) {
        let view: &Sentence = self;
        let clauses: Vec<Clause> = (0..view.len())
            .filter(|&idx| view.token(idx).is_clause_head())
            .map(|idx| Clause::assemble(view, idx))
            .collect();
        self.clauses = clauses;
    }

    /// Whether the token governs at least one dependent outside nested clauses
    pub fn has_non_clausal_child(&self, idx: TokenIdx) -> bool {
        self.children_of(self.token(idx))
            .any(|child| !child.is_clause_head())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::tree::Token;
    use crate::tree::tests::complement_clause_tokens;
    use std::collections::HashSet;

    const FIN: &str = "VB-S---3P-AA---";

    fn analysed(tokens: Vec<Token>) -> Sentence {
        let mut sentence = Sentence::build("test", None, tokens).unwrap();
        classify(&mut sentence);
        sentence.identify_clauses();
        sentence
    }

    fn ids(sentence: &Sentence, clause: &Clause) -> Vec<usize> {
        let mut ids: Vec<usize> = clause.tokens().map(|idx| sentence.token(idx).id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_complement_clause_scenario() {
        let sentence = analysed(complement_clause_tokens());

        assert_eq!(sentence.clause_count(), 2);
        let main = &sentence.clauses()[0];
        let complement = &sentence.clauses()[1];

        assert_eq!(main.head(), 1);
        assert_eq!(ids(&sentence, main), vec![1, 2]);
        assert_eq!(main.form(), "jan říká");

        assert_eq!(complement.head(), 5);
        assert_eq!(ids(&sentence, complement), vec![4, 5, 6]);
        assert_eq!(complement.form(), "že petr spí");
        assert!(!main.contains(5));
    }

    #[test]
    fn test_surface_string_is_preorder_with_head_last() {
        // 1 velký <- 2 pes <- 3 štěká -> 4 hlasitě
        let sentence = analysed(vec![
            Token::new(1, "velký", "ADJ", "AA", 2, "mod"),
            Token::new(2, "pes", "NOUN", "NN", 3, "subj"),
            Token::new(3, "štěká", "VERB", FIN, 0, "root"),
            Token::new(4, "hlasitě", "ADV", "Dg", 3, "mod"),
        ]);
        let clause = &sentence.clauses()[0];
        assert_eq!(clause.form(), "pes velký hlasitě štěká");
        assert_eq!(clause.descendants(), &[1, 0, 3]);
        assert_eq!(clause.char_length(&sentence), 3 + 5 + 7);
    }

    #[test]
    fn test_nested_head_cuts_its_branch() {
        // root verb -> noun -> relative verb -> its object
        let sentence = analysed(vec![
            Token::new(1, "vidím", "VERB", FIN, 0, "root"),
            Token::new(2, "dům", "NOUN", "NN", 1, "comp:obj"),
            Token::new(3, "který", "DET", "P4", 4, "subj"),
            Token::new(4, "stojí", "VERB", FIN, 2, "mod"),
            Token::new(5, "tam", "ADV", "Db", 4, "mod"),
        ]);

        assert_eq!(sentence.clause_count(), 2);
        assert_eq!(ids(&sentence, &sentence.clauses()[0]), vec![1, 2]);
        assert_eq!(ids(&sentence, &sentence.clauses()[1]), vec![3, 4, 5]);
        assert!(sentence.has_non_clausal_child(0));
        assert!(!sentence.has_non_clausal_child(1));
    }

    #[test]
    fn test_clauses_partition_non_punct_tokens() {
        let sentence = analysed(complement_clause_tokens());

        let mut seen = HashSet::new();
        for clause in sentence.clauses() {
            for idx in clause.tokens() {
                assert!(seen.insert(idx), "token {} in two clauses", idx);
            }
        }
        let expected: HashSet<_> = sentence
            .tokens()
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_punct())
            .map(|(idx, _)| idx)
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_mean_distance() {
        let sentence = analysed(complement_clause_tokens());

        // Jan -> říká: 1
        assert_eq!(sentence.clauses()[0].mean_distance(), 1.0);
        // že -> spí: 2, Petr -> spí: 1
        assert_eq!(sentence.clauses()[1].mean_distance(), 1.5);

        let lone = analysed(vec![Token::new(1, "prší", "VERB", FIN, 0, "root")]);
        assert_eq!(lone.clauses()[0].mean_distance(), 0.0);
        assert_eq!(lone.clauses()[0].len(), 1);
        assert_eq!(lone.clauses()[0].form(), "prší");
    }

    #[test]
    fn test_only_clausal_children() {
        let sentence = analysed(vec![
            Token::new(1, "přišel", "VERB", FIN, 0, "root"),
            Token::new(2, "odešel", "VERB", FIN, 1, "conj"),
        ]);
        assert!(!sentence.has_non_clausal_child(0));
        assert!(sentence.has_predicate_root());
    }
}

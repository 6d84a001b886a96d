//! Clause-head classification
//!
//! A clause head is a predicate-bearing word governing its own finite
//! clause. Classification is local pattern matching over UPOS, the XPOS
//! prefix, the relation label, and at most two ancestors. Each rule is an
//! independent predicate; a token is a clause head if any rule matches.
//! A second pass then tags finite verbs coordinated with a finite verb.

use crate::tree::{CONJ, Sentence, Token, TokenIdx};

/// A named clause-head predicate
#[derive(Clone, Copy)]
pub struct ClauseRule {
    pub name: &'static str,
    pub matches: fn(&Sentence, TokenIdx) -> bool,
}

impl std::fmt::Debug for ClauseRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClauseRule").field(&self.name).finish()
    }
}

/// The clause-head rule table, evaluated as an OR-fold
pub const CLAUSE_RULES: [ClauseRule; 10] = [
    ClauseRule {
        name: "root-predicate",
        matches: root_predicate,
    },
    ClauseRule {
        name: "attributive-predicate",
        matches: attributive_predicate,
    },
    ClauseRule {
        name: "dependent-of-root-predicate",
        matches: dependent_of_root_predicate,
    },
    ClauseRule {
        name: "subordinate-clause",
        matches: subordinate_clause,
    },
    ClauseRule {
        name: "object-clause",
        matches: object_clause,
    },
    ClauseRule {
        name: "object-clause-via-determiner",
        matches: object_clause_via_determiner,
    },
    ClauseRule {
        name: "object-clause-via-subordinator",
        matches: object_clause_via_subordinator,
    },
    ClauseRule {
        name: "infinitival-complement",
        matches: infinitival_complement,
    },
    ClauseRule {
        name: "stacked-predicate",
        matches: stacked_predicate,
    },
    ClauseRule {
        name: "coordinate-clause",
        matches: coordinate_clause,
    },
];

/// Finite VERB/AUX that is not an auxiliary complement
fn is_clausal_verb(token: &Token) -> bool {
    token.is_finite_verb() && !token.is_aux_complement()
}

fn root_predicate(sentence: &Sentence, idx: TokenIdx) -> bool {
    sentence.is_root(idx) && sentence.token(idx).is_finite_verb()
}

fn attributive_predicate(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    sentence
        .parent_of(token)
        .is_some_and(|p| p.upos == "NOUN" || p.upos == "PROPN")
        && is_clausal_verb(token)
}

fn dependent_of_root_predicate(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    token.parent().is_some_and(|p| sentence.is_root(p)) && is_clausal_verb(token)
}

fn subordinate_clause(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    token.upos == "SCONJ" && sentence.children_of(token).any(is_clausal_verb)
}

fn object_clause(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    let (Some(parent), Some(grandparent)) =
        (sentence.parent_of(token), sentence.grandparent_of(token))
    else {
        return false;
    };
    grandparent.is_finite_verb() && parent.is_finite_verb() && is_clausal_verb(token)
}

fn object_clause_via_determiner(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    sentence.parent_of(token).is_some_and(|p| p.upos == "DET") && is_clausal_verb(token)
}

fn object_clause_via_subordinator(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    let (Some(parent), Some(grandparent)) =
        (sentence.parent_of(token), sentence.grandparent_of(token))
    else {
        return false;
    };
    grandparent.upos == "SCONJ" && parent.is_finite_verb() && is_clausal_verb(token)
}

// The one rule that admits the non-finite form itself.
fn infinitival_complement(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    token.is_verbal()
        && !token.is_finite()
        && sentence.parent_of(token).is_some_and(Token::is_finite_verb)
}

fn stacked_predicate(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    sentence.parent_of(token).is_some_and(is_clausal_verb) && is_clausal_verb(token)
}

fn coordinate_clause(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    let (Some(parent), Some(grandparent)) =
        (sentence.parent_of(token), sentence.grandparent_of(token))
    else {
        return false;
    };
    parent.upos == "CCONJ" && grandparent.is_finite_verb() && is_clausal_verb(token)
}

/// Whether any rule in the table matches the token
pub fn is_clause_head_candidate(sentence: &Sentence, idx: TokenIdx) -> bool {
    CLAUSE_RULES.iter().any(|rule| (rule.matches)(sentence, idx))
}

/// Names of the rules matching the token, in table order
pub fn matching_rules(sentence: &Sentence, idx: TokenIdx) -> Vec<&'static str> {
    CLAUSE_RULES
        .iter()
        .filter(|rule| (rule.matches)(sentence, idx))
        .map(|rule| rule.name)
        .collect()
}

/// Whether a `conj` dependent is a finite verb coordinated with a finite verb
pub fn is_coordinated_predicate(sentence: &Sentence, idx: TokenIdx) -> bool {
    let token = sentence.token(idx);
    token.deprel == CONJ
        && token.is_finite_verb()
        && sentence.parent_of(token).is_some_and(Token::is_finite_verb)
}

/// Tag every token matched by the rule table
pub fn tag_predicates(sentence: &mut Sentence) {
    let view: &Sentence = sentence;
    let heads: Vec<TokenIdx> = (0..view.len())
        .filter(|&idx| is_clause_head_candidate(view, idx))
        .collect();
    mark(sentence, &heads);
}

/// Tag finite verbs coordinated with a finite verb
pub fn tag_conj_predicates(sentence: &mut Sentence) {
    let view: &Sentence = sentence;
    let heads: Vec<TokenIdx> = (0..view.len())
        .filter(|&idx| is_coordinated_predicate(view, idx))
        .collect();
    mark(sentence, &heads);
}

/// Run both classification passes
pub fn classify(sentence: &mut Sentence) {
    tag_predicates(sentence);
    tag_conj_predicates(sentence);
}

fn mark(sentence: &mut Sentence, heads: &[TokenIdx]) {
    let tokens = sentence.tokens_mut();
    for &idx in heads {
        tokens[idx].mark_clause_head();
    }
}

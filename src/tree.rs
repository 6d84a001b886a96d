//! Dependency tree data structures
//!
//! A [`Sentence`] owns its tokens in an arena (`Vec<Token>`); the linear
//! successor, parent, and children links are stored as arena indices so the
//! naturally bidirectional parent/child relation needs no shared ownership.
//!
//! Token ids are 1-based as in CoNLL-U; arena indices are 0-based, so the
//! token with id `n` lives at index `n - 1` once the sequence is linked.

use crate::clause::Clause;
use thiserror::Error;

/// Index of a token within its sentence's arena
pub type TokenIdx = usize;

/// Relation label for punctuation
pub const PUNCT: &str = "punct";
/// Relation label for the root
pub const ROOT: &str = "root";
/// Relation label for coordinated conjuncts
pub const CONJ: &str = "conj";
/// Relation label for auxiliary complements
pub const COMP_AUX: &str = "comp:aux";
/// XPOS prefix of the non-finite verb form
pub const NON_FINITE_PREFIX: &str = "Vf";

/// Structural defect in a sentence's token sequence or head links
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("sentence {sentence_id}: token id {found} at position {position}, expected {expected}")]
    NonContiguousIds {
        sentence_id: String,
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("sentence {sentence_id}: token {token_id} has head {head} outside 0..={len}")]
    HeadOutOfRange {
        sentence_id: String,
        token_id: usize,
        head: usize,
        len: usize,
    },

    #[error("sentence {sentence_id}: token {token_id} lies on a head cycle")]
    Cycle { sentence_id: String, token_id: usize },
}

/// Clause classification state of a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClauseTag {
    #[default]
    Unset,
    ClauseHead,
}

/// A word in a dependency tree
#[derive(Debug, Clone)]
pub struct Token {
    pub id: usize,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: String,
    pub head: usize,
    pub deprel: String,
    pub deps: String,
    pub transliteration: Option<String>,
    pub distance: usize,
    next: Option<TokenIdx>,
    parent: Option<TokenIdx>,
    direct_children: Vec<TokenIdx>,
    all_children: Vec<TokenIdx>,
    clause_tag: ClauseTag,
}

impl Token {
    /// Create an unlinked token with the attributes the analyses look at
    pub fn new(id: usize, form: &str, upos: &str, xpos: &str, head: usize, deprel: &str) -> Self {
        Self::with_full_fields(
            id,
            form.to_lowercase(),
            form.to_string(),
            upos.to_string(),
            xpos.to_string(),
            "_".to_string(),
            head,
            deprel.to_string(),
            "_".to_string(),
            None,
        )
    }

    /// Create an unlinked token from all CoNLL-U columns
    ///
    /// `form` is stored as given; callers are expected to case-fold it.
    #[allow(clippy::too_many_arguments)]
    pub fn with_full_fields(
        id: usize,
        form: String,
        lemma: String,
        upos: String,
        xpos: String,
        feats: String,
        head: usize,
        deprel: String,
        deps: String,
        transliteration: Option<String>,
    ) -> Self {
        let distance = if deprel != ROOT && deprel != PUNCT {
            head.abs_diff(id)
        } else {
            0
        };
        Self {
            id,
            form,
            lemma,
            upos,
            xpos,
            feats,
            head,
            deprel,
            deps,
            transliteration,
            distance,
            next: None,
            parent: None,
            direct_children: Vec::new(),
            all_children: Vec::new(),
            clause_tag: ClauseTag::Unset,
        }
    }

    /// Linear successor in the sentence
    pub fn next(&self) -> Option<TokenIdx> {
        self.next
    }

    /// Syntactic parent (None for the root and for punctuation)
    pub fn parent(&self) -> Option<TokenIdx> {
        self.parent
    }

    /// Direct dependents in ascending id order
    pub fn direct_children(&self) -> &[TokenIdx] {
        &self.direct_children
    }

    /// All transitive dependents, in discovery order
    pub fn all_children(&self) -> &[TokenIdx] {
        &self.all_children
    }

    pub fn clause_tag(&self) -> ClauseTag {
        self.clause_tag
    }

    pub fn is_clause_head(&self) -> bool {
        self.clause_tag == ClauseTag::ClauseHead
    }

    /// Tag this token as a clause head. There is no way back.
    pub fn mark_clause_head(&mut self) {
        self.clause_tag = ClauseTag::ClauseHead;
    }

    pub fn is_punct(&self) -> bool {
        self.deprel == PUNCT
    }

    /// VERB or AUX
    pub fn is_verbal(&self) -> bool {
        self.upos == "VERB" || self.upos == "AUX"
    }

    /// True unless the fine tag marks the non-finite form
    pub fn is_finite(&self) -> bool {
        !self.xpos.starts_with(NON_FINITE_PREFIX)
    }

    pub fn is_aux_complement(&self) -> bool {
        self.deprel == COMP_AUX
    }

    /// VERB/AUX in a finite form
    pub fn is_finite_verb(&self) -> bool {
        self.is_verbal() && self.is_finite()
    }
}

/// A dependency-parsed sentence
#[derive(Debug, Clone)]
pub struct Sentence {
    pub id: String,
    pub text: Option<String>,
    tokens: Vec<Token>,
    root: Option<TokenIdx>,
    pub(crate) clauses: Vec<Clause>,
}

impl Sentence {
    /// Create an unlinked sentence; see [`Sentence::build`] for the linked form
    pub(crate) fn new(id: impl Into<String>, text: Option<String>, tokens: Vec<Token>) -> Self {
        Self {
            id: id.into(),
            text,
            tokens,
            root: None,
            clauses: Vec::new(),
        }
    }

    /// Create a sentence and link its sequence, head relations, and descendants
    pub fn build(
        id: impl Into<String>,
        text: Option<String>,
        tokens: Vec<Token>,
    ) -> Result<Self, StructuralError> {
        let mut sentence = Self::new(id, text, tokens);
        sentence.link_sequence()?;
        sentence.link_parent_child()?;
        sentence.compute_descendants()?;
        Ok(sentence)
    }

    /// Chain every token to its successor, requiring ids `1..=n` in order
    pub fn link_sequence(&mut self) -> Result<(), StructuralError> {
        for (position, token) in self.tokens.iter().enumerate() {
            if token.id != position + 1 {
                return Err(StructuralError::NonContiguousIds {
                    sentence_id: self.id.clone(),
                    position: position + 1,
                    expected: position + 1,
                    found: token.id,
                });
            }
        }

        let len = self.tokens.len();
        for (idx, token) in self.tokens.iter_mut().enumerate() {
            token.next = (idx + 1 < len).then_some(idx + 1);
        }
        Ok(())
    }

    /// Resolve heads into parent links and children lists
    ///
    /// The first non-punctuation token with head 0 becomes the sentence root;
    /// punctuation stays out of the graph entirely, even when attached to 0.
    pub fn link_parent_child(&mut self) -> Result<(), StructuralError> {
        let len = self.tokens.len();
        for idx in 0..len {
            let head = self.tokens[idx].head;
            if head > len {
                return Err(StructuralError::HeadOutOfRange {
                    sentence_id: self.id.clone(),
                    token_id: self.tokens[idx].id,
                    head,
                    len,
                });
            }

            if self.tokens[idx].is_punct() {
                continue;
            }
            if head == 0 {
                if self.root.is_none() {
                    self.root = Some(idx);
                }
                continue;
            }

            let parent = head - 1;
            self.tokens[idx].parent = Some(parent);
            self.tokens[parent].direct_children.push(idx);
        }
        Ok(())
    }

    /// Add every non-punctuation token to the descendant list of each ancestor
    pub fn compute_descendants(&mut self) -> Result<(), StructuralError> {
        let len = self.tokens.len();
        for idx in 0..len {
            if self.tokens[idx].is_punct() {
                continue;
            }

            let mut steps = 0;
            let mut ancestor = self.tokens[idx].parent;
            while let Some(a) = ancestor {
                steps += 1;
                if steps > len {
                    return Err(StructuralError::Cycle {
                        sentence_id: self.id.clone(),
                        token_id: self.tokens[idx].id,
                    });
                }
                self.tokens[a].all_children.push(idx);
                ancestor = self.tokens[a].parent;
            }
        }
        Ok(())
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub fn token(&self, idx: TokenIdx) -> &Token {
        &self.tokens[idx]
    }

    /// Look a token up by its 1-based id
    pub fn by_id(&self, id: usize) -> Option<&Token> {
        id.checked_sub(1).and_then(|idx| self.tokens.get(idx))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn root(&self) -> Option<TokenIdx> {
        self.root
    }

    pub fn is_root(&self, idx: TokenIdx) -> bool {
        self.root == Some(idx)
    }

    pub fn parent_of(&self, token: &Token) -> Option<&Token> {
        token.parent.map(|p| &self.tokens[p])
    }

    pub fn grandparent_of(&self, token: &Token) -> Option<&Token> {
        self.parent_of(token).and_then(|p| self.parent_of(p))
    }

    pub fn children_of<'a>(&'a self, token: &'a Token) -> impl Iterator<Item = &'a Token> + 'a {
        token.direct_children.iter().map(move |&c| &self.tokens[c])
    }

    /// Clauses in ascending order of their heads
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the root token heads a clause
    pub fn has_predicate_root(&self) -> bool {
        self.root
            .is_some_and(|r| self.tokens[r].is_clause_head())
    }

    /// Mean dependency distance over tokens that are neither root nor punctuation
    pub fn mean_dependency_distance(&self) -> f64 {
        let distances: Vec<usize> = self
            .tokens
            .iter()
            .filter(|t| t.deprel != ROOT && t.deprel != PUNCT)
            .map(|t| t.distance)
            .collect();
        mean(&distances)
    }
}

pub(crate) fn mean(values: &[usize]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<usize>() as f64 / values.len() as f64
    }
}

//! Linear dependency segments
//!
//! A clause's members, sorted by position, are cut into maximal runs in
//! which every consecutive pair is both linearly adjacent (punctuation in
//! between is ignored) and linked by a direct head relation in either
//! direction.

use crate::clause::Clause;
use crate::tree::{Sentence, Token, TokenIdx};
use thiserror::Error;

/// Failure while walking the linear chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("sentence {sentence_id}: no content token follows token {token_id}")]
    UndefinedTraversal {
        sentence_id: String,
        token_id: usize,
    },
}

/// A run of clause members, in position order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    tokens: Vec<TokenIdx>,
}

impl Segment {
    pub fn tokens(&self) -> &[TokenIdx] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Space-joined member forms
    pub fn forms(&self, sentence: &Sentence) -> String {
        self.join(sentence, |t| t.form.as_str())
    }

    /// Space-joined member relations
    pub fn deprels(&self, sentence: &Sentence) -> String {
        self.join(sentence, |t| t.deprel.as_str())
    }

    fn join<'a>(&self, sentence: &'a Sentence, field: impl Fn(&'a Token) -> &'a str) -> String {
        self.tokens
            .iter()
            .map(|&idx| field(sentence.token(idx)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// First non-punctuation token after `idx`, if the sentence has one
pub fn next_content(sentence: &Sentence, idx: TokenIdx) -> Option<TokenIdx> {
    let mut next = sentence.token(idx).next()?;
    while sentence.token(next).is_punct() {
        next = sentence.token(next).next()?;
    }
    Some(next)
}

fn directly_linked(a: &Token, b: &Token) -> bool {
    a.id == b.head || a.head == b.id
}

/// Partition a clause into linear dependency segments
pub fn linear_segments(sentence: &Sentence, clause: &Clause) -> Result<Vec<Segment>, SegmentError> {
    if clause.descendants().is_empty() {
        return Ok(vec![Segment {
            tokens: vec![clause.head()],
        }]);
    }

    let mut nodes: Vec<TokenIdx> = clause.tokens().collect();
    nodes.sort_unstable();

    let mut segments = Vec::new();
    let mut current = Segment::default();

    for pair in nodes.windows(2) {
        let (here, there) = (pair[0], pair[1]);
        let neighbour =
            next_content(sentence, here).ok_or_else(|| SegmentError::UndefinedTraversal {
                sentence_id: sentence.id.clone(),
                token_id: sentence.token(here).id,
            })?;

        current.tokens.push(here);
        if neighbour != there || !directly_linked(sentence.token(here), sentence.token(there)) {
            segments.push(std::mem::take(&mut current));
        }
    }

    if let Some(&last) = nodes.last() {
        current.tokens.push(last);
    }
    segments.push(current);

    Ok(segments)
}

impl Sentence {
    /// Segments of every clause, in clause order
    pub fn clause_segments(&self) -> Result<Vec<Vec<Segment>>, SegmentError> {
        self.clauses()
            .iter()
            .map(|clause| linear_segments(self, clause))
            .collect()
    }
}

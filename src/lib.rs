//! Treelds: clauses and linear dependency segments in dependency parses
//!
//! Reads CoNLL-U treebanks, finds the words heading finite clauses, splits
//! each clause into maximal runs of tokens that are both linearly adjacent
//! and directly linked by a dependency, and tallies those runs.

pub mod bytes; // Byte-level field splitting and integer parsing
pub mod classify; // Clause-head rule table
pub mod clause; // Clause assembly
pub mod conllu; // CoNLL-U file parsing
pub mod distribution; // Frequency tables over segments
pub mod segment; // Linear dependency segmentation
pub mod tree; // Token arena and tree construction
pub mod treebank; // Sources, loading, and the per-sentence pipeline

// Re-exports for convenience
pub use classify::{CLAUSE_RULES, ClauseRule, classify};
pub use clause::Clause;
pub use conllu::{ConlluReader, ParseError, SentenceRecords};
pub use distribution::{Distribution, FrequencyTable};
pub use segment::{Segment, SegmentError, linear_segments};
pub use tree::{ClauseTag, Sentence, StructuralError, Token, TokenIdx};
pub use treebank::{LoadOptions, Treebank, TreebankError, TreebankSource, analyze};

//! Frequency tables over linear dependency segments
//!
//! Every segment contributes one word-form string (space-joined forms),
//! one relation string (space-joined deprels), and one length. Counts are
//! kept in first-seen order so that the stable frequency sort breaks ties
//! by first appearance.

use crate::segment::SegmentError;
use crate::tree::Sentence;
use crate::treebank::Treebank;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::hash::Hash;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const WORD_FORM_FILE: &str = "LDS_word_form.txt";
pub const DEPREL_FILE: &str = "LDS_deprel.txt";
pub const LENGTH_FILE: &str = "LDS_length.txt";

/// Insertion-ordered tally
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    index: FxHashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.index.get(key).map_or(0, |&slot| self.entries[slot].1)
    }

    /// Distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Entries in first-seen order
    pub fn entries(&self) -> &[(K, usize)] {
        &self.entries
    }

    /// Entries by descending count, ties in first-seen order
    pub fn by_frequency(&self) -> Vec<(K, usize)> {
        let mut rows = self.entries.clone();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

impl<K: Hash + Eq + Clone + Ord> FrequencyTable<K> {
    /// Entries by ascending key
    pub fn by_key(&self) -> Vec<(K, usize)> {
        let mut rows = self.entries.clone();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}

/// Word-form, relation, and length distributions of segments
#[derive(Debug, Clone, Default)]
pub struct Distribution {
    pub word_forms: FrequencyTable<String>,
    pub deprels: FrequencyTable<String>,
    pub lengths: FrequencyTable<usize>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every segment of every clause in the treebank
    pub fn from_treebank(treebank: &Treebank) -> Result<Self, SegmentError> {
        let mut distribution = Self::new();
        for sentence in treebank.sentences() {
            distribution.add_sentence(sentence)?;
        }
        Ok(distribution)
    }

    /// Tally the segments of one sentence's clauses
    pub fn add_sentence(&mut self, sentence: &Sentence) -> Result<(), SegmentError> {
        for segments in sentence.clause_segments()? {
            for segment in segments {
                self.word_forms.add(segment.forms(sentence));
                self.deprels.add(segment.deprels(sentence));
                self.lengths.add(segment.len());
            }
        }
        Ok(())
    }

    /// Number of segments tallied
    pub fn total(&self) -> usize {
        self.lengths.total()
    }

    /// Write the three tables into `dir`
    pub fn write_tables(&self, dir: &Path) -> io::Result<()> {
        write_table(
            &mut BufWriter::new(File::create(dir.join(WORD_FORM_FILE))?),
            "word_form",
            &self.word_forms.by_frequency(),
        )?;
        write_table(
            &mut BufWriter::new(File::create(dir.join(DEPREL_FILE))?),
            "deprel",
            &self.deprels.by_frequency(),
        )?;
        write_table(
            &mut BufWriter::new(File::create(dir.join(LENGTH_FILE))?),
            "length",
            &self.lengths.by_key(),
        )
    }
}

/// Write a `value<TAB>frequency` table with a header row
pub fn write_table<W: Write, K: std::fmt::Display>(
    out: &mut W,
    header: &str,
    rows: &[(K, usize)],
) -> io::Result<()> {
    writeln!(out, "{}\tfrequency", header)?;
    for (key, count) in rows {
        writeln!(out, "{}\t{}", key, count)?;
    }
    out.flush()
}

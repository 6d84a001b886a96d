//! Treebanks: sources of CoNLL-U text and the analysed sentences read from them
//!
//! A [`TreebankSource`] names where the text lives (a string, a file, or a
//! list of files from a glob). [`Treebank::load`] runs every sentence through
//! the pipeline: tree construction, clause classification, clause assembly.
//!
//! By default the first defective sentence aborts the load. With
//! [`LoadOptions::skip_invalid`] the defect is reported on stderr and the
//! sentence is dropped instead.

use crate::classify::classify;
use crate::clause::Clause;
use crate::conllu::{ConlluReader, ParseError, SentenceRecords};
use crate::segment::{Segment, SegmentError, linear_segments};
use crate::tree::{Sentence, StructuralError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error while loading or analysing a treebank
#[derive(Debug, Error)]
pub enum TreebankError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Structural error: {0}")]
    Structure(#[from] StructuralError),

    #[error("Segmentation error: {0}")]
    Segment(#[from] SegmentError),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        source: Box<TreebankError>,
    },
}

impl TreebankError {
    /// Attach the file the error came from, unless it already names one
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            TreebankError::FileOpen { .. } | TreebankError::InFile { .. } => self,
            other => TreebankError::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}

/// How to treat defective input
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Report and drop defective sentences and unreadable files
    pub skip_invalid: bool,
}

/// Source of CoNLL-U text
#[derive(Debug, Clone)]
pub enum TreebankSource {
    /// In-memory CoNLL-U text
    String(String),
    /// Single file path
    File(PathBuf),
    /// Multiple file paths (from glob or explicit paths)
    Files(Vec<PathBuf>),
}

impl TreebankSource {
    /// Expand a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, TreebankError> {
        let mut file_paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        file_paths.sort();
        Ok(Self::Files(file_paths))
    }

    /// Sentence records in document order, one file after another
    pub fn records(&self) -> Box<dyn Iterator<Item = Result<SentenceRecords, TreebankError>>> {
        match self {
            TreebankSource::String(text) => Box::new(
                ConlluReader::from_string(text).map(|result| result.map_err(TreebankError::from)),
            ),
            TreebankSource::File(path) => open_file_records(path.clone()),
            TreebankSource::Files(paths) => {
                Box::new(paths.clone().into_iter().flat_map(open_file_records))
            }
        }
    }
}

/// Helper: Open a file and return an iterator over its sentence records
///
/// An unopenable file yields a single error.
fn open_file_records(
    path: PathBuf,
) -> Box<dyn Iterator<Item = Result<SentenceRecords, TreebankError>>> {
    match ConlluReader::from_file(&path) {
        Ok(reader) => Box::new(reader.map(|result| result.map_err(TreebankError::from))),
        Err(source) => Box::new(std::iter::once(Err(TreebankError::FileOpen { path, source }))),
    }
}

/// Build and classify one sentence, then assemble its clauses
pub fn analyze(records: SentenceRecords) -> Result<Sentence, StructuralError> {
    let mut sentence = Sentence::build(records.sent_id, records.text, records.tokens)?;
    classify(&mut sentence);
    sentence.identify_clauses();
    Ok(sentence)
}

/// An ordered list of analysed sentences
#[derive(Debug, Clone, Default)]
pub struct Treebank {
    sentences: Vec<Sentence>,
    skipped: usize,
}

impl Treebank {
    /// Load and analyse every sentence of a source
    ///
    /// Errors from file sources carry the path of the offending file.
    pub fn load(source: &TreebankSource, options: LoadOptions) -> Result<Self, TreebankError> {
        let mut treebank = Self::default();
        match source {
            TreebankSource::String(_) => {
                treebank.extend_from_records(source.records(), options, None)?
            }
            TreebankSource::File(path) => treebank.extend_from_file(path, options)?,
            TreebankSource::Files(paths) => {
                for path in paths {
                    treebank.extend_from_file(path, options)?;
                }
            }
        }
        Ok(treebank)
    }

    /// Analyse sentence records produced by any reader
    pub fn from_records(
        records: impl IntoIterator<Item = Result<SentenceRecords, TreebankError>>,
        options: LoadOptions,
    ) -> Result<Self, TreebankError> {
        let mut treebank = Self::default();
        treebank.extend_from_records(records, options, None)?;
        Ok(treebank)
    }

    fn extend_from_file(&mut self, path: &Path, options: LoadOptions) -> Result<(), TreebankError> {
        self.extend_from_records(open_file_records(path.to_path_buf()), options, Some(path))
    }

    fn extend_from_records(
        &mut self,
        records: impl IntoIterator<Item = Result<SentenceRecords, TreebankError>>,
        options: LoadOptions,
        path: Option<&Path>,
    ) -> Result<(), TreebankError> {
        for result in records {
            let analysed = result
                .and_then(|records| analyze(records).map_err(TreebankError::from))
                .map_err(|e| match path {
                    Some(path) => e.in_file(path),
                    None => e,
                });
            match analysed {
                Ok(sentence) => self.sentences.push(sentence),
                Err(e) if options.skip_invalid => {
                    eprintln!("Warning: skipping invalid input: {}", e);
                    self.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Analyse in-memory CoNLL-U text, failing on the first defect
    pub fn from_string(text: &str) -> Result<Self, TreebankError> {
        Self::load(&TreebankSource::String(text.to_string()), LoadOptions::default())
    }

    /// Analyse a single file, failing on the first defect
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TreebankError> {
        Self::load(
            &TreebankSource::File(path.as_ref().to_path_buf()),
            LoadOptions::default(),
        )
    }

    /// Analyse explicit file paths in the given order
    pub fn from_paths(paths: Vec<PathBuf>, options: LoadOptions) -> Result<Self, TreebankError> {
        Self::load(&TreebankSource::Files(paths), options)
    }

    /// Analyse all files matching a glob pattern, in sorted order
    pub fn from_glob(pattern: &str, options: LoadOptions) -> Result<Self, TreebankError> {
        Self::load(&TreebankSource::from_glob(pattern)?, options)
    }

    /// Wrap already analysed sentences
    pub fn from_sentences(sentences: Vec<Sentence>) -> Self {
        Self {
            sentences,
            skipped: 0,
        }
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Number of defects dropped while loading: invalid sentences plus
    /// files that could not be opened
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn clause_count(&self) -> usize {
        self.sentences.iter().map(Sentence::clause_count).sum()
    }

    /// Mean over sentences of the sentence mean dependency distance
    pub fn mean_dependency_distance(&self) -> f64 {
        if self.sentences.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .sentences
            .iter()
            .map(Sentence::mean_dependency_distance)
            .sum();
        total / self.sentences.len() as f64
    }

    /// Segments of every clause, by sentence, then clause head position
    pub fn segments(
        &self,
    ) -> impl Iterator<Item = Result<(&Sentence, &Clause, Vec<Segment>), SegmentError>> + '_ {
        self.sentences.iter().flat_map(|sentence| {
            sentence
                .clauses()
                .iter()
                .map(move |clause| {
                    linear_segments(sentence, clause).map(|segments| (sentence, clause, segments))
                })
        })
    }
}

impl IntoIterator for Treebank {
    type Item = Sentence;
    type IntoIter = std::vec::IntoIter<Sentence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences.into_iter()
    }
}

impl<'a> IntoIterator for &'a Treebank {
    type Item = &'a Sentence;
    type IntoIter = std::slice::Iter<'a, Sentence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SENTENCES: &str = "# sent_id = a\n\
# text = Jan říká, že Petr spí.\n\
1\tJan\tJan\tPROPN\tNNMS1-----A----\t_\t2\tnsubj\t_\t_\n\
2\tříká\tříkat\tVERB\tVB-S---3P-AA---\t_\t0\troot\t_\t_\n\
3\t,\t,\tPUNCT\tZ:-------------\t_\t6\tpunct\t_\t_\n\
4\tže\tže\tSCONJ\tJ,-------------\t_\t6\tmark\t_\t_\n\
5\tPetr\tPetr\tPROPN\tNNMS1-----A----\t_\t6\tnsubj\t_\t_\n\
6\tspí\tspát\tVERB\tVB-S---3P-AA---\t_\t2\tccomp\t_\t_\n\
7\t.\t.\tPUNCT\tZ:-------------\t_\t2\tpunct\t_\t_\n\
\n\
# sent_id = b\n\
1\tPrší\tpršet\tVERB\tVB-S---3P-AA---\t_\t0\troot\t_\t_\n\
\n";

    const GAP: &str = "# sent_id = gap\n\
1\tA\ta\tNOUN\tNN\t_\t0\troot\t_\t_\n\
3\tB\tb\tNOUN\tNN\t_\t1\tnmod\t_\t_\n\
\n";

    #[test]
    fn test_from_string() {
        let treebank = Treebank::from_string(TWO_SENTENCES).unwrap();

        assert_eq!(treebank.len(), 2);
        assert_eq!(treebank.sentences()[0].id, "a");
        assert_eq!(
            treebank.sentences()[0].text.as_deref(),
            Some("Jan říká, že Petr spí.")
        );
        assert_eq!(treebank.clause_count(), 3);
        assert_eq!(treebank.skipped(), 0);
    }

    #[test]
    fn test_segments_in_document_order() {
        let treebank = Treebank::from_string(TWO_SENTENCES).unwrap();
        let segments: Vec<_> = treebank.segments().map(Result::unwrap).collect();

        let heads: Vec<(&str, &str)> = segments
            .iter()
            .map(|(sentence, clause, _)| {
                (sentence.id.as_str(), sentence.token(clause.head()).form.as_str())
            })
            .collect();
        assert_eq!(heads, vec![("a", "říká"), ("a", "spí"), ("b", "prší")]);

        let forms: Vec<String> = segments[1].2.iter().map(|s| s.forms(segments[1].0)).collect();
        assert_eq!(forms, vec!["že", "petr spí"]);
    }

    #[test]
    fn test_structural_error_aborts_by_default() {
        let text = format!("{}{}", GAP, TWO_SENTENCES);
        let err = Treebank::from_string(&text).unwrap_err();
        assert!(matches!(
            err,
            TreebankError::Structure(StructuralError::NonContiguousIds { found: 3, .. })
        ));
        assert!(err.to_string().contains("gap"));
    }

    #[test]
    fn test_skip_invalid() {
        let text = format!("{}{}", GAP, TWO_SENTENCES);
        let source = TreebankSource::String(text);
        let treebank = Treebank::load(&source, LoadOptions { skip_invalid: true }).unwrap();

        assert_eq!(treebank.len(), 2);
        assert_eq!(treebank.skipped(), 1);
    }

    #[test]
    fn test_from_records() {
        let records = || {
            ConlluReader::from_string(GAP)
                .chain(ConlluReader::from_string(TWO_SENTENCES))
                .map(|result| result.map_err(TreebankError::from))
        };

        let err = Treebank::from_records(records(), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, TreebankError::Structure(_)));

        let treebank = Treebank::from_records(records(), LoadOptions { skip_invalid: true }).unwrap();
        assert_eq!(treebank.len(), 2);
        assert_eq!(treebank.skipped(), 1);
        assert_eq!(treebank.clause_count(), 3);
    }

    #[test]
    fn test_in_file_keeps_existing_path() {
        let path = Path::new("a.conllu");
        let open = TreebankError::FileOpen {
            path: PathBuf::from("b.conllu"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(open.in_file(path).to_string().starts_with("Failed to open file b.conllu"));

        let wrapped = TreebankError::Segment(SegmentError::UndefinedTraversal {
            sentence_id: "s".to_string(),
            token_id: 2,
        })
        .in_file(path)
        .in_file(Path::new("other.conllu"));
        assert!(wrapped.to_string().starts_with("a.conllu: Segmentation error"));
    }

    #[test]
    fn test_mean_dependency_distance() {
        let treebank = Treebank::from_string(TWO_SENTENCES).unwrap();
        // sentence a: (1 + 2 + 1 + 4) / 4 = 2, sentence b: 0
        assert_eq!(treebank.mean_dependency_distance(), 1.0);
        assert_eq!(Treebank::default().mean_dependency_distance(), 0.0);
    }

    #[test]
    fn test_analyze_marks_and_assembles() {
        let records = ConlluReader::from_string(TWO_SENTENCES).next().unwrap().unwrap();
        let sentence = analyze(records).unwrap();

        assert!(sentence.has_predicate_root());
        assert_eq!(sentence.clause_count(), 2);
    }

    mod files {
        use super::*;
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::fs;
        use std::io::Write;
        use std::path::PathBuf;
        use tempfile::{TempDir, tempdir};

        /// Helper to create test files with given content
        fn create_test_files(contents: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
            let dir = tempdir().unwrap();
            let mut paths = Vec::new();

            for (filename, content) in contents {
                let path = dir.path().join(filename);
                let mut file = fs::File::create(&path).unwrap();
                write!(file, "{}", content).unwrap();
                paths.push(path);
            }

            (dir, paths)
        }

        #[test]
        fn test_from_file() {
            let (_dir, paths) = create_test_files(&[("a.conllu", TWO_SENTENCES)]);
            let treebank = Treebank::from_file(&paths[0]).unwrap();
            assert_eq!(treebank.len(), 2);
        }

        #[test]
        fn test_from_gzipped_file() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("a.conllu.gz");
            let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
            encoder.write_all(TWO_SENTENCES.as_bytes()).unwrap();
            encoder.finish().unwrap();

            let treebank = Treebank::from_file(&path).unwrap();
            assert_eq!(treebank.len(), 2);
            assert_eq!(treebank.sentences()[1].id, "b");
        }

        #[test]
        fn test_from_glob_is_sorted() {
            let (dir, _paths) = create_test_files(&[
                ("b.conllu", "# sent_id = second\n1\tB\tb\tNOUN\tNN\t_\t0\troot\t_\t_\n"),
                ("a.conllu", "# sent_id = first\n1\tA\ta\tNOUN\tNN\t_\t0\troot\t_\t_\n"),
                ("other.txt", "ignored"),
            ]);

            let pattern = format!("{}/*.conllu", dir.path().display());
            let treebank = Treebank::from_glob(&pattern, LoadOptions::default()).unwrap();

            let ids: Vec<&str> = treebank.sentences().iter().map(|s| s.id.as_str()).collect();
            assert_eq!(ids, vec!["first", "second"]);
        }

        #[test]
        fn test_parse_error_names_file() {
            let (_dir, paths) = create_test_files(&[
                ("a.conllu", TWO_SENTENCES),
                ("b.conllu", "# sent_id = bad\n1\tA\ta\tNOUN\n\n"),
            ]);

            let err = Treebank::from_paths(paths.clone(), LoadOptions::default()).unwrap_err();
            match &err {
                TreebankError::InFile { path, source } => {
                    assert_eq!(path, &paths[1]);
                    assert!(matches!(**source, TreebankError::Parse(_)));
                }
                other => panic!("expected InFile, got {:?}", other),
            }
            let message = err.to_string();
            assert!(message.contains("b.conllu"), "{}", message);
            assert!(message.contains("line 2"), "{}", message);
        }

        #[test]
        fn test_structural_error_names_file_and_sentence() {
            let (_dir, paths) =
                create_test_files(&[("a.conllu", TWO_SENTENCES), ("b.conllu", GAP)]);

            let err = Treebank::from_paths(paths.clone(), LoadOptions::default()).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("b.conllu"), "{}", message);
            assert!(message.contains("gap"), "{}", message);

            let treebank = Treebank::from_paths(paths, LoadOptions { skip_invalid: true }).unwrap();
            assert_eq!(treebank.len(), 2);
            assert_eq!(treebank.skipped(), 1);
        }

        #[test]
        fn test_missing_file() {
            let (dir, mut paths) = create_test_files(&[("good.conllu", TWO_SENTENCES)]);
            paths.push(dir.path().join("nonexistent.conllu"));

            let err = Treebank::from_paths(paths.clone(), LoadOptions::default()).unwrap_err();
            assert!(matches!(err, TreebankError::FileOpen { .. }));

            let treebank = Treebank::from_paths(paths, LoadOptions { skip_invalid: true }).unwrap();
            assert_eq!(treebank.len(), 2);
            assert_eq!(treebank.skipped(), 1);
        }
    }
}

//! Command-line interface for treelds
//!
//! Reads CoNLL-U files, segments every clause, and writes the three
//! segment frequency tables.
//!
//! Usage:
//!   treelds [--output-dir <dir>] [--skip-invalid] [--summary] <input>...
//!
//! Inputs may be file paths or glob patterns (`data/*.conllu.gz`).

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use treelds::{Distribution, LoadOptions, Treebank, TreebankError, TreebankSource};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "treelds", version, about = "Linear dependency segment distributions")]
struct Args {
    /// CoNLL-U files or glob patterns (gzipped files are read transparently)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory for LDS_word_form.txt, LDS_deprel.txt, and LDS_length.txt
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Report defective sentences on stderr and skip them instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Print per-file counts and mean dependency distance to stdout
    #[arg(long)]
    summary: bool,
}

/// Counts for one input file
#[derive(Debug, Clone, PartialEq)]
struct FileSummary {
    path: PathBuf,
    sentences: usize,
    skipped: usize,
    clauses: usize,
    segments: usize,
    mean_dependency_distance: f64,
}

fn main() {
    let args = Args::parse();
    let stdout = io::stdout();
    if let Err(e) = run(&args, &mut stdout.lock()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Expand glob patterns, keeping plain paths as given
///
/// Returns the paths in input order and the patterns that matched nothing.
fn expand_inputs(inputs: &[String]) -> Result<(Vec<PathBuf>, Vec<String>), TreebankError> {
    let mut paths = Vec::new();
    let mut unmatched = Vec::new();
    for input in inputs {
        if input.contains(['*', '?', '[']) {
            if let TreebankSource::Files(found) = TreebankSource::from_glob(input)? {
                if found.is_empty() {
                    unmatched.push(input.clone());
                }
                paths.extend(found);
            }
        } else {
            paths.push(PathBuf::from(input));
        }
    }
    Ok((paths, unmatched))
}

fn run<W: Write>(args: &Args, out: &mut W) -> Result<(), TreebankError> {
    let (paths, unmatched) = expand_inputs(&args.inputs)?;
    for pattern in &unmatched {
        eprintln!("Warning: no files match {}", pattern);
    }

    let options = LoadOptions {
        skip_invalid: args.skip_invalid,
    };

    // one file at a time, so only the tallies outlive each treebank
    let mut distribution = Distribution::new();
    let mut summaries = Vec::with_capacity(paths.len());
    for path in paths {
        let treebank = Treebank::from_paths(vec![path.clone()], options)?;
        let before = distribution.total();
        for sentence in &treebank {
            distribution
                .add_sentence(sentence)
                .map_err(|e| TreebankError::from(e).in_file(&path))?;
        }
        summaries.push(FileSummary {
            path,
            sentences: treebank.len(),
            skipped: treebank.skipped(),
            clauses: treebank.clause_count(),
            segments: distribution.total() - before,
            mean_dependency_distance: treebank.mean_dependency_distance(),
        });
    }

    distribution.write_tables(&args.output_dir)?;

    if args.summary {
        write_summary(out, &summaries)?;
    }

    Ok(())
}

/// Write one TSV row per file plus a corpus total
///
/// The total mean dependency distance is weighted by sentence count.
fn write_summary<W: Write>(out: &mut W, summaries: &[FileSummary]) -> io::Result<()> {
    writeln!(
        out,
        "file\tsentences\tskipped\tclauses\tsegments\tmean_dependency_distance"
    )?;
    for s in summaries {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{:.4}",
            s.path.display(),
            s.sentences,
            s.skipped,
            s.clauses,
            s.segments,
            s.mean_dependency_distance
        )?;
    }

    let sentences: usize = summaries.iter().map(|s| s.sentences).sum();
    let weighted: f64 = summaries
        .iter()
        .map(|s| s.mean_dependency_distance * s.sentences as f64)
        .sum();
    let mean = if sentences == 0 {
        0.0
    } else {
        weighted / sentences as f64
    };
    writeln!(
        out,
        "total\t{}\t{}\t{}\t{}\t{:.4}",
        sentences,
        summaries.iter().map(|s| s.skipped).sum::<usize>(),
        summaries.iter().map(|s| s.clauses).sum::<usize>(),
        summaries.iter().map(|s| s.segments).sum::<usize>(),
        mean
    )?;
    out.flush()
}

//! A named, ordered collection of [`Tree`]s: builds models from a
//! cluster-name → FASTA-path manifest, then predicts the best-matching
//! cluster for a query FASTA file.

use anyhow::{Context, Result, bail};
use context_tree::Tree;
use file_reader::{FastaReader, LineSource};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ordered collection of `(name, Tree)` entries. Insertion order is
/// preserved and determines the output TSV's column order; a repeated
/// `add` on an existing name builds onto the same tree instead of
/// creating a second one.
pub struct Classifier {
    models: Vec<(String, Tree)>,
    max_depth: u32,
}

impl Classifier {
    pub fn new(max_depth: u32) -> Self {
        Self {
            models: Vec::new(),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|(name, _)| name.as_str())
    }

    /// Adds `path` to the model named `name`, creating it if this is the
    /// first time `name` is seen.
    pub fn add(&mut self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        if let Some((_, tree)) = self.models.iter_mut().find(|(n, _)| n == name) {
            tree.build(path)?;
            return Ok(());
        }

        let mut tree = Tree::new(name, self.max_depth)?;
        tree.build(path)?;
        tracing::info!(model = name, "created new model");
        self.models.push((name.to_string(), tree));
        Ok(())
    }

    /// Reads a tab-separated `<cluster_name>\t<fasta_path>` manifest and
    /// calls [`Classifier::add`] for each line.
    pub fn batch_add(&mut self, manifest_path: impl AsRef<Path>) -> Result<()> {
        for (name, path) in read_manifest(manifest_path)? {
            self.add(&name, &path)?;
        }
        Ok(())
    }

    /// Scores `query_path` against every model (insertion order), writes
    /// one TSV row to `sink`, and returns the name of the best-matching
    /// model. Lower log-loss wins; ties are broken by lowest insertion
    /// index, matching the reference's strict `<` comparison against a
    /// running minimum.
    pub fn predict(
        &self,
        query_name: &str,
        query_path: impl AsRef<Path>,
        sink: &mut impl Write,
    ) -> Result<String> {
        if self.models.is_empty() {
            bail!("cannot predict with zero models loaded");
        }

        let mut reader = FastaReader::open(query_path)?;
        write!(sink, "{query_name}")?;

        let mut best_index = 0usize;
        let mut best_score = f64::INFINITY;
        for (i, (_, tree)) in self.models.iter().enumerate() {
            let score = tree.score(&mut reader);
            write!(sink, "\t{score:.6}")?;
            if score < best_score {
                best_score = score;
                best_index = i;
            }
        }
        let best_name = &self.models[best_index].0;
        writeln!(sink, "\t{best_name}")?;
        Ok(best_name.clone())
    }

    /// Writes the TSV header: `Genome_name`, one column per model in
    /// insertion order, then `Best_hit`.
    pub fn print_header(&self, sink: &mut impl Write) -> Result<()> {
        write!(sink, "Genome_name")?;
        for (name, _) in &self.models {
            write!(sink, "\t{name}")?;
        }
        writeln!(sink, "\tBest_hit")?;
        Ok(())
    }

    /// Writes a stats dump for every model, in insertion order.
    pub fn print_stats(&self, sink: &mut impl Write) -> Result<()> {
        writeln!(sink, "\nNumber of models: {}", self.models.len())?;
        writeln!(sink, "some stats for each model:\n")?;
        for (_, tree) in &self.models {
            writeln!(sink, "--------------------------------------------------")?;
            tree.write_stats(sink)?;
        }
        writeln!(sink)?;
        Ok(())
    }
}

/// Reads a tab-separated `<name>\t<fasta-path>` manifest (the same format
/// used for both training and query manifests) into an ordered list of
/// entries. Used by [`Classifier::batch_add`] and by the CLI driver when
/// walking the query manifest.
pub fn read_manifest(manifest_path: impl AsRef<Path>) -> Result<Vec<(String, PathBuf)>> {
    let manifest_path = manifest_path.as_ref();
    let mut reader = FastaReader::open(manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;

    let mut line = Vec::new();
    let mut lineno = 0usize;
    let mut entries = Vec::new();
    loop {
        let n = reader.next_line(&mut line);
        if n == 0 {
            break;
        }
        lineno += 1;
        let (name, path) = parse_manifest_line(&line[..n]).with_context(|| {
            format!(
                "illegal line {lineno} in manifest {}",
                manifest_path.display()
            )
        })?;
        entries.push((name.to_string(), PathBuf::from(path)));
    }
    Ok(entries)
}

fn parse_manifest_line(line: &[u8]) -> Result<(&str, &str)> {
    let line = std::str::from_utf8(line)
        .context("manifest line is not valid UTF-8")?
        .trim_end_matches('\n');
    let tab = line
        .find('\t')
        .context("expected a tab between cluster name and fasta path")?;
    Ok((&line[..tab], &line[tab + 1..]))
}

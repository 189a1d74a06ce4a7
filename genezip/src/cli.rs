use clap::Parser;
use std::path::PathBuf;

/// Classify genomic sequences against a set of reference clusters using
/// per-cluster LZ78 context trees.
#[derive(Parser)]
#[command(name = "genezip", version, about)]
pub struct Cli {
    /// Training manifest: one `<cluster-name>\t<fasta-path>` line per cluster.
    #[arg(short = 'i', long = "train", value_name = "TRAINING_MANIFEST")]
    pub training_manifest: PathBuf,

    /// Query manifest: one `<name>\t<fasta-path>` line per query to classify.
    #[arg(short = 't', long = "query", value_name = "QUERY_MANIFEST")]
    pub query_manifest: PathBuf,

    /// Output TSV path.
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Maximum context-tree depth, between 1 and 17.
    #[arg(short = 'd', long = "max-depth", default_value_t = 13)]
    pub max_depth: u32,
}

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use kira_annkit::adata::{AnnData, DenseMatrix, Matrix};
use kira_annkit::input::barcodes::parse_names;
use kira_annkit::input::load_tenx;
use kira_annkit::input::table::{read_embedding, read_polygon, read_table};
use kira_annkit::ops::biotypes::{BiotypeParams, add_biotypes_pct};
use kira_annkit::ops::gene_lists::read_gene_lists;
use kira_annkit::ops::roi::label_roi_polygon;
use kira_annkit::ops::segment::{SegmentParams, Threshold, segment_in_place};
use kira_annkit::ops::top_genes::top_n_genes;
use kira_annkit::ops::variance::{npcs, reorder_reduction};
use kira_annkit::report::{summary_path, write_obs_tsv, write_summary_json};
use kira_annkit::{Result, logging};

const SPATIAL: &str = "spatial";
const REDUCTION: &str = "X_reduction";

#[derive(Debug, Parser)]
#[command(name = "kira-annkit", version, about = "Annotated single-cell matrix utilities")]
struct Cli {
    /// Log progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Group observations into tissues by a distance threshold
    Segment {
        #[arg(long)]
        input: PathBuf,
        /// CSV of barcode,x,y
        #[arg(long)]
        coords: PathBuf,
        /// "auto" or a non-negative distance
        #[arg(long, default_value = "auto")]
        threshold: Threshold,
        /// Expected tissue count, required with --threshold auto
        #[arg(long)]
        num_tissues: Option<usize>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Flag observations inside a polygon
    Roi {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        coords: PathBuf,
        /// CSV with x and y columns
        #[arg(long)]
        polygon: PathBuf,
        #[arg(long, default_value = "roi")]
        column: String,
        /// Store "True"/"False" strings instead of booleans
        #[arg(long)]
        as_string: bool,
        #[arg(long)]
        out: PathBuf,
    },
    /// Per-cell expression share of each gene biotype
    Biotypes {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        biomart: PathBuf,
        #[arg(long, default_value = "GeneSymbol")]
        gene_col: String,
        #[arg(long, default_value = "Biotype")]
        biotype_col: String,
        /// 100 for percentages, 1 for fractions
        #[arg(long, default_value_t = 100)]
        scale: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Features with the largest total expression
    TopGenes {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 20)]
        n: usize,
    },
    /// Leading dimensions covering a share of the embedding variance
    Npcs {
        /// CSV of barcode,dim1,dim2,...
        #[arg(long)]
        embedding: PathBuf,
        #[arg(long, default_value_t = 0.95)]
        var_perc: f64,
        /// Sort dimensions by decreasing variance first
        #[arg(long)]
        reorder: bool,
    },
    /// Print gene lists from a CSV as JSON
    GeneLists {
        #[arg(long)]
        csv: PathBuf,
        /// One gene per line; lists keep only these genes
        #[arg(long)]
        allow: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;
    match cli.command {
        Command::Segment {
            input,
            coords,
            threshold,
            num_tissues,
            out,
        } => {
            let mut adata = load_with_coords(&input, &coords)?;
            let params = SegmentParams {
                threshold,
                num_tissues,
                basis: SPATIAL.to_string(),
                inplace: true,
                verbose,
            };
            let summary = segment_in_place(&mut adata, &params)?;
            let columns = [summary.column.as_str()];
            write_obs_tsv(&out, &adata, Some(&columns[..]))?;
            write_summary_json(&summary_path(&out), &summary)?;
        }
        Command::Roi {
            input,
            coords,
            polygon,
            column,
            as_string,
            out,
        } => {
            let mut adata = load_with_coords(&input, &coords)?;
            let polygon = read_polygon(&polygon)?;
            let n_inside = label_roi_polygon(&mut adata, &polygon, &column, as_string)?;
            let columns = [column.as_str()];
            write_obs_tsv(&out, &adata, Some(&columns[..]))?;
            write_summary_json(
                &summary_path(&out),
                &serde_json::json!({
                    "column": column,
                    "n_obs": adata.n_obs(),
                    "n_inside": n_inside,
                }),
            )?;
        }
        Command::Biotypes {
            input,
            biomart,
            gene_col,
            biotype_col,
            scale,
            out,
        } => {
            let mut adata = load_tenx(&input)?;
            let table = read_table(&biomart, None)?;
            let params = BiotypeParams {
                gene_col,
                biotype_col,
                scale,
                verbose,
                ..BiotypeParams::default()
            };
            let columns = add_biotypes_pct(&mut adata, Some(&table), &params)?;
            let names: Vec<&str> = columns.iter().map(String::as_str).collect();
            write_obs_tsv(&out, &adata, Some(names.as_slice()))?;
            write_summary_json(
                &summary_path(&out),
                &serde_json::json!({ "columns": columns, "n_obs": adata.n_obs() }),
            )?;
        }
        Command::TopGenes { input, n } => {
            let adata = load_tenx(&input)?;
            for name in top_n_genes(&adata, n) {
                println!("{name}");
            }
        }
        Command::Npcs {
            embedding,
            var_perc,
            reorder,
        } => {
            let mut adata = embedding_only(&embedding)?;
            if reorder {
                reorder_reduction(&mut adata, REDUCTION, verbose);
            }
            if let Some(n) = npcs(&adata, var_perc, REDUCTION) {
                println!("{n}");
            }
        }
        Command::GeneLists { csv, allow } => {
            let allow: Option<HashSet<String>> = match allow {
                Some(path) => Some(parse_names(&path)?.into_iter().collect()),
                None => None,
            };
            let lists = read_gene_lists(&csv, allow.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&lists)?);
        }
    }
    Ok(())
}

fn load_with_coords(input: &Path, coords: &Path) -> Result<AnnData> {
    let mut adata = load_tenx(input)?;
    let embedding = read_embedding(coords, &adata.obs_names)?;
    adata.insert_obsm(SPATIAL, embedding)?;
    Ok(adata)
}

/// Container with no features holding only the embedding read from `path`.
fn embedding_only(path: &Path) -> Result<AnnData> {
    let table = read_table(path, None)?;
    let ids = match table.columns().first() {
        Some((_, col)) => col.to_strings(),
        None => Vec::new(),
    };
    let embedding = read_embedding(path, &ids)?;
    let mut adata = AnnData::new(Matrix::Dense(DenseMatrix::zeros(ids.len(), 0)), ids, Vec::new())?;
    adata.insert_obsm(REDUCTION, embedding)?;
    Ok(adata)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;

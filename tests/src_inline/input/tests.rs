use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::mtx::{MtxField, read_mtx};
use super::table::{read_embedding, read_polygon, read_table};
use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_annkit_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn write_gz(path: &Path, contents: &str) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();
    enc.finish().unwrap();
}

const MTX: &str = "%%MatrixMarket matrix coordinate integer general\n% generated\n3 2 4\n1 1 2\n2 1 1\n3 2 5\n2 2 0\n";

#[test]
fn test_load_tenx_plain_and_gz_agree() {
    let plain = make_temp_dir();
    write_file(&plain.join("matrix.mtx"), MTX);
    write_file(
        &plain.join("features.tsv"),
        "G1\tActb\tGene Expression\nG2\tGapdh\tGene Expression\nG3\tActb\tGene Expression\n",
    );
    write_file(&plain.join("barcodes.tsv"), "AAA-1\nCCC-1\n");

    let gz = make_temp_dir();
    write_gz(&gz.join("matrix.mtx.gz"), MTX);
    write_gz(
        &gz.join("features.tsv.gz"),
        "G1\tActb\tGene Expression\nG2\tGapdh\tGene Expression\nG3\tActb\tGene Expression\n",
    );
    write_gz(&gz.join("barcodes.tsv.gz"), "AAA-1\nCCC-1\n");

    let a = load_tenx(&plain).unwrap();
    let b = load_tenx(&gz).unwrap();
    assert_eq!(a, b);

    assert_eq!(a.obs_names, vec!["AAA-1", "CCC-1"]);
    assert_eq!(a.var_names, vec!["Actb", "Gapdh", "Actb-1"]);
    assert_eq!(a.x.shape(), (2, 3));
    assert_eq!(a.x.get(0, 0), 2.0);
    assert_eq!(a.x.get(0, 1), 1.0);
    assert_eq!(a.x.get(1, 2), 5.0);
    assert_eq!(a.x.get(1, 1), 0.0);
    assert_eq!(
        a.var.str_values("gene_ids").unwrap(),
        vec!["G1", "G2", "G3"]
    );
    a.validate().unwrap();
}

#[test]
fn test_load_tenx_prefixed_files() {
    let dir = make_temp_dir();
    write_file(&dir.join("s1_matrix.mtx"), MTX);
    write_file(&dir.join("s1_genes.tsv"), "G1\tA\nG2\tB\nG3\tC\n");
    write_file(&dir.join("s1_barcodes.tsv"), "X\nY\n");
    let adata = load_tenx(&dir).unwrap();
    assert_eq!(adata.n_obs(), 2);
    assert!(!adata.var.contains("feature_types"));
}

#[test]
fn test_load_tenx_shape_mismatch() {
    let dir = make_temp_dir();
    write_file(&dir.join("matrix.mtx"), MTX);
    write_file(&dir.join("features.tsv"), "G1\tA\tGE\nG2\tB\tGE\n");
    write_file(&dir.join("barcodes.tsv"), "X\nY\n");
    assert!(matches!(load_tenx(&dir), Err(Error::ShapeMismatch(_))));
}

#[test]
fn test_load_tenx_missing_files() {
    let dir = make_temp_dir();
    write_file(&dir.join("features.tsv"), "G1\tA\n");
    assert!(matches!(load_tenx(&dir), Err(Error::MissingInput(_))));
}

#[test]
fn test_read_mtx_pattern_symmetric() {
    let dir = make_temp_dir();
    let path = dir.join("p.mtx");
    write_file(
        &path,
        "%%MatrixMarket matrix coordinate pattern symmetric\n3 3 2\n1 1\n3 1\n",
    );
    let m = read_mtx(&path).unwrap();
    assert_eq!(m.field, MtxField::Pattern);
    let mut entries = m.entries.clone();
    entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    assert_eq!(entries, vec![(0, 0, 1.0), (0, 2, 1.0), (2, 0, 1.0)]);
}

#[test]
fn test_read_mtx_rejects_bad_header() {
    let dir = make_temp_dir();
    let path = dir.join("bad.mtx");
    write_file(&path, "3 3 1\n1 1 1\n");
    assert!(matches!(read_mtx(&path), Err(Error::Parse(_))));
}

#[test]
fn test_read_table_tsv_and_short_rows() {
    let dir = make_temp_dir();
    let path = dir.join("mart.tsv");
    write_file(&path, "GeneSymbol\tBiotype\nActb\tprotein_coding\nMALAT1\n");
    let frame = read_table(&path, None).unwrap();
    assert_eq!(frame.n_rows(), 2);
    assert_eq!(
        frame.str_values("Biotype").unwrap(),
        vec!["protein_coding".to_string(), String::new()]
    );
}

#[test]
fn test_read_embedding_aligns_to_obs() {
    let dir = make_temp_dir();
    let path = dir.join("spatial.csv");
    write_file(&path, "barcode,x,y\nB,10,20\nA,1,2\n");
    let emb = read_embedding(&path, &["A".to_string(), "B".to_string()]).unwrap();
    assert_eq!(emb.row(0), &[1.0, 2.0]);
    assert_eq!(emb.row(1), &[10.0, 20.0]);

    let missing = read_embedding(&path, &["C".to_string()]);
    assert!(matches!(missing, Err(Error::MissingKey(_))));
}

#[test]
fn test_read_polygon() {
    let dir = make_temp_dir();
    let path = dir.join("roi.csv");
    write_file(&path, "x,y\n0,0\n4,0\n4,4\n0,4\n");
    let poly = read_polygon(&path).unwrap();
    assert_eq!(poly.len(), 4);
}

#[test]
fn test_read_mtx_huge_declared_nnz() {
    let dir = make_temp_dir();
    let path = dir.join("huge.mtx");
    write_file(
        &path,
        "%%MatrixMarket matrix coordinate integer general\n2 2 18446744073709551615\n1 1 3\n",
    );
    let m = read_mtx(&path).unwrap();
    assert_eq!((m.n_rows, m.n_cols), (2, 2));
    assert_eq!(m.entries, vec![(0, 0, 3.0)]);

    write_file(
        &path,
        "%%MatrixMarket matrix coordinate real general\n3 1 2000000000\n2 1 0.5\n",
    );
    let m = read_mtx(&path).unwrap();
    assert_eq!(m.entries, vec![(1, 0, 0.5)]);
}

#[test]
fn test_parse_features_v2_and_v3() {
    let dir = make_temp_dir();
    let v2 = dir.join("genes.tsv");
    write_file(&v2, "ENSG1\tActb\n\nENSG2\t Gapdh \n");
    let features = features::parse_features(&v2).unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[1].id, "ENSG2");
    assert_eq!(features[1].symbol, "Gapdh");
    assert!(features.iter().all(|f| f.feature_type.is_none()));

    let v3 = dir.join("features.tsv.gz");
    write_gz(&v3, "ENSG1\tActb\tGene Expression\r\nAB1\tCD3\tAntibody Capture\r\n");
    let features = features::parse_features(&v3).unwrap();
    assert_eq!(features[1].feature_type.as_deref(), Some("Antibody Capture"));

    let bad = dir.join("bad.tsv");
    write_file(&bad, "ENSG1\n");
    assert!(matches!(features::parse_features(&bad), Err(Error::Parse(_))));
}

#[test]
fn test_parse_names_first_field_and_blank_rows() {
    let dir = make_temp_dir();
    let path = dir.join("barcodes.tsv");
    write_file(&path, "AAA-1\textra\n\n  CCC-1  \nGGG-1\n");
    assert_eq!(
        barcodes::parse_names(&path).unwrap(),
        vec!["AAA-1", "CCC-1", "GGG-1"]
    );

    let empty = dir.join("empty.tsv");
    write_file(&empty, "");
    assert!(barcodes::parse_names(&empty).unwrap().is_empty());
    assert!(matches!(barcodes::parse_barcodes(&empty), Err(Error::Parse(_))));
}

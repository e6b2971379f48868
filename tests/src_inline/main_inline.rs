use super::*;

#[test]
fn test_parse_segment_defaults_to_auto() {
    let cli = Cli::try_parse_from([
        "kira-annkit",
        "segment",
        "--input",
        "data",
        "--coords",
        "xy.csv",
        "--num-tissues",
        "2",
        "--out",
        "out/obs.tsv",
    ])
    .unwrap();
    assert!(!cli.verbose);
    match cli.command {
        Command::Segment {
            threshold,
            num_tissues,
            ..
        } => {
            assert_eq!(threshold, Threshold::Auto);
            assert_eq!(num_tissues, Some(2));
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_fixed_threshold_and_global_verbose() {
    let cli = Cli::try_parse_from([
        "kira-annkit",
        "segment",
        "--input",
        "data",
        "--coords",
        "xy.csv",
        "--threshold",
        "2.5",
        "--out",
        "obs.tsv",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Command::Segment { threshold, .. } => assert_eq!(threshold, Threshold::Fixed(2.5)),
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_rejects_negative_threshold() {
    let parsed = Cli::try_parse_from([
        "kira-annkit",
        "segment",
        "--input",
        "data",
        "--coords",
        "xy.csv",
        "--threshold",
        "-1",
        "--out",
        "obs.tsv",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn test_parse_roi_and_biotype_defaults() {
    let cli = Cli::try_parse_from([
        "kira-annkit",
        "roi",
        "--input",
        "data",
        "--coords",
        "xy.csv",
        "--polygon",
        "poly.csv",
        "--out",
        "roi.tsv",
    ])
    .unwrap();
    match cli.command {
        Command::Roi {
            column, as_string, ..
        } => {
            assert_eq!(column, "roi");
            assert!(!as_string);
        }
        other => panic!("unexpected command {:?}", other),
    }

    let cli = Cli::try_parse_from([
        "kira-annkit",
        "biotypes",
        "--input",
        "data",
        "--biomart",
        "mart.tsv",
        "--out",
        "bt.tsv",
    ])
    .unwrap();
    match cli.command {
        Command::Biotypes {
            gene_col,
            biotype_col,
            scale,
            ..
        } => {
            assert_eq!(gene_col, "GeneSymbol");
            assert_eq!(biotype_col, "Biotype");
            assert_eq!(scale, 100);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_npcs_from_embedding_file() {
    let path = std::env::temp_dir().join(format!("kira_annkit_main_emb_{}.csv", std::process::id()));
    std::fs::write(
        &path,
        "barcode,d1,d2,d3\nc0,0,0,1\nc1,1,0,1\nc2,2,1,1\nc3,3,1,1\n",
    )
    .unwrap();
    let adata = embedding_only(&path).unwrap();
    assert_eq!(adata.n_obs(), 4);
    assert_eq!(adata.n_vars(), 0);
    assert_eq!(adata.obsm[REDUCTION].n_dims(), 3);
    // variances 1.25, 0.25, 0: 0.95 of 1.5 needs both leading dims
    assert_eq!(npcs(&adata, 0.95, REDUCTION), Some(2));
}

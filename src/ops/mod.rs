pub mod biotypes;
pub mod dgea;
pub mod gene_lists;
pub mod layers;
pub mod neighbors;
pub mod rename;
pub mod roi;
pub mod segment;
pub mod top_genes;
pub mod variance;

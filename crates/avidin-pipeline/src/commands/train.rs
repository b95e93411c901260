use anyhow::{anyhow, Result};
use avidin_core::RecordFilter;
use avidin_embed::{
    ChembertaEmbedder, ChembertaModels, Esm2Embedder, Esm2Models, NgramHashEmbedder,
    SequenceEmbedder,
};
use avidin_forest::RandomForestConfig;
use avidin_io::{read_binding_records, ColumnMap};
use avidin_pipeline::{run_with_embedders, TrainingConfig};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

// Widths for the offline featurizer. Narrow on purpose so hashed runs
// stay fast on small fixtures.
const HASH_LIGAND_DIM: usize = 64;
const HASH_PROTEIN_DIM: usize = 128;
const HASH_NGRAM: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Featurizer {
    /// Pretrained ONNX language models fetched from the HuggingFace hub
    Onnx,
    /// Offline hashed n-gram features, no downloads
    Hash,
}

#[derive(Args)]
pub struct TrainArgs {
    /// BindingDB-style CSV with ligand, target and affinity columns
    #[arg(long)]
    pub data: PathBuf,

    /// Keep only rows with Ki strictly below this value, in nM
    #[arg(long, default_value_t = 10_000.0)]
    pub max_affinity: f64,

    /// Stop after this many usable rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Seed shared by the split and the forest
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Feature source
    #[arg(long, value_enum, default_value_t = Featurizer::Onnx)]
    pub featurizer: Featurizer,

    /// ESM2 checkpoint preset (t6-8m, t12-35m, t30-150m)
    #[arg(long, default_value = "t6-8m")]
    pub protein_model: String,

    /// ChemBERTa checkpoint preset (77m-mlm, 77m-mtr)
    #[arg(long, default_value = "77m-mlm")]
    pub ligand_model: String,

    /// Hub repo id overriding --protein-model
    #[arg(long)]
    pub protein_repo: Option<String>,

    /// Hub repo id overriding --ligand-model
    #[arg(long)]
    pub ligand_repo: Option<String>,

    /// Column holding the ligand SMILES
    #[arg(long)]
    pub smiles_column: Option<String>,

    /// Column holding the target chain sequence
    #[arg(long)]
    pub sequence_column: Option<String>,

    /// Column holding the Ki affinity in nM
    #[arg(long)]
    pub affinity_column: Option<String>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut columns = ColumnMap::default();
    if let Some(name) = &args.smiles_column {
        columns.ligand_smiles = name.clone();
    }
    if let Some(name) = &args.sequence_column {
        columns.target_sequence = name.clone();
    }
    if let Some(name) = &args.affinity_column {
        columns.affinity_nm = name.clone();
    }
    let filter = RecordFilter {
        max_affinity_nm: args.max_affinity,
        limit: args.limit,
    };

    let records = read_binding_records(&args.data, &columns, &filter)?;
    println!("Loaded {} usable binding records", records.len());

    let (ligand, protein) = build_embedders(&args)?;
    println!(
        "Featurizing with a {}-d ligand and a {}-d protein embedding",
        ligand.dimension(),
        protein.dimension()
    );

    let config = TrainingConfig {
        test_fraction: args.test_fraction,
        seed: args.seed,
        forest: RandomForestConfig {
            n_trees: args.trees,
            seed: args.seed,
            ..RandomForestConfig::default()
        },
    };
    let outcome = run_with_embedders(&config, &records, ligand.as_ref(), protein.as_ref())?;
    println!(
        "Trained on {} records, evaluated on {} held out",
        outcome.trained_on, outcome.held_out
    );
    println!("{}", outcome.report);
    Ok(())
}

fn build_embedders(
    args: &TrainArgs,
) -> Result<(Box<dyn SequenceEmbedder>, Box<dyn SequenceEmbedder>)> {
    match args.featurizer {
        Featurizer::Hash => Ok((
            Box::new(NgramHashEmbedder::new(HASH_LIGAND_DIM, HASH_NGRAM)?),
            Box::new(NgramHashEmbedder::new(HASH_PROTEIN_DIM, HASH_NGRAM)?),
        )),
        Featurizer::Onnx => {
            let ligand: Box<dyn SequenceEmbedder> = match &args.ligand_repo {
                Some(repo) => Box::new(ChembertaEmbedder::from_hub_repo(repo)?),
                None => {
                    let model: ChembertaModels = args
                        .ligand_model
                        .parse()
                        .map_err(|_| anyhow!("unknown ligand model: {}", args.ligand_model))?;
                    Box::new(ChembertaEmbedder::from_hub(model)?)
                }
            };
            let protein: Box<dyn SequenceEmbedder> = match &args.protein_repo {
                Some(repo) => Box::new(Esm2Embedder::from_hub_repo(repo)?),
                None => {
                    let model: Esm2Models = args
                        .protein_model
                        .parse()
                        .map_err(|_| anyhow!("unknown protein model: {}", args.protein_model))?;
                    Box::new(Esm2Embedder::from_hub(model)?)
                }
            };
            Ok((ligand, protein))
        }
    }
}

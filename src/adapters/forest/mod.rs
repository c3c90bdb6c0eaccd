//! Random forest adapter: Implementation of Classifier.
//!
//! Ensemble of CART trees, each grown on a bootstrap sample with a random
//! feature subset per split. Class probabilities are the mean of the trees'
//! leaf distributions.
//!
//! # Determinism
//!
//! Every tree gets its own ChaCha RNG, seeded from a master RNG before any
//! tree is grown. Trees are then fitted in parallel, so the result depends
//! only on `ForestParams::seed`, not on thread scheduling.

mod tree;

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{ModelError, TrainingSet};
use crate::ports::{Classifier, ClassifierTrainer};

pub use tree::DecisionTree;
use tree::{TreeBuilder, TreeParams};

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`
    #[default]
    Sqrt,
    /// `floor(log2(n_features))`
    Log2,
    /// Every feature
    All,
}

/// Per-class sample reweighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ClassWeight {
    /// All samples weigh 1
    Uniform,
    /// Inverse class frequency over the full training set
    Balanced,
    /// Inverse class frequency over each tree's bootstrap sample
    #[default]
    BalancedSubsample,
}

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub class_weight: ClassWeight,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 180,
            max_depth: None,
            min_samples_split: 3,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            class_weight: ClassWeight::BalancedSubsample,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    /// Check hyperparameters before training.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidParams` describing the first bad value.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParams(
                "n_estimators must be at least 1".into(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidParams(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidParams(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidParams(
                "max_depth must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self.max_features {
            MaxFeatures::Sqrt => n.sqrt() as usize,
            MaxFeatures::Log2 => n.log2() as usize,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// `total / (present_classes * count)` per class; absent classes get 0.
fn balanced_weights(labels: &[usize], multiplicity: &[f64], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for (&label, &m) in labels.iter().zip(multiplicity) {
        counts[label] += m;
    }
    let total: f64 = counts.iter().sum();
    let present = counts.iter().filter(|&&c| c > 0.0).count() as f64;

    counts
        .iter()
        .map(|&c| if c > 0.0 { total / (present * c) } else { 0.0 })
        .collect()
}

/// A trained random forest classifier.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    /// Train a forest.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidParams` if `params` fail validation.
    pub fn fit(data: &TrainingSet, params: &ForestParams) -> Result<Self, ModelError> {
        params.validate()?;

        let n_features = data.n_features();
        let n_classes = data.n_classes();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: params.features_per_split(n_features),
        };
        let full_weights = balanced_weights(data.labels(), &vec![1.0; data.n_samples()], n_classes);

        let mut master = ChaCha20Rng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| master.gen()).collect();

        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| Self::fit_tree(data, params, tree_params, &full_weights, seed))
            .collect();

        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    fn fit_tree(
        data: &TrainingSet,
        params: &ForestParams,
        tree_params: TreeParams,
        full_weights: &[f64],
        seed: u64,
    ) -> DecisionTree {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let n = data.n_samples();
        let labels = data.labels();

        let mut multiplicity = vec![0.0; n];
        if params.bootstrap {
            for _ in 0..n {
                multiplicity[rng.gen_range(0..n)] += 1.0;
            }
        } else {
            multiplicity.fill(1.0);
        }

        let class_weights = match params.class_weight {
            ClassWeight::Uniform => vec![1.0; data.n_classes()],
            ClassWeight::Balanced => full_weights.to_vec(),
            ClassWeight::BalancedSubsample => {
                balanced_weights(labels, &multiplicity, data.n_classes())
            }
        };

        let weights: Vec<f64> = multiplicity
            .iter()
            .zip(labels)
            .map(|(m, &label)| m * class_weights[label])
            .collect();
        let samples: Vec<usize> = (0..n).filter(|&i| weights[i] > 0.0).collect();

        let builder = TreeBuilder {
            features: data.features(),
            labels,
            weights: &weights,
            n_classes: data.n_classes(),
            params: tree_params,
        };
        builder.grow(samples, &mut rng)
    }

    /// Number of trees in the forest.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Average tree depth across the forest.
    #[must_use]
    pub fn avg_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: usize = self.trees.iter().map(DecisionTree::depth).sum();
        total as f64 / self.trees.len() as f64
    }

    /// Total number of nodes across all trees.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::n_nodes).sum()
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                found: features.len(),
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, d) in proba.iter_mut().zip(tree.predict_distribution(features)) {
                *p += d;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

/// Trainer producing [`RandomForest`] models.
#[derive(Debug, Clone, Default)]
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    #[must_use]
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

impl ClassifierTrainer for ForestTrainer {
    type Model = RandomForest;

    fn fit(&self, data: &TrainingSet) -> Result<RandomForest, ModelError> {
        let started = std::time::Instant::now();
        let forest = RandomForest::fit(data, &self.params)?;

        tracing::info!(
            "Random forest trained: {} trees, avg depth {:.1}, {} nodes, {:.2?}",
            forest.n_trees(),
            forest.avg_depth(),
            forest.total_nodes(),
            started.elapsed()
        );
        Ok(forest)
    }
}

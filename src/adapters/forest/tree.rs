//! CART decision tree for classification.
//!
//! Array-based node storage: node 0 is the root, split nodes hold the indices
//! of their children. Splits minimize weighted Gini impurity; leaves store the
//! weighted class distribution of their training samples, normalized to 1.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

/// Feature values closer than this are treated as equal when looking for
/// split points.
const FEATURE_EPSILON: f64 = 1e-7;

/// Nodes at or below this impurity are not split further.
const IMPURITY_EPSILON: f64 = 1e-12;

/// A node in the decision tree.
#[derive(Debug, Clone)]
enum Node {
    /// `features[feature] <= threshold` goes left, otherwise right.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of non-constant features examined per split.
    pub max_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    /// Weighted impurity of the children (lower is better).
    score: f64,
}

/// A trained classification tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

/// Training inputs shared by every node of one tree.
pub(crate) struct TreeBuilder<'a> {
    pub features: &'a [Vec<f64>],
    pub labels: &'a [usize],
    /// Per-row sample weight; rows outside the bootstrap sample are never visited.
    pub weights: &'a [f64],
    pub n_classes: usize,
    pub params: TreeParams,
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total) * (c / total)).sum::<f64>()
}

fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low / 2.0 + high / 2.0;
    if mid >= high || mid.is_infinite() {
        low
    } else {
        mid
    }
}

impl TreeBuilder<'_> {
    fn class_weights(&self, samples: &[usize]) -> (Vec<f64>, f64) {
        let mut counts = vec![0.0; self.n_classes];
        for &i in samples {
            counts[self.labels[i]] += self.weights[i];
        }
        let total = counts.iter().sum();
        (counts, total)
    }

    /// Grow a tree over `samples` (row indices with positive weight).
    pub fn grow(&self, samples: Vec<usize>, rng: &mut ChaCha20Rng) -> DecisionTree {
        let n_features = self.features.first().map_or(0, Vec::len);
        let mut nodes = vec![Node::Leaf {
            distribution: Vec::new(),
        }];
        let mut pending = vec![(0usize, samples, 0usize)];

        while let Some((id, mut node_samples, depth)) = pending.pop() {
            let (counts, total) = self.class_weights(&node_samples);

            let splittable = node_samples.len() >= self.params.min_samples_split
                && node_samples.len() >= 2 * self.params.min_samples_leaf
                && self.params.max_depth.map_or(true, |max| depth < max)
                && gini(&counts, total) > IMPURITY_EPSILON;

            let split = if splittable {
                self.best_split(&mut node_samples, &counts, total, n_features, rng)
            } else {
                None
            };

            match split {
                Some(split) => {
                    let (left, right): (Vec<usize>, Vec<usize>) = node_samples
                        .iter()
                        .partition(|&&i| self.features[i][split.feature] <= split.threshold);

                    let left_id = nodes.len();
                    let right_id = left_id + 1;
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes[id] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left: left_id,
                        right: right_id,
                    };

                    pending.push((right_id, right, depth + 1));
                    pending.push((left_id, left, depth + 1));
                }
                None => {
                    let distribution = if total > 0.0 {
                        counts.iter().map(|c| c / total).collect()
                    } else {
                        vec![1.0 / self.n_classes as f64; self.n_classes]
                    };
                    nodes[id] = Node::Leaf { distribution };
                }
            }
        }

        DecisionTree {
            nodes,
            n_features,
            n_classes: self.n_classes,
        }
    }

    /// Find the best threshold over a random subset of features.
    ///
    /// Features are visited in random order until `max_features` non-constant
    /// ones have been examined. Reorders `samples`.
    fn best_split(
        &self,
        samples: &mut [usize],
        parent: &[f64],
        total: f64,
        n_features: usize,
        rng: &mut ChaCha20Rng,
    ) -> Option<Split> {
        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(rng);

        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<Split> = None;
        let mut examined = 0;
        let mut left = vec![0.0; self.n_classes];
        let mut right = vec![0.0; self.n_classes];

        for feature in order {
            if examined >= self.params.max_features {
                break;
            }

            let x = self.features;
            samples.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
            if x[samples[n - 1]][feature] <= x[samples[0]][feature] + FEATURE_EPSILON {
                continue;
            }
            examined += 1;

            left.iter_mut().for_each(|c| *c = 0.0);
            let mut left_total = 0.0;

            for pos in 0..n - 1 {
                let i = samples[pos];
                left[self.labels[i]] += self.weights[i];
                left_total += self.weights[i];

                let current = x[i][feature];
                let next = x[samples[pos + 1]][feature];
                if next <= current + FEATURE_EPSILON {
                    continue;
                }
                if pos + 1 < min_leaf || n - pos - 1 < min_leaf {
                    continue;
                }

                let right_total = total - left_total;
                for (r, (p, l)) in right.iter_mut().zip(parent.iter().zip(&left)) {
                    *r = p - l;
                }
                let score =
                    left_total * gini(&left, left_total) + right_total * gini(&right, right_total);

                if best.map_or(true, |b| score < b.score) {
                    best = Some(Split {
                        feature,
                        threshold: midpoint(current, next),
                        score,
                    });
                }
            }
        }

        best
    }
}

impl DecisionTree {
    /// Class distribution of the leaf reached by `features`.
    ///
    /// `features` must have at least `n_features()` entries.
    #[must_use]
    pub fn predict_distribution(&self, features: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Most probable class for `features`.
    #[must_use]
    pub fn predict(&self, features: &[f64]) -> usize {
        self.predict_distribution(features)
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(class, _)| class)
    }

    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub const fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path (a single leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[id] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    fn grow(features: &[Vec<f64>], labels: &[usize], n_classes: usize, params: TreeParams) -> DecisionTree {
        let weights = vec![1.0; labels.len()];
        let builder = TreeBuilder {
            features,
            labels,
            weights: &weights,
            n_classes,
            params,
        };
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        builder.grow((0..labels.len()).collect(), &mut rng)
    }

    #[test]
    fn test_learns_single_threshold() {
        // f[0] <= 0.5 → 0, else → 1; f[1] is noise
        let features = vec![
            vec![0.0, 3.0],
            vec![0.2, 1.0],
            vec![0.4, 2.0],
            vec![0.6, 1.0],
            vec![0.8, 3.0],
            vec![1.0, 2.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = grow(&features, &labels, 2, params());

        assert_eq!(tree.predict(&[0.1, 9.0]), 0);
        assert_eq!(tree.predict(&[0.9, 9.0]), 1);
        assert_eq!(tree.predict_distribution(&[0.0, 0.0]), [1.0, 0.0]);
        assert_eq!(tree.n_features(), 2);
    }

    #[test]
    fn test_pure_node_is_a_leaf() {
        let tree = grow(&[vec![1.0], vec![2.0]], &[1, 1], 3, params());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_distribution(&[5.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_min_samples_split_stops_growth() {
        let features = vec![vec![0.0], vec![1.0]];
        let labels = vec![0, 1];
        let tree = grow(
            &features,
            &labels,
            2,
            TreeParams {
                min_samples_split: 3,
                ..params()
            },
        );
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict_distribution(&[0.0]), [0.5, 0.5]);
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let features: Vec<Vec<f64>> = (0..16).map(|i| vec![f64::from(i)]).collect();
        let labels: Vec<usize> = (0..16).map(|i| i % 2).collect();
        let tree = grow(
            &features,
            &labels,
            2,
            TreeParams {
                max_depth: Some(2),
                ..params()
            },
        );
        assert!(tree.depth() <= 2);
        assert!(tree.n_leaves() <= 4);
    }

    #[test]
    fn test_constant_features_give_a_leaf() {
        let tree = grow(&[vec![1.0, 1.0], vec![1.0, 1.0]], &[0, 1], 2, params());
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint(0.0, 1.0), 0.5);
        assert_eq!(midpoint(1.0, 1.0 + f64::EPSILON), 1.0);
    }
}

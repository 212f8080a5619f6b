/// Fixed-vocabulary TF-IDF vectorizer.
///
/// The vocabulary defines the dimensions; tokens outside it are ignored. IDF weights
/// are fitted once on the product corpus with the smoothed form
/// `ln((1 + n) / (1 + df)) + 1`, and every vector is L2-normalized so cosine
/// similarity reduces to a dot product.
use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;

/// Sparse vector of `(dimension, weight)` pairs sorted by dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    #[cfg(test)]
    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity of two vectors produced by the same vectorizer.
///
/// Both sides are already unit length (or zero), so this is the dot product clamped
/// to [0, 1]. A zero vector on either side scores 0.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }
    a.dot(b).clamp(0.0, 1.0)
}

pub struct TfidfVectorizer {
    /// term -> dimension index
    vocabulary: HashMap<String, usize>,
    /// IDF weight per dimension
    idf: Vec<f32>,
    token_re: Regex,
}

impl TfidfVectorizer {
    /// Fit IDF weights for `vocabulary` over `corpus`.
    ///
    /// `vocabulary` order fixes the dimension order. Documents are the product
    /// ingredient texts; a missing text should be passed as `""`.
    pub fn fit<S: AsRef<str>>(vocabulary: &[String], corpus: &[S]) -> Self {
        let token_re = Regex::new(r"\b\w\w+\b").expect("valid regex");
        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        let mut doc_freq = vec![0usize; vocabulary.len()];
        for doc in corpus {
            let lowered = doc.as_ref().to_lowercase();
            let present: HashSet<usize> = token_re
                .find_iter(&lowered)
                .filter_map(|m| index.get(m.as_str()).copied())
                .collect();
            for dim in present {
                doc_freq[dim] += 1;
            }
        }

        let n = corpus.len() as f32;
        let idf = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        Self {
            vocabulary: index,
            idf,
            token_re,
        }
    }

    /// Number of dimensions (vocabulary size).
    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    /// Vectorize one text.
    pub fn transform(&self, text: &str) -> SparseVector {
        let lowered = text.to_lowercase();
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for m in self.token_re.find_iter(&lowered) {
            if let Some(&dim) = self.vocabulary.get(m.as_str()) {
                *counts.entry(dim).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector {
            entries: counts
                .into_iter()
                .map(|(dim, tf)| (dim, tf * self.idf[dim]))
                .collect(),
        };

        let norm = vector.norm();
        if norm > 0.0 {
            for (_, w) in vector.entries.iter_mut() {
                *w /= norm;
            }
        }
        vector
    }

    /// Vectorize a collection of texts; row `i` corresponds to `texts[i]`.
    pub fn transform_many<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }
}

// 🔢 TF-IDF Vectorizer
// Learns a vocabulary + smoothed IDF weights from training text and maps
// normalized text to L2-normalized sparse vectors.

use crate::normalize::tokenize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse feature vector: `(vocabulary index, weight)` pairs sorted by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit vocabulary and IDF weights on already-normalized documents.
    ///
    /// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let terms: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| tokenize(doc.as_ref()))
            .collect();

        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for doc in documents {
            let seen: BTreeSet<usize> = tokenize(doc.as_ref())
                .into_iter()
                .filter_map(|token| vocabulary.get(token).copied())
                .collect();
            for index in seen {
                document_frequency[index] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        TfidfVectorizer { vocabulary, idf }
    }

    /// Transform normalized text. Unknown tokens are ignored; text with no
    /// known tokens yields the empty (zero) vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector {
            entries: counts
                .into_iter()
                .map(|(index, count)| (index, count * self.idf[index]))
                .collect(),
        };

        let norm = vector.norm();
        if norm > 0.0 {
            for (_, weight) in vector.entries.iter_mut() {
                *weight /= norm;
            }
        }

        vector
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    #[cfg(test)]
    fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    #[cfg(test)]
    fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|index| self.idf[index])
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> TfidfVectorizer {
        TfidfVectorizer::fit(&["spent at zomato", "spent at flipkart", "paid for water bill"])
    }

    #[test]
    fn test_vocabulary_is_sorted_and_deduplicated() {
        let v = fitted();
        assert_eq!(v.vocabulary_len(), 8);
        assert_eq!(v.index_of("at"), Some(0));
        assert_eq!(v.index_of("zomato"), Some(7));
        assert_eq!(v.index_of("a"), None);
    }

    #[test]
    fn test_idf_is_smoothed() {
        let v = fitted();
        // "spent" in 2 of 3 docs, "water" in 1 of 3
        let spent = v.idf("spent").unwrap();
        let water = v.idf("water").unwrap();
        assert!((spent - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((water - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert!(water > spent);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let v = fitted();
        let vector = v.transform("spent at zomato");
        assert_eq!(vector.entries.len(), 3);
        assert!((vector.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_vocabulary_tokens_are_dropped() {
        let v = fitted();
        let known = v.transform("spent at zomato");
        let noisy = v.transform("spent at zomato yesterday evening");
        assert_eq!(known, noisy);
        assert!(v.transform("completely unseen words").is_empty());
        assert!(v.transform("").is_empty());
    }

    #[test]
    fn test_repeated_terms_weigh_more() {
        let v = fitted();
        let vector = v.transform("zomato zomato spent");
        let zomato = v.index_of("zomato").unwrap();
        let spent = v.index_of("spent").unwrap();
        let weight = |i: usize| vector.entries.iter().find(|(j, _)| *j == i).unwrap().1;
        assert!(weight(zomato) > weight(spent));
    }
}

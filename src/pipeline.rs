// 🧠 Classifier Pipeline - normalize → TF-IDF → logistic regression
//
// `train` builds an immutable `Model` once; every caller classifies through
// `&Model`, so the model can be shared freely across threads.

use crate::catalog::{Category, TrainingExample};
use crate::classifier::{FitReport, LogisticRegression};
use crate::config::TrainingConfig;
use crate::normalize::normalize;
use crate::vectorizer::TfidfVectorizer;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("training set is empty")]
    EmptyCatalog,

    #[error("training set only contains category {0}; at least two are required")]
    SingleCategory(Category),

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
}

/// Trained classifier: fitted vectorizer + fitted linear model
#[derive(Debug, Clone)]
pub struct Model {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
    /// Label for each classifier output index
    categories: Vec<Category>,
    report: FitReport,
}

/// Fit a model on raw (un-normalized) examples.
///
/// Only categories present in `examples` can ever be predicted.
pub fn train(examples: &[TrainingExample], config: &TrainingConfig) -> Result<Model, TrainError> {
    if let Some(problem) = config.problem() {
        return Err(TrainError::InvalidConfig(problem));
    }

    let first = examples.first().ok_or(TrainError::EmptyCatalog)?;

    let mut categories: Vec<Category> = examples.iter().map(|e| e.category).collect();
    categories.sort();
    categories.dedup();
    if categories.len() < 2 {
        return Err(TrainError::SingleCategory(first.category));
    }

    let documents: Vec<String> = examples.iter().map(|e| normalize(&e.text)).collect();
    let vectorizer = TfidfVectorizer::fit(&documents);
    let samples: Vec<_> = documents.iter().map(|doc| vectorizer.transform(doc)).collect();

    let labels: Vec<usize> = examples
        .iter()
        .map(|e| {
            categories
                .binary_search(&e.category)
                .unwrap_or_else(|_| unreachable!("category list built from examples"))
        })
        .collect();

    let (classifier, report) = LogisticRegression::fit(
        &samples,
        &labels,
        vectorizer.vocabulary_len(),
        categories.len(),
        config,
    );

    if report.converged {
        info!(
            examples = examples.len(),
            vocabulary = vectorizer.vocabulary_len(),
            categories = categories.len(),
            iterations = report.iterations,
            loss = report.final_loss,
            "classifier trained"
        );
    } else {
        warn!(
            iterations = report.iterations,
            loss = report.final_loss,
            "classifier hit the iteration cap before converging"
        );
    }

    Ok(Model {
        vectorizer,
        classifier,
        categories,
        report,
    })
}

impl Model {
    /// Classify a raw message (normalized here, exactly as during training)
    pub fn classify(&self, text: &str) -> Category {
        self.classify_normalized(&normalize(text))
    }

    /// Classify text that has already been through `normalize`
    pub fn classify_normalized(&self, normalized: &str) -> Category {
        let vector = self.vectorizer.transform(normalized);
        if vector.is_empty() {
            debug!(text = normalized, "no known terms, falling back to class priors");
        }
        let category = self.categories[self.classifier.predict(&vector)];
        debug!(text = normalized, %category, "classified");
        category
    }

    /// Per-category probabilities for a raw message, in category order
    pub fn probabilities(&self, text: &str) -> Vec<(Category, f64)> {
        let vector = self.vectorizer.transform(&normalize(text));
        self.categories
            .iter()
            .copied()
            .zip(self.classifier.probabilities(&vector).iter().copied())
            .collect()
    }

    /// Categories this model can emit
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vectorizer.vocabulary_len()
    }

    pub fn iterations(&self) -> usize {
        self.report.iterations
    }

    pub fn converged(&self) -> bool {
        self.report.converged
    }
}

// ============================================================================
// TESTS
// ============================================================================

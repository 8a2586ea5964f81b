// Expense Classifier - Core Library
// Exposes all modules for use in the CLI, the TUI form, the web server, and tests

pub mod normalize;      // Text Normalizer
pub mod catalog;        // Label Catalog - categories + training examples
pub mod vectorizer;     // TF-IDF text → vector
pub mod classifier;     // Multinomial logistic regression
pub mod pipeline;       // train() → Model
pub mod ledger;         // Per-user CSV ledgers
pub mod session;        // Interaction Loop
pub mod report;         // Text table + bar chart
pub mod config;         // AppConfig / TrainingConfig

// Re-export commonly used types
pub use normalize::{normalize, tokenize, CURRENCY_MARKER};
pub use catalog::{label_catalog, Category, ParseCategoryError, TrainingExample};
pub use vectorizer::{SparseVector, TfidfVectorizer};
pub use classifier::{FitReport, LogisticRegression};
pub use pipeline::{train, Model, TrainError};
pub use ledger::{CsvLedgerStore, Entry, LedgerError, LedgerStore, MemoryLedgerStore, UserKey};
pub use session::{
    category_frequencies, history, split_messages, submit,
    CategoryCount, InputWarning, Report, Submission,
};
pub use report::{FrequencyChart, LedgerTable};
pub use config::{AppConfig, TrainingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Train on the built-in label catalog
pub fn train_default(config: &TrainingConfig) -> Result<Model, TrainError> {
    train(&label_catalog(), config)
}

//! Supervised training-data generation.
//!
//! Reads `{about_me, context}` examples, asks an LLM for a reasoned answer
//! to each, and writes the result back out as training data.

mod generator;
mod types;

pub use self::generator::{
    examples_file_path, generate_training_data, load_examples, save_training_data,
    training_data_file_path,
};
pub use self::types::{TrainingExample, ALLOWED_MODELS};

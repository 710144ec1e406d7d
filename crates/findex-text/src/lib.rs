pub mod index;
pub mod stopwords;
pub mod tokenize;

pub use index::{TfidfIndex, MAX_VOCAB};

//! Fact-language parsing, validation and persistence.

mod error;
/// Fact file loading and discovery.
pub mod loader;
/// Syntactic pass producing raw facts.
pub mod parser;
/// Semantic checks producing the immutable model.
pub mod validator;
/// Rendering the model back to facts.
pub mod writer;

pub use error::{Endpoint, EnvironmentError, EnvironmentWarning};
pub use loader::EnvironmentLoader;
pub use parser::{FactParser, ParsedFacts, TrainFact};
pub use validator::{EnvironmentValidator, Validated};
pub use writer::{persist_facts, write_facts};

/*!
Text utilities used when speaking text.
*/

mod cluster_set;
mod clusters;
mod substitutions;
mod whitespace;

pub use cluster_set::ExtendedGraphemeClusterSet;
pub use clusters::{clusters, CharacterClass, Clusters};
pub use substitutions::{
  AbbreviationExpansion, DecomposingSubstitutions, PunctuationExpansion, SimpleSubstitutions,
  SubstitutionChain, Substitutions, SynthesizerMarkup,
};
pub use whitespace::{Indentation, Leading, Run, WhitespaceClassifier, WhitespaceStatistics};

//! Name comparison for reconciling package names with import names.
//!
//! Package names on PyPI and the names code imports them under drift apart
//! in predictable ways (`python-dotenv` vs `dotenv`, `scikit_learn` vs
//! `scikit-learn`). This module provides the two primitives every other
//! component compares names with:
//!
//! - [`normalize`] folds case and strips `-` / `_` separators.
//! - [`is_similar`] layers exact, substring and ratio-based matching on top.
//!
//! # Example
//!
//! ```
//! use depscope::matching::{is_similar, normalize, DEFAULT_THRESHOLD};
//!
//! assert_eq!(normalize("Typing_Extensions"), "typingextensions");
//! assert!(is_similar("pandas-datareader", "pandas_datareader", DEFAULT_THRESHOLD));
//! ```

pub mod normalize;
pub mod similarity;

pub use normalize::{normalize, pep503_normalize};
pub use similarity::{is_similar, similarity_ratio, DEFAULT_THRESHOLD};

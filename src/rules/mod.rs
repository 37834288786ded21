//! Rule table and product registry
//!
//! This module holds the static configuration the classifier consults:
//! the supported product categories, the quality labels, and the HSV
//! color ranges authored per category.

pub mod category;
pub mod table;

pub use category::{ProductCategory, QualityLabel};
pub use table::{ColorRange, QualityRule, QualityRuleSet, RuleTable};

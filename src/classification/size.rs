//! Size bucketing over a pixel-length measurement
//!
//! The measurement is the larger side of the detection box. Buckets are
//! half-open `[min, max)` intervals scanned in table order.

use serde::{Deserialize, Serialize};

use crate::constants::size::UNDETERMINED;
use crate::error::{GradingError, Result};

/// Labeled half-open interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeCategory {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl SizeCategory {
    pub fn new(label: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    #[inline]
    pub fn contains(&self, measurement: f64) -> bool {
        self.min <= measurement && measurement < self.max
    }

    fn overlaps(&self, other: &SizeCategory) -> bool {
        self.min < other.max && other.min < self.max
    }
}

/// Ordered size buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeTable {
    categories: Vec<SizeCategory>,
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl SizeTable {
    /// Validated table from explicit buckets
    pub fn new(categories: Vec<SizeCategory>) -> Result<Self> {
        let table = Self { categories };
        table.validate()?;
        Ok(table)
    }

    /// small / medium / large / extra large over `[0, 200)` pixels
    pub fn standard() -> Self {
        Self {
            categories: vec![
                SizeCategory::new("small", 0.0, 30.0),
                SizeCategory::new("medium", 30.0, 60.0),
                SizeCategory::new("large", 60.0, 100.0),
                SizeCategory::new("extra large", 100.0, 200.0),
            ],
        }
    }

    pub fn categories(&self) -> &[SizeCategory] {
        &self.categories
    }

    /// Label of the first bucket containing the measurement
    ///
    /// Returns `"undetermined"` outside the covered domain and for
    /// non-finite input.
    pub fn classify_size(&self, measurement: f64) -> &str {
        self.categories
            .iter()
            .find(|category| category.contains(measurement))
            .map(|category| category.label.as_str())
            .unwrap_or(UNDETERMINED)
    }

    /// Like [`classify_size`](Self::classify_size) but rejects non-finite input
    pub fn try_classify_size(&self, measurement: f64) -> Result<&str> {
        if !measurement.is_finite() {
            return Err(GradingError::InvalidParameter {
                parameter: "size_px".to_string(),
                value: measurement.to_string(),
            });
        }
        Ok(self.classify_size(measurement))
    }

    /// Check bounds and that no two buckets overlap
    pub fn validate(&self) -> Result<()> {
        for (i, category) in self.categories.iter().enumerate() {
            if !category.min.is_finite() || !category.max.is_finite() {
                return Err(GradingError::invalid_config(format!(
                    "size bucket '{}' has non-finite bounds",
                    category.label
                )));
            }
            if category.min >= category.max {
                return Err(GradingError::invalid_config(format!(
                    "size bucket '{}' is empty: [{}, {})",
                    category.label, category.min, category.max
                )));
            }
            if category.label == UNDETERMINED {
                return Err(GradingError::invalid_config(format!(
                    "size label '{}' is reserved",
                    UNDETERMINED
                )));
            }
            if let Some(other) = self.categories[..i].iter().find(|c| c.overlaps(category)) {
                return Err(GradingError::invalid_config(format!(
                    "size buckets '{}' and '{}' overlap",
                    other.label, category.label
                )));
            }
        }
        Ok(())
    }
}

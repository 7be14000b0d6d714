use thiserror::Error;

/// Rectangular numeric dataset whose last column is the regression target.
///
/// Rows are stored contiguously. The target vector is extracted once at construction and
/// shared read-only afterwards; feature columns are materialized on demand by each job.
#[derive(Debug, Clone)]
pub struct Table {
    values: Vec<f64>,
    columns_len: usize,
    target: Vec<f64>,
    feature_names: Option<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, TableError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(TableError::EmptyTable);
        }

        let columns_len = rows[0].len();
        if let Some((row, r)) = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, r)| r.len() != columns_len)
        {
            return Err(TableError::RowSizeMismatch {
                row,
                expected: columns_len,
                actual: r.len(),
            });
        }

        let target = rows
            .iter()
            .map(|r| r[columns_len - 1])
            .collect::<Vec<_>>();
        if target.iter().any(|t| !t.is_finite()) {
            return Err(TableError::NonFiniteTarget);
        }

        Ok(Self {
            values: rows.into_iter().flatten().collect(),
            columns_len,
            target,
            feature_names: None,
        })
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self, TableError> {
        if names.len() != self.features_len() {
            return Err(TableError::FeatureNamesMismatch {
                names: names.len(),
                features: self.features_len(),
            });
        }
        self.feature_names = Some(names);
        Ok(self)
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn column(&self, column_index: usize) -> impl '_ + Iterator<Item = f64> + Clone {
        debug_assert!(column_index < self.columns_len);
        self.values
            .iter()
            .skip(column_index)
            .step_by(self.columns_len)
            .copied()
    }

    pub fn feature_name(&self, feature_index: usize) -> Option<&str> {
        self.feature_names
            .as_ref()
            .and_then(|names| names.get(feature_index))
            .map(String::as_str)
    }

    pub fn features_len(&self) -> usize {
        self.columns_len - 1
    }

    pub fn rows_len(&self) -> usize {
        self.target.len()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table must have at least one column and one row")]
    EmptyTable,

    #[error("row {row} has {actual} columns but the first row has {expected}")]
    RowSizeMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("target column contains non finite numbers")]
    NonFiniteTarget,

    #[error("got {names} feature names for {features} features")]
    FeatureNamesMismatch { names: usize, features: usize },
}

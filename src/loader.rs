use crate::table::{Table, TableError};
use log::debug;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Loads a delimited text table from `path`.
///
/// The first row is a header and the first column is a row identifier; both are dropped.
/// The remaining columns must be numeric, the last of them being the regression target.
/// Header names of the feature columns are kept for display.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(file)?;
    debug!(
        "loaded {}: {} rows, {} features",
        path.display(),
        table.rows_len(),
        table.features_len()
    );
    Ok(table)
}

/// Same as [`load_table`] but reads from an arbitrary reader.
pub fn read_table<R: io::Read>(reader: R) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut names = reader
        .headers()?
        .iter()
        .skip(1)
        .map(str::to_owned)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // 1-indexed over records, the header being row 1.
        let row = i + 2;
        let values = record
            .iter()
            .enumerate()
            .skip(1)
            .map(|(j, raw)| {
                raw.parse::<f64>().map_err(|_| LoadError::Parse {
                    row,
                    column: j + 1,
                    raw_value: raw.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(values);
    }

    let table = Table::new(rows).map_err(|e| match e {
        TableError::RowSizeMismatch {
            row,
            expected,
            actual,
        } => LoadError::RowSizeMismatch {
            row: row + 2,
            expected: expected + 1,
            actual: actual + 1,
        },
        e => LoadError::Table(e),
    })?;
    if names.len() == table.features_len() + 1 {
        names.pop();
        Ok(table.with_feature_names(names)?)
    } else {
        Ok(table)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing error on row {row}, column {column}: {raw_value:?} is not a number")]
    Parse {
        row: usize,
        column: usize,
        raw_value: String,
    },

    #[error("row {row} has {actual} columns but row 2 has {expected}")]
    RowSizeMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("malformed delimited text")]
    Csv(#[from] csv::Error),

    #[error("unusable table")]
    Table(#[from] TableError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_header_and_identifier() -> Result<(), anyhow::Error> {
        let input = "id,crim,zn,medv\n\
                     a,1,2,10\n\
                     b,2,3,13\n\
                     c,3,4,16\n";
        let table = read_table(input.as_bytes())?;

        assert_eq!(table.rows_len(), 3);
        assert_eq!(table.features_len(), 2);
        assert_eq!(table.target(), &[10.0, 13.0, 16.0]);
        assert_eq!(table.column(1).collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(table.feature_name(0), Some("crim"));
        assert_eq!(table.feature_name(1), Some("zn"));
        Ok(())
    }

    #[test]
    fn parses_padded_and_scientific_values() -> Result<(), anyhow::Error> {
        let input = "id, x , y\n1, 1.5e1 , -2\n2,0.25,3\n";
        let table = read_table(input.as_bytes())?;
        assert_eq!(table.column(0).collect::<Vec<_>>(), vec![15.0, 0.25]);
        assert_eq!(table.target(), &[-2.0, 3.0]);
        assert_eq!(table.feature_name(0), Some("x"));
        Ok(())
    }

    #[test]
    fn reports_exact_position_of_bad_cell() {
        let input = "id,a,b,target\n\
                     r1,1,2,3\n\
                     r2,4,oops,6\n\
                     r3,7,8,9\n";
        match read_table(input.as_bytes()) {
            Err(LoadError::Parse {
                row,
                column,
                raw_value,
            }) => {
                assert_eq!(row, 3);
                assert_eq!(column, 3);
                assert_eq!(raw_value, "oops");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_identifier_is_ignored() -> Result<(), anyhow::Error> {
        let table = read_table("name,x,y\nnot a number,1,2\nalso not,2,4\n".as_bytes())?;
        assert_eq!(table.rows_len(), 2);
        Ok(())
    }

    #[test]
    fn rows_are_counted_by_record_not_by_line() {
        let input = "id,a,y\n\nr1,1,2\nr2,x,3\n";
        assert!(matches!(
            read_table(input.as_bytes()),
            Err(LoadError::Parse { row: 3, column: 2, .. })
        ));

        let input = "id,a,y\n\"first\nrow\",1,2\nr2,x,3\n";
        assert!(matches!(
            read_table(input.as_bytes()),
            Err(LoadError::Parse { row: 3, column: 2, .. })
        ));
    }

    #[test]
    fn ragged_rows_use_file_numbering() {
        let input = "id,a,b\n1,1,2\n2,3\n";
        assert!(matches!(
            read_table(input.as_bytes()),
            Err(LoadError::RowSizeMismatch {
                row: 3,
                expected: 3,
                actual: 2
            })
        ));

        let input = "id,a,b\n1,1,2\n\n2,3,4\n3,5\n";
        assert!(matches!(
            read_table(input.as_bytes()),
            Err(LoadError::RowSizeMismatch { row: 4, .. })
        ));
    }

    #[test]
    fn header_only_input_is_empty() {
        assert!(matches!(
            read_table("id,a,b\n".as_bytes()),
            Err(LoadError::Table(TableError::EmptyTable))
        ));
    }

    #[test]
    fn bundled_sample_loads() -> Result<(), anyhow::Error> {
        let table = load_table(concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample.csv"))?;
        assert_eq!(table.rows_len(), 10);
        assert_eq!(table.features_len(), 3);
        assert_eq!(table.feature_name(0), Some("rooms"));
        assert_eq!(table.feature_name(2), Some("distance"));
        assert_eq!(table.target()[0], 24.0);
        Ok(())
    }

    #[test]
    fn missing_file_is_a_file_access_error() {
        let path = Path::new("this/path/does/not/exist.csv");
        match load_table(path) {
            Err(LoadError::FileAccess { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

//! Parser for the tabular text written by `odb sql`.

use crate::error::FileError;

/// Numeric output of a query: an echoed header line followed by rows of values.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTable {
    pub header: String,
    pub rows: Vec<Vec<f64>>,
}

impl QueryTable {
    /// First value of the first row, which is the whole answer for `count(*)`.
    pub fn count(&self) -> Result<f64, FileError> {
        self.rows
            .first()
            .and_then(|row| row.first())
            .copied()
            .ok_or_else(|| FileError::Unparseable("query returned no rows".to_string()))
    }
}

/// Parses query output. Blank lines are ignored; cells are tab separated
/// but any whitespace is accepted.
pub fn parse_output(text: &str) -> Result<QueryTable, FileError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| FileError::Unparseable("empty output".to_string()))?
        .to_string();

    let mut rows = Vec::new();
    for line in lines {
        let row = line
            .split_whitespace()
            .map(|cell| {
                cell.parse::<f64>()
                    .map_err(|_| FileError::Unparseable(format!("'{cell}' in line '{line}'")))
            })
            .collect::<Result<Vec<f64>, FileError>>()?;
        rows.push(row);
    }

    Ok(QueryTable { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        let table = parse_output("count(*)\n 12345\n").unwrap();
        assert_eq!(table.header, "count(*)");
        assert_eq!(table.count().unwrap(), 12345.0);
    }

    #[test]
    fn test_parse_tab_separated_rows() {
        let table = parse_output("a\tb\n1\t2.5\n3\t4\n\n").unwrap();
        assert_eq!(table.rows, vec![vec![1.0, 2.5], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_header_only_has_no_count() {
        let table = parse_output("count(*)\n").unwrap();
        assert!(matches!(table.count(), Err(FileError::Unparseable(_))));
    }

    #[test]
    fn test_garbage_is_unparseable() {
        assert!(matches!(parse_output(""), Err(FileError::Unparseable(_))));
        assert!(matches!(
            parse_output("count(*)\nERROR: corrupt file\n"),
            Err(FileError::Unparseable(_))
        ));
    }
}

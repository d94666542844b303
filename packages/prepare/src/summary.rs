//! Column profile of a CSV file.
//!
//! Cell values are compared exactly as written, so `"Kerala"` and
//! `"Kerala "` count as two distinct values. Only a cell with no content
//! at all is missing.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::PrepareError;

/// Columns with fewer distinct values than this have them listed.
pub const LIST_VALUES_BELOW: usize = 20;

/// Number of leading records kept for display.
pub const HEAD_ROWS: usize = 5;

/// Count, mean and range of a column whose values are all numeric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericStats {
    /// Non-missing values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    /// Header name.
    pub name: String,
    /// Distinct non-empty values.
    pub distinct: usize,
    /// Empty cells.
    pub missing: usize,
    /// The distinct values in first-seen order, when there are fewer than
    /// [`LIST_VALUES_BELOW`].
    pub values: Option<Vec<String>>,
    /// Present when every non-empty value parses as a finite number.
    pub numeric: Option<NumericStats>,
}

/// Profile of a whole CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// Data records (the header is not counted).
    pub rows: u64,
    /// Per-column profiles in header order.
    pub columns: Vec<ColumnSummary>,
    /// The first [`HEAD_ROWS`] records.
    pub head: Vec<Vec<String>>,
}

struct ColumnTally {
    seen: HashSet<String>,
    order: Vec<String>,
    missing: usize,
    numeric: Option<NumericStats>,
    sum: f64,
    all_numeric: bool,
}

impl ColumnTally {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            order: Vec::new(),
            missing: 0,
            numeric: None,
            sum: 0.0,
            all_numeric: true,
        }
    }

    fn observe(&mut self, value: &str) {
        if value.is_empty() {
            self.missing += 1;
            return;
        }

        if self.all_numeric {
            self.observe_number(value);
        }

        if self.seen.insert(value.to_string()) && self.order.len() < LIST_VALUES_BELOW {
            self.order.push(value.to_string());
        }
    }

    fn observe_number(&mut self, value: &str) {
        let Some(x) = value.trim().parse::<f64>().ok().filter(|x| x.is_finite()) else {
            self.all_numeric = false;
            self.numeric = None;
            return;
        };
        self.sum += x;
        self.numeric = Some(match self.numeric {
            None => NumericStats {
                count: 1,
                mean: x,
                min: x,
                max: x,
            },
            Some(stats) => NumericStats {
                count: stats.count + 1,
                mean: 0.0,
                min: stats.min.min(x),
                max: stats.max.max(x),
            },
        });
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, name: String) -> ColumnSummary {
        let distinct = self.seen.len();
        let sum = self.sum;
        ColumnSummary {
            name,
            distinct,
            missing: self.missing,
            values: (distinct < LIST_VALUES_BELOW).then_some(self.order),
            numeric: self.numeric.map(|stats| NumericStats {
                mean: sum / stats.count as f64,
                ..stats
            }),
        }
    }
}

/// Profiles the CSV read from `input`.
///
/// # Errors
///
/// Returns [`PrepareError::Csv`] if the input is not valid CSV.
pub fn summarize<R: Read>(input: R) -> Result<DatasetSummary, PrepareError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(input);
    let headers = reader.headers()?.clone();
    let mut tallies: Vec<ColumnTally> = headers.iter().map(|_| ColumnTally::new()).collect();
    let mut head = Vec::with_capacity(HEAD_ROWS);
    let mut rows = 0_u64;

    for result in reader.records() {
        let record = result?;
        rows += 1;
        for (i, tally) in tallies.iter_mut().enumerate() {
            tally.observe(record.get(i).unwrap_or(""));
        }
        if head.len() < HEAD_ROWS {
            head.push(record.iter().map(str::to_string).collect());
        }
    }

    Ok(DatasetSummary {
        rows,
        columns: headers
            .iter()
            .zip(tallies)
            .map(|(name, tally)| tally.finish(name.to_string()))
            .collect(),
        head,
    })
}

/// [`summarize`] over a file.
///
/// # Errors
///
/// Returns [`PrepareError`] if the file cannot be opened or is not valid
/// CSV.
pub fn summarize_file(input: &Path) -> Result<DatasetSummary, PrepareError> {
    summarize(File::open(input)?)
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "First {} rows of the dataset:", self.head.len())?;
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(f, "{}", names.join(", "))?;
        for row in &self.head {
            writeln!(f, "{}", row.join(", "))?;
        }

        writeln!(
            f,
            "\nDataset contains {} rows and {} columns.",
            self.rows,
            self.columns.len()
        )?;

        writeln!(f, "\nUnique values in each column:")?;
        for column in &self.columns {
            writeln!(f, "{}: {} unique values", column.name, column.distinct)?;
            if let Some(values) = &column.values {
                let quoted: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
                writeln!(f, "  [{}]", quoted.join(", "))?;
            }
        }

        writeln!(f, "\nSummary statistics for numerical columns:")?;
        for column in &self.columns {
            if let Some(stats) = &column.numeric {
                writeln!(
                    f,
                    "{}: count={} mean={:.4} min={} max={}",
                    column.name, stats.count, stats.mean, stats.min, stats.max
                )?;
            }
        }

        writeln!(f, "\nMissing values in each column:")?;
        for column in &self.columns {
            writeln!(f, "{}: {}", column.name, column.missing)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn counts_rows_distinct_and_missing() {
        let input = "\
state_ut,Disease,Deaths
Kerala,Dengue,
Goa,Malaria,2
Goa,Dengue,
";
        let summary = summarize(input.as_bytes()).unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(
            summary.columns[0],
            ColumnSummary {
                name: "state_ut".to_string(),
                distinct: 2,
                missing: 0,
                values: Some(vec!["Kerala".to_string(), "Goa".to_string()]),
                numeric: None,
            }
        );
        assert_eq!(summary.columns[2].missing, 2);
        assert_eq!(summary.columns[2].distinct, 1);
    }

    #[test]
    fn whitespace_variants_are_distinct_values() {
        let summary = summarize("state_ut\nKerala\nKerala \n".as_bytes()).unwrap();

        assert_eq!(summary.columns[0].distinct, 2);
        assert_eq!(
            summary.columns[0].values,
            Some(vec!["Kerala".to_string(), "Kerala ".to_string()])
        );
        assert_eq!(summary.columns[0].missing, 0);
    }

    #[test]
    fn numeric_columns_get_count_mean_and_range() {
        let input = "Cases,Temp,state_ut\n4,300.5,Goa\n,301.5,Goa\n10,299.0,Assam\n";
        let summary = summarize(input.as_bytes()).unwrap();

        let cases = summary.columns[0].numeric.unwrap();
        assert_eq!(cases.count, 2);
        assert!((cases.mean - 7.0).abs() < EPSILON);
        assert!((cases.min - 4.0).abs() < EPSILON);
        assert!((cases.max - 10.0).abs() < EPSILON);

        let temp = summary.columns[1].numeric.unwrap();
        assert_eq!(temp.count, 3);
        assert!((temp.mean - 300.333_333_333).abs() < 1e-6);

        assert_eq!(summary.columns[2].numeric, None);
    }

    #[test]
    fn one_text_value_makes_a_column_non_numeric() {
        let summary = summarize("Deaths\n1\nunknown\n3\n".as_bytes()).unwrap();
        assert_eq!(summary.columns[0].numeric, None);
    }

    #[test]
    fn high_cardinality_columns_are_not_listed() {
        let mut input = String::from("week\n");
        for i in 0..LIST_VALUES_BELOW {
            input.push_str(&format!("2024-01-{:02}\n", i + 1));
        }
        let summary = summarize(input.as_bytes()).unwrap();

        assert_eq!(summary.columns[0].distinct, LIST_VALUES_BELOW);
        assert_eq!(summary.columns[0].values, None);
    }

    #[test]
    fn short_records_count_as_missing() {
        let summary = summarize("a,b\n1\n2,3\n".as_bytes()).unwrap();
        assert_eq!(summary.columns[1].missing, 1);
    }

    #[test]
    fn keeps_only_the_first_rows_for_display() {
        let mut input = String::from("n\n");
        for i in 0..HEAD_ROWS + 3 {
            input.push_str(&format!("{i}\n"));
        }
        let summary = summarize(input.as_bytes()).unwrap();

        assert_eq!(summary.head.len(), HEAD_ROWS);
        assert_eq!(summary.head[0], ["0"]);
    }

    #[test]
    fn display_reports_shape_and_statistics() {
        let summary = summarize("a,b\n1,x\n".as_bytes()).unwrap();
        let text = summary.to_string();
        assert!(text.starts_with("First 1 rows of the dataset:\na, b\n1, x\n"));
        assert!(text.contains("Dataset contains 1 rows and 2 columns."));
        assert!(text.contains("a: 1 unique values\n  [\"1\"]"));
        assert!(text.contains("a: count=1 mean=1.0000 min=1 max=1"));
        assert!(!text.contains("b: count="));
    }
}

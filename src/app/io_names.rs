// Readers for candidate-name inputs.

use std::fs;

use calamine::{open_workbook, Reader, Xlsx};
use csv;
use log::debug;
use snafu::prelude::*;

use crate::app::{
    AppResult, CsvLineParseSnafu, CsvOpenSnafu, EmptyExcelSnafu, OpeningExcelSnafu,
    OpeningNamesSnafu,
};

/// One name per line, the format lists are usually pasted in. Blank
/// lines and surrounding whitespace are dropped.
pub fn read_txt_names(path: &str) -> AppResult<Vec<String>> {
    let contents = fs::read_to_string(path).context(OpeningNamesSnafu { path })?;
    let res: Vec<String> = contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();
    debug!("read_txt_names: {}: {} names", path, res.len());
    Ok(res)
}

/// The first column of each CSV row is a name. No header row expected.
pub fn read_csv_names(path: &str) -> AppResult<Vec<String>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut res: Vec<String> = Vec::new();
    for line_r in rdr.into_records() {
        let line = line_r.context(CsvLineParseSnafu {})?;
        if let Some(field) = line.get(0) {
            let name = field.trim();
            if !name.is_empty() {
                res.push(name.to_string());
            }
        }
    }
    debug!("read_csv_names: {}: {} names", path, res.len());
    Ok(res)
}

/// The first column of an Excel worksheet, defaulting to the first
/// worksheet of the workbook. Non-text cells are ignored.
pub fn read_excel_names(path: &str, worksheet: Option<&String>) -> AppResult<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(sheet) => workbook
            .worksheet_range(sheet)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };
    let mut res: Vec<String> = Vec::new();
    for row in wrange.rows() {
        if let Some(calamine::DataType::String(s)) = row.first() {
            let name = s.trim();
            if !name.is_empty() {
                res.push(name.to_string());
            }
        }
    }
    debug!("read_excel_names: {}: {} names", path, res.len());
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str, ext: &str) -> String {
        std::env::temp_dir()
            .join(format!(
                "namerank-io-{}-{}.{}",
                tag,
                std::process::id(),
                ext
            ))
            .display()
            .to_string()
    }

    #[test]
    fn txt_reader_trims_and_skips_blanks() {
        let path = temp_path("txt", "txt");
        fs::write(&path, "Anna\n\n  Bob  \nClara\n").unwrap();
        let names = read_txt_names(&path).unwrap();
        assert_eq!(names, vec!["Anna", "Bob", "Clara"]);
    }

    #[test]
    fn csv_reader_takes_the_first_column() {
        let path = temp_path("csv", "csv");
        fs::write(&path, "Anna,girl\nBob,boy\n,\nClara\n").unwrap();
        let names = read_csv_names(&path).unwrap();
        assert_eq!(names, vec!["Anna", "Bob", "Clara"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_txt_names("/nonexistent/names.txt").unwrap_err();
        assert!(format!("{}", err).contains("names file"));
    }

    #[test]
    fn excel_reader_reports_unreadable_workbooks() {
        let err = read_excel_names("/nonexistent/names.xlsx", None).unwrap_err();
        assert!(format!("{}", err).contains("Excel file"));

        // A file that exists but is not a workbook at all.
        let path = temp_path("not-a-workbook", "xlsx");
        fs::write(&path, "Anna\nBob\n").unwrap();
        let err = read_excel_names(&path, None).unwrap_err();
        assert!(format!("{}", err).contains("Excel file"));

        let sheet = "Names".to_string();
        let err = read_excel_names(&path, Some(&sheet)).unwrap_err();
        assert!(format!("{}", err).contains("Excel file"));
    }
}

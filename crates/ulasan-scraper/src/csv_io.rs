//! CSV tables to and from [`Row`]s.

use std::path::Path;

use ulasan_sentiment::Row;

use crate::error::ScraperError;

/// Parse a CSV document whose first record is the header.
///
/// Blank lines are skipped. Field-count mismatches are accepted, not
/// reported: a record shorter than the header simply lacks the trailing
/// columns, and cells beyond the header are dropped. Scraper output with a
/// ragged last line still loads. Every cell is read as text.
///
/// # Errors
///
/// Returns [`ScraperError::Csv`] when the document is not valid CSV (for
/// example, invalid UTF-8 or an unterminated quote).
pub fn read_rows(bytes: &[u8]) -> Result<Vec<Row>, ScraperError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        rows.push(Row::from_pairs(headers.iter().zip(record.iter())));
    }

    Ok(rows)
}

/// Serialize rows as CSV.
///
/// The header is the union of every row's columns in first-seen order; cells
/// a row lacks are written empty. An empty slice yields an empty document.
///
/// # Errors
///
/// Returns [`ScraperError::Csv`] if a record cannot be written.
pub fn write_rows(rows: &[Row]) -> Result<Vec<u8>, ScraperError> {
    let mut headers: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(&key) {
                headers.push(key);
            }
        }
    }

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(headers.iter().map(|key| row.text(key)))?;
    }

    writer
        .into_inner()
        .map_err(|e| ScraperError::io("<csv buffer>", e.into_error()))
}

/// Read and parse a CSV file.
///
/// # Errors
///
/// Returns [`ScraperError::Io`] if the file cannot be read, or
/// [`ScraperError::Csv`] if it does not parse.
pub async fn read_rows_from_path(path: &Path) -> Result<Vec<Row>, ScraperError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ScraperError::io(path, e))?;
    read_rows(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_keyed_rows() {
        let rows = read_rows(b"id,full_text\n1,bagus sekali\n2,jelek\n").expect("parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("id"), "1");
        assert_eq!(rows[0].text("full_text"), "bagus sekali");
        assert_eq!(rows[1].text("full_text"), "jelek");
    }

    #[test]
    fn skips_blank_lines() {
        let rows = read_rows(b"id,full_text\n\n1,bagus\n\n\n2,jelek\n").expect("parse");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn short_record_omits_trailing_columns() {
        let rows = read_rows(b"id,full_text,lang\n1,bagus\n").expect("parse");
        assert_eq!(rows[0].len(), 2);
        assert!(rows[0].get("lang").is_none());
        assert_eq!(rows[0].text("lang"), "");
    }

    #[test]
    fn long_record_drops_cells_beyond_header() {
        let rows = read_rows(b"id,full_text\n1,bagus,extra,more\n2,jelek\n").expect("parse");
        assert_eq!(rows.len(), 2);
        let keys: Vec<&str> = rows[0].keys().collect();
        assert_eq!(keys, vec!["id", "full_text"]);
        assert_eq!(rows[0].text("full_text"), "bagus");
    }

    #[test]
    fn quoted_cells_keep_commas_and_newlines() {
        let rows = read_rows(b"id,full_text\n1,\"bagus, mantap\nsekali\"\n").expect("parse");
        assert_eq!(rows[0].text("full_text"), "bagus, mantap\nsekali");
    }

    #[test]
    fn header_only_document_has_no_rows() {
        assert!(read_rows(b"id,full_text\n").expect("parse").is_empty());
    }

    #[test]
    fn empty_document_has_no_rows() {
        assert!(read_rows(b"").expect("parse").is_empty());
    }

    #[test]
    fn invalid_utf8_is_a_csv_error() {
        let err = read_rows(b"id,full_text\n1,\xff\xfe\n").expect_err("invalid utf-8");
        assert!(matches!(err, ScraperError::Csv(_)), "got: {err:?}");
    }

    #[test]
    fn writes_union_of_columns_in_first_seen_order() {
        let rows = vec![
            Row::from_pairs([("id", "1"), ("full_text", "bagus")]),
            Row::from_pairs([("id", "2"), ("lang", "in")]).with_field("score", 3_i64),
        ];
        let out = String::from_utf8(write_rows(&rows).expect("write")).expect("utf-8");
        assert_eq!(out, "id,full_text,lang,score\n1,bagus,,\n2,,in,3\n");
    }

    #[test]
    fn writes_quotes_where_needed() {
        let rows = vec![Row::from_pairs([("full_text", "bagus, \"mantap\"")])];
        let out = String::from_utf8(write_rows(&rows).expect("write")).expect("utf-8");
        assert_eq!(out, "full_text\n\"bagus, \"\"mantap\"\"\"\n");
    }

    #[test]
    fn empty_table_writes_empty_document() {
        assert!(write_rows(&[]).expect("write").is_empty());
    }

    #[test]
    fn written_table_reads_back() {
        let rows = vec![
            Row::from_pairs([("id", "1"), ("full_text", "a,b")]),
            Row::from_pairs([("id", "2"), ("full_text", "c")]),
        ];
        let bytes = write_rows(&rows).expect("write");
        assert_eq!(read_rows(&bytes).expect("read"), rows);
    }
}

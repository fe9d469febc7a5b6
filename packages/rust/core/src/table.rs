//! In-memory CSV table, company-name resolution, and output projection.

use std::io::Write;

use csv::{ReaderBuilder, Writer};

use contactscout_shared::{COMPANY_HEADER_CANDIDATES, ContactScoutError, EMAIL_COLUMN, Result};

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One data row, positional against [`Table::headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub values: Vec<String>,
}

/// A parsed CSV file: header row plus data rows in file order.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// Parse decoded CSV text. The first line is the header.
    ///
    /// Rows may be shorter or longer than the header; values are never trimmed.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ContactScoutError::schema(format!("failed to read CSV headers: {e}")))?
            .iter()
            .map(String::from)
            .collect();

        // Blank column names are allowed; only a missing header line is fatal.
        if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
            return Err(ContactScoutError::schema(
                "no header row found; is the file empty or not a valid CSV?",
            ));
        }

        let records = reader
            .records()
            .enumerate()
            .map(|(i, result)| {
                result
                    .map(|record| Record {
                        values: record.iter().map(String::from).collect(),
                    })
                    .map_err(|e| ContactScoutError::Csv(format!("row {}: {e}", i + 1)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { headers, records })
    }

    /// Position of the column named exactly `name`. The last one wins on duplicates.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().rposition(|h| h == name)
    }

    /// Value of column `name` in `record`; empty when the column or the field is missing.
    pub fn value<'a>(&self, record: &'a Record, name: &str) -> &'a str {
        self.column_index(name)
            .and_then(|idx| record.values.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// First non-blank company name among [`COMPANY_HEADER_CANDIDATES`], trimmed.
    pub fn resolve_company(&self, record: &Record) -> Option<String> {
        COMPANY_HEADER_CANDIDATES
            .iter()
            .map(|header| self.value(record, header).trim())
            .find(|name| !name.is_empty())
            .map(String::from)
    }
}

// ---------------------------------------------------------------------------
// Output projection
// ---------------------------------------------------------------------------

/// Output column layout: the input headers plus `EMAIL` when it is missing.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    headers: Vec<String>,
    input_width: usize,
    email_index: usize,
}

impl OutputLayout {
    pub fn new(input_headers: &[String]) -> Self {
        let mut headers = input_headers.to_vec();
        let email_index = match headers.iter().rposition(|h| h == EMAIL_COLUMN) {
            Some(idx) => idx,
            None => {
                headers.push(EMAIL_COLUMN.to_string());
                headers.len() - 1
            }
        };

        Self {
            headers,
            input_width: input_headers.len(),
            email_index,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Whether `EMAIL` was added rather than already present.
    pub fn email_appended(&self) -> bool {
        self.email_index >= self.input_width
    }

    /// Build an output row: original values padded to the header width, email in place.
    pub fn project(&self, record: &Record, email: &str) -> Vec<String> {
        let mut row: Vec<String> = (0..self.input_width)
            .map(|i| record.values.get(i).cloned().unwrap_or_default())
            .collect();

        if self.email_appended() {
            row.push(email.to_string());
        } else {
            row[self.email_index] = email.to_string();
        }
        row
    }
}

/// Writes projected rows through a `csv::Writer`.
pub struct RowSink<W: Write> {
    writer: Writer<W>,
    written: usize,
}

impl<W: Write> RowSink<W> {
    /// Wrap `inner` and write the header row.
    pub fn new(inner: W, layout: &OutputLayout) -> Result<Self> {
        let mut writer = Writer::from_writer(inner);
        writer
            .write_record(layout.headers())
            .map_err(|e| ContactScoutError::Csv(format!("failed to write header: {e}")))?;
        Ok(Self { writer, written: 0 })
    }

    pub fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.writer
            .write_record(row)
            .map_err(|e| ContactScoutError::Csv(format!("failed to write row: {e}")))?;
        self.written += 1;
        Ok(())
    }

    /// Data rows written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered rows and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| ContactScoutError::Csv(format!("failed to flush output: {e}")))?;
        self.writer
            .into_inner()
            .map_err(|e| {
                ContactScoutError::Csv(format!("failed to finalize output: {}", e.error()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[&str]) -> Record {
        Record {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn parse_keeps_header_whitespace() {
        let table = Table::parse("Company ,City\nAcme ,Springfield\n").unwrap();
        assert_eq!(table.headers, vec!["Company ", "City"]);
        assert_eq!(table.records[0].values, vec!["Acme ", "Springfield"]);
    }

    #[test]
    fn parse_quoted_fields() {
        let table = Table::parse("Company,Codes\nTestCorp,\"1,2\"\n").unwrap();
        assert_eq!(table.records[0].values[1], "1,2");
    }

    #[test]
    fn parse_empty_content_is_schema_error() {
        let err = Table::parse("").unwrap_err();
        assert!(matches!(err, ContactScoutError::Schema { .. }));
    }

    #[test]
    fn parse_accepts_blank_header_names() {
        let table = Table::parse(" , \nAcme,x\n").unwrap();
        assert_eq!(table.headers, vec![" ", " "]);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.resolve_company(&table.records[0]), None);
    }

    #[test]
    fn duplicate_header_last_column_wins() {
        let table = Table::parse("Company,Company\n,Acme\n").unwrap();
        assert_eq!(table.column_index("Company"), Some(1));
        assert_eq!(table.resolve_company(&table.records[0]).as_deref(), Some("Acme"));
    }

    #[test]
    fn parse_header_only() {
        let table = Table::parse("Company,City\n").unwrap();
        assert!(table.records.is_empty());
    }

    #[test]
    fn company_primary_header_wins() {
        let table = Table::parse("Company ,Company,Organization\nA,B,C\n").unwrap();
        assert_eq!(table.resolve_company(&table.records[0]).as_deref(), Some("A"));
    }

    #[test]
    fn company_falls_back_in_order() {
        let table =
            Table::parse("Company ,Company Name,Organization\n  ,Globex,Initech\n").unwrap();
        assert_eq!(
            table.resolve_company(&table.records[0]).as_deref(),
            Some("Globex")
        );
    }

    #[test]
    fn company_from_last_candidate() {
        let table = Table::parse("Organization,Country\n Initech ,US\n").unwrap();
        assert_eq!(
            table.resolve_company(&table.records[0]).as_deref(),
            Some("Initech")
        );
    }

    #[test]
    fn company_unresolved() {
        let table = Table::parse("Company,Name\n,Bob\n").unwrap();
        assert_eq!(table.resolve_company(&table.records[0]), None);

        let table = Table::parse("Vendor\nAcme\n").unwrap();
        assert_eq!(table.resolve_company(&table.records[0]), None);
    }

    #[test]
    fn value_of_short_row_is_empty() {
        let table = Table::parse("Company,City,Zip\nAcme\n").unwrap();
        assert_eq!(table.value(&table.records[0], "Zip"), "");
    }

    #[test]
    fn layout_appends_email() {
        let layout = OutputLayout::new(&["Company".into(), "City".into()]);
        assert_eq!(layout.headers(), ["Company", "City", "EMAIL"]);
        assert!(layout.email_appended());
        assert_eq!(
            layout.project(&record(&["Acme"]), "a@acme.com"),
            vec!["Acme", "", "a@acme.com"]
        );
    }

    #[test]
    fn layout_reuses_existing_email_column() {
        let layout = OutputLayout::new(&["EMAIL".into(), "Company".into()]);
        assert_eq!(layout.headers(), ["EMAIL", "Company"]);
        assert!(!layout.email_appended());
        assert_eq!(
            layout.project(&record(&["old@x.com", "Acme"]), "new@acme.com"),
            vec!["new@acme.com", "Acme"]
        );
    }

    #[test]
    fn layout_drops_extra_fields() {
        let layout = OutputLayout::new(&["Company".into()]);
        assert_eq!(
            layout.project(&record(&["Acme", "stray"]), ""),
            vec!["Acme", ""]
        );
    }

    #[test]
    fn sink_writes_header_and_rows() {
        let layout = OutputLayout::new(&["Company".into()]);
        let mut sink = RowSink::new(Vec::new(), &layout).unwrap();
        sink.write_row(&layout.project(&record(&["Acme, Inc."]), "")).unwrap();
        assert_eq!(sink.written(), 1);
        let bytes = sink.finish().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Company,EMAIL\n\"Acme, Inc.\",\n"
        );
    }
}

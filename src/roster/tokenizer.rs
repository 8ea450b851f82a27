use super::error::IngestError;

/// One physical line split into cleaned fields.
pub type RawRow = Vec<String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

/// Uploads are read whole; bad UTF-8 degrades to U+FFFD rather than failing.
pub fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Decided once from the header line. Later lines are never re-inspected.
pub fn detect_delimiter(text: &str) -> Delimiter {
    let first = text.split('\n').next().unwrap_or("");
    if first.contains('\t') {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}

/// Splits text into rows. The first row is the header.
///
/// Trailing blank lines are discarded. Interior blank lines are kept so row
/// numbers keep pointing at the source line; they come back as a single empty
/// field and fall out later with the other nameless rows.
pub fn tokenize(text: &str) -> Result<Vec<RawRow>, IngestError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
        lines.pop();
    }
    if lines.len() < 2 {
        return Err(IngestError::NoDataRows);
    }

    let delimiter = detect_delimiter(text);
    tracing::debug!(?delimiter, lines = lines.len(), "tokenizing roster");
    Ok(lines
        .into_iter()
        .map(|line| parse_line(line, delimiter))
        .collect())
}

pub fn parse_line(line: &str, delimiter: Delimiter) -> RawRow {
    let delim = delimiter.as_char();
    let mut out: RawRow = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '"' {
            if in_quotes && i + 1 < chars.len() && chars[i + 1] == '"' {
                buf.push('"');
                i += 2;
                continue;
            }
            in_quotes = !in_quotes;
            i += 1;
            continue;
        }
        if ch == delim && !in_quotes {
            out.push(clean_field(&buf));
            buf.clear();
            i += 1;
            continue;
        }
        buf.push(ch);
        i += 1;
    }
    out.push(clean_field(&buf));
    out
}

// Hand-edited files leave stray quotes and apostrophes around values.
fn clean_field(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_in_header_selects_tab_even_with_commas() {
        let text = "First Name\tLast Name\n\"Smith, John\"\tDoe\n";
        assert_eq!(detect_delimiter(text), Delimiter::Tab);
        let rows = tokenize(text).expect("tokenize");
        assert_eq!(rows[1], vec!["Smith, John".to_string(), "Doe".to_string()]);
    }

    #[test]
    fn header_without_tab_selects_comma() {
        assert_eq!(detect_delimiter("a,b\nc\td\n"), Delimiter::Comma);
    }

    #[test]
    fn doubled_quotes_decode_to_one() {
        let row = parse_line(r#"1,"He said ""hi"" to me",x"#, Delimiter::Comma);
        assert_eq!(row[1], r#"He said "hi" to me"#);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn quoted_delimiter_stays_in_field() {
        let row = parse_line(r#""Smith, John",Grade 1"#, Delimiter::Comma);
        assert_eq!(row, vec!["Smith, John".to_string(), "Grade 1".to_string()]);
    }

    #[test]
    fn stray_quotes_and_apostrophes_are_stripped() {
        let row = parse_line("  'Juan' , Dela Cruz' ,  ", Delimiter::Comma);
        assert_eq!(
            row,
            vec!["Juan".to_string(), "Dela Cruz".to_string(), String::new()]
        );
    }

    #[test]
    fn row_count_matches_data_lines() {
        let text = "First Name,Last Name\nA,B\nC,D\nE,F\n\n\n";
        let rows = tokenize(text).expect("tokenize");
        assert_eq!(rows.len() - 1, 3);
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let rows = tokenize("First Name,Last Name\r\nAna,Reyes\r\n").expect("tokenize");
        assert_eq!(rows[0][1], "Last Name");
        assert_eq!(rows[1], vec!["Ana".to_string(), "Reyes".to_string()]);
    }

    #[test]
    fn header_only_is_rejected() {
        assert_eq!(tokenize("First Name,Last Name\n"), Err(IngestError::NoDataRows));
        assert_eq!(tokenize(""), Err(IngestError::NoDataRows));
        assert_eq!(tokenize("\n\n  \n"), Err(IngestError::NoDataRows));
    }

    #[test]
    fn bom_is_stripped_from_header() {
        let rows = tokenize("\u{feff}First Name,Last Name\nA,B").expect("tokenize");
        assert_eq!(rows[0][0], "First Name");
    }

    #[test]
    fn unbalanced_quote_degrades_without_error() {
        let row = parse_line(r#""open,still open"#, Delimiter::Comma);
        assert_eq!(row, vec!["open,still open".to_string()]);
    }

    #[test]
    fn interior_blank_line_keeps_its_position() {
        let rows = tokenize("First Name\nA\n\nB\n").expect("tokenize");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2], vec![String::new()]);
    }
}

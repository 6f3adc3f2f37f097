use std::io::{self, BufRead, Write};

/// Print `question`, then read one line. `None` means end of input.
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<Option<String>> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    Ok(ask(input, output, question)?.is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn ask_trims_and_reports_eof() {
        let mut out = Vec::new();
        let mut input = Cursor::new("  hello \n");
        assert_eq!(ask(&mut input, &mut out, "? ").unwrap().as_deref(), Some("hello"));
        assert_eq!(ask(&mut input, &mut out, "? ").unwrap(), None);
        assert!(String::from_utf8(out).unwrap().starts_with("? ? "));
    }

    #[test]
    fn confirm_accepts_only_y() {
        let mut out = Vec::new();
        assert!(confirm(&mut Cursor::new("Y\n"), &mut out, "").unwrap());
        assert!(!confirm(&mut Cursor::new("yes\n"), &mut out, "").unwrap());
        assert!(!confirm(&mut Cursor::new(""), &mut out, "").unwrap());
    }
}

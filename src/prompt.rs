//! Interactive prompts: metadata collection and the chapter reorder dialogue.
//!
//! Both work over any `BufRead`/`Write` pair so they can be driven from
//! tests as well as from the terminal. End of input means the user gave up
//! and is reported as [`BookError::Interrupted`].

use std::io::{BufRead, Write};

use crate::book::{Book, Metadata};
use crate::error::{BookError, Result};

const YES: [&str; 4] = ["yes", "y", "sim", "s"];
const NO: [&str; 3] = ["no", "n", "não"];

/// Print `question` and read one line, without its line ending.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(BookError::Interrupted);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask for each metadata field in turn. Empty answers are kept as empty.
pub fn collect_metadata<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Metadata> {
    writeln!(output, "\n\n    Now let's add some information about your book!\n\n")?;
    let mut meta = Metadata::default();
    for field in Metadata::FIELDS {
        let answer = ask(input, output, &format!("Add {field}: "))?;
        if let Some(slot) = meta.field_mut(field) {
            *slot = answer;
        }
    }
    Ok(meta)
}

/// Offer to reorder chapters until the user declines or a swap list
/// succeeds. Returns whether the order changed.
pub fn reorder_dialogue<R: BufRead, W: Write>(
    book: &mut Book,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    loop {
        let answer = ask(input, output, "\nWould you like to change the order of chapters(Y/N):")?
            .trim()
            .to_lowercase();

        if YES.contains(&answer.as_str()) {
            let swaps = ask(
                input,
                output,
                "Which chapters, described as pairs of positive integer numbers separated by spaces\n    \
                 (ex: 1 5 3 7 10 9 => this will swap chapter 1 with 5, 3 with 7, and so on), would you like to swap? ",
            )?;
            match book.apply_swaps(&swaps) {
                Ok(count) => {
                    log::info!("Applied {count} chapter swaps");
                    writeln!(output, "\nSuccess! You changed the chapters order\n")?;
                    return Ok(true);
                }
                Err(e) => writeln!(output, "Failed to change the order. ({e})")?,
            }
        } else if NO.contains(&answer.as_str()) {
            return Ok(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::book::Chapter;

    fn three_chapters() -> Book {
        let chapters = (0..3).map(|i| Chapter::new(i.to_string(), "")).collect();
        Book::new(chapters, Metadata::default())
    }

    fn titles(book: &Book) -> Vec<&str> {
        book.chapters.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn metadata_fields_in_order() {
        let mut input = Cursor::new("Title\nAuthor\n2024\nme@example.com\nCC-BY\n\nBio here\n");
        let mut output = Vec::new();
        let meta = collect_metadata(&mut input, &mut output).unwrap();
        assert_eq!(meta.title, "Title");
        assert_eq!(meta.author, "Author");
        assert_eq!(meta.contact, "me@example.com");
        assert_eq!(meta.quote, "");
        assert_eq!(meta.bio, "Bio here");
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Add license: "));
    }

    #[test]
    fn metadata_eof_is_interrupt() {
        let mut input = Cursor::new("Only a title\n");
        let err = collect_metadata(&mut input, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BookError::Interrupted));
    }

    #[test]
    fn declining_keeps_order() {
        let mut book = three_chapters();
        let mut input = Cursor::new("N\n");
        assert!(!reorder_dialogue(&mut book, &mut input, &mut Vec::new()).unwrap());
        assert_eq!(titles(&book), ["0", "1", "2"]);
    }

    #[test]
    fn failed_swap_asks_again() {
        let mut book = three_chapters();
        let mut input = Cursor::new("maybe\ny\n2 18\nyes\n1 3\n");
        let mut output = Vec::new();
        assert!(reorder_dialogue(&mut book, &mut input, &mut output).unwrap());
        assert_eq!(titles(&book), ["2", "1", "0"]);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Failed to change the order."));
    }

    #[test]
    fn eof_during_dialogue_is_interrupt() {
        let mut book = three_chapters();
        let mut input = Cursor::new("y\n");
        let err = reorder_dialogue(&mut book, &mut input, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BookError::Interrupted));
    }
}

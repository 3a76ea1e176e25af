#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::constant::MINIMUM_USAGE_WIDTH;

#[derive(Debug)]
pub(crate) struct LeftWidth(pub(crate) usize);

impl LeftWidth {
    #[cfg(test)]
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // left must be at least 1
        if width >= 1 {
            Ok(LeftWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct UsageWidth(pub(crate) usize);

impl UsageWidth {
    #[cfg(test)]
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // usage must be at least 2 (so we can hyphenate)
        if width >= 2 {
            Ok(UsageWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct TotalWidth(pub usize);

const PADDING: &str = "  ";

/// Renders `left  usage` rows, wrapping the usage column and keeping it aligned.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    left: LeftWidth,
    usage: UsageWidth,
}

impl ColumnRenderer {
    /// Fit the usage column into whatever the terminal leaves after the left column.
    pub(crate) fn guided(left: LeftWidth, total_width: TotalWidth) -> Self {
        let non_usage = left.0 + PADDING.len();

        if non_usage + MINIMUM_USAGE_WIDTH < total_width.0 {
            let usage = total_width.0 - non_usage;
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Left column {non_usage} fits within the total {total_width:?}.  Selecting usage: {usage}.");
            }

            Self::new(left, UsageWidth(usage))
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Left column {non_usage} does not fit within the total {total_width:?}.  Selecting usage: {MINIMUM_USAGE_WIDTH}.");
            }

            Self::new(left, UsageWidth(MINIMUM_USAGE_WIDTH))
        }
    }

    pub(crate) fn new(left: LeftWidth, usage: UsageWidth) -> Self {
        Self { left, usage }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, usage: &str) -> Vec<String> {
        let left_width = self.left.0;
        let lines = chunk(usage, self.usage.0);
        let mut out = Vec::default();

        // An overlong left column pushes the usage onto its own line.
        let overflow = left.chars().count() > left_width;
        if overflow {
            out.push(format!("{:indent$}{left}", ""));
        }

        for (i, line) in lines.iter().enumerate() {
            if i == 0 && !overflow {
                out.push(format!("{:indent$}{:left_width$}{PADDING}{line}", "", left));
            } else {
                out.push(format!("{:indent$}{:left_width$}{PADDING}{line}", "", ""));
            }
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{left}", ""));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if !word.is_empty() {
            if current.is_empty() {
                hyphenate(width, &mut lines, &mut current, word);
            } else if current.chars().count() + word.chars().count() + 1 <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = String::default();
                hyphenate(width, &mut lines, &mut current, word);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// Splits on characters, never inside a code point.
fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let increment = width - 1;
    let characters: Vec<char> = word.chars().collect();
    let mut left = 0;

    while left + increment + 1 < characters.len() {
        let part: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{part}-"));
        left += increment;
    }

    current.extend(characters[left..].iter());
}

/// Where the flag set sends user facing text (the rendered help).
pub trait UserInterface: Send + Sync {
    /// Display a message to the user.
    fn print(&self, message: String);
}

/// Prints to standard out.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }
}

#[cfg(any(test, feature = "unit_test"))]
pub(crate) mod util {
    use crate::parser::UserInterface;
    use std::sync::{Arc, Mutex};

    /// Captures printed messages, for inspection in tests.
    ///
    /// Clones share the same buffer, so one clone may be handed to a flag set while another is inspected.
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryInterface {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            // Allows for print() to be called many times, concatenating the messages.
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(message);
            }
        }
    }

    impl InMemoryInterface {
        /// Every message printed so far, joined by newlines.
        /// `None` when nothing has been printed.
        pub fn consume(&self) -> Option<String> {
            let messages = self.messages.lock().ok()?;

            if messages.is_empty() {
                None
            } else {
                Some(messages.join("\n"))
            }
        }

        /// The printed output, which must exist.
        pub fn consume_message(&self) -> String {
            self.consume().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn column_renderer_simple() {
        let cr = ColumnRenderer::new(LeftWidth::new(6).unwrap(), UsageWidth::new(10).unwrap());

        assert_eq!(cr.render(0, "--abc", "x"), vec!["--abc   x"]);
        assert_eq!(cr.render(2, "--abc", "x"), vec!["  --abc   x"]);
        assert_eq!(
            cr.render(0, "--abc", "one two three"),
            vec!["--abc   one two", "        three"]
        );
    }

    #[test]
    fn column_renderer_empty_usage() {
        let cr = ColumnRenderer::new(LeftWidth::new(6).unwrap(), UsageWidth::new(10).unwrap());

        assert_eq!(cr.render(2, "--abc", ""), vec!["  --abc"]);
    }

    #[test]
    fn column_renderer_left_overflow() {
        let cr = ColumnRenderer::new(LeftWidth::new(3).unwrap(), UsageWidth::new(10).unwrap());

        assert_eq!(
            cr.render(0, "--abcdef", "usage"),
            vec!["--abcdef", "     usage"]
        );
    }

    #[rstest]
    #[case(40, 40 - 10 - 2)]
    #[case(29, 17)]
    #[case(5, 17)]
    fn column_renderer_guided(#[case] total: usize, #[case] expected: usize) {
        let cr = ColumnRenderer::guided(LeftWidth::new(10).unwrap(), TotalWidth(total));

        assert_eq!(cr.usage.0, expected);
    }

    #[test]
    fn widths_invalid() {
        assert!(LeftWidth::new(0).is_err());
        assert!(UsageWidth::new(1).is_err());
    }

    #[rstest]
    #[case("", 5, vec![])]
    #[case("  ", 5, vec![])]
    #[case("abc", 5, vec!["abc"])]
    #[case("abc de", 6, vec!["abc de"])]
    #[case("abc de", 5, vec!["abc", "de"])]
    #[case("abcdefgh", 4, vec!["abc-", "def-", "gh"])]
    #[case("abcdef", 4, vec!["abc-", "def"])]
    #[case("ab abcdef", 4, vec!["ab", "abc-", "def"])]
    #[case("ééééé", 3, vec!["éé-", "ééé"])]
    fn chunk_paragraph(#[case] paragraph: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(chunk(paragraph, width), expected);
    }

    #[test]
    fn in_memory_interface() {
        let interface = util::InMemoryInterface::default();
        assert_eq!(interface.consume(), None);

        let shared = interface.clone();
        shared.print("abc".to_string());
        shared.print("def".to_string());

        assert_eq!(interface.consume_message(), "abc\ndef");
    }
}

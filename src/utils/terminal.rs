//! Output sanitization for values printed by the CLI.
//!
//! Cell values come straight from user data files. Before a value is echoed to the terminal,
//! ANSI CSI sequences are removed and control characters are dropped, so a crafted cell
//! cannot move the cursor or recolor the output. Line breaks become spaces because every
//! popup label is printed on a single line.

/// Make a cell label safe to print on one terminal line
///
/// # Examples
///
/// ```
/// use grid_filter::utils::terminal::sanitize_label;
///
/// assert_eq!(sanitize_label("\x1b[31mred\x1b[0m\nrow"), "red row");
/// ```
pub fn sanitize_label(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI runs until its final letter
            while let Some(next_ch) = chars.next() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        match ch {
            '\n' | '\r' | '\t' => result.push(' '),
            c if c.is_control() => {}
            c => result.push(c),
        }
    }

    result
}

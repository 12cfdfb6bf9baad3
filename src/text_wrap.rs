//! Greedy character line wrapping.
//!
//! Walks the text one character at a time, accumulating measured advances.
//! As soon as the running width exceeds `max_width - init_x`, everything
//! before the current character is emitted as a line, the pen moves down by
//! `line_height`, and the running width restarts at zero with the
//! overflowing character opening the next line. The final character always
//! flushes whatever remains.
//!
//! Not word-aware: lines break mid-word. Two details follow the canvas text
//! routine this reproduces and are kept on purpose for pixel compatibility:
//! the overflowing character's own width is not carried into the next
//! line's budget, and a character that overflows an empty line produces an
//! empty flush (the pen still moves down).

/// One placed line of wrapped text.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine<'a> {
    pub text: &'a str,
    pub x: f64,
    pub y: f64,
}

/// Wrap `text` greedily; `measure` returns the advance of one character.
///
/// Empty flushes are not returned, so concatenating every `text` yields the
/// input exactly, and `y` of later lines still accounts for them.
pub fn wrap_text<'a, F>(
    text: &'a str,
    max_width: f64,
    init_x: f64,
    init_y: f64,
    line_height: f64,
    mut measure: F,
) -> Vec<WrappedLine<'a>>
where
    F: FnMut(char) -> f64,
{
    let mut lines = Vec::new();
    let budget = max_width - init_x;
    let mut y = init_y;
    let mut line_width = 0.0;
    let mut last = 0;

    let flush = |from: usize, to: usize, y: f64, lines: &mut Vec<WrappedLine<'a>>| {
        if to > from {
            lines.push(WrappedLine {
                text: &text[from..to],
                x: init_x,
                y,
            });
        }
    };

    let mut chars = text.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        line_width += measure(ch);
        if line_width > budget {
            flush(last, i, y, &mut lines);
            y += line_height;
            line_width = 0.0;
            last = i;
        }
        if chars.peek().is_none() {
            flush(last, text.len(), y, &mut lines);
        }
    }
    lines
}

// ============================================================================
// Tests
// ============================================================================

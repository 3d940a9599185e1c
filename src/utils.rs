/// Converts a 1-based line and column, as reported by `serde_json`, into a byte offset
/// into the source text. Positions past the end of a line or of the text clamp to the
/// nearest valid offset, so the result is always usable as a diagnostic span start.
pub fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;
    let mut line_start = 0;
    if line > 1 {
        for (i, c) in source.char_indices() {
            if c == '\n' {
                current_line += 1;
                line_start = i + 1;
                if current_line == line {
                    break;
                }
            }
        }
        if current_line < line {
            return source.len();
        }
    }

    let line_len = source[line_start..]
        .find('\n')
        .unwrap_or(source.len() - line_start);
    let mut offset = line_start + column.saturating_sub(1).min(line_len);
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

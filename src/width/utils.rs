//! Display width helpers.
//!
//! Labels are measured in terminal columns rather than bytes so register and
//! section names with wide glyphs or ANSI styling still line up.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Append spaces to `line` until it reaches `width` display columns.
pub fn pad_to_width(line: &mut String, width: usize) {
    let display = display_width(line);
    if display < width {
        line.extend(std::iter::repeat_n(' ', width - display));
    }
}

//! Line-oriented access to the input stream.

use std::ops::Range;

/// Iterates over the lines of `src` together with the byte offset at which
/// each line starts. Line terminators are stripped.
pub fn lines(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.split_inclusive('\n').scan(0, |offset, raw| {
        let start = *offset;
        *offset += raw.len();

        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);

        Some((start, line))
    })
}

/// Lines holding a `name=value` setting rather than table data.
pub fn is_setting(line: &str) -> bool {
    line.contains('=')
}

/// Computes the span of `part`, which must be a subslice of `line`, given the
/// offset at which `line` starts.
pub fn subspan(offset: usize, line: &str, part: &str) -> Range<usize> {
    let start = offset + (part.as_ptr() as usize - line.as_ptr() as usize);

    start..start + part.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        let src = "a=1\r\n0 1 2 3\n\nlast";
        let found: Vec<_> = lines(src).collect();

        assert_eq!(
            found,
            vec![(0, "a=1"), (5, "0 1 2 3"), (13, ""), (14, "last")]
        );
    }

    #[test]
    fn subspans() {
        let src = "xx\n 12 abc";
        let (offset, line) = lines(src).nth(1).unwrap();
        let token = line.split_whitespace().nth(1).unwrap();

        assert_eq!(&src[subspan(offset, line, token)], "abc");
    }
}

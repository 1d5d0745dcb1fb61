//! Minimal unified-diff inspection for patch fragments returned by the
//! GitHub files endpoint. Only the hunk headers matter here: an AI
//! suggestion is anchored at the first line the patch touches in the
//! new version of the file.

/// Extract the new-file start line from the first hunk header in a
/// patch fragment.
///
/// Hunk headers look like `@@ -10,5 +20,6 @@` (the count is omitted
/// when it is 1, e.g. `@@ -3 +4 @@`); the value wanted is the `+` side
/// start, 20 in the example. Returns `None` when the fragment contains
/// no parseable hunk header.
pub fn first_new_line(patch: &str) -> Option<u64> {
    patch
        .lines()
        .find(|line| line.starts_with("@@"))
        .and_then(parse_hunk_header)
}

fn parse_hunk_header(line: &str) -> Option<u64> {
    let header = line.trim().strip_prefix("@@")?.trim();
    let header = header.split("@@").next()?.trim();
    let new_part = header.split_whitespace().nth(1)?;
    let range = new_part.strip_prefix('+')?;
    let start = match range.split_once(',') {
        Some((start, _count)) => start,
        None => range,
    };
    start.parse::<u64>().ok()
}

//! Normalizer: a string-level post-processor applied once per resolved
//! prompt (`SPEC_FULL.md` §4.8). Idempotent by construction.

/// Trims each line, drops empty lines, collapses runs of commas/whitespace
/// into a single `", "` (or a single space, if the run has no comma), and
/// strips a trailing comma from the final non-empty line.
#[must_use]
pub fn normalize(s: &str) -> String {
    let mut lines: Vec<String> = s
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(collapse_runs)
        .collect();

    if let Some(last) = lines.last_mut() {
        while last.ends_with(',') {
            last.pop();
        }
        *last = last.trim_end().to_string();
    }

    lines.join("\n")
}

fn collapse_runs(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == ',' || c.is_whitespace() {
            let mut j = i;
            let mut has_comma = false;
            while j < chars.len() && (chars[j] == ',' || chars[j].is_whitespace()) {
                has_comma |= chars[j] == ',';
                j += 1;
            }
            if has_comma {
                out.push(',');
                if j < chars.len() {
                    out.push(' ');
                }
            } else if j < chars.len() {
                out.push(' ');
            }
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_comma_runs() {
        assert_eq!(normalize("masterpiece,,  detailed"), "masterpiece, detailed");
    }

    #[test]
    fn test_drops_empty_lines() {
        assert_eq!(normalize("line one\n\n\nline two"), "line one\nline two");
    }

    #[test]
    fn test_strips_trailing_comma_on_final_line() {
        assert_eq!(normalize("masterpiece, detailed,"), "masterpiece, detailed");
    }

    #[test]
    fn test_trims_each_line() {
        assert_eq!(normalize("  masterpiece  \n  detailed  "), "masterpiece\ndetailed");
    }

    #[test]
    fn test_idempotent() {
        let input = "  masterpiece,,  detailed,\n\n  more,  , stuff,  ";
        let once = normalize(input);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }
}

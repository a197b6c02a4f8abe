// Minimal `.hg/hgrc` editing: set or remove one key in the `[hooks]`
// section, leaving every other line untouched.
//
// Understands section headers, `key = value` lines, indented continuation
// lines and `#`/`;` comments. Anything else is passed through verbatim.

use std::ops::Range;

const HOOKS_SECTION: &str = "hooks";

/// hgrc key for a commit hook named `name`: `commit.<name>`.
pub fn commit_hook_key(name: &str) -> String {
    format!("commit.{name}")
}

/// Set `key = value` in `[hooks]`. An existing definition is replaced in
/// place (duplicates are dropped); otherwise the entry goes at the end of
/// the last `[hooks]` section, or a new section is appended.
pub fn set_hook(content: &str, key: &str, value: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let scan = scan(&lines, key);
    let entry = format!("{key} = {value}");
    let first = scan.entries.first().map(|range| range.start);

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 3);
    for (index, line) in lines.iter().enumerate() {
        if first == Some(index) {
            out.push(entry.clone());
        }
        if scan.entries.iter().any(|range| range.contains(&index)) {
            continue;
        }
        if first.is_none() && scan.insert_at == Some(index) {
            out.push(entry.clone());
        }
        out.push((*line).to_string());
    }

    if first.is_none() {
        match scan.insert_at {
            Some(index) if index == lines.len() => out.push(entry),
            Some(_) => {}
            None => {
                if out.last().is_some_and(|line| !line.trim().is_empty()) {
                    out.push(String::new());
                }
                out.push(format!("[{HOOKS_SECTION}]"));
                out.push(entry);
            }
        }
    }

    join_lines(out)
}

/// Remove every definition of `key` from `[hooks]`. Returns the new content
/// and whether anything was removed.
pub fn remove_hook(content: &str, key: &str) -> (String, bool) {
    let lines: Vec<&str> = content.lines().collect();
    let scan = scan(&lines, key);
    if scan.entries.is_empty() {
        return (content.to_string(), false);
    }

    let kept = lines
        .iter()
        .enumerate()
        .filter(|(index, _)| !scan.entries.iter().any(|range| range.contains(index)))
        .map(|(_, line)| (*line).to_string())
        .collect();
    (join_lines(kept), true)
}

/// Current value of `key` in `[hooks]`, continuation lines joined by `\n`.
pub fn get_hook(content: &str, key: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let range = scan(&lines, key).entries.pop()?;

    let mut parts = Vec::new();
    for (offset, line) in lines[range].iter().enumerate() {
        if offset == 0 {
            let (_, value) = line.split_once('=')?;
            parts.push(value.trim());
        } else {
            parts.push(line.trim());
        }
    }
    Some(parts.join("\n").trim().to_string())
}

struct Scan {
    /// Line ranges of each definition of the key, continuation lines included.
    entries: Vec<Range<usize>>,
    /// Line index just past the last meaningful line of the last `[hooks]` section.
    insert_at: Option<usize>,
}

fn scan(lines: &[&str], key: &str) -> Scan {
    let mut entries = Vec::new();
    let mut insert_at = None;
    let mut section: Option<&str> = None;
    let mut current: Option<Range<usize>> = None;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let in_hooks = section == Some(HOOKS_SECTION);

        if line.starts_with([' ', '\t']) && !trimmed.is_empty() {
            if let Some(range) = current.as_mut() {
                range.end = index + 1;
            }
            if in_hooks {
                insert_at = Some(index + 1);
            }
            continue;
        }

        if let Some(range) = current.take() {
            entries.push(range);
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            if let Some(end) = rest.find(']') {
                section = Some(rest[..end].trim());
                if section == Some(HOOKS_SECTION) {
                    insert_at = Some(index + 1);
                }
                continue;
            }
        }

        if !in_hooks || trimmed.is_empty() || trimmed.starts_with(['#', ';']) {
            continue;
        }

        insert_at = Some(index + 1);
        if let Some((name, _)) = trimmed.split_once('=') {
            if name.trim() == key {
                current = Some(index..index + 1);
            }
        }
    }

    if let Some(range) = current.take() {
        entries.push(range);
    }

    Scan { entries, insert_at }
}

fn join_lines(lines: Vec<String>) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut joined = lines.join("\n");
    joined.push('\n');
    joined
}

// ABOUTME: Line-based frontmatter codec for mirror files
// ABOUTME: Order-preserving key/value extraction and serialization

use indexmap::IndexMap;

/// Parses the frontmatter block at the start of `content`.
///
/// The block is opened by a first line that is exactly `---` and closed by
/// the next such line. Inside, each line splits on its first `:`; lines with
/// no colon, an empty key, or an empty value are dropped. Anything else
/// (no block, unterminated block) yields an empty map.
pub fn extract(content: &str) -> IndexMap<String, String> {
    let mut props = IndexMap::new();

    let mut lines = content.lines();
    if lines.next() != Some("---") {
        return props;
    }

    let mut block = Vec::new();
    let mut closed = false;
    for line in lines {
        if line == "---" {
            closed = true;
            break;
        }
        block.push(line);
    }
    if !closed {
        return props;
    }

    for line in block {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                props.insert(key.to_string(), value.to_string());
            }
        }
    }

    props
}

/// Renders a frontmatter block, one `key: value` line per entry in map order.
pub fn serialize(props: &IndexMap<String, String>) -> String {
    let mut out = String::from("---\n");
    for (key, value) in props {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push_str("---\n");
    out
}

/// Strips surrounding whitespace and double quotes from a stored value.
/// Frontmatter overrides are written quoted; comparisons read through this.
pub fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".to_string(), json!(true));
            response.insert("message".to_string(), json!(message));
            match data {
                Some(Value::Object(extra)) => response.extend(extra),
                Some(other) => {
                    response.insert("data".to_string(), other);
                }
                None => {}
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ collection_name: [] }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print a menu tree, one feature per line, indented by depth. Accepts
/// both the keyed map form and the listed form of a tree.
pub fn print_tree(entries: &Value) {
    for line in tree_lines(entries) {
        println!("{}", line);
    }
}

pub fn tree_lines(entries: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    collect_lines(entries, 0, &mut lines);
    lines
}

fn collect_lines(entries: &Value, depth: usize, lines: &mut Vec<String>) {
    let entries: Vec<&Value> = match entries {
        Value::Array(list) => list.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => return,
    };
    for entry in entries {
        let Some(feature_id) = entry.get("feature_id").and_then(Value::as_str) else {
            continue;
        };
        let name = entry.get("name").and_then(Value::as_str).unwrap_or("");
        let hidden = entry.get("visibility").and_then(Value::as_bool) == Some(false);

        let mut line = format!("{}{} [{}]", "  ".repeat(depth), feature_id, flags(entry));
        if !name.is_empty() {
            line.push_str(&format!(" {}", name));
        }
        if hidden {
            line.push_str(" (hidden)");
        }
        lines.push(line);

        if let Some(children) = entry.get("features") {
            collect_lines(children, depth + 1, lines);
        }
    }
}

fn flags(entry: &Value) -> String {
    let permissions = entry.get("permissions");
    [("read", 'r'), ("write", 'w'), ("delete", 'd')]
        .iter()
        .map(|(flag, letter)| {
            match permissions.and_then(|p| p.get(*flag)).and_then(Value::as_bool) {
                Some(true) => *letter,
                _ => '-',
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_keyed_trees() {
        let tree = json!({
            "reports": {
                "feature_id": "reports",
                "permissions": {"read": true, "write": true},
                "features": {"exports": {"feature_id": "exports"}}
            },
            "version": 3
        });

        assert_eq!(
            tree_lines(&tree),
            vec!["reports [rw-]".to_string(), "  exports [---]".to_string()]
        );
    }

    #[test]
    fn renders_nested_features() {
        let tree = json!([
            {
                "feature_id": "lm01",
                "name": "Lead Manager",
                "permissions": {"read": true, "write": false},
                "features": [
                    {"feature_id": "lm02", "visibility": false, "permissions": {"delete": true}}
                ]
            },
            {"name": "metadata without a feature id"}
        ]);

        assert_eq!(
            tree_lines(&tree),
            vec![
                "lm01 [r--] Lead Manager".to_string(),
                "  lm02 [--d] (hidden)".to_string(),
            ]
        );
    }
}

//! Record output

use crate::json::JsonCallback;
use anyhow::Result;
use atomic_diff_core::{AtomicDiffResult, ItemDiffRecord};
use serde_json::{json, Value};
use std::io::Write;

type JsonDiff<'a> = AtomicDiffResult<'a, Value, Vec<String>>;

/// One line per record, in `all_records` order
pub fn write_text<W: Write>(
    out: &mut W,
    result: &JsonDiff<'_>,
    callback: &JsonCallback,
) -> Result<()> {
    if result.is_empty() {
        writeln!(out, "no changes")?;
        return Ok(());
    }

    for record in result.all_records() {
        match record {
            ItemDiffRecord::Changed(change) => {
                let fields = change.payload.unwrap_or_default().join(", ");
                writeln!(
                    out,
                    "~ [{} -> {}] {} ({})",
                    change.old_position,
                    change.new_position,
                    callback.identity(change.new_item),
                    fields
                )?;
            }
            ItemDiffRecord::Removed(removed) => {
                writeln!(
                    out,
                    "- [{}] {}",
                    removed.old_position,
                    callback.identity(removed.item)
                )?;
            }
            ItemDiffRecord::Inserted(inserted) => {
                writeln!(
                    out,
                    "+ [{}] {}",
                    inserted.new_position,
                    callback.identity(inserted.item)
                )?;
            }
            ItemDiffRecord::PositionChanged(moved) => {
                writeln!(
                    out,
                    "> [{} -> {}] {}",
                    moved.old_position,
                    moved.new_position,
                    callback.identity(moved.item)
                )?;
            }
        }
    }
    Ok(())
}

/// Records grouped by kind
pub fn write_json<W: Write>(out: &mut W, result: &JsonDiff<'_>) -> Result<()> {
    let document = json!({
        "changes": result.changes(),
        "removals": result.removals(),
        "insertions": result.insertions(),
        "position_changes": result.position_changes(),
    });
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomic_diff_core::calculate_atomic_diff;

    fn render_text(old: &[Value], new: &[Value]) -> String {
        let callback = JsonCallback::new("/id");
        let result = calculate_atomic_diff(old, new, &callback);
        let mut out = Vec::new();
        write_text(&mut out, &result, &callback).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_output() {
        let old = vec![
            json!({"id": "a", "r": 1}),
            json!({"id": "b", "r": 2}),
            json!({"id": "c", "r": 3}),
        ];
        let new = vec![
            json!({"id": "c", "r": 3}),
            json!({"id": "a", "r": 5}),
            json!({"id": "d", "r": 4}),
        ];

        let text = render_text(&old, &new);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "~ [0 -> 1] \"a\" (r)",
                "- [1] \"b\"",
                "+ [2] \"d\"",
                "> [2 -> 0] \"c\"",
            ]
        );
    }

    #[test]
    fn test_text_output_without_changes() {
        let items = vec![json!({"id": 1})];
        assert_eq!(render_text(&items, &items), "no changes\n");
    }

    #[test]
    fn test_json_output_groups_records() {
        let callback = JsonCallback::new("/id");
        let old = vec![json!({"id": 1, "v": 0}), json!({"id": 2})];
        let new = vec![json!({"id": 1, "v": 1})];
        let result = calculate_atomic_diff(&old, &new, &callback);

        let mut out = Vec::new();
        write_json(&mut out, &result).unwrap();
        let document: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(
            document["changes"],
            json!([{
                "old_item": {"id": 1, "v": 0},
                "new_item": {"id": 1, "v": 1},
                "old_position": 0,
                "new_position": 0,
                "payload": ["v"]
            }])
        );
        assert_eq!(
            document["removals"],
            json!([{"item": {"id": 2}, "old_position": 1}])
        );
        assert_eq!(document["insertions"], json!([]));
        assert_eq!(document["position_changes"], json!([]));
    }
}

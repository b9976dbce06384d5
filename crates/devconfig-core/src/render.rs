// ── Aligned plain-text reports ──
//
// Layout:
//
//   -----------------------------------------
//   Field    SXR:MMS:01   SXR:MMS:02     Pmgr
//   -----------------------------------------
//   sn       SN1          SN2          SN1
//   -----------------------------------------
//
// Every column is as wide as its longest cell (header included) and at
// least `min_width`; columns are separated by `column_offset` spaces.

use crate::diff::DiffResult;
use crate::model::{FieldSchema, FieldValueMap, STORE_MARKER};

/// Layout knobs shared by diff and view reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_tooltip: bool,
    pub min_width: usize,
    pub column_offset: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_tooltip: false,
            min_width: 6,
            column_offset: 3,
        }
    }
}

struct Column {
    header: String,
    right_header: bool,
    cells: Vec<String>,
}

impl Column {
    fn left(header: &str, cells: Vec<String>) -> Self {
        Self {
            header: header.to_owned(),
            right_header: false,
            cells,
        }
    }

    fn width(&self, min_width: usize) -> usize {
        self.cells
            .iter()
            .map(|c| c.chars().count())
            .chain(std::iter::once(self.header.chars().count()))
            .max()
            .unwrap_or_default()
            .max(min_width)
    }
}

/// Render the diffing keys of `diff`, one value column per map.
///
/// Labels name the value columns in map order. Maps without a label get
/// the store marker, right-justified.
pub fn render_diff(
    diff: &DiffResult,
    schema: &FieldSchema,
    labels: &[String],
    options: &RenderOptions,
) -> String {
    let mut columns = key_columns(schema, diff.keys(), options);
    for (i, map) in diff.maps().iter().enumerate() {
        let (header, right_header) = match labels.get(i) {
            Some(label) => (label.clone(), false),
            None => (STORE_MARKER.to_owned(), true),
        };
        columns.push(Column {
            header,
            right_header,
            cells: values(map, diff.keys()),
        });
    }
    layout(&columns, diff.keys().len(), options)
}

/// Render `keys` of a single value map.
pub fn render_view(
    map: &FieldValueMap,
    schema: &FieldSchema,
    keys: &[String],
    options: &RenderOptions,
) -> String {
    let mut columns = key_columns(schema, keys, options);
    columns.push(Column::left(&map.source().to_string(), values(map, keys)));
    layout(&columns, keys.len(), options)
}

fn key_columns(schema: &FieldSchema, keys: &[String], options: &RenderOptions) -> Vec<Column> {
    let defs: Vec<_> = keys.iter().map(|k| schema.get(k)).collect();
    let mut columns = vec![Column::left(
        "Field",
        keys.iter()
            .zip(&defs)
            .map(|(k, def)| def.map_or(k.as_str(), |d| d.display_name()).to_owned())
            .collect(),
    )];
    if options.show_tooltip {
        columns.push(Column::left(
            "Tooltip",
            defs.iter()
                .map(|def| def.map(|d| d.tooltip.clone()).unwrap_or_default())
                .collect(),
        ));
    }
    columns
}

fn values(map: &FieldValueMap, keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|k| map.get(k).unwrap_or_default().to_owned())
        .collect()
}

fn layout(columns: &[Column], rows: usize, options: &RenderOptions) -> String {
    let widths: Vec<usize> = columns.iter().map(|c| c.width(options.min_width)).collect();
    let gap = " ".repeat(options.column_offset);
    let total = widths.iter().sum::<usize>() + options.column_offset * widths.len().saturating_sub(1);
    let rule = "-".repeat(total);

    let mut out = String::new();
    let mut line = |text: &str| {
        out.push_str(text.trim_end());
        out.push('\n');
    };

    line(&rule);
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| {
            if c.right_header {
                format!("{:>w$}", c.header)
            } else {
                format!("{:<w$}", c.header)
            }
        })
        .collect();
    line(&header.join(&gap));
    line(&rule);

    if rows == 0 {
        line("No differences");
    }
    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:<w$}", c.cells.get(row).map_or("", String::as_str)))
            .collect();
        line(&cells.join(&gap));
    }
    line(&rule);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::DiffOrder;
    use crate::diff::compute_diff;
    use crate::model::{FieldDefinition, FieldScope, SourceLabel};

    fn def(key: &str, alias: &str, tooltip: &str, scope: FieldScope) -> FieldDefinition {
        FieldDefinition {
            key: key.into(),
            alias: alias.into(),
            tooltip: tooltip.into(),
            suffix: format!(":{alias}"),
            enum_labels: None,
            scope,
        }
    }

    fn schema() -> FieldSchema {
        FieldSchema::new(
            "ims_motor",
            "FLD_SN",
            vec![
                def("FLD_DESC", "desc", "Description", FieldScope::Config),
                def("FLD_SN", "sn", "Serial number", FieldScope::Object),
                def("FLD_PORT", "port", "Port", FieldScope::Object),
            ],
        )
        .unwrap()
    }

    fn motor(address: &str, sn: &str) -> FieldValueMap {
        FieldValueMap::new(
            SourceLabel::Live {
                address: address.into(),
            },
            [("FLD_DESC", "M1"), ("FLD_SN", sn), ("FLD_PORT", "3")]
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            Vec::new(),
        )
    }

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn two_sources() {
        let diff = compute_diff(
            vec![motor("SXR:MMS:01", "SN1"), motor("SXR:MMS:02", "SN2")],
            DiffOrder::Lexicographic,
        )
        .unwrap();
        let text = render_diff(
            &diff,
            &schema(),
            &labels(&["SXR:MMS:01", "SXR:MMS:02"]),
            &RenderOptions::default(),
        );

        let rule = "-".repeat(32);
        let expected = [
            rule.as_str(),
            "Field    SXR:MMS:01   SXR:MMS:02",
            rule.as_str(),
            "sn       SN1          SN2",
            rule.as_str(),
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn missing_label_is_padded_with_one_store_marker() {
        let stored = FieldValueMap::new(
            SourceLabel::Stored {
                identity: "SN1".into(),
            },
            motor("", "SN1").iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect(),
            Vec::new(),
        );
        let diff = compute_diff(
            vec![motor("SXR:MMS:01", "SN1"), motor("SXR:MMS:02", "SN2"), stored],
            DiffOrder::Lexicographic,
        )
        .unwrap();
        let text = render_diff(
            &diff,
            &schema(),
            &labels(&["SXR:MMS:01", "SXR:MMS:02"]),
            &RenderOptions::default(),
        );

        assert_eq!(text.matches(STORE_MARKER).count(), 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-".repeat(41));
        assert_eq!(lines[1], "Field    SXR:MMS:01   SXR:MMS:02     Pmgr");
        assert_eq!(lines[3], "sn       SN1          SN2          SN1");
        assert_eq!(lines[4], "-".repeat(41));
    }

    #[test]
    fn tooltip_column_and_minimum_width() {
        let diff = compute_diff(
            vec![motor("A", "SN1"), motor("B", "SN22")],
            DiffOrder::Lexicographic,
        )
        .unwrap();
        let options = RenderOptions {
            show_tooltip: true,
            min_width: 4,
            column_offset: 1,
        };
        let text = render_diff(&diff, &schema(), &labels(&["A", "B"]), &options);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Field Tooltip       A    B");
        assert_eq!(lines[3], "sn    Serial number SN1  SN22");
        assert_eq!(lines[0].len(), 29);
    }

    #[test]
    fn empty_diff_says_so() {
        let diff = compute_diff(
            vec![motor("SXR:MMS:01", "SN1"), motor("SXR:MMS:02", "SN1")],
            DiffOrder::Lexicographic,
        )
        .unwrap();
        let text = render_diff(
            &diff,
            &schema(),
            &labels(&["SXR:MMS:01", "SXR:MMS:02"]),
            &RenderOptions::default(),
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "No differences");
    }

    #[test]
    fn view_of_single_source() {
        let map = motor("SXR:MMS:01", "SN1");
        let keys = labels(&["FLD_DESC", "FLD_SN", "FLD_PORT"]);
        let text = render_view(&map, &schema(), &keys, &RenderOptions::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Field    SXR:MMS:01");
        assert_eq!(&lines[3..6], ["desc     M1", "sn       SN1", "port     3"]);
    }
}

use std::str::FromStr;

use trax_core::editor::domain::document::{Document, EditError, Point};
use trax_core::shared::range::CharRange;

/// One editing command given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    Insert { at: Point, text: String },
    Delete { block: usize, range: CharRange },
    Break { at: Point },
    Speaker { block: usize, name: Option<String> },
    Unclear { block: usize, range: CharRange },
}

impl EditOp {
    pub fn apply(&self, document: &mut Document) -> Result<(), EditError> {
        match self {
            EditOp::Insert { at, text } => document.insert_text(*at, text).map(|_| ()),
            EditOp::Delete { block, range } => document.delete_range(*block, *range),
            EditOp::Break { at } => document.insert_break(*at).map(|_| ()),
            EditOp::Speaker { block, name } => document.set_speaker(*block, name.clone()),
            EditOp::Unclear { block, range } => document.mark_unclear(*block, *range),
        }
    }
}

fn number(field: Option<&str>, what: &str) -> Result<usize, String> {
    let field = field.ok_or_else(|| format!("missing {what}"))?;
    field
        .parse()
        .map_err(|_| format!("{what} must be a number, got '{field}'"))
}

/// Parses `insert:B:O:TEXT`, `delete:B:S:E`, `break:B:O`, `speaker:B[:NAME]`
/// and `unclear:B:S:E`.
impl FromStr for EditOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let kind = parts.next().unwrap_or_default();
        match kind {
            "insert" => {
                let block = number(parts.next(), "block")?;
                let offset = number(parts.next(), "offset")?;
                let text = parts.next().ok_or("missing text")?.replace("\\n", "\n");
                Ok(EditOp::Insert {
                    at: Point::new(block, offset),
                    text,
                })
            }
            "break" => Ok(EditOp::Break {
                at: Point::new(number(parts.next(), "block")?, number(parts.next(), "offset")?),
            }),
            "delete" | "unclear" => {
                let block = number(parts.next(), "block")?;
                let range = CharRange::new(number(parts.next(), "start")?, number(parts.next(), "end")?);
                Ok(if kind == "delete" {
                    EditOp::Delete { block, range }
                } else {
                    EditOp::Unclear { block, range }
                })
            }
            "speaker" => {
                let block = number(parts.next(), "block")?;
                let rest: Vec<&str> = parts.collect();
                let name = Some(rest.join(":")).filter(|n| !n.is_empty());
                Ok(EditOp::Speaker { block, name })
            }
            other => Err(format!(
                "unknown edit '{other}'; expected insert, delete, break, speaker or unclear"
            )),
        }
    }
}

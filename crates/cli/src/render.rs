use trax_core::editor::domain::decoration::{decorate, highlight_at, Decoration, Highlight};
use trax_core::editor::domain::document::Document;
use trax_core::editor::domain::node::{Block, BlockChild, Content, NodeKind, SpeakerLabel};

/// `m:ss`, as shown next to a speaker.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn render_label(label: &SpeakerLabel) -> String {
    let speaker = label.speaker.as_deref().unwrap_or("Unknown");
    format!("{speaker} ({})", format_duration(label.duration))
}

/// Text with the playing word in `[...]` and unclear runs in `{...}`.
///
/// The playing word is only marked while `playing`.
pub fn render_content(content: &Content, decorations: &[Decoration], playing: bool) -> String {
    let mut unclear = vec![false; content.char_len()];
    for (kind, range) in content.runs() {
        if kind == NodeKind::Unclear {
            unclear[range.start..range.end].fill(true);
        }
    }

    let mut out = String::with_capacity(content.text.len() + 4);
    let (mut in_now, mut in_unclear) = (false, false);
    for (i, c) in content.text.chars().enumerate() {
        let now = playing && highlight_at(decorations, i) == Highlight::Now;
        if in_unclear && (!unclear[i] || now != in_now) {
            out.push('}');
            in_unclear = false;
        }
        if in_now != now {
            out.push(if now { '[' } else { ']' });
            in_now = now;
        }
        if unclear[i] && !in_unclear {
            out.push('{');
            in_unclear = true;
        }
        out.push(c);
    }
    if in_unclear {
        out.push('}');
    }
    if in_now {
        out.push(']');
    }
    out
}

pub fn render_block(block: &Block, time: f64, playing: bool) -> String {
    let decorations = decorate(block, time);
    let marker = if block.editable { '>' } else { ' ' };
    let mut lines = Vec::new();
    for child in &block.children {
        match child {
            BlockChild::SpeakerLabel(label) => lines.push(format!("{marker} {}", render_label(label))),
            BlockChild::Content(content) => lines.push(format!(
                "{marker}   {}",
                render_content(content, &decorations, playing)
            )),
        }
    }
    lines.join("\n")
}

pub fn render_document(document: &Document, time: f64, playing: bool) -> String {
    document
        .blocks()
        .iter()
        .map(|block| render_block(block, time, playing))
        .collect::<Vec<_>>()
        .join("\n\n")
}

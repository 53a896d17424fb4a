// src/render/terminal.rs

use super::MarkerPosition;
use crate::markers::MarkerKind;

/// One-line ASCII ruler: `!` emphasis bar, `|` bar, `.` beat.
/// When markers share a column the strongest one wins.
pub fn render_ruler(positions: &[MarkerPosition], width: usize) -> String {
    let w = width.max(2);
    let mut row = vec!['-'; w];
    for p in positions {
        let x = column(p.percent, w);
        let glyph = glyph_for(p.kind);
        if strength(glyph) > strength(row[x]) {
            row[x] = glyph;
        }
    }
    row.into_iter().collect()
}

/// Bar numbers printed under each bar tick that has room for them.
pub fn render_bar_labels(positions: &[MarkerPosition], width: usize) -> String {
    let w = width.max(2);
    let mut row = vec![' '; w];
    let mut next_free = 0usize;
    for p in positions {
        if !p.kind.is_bar() {
            continue;
        }
        let x = column(p.percent, w);
        let label = p.bar_number.to_string();
        if x < next_free || x + label.len() > w {
            continue;
        }
        for (i, c) in label.chars().enumerate() {
            row[x + i] = c;
        }
        next_free = x + label.len() + 1;
    }
    row.into_iter().collect()
}

fn column(percent: f64, width: usize) -> usize {
    let clamped = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
    ((clamped / 100.0) * (width as f64 - 1.0)).round() as usize
}

fn glyph_for(kind: MarkerKind) -> char {
    match kind {
        MarkerKind::EmphasisBar => '!',
        MarkerKind::Bar => '|',
        MarkerKind::Beat => '.',
    }
}

fn strength(c: char) -> u8 {
    match c {
        '!' => 3,
        '|' => 2,
        '.' => 1,
        _ => 0,
    }
}

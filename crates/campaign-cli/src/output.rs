use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Left-align `cell` to `width` chars (not bytes).
fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    let mut out = String::with_capacity(cell.len() + width.saturating_sub(len));
    out.push_str(cell);
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    out
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| cells.join("  ").trim_end().to_string();
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, &w)| pad(h, w))
            .collect(),
    ));
    lines.push(line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        lines.push(line(
            row.iter()
                .enumerate()
                .map(|(i, cell)| pad(cell, widths.get(i).copied().unwrap_or(0)))
                .collect(),
        ));
    }
    lines
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    for line in render_table(headers, &rows) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_on_characters() {
        let rows = vec![
            vec!["1".to_string(), "حملة".to_string(), "active".to_string()],
            vec!["12".to_string(), "Deep Work".to_string(), String::new()],
        ];
        let lines = render_table(&["#", "NAME", "STATE"], &rows);
        assert_eq!(lines[0], "#   NAME       STATE");
        assert_eq!(lines[1], "--  ---------  ------");
        assert_eq!(lines[2], "1   حملة       active");
        assert_eq!(lines[3], "12  Deep Work");
    }
}

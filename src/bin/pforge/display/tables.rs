use std::io::{self, Write};

use patran_forge::{CompiledModel, Diagnostic};

use crate::util::text::{truncate, wrap};

const INDENT: &str = "      ";
const KEY_WIDTH: usize = 34;
const VALUE_WIDTH: usize = 14;
const MESSAGE_WIDTH: usize = KEY_WIDTH + VALUE_WIDTH + 3;

pub fn print_model_summary(model: &CompiledModel) {
    let mut out = io::stderr().lock();

    let mut rows = vec![
        ("Configuration".to_string(), model.analysis.configuration_id.clone()),
        ("Solver".to_string(), model.analysis.solver.clone()),
        ("Instructions".to_string(), model.analysis.instructions.to_string()),
    ];
    rows.extend(
        model
            .table_counts()
            .into_iter()
            .filter(|t| t.count > 0)
            .map(|t| (t.name.to_string(), t.count.to_string())),
    );

    print_kv_table(&mut out, "Model Summary", &rows);
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let mut out = io::stderr().lock();
    let _ = writeln!(
        out,
        "{INDENT}\x1b[33m{} warning(s), see the log for details\x1b[0m",
        diagnostics.len()
    );
    for diagnostic in diagnostics {
        let lines = wrap(&diagnostic.message, MESSAGE_WIDTH);
        for (i, line) in lines.iter().enumerate() {
            let lead = if i == 0 { "!" } else { " " };
            let _ = writeln!(out, "{INDENT}\x1b[33m{lead}\x1b[0m {line}");
        }
    }
    let _ = writeln!(out);
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(String, String)]) {
    let k_line = "─".repeat(KEY_WIDTH + 2);
    let v_line = "─".repeat(VALUE_WIDTH + 2);

    let _ = writeln!(out, "{INDENT}┌─ {title} ─┐");
    let _ = writeln!(out, "{INDENT}┌{k_line}┬{v_line}┐");
    for (key, value) in rows {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<KEY_WIDTH$} │ {:>VALUE_WIDTH$} │",
            truncate(key, KEY_WIDTH),
            truncate(value, VALUE_WIDTH)
        );
    }
    let _ = writeln!(out, "{INDENT}└{k_line}┴{v_line}┘");
    let _ = writeln!(out);
}

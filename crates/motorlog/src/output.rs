//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Notices about where data came from go to stderr so piped output stays
//! clean.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use motorlog_core::{DataSource, ErrorBanner};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled on stderr.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

fn warn_line(global: &GlobalOpts, text: &str) {
    if global.quiet {
        return;
    }
    if should_color(&global.color) {
        eprintln!("{} {}", "!".yellow().bold(), text.yellow());
    } else {
        eprintln!("! {text}");
    }
}

/// Tell the user when a read was not served live.
pub fn print_source(global: &GlobalOpts, source: &DataSource) {
    match source {
        DataSource::Live => {}
        DataSource::Mirror { as_of } => warn_line(
            global,
            &format!(
                "Showing the copy saved {} (backend unavailable)",
                as_of.format("%Y-%m-%d %H:%M UTC")
            ),
        ),
        DataSource::Guest => warn_line(global, "Guest mode: sign in to see your own data"),
    }
}

/// Surface the error banner raised by failed requests during this command.
pub fn print_banner(global: &GlobalOpts, banner: &ErrorBanner) {
    let Some(message) = banner.message() else {
        return;
    };
    warn_line(global, message);
    if let Some(event) = banner.last_error() {
        tracing::info!(url = %event.url, message = %event.message, "request failed");
    }
}

/// Confirmation printed after a mutation.
pub fn print_done(global: &GlobalOpts, text: &str) {
    if global.quiet {
        return;
    }
    if should_color(&global.color) {
        eprintln!("{} {text}", "✓".green());
    } else {
        eprintln!("✓ {text}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are key/value
/// blocks rather than rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Label/value lines, labels right-aligned; empty values are skipped.
pub fn detail_block(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    fields
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k:>width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Empty string for `None`.
pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: {e}\n"))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use tabled::Tabled;

    use super::*;

    #[derive(Serialize)]
    struct Car {
        id: u64,
        brand: &'static str,
    }

    #[derive(Tabled)]
    struct CarRow {
        #[tabled(rename = "Brand")]
        brand: String,
    }

    fn cars() -> Vec<Car> {
        vec![
            Car { id: 1, brand: "Skoda" },
            Car { id: 2, brand: "Volvo" },
        ]
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &cars(),
            |c| CarRow { brand: c.brand.into() },
            |c| c.id.to_string(),
        );
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &cars(),
            |c| CarRow { brand: c.brand.into() },
            |c| c.id.to_string(),
        );
        assert_eq!(out, r#"[{"id":1,"brand":"Skoda"},{"id":2,"brand":"Volvo"}]"#);
    }

    #[test]
    fn table_has_headers() {
        let out = render_list(
            &OutputFormat::Table,
            &cars(),
            |c| CarRow { brand: c.brand.into() },
            |c| c.id.to_string(),
        );
        assert!(out.contains("Brand"));
        assert!(out.contains("Volvo"));
    }

    #[test]
    fn detail_block_aligns_and_skips_empty() {
        let out = detail_block(&[
            ("ID", "7".into()),
            ("Brand", "Skoda".into()),
            ("VIN", String::new()),
        ]);
        assert_eq!(out, "   ID  7\nBrand  Skoda");
    }
}

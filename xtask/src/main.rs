use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use serde_json::Value;
use shapewright::shape::{BUILTIN_TYPES, builtin};
use shapewright::{
    BehaviorRef, LoadError, PathData, Registry, RenderContext, ShapeOverrides, ShapeValidator, ValidationIssue,
    ValidationReport,
};
use std::fs;
use std::sync::Arc;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let ok = match args[1].as_str() {
        "validate-library" => match args.get(2) {
            Some(dir) => validate_library(Utf8Path::new(dir)),
            None => {
                eprintln!("validate-library needs a directory");
                false
            }
        },
        "gallery" => gallery(),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            usage();
            false
        }
    };
    if !ok {
        std::process::exit(1);
    }
}

fn usage() {
    eprintln!("Usage: cargo xtask <command>");
    eprintln!("Commands:");
    eprintln!("  validate-library <dir>   Validate every *.json shape configuration in <dir>");
    eprintln!("  gallery                  Write an HTML preview of the built-in shapes");
}

/// Outcome for one configuration file
struct FileResult {
    path: Utf8PathBuf,
    type_id: String,
    outcome: Result<ValidationReport, LoadError>,
}

fn validate_library(dir: &Utf8Path) -> bool {
    let mut files: Vec<Utf8PathBuf> = match dir.read_dir_utf8() {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.extension() == Some("json"))
            .collect(),
        Err(e) => {
            eprintln!("cannot read {}: {}", dir, e);
            return false;
        }
    };
    files.sort();

    let results: Vec<FileResult> = files.par_iter().map(|p| validate_file(p)).collect();

    let total = results.len();
    let mut failed = 0;
    let mut warned = 0;
    for result in results {
        match result.outcome {
            Ok(report) if report.warnings.is_empty() => println!("ok    {}", result.path),
            Ok(report) => {
                warned += 1;
                println!("warn  {}", result.path);
                for w in &report.warnings {
                    println!("        {}", w);
                }
            }
            Err(e) => {
                failed += 1;
                println!("FAIL  {} ({})", result.path, result.type_id);
                eprintln!("{:?}", miette::Report::new(e));
            }
        }
    }

    println!();
    println!(
        "{} files: {} valid, {} with warnings, {} invalid",
        total,
        total - failed,
        warned,
        failed
    );
    failed == 0
}

fn validate_file(path: &Utf8Path) -> FileResult {
    let fallback = path.file_stem().unwrap_or("").to_string();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            let mut report = ValidationReport::ok();
            report.error(ValidationIssue::new("", format!("cannot read file: {}", e)));
            return FileResult {
                path: path.to_owned(),
                type_id: fallback.clone(),
                outcome: Err(LoadError::Invalid {
                    type_id: fallback,
                    report,
                }),
            };
        }
    };

    let document: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(source) => {
            return FileResult {
                path: path.to_owned(),
                type_id: fallback.clone(),
                outcome: Err(LoadError::Parse {
                    type_id: fallback,
                    source,
                }),
            };
        }
    };

    let type_id = document
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or(fallback);

    let validator = ShapeValidator::new();
    let report = match builtin(&type_id) {
        Some(behavior) => {
            let behavior: BehaviorRef = Arc::new(behavior);
            validator.validate(&type_id, &behavior, &document)
        }
        None => {
            let mut report = validator.validate_config(&document);
            report.merge(validator.cross_check(&type_id, &document));
            report.warning(ValidationIssue::new(
                "type",
                format!("`{}` is not a built-in kind; behavior was not checked", type_id),
            ));
            report
        }
    };

    let outcome = if report.valid {
        Ok(report)
    } else {
        Err(LoadError::Invalid {
            type_id: type_id.clone(),
            report,
        })
    };
    FileResult {
        path: path.to_owned(),
        type_id,
        outcome,
    }
}

fn gallery() -> bool {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let output_path = Utf8Path::new(manifest_dir).join("../gallery.html");

    let registry = Registry::with_builtins();
    let ctx = RenderContext {
        show_ports: true,
        show_handles: false,
    };

    let mut html = String::new();
    html.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Built-in shapes</title>
    <style>
        body { font-family: system-ui, sans-serif; background: #eee; margin: 24px; }
        .grid { display: grid; grid-template-columns: repeat(auto-fill, 200px); gap: 16px; }
        .card { background: white; border-radius: 8px; padding: 12px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
        .title { font-size: 12px; font-weight: 600; margin-bottom: 8px; }
        svg { width: 176px; height: 176px; background: #fafafa; }
    </style>
</head>
<body>
<div class="grid">
"#,
    );

    for ty in BUILTIN_TYPES {
        let shape = match registry.create(ty, &ShapeOverrides::at(20.0, 20.0)) {
            Ok(shape) => shape,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                return false;
            }
        };
        let drawable = shape.render(&ctx);
        let size = shape.width().max(shape.height()) + 40.0;

        html.push_str(&format!(
            r#"<div class="card"><div class="title">{}</div><svg viewBox="0 0 {size} {size}">"#,
            ty
        ));
        for layer in &drawable.layers {
            html.push_str(&svg_path(
                &layer.path,
                layer.fill.as_deref().unwrap_or("none"),
                layer.stroke.as_deref().unwrap_or("none"),
                layer.stroke_width,
            ));
        }
        html.push_str("</svg></div>\n");
    }

    html.push_str("</div>\n</body></html>");

    if let Err(e) = fs::write(&output_path, html) {
        eprintln!("cannot write {}: {}", output_path, e);
        return false;
    }
    println!("Generated gallery at: {}", output_path);
    true
}

fn svg_path(path: &PathData, fill: &str, stroke: &str, stroke_width: f64) -> String {
    format!(
        r#"<path d="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        path, fill, stroke, stroke_width
    )
}

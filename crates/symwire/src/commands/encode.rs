//! Encode Command
//!
//! Reads one runtime value as JSON and prints its wire document.

use std::io::Read;
use std::path::{Path, PathBuf};

use starbase::AppResult;
use symwire_core::{
    Encoder, ExpressionEngine, RenderOptions, RuntimeValue, encode_and_render,
    startup_failure_envelope, write_output,
};

use crate::config::SymwireConfig;
use crate::error::{Result, StartupError};
use crate::startup;

/// Read a JSON value from `path`, or from stdin when absent.
pub fn load_value(path: Option<&Path>) -> Result<RuntimeValue> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(RuntimeValue::from_json(&json)?)
}

/// Keep only the entries of `value` whose names are not in `baseline`.
pub fn subtract_baseline(value: RuntimeValue, baseline: &RuntimeValue) -> Result<RuntimeValue> {
    match (value, baseline) {
        (RuntimeValue::Mapping(current), RuntimeValue::Mapping(before)) => {
            let added = current.difference(before);
            tracing::debug!(
                before = before.len(),
                after = current.len(),
                added = added.len(),
                "subtracted baseline"
            );
            Ok(RuntimeValue::Mapping(added))
        }
        (value, baseline) => Err(StartupError::Input(format!(
            "--baseline needs two mappings, got {} and {}",
            value.type_name(),
            baseline.type_name()
        ))),
    }
}

/// Render `value` with the given engine.
pub fn encode_document<E>(engine: &E, value: &RuntimeValue, options: &RenderOptions) -> String
where
    E: ExpressionEngine + ?Sized,
{
    let encoder = Encoder::new(engine);
    encode_and_render(&encoder, value, options)
}

/// Document reporting a failure that kept encoding from starting.
pub fn startup_failure(err: &StartupError) -> String {
    startup_failure_envelope(err.kind(), &err.to_string())
}

fn prepare(
    input: Option<&Path>,
    baseline: Option<&Path>,
    config: Option<&Path>,
) -> Result<(String, startup::LogGuard)> {
    let config = SymwireConfig::resolve(config)?;
    let (session, guard) = startup::init(config)?;
    let config = session.config();
    let engine = config.build_engine()?;

    let mut value = load_value(input)?;
    if let Some(path) = baseline {
        let before = load_value(Some(path))?;
        value = subtract_baseline(value, &before)?;
    }
    let document = encode_document(&engine, &value, &config.render_options());
    Ok((document, guard))
}

pub fn run_encode(
    input: Option<PathBuf>,
    baseline: Option<PathBuf>,
    config: Option<PathBuf>,
) -> AppResult {
    let (document, exit_code) =
        match prepare(input.as_deref(), baseline.as_deref(), config.as_deref()) {
            Ok((document, _guard)) => (document, None),
            Err(err) => {
                tracing::error!(kind = err.kind(), error = %err, "startup failed");
                (startup_failure(&err), Some(1))
            }
        };

    let stdout = std::io::stdout();
    if let Err(e) = write_output(&mut stdout.lock(), &document) {
        eprintln!("Failed to write output: {}", e);
        return Ok(Some(1));
    }

    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use symwire_core::{Mapping, TreeEngine};

    fn names(pairs: &[(&str, i64)]) -> RuntimeValue {
        let mut m = Mapping::new();
        for (name, n) in pairs {
            m.insert(*name, RuntimeValue::Int(*n));
        }
        RuntimeValue::Mapping(m)
    }

    #[test]
    fn test_load_value_from_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("value.json");
        std::fs::write(&path, r#"{"type": "text", "value": "hi"}"#)?;

        assert_eq!(load_value(Some(&path))?, RuntimeValue::text("hi"));
        Ok(())
    }

    #[test]
    fn test_load_value_rejects_bad_json() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("value.json");
        std::fs::write(&path, r#"{"type": "integer", "value": 1}"#)?;

        assert_eq!(load_value(Some(&path)).unwrap_err().kind(), "InputError");
        Ok(())
    }

    #[test]
    fn test_subtract_baseline_keeps_new_names() {
        let after = names(&[("a", 1), ("x", 2), ("b", 3)]);
        let before = names(&[("a", 1), ("b", 0)]);
        assert_eq!(
            subtract_baseline(after, &before).unwrap(),
            names(&[("x", 2)])
        );
    }

    #[test]
    fn test_subtract_baseline_needs_mappings() {
        let err = subtract_baseline(RuntimeValue::Int(1), &names(&[])).unwrap_err();
        assert_eq!(err.kind(), "InputError");
        assert!(err.to_string().contains("int and dict"));
    }

    #[test]
    fn test_encode_document_uses_options() {
        let doc = encode_document(
            &TreeEngine::new(),
            &RuntimeValue::Int(5),
            &RenderOptions {
                xml_declaration: false,
            },
        );
        assert_eq!(
            doc,
            "<output_block>\n<item>\n<f>1001</f>\n<f>5</f>\n</item>\n</output_block>\n"
        );
    }

    #[test]
    fn test_startup_failure_envelope() {
        let doc = startup_failure(&StartupError::Engine("unknown expression engine 'x'".into()));
        assert!(doc.contains("<f>EngineError: Engine error: unknown expression engine 'x'</f>"));
    }
}

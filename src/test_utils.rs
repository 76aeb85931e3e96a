use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::value::MintValue;

/// What running a testcase should produce. `output` holds every printed
/// value, including those printed before an error aborted the program.
#[derive(Debug, Deserialize)]
pub struct Expectation {
    pub ok: bool,
    #[serde(default)]
    pub output: Vec<MintValue>,
    #[serde(rename = "type", default)]
    pub error: Option<String>,
}

const TESTCASES: usize = 21;

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Expectation> {
    let path = path.as_ref();
    let source = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let expectation: Expectation = serde_json::from_slice(&source)?;

    if expectation.ok == expectation.error.is_some() {
        bail!("{}: 'type' must be present exactly when 'ok' is false", path.display());
    }
    Ok(expectation)
}

pub fn load_test_pair(testcase: usize) -> anyhow::Result<(String, Expectation)> {
    if testcase < 1 || testcase > TESTCASES { bail!("Testcase out of bounds"); }

    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.mint", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    Ok((input, output))
}

pub fn all_testcases() -> impl Iterator<Item = usize> {
    1..=TESTCASES
}

use anyhow::{anyhow, bail, Context, Result};
use gpa_rs::kernel::KernelLifecycle;
use gpa_rs::signal::synth::{SineConfig, SineKernel};
use gpa_rs::signal::traits::Synthesize1D;
use gpa_rs::signal::{GpaConfig, GpaKernel, GpaReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

const DEFAULT_PYTHON_BIN: &str = "python";
const PYTHON_BIN_ENV: &str = "GPA_PYTHON";
const SEED: u64 = 7;

const PY_GPA_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np

env = json.loads(sys.stdin.read())
iters = int(env["iters"])
p = env["payload"]
signal = np.asarray(p["signal"], dtype=float)
g = float(p["g"])
center = float(p["center"])
sigma = float(p["sigma"])

def _compute():
    x = np.arange(signal.size, dtype=float)
    mask = np.exp(-0.5 * (x - center) ** 2 / sigma ** 2)
    spec = mask * np.fft.fftshift(np.fft.fft(signal))
    phase = np.unwrap(np.angle(np.fft.ifft(np.fft.ifftshift(spec))))
    freq = np.gradient(phase) / (2 * np.pi)
    if p["moire"]:
        k = np.floor(2 / g)
        freq = freq + (k / 2 if k % 2 == 0 else (k + 1) / 2)
    strain = (1 / g - freq) / freq
    return freq, strain

freq, strain = _compute()
t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "frequency": freq.tolist(),
    "strain": strain.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    frequency: Vec<f64>,
    strain: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ParityRow {
    case_id: String,
    field: String,
    pearson_r: f64,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    rust_ns: f64,
    python_ns: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParityBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    rows: Vec<ParityRow>,
}

/// One synthetic signal analyzed by both implementations.
struct ParityCase {
    id: &'static str,
    sine: SineConfig,
    gpa: GpaConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("parity") => run_parity(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo xtask parity");
            eprintln!();
            eprintln!("Set {PYTHON_BIN_ENV} to pick the python interpreter (default: {DEFAULT_PYTHON_BIN}).");
            Ok(())
        }
    }
}

fn parity_cases() -> Vec<ParityCase> {
    vec![
        ParityCase {
            id: "reference_g4_len1023",
            sine: SineConfig {
                len: 1023,
                g: 4.0,
                delta_g: 0.0,
                noise: 0.0,
            },
            gpa: GpaConfig {
                center: Some(768.0),
                ..GpaConfig::default()
            },
        },
        ParityCase {
            id: "two_regime_g4_dg0.2",
            sine: SineConfig {
                len: 1023,
                g: 4.0,
                delta_g: 0.2,
                noise: 0.0,
            },
            gpa: GpaConfig {
                delta_g: 0.2,
                ..GpaConfig::default()
            },
        },
        ParityCase {
            id: "odd_samples_g6",
            sine: SineConfig {
                len: 1022,
                g: 6.0,
                delta_g: 0.5,
                noise: 0.0,
            },
            gpa: GpaConfig {
                g: 6.0,
                delta_g: 0.5,
                sigma: 8.0,
                ..GpaConfig::default()
            },
        },
        ParityCase {
            id: "moire_g1.5",
            sine: SineConfig {
                len: 767,
                g: 1.5,
                delta_g: 0.0,
                noise: 0.0,
            },
            gpa: GpaConfig {
                g: 1.5,
                sigma: 6.0,
                ..GpaConfig::default()
            },
        },
    ]
}

fn run_parity() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/parity/{ts}"));
    fs::create_dir_all(&out_dir).context("creating parity output directory")?;

    let python_bin = detect_python_bin();
    let mut rows = Vec::new();
    let mut versions = None;

    for case in parity_cases() {
        tracing::info!(case = case.id, "running parity case");
        let signal = SineKernel::try_new(case.sine)
            .map_err(|e| anyhow!("case {}: invalid sine config: {e}", case.id))?
            .run_alloc(&mut StdRng::seed_from_u64(SEED))
            .map_err(|e| anyhow!("case {}: synthesis failed: {e}", case.id))?;
        let kernel = GpaKernel::try_new(case.gpa)
            .map_err(|e| anyhow!("case {}: invalid gpa config: {e}", case.id))?;
        let report = kernel
            .run(&signal)
            .with_context(|| format!("case {}: rust analysis failed", case.id))?;

        let py = python_gpa_eval(&python_bin, &case, &report, 50)?;
        let rust_ns = benchmark_avg_ns(50, || {
            kernel
                .run(&signal)
                .map(|_| ())
                .map_err(|e| anyhow!("case {}: rust benchmark failed: {e}", case.id))
        })?;

        write_report(&out_dir.join(format!("{}_rust.json", case.id)), &report)?;
        rows.push(build_row(
            case.id,
            "frequency",
            &report.frequency,
            &py.frequency,
            rust_ns,
            py.avg_ns,
        )?);
        rows.push(build_row(
            case.id,
            "strain",
            &report.strain,
            &py.strain,
            rust_ns,
            py.avg_ns,
        )?);
        versions.get_or_insert((py.python_version, py.numpy_version));
    }

    let (python_version, numpy_version) = versions.unwrap_or_default();
    let bundle = ParityBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.to_string_lossy().into_owned(),
        python_version,
        numpy_version,
        rows,
    };
    let summary_json = out_dir.join("summary.json");
    fs::write(
        &summary_json,
        serde_json::to_vec_pretty(&bundle).context("serializing parity summary")?,
    )
    .with_context(|| format!("writing {}", summary_json.display()))?;
    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;

    println!("Parity artifacts:");
    println!("  - {}", summary_json.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - cases: {}", bundle.rows.len() / 2);
    for row in &bundle.rows {
        println!(
            "  {:<24} {:<10} max_abs={:.3e} r={:.6}",
            row.case_id, row.field, row.max_abs, row.pearson_r
        );
    }

    Ok(())
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os(PYTHON_BIN_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_gpa_eval(
    python_bin: &Path,
    case: &ParityCase,
    report: &GpaReport,
    iters: usize,
) -> Result<PythonEval> {
    let py = run_python_eval(
        python_bin,
        PY_GPA_SCRIPT,
        json!({
            "iters": iters,
            "payload": {
                "signal": report.signal,
                "g": case.gpa.g,
                "center": report.mask_center,
                "sigma": case.gpa.sigma,
                "moire": case.gpa.moire,
            }
        }),
    )
    .with_context(|| format!("case {}: python reference failed", case.id))?;
    ensure_same_length(case.id, &report.frequency, &py.frequency)?;
    ensure_same_length(case.id, &report.strain, &py.strain)?;
    Ok(py)
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(&payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    let parsed: PythonEval = serde_json::from_str(stdout.trim()).context("parsing python json")?;
    Ok(parsed)
}

fn write_report(path: &Path, report: &GpaReport) -> Result<()> {
    let bytes = serde_json::to_vec(report).context("serializing gpa report")?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

fn build_row(
    case_id: &str,
    field: &str,
    rust: &[f64],
    python: &[f64],
    rust_ns: f64,
    python_ns: f64,
) -> Result<ParityRow> {
    ensure_same_length(case_id, rust, python)?;
    Ok(ParityRow {
        case_id: case_id.to_string(),
        field: field.to_string(),
        pearson_r: pearson(rust, python),
        mae: mean_abs_error(rust, python),
        rmse: root_mean_squared_error(rust, python),
        max_abs: max_abs_error(rust, python),
        rust_ns,
        python_ns,
        speedup_vs_python: python_ns / rust_ns,
    })
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / a.len() as f64)
        .sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = *x - mean_a;
        let db = *y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        // Constant fields: correlation is undefined, report agreement instead.
        if max_abs_error(a, b) < 1e-9 {
            1.0
        } else {
            0.0
        }
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}

fn write_summary_csv(path: &Path, rows: &[ParityRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("case_id,field,pearson_r,mae,rmse,max_abs,rust_ns,python_ns,speedup_vs_python\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{:.12},{:.12},{:.12},{:.12},{:.3},{:.3},{:.6}\n",
            row.case_id,
            row.field,
            row.pearson_r,
            row.mae,
            row.rmse,
            row.max_abs,
            row.rust_ns,
            row.python_ns,
            row.speedup_vs_python
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

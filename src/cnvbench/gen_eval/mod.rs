use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};
use thiserror::Error;

mod cnv;
mod options;
mod qsub;
mod rscript;
mod run_script;

pub use self::cnv::{CnvScale, CnvType};
pub use self::options::{command, parse_args, usage, CliOption, CliRequest};
pub use self::qsub::{generate_qsub, job_name, render_qsub};
pub use self::rscript::{generate_r, methods, render_r, Method};
pub use self::run_script::{generate_run, render_run};

/// Decimal places shown in plots when `--plotDec` is not given.
pub const DEFAULT_PLOT_DEC: u32 = 3;

/// Name and version written into the banner of every generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    pub name: &'static str,
    pub version: &'static str,
}

impl Generator {
    pub fn new(name: &'static str, version: &'static str) -> Self {
        Generator { name, version }
    }

    pub fn banner(&self) -> String {
        format!(
            "# This file was generated by \"{} (v{}).\"",
            self.name, self.version
        )
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new("gen-eval", env!("CARGO_PKG_VERSION"))
    }
}

/// Raw option values, exactly as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CLI {
    pub sid: Option<String>,
    pub cnv_scale: Option<String>,
    pub out_dir: Option<String>,
    pub xclone: Option<String>,
    pub numbat: Option<String>,
    pub casper: Option<String>,
    pub copykat: Option<String>,
    pub infercnv: Option<String>,
    pub truth: Option<String>,
    pub cell_anno: Option<String>,
    pub gene_anno: Option<String>,
    pub repo_scripts: Option<String>,
    pub plot_sid: Option<String>,
    pub plot_dec: Option<String>,
}

impl CLI {
    /// Stores `value` in the field for `opt`. Bare flags carry no
    /// value and are ignored here.
    pub fn set(&mut self, opt: CliOption, value: String) {
        let field = match opt {
            CliOption::Sid => &mut self.sid,
            CliOption::CnvScale => &mut self.cnv_scale,
            CliOption::OutDir => &mut self.out_dir,
            CliOption::XClone => &mut self.xclone,
            CliOption::Numbat => &mut self.numbat,
            CliOption::Casper => &mut self.casper,
            CliOption::CopyKat => &mut self.copykat,
            CliOption::InferCnv => &mut self.infercnv,
            CliOption::Truth => &mut self.truth,
            CliOption::CellAnno => &mut self.cell_anno,
            CliOption::GeneAnno => &mut self.gene_anno,
            CliOption::RepoScripts => &mut self.repo_scripts,
            CliOption::PlotSid => &mut self.plot_sid,
            CliOption::PlotDec => &mut self.plot_dec,
            CliOption::Version | CliOption::Help => return,
        };
        *field = Some(value);
    }
}

/// Validated settings for one sample.
#[derive(Debug, Clone)]
pub struct Config {
    sid: String,
    cnv_scale: CnvScale,

    casper_dir: PathBuf,
    copykat_dir: PathBuf,
    infercnv_dir: PathBuf,
    numbat_dir: PathBuf,
    xclone_dir: PathBuf,

    cell_anno_fn: PathBuf,
    gene_anno_fn: PathBuf,
    truth_fn: PathBuf,

    repo_scripts_dir: PathBuf,
    out_dir: PathBuf,

    plot_sid: Option<String>,
    plot_dec: u32,
}

impl Config {
    /// Validates the options and then creates the output directory
    /// along with one subdirectory per CNV type.
    ///
    /// # Errors
    ///
    /// A `GenEvalError` is returned when validation fails, in which
    /// case nothing has been created on disk. An I/O error is
    /// returned when a directory cannot be created.
    pub fn new(cli: &CLI) -> Result<Self, anyhow::Error> {
        let config = Config::validate(cli)?;
        config.create_dirs()?;
        Ok(config)
    }

    /// Checks the options without touching the filesystem beyond
    /// existence tests.
    pub fn validate(cli: &CLI) -> Result<Self, GenEvalError> {
        let sid = require_value(&cli.sid, CliOption::Sid)?;
        let cnv_scale = require_value(&cli.cnv_scale, CliOption::CnvScale)?.parse::<CnvScale>()?;

        let casper_dir = require_path(&cli.casper, CliOption::Casper)?;
        let copykat_dir = require_path(&cli.copykat, CliOption::CopyKat)?;
        let infercnv_dir = require_path(&cli.infercnv, CliOption::InferCnv)?;
        let numbat_dir = require_path(&cli.numbat, CliOption::Numbat)?;
        let xclone_dir = require_path(&cli.xclone, CliOption::XClone)?;

        let cell_anno_fn = require_path(&cli.cell_anno, CliOption::CellAnno)?;
        let gene_anno_fn = require_path(&cli.gene_anno, CliOption::GeneAnno)?;
        let truth_fn = require_path(&cli.truth, CliOption::Truth)?;

        let out_dir = PathBuf::from(require_value(&cli.out_dir, CliOption::OutDir)?);
        let repo_scripts_dir = require_path(&cli.repo_scripts, CliOption::RepoScripts)?;

        let plot_dec = match cli.plot_dec.as_deref() {
            None => DEFAULT_PLOT_DEC,
            Some(dec) => dec
                .trim()
                .parse::<u32>()
                .map_err(|_| GenEvalError::InvalidValue {
                    option: CliOption::PlotDec.long(),
                    value: dec.to_string(),
                })?,
        };

        let config = Config {
            sid,
            cnv_scale,
            casper_dir,
            copykat_dir,
            infercnv_dir,
            numbat_dir,
            xclone_dir,
            cell_anno_fn,
            gene_anno_fn,
            truth_fn,
            repo_scripts_dir,
            out_dir,
            plot_sid: cli.plot_sid.clone(),
            plot_dec,
        };
        debug!("config: {:?}", &config);
        Ok(config)
    }

    fn create_dirs(&self) -> Result<(), anyhow::Error> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);

        builder
            .create(&self.out_dir)
            .with_context(|| format!("creating output dir {}", self.out_dir.display()))?;

        for cnv_type in CnvType::ALL.iter() {
            let cnv_dir = self.cnv_dir(*cnv_type);
            builder
                .create(&cnv_dir)
                .with_context(|| format!("creating {}", cnv_dir.display()))?;
            info!("Using {} dir {}", cnv_type, cnv_dir.display());
        }

        Ok(())
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }
    pub fn cnv_scale(&self) -> CnvScale {
        self.cnv_scale
    }
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
    pub fn repo_scripts_dir(&self) -> &Path {
        &self.repo_scripts_dir
    }
    pub fn plot_sid(&self) -> Option<&str> {
        self.plot_sid.as_deref()
    }
    pub fn plot_dec(&self) -> u32 {
        self.plot_dec
    }

    /// Output subdirectory for one CNV type, e.g., `<outdir>/loh`.
    pub fn cnv_dir(&self, cnv_type: CnvType) -> PathBuf {
        self.out_dir.join(cnv_type.as_str())
    }

    /// Common stem of the per-sample scripts, `<sid>.eval`.
    pub fn script_prefix(&self) -> String {
        format!("{}.eval", self.sid)
    }

    pub fn r_script_name(&self) -> String {
        format!("{}.R", self.script_prefix())
    }

    pub fn qsub_script_name(&self) -> String {
        format!("{}.qsub.sh", self.script_prefix())
    }
}

fn require_value(value: &Option<String>, opt: CliOption) -> Result<String, GenEvalError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(GenEvalError::MissingValue(opt.long())),
    }
}

fn require_path(value: &Option<String>, opt: CliOption) -> Result<PathBuf, GenEvalError> {
    let path = PathBuf::from(require_value(value, opt)?);
    if path.exists() {
        Ok(path)
    } else {
        Err(GenEvalError::PathNotFound {
            option: opt.long(),
            path,
        })
    }
}

#[derive(Debug, Error)]
pub enum GenEvalError {
    #[error("Missing value for --{0}")]
    MissingValue(&'static str),
    #[error("Invalid value for {option}: \"{value}\"")]
    InvalidValue { option: &'static str, value: String },
    #[error("Path for --{option} not found: \"{}\"", path.display())]
    PathNotFound { option: &'static str, path: PathBuf },
    #[error("invalid option: '{0}'")]
    UnrecognizedOption(String),
    #[error("{0}")]
    BadArguments(String),
}

/// Files written by one run of `gen_eval`.
#[derive(Debug, Clone)]
pub struct GeneratedScripts {
    pub r_scripts: Vec<PathBuf>,
    pub qsub_scripts: Vec<PathBuf>,
    pub run_script: PathBuf,
}

impl GeneratedScripts {
    pub fn all(&self) -> Vec<&Path> {
        self.r_scripts
            .iter()
            .chain(self.qsub_scripts.iter())
            .chain(std::iter::once(&self.run_script))
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Writes the analysis, job, and run scripts for a validated
/// configuration.
pub fn gen_eval(config: &Config, generator: &Generator) -> Result<GeneratedScripts, anyhow::Error> {
    let r_scripts = generate_r(config, generator)?;
    let qsub_scripts = generate_qsub(config, generator)?;
    let run_script = generate_run(config, generator)?;

    Ok(GeneratedScripts {
        r_scripts,
        qsub_scripts,
        run_script,
    })
}

fn write_script(path: &Path, content: &str, executable: bool) -> Result<(), anyhow::Error> {
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

    #[cfg(unix)]
    {
        if executable {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
    }
    #[cfg(not(unix))]
    let _ = executable;

    debug!("wrote {}", path.display());
    Ok(())
}

/// Escapes text for use inside a double-quoted R string.
fn r_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

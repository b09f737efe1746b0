use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::gen_eval::{CLI, GenEvalError, Generator, DEFAULT_PLOT_DEC};

/// Every long flag accepted by `gen-eval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliOption {
    Sid,
    CnvScale,
    OutDir,
    XClone,
    Numbat,
    Casper,
    CopyKat,
    InferCnv,
    Truth,
    CellAnno,
    GeneAnno,
    RepoScripts,
    PlotSid,
    PlotDec,
    Version,
    Help,
}

impl CliOption {
    /// Options in the order they are listed in the usage message.
    pub const ALL: [CliOption; 16] = [
        CliOption::Sid,
        CliOption::CnvScale,
        CliOption::OutDir,
        CliOption::XClone,
        CliOption::Numbat,
        CliOption::Casper,
        CliOption::CopyKat,
        CliOption::InferCnv,
        CliOption::Truth,
        CliOption::CellAnno,
        CliOption::GeneAnno,
        CliOption::RepoScripts,
        CliOption::PlotSid,
        CliOption::PlotDec,
        CliOption::Version,
        CliOption::Help,
    ];

    pub fn long(&self) -> &'static str {
        match self {
            CliOption::Sid => "sid",
            CliOption::CnvScale => "cnvScale",
            CliOption::OutDir => "outdir",
            CliOption::XClone => "xclone",
            CliOption::Numbat => "numbat",
            CliOption::Casper => "casper",
            CliOption::CopyKat => "copykat",
            CliOption::InferCnv => "infercnv",
            CliOption::Truth => "truth",
            CliOption::CellAnno => "cellAnno",
            CliOption::GeneAnno => "geneAnno",
            CliOption::RepoScripts => "repoScripts",
            CliOption::PlotSid => "plotSid",
            CliOption::PlotDec => "plotDec",
            CliOption::Version => "version",
            CliOption::Help => "help",
        }
    }

    /// Placeholder for the option value, or `None` for a bare flag.
    pub fn value_name(&self) -> Option<&'static str> {
        match self {
            CliOption::Sid | CliOption::CnvScale | CliOption::PlotSid => Some("STR"),
            CliOption::OutDir
            | CliOption::XClone
            | CliOption::Numbat
            | CliOption::Casper
            | CliOption::CopyKat
            | CliOption::InferCnv
            | CliOption::RepoScripts => Some("DIR"),
            CliOption::Truth | CliOption::CellAnno | CliOption::GeneAnno => Some("FILE"),
            CliOption::PlotDec => Some("INT"),
            CliOption::Version | CliOption::Help => None,
        }
    }

    pub fn takes_value(&self) -> bool {
        self.value_name().is_some()
    }

    pub fn help(&self) -> String {
        match self {
            CliOption::Sid => "Sample ID.".to_string(),
            CliOption::CnvScale => "CNV scale, gene or arm.".to_string(),
            CliOption::OutDir => "Output dir.".to_string(),
            CliOption::XClone => "XClone dir.".to_string(),
            CliOption::Numbat => "Numbat dir.".to_string(),
            CliOption::Casper => "CaSpER dir.".to_string(),
            CliOption::CopyKat => "CopyKAT dir.".to_string(),
            CliOption::InferCnv => "InferCNV dir.".to_string(),
            CliOption::Truth => "Ground truth file.".to_string(),
            CliOption::CellAnno => "Cell annotation file.".to_string(),
            CliOption::GeneAnno => "Gene annotation file.".to_string(),
            CliOption::RepoScripts => "Repo scripts dir.".to_string(),
            CliOption::PlotSid => "Sample ID shown in figure.".to_string(),
            CliOption::PlotDec => format!("Decimal in plots [{}]", DEFAULT_PLOT_DEC),
            CliOption::Version => "Print version and exit.".to_string(),
            CliOption::Help => "Print this message and exit.".to_string(),
        }
    }

    /// Resolves a long flag name, without the leading `--`.
    ///
    /// Matching ignores case. A unique prefix of a flag name also
    /// selects that flag, e.g., `--out` for `--outdir`.
    ///
    /// # Errors
    ///
    /// `UnrecognizedOption` when the name matches no flag, or is a
    /// prefix of more than one.
    pub fn from_long(name: &str) -> Result<CliOption, GenEvalError> {
        let lower = name.to_lowercase();

        if let Some(opt) = Self::ALL
            .iter()
            .find(|opt| opt.long().to_lowercase() == lower)
        {
            return Ok(*opt);
        }

        let candidates: Vec<&CliOption> = Self::ALL
            .iter()
            .filter(|opt| !lower.is_empty() && opt.long().to_lowercase().starts_with(&lower))
            .collect();

        match candidates.as_slice() {
            [opt] => Ok(**opt),
            _ => Err(GenEvalError::UnrecognizedOption(format!("--{}", name))),
        }
    }
}

/// What the command line asks for.
#[derive(Debug, Clone)]
pub enum CliRequest {
    Run(CLI),
    Help,
    Version,
    /// No arguments at all.
    Usage,
}

/// Builds the clap command. Automatic help and version handling is
/// disabled so that both print the usage layout of `usage()` instead.
pub fn command(generator: &Generator) -> Command {
    let mut cmd = Command::new(generator.name)
        .version(generator.version)
        .about("Generate running scripts for CNV benchmark evaluation")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true);

    for opt in CliOption::ALL.iter() {
        let arg = Arg::new(opt.long()).long(opt.long()).help(opt.help());
        cmd = cmd.arg(match opt.value_name() {
            Some(value_name) => arg
                .value_name(value_name)
                .action(ArgAction::Set)
                .allow_hyphen_values(true),
            None => arg.action(ArgAction::SetTrue),
        });
    }

    cmd
}

/// Rewrites each `--flag` into its canonical spelling.
///
/// Values are passed through untouched, including values that look
/// like flags when they follow an option that takes one.
fn normalize_args(args: &[String]) -> Result<Vec<String>, GenEvalError> {
    let mut normalized = Vec::with_capacity(args.len());
    let mut expect_value = false;

    for arg in args.iter() {
        if expect_value {
            normalized.push(arg.to_string());
            expect_value = false;
            continue;
        }

        match arg.strip_prefix("--") {
            Some(flag) if !flag.is_empty() => {
                let (name, value) = match flag.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (flag, None),
                };
                let opt = CliOption::from_long(name)?;
                match value {
                    Some(value) => normalized.push(format!("--{}={}", opt.long(), value)),
                    None => {
                        expect_value = opt.takes_value();
                        normalized.push(format!("--{}", opt.long()));
                    }
                }
            }
            _ => normalized.push(arg.to_string()),
        }
    }

    Ok(normalized)
}

/// Parses command-line arguments, excluding the program name.
///
/// # Errors
///
/// `UnrecognizedOption` for a flag that names no option, and
/// `BadArguments` for any other malformed command line, e.g., an
/// option missing its value.
pub fn parse_args<I, T>(generator: &Generator, args: I) -> Result<CliRequest, GenEvalError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<String> = args
        .into_iter()
        .map(|a| {
            let arg: OsString = a.into();
            arg.to_string_lossy().into_owned()
        })
        .collect();

    if args.is_empty() {
        return Ok(CliRequest::Usage);
    }

    let normalized = normalize_args(&args)?;

    let matches = command(generator)
        .try_get_matches_from(std::iter::once(generator.name.to_string()).chain(normalized))
        .map_err(|e| match e.kind() {
            clap::error::ErrorKind::UnknownArgument => GenEvalError::UnrecognizedOption(
                e.get(clap::error::ContextKind::InvalidArg)
                    .map_or_else(|| e.to_string(), |arg| arg.to_string()),
            ),
            _ => GenEvalError::BadArguments(e.to_string().trim_end().to_string()),
        })?;

    if matches.get_flag(CliOption::Help.long()) {
        return Ok(CliRequest::Help);
    }
    if matches.get_flag(CliOption::Version.long()) {
        return Ok(CliRequest::Version);
    }

    Ok(CliRequest::Run(cli_from_matches(&matches)))
}

fn cli_from_matches(matches: &ArgMatches) -> CLI {
    let mut cli = CLI::default();
    for opt in CliOption::ALL.iter().filter(|opt| opt.takes_value()) {
        if let Some(value) = matches.get_one::<String>(opt.long()) {
            cli.set(*opt, value.to_string());
        }
    }
    cli
}

/// Usage message listing every option.
pub fn usage(generator: &Generator) -> String {
    let mut s = String::new();
    s.push('\n');
    s.push_str(&format!("Version: {}\n", generator.version));
    s.push_str(&format!("Usage: {} <options>\n", generator.name));
    s.push('\n');
    s.push_str("Options:\n");
    for opt in CliOption::ALL.iter() {
        let flag = match opt.value_name() {
            Some(value_name) => format!("--{} {}", opt.long(), value_name),
            None => format!("--{}", opt.long()),
        };
        s.push_str(&format!("  {:<23}{}\n", flag, opt.help()));
    }
    s.push('\n');
    s
}

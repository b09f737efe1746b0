use std::path::PathBuf;

use log::info;

use crate::gen_eval::{r_escape, write_script, CnvType, Config, Generator};
use crate::template::{Bindings, Template, TemplateError};

const R_TEMPLATE: &str = r#"{{banner}}
# {{script}} - benchmark on {{sid}} dataset

library(cardelino)
library(dplyr)
library(ggplot2)
library(stringr)

args <- commandArgs(trailingOnly = TRUE)
work_dir <- args[1]
setwd(work_dir)

source("benchmark.R")
source("main.R")
source("utils.R")

sid <- "{{sid}}"
cnv_type <- "{{cnv_type}}"    # could be "copy_gain", "copy_loss", or "loh".
cnv_scale <- "{{cnv_scale}}"        # could be "gene" or "arm".

method_list <- {{method_list}}
method_sub_list <- {{method_sub_list}}
mtx_type_list <- {{mtx_type_list}}
dat_dir_list <- {{dat_dir_list}}

cell_anno_fn <- "{{cell_anno_fn}}"
gene_anno_fn <- "{{gene_anno_fn}}"
truth_fn <- "{{truth_fn}}"
out_dir <- "result"

bm_main(
  sid, cnv_type, cnv_scale,
  method_list, method_sub_list, mtx_type_list, dat_dir_list,
  cell_anno_fn, gene_anno_fn, truth_fn, out_dir,
  overlap_mode = "customize", filter_func = NULL,
  metrics = c("ROC", "PRC"), max_n_cutoff = 1000,
  plot_sid = {{plot_sid}},
  plot_dec = {{plot_dec}}, plot_legend_xmin = 0.7, plot_legend_ymin = 0.25,
  plot_width = 6.5, plot_height = 5, plot_dpi = 600,
  verbose = TRUE, save_all = FALSE)

"#;

/// One method benchmarked by an analysis script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Tool that produced the result matrix.
    pub name: &'static str,
    /// Variant of the tool output, used to label the method in plots.
    pub sub_name: &'static str,
    /// Kind of matrix: `expr`, `baf`, or `prob`.
    pub mtx_type: &'static str,
    pub dir: PathBuf,
}

impl Method {
    fn new(name: &'static str, sub_name: &'static str, mtx_type: &'static str, dir: PathBuf) -> Self {
        Method {
            name,
            sub_name,
            mtx_type,
            dir,
        }
    }
}

/// Returns the methods compared for one CNV type, in plotting order.
///
/// Copy gain and loss compare all five tools. LOH compares two CaSpER
/// BAF summaries (median and median deviation, read from the same
/// directory), Numbat, and XClone.
pub fn methods(config: &Config, cnv_type: CnvType) -> Vec<Method> {
    let xclone_dir = cnv_type.xclone_prob_dir(&config.xclone_dir);

    match cnv_type {
        CnvType::CopyGain | CnvType::CopyLoss => vec![
            Method::new("casper", "casper", "expr", config.casper_dir.clone()),
            Method::new("copykat", "copykat", "expr", config.copykat_dir.clone()),
            Method::new("infercnv", "infercnv", "expr", config.infercnv_dir.clone()),
            Method::new("numbat", "numbat", "prob", config.numbat_dir.clone()),
            Method::new("xclone", "xclone", "prob", xclone_dir),
        ],
        CnvType::Loh => vec![
            Method::new("casper", "casper_median", "baf", config.casper_dir.clone()),
            Method::new("casper", "casper_medianDev", "baf", config.casper_dir.clone()),
            Method::new("numbat", "numbat", "prob", config.numbat_dir.clone()),
            Method::new("xclone", "xclone", "prob", xclone_dir),
        ],
    }
}

/// `c("a", "b")` on one line.
fn r_vector<'a, I: IntoIterator<Item = &'a str>>(items: I) -> String {
    let quoted: Vec<String> = items
        .into_iter()
        .map(|item| format!("\"{}\"", r_escape(item)))
        .collect();
    format!("c({})", quoted.join(", "))
}

/// `c(` then one quoted item per line, then `)`.
fn r_vector_lines<'a, I: IntoIterator<Item = &'a str>>(items: I) -> String {
    let quoted: Vec<String> = items
        .into_iter()
        .map(|item| format!("  \"{}\"", r_escape(item)))
        .collect();
    format!("c(\n{}\n)", quoted.join(",\n"))
}

/// Renders the analysis script for one CNV type.
pub fn render_r(
    config: &Config,
    generator: &Generator,
    cnv_type: CnvType,
) -> Result<String, TemplateError> {
    let methods = methods(config, cnv_type);
    let dirs: Vec<String> = methods
        .iter()
        .map(|m| m.dir.to_string_lossy().into_owned())
        .collect();

    let mut bindings = Bindings::new();
    bindings.insert("banner", generator.banner());
    bindings.insert("script", config.r_script_name());
    bindings.insert("sid", r_escape(config.sid()));
    bindings.insert("cnv_type", cnv_type.to_string());
    bindings.insert("cnv_scale", config.cnv_scale().to_string());
    bindings.insert("method_list", r_vector(methods.iter().map(|m| m.name)));
    bindings.insert("method_sub_list", r_vector(methods.iter().map(|m| m.sub_name)));
    bindings.insert("mtx_type_list", r_vector(methods.iter().map(|m| m.mtx_type)));
    bindings.insert("dat_dir_list", r_vector_lines(dirs.iter().map(String::as_str)));
    bindings.insert("cell_anno_fn", r_escape(&config.cell_anno_fn.to_string_lossy()));
    bindings.insert("gene_anno_fn", r_escape(&config.gene_anno_fn.to_string_lossy()));
    bindings.insert("truth_fn", r_escape(&config.truth_fn.to_string_lossy()));
    bindings.insert(
        "plot_sid",
        config
            .plot_sid()
            .map_or_else(|| "NULL".to_string(), |s| format!("\"{}\"", r_escape(s))),
    );
    bindings.insert("plot_dec", config.plot_dec().to_string());

    Template::new(R_TEMPLATE).render(&bindings)
}

/// Writes `<sid>.eval.R` into each CNV type subdirectory.
pub fn generate_r(config: &Config, generator: &Generator) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut out_fns = Vec::new();
    for cnv_type in CnvType::ALL.iter() {
        let out_fn = config.cnv_dir(*cnv_type).join(config.r_script_name());
        let script = render_r(config, generator, *cnv_type)?;
        write_script(&out_fn, &script, false)?;
        info!("Wrote {} R script {}", cnv_type, out_fn.display());
        out_fns.push(out_fn);
    }
    Ok(out_fns)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::gen_eval::testutil::*;

    fn gen_config(scale: &str) -> (tempfile::TempDir, Config) {
        let (tmp, cli) = fixture("P1", scale);
        let config = Config::new(&cli).unwrap();
        (tmp, config)
    }

    #[test]
    fn loh_methods() {
        let (tmp, config) = gen_config("gene");
        let loh = methods(&config, CnvType::Loh);

        assert_eq!(loh.len(), 4);
        assert_eq!(loh[0].dir, loh[1].dir);
        assert_eq!(loh[0].dir, tmp.path().join("tools").join("casper"));
        assert_eq!(
            loh.iter().map(|m| m.sub_name).collect::<Vec<_>>(),
            vec!["casper_median", "casper_medianDev", "numbat", "xclone"]
        );
        assert_eq!(
            loh.iter().map(|m| m.mtx_type).collect::<Vec<_>>(),
            vec!["baf", "baf", "prob", "prob"]
        );
        assert_eq!(
            loh[3].dir,
            tmp.path().join("tools").join("xclone").join("prob_combine_loh")
        );
    }

    #[test]
    fn gain_loss_methods() {
        let (tmp, config) = gen_config("arm");
        let xclone = tmp.path().join("tools").join("xclone");

        for (cnv_type, subdir) in [
            (CnvType::CopyGain, "prob_combine_copygain"),
            (CnvType::CopyLoss, "prob_combine_copyloss"),
        ]
        .into_iter()
        {
            let ms = methods(&config, cnv_type);
            assert_eq!(ms.len(), 5);
            assert_eq!(
                ms.iter().map(|m| m.name).collect::<Vec<_>>(),
                vec!["casper", "copykat", "infercnv", "numbat", "xclone"]
            );
            assert_eq!(
                ms.iter().map(|m| m.mtx_type).collect::<Vec<_>>(),
                vec!["expr", "expr", "expr", "prob", "prob"]
            );
            assert_eq!(ms[1].dir, tmp.path().join("tools").join("copykat"));
            assert_eq!(ms[4].dir, xclone.join(subdir));
        }
    }

    #[test]
    fn vectors() {
        assert_eq!(r_vector(vec!["a", "b"]), "c(\"a\", \"b\")");
        assert_eq!(r_vector_lines(vec!["/x", "/y"]), "c(\n  \"/x\",\n  \"/y\"\n)");
    }

    #[test]
    fn render_body() {
        let (tmp, config) = gen_config("gene");
        let generator = Generator::new("gen-eval", "0.1.0");
        let script = render_r(&config, &generator, CnvType::CopyGain).unwrap();

        assert!(script.starts_with("# This file was generated by \"gen-eval (v0.1.0).\"\n"));
        assert!(script.contains("# P1.eval.R - benchmark on P1 dataset\n"));
        assert!(script.contains("sid <- \"P1\"\n"));
        assert!(script.contains("cnv_type <- \"copy_gain\""));
        assert!(script.contains("cnv_scale <- \"gene\""));
        assert!(script.contains(
            "method_sub_list <- c(\"casper\", \"copykat\", \"infercnv\", \"numbat\", \"xclone\")\n"
        ));
        let xclone_dir = tmp
            .path()
            .join("tools")
            .join("xclone")
            .join("prob_combine_copygain");
        assert!(script.contains(&format!("  \"{}\"\n)\n", path_str(&xclone_dir))));
        let truth = tmp.path().join("input").join("truth.tsv");
        assert!(script.contains(&format!("truth_fn <- \"{}\"\n", path_str(&truth))));
        assert!(script.contains("out_dir <- \"result\"\n"));
        assert!(script.contains("plot_sid = NULL,\n"));
        assert!(script.contains("plot_dec = 3, plot_legend_xmin = 0.7"));
        assert!(script.contains("max_n_cutoff = 1000"));
        assert!(script.contains("plot_width = 6.5, plot_height = 5, plot_dpi = 600"));
        assert!(script.contains("verbose = TRUE, save_all = FALSE)"));
    }

    #[test]
    fn render_plot_options() {
        let (_tmp, mut cli) = fixture("P1", "arm");
        cli.plot_sid = Some("Patient \"1\"".to_string());
        cli.plot_dec = Some("2".to_string());
        let config = Config::new(&cli).unwrap();

        let generator = Generator::default();
        for cnv_type in CnvType::ALL.iter() {
            let script = render_r(&config, &generator, *cnv_type).unwrap();
            assert!(script.contains("cnv_scale <- \"arm\""));
            assert!(script.contains("plot_sid = \"Patient \\\"1\\\"\",\n"));
            assert!(script.contains("  plot_dec = 2, "));
        }
    }

    #[test]
    fn write_all() {
        let (_tmp, config) = gen_config("gene");
        let out_fns = generate_r(&config, &Generator::default()).unwrap();

        assert_eq!(
            out_fns,
            vec![
                config.out_dir().join("copy_gain").join("P1.eval.R"),
                config.out_dir().join("copy_loss").join("P1.eval.R"),
                config.out_dir().join("loh").join("P1.eval.R"),
            ]
        );

        let loh = fs::read_to_string(&out_fns[2]).unwrap();
        assert!(loh.contains("cnv_type <- \"loh\""));
        assert!(loh.contains("method_list <- c(\"casper\", \"casper\", \"numbat\", \"xclone\")\n"));

        // rewriting replaces the old contents
        fs::write(&out_fns[0], "stale").unwrap();
        generate_r(&config, &Generator::default()).unwrap();
        assert!(fs::read_to_string(&out_fns[0]).unwrap().contains("copy_gain"));
    }
}

use std::path::PathBuf;

use log::info;

use crate::gen_eval::{write_script, CnvType, Config, Generator};
use crate::template::{Bindings, Template, TemplateError};

// `set -eux` comes after `source` and `conda activate` because the
// bashrc may reference unbound variables.
const QSUB_TEMPLATE: &str = r#"#!/bin/bash
{{banner}}
#PBS -N {{job_name}}
#PBS -q cgsd
#PBS -l nodes=1:ppn=5,mem=200g,walltime=100:00:00
#PBS -o {{job_name}}.out
#PBS -e {{job_name}}.err

source ~/.bashrc
conda activate XCLBM

set -eux

work_dir=`cd $(dirname $0) && pwd`
if [ -n "$PBS_O_WORKDIR" ]; then
    work_dir=$PBS_O_WORKDIR
fi

scripts_dir={{scripts_dir}}
cp  $scripts_dir/evaluate/benchmark.R  $work_dir
cp  $scripts_dir/evaluate/main.R  $work_dir
cp  $scripts_dir/evaluate/utils.R  $work_dir

Rscript  $work_dir/{{r_script}}  $work_dir

set +ux
conda deactivate
echo "All Done!"

"#;

/// Scheduler job name, also the stem of the job's stdout and stderr
/// files: `<scale>_<cnv_type>_<sid>`.
pub fn job_name(config: &Config, cnv_type: CnvType) -> String {
    format!("{}_{}_{}", config.cnv_scale(), cnv_type, config.sid())
}

/// Renders the batch job script running the analysis script for one
/// CNV type.
pub fn render_qsub(
    config: &Config,
    generator: &Generator,
    cnv_type: CnvType,
) -> Result<String, TemplateError> {
    let mut bindings = Bindings::new();
    bindings.insert("banner", generator.banner());
    bindings.insert("job_name", job_name(config, cnv_type));
    bindings.insert(
        "scripts_dir",
        config.repo_scripts_dir().to_string_lossy().into_owned(),
    );
    bindings.insert("r_script", config.r_script_name());

    Template::new(QSUB_TEMPLATE).render(&bindings)
}

/// Writes an executable `<sid>.eval.qsub.sh` next to each analysis
/// script.
pub fn generate_qsub(
    config: &Config,
    generator: &Generator,
) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut out_fns = Vec::new();
    for cnv_type in CnvType::ALL.iter() {
        let out_fn = config.cnv_dir(*cnv_type).join(config.qsub_script_name());
        let script = render_qsub(config, generator, *cnv_type)?;
        write_script(&out_fn, &script, true)?;
        info!("Wrote {} qsub script {}", cnv_type, out_fn.display());
        out_fns.push(out_fn);
    }
    Ok(out_fns)
}

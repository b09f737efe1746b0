use std::path::PathBuf;

use log::info;

use crate::gen_eval::{write_script, CnvType, Config, Generator};
use crate::template::{Bindings, Template, TemplateError};

const RUN_HEADER: &str = "#!/bin/bash\n{{banner}}\n";

const RUN_SUBMIT: &str = "
cd {{run_dir}}
qsub {{qsub_script}}
";

const RUN_FOOTER: &str = "
echo All Done!

";

/// Renders `run.sh`, which submits the job for each CNV type in
/// turn: copy gain, copy loss, then LOH.
pub fn render_run(config: &Config, generator: &Generator) -> Result<String, TemplateError> {
    let mut bindings = Bindings::new();
    bindings.insert("banner", generator.banner());
    bindings.insert("qsub_script", config.qsub_script_name());

    let mut script = Template::new(RUN_HEADER).render(&bindings)?;

    let submit = Template::new(RUN_SUBMIT);
    for cnv_type in CnvType::ALL.iter() {
        bindings.insert(
            "run_dir",
            config.cnv_dir(*cnv_type).to_string_lossy().into_owned(),
        );
        script.push_str(&submit.render(&bindings)?);
    }

    script.push_str(RUN_FOOTER);
    Ok(script)
}

/// Writes the executable `<outdir>/run.sh`.
pub fn generate_run(config: &Config, generator: &Generator) -> Result<PathBuf, anyhow::Error> {
    let out_fn = config.out_dir().join("run.sh");
    let script = render_run(config, generator)?;
    write_script(&out_fn, &script, true)?;
    info!("Wrote run script {}", out_fn.display());
    Ok(out_fn)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::gen_eval::testutil::*;

    #[test]
    fn submit_order() {
        let (_tmp, cli) = fixture("P1", "gene");
        let config = Config::new(&cli).unwrap();
        let generator = Generator::new("gen-eval", "0.1.0");
        let script = render_run(&config, &generator).unwrap();

        let mut expected = "#!/bin/bash\n# This file was generated by \"gen-eval (v0.1.0).\"\n"
            .to_string();
        for name in ["copy_gain", "copy_loss", "loh"].iter() {
            expected.push_str(&format!(
                "\ncd {}\nqsub P1.eval.qsub.sh\n",
                path_str(&config.out_dir().join(name))
            ));
        }
        expected.push_str("\necho All Done!\n\n");

        assert_eq!(script, expected);
    }

    #[test]
    fn write_run() {
        let (tmp, cli) = fixture("P1", "arm");
        let config = Config::new(&cli).unwrap();
        let out_fn = generate_run(&config, &Generator::default()).unwrap();

        assert_eq!(out_fn, tmp.path().join("out").join("run.sh"));
        let script = fs::read_to_string(&out_fn).unwrap();
        assert_eq!(script.matches("qsub P1.eval.qsub.sh\n").count(), 3);
    }
}

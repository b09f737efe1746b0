use std::env;
use std::io;
use std::io::Write;
use std::process;

use env_logger::Env;
use log::{debug, info};

use cnvbench::gen_eval::*;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match wrapper() {
        Err(e) => {
            io::stderr().write(format!("{:#}\n", e).as_bytes()).unwrap();
            process::exit(1);
        }
        Ok(0) => (),
        Ok(code) => process::exit(code),
    };
}

/// Returns the process exit status for outcomes that are not errors
/// as such: usage, help, version, and unknown options.
fn wrapper() -> Result<i32, anyhow::Error> {
    let generator = Generator::default();

    let cli = match parse_args(&generator, env::args_os().skip(1)) {
        Ok(CliRequest::Run(cli)) => cli,
        Ok(CliRequest::Usage) | Ok(CliRequest::Help) => {
            eprint!("{}", usage(&generator));
            return Ok(1);
        }
        Ok(CliRequest::Version) => {
            eprintln!("{}", generator.version);
            return Ok(1);
        }
        Err(GenEvalError::UnrecognizedOption(opt)) => {
            eprintln!("[E::main] invalid option: '{}'.", opt);
            return Ok(-1);
        }
        Err(e) => return Err(e.into()),
    };
    debug!("cli: {:?}", &cli);

    let config = Config::new(&cli)?;
    let scripts = gen_eval(&config, &generator)?;

    println!("R scripts: {:?}\n", scripts.r_scripts);
    println!("qsub scripts: {:?}\n", scripts.qsub_scripts);
    println!("run script: {:?}\n", scripts.run_script);

    info!("Generated {} files under {}", scripts.all().len(), config.out_dir().display());
    println!("[I::main] All Done!");

    Ok(0)
}

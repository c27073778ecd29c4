use std::process::ExitCode;

use legfit::{
    app,
    opts::{Config, Opts},
};

fn main() -> ExitCode {
    let opts = Opts::parse();

    env_logger::Builder::new()
        .filter_level(opts.log_level)
        .format_timestamp(None)
        .init();

    let result = Config::try_from(opts).and_then(|config| app::run(&config));
    match result {
        Ok(report) => {
            log::info!("done: {} terms", report.model.base());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("legfit: {err}");
            ExitCode::FAILURE
        }
    }
}

use log::debug;

use minish::shell::{Session, Shell};
use minish::utils::config::Config;
use minish::utils::log::init_logger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new();
    if let Err(err) = init_logger(&config) {
        eprintln!("minish: logging disabled: {}", err);
    }
    debug!("config loaded from {}", config.config_dir.display());

    let session = Session::new()?;
    let mut shell = Shell::new(&config, session);
    shell.run()
}

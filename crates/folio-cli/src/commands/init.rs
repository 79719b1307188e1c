//! Init command - write the default configuration file.

use folio_core::Config;
use std::io::{self, Write};
use std::path::Path;

/// Run the init command.
pub fn run(path: Option<&Path>, skip_confirm: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };

    if path.exists() && !skip_confirm {
        print!(
            "{} already exists. Overwrite it with the defaults? [y/N] ",
            path.display()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    Config::default().save_to(&path)?;
    println!("Configuration written to {}", path.display());

    Ok(())
}

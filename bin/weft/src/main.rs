//! Weft CLI
//!
//! Builds a site described entirely by `weft.toml`: the configured commands
//! run, then assets and public files are copied. Sites that render pages
//! call [`weft::main`] from their own binary instead.

use color_eyre::eyre::Result;
use weft::generator::ConfigureFn;

fn main() -> Result<()> {
    weft::main(ConfigureFn::new(|_site, _cx| Ok(())))
}

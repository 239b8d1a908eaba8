use crate::prelude::*;
use clap::Parser;

mod auth;
mod client;
mod config;
mod error;
mod fetch;
mod migrate;
mod prelude;

#[cfg(test)]
mod testing;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Prepend a \"this content has moved\" notice to every post of a WordPress.com blog. Runs as a dry run unless --commit is given."
)]
pub struct App {
    #[clap(flatten)]
    migrate: migrate::MigrateArgs,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "WPEXIT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    crate::migrate::run(app.migrate, app.global)
        .await
        .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

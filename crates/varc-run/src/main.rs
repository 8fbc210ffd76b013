use clap::Parser;

fn main() -> miette::Result<()> {
    varc_run::Cli::parse().run()
}

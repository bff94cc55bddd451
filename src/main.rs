use anyhow::Result;

fn main() -> Result<()> {
    let args = sortd::cli::parse();
    sortd::app::run(args)
}

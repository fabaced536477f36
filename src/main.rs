use anyhow::Result;

fn main() -> Result<()> {
    grid_filter::cli::run()
}

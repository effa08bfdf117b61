//! Instruments command implementation

use anyhow::Result;
use index_volatility::Catalog;
use std::process::ExitCode;

pub fn run() -> Result<ExitCode> {
    let catalog = Catalog::combined();

    println!("{:<28} {}", "INSTRUMENT", "TICKER");
    println!("{}", "-".repeat(44));
    for instrument in catalog.instruments() {
        println!("{:<28} {}", instrument.display_name, instrument.ticker);
    }
    println!("{}", "-".repeat(44));
    println!("{} instruments", catalog.len());

    Ok(ExitCode::SUCCESS)
}

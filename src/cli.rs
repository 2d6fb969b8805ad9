// Command-line argument surface.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "courtvalue")]
#[command(about = "Rank NBA post-season players by price per point", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Re-scrape even if the local store already exists
    #[arg(long)]
    pub refresh: bool,

    /// Print comma-separated output instead of an aligned table
    #[arg(long = "print-csv", visible_alias = "print_csv")]
    pub print_csv: bool,
}

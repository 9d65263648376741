use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Print the First/Follow sets and the parse table
    #[arg(long)]
    pub print_analysis: bool,

    /// Token-stream file to parse (one token per line: name [value [type [extra]]])
    #[arg(short, long, value_name = "FILE")]
    pub input: Vec<PathBuf>,

    /// Write a standalone parser as Rust source
    #[arg(long, value_name = "FILE")]
    pub parser_out: Option<PathBuf>,

    /// Save the intermediate code of the last parse
    #[arg(long, value_name = "FILE")]
    pub code_out: Option<PathBuf>,
}

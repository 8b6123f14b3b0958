//! Build script rendering `termframe` manual pages from the CLI definition.
//!
//! One page is written for the top-level command and one per subcommand,
//! named `termframe-<subcommand>.1`.

use std::{fs, io, path::Path};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

fn render(command: clap::Command, out_dir: &Path, file_name: &str) -> io::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    Man::new(command).render(&mut buf)?;
    fs::write(out_dir.join(file_name), buf)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = Path::new("target/generated-man");
    fs::create_dir_all(out_dir)?;

    let command = cli::Cli::command().name("termframe");
    for sub in command.get_subcommands() {
        let name = format!("termframe-{}", sub.get_name());
        render(sub.clone().name(name.clone()), out_dir, &format!("{name}.1"))?;
    }
    render(command, out_dir, "termframe.1")?;

    Ok(())
}

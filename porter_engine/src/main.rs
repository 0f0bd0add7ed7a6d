#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Porter **
//! Item-hauling game on randomly generated room graphs

use porter_engine::save_files::resolve_autosave_path;
use porter_engine::style::GameStyle;
use porter_engine::{PORTER_VERSION, run_menu};

use anyhow::{Result, bail};
use colored::Colorize;
use log::info;

use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();
    let backup_arg = parse_cli(&std::env::args().skip(1).collect::<Vec<_>>())?;
    let autosave_path = resolve_autosave_path(backup_arg);
    info!("Start: autosaves go to {}", autosave_path.display());

    println!("{:^60}", format!("PORTER v{PORTER_VERSION}").bright_yellow().underline());
    println!("{:^60}", "carry every item home".heading_style());
    println!();
    println!("  generate-random-map <rooms> <file>");
    println!("  map-from-dir-tree <dir> <file>");
    println!("  start-game <mapfile>");
    println!("  load-game <savefile>");
    println!("  exit");
    println!();
    println!("{}", format!("Autosave file: {}", autosave_path.display()).notice_style());

    run_menu(&autosave_path)
}

/// Accepts an optional `-b <backup-path>` pair and nothing else.
fn parse_cli(args: &[String]) -> Result<Option<PathBuf>> {
    match args {
        [] => Ok(None),
        [flag, path] if flag == "-b" => Ok(Some(PathBuf::from(path))),
        _ => bail!("usage: porter_engine [-b backup-path]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_no_override() {
        assert_eq!(parse_cli(&[]).unwrap(), None);
    }

    #[test]
    fn backup_flag_takes_a_path() {
        let args = vec!["-b".to_string(), "/tmp/slot".to_string()];
        assert_eq!(parse_cli(&args).unwrap(), Some(PathBuf::from("/tmp/slot")));
    }

    #[test]
    fn stray_arguments_are_rejected() {
        assert!(parse_cli(&["-x".to_string(), "y".to_string()]).is_err());
        assert!(parse_cli(&["-b".to_string()]).is_err());
    }
}

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::store::Store;

pub const BOARD_DIR: &str = ".hhf";
pub const STORE_FILE: &str = "board.db";

pub fn run(path: &Path) -> Result<()> {
    let board_dir = path.join(BOARD_DIR);

    if board_dir.exists() {
        println!("Board already initialized at {}", board_dir.display());
        return Ok(());
    }

    fs::create_dir_all(&board_dir).context("Failed to create .hhf directory")?;
    Store::open(&board_dir.join(STORE_FILE)).context("Failed to create board store")?;

    println!("Initialized board in {}", board_dir.display());
    println!("\nNext steps:");
    println!("  hhf name <you>                  # Remember your display name");
    println!("  hhf ask -a <you> -s Math ...    # Post a question");
    println!("  hhf board                       # Browse interactively");

    Ok(())
}

use anyhow::Result;

use crate::store::Store;

pub fn run(store: &Store, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            let name = name.trim();
            store.set_current_name(name)?;
            if name.is_empty() {
                println!("Cleared the remembered name.");
            } else {
                println!("Hello, {}! Your posts will be owned by this name.", name);
            }
        }
        None => {
            let name = store.current_name()?;
            if name.is_empty() {
                println!("No name set. Run 'hhf name <name>' to pick one.");
            } else {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

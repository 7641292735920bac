//! `state` subcommands for the saved blob.

use clap::Subcommand;
use storemap_core::{PersistedState, STATE_KEY};
use storemap_persist::clear_state;

use crate::App;

#[derive(Debug, Subcommand)]
pub enum StateCommands {
    /// Print the saved state
    Show,
    /// Forget the saved state; the next run starts fresh
    Clear,
}

pub(crate) fn run_state(app: &mut App, command: StateCommands, json: bool) -> anyhow::Result<()> {
    match command {
        StateCommands::Show => {
            let snapshot = PersistedState::capture(app.session.selection());
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }
            let saved = app.store.get(STATE_KEY)?.is_some();
            println!("medium:     {}", app.store.name());
            println!("saved:      {}", if saved { "yes" } else { "no" });
            println!("tab:        {}", app.session.selection().mode);
            println!("clustering: {}", snapshot.clustering);
            println!(
                "single:     types={:?} county={:?} district={:?}",
                snapshot.single_types, snapshot.single_county, snapshot.single_district
            );
            println!(
                "multi:      types={:?} regions={:?}",
                snapshot.multi_types, snapshot.regions
            );
            println!(
                "view:       {}, {} z{}",
                snapshot.viewport.lat, snapshot.viewport.lng, snapshot.viewport.zoom
            );
        }
        StateCommands::Clear => {
            app.discard_pending_writes();
            clear_state(app.store.as_ref())?;
            println!("saved state cleared");
        }
    }
    Ok(())
}

//! `filter` subcommands: type checkboxes, the single-tab dropdowns and the
//! multi-tab region tree.

use clap::Subcommand;
use storemap_core::{FilterMode, RegionTarget};
use storemap_session::StoreMapSession;

use crate::output::TerminalRenderer;
use crate::TabArg;

#[derive(Debug, Subcommand)]
pub enum FilterCommands {
    /// Set the store types for a tab (no types means every type)
    Types {
        types: Vec<String>,
        /// Tab to change (defaults to the active tab)
        #[arg(long, value_enum)]
        tab: Option<TabArg>,
    },
    /// Pick the single-tab county (omit to clear)
    County { county: Option<String> },
    /// Pick the single-tab district (omit to clear)
    District { district: Option<String> },
    /// Toggle a county checkbox, or one district with --district
    Region {
        county: String,
        #[arg(long)]
        district: Option<String>,
    },
    /// Toggle every county under a direction
    Direction { direction: String },
    /// Clear a tab's selections
    Reset {
        #[arg(long, value_enum)]
        tab: Option<TabArg>,
    },
}

pub(crate) fn run_filter(
    session: &mut StoreMapSession<TerminalRenderer>,
    command: FilterCommands,
) -> anyhow::Result<()> {
    match command {
        FilterCommands::Types { types, tab } => {
            let mode = tab.map_or(session.selection().mode, FilterMode::from);
            session.set_store_types_for(mode, &types);
        }
        FilterCommands::County { county } => session.set_county(county.as_deref())?,
        FilterCommands::District { district } => session.set_district(district.as_deref())?,
        FilterCommands::Region { county, district } => {
            let target = district.map_or(RegionTarget::AllDistricts, RegionTarget::District);
            let checked = session.toggle_region(&county, &target)?;
            let label = match &target {
                RegionTarget::AllDistricts => county,
                RegionTarget::District(d) => format!("{county} / {d}"),
            };
            println!("{label}: {}", if checked { "checked" } else { "unchecked" });
        }
        FilterCommands::Direction { direction } => {
            let selected = session.toggle_direction_all(&direction)?;
            println!(
                "{direction}: {}",
                if selected { "all counties checked" } else { "cleared" }
            );
        }
        FilterCommands::Reset { tab } => {
            let mode = tab.map_or(session.selection().mode, FilterMode::from);
            session.reset(mode);
        }
    }
    Ok(())
}

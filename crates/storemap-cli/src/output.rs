//! Terminal rendering for command results.

use serde_json::json;
use storemap_core::{FilterMode, RankedStore, StoreRecord, Viewport};
use storemap_session::{Renderer, StoreMapSession};

/// Keeps the last drawn map state; the commands print from the session
/// itself, so drawing here only logs.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    pub visible: usize,
    pub clustering: bool,
    pub view: Option<Viewport>,
    pub focused: Option<String>,
}

impl Renderer for TerminalRenderer {
    fn display_stores(&mut self, stores: &[&StoreRecord], clustering: bool) {
        self.visible = stores.iter().filter(|s| s.has_coordinates()).count();
        self.clustering = clustering;
        tracing::debug!(markers = self.visible, clustering, "markers drawn");
    }

    fn focus_on_store(&mut self, store: &StoreRecord, viewport: Viewport) {
        self.focused = Some(store.name.clone());
        self.view = Some(viewport);
    }

    fn set_view(&mut self, viewport: Viewport) {
        self.view = Some(viewport);
    }
}

pub(crate) fn print_stores(stores: &[&StoreRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stores)?);
        return Ok(());
    }
    for store in stores {
        println!(
            "{:<24} {:<12} {}{} {}",
            store.name, store.store_type, store.county, store.district, store.address
        );
    }
    println!("{} store(s)", stores.len());
    Ok(())
}

pub(crate) fn print_ranked(results: &[RankedStore<'_>], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("no matching stores");
    }
    for ranked in results {
        match ranked.distance_km {
            Some(km) => println!("{} ({km:.2} km)", ranked.store.name),
            None => println!("{}", ranked.store.name),
        }
    }
    Ok(())
}

pub(crate) fn print_viewport(viewport: Viewport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&viewport)?);
    } else {
        println!(
            "view {}, {} zoom {}",
            viewport.lat(),
            viewport.lng(),
            viewport.zoom()
        );
    }
    Ok(())
}

/// Region tree for one tab, with check marks for the multi tab.
pub(crate) fn print_regions(
    session: &StoreMapSession<TerminalRenderer>,
    mode: FilterMode,
    json: bool,
) -> anyhow::Result<()> {
    let index = session.region_index(mode);
    let multi = &session.selection().multi;
    let marks = mode == FilterMode::Multi;

    if json {
        let tree: Vec<_> = index
            .directions()
            .map(|direction| {
                let counties: Vec<_> = index
                    .counties_in(direction)
                    .map(|(county, node)| {
                        json!({
                            "county": county,
                            "stores": node.store_count,
                            "checked": marks && multi.is_county_checked(county),
                            "districts": node.districts.iter().map(|d| json!({
                                "district": d,
                                "stores": node.district_counts.get(d).copied().unwrap_or(0),
                                "checked": marks && multi.is_district_checked(county, d),
                            })).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                json!({
                    "direction": direction,
                    "allSelected": marks && session.is_direction_fully_selected(direction),
                    "counties": counties,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    let mark = |checked: bool| match (marks, checked) {
        (false, _) => "",
        (true, true) => "[x] ",
        (true, false) => "[ ] ",
    };
    for direction in index.directions() {
        let all = session.is_direction_fully_selected(direction);
        println!("{}{direction}", mark(all));
        for (county, node) in index.counties_in(direction) {
            println!(
                "  {}{county} ({})",
                mark(multi.is_county_checked(county)),
                node.store_count
            );
            for district in &node.districts {
                let count = node.district_counts.get(district).copied().unwrap_or(0);
                println!(
                    "    {}{district} ({count})",
                    mark(multi.is_district_checked(county, district))
                );
            }
        }
    }
    Ok(())
}

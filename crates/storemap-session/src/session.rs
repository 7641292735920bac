use std::sync::Arc;

use storemap_core::{
    resolve, Catalog, FilterMode, PersistedState, Position, RegionIndex, RegionTarget,
    SelectionModel, StateError, StoreRecord, Viewport, MAP_BOUNDS, NEARBY_FOCUS_ZOOM,
};
use storemap_persist::{discard, load_state, StateStore};
use tokio::sync::watch;

use crate::error::SessionError;
use crate::renderer::Renderer;

/// Owns all filter state for one loaded catalog.
///
/// Every mutating call re-resolves the visible stores, hands them to the
/// renderer, and publishes a [`PersistedState`] snapshot on the change
/// channel returned by [`StoreMapSession::subscribe`].
pub struct StoreMapSession<R> {
    catalog: Arc<Catalog>,
    selection: SelectionModel,
    single_index: RegionIndex,
    multi_index: RegionIndex,
    renderer: R,
    changes: watch::Sender<PersistedState>,
}

impl<R: Renderer> StoreMapSession<R> {
    /// Session with an empty selection. Nothing is rendered until
    /// [`Self::start`] or the first mutation.
    pub fn new(catalog: Arc<Catalog>, renderer: R) -> Self {
        let selection = SelectionModel::default();
        let single_index = selection.region_index(&catalog, FilterMode::Single);
        let multi_index = selection.region_index(&catalog, FilterMode::Multi);
        let (changes, _) = watch::channel(PersistedState::capture(&selection));
        Self {
            catalog,
            selection,
            single_index,
            multi_index,
            renderer,
            changes,
        }
    }

    /// Change notifications for the persistence writer. The current value is
    /// already marked seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PersistedState> {
        self.changes.subscribe()
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared handle for search tasks that outlive a borrow of the session.
    #[must_use]
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    #[must_use]
    pub fn region_index(&self, mode: FilterMode) -> &RegionIndex {
        match mode {
            FilterMode::Single => &self.single_index,
            FilterMode::Multi => &self.multi_index,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Stores visible under the active tab's selection.
    #[must_use]
    pub fn visible_stores(&self) -> Vec<&StoreRecord> {
        resolve(&self.catalog, &self.selection)
    }

    #[must_use]
    pub fn is_direction_fully_selected(&self, direction: &str) -> bool {
        self.selection
            .multi
            .is_direction_fully_selected(direction, &self.multi_index)
    }

    // -- startup ------------------------------------------------------------

    /// Restore saved state from `store` if there is any, then render once.
    /// Unusable saved state is logged, removed, and ignored.
    pub fn start(&mut self, store: &dyn StateStore) {
        if let Some(state) = load_state(store) {
            match self.restore(state) {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding saved state");
                    discard(store);
                }
            }
        }
        self.render();
    }

    /// Rebuild the selection from a saved snapshot.
    ///
    /// Type filters are applied before regions so county and district values
    /// are checked against an index built for those types; values the index
    /// no longer contains are dropped. The selection is rendered once, after
    /// every field is in place, and the saved viewport is applied last.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the snapshot fails validation. The session
    /// is left unchanged in that case.
    pub fn restore(&mut self, state: PersistedState) -> Result<(), StateError> {
        let mut selection = state.into_selection()?;

        let single_index = selection.region_index(&self.catalog, FilterMode::Single);
        let multi_index = selection.region_index(&self.catalog, FilterMode::Multi);
        let pruned_single = selection.single.retain_within(&single_index);
        let pruned_multi = selection.multi.retain_within(&multi_index);
        if pruned_single || pruned_multi {
            tracing::info!("saved regions no longer in the catalog were dropped");
        }

        let viewport = selection.viewport;
        self.selection = selection;
        self.single_index = single_index;
        self.multi_index = multi_index;

        self.render();
        self.selection.viewport = viewport;
        self.renderer.set_view(viewport);
        self.publish();
        Ok(())
    }

    // -- tabs and type filters ------------------------------------------------

    /// Switch tabs. The inactive tab keeps its selection.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.selection.mode = mode;
        self.refresh();
    }

    /// Replace the active tab's type filter.
    pub fn set_store_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_store_types_for(self.selection.mode, types);
    }

    /// Replace one tab's type filter, rebuild its region index and drop
    /// selections the new index does not contain.
    pub fn set_store_types_for<I, S>(&mut self, mode: FilterMode, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = self
            .selection
            .set_store_types_for(mode, types, &self.catalog);
        match mode {
            FilterMode::Single => self.single_index = index,
            FilterMode::Multi => self.multi_index = index,
        }
        self.refresh();
    }

    // -- single tab -----------------------------------------------------------

    /// Pick a county (or none). Clears the district when the county changes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownCounty`] if the county has no stores
    /// under the single tab's type filter.
    pub fn set_county(&mut self, county: Option<&str>) -> Result<(), SessionError> {
        let county = county.map(str::trim).filter(|c| !c.is_empty());
        if let Some(c) = county {
            if !self.single_index.contains_county(c) {
                return Err(SessionError::UnknownCounty(c.to_string()));
            }
        }
        self.selection.single.set_county(county);
        self.refresh();
        Ok(())
    }

    /// Pick a district of the selected county (or none).
    ///
    /// # Errors
    ///
    /// - [`SessionError::Selection`] if no county is selected.
    /// - [`SessionError::UnknownDistrict`] if the district is not in the county.
    pub fn set_district(&mut self, district: Option<&str>) -> Result<(), SessionError> {
        let district = district.map(str::trim).filter(|d| !d.is_empty());
        if let (Some(county), Some(d)) = (self.selection.single.county(), district) {
            if !self.single_index.contains_district(county, d) {
                return Err(SessionError::UnknownDistrict {
                    county: county.to_string(),
                    district: d.to_string(),
                });
            }
        }
        self.selection.single.set_district(district)?;
        self.refresh();
        Ok(())
    }

    // -- multi tab ------------------------------------------------------------

    /// Flip one district checkbox or a county's own checkbox. Returns the new
    /// checked state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownCounty`] or
    /// [`SessionError::UnknownDistrict`] for entries not in the region tree.
    pub fn toggle_region(
        &mut self,
        county: &str,
        target: &RegionTarget,
    ) -> Result<bool, SessionError> {
        if !self.multi_index.contains_county(county) {
            return Err(SessionError::UnknownCounty(county.to_string()));
        }
        if let RegionTarget::District(district) = target {
            if !self.multi_index.contains_district(county, district) {
                return Err(SessionError::UnknownDistrict {
                    county: county.to_string(),
                    district: district.clone(),
                });
            }
        }
        let checked = self.selection.multi.toggle_region(county, target);
        self.refresh();
        Ok(checked)
    }

    /// Check every county under a direction, or uncheck them all if they are
    /// already all checked. Returns whether the direction is now fully selected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownDirection`] for a direction not in the tree.
    pub fn toggle_direction_all(&mut self, direction: &str) -> Result<bool, SessionError> {
        if self.multi_index.counties_in(direction).next().is_none() {
            return Err(SessionError::UnknownDirection(direction.to_string()));
        }
        let selected = self
            .selection
            .multi
            .toggle_direction_all(direction, &self.multi_index);
        self.refresh();
        Ok(selected)
    }

    /// Clear one tab's selections; the other tab is untouched.
    pub fn reset(&mut self, mode: FilterMode) {
        self.selection.reset(mode);
        let index = self.selection.region_index(&self.catalog, mode);
        match mode {
            FilterMode::Single => self.single_index = index,
            FilterMode::Multi => self.multi_index = index,
        }
        self.refresh();
    }

    // -- view -----------------------------------------------------------------

    pub fn set_clustering(&mut self, enabled: bool) {
        self.selection.clustering = enabled;
        self.refresh();
    }

    /// Returns the new clustering state.
    pub fn toggle_clustering(&mut self) -> bool {
        self.set_clustering(!self.selection.clustering);
        self.selection.clustering
    }

    /// Record a pan or zoom. The center is kept inside the map bounds.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.selection.viewport = viewport.clamped(&MAP_BOUNDS);
        self.publish();
    }

    /// Center on a store by name at `zoom`. The first store with that name wins.
    ///
    /// # Errors
    ///
    /// - [`SessionError::UnknownStore`] if no store has that name.
    /// - [`SessionError::MissingCoordinates`] if it cannot be placed on the map.
    pub fn focus_store(&mut self, name: &str, zoom: u8) -> Result<&StoreRecord, SessionError> {
        let store = self
            .catalog
            .find_by_name(name)
            .ok_or_else(|| SessionError::UnknownStore(name.to_string()))?;
        if !store.has_coordinates() {
            return Err(SessionError::MissingCoordinates(name.to_string()));
        }

        let viewport = Viewport::centered_on(
            Position {
                lat: store.lat,
                lng: store.lng,
            },
            zoom,
        );
        self.selection.viewport = viewport;
        self.renderer.focus_on_store(store, viewport);
        self.publish();
        Ok(store)
    }

    /// Center the map on the user, as after a successful nearby lookup.
    pub fn show_position(&mut self, position: Position) {
        let viewport = Viewport::centered_on(position, NEARBY_FOCUS_ZOOM);
        self.selection.viewport = viewport;
        self.renderer.set_view(viewport);
        self.publish();
    }

    /// Drop every selection and return to the default view.
    pub fn reset_all(&mut self) {
        self.selection = SelectionModel::default();
        self.single_index = self.selection.region_index(&self.catalog, FilterMode::Single);
        self.multi_index = self.selection.region_index(&self.catalog, FilterMode::Multi);
        self.renderer.set_view(self.selection.viewport);
        self.refresh();
    }

    // -- internals ------------------------------------------------------------

    fn refresh(&mut self) {
        self.render();
        self.publish();
    }

    /// Draw the resolved stores. An empty result returns the map to the
    /// default view.
    fn render(&mut self) {
        let stores = resolve(&self.catalog, &self.selection);
        if stores.is_empty() {
            self.selection.viewport = Viewport::default();
            self.renderer.set_view(self.selection.viewport);
        }
        tracing::debug!(
            mode = %self.selection.mode,
            visible = stores.len(),
            "rendering stores"
        );
        self.renderer
            .display_stores(&stores, self.selection.clustering);
    }

    fn publish(&self) {
        self.changes
            .send_replace(PersistedState::capture(&self.selection));
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

//! Canonical display labels.
//!
//! Formatting rules, in order:
//!
//! - countries and continents are labelled with their bare name;
//! - a place whose country cannot be resolved gets its bare name;
//! - a non-region place in the United States is labelled
//!   `"<name>, <state abbreviation>"`, or just `"<name>"` when the state
//!   abbreviation is unavailable (never `"<name>, United States"`);
//! - everything else is labelled `"<name>, <country>"`.

use gazetteer_resolver_models::LookupOptions;

use crate::Resolver;

/// Country whose places are suffixed with a state abbreviation.
pub const UNITED_STATES: &str = "United States";

impl Resolver {
    /// Returns the canonical label of place `id`.
    ///
    /// Returns `None` only when the place's own record cannot be fetched;
    /// failures further up the hierarchy shorten the label instead.
    pub async fn canonical_form(&mut self, id: &str, options: &LookupOptions) -> Option<String> {
        let Some(record) = self.fetch_place(id, options).await else {
            if options.verbose {
                log::warn!("could not get canonical form for {id}");
            }
            return None;
        };

        let place_name = record.preferred_name().map(String::from);

        if record.is_country_or_continent() {
            return place_name;
        }

        let Some(country_name) = self.country_name_of(id, options).await else {
            return place_name;
        };

        if country_name == UNITED_STATES && !record.is_region() {
            return match self.state_abbreviation_of(id, options).await {
                Some(abbreviation) => Some(join_label(place_name.as_deref(), &abbreviation)),
                None => place_name,
            };
        }

        Some(join_label(place_name.as_deref(), &country_name))
    }
}

/// Joins a place name and a suffix with `", "`, omitting the missing name.
fn join_label(place_name: Option<&str>, suffix: &str) -> String {
    place_name.map_or_else(|| suffix.to_string(), |name| format!("{name}, {suffix}"))
}

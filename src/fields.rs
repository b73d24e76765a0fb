//! Per-category field tables.
//!
//! Two independent, read-only tables:
//!
//! | Table | Question it answers |
//! |-------|---------------------|
//! | [`DisplayFieldSet`] | Which fields to show, and whether to show them by default |
//! | [`SparseReferenceFields`] | Which reference fields to dereference live in thorough mode |
//!
//! The display table is a presentation hint derived from each category's
//! canonical example record (Luke Skywalker, Tatooine, CR90 corvette, Sand
//! Crawler, Human, A New Hope). It never decides what gets fetched.

use crate::models::Category;

/// Reference fields dereferenced on every resolution.
pub const ALWAYS_RESOLVED: [&str; 2] = ["homeworld", "films"];

/// Ordered display fields for one category, each flagged with whether it is
/// populated in the category's canonical example record.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFieldSet {
    fields: &'static [(&'static str, bool)],
}

const PEOPLE_DISPLAY: &[(&str, bool)] = &[
    ("name", true),
    ("height", true),
    ("mass", true),
    ("hair_color", true),
    ("skin_color", true),
    ("eye_color", true),
    ("birth_year", true),
    ("gender", true),
    ("homeworld", true),
    ("species", false),
    ("vehicles", true),
    ("starships", true),
    ("films", true),
];

const PLANETS_DISPLAY: &[(&str, bool)] = &[
    ("name", true),
    ("rotation_period", true),
    ("orbital_period", true),
    ("diameter", true),
    ("climate", true),
    ("gravity", true),
    ("terrain", true),
    ("surface_water", true),
    ("population", true),
    ("residents", true),
    ("films", true),
];

const STARSHIPS_DISPLAY: &[(&str, bool)] = &[
    ("name", true),
    ("model", true),
    ("manufacturer", true),
    ("cost_in_credits", true),
    ("length", true),
    ("max_atmosphering_speed", true),
    ("crew", true),
    ("passengers", true),
    ("cargo_capacity", true),
    ("consumables", true),
    ("hyperdrive_rating", true),
    ("MGLT", true),
    ("starship_class", true),
    ("pilots", false),
    ("films", true),
];

const VEHICLES_DISPLAY: &[(&str, bool)] = &[
    ("name", true),
    ("model", true),
    ("manufacturer", true),
    ("cost_in_credits", true),
    ("length", true),
    ("max_atmosphering_speed", true),
    ("crew", true),
    ("passengers", true),
    ("cargo_capacity", true),
    ("consumables", true),
    ("vehicle_class", true),
    ("pilots", false),
    ("films", true),
];

const SPECIES_DISPLAY: &[(&str, bool)] = &[
    ("name", true),
    ("classification", true),
    ("designation", true),
    ("average_height", true),
    ("skin_colors", true),
    ("hair_colors", true),
    ("eye_colors", true),
    ("average_lifespan", true),
    ("homeworld", true),
    ("language", true),
    ("people", true),
    ("films", true),
];

const FILMS_DISPLAY: &[(&str, bool)] = &[
    ("title", true),
    ("episode_id", true),
    ("opening_crawl", true),
    ("director", true),
    ("producer", true),
    ("release_date", true),
    ("characters", true),
    ("planets", true),
    ("starships", true),
    ("vehicles", true),
    ("species", true),
];

impl DisplayFieldSet {
    pub fn for_category(category: Category) -> Self {
        let fields = match category {
            Category::People => PEOPLE_DISPLAY,
            Category::Planets => PLANETS_DISPLAY,
            Category::Starships => STARSHIPS_DISPLAY,
            Category::Vehicles => VEHICLES_DISPLAY,
            Category::Species => SPECIES_DISPLAY,
            Category::Films => FILMS_DISPLAY,
        };
        Self { fields }
    }

    /// Fields to hand to the presentation layer, in display order.
    ///
    /// Thorough mode shows every configured field; the default shows only
    /// those populated in the canonical record.
    pub fn display_fields(&self, thorough: bool) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|(_, populated)| thorough || *populated)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Whether `field` is populated in the canonical record. `None` if the
    /// field is not configured for display.
    pub fn is_populated(&self, field: &str) -> Option<bool> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, populated)| *populated)
    }
}

/// Reference fields whose presence varies between records and which thorough
/// mode dereferences live.
#[derive(Debug, Clone, Copy)]
pub struct SparseReferenceFields {
    fields: &'static [&'static str],
}

impl SparseReferenceFields {
    pub fn for_category(category: Category) -> Self {
        let fields: &'static [&'static str] = match category {
            Category::People => &["species", "vehicles", "starships"],
            Category::Planets => &["residents"],
            Category::Starships => &["pilots"],
            Category::Vehicles => &["pilots"],
            Category::Species => &["people"],
            Category::Films => &["characters", "planets", "starships", "vehicles", "species"],
        };
        Self { fields }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }
}

/// Reference fields to dereference for one resolution.
pub fn fields_to_resolve(category: Category, thorough: bool) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = ALWAYS_RESOLVED.to_vec();
    if thorough {
        for field in SparseReferenceFields::for_category(category).fields() {
            if !fields.contains(field) {
                fields.push(field);
            }
        }
    }
    fields
}

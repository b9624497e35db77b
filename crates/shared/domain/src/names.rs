//! Villager name generation.

use rand::Rng;

/// Picks a random "Given Family" name.
pub fn generate_name(rng: &mut impl Rng) -> String {
    let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
    let family = FAMILY_NAMES[rng.gen_range(0..FAMILY_NAMES.len())];
    format!("{given} {family}")
}

static GIVEN_NAMES: &[&str] = &[
    "Ada", "Alaric", "Bram", "Brenna", "Cato", "Cora", "Dara", "Edda", "Elric", "Fenna", "Finn",
    "Greta", "Hale", "Hilde", "Ivo", "Jora", "Kasimir", "Liesel", "Lorne", "Mira", "Nils", "Orla",
    "Pim", "Quill", "Rosalind", "Soren", "Tamsin", "Ulla", "Vesna", "Wren", "Yara", "Zeno",
];

static FAMILY_NAMES: &[&str] = &[
    "Ashdown",
    "Barrow",
    "Briarwood",
    "Cobble",
    "Dunmore",
    "Fairweather",
    "Fallow",
    "Greystone",
    "Hawthorn",
    "Holloway",
    "Kettle",
    "Marsh",
    "Millward",
    "Oakes",
    "Pennywhistle",
    "Quarry",
    "Reed",
    "Saltmarsh",
    "Thatcher",
    "Underhill",
    "Wainwright",
    "Woodfall",
];

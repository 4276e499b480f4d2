//! Survey feature codes and their Manning's roughness coefficients.
//!
//! DAT survey points carry a feature code of the form `~SURFACE*VEGETATION~`,
//! e.g. `~GR*NO~` for bare gravel or `~SO*GL~` for soil with long grass.
//! Roughness values can be overridden per code through [`ManningOverrides`].

use crate::config::ManningOverrides;

/// A bed cover class and its Manning's n.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedCover {
    pub code: &'static str,
    pub name: &'static str,
    pub manning: f64,
}

const fn cover(code: &'static str, name: &'static str, manning: f64) -> BedCover {
    BedCover {
        code,
        name,
        manning,
    }
}

/// Vegetation code meaning "no vegetation".
pub const NO_VEGETATION: &str = "NO";

/// Surface materials.
pub const SURFACE: &[BedCover] = &[
    cover("AS", "tarmacadam", 0.016),
    cover("BK", "brick", 0.015),
    cover("BR", "bedrock", 0.03),
    cover("CC", "concrete", 0.015),
    cover("CM", "corrugated metal", 0.05),
    cover("CO", "cobble", 0.04),
    cover("GA", "gabions", 0.03),
    cover("GR", "gravel", 0.035),
    cover("ME", "metal", 0.04),
    cover("MA", "masonry", 0.04),
    cover("OT", "other", 0.03),
    cover("PL", "plastic", 0.015),
    cover("PP", "plastic pile", 0.03),
    cover("RA", "rock armour", 0.03),
    cover("RR", "rip-rap", 0.03),
    cover("RU", "rubble", 0.05),
    cover("SO", "soil", 0.03),
    cover("SP", "sheet pile", 0.03),
    cover("ST", "stone", 0.025),
    cover("TA", "tarmacadam", 0.016),
    cover("TI", "timber", 0.02),
    cover("WO", "wood", 0.05),
    cover("WP", "wood pile", 0.03),
];

/// Vegetation classes.
pub const VEGETATION: &[BedCover] = &[
    cover("FF", "free floating plants", 0.07),
    cover("GS", "grass", 0.07),
    cover("MO", "moss", 0.07),
    cover("RE", "reeds", 0.1),
    cover("MP", "submerged plants", 0.1),
    cover("TR", "trailing plants", 0.1),
    cover("GL", "long grass", 0.05),
    cover("GM", "medium grass", 0.035),
    cover("HC", "closed hedge", 0.07),
    cover("HO", "open hedge", 0.05),
    cover("TD", "dense trees", 0.1),
    cover("TH", "heavy trees", 0.1),
    cover("TL", "light trees", 0.05),
    cover("TM", "medium trees", 0.07),
    cover(NO_VEGETATION, "", 0.0),
];

/// Look up a surface material by code.
pub fn surface(code: &str) -> Option<&'static BedCover> {
    SURFACE.iter().find(|c| c.code == code)
}

/// Look up a vegetation class by code.
pub fn vegetation(code: &str) -> Option<&'static BedCover> {
    VEGETATION.iter().find(|c| c.code == code)
}

/// Split `~SURFACE*VEGETATION~` into its two codes.
pub fn split_feature_code(code: &str) -> Option<(&str, &str)> {
    let trimmed = code.trim().trim_matches(|c| c == '~' || c == '*');
    let mut parts = trimmed.split('*');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(surface), Some(vegetation), None) => Some((surface.trim(), vegetation.trim())),
        _ => None,
    }
}

/// Manning's n for a feature code.
///
/// Vegetation governs unless the point is unvegetated, in which case the
/// surface material does. Overrides win over the built-in tables. Unknown
/// codes give `None`.
pub fn manning_roughness(code: &str, overrides: &ManningOverrides) -> Option<f64> {
    let (surface_code, vegetation_code) = split_feature_code(code)?;
    if vegetation_code == NO_VEGETATION {
        overrides
            .surface(surface_code)
            .or_else(|| surface(surface_code).map(|c| c.manning))
    } else {
        overrides
            .vegetation(vegetation_code)
            .or_else(|| vegetation(vegetation_code).map(|c| c.manning))
    }
}

/// Surface and vegetation names for a feature code, e.g. `("soil", "long grass")`.
///
/// Unknown codes and the empty "no vegetation" name give `None` in their slot.
pub fn cover_names(code: &str) -> Option<(Option<&'static str>, Option<&'static str>)> {
    let (surface_code, vegetation_code) = split_feature_code(code)?;
    let named = |c: &'static BedCover| (!c.name.is_empty()).then_some(c.name);
    Some((
        surface(surface_code).and_then(named),
        vegetation(vegetation_code).and_then(named),
    ))
}

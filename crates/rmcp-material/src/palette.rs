//! Scheme and core palette generation on top of `material-colors`.

use material_colors::dynamic_color::{DynamicColor, DynamicScheme, MaterialDynamicColors};
use material_colors::hct::Hct;
use material_colors::palette::CorePalette;
use material_colors::scheme::variant::{
    SchemeContent, SchemeExpressive, SchemeFidelity, SchemeFruitSalad, SchemeMonochrome,
    SchemeNeutral, SchemeRainbow, SchemeTonalSpot, SchemeVibrant,
};
use serde::Serialize;

use crate::seed::{hex_lower, hex_upper, parse_seed};
use crate::{ColorError, SchemeCategory};

/// Tone shown for every non-primary key color.
const KEY_TONE: i32 = 60;

#[derive(Debug, Clone)]
pub struct SchemeOptions {
    pub seed_color: String,
    pub category: String,
    pub dark_mode: bool,
    pub contrast_level: f64,
}

impl SchemeOptions {
    pub fn new(seed_color: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            seed_color: seed_color.into(),
            category: category.into(),
            dark_mode: false,
            contrast_level: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeColors {
    pub primary: String,
    pub on_primary: String,
    pub primary_container: String,
    pub on_primary_container: String,
    pub secondary: String,
    pub on_secondary: String,
    pub tertiary: String,
    pub on_tertiary: String,
    pub background: String,
    pub surface: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorePaletteColors {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
    pub error: String,
    pub neutral: String,
    pub neutral_variant: String,
}

fn build_scheme(category: SchemeCategory, source: Hct, dark: bool, contrast: f64) -> DynamicScheme {
    let contrast = Some(contrast);
    match category {
        SchemeCategory::Content => SchemeContent::new(source, dark, contrast).scheme,
        SchemeCategory::Expressive => SchemeExpressive::new(source, dark, contrast).scheme,
        SchemeCategory::Fidelity => SchemeFidelity::new(source, dark, contrast).scheme,
        SchemeCategory::FruitSalad => SchemeFruitSalad::new(source, dark, contrast).scheme,
        SchemeCategory::Monochrome => SchemeMonochrome::new(source, dark, contrast).scheme,
        SchemeCategory::Neutral => SchemeNeutral::new(source, dark, contrast).scheme,
        SchemeCategory::Rainbow => SchemeRainbow::new(source, dark, contrast).scheme,
        SchemeCategory::TonalSpot => SchemeTonalSpot::new(source, dark, contrast).scheme,
        SchemeCategory::Vibrant => SchemeVibrant::new(source, dark, contrast).scheme,
    }
}

/// Build the dynamic scheme for a seed and category and read its main roles.
pub fn generate_color_scheme(options: &SchemeOptions) -> Result<SchemeColors, ColorError> {
    let category: SchemeCategory = options.category.parse()?;
    if !options.contrast_level.is_finite() || !(-1.0..=1.0).contains(&options.contrast_level) {
        return Err(ColorError::ContrastOutOfRange(options.contrast_level));
    }
    let seed = parse_seed(&options.seed_color)?;

    tracing::debug!(
        seed = %hex_upper(seed),
        %category,
        dark = options.dark_mode,
        contrast = options.contrast_level,
        "building dynamic scheme"
    );

    let scheme = build_scheme(
        category,
        Hct::new(seed),
        options.dark_mode,
        options.contrast_level,
    );
    let role = |mut color: DynamicColor| hex_lower(color.get_argb(&scheme));

    Ok(SchemeColors {
        primary: role(MaterialDynamicColors::primary()),
        on_primary: role(MaterialDynamicColors::on_primary()),
        primary_container: role(MaterialDynamicColors::primary_container()),
        on_primary_container: role(MaterialDynamicColors::on_primary_container()),
        secondary: role(MaterialDynamicColors::secondary()),
        on_secondary: role(MaterialDynamicColors::on_secondary()),
        tertiary: role(MaterialDynamicColors::tertiary()),
        on_tertiary: role(MaterialDynamicColors::on_tertiary()),
        background: role(MaterialDynamicColors::background()),
        surface: role(MaterialDynamicColors::surface()),
    })
}

/// Key colors as shown by Material Theme Builder: the seed itself for
/// primary, tone 60 of the content core palette for the rest.
pub fn generate_core_palette_colors(seed_color: &str) -> Result<CorePaletteColors, ColorError> {
    let seed = parse_seed(seed_color)?;
    let core = CorePalette::content_of(seed);

    Ok(CorePaletteColors {
        primary: hex_upper(seed),
        secondary: hex_upper(core.secondary.tone(KEY_TONE)),
        tertiary: hex_upper(core.tertiary.tone(KEY_TONE)),
        error: hex_upper(core.error.tone(KEY_TONE)),
        neutral: hex_upper(core.neutral.tone(KEY_TONE)),
        neutral_variant: hex_upper(core.neutral_variant.tone(KEY_TONE)),
    })
}

//! The eighteen terrain types, their categories and palette pairings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Biome,
    Desert,
}

impl Category {
    pub fn types(&self) -> &'static [TerrainType; 9] {
        match self {
            Category::Biome => &TerrainType::BIOMES,
            Category::Desert => &TerrainType::DESERTS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Biome => "Biome",
            Category::Desert => "Désert",
        }
    }
}

/// Colour family shared by one Biome type and its Desert counterpart.
///
/// Declaration order is the legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaletteGroup {
    Vert,
    Jaune,
    Orange,
    Violet,
    Noir,
    Rouge,
    Cyan,
    Bleu,
    Rose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    // Biomes
    Foret,
    Jungle,
    Plaine,
    Marais,
    Mont,
    Sable,
    Riviere,
    Lac,
    Oasis,
    // Deserts
    ForetPetrifiee,
    TerresFongales,
    CiteFantome,
    TourbiereAssechee,
    MontNoir,
    Saliniere,
    CanyonPlat,
    #[serde(rename = "mer_d_ombre")]
    MerDOmbre,
    NuageToxique,
}

impl TerrainType {
    pub const BIOMES: [TerrainType; 9] = [
        TerrainType::Foret,
        TerrainType::Jungle,
        TerrainType::Plaine,
        TerrainType::Marais,
        TerrainType::Mont,
        TerrainType::Sable,
        TerrainType::Riviere,
        TerrainType::Lac,
        TerrainType::Oasis,
    ];

    pub const DESERTS: [TerrainType; 9] = [
        TerrainType::ForetPetrifiee,
        TerrainType::TerresFongales,
        TerrainType::CiteFantome,
        TerrainType::TourbiereAssechee,
        TerrainType::MontNoir,
        TerrainType::Saliniere,
        TerrainType::CanyonPlat,
        TerrainType::MerDOmbre,
        TerrainType::NuageToxique,
    ];

    pub fn all() -> impl Iterator<Item = TerrainType> {
        Self::BIOMES.into_iter().chain(Self::DESERTS)
    }

    pub fn key(&self) -> &'static str {
        match self {
            TerrainType::Foret => "foret",
            TerrainType::Jungle => "jungle",
            TerrainType::Plaine => "plaine",
            TerrainType::Marais => "marais",
            TerrainType::Mont => "mont",
            TerrainType::Sable => "sable",
            TerrainType::Riviere => "riviere",
            TerrainType::Lac => "lac",
            TerrainType::Oasis => "oasis",
            TerrainType::ForetPetrifiee => "foret_petrifiee",
            TerrainType::TerresFongales => "terres_fongales",
            TerrainType::CiteFantome => "cite_fantome",
            TerrainType::TourbiereAssechee => "tourbiere_assechee",
            TerrainType::MontNoir => "mont_noir",
            TerrainType::Saliniere => "saliniere",
            TerrainType::CanyonPlat => "canyon_plat",
            TerrainType::MerDOmbre => "mer_d_ombre",
            TerrainType::NuageToxique => "nuage_toxique",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TerrainType::Foret => "Forêt",
            TerrainType::Jungle => "Jungle",
            TerrainType::Plaine => "Plaine",
            TerrainType::Marais => "Marais",
            TerrainType::Mont => "Mont",
            TerrainType::Sable => "Sable",
            TerrainType::Riviere => "Rivière",
            TerrainType::Lac => "Lac",
            TerrainType::Oasis => "Oasis",
            TerrainType::ForetPetrifiee => "Forêt Pétrifiée",
            TerrainType::TerresFongales => "Terres Fongales",
            TerrainType::CiteFantome => "Cité Fantôme",
            TerrainType::TourbiereAssechee => "Tourbière Asséchée",
            TerrainType::MontNoir => "Mont Noir",
            TerrainType::Saliniere => "Salinière",
            TerrainType::CanyonPlat => "Canyon Plat",
            TerrainType::MerDOmbre => "Mer d'ombre",
            TerrainType::NuageToxique => "Nuage Toxique",
        }
    }

    pub fn category(&self) -> Category {
        if Self::BIOMES.contains(self) {
            Category::Biome
        } else {
            Category::Desert
        }
    }

    pub fn palette_group(&self) -> PaletteGroup {
        match self {
            TerrainType::Foret | TerrainType::ForetPetrifiee => PaletteGroup::Vert,
            TerrainType::Jungle | TerrainType::TerresFongales => PaletteGroup::Jaune,
            TerrainType::Plaine | TerrainType::CiteFantome => PaletteGroup::Orange,
            TerrainType::Marais | TerrainType::TourbiereAssechee => PaletteGroup::Violet,
            TerrainType::Mont | TerrainType::MontNoir => PaletteGroup::Noir,
            TerrainType::Sable | TerrainType::Saliniere => PaletteGroup::Rouge,
            TerrainType::Riviere | TerrainType::CanyonPlat => PaletteGroup::Cyan,
            TerrainType::Lac | TerrainType::MerDOmbre => PaletteGroup::Bleu,
            TerrainType::Oasis | TerrainType::NuageToxique => PaletteGroup::Rose,
        }
    }

    /// The type of the other category sharing this palette group.
    pub fn counterpart(&self) -> TerrainType {
        let group = self.palette_group();
        let other = match self.category() {
            Category::Biome => Category::Desert,
            Category::Desert => Category::Biome,
        };
        other
            .types()
            .iter()
            .copied()
            .find(|t| t.palette_group() == group)
            .unwrap_or(*self)
    }

    pub fn from_key(key: &str) -> Option<TerrainType> {
        Self::all().find(|t| t.key() == key)
    }

    /// Mountains are the tall types: they stay visible further out and seed rivers.
    pub fn is_mountain(&self) -> bool {
        matches!(self, TerrainType::Mont | TerrainType::MontNoir)
    }

    /// Channel, lake and flat canyon: cells a river may run through.
    pub fn is_river_passable(&self) -> bool {
        matches!(
            self,
            TerrainType::Riviere | TerrainType::Lac | TerrainType::CanyonPlat
        )
    }

    /// The shadow sea, where a river ends.
    pub fn is_river_terminal(&self) -> bool {
        matches!(self, TerrainType::MerDOmbre)
    }

    /// Inland seas; a single body is capped by neighbour count.
    pub fn is_inland_sea(&self) -> bool {
        matches!(self, TerrainType::Lac | TerrainType::MerDOmbre)
    }
}

impl fmt::Display for TerrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown terrain type '{0}'")]
pub struct UnknownTerrainKey(pub String);

impl FromStr for TerrainType {
    type Err = UnknownTerrainKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TerrainType::from_key(s.trim()).ok_or_else(|| UnknownTerrainKey(s.to_string()))
    }
}

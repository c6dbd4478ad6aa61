//! Built-in art style registry.
//!
//! Styles are static data grouped into a fixed, ordered set of categories.
//! Within a category the most-used styles come first; ties keep declaration
//! order.

use serde::Serialize;

/// Category tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StyleCategory {
    Painting,
    Drawing,
    Anime,
    VideoGame,
    Photography,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 5] = [
        StyleCategory::Painting,
        StyleCategory::Drawing,
        StyleCategory::Anime,
        StyleCategory::VideoGame,
        StyleCategory::Photography,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StyleCategory::Painting => "Painting Styles",
            StyleCategory::Drawing => "Drawing & Sketch",
            StyleCategory::Anime => "Anime & Manga",
            StyleCategory::VideoGame => "Video Game Art",
            StyleCategory::Photography => "Photography Effects",
        }
    }

    /// Match a category by label or short name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        let needle = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| {
            c.label().to_ascii_lowercase() == needle || c.short_name() == needle
        })
    }

    fn short_name(self) -> &'static str {
        match self {
            StyleCategory::Painting => "painting",
            StyleCategory::Drawing => "drawing",
            StyleCategory::Anime => "anime",
            StyleCategory::VideoGame => "game",
            StyleCategory::Photography => "photo",
        }
    }
}

/// One selectable art style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StylePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub category: StyleCategory,
    /// Description sent to the transform service.
    pub prompt_text: &'static str,
    /// Popularity weight used for ordering.
    pub usage_count: u32,
}

const fn preset(
    id: &'static str,
    name: &'static str,
    category: StyleCategory,
    usage_count: u32,
    prompt_text: &'static str,
) -> StylePreset {
    StylePreset {
        id,
        name,
        category,
        prompt_text,
        usage_count,
    }
}

use StyleCategory::{Anime, Drawing, Painting, Photography, VideoGame};

static PRESETS: [StylePreset; 37] = [
    // Painting
    preset(
        "impasto-oil",
        "Impasto Oil",
        Painting,
        1840,
        "A thick impasto oil painting with heavy, visible palette-knife strokes and rich textured paint",
    ),
    preset(
        "acrylic-pop",
        "Acrylic Pop",
        Painting,
        1320,
        "A bold acrylic pop-art painting with flat saturated colors and crisp graphic outlines",
    ),
    preset(
        "renaissance-oil",
        "Renaissance Oil",
        Painting,
        2110,
        "A Renaissance oil portrait with soft sfumato shading, warm glazes and a dark classical background",
    ),
    preset(
        "chinese-ink-wash",
        "Chinese Ink Wash",
        Painting,
        960,
        "A traditional Chinese ink wash painting with flowing brushwork, soft gradients and generous empty space",
    ),
    // Drawing & Sketch
    preset(
        "graphite-portrait",
        "Graphite Portrait",
        Drawing,
        1710,
        "A detailed graphite pencil portrait with fine hatching and smooth tonal blending on white paper",
    ),
    preset(
        "charcoal-drama",
        "Charcoal Drama",
        Drawing,
        1190,
        "A dramatic charcoal drawing with deep blacks, smudged shadows and strong chiaroscuro",
    ),
    preset(
        "technical-ink",
        "Technical Ink",
        Drawing,
        640,
        "A precise technical pen-and-ink illustration with clean line work and stippled shading",
    ),
    preset(
        "colored-pencil",
        "Colored Pencil",
        Drawing,
        1050,
        "A layered colored pencil drawing with soft visible strokes and gentle paper texture",
    ),
    preset(
        "chalk-pastel",
        "Chalk Pastel",
        Drawing,
        780,
        "A soft chalk pastel drawing on toned paper with powdery blended colors",
    ),
    // Anime & Manga
    preset(
        "studio-ghibli",
        "Studio Ghibli",
        Anime,
        3420,
        "A Studio Ghibli style hand-painted anime scene with warm light, soft colors and whimsical detail",
    ),
    preset(
        "manga-style",
        "Manga Style",
        Anime,
        2280,
        "A black and white manga panel with screentone shading, expressive eyes and bold ink lines",
    ),
    preset(
        "anime-portrait",
        "Anime Portrait",
        Anime,
        2950,
        "A polished modern anime character portrait with cel shading and vibrant hair highlights",
    ),
    preset(
        "chibi-art",
        "Chibi Art",
        Anime,
        1460,
        "A cute chibi character with an oversized head, tiny body and playful pastel colors",
    ),
    preset(
        "kawaii-style",
        "Kawaii Style",
        Anime,
        1380,
        "A kawaii illustration with rounded shapes, blushing cheeks, sparkles and candy colors",
    ),
    preset(
        "shoujo-style",
        "Shoujo Style",
        Anime,
        870,
        "A shoujo manga illustration with delicate lines, floral backgrounds and sparkling eyes",
    ),
    // Video Game Art
    preset(
        "pixel-art",
        "Pixel Art",
        VideoGame,
        2640,
        "A 16-bit pixel art sprite with a limited retro palette and crisp square pixels",
    ),
    preset(
        "3d-render",
        "3D Render",
        VideoGame,
        1930,
        "A stylized 3D animated-film render with soft global illumination and smooth materials",
    ),
    preset(
        "fantasy-art",
        "Fantasy Art",
        VideoGame,
        1570,
        "Epic fantasy game concept art with dramatic lighting, ornate armor and a mythical landscape",
    ),
    preset(
        "minecraft-style",
        "Minecraft Style",
        VideoGame,
        1240,
        "A blocky voxel world in the style of Minecraft with cube-shaped characters and pixel textures",
    ),
    preset(
        "fortnite-style",
        "Fortnite Style",
        VideoGame,
        1120,
        "A colorful battle-royale game character render with exaggerated proportions and bright cartoon shading",
    ),
    // Photography Effects
    preset(
        "vintage-film",
        "Vintage Film",
        Photography,
        2020,
        "A vintage 35mm film photograph with warm faded colors, soft grain and light leaks",
    ),
    preset(
        "hdr-effect",
        "HDR Effect",
        Photography,
        990,
        "A high dynamic range photograph with punchy local contrast and vivid detail in shadows and highlights",
    ),
    preset(
        "black-white",
        "Black & White",
        Photography,
        1650,
        "A classic high-contrast black and white photograph with deep blacks and fine grain",
    ),
    preset(
        "film-noir",
        "Film Noir",
        Photography,
        820,
        "A 1940s film noir still with hard side lighting, venetian blind shadows and smoky atmosphere",
    ),
    preset(
        "double-exposure",
        "Double Exposure",
        Photography,
        730,
        "A double exposure photograph blending the subject's silhouette with a forest landscape",
    ),
    preset(
        "vintage-sepia",
        "Vintage Sepia",
        Photography,
        690,
        "An antique sepia-toned photograph with soft vignetting and aged paper texture",
    ),
    preset(
        "lomography",
        "Lomography",
        Photography,
        540,
        "A lomography shot with oversaturated colors, strong vignetting and dreamy blur",
    ),
    preset(
        "polaroid-instant",
        "Polaroid Instant",
        Photography,
        1080,
        "A Polaroid instant photo with washed-out tones, a soft color cast and the white frame",
    ),
    preset(
        "hdr-surreal",
        "HDR Surreal",
        Photography,
        470,
        "A surreal over-processed HDR image with glowing edges and otherworldly saturated skies",
    ),
    preset(
        "cross-process",
        "Cross Process",
        Photography,
        390,
        "A cross-processed film photograph with shifted cyan and yellow tones and high contrast",
    ),
    preset(
        "long-exposure",
        "Long Exposure",
        Photography,
        450,
        "A long exposure photograph with silky motion blur and streaking light trails",
    ),
    preset(
        "infrared-photography",
        "Infrared Photography",
        Photography,
        360,
        "An infrared photograph with white foliage, dark skies and a false-color glow",
    ),
    preset(
        "tilt-shift-miniature",
        "Tilt-Shift Miniature",
        Photography,
        420,
        "A tilt-shift photograph with a narrow band of focus that makes the scene look like a miniature model",
    ),
    preset(
        "pinhole-camera",
        "Pinhole Camera",
        Photography,
        310,
        "A pinhole camera photograph with soft focus, heavy vignetting and infinite depth of field",
    ),
    preset(
        "cyanotype-blue",
        "Cyanotype Blue",
        Photography,
        280,
        "A cyanotype print in deep Prussian blue and white with botanical-print texture",
    ),
    preset(
        "daguerreotype",
        "Daguerreotype",
        Photography,
        260,
        "A 19th-century daguerreotype with a mirror-like silver sheen, soft edges and formal pose",
    ),
    preset(
        "neon-night",
        "Neon Night",
        Photography,
        1010,
        "A night street photograph lit by pink and cyan neon signs with wet reflective pavement",
    ),
];

/// Every preset, in declaration order.
pub fn all() -> &'static [StylePreset] {
    &PRESETS
}

/// Categories in display order.
pub fn categories() -> &'static [StyleCategory] {
    &StyleCategory::ALL
}

/// Members of `category`, most used first.
pub fn presets_in(category: StyleCategory) -> Vec<&'static StylePreset> {
    let mut members: Vec<&'static StylePreset> =
        PRESETS.iter().filter(|p| p.category == category).collect();
    // sort_by is stable, so equal weights keep declaration order.
    members.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
    members
}

pub fn find(id: &str) -> Option<&'static StylePreset> {
    PRESETS.iter().find(|p| p.id == id)
}

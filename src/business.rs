//! Perfiles de negocio usados para anclar cada petición al modelo.
//!
//! La tabla es estática y de sólo lectura; cualquier dato de marca
//! (vocabulario, productos, rol del experto) se lee de aquí y nunca de
//! condiciones repartidas por los handlers.

use serde::Serialize;

use crate::error::ServiceError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub business_type: &'static str,
    pub location: &'static str,
    pub description: &'static str,
    /// Narrativa libre que se inserta tal cual en los prompts.
    pub context: &'static str,
    pub menu_items: &'static [&'static str],
    pub target_audiences: &'static [&'static str],
    pub specialties: &'static [&'static str],
    /// Términos propios del dominio que el modelo debe usar.
    pub vocabulary: &'static [&'static str],
    /// Rol del mensaje de sistema para generación de contenido.
    pub expert_role: &'static str,
    /// Descripción corta para los prompts de análisis.
    pub market_summary: &'static str,
}

static BUSINESSES: &[BusinessProfile] = &[
    BusinessProfile {
        id: "allii-fish-market",
        name: "Allii Fish Market",
        business_type: "Hawaiian Poke Shop",
        location: "Honolulu, Hawaii",
        description: "Premium poke bowls, smoked meats, and authentic Hawaiian cuisine",
        context: "Allii Fish Market is a premium Hawaiian poke shop in Honolulu specializing in:
- Fresh poke bowls (Limu Ahi, Spicy Creamy Garlic Ahi, Wasabi Ginger A'u)
- Smoked meats (Pipikaula beef jerky, Lechon pork)
- Specialty items (Inari Poke Bombs, Wasabi Fried Chicken)
- Authentic Hawaiian flavors with modern presentation
- Located in Honolulu, serving locals and tourists
- Focus on fresh, daily-sourced fish and traditional preparation methods",
        menu_items: &[
            "Limu Ahi Poke Bowl",
            "Spicy Creamy Garlic Ahi",
            "Wasabi Ginger A'u",
            "Pipikaula Beef Jerky",
            "Lechon Pork",
            "Inari Poke Bombs",
            "Wasabi Fried Chicken",
        ],
        target_audiences: &[
            "locals",
            "tourists",
            "poke enthusiasts",
            "seafood lovers",
            "Hawaiian culture enthusiasts",
        ],
        specialties: &[
            "fresh fish",
            "Hawaiian authenticity",
            "traditional recipes",
            "daily sourcing",
        ],
        vocabulary: &["ahi", "a'u", "poke", "limu", "ohana", "aloha"],
        expert_role: "an expert content marketing specialist with deep knowledge of Hawaiian cuisine, social media trends, and local business marketing",
        market_summary: "Hawaiian poke restaurant focusing on fresh fish, traditional preparations, and local ingredients",
    },
    BusinessProfile {
        id: "allii-coconut-water",
        name: "Allii Coconut Water",
        business_type: "Beverage Company",
        location: "Hawaii & Mainland",
        description: "Organic coconut water and tropical beverages",
        context: "Allii Coconut Water is a premium beverage company specializing in:
- 100% organic coconut water sourced from Hawaiian coconuts
- Natural electrolyte-rich hydration drinks
- Tropical fruit-infused coconut waters (Pineapple, Mango, Passion Fruit)
- Sustainable farming practices and eco-friendly packaging
- Direct-from-source freshness with no added sugars or preservatives
- Distributed across Hawaii and expanding to mainland US markets
- Focus on health-conscious consumers and active lifestyle enthusiasts",
        menu_items: &[
            "Pure Organic Coconut Water",
            "Pineapple Coconut Fusion",
            "Mango Coconut Blend",
            "Passion Fruit Coconut",
            "Coconut Water with Electrolytes",
            "Coconut Water + Vitamin C",
            "Sparkling Coconut Water",
        ],
        target_audiences: &[
            "health-conscious consumers",
            "athletes",
            "yoga practitioners",
            "tropical drink lovers",
            "organic lifestyle enthusiasts",
        ],
        specialties: &[
            "organic sourcing",
            "no artificial additives",
            "sustainable practices",
            "electrolyte balance",
            "Hawaiian coconuts",
        ],
        vocabulary: &["hydration", "electrolytes", "organic", "tropical", "aloha", "mana"],
        expert_role: "an expert beverage marketing specialist with deep knowledge of healthy lifestyle trends, social media, and Hawaiian brand storytelling",
        market_summary: "Premium coconut water beverage company emphasizing health, purity, and Hawaiian lifestyle",
    },
];

/// Todos los perfiles conocidos, en orden fijo.
pub fn all() -> &'static [BusinessProfile] {
    BUSINESSES
}

/// Resuelve un identificador de negocio. No existe perfil por defecto.
pub fn resolve(business_id: &str) -> Result<&'static BusinessProfile, ServiceError> {
    BUSINESSES
        .iter()
        .find(|b| b.id == business_id)
        .ok_or_else(|| ServiceError::business_not_found(business_id))
}

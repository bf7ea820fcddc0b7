use super::{
    array, boolean, display_order, image, localized, localized_required, number, object, seo,
    slug, string, string_list, tag_list, text, ArrayMember, DocumentSchema, FieldKind,
};
use crate::preview::{Prepare, PreviewSpec};
use serde_json::Value;

const CATEGORIES: &[(&str, &str)] = &[
    ("Cacao", "cacao"),
    ("Café", "cafe"),
    ("Cajou", "cajou"),
    ("Sésame", "sesame"),
    ("Soja", "soja"),
    ("Bois", "bois"),
    ("Maïs", "mais"),
    ("Hévéa", "hevea"),
    ("Amandes", "amandes"),
    ("Sorgho", "sorgho"),
];

const CERTIFICATIONS: &[(&str, &str)] = &[
    ("UTZ Certified", "utz"),
    ("Rainforest Alliance", "rainforest"),
    ("Fairtrade", "fairtrade"),
    ("Bio / Organic", "organic"),
    ("FLEGT (Bois)", "flegt"),
    ("Non-OGM (selon lots)", "non-gmo"),
];

const INCOTERMS: &[(&str, &str)] = &[
    ("FOB Douala", "fob-douala"),
    ("CIF", "cif"),
    ("CFR", "cfr"),
];

pub(super) fn schema() -> DocumentSchema {
    DocumentSchema {
        name: "product",
        title: "Produit",
        singleton: false,
        icon: None,
        fields: vec![
            localized_required("name", "Nom"),
            slug("slug", "name.fr"),
            localized("description", "Description", text),
            string_list("category", "Catégorie", CATEGORIES).required(),
            boolean("isFlagship", "Produit phare")
                .describe("Mettre en avant sur la page d'accueil")
                .initial(Value::Bool(false)),
            image("image", "Image principale"),
            array(
                "gallery",
                "Galerie photos",
                vec![ArrayMember::of(FieldKind::Image { hotspot: true })],
            ),
            object(
                "origin",
                "Origine",
                vec![
                    string("region", "Région").describe("Ex: Sud-Ouest Cameroun"),
                    string("country", "Pays").initial(Value::from("Cameroun")),
                ],
            ),
            object(
                "technicalSpecs",
                "Spécifications techniques",
                vec![
                    number("humidity", "Humidité (%)").describe("Ex: 7.5"),
                    number("fatContent", "Teneur en matière grasse (%)").describe("Pour cacao"),
                    number("grainCount", "Grainage (fèves/100g)")
                        .describe("Pour cacao - Ex: 95-100"),
                    number("fermentationDays", "Jours de fermentation").describe("Pour cacao"),
                    localized("aromaticProfile", "Profil aromatique", text),
                    string("grade", "Grade qualité").describe("Ex: Grade I, Grade II, Premium"),
                    string("standard", "Norme de référence").describe("Ex: ISO 2451, ICCO"),
                ],
            )
            .describe("Données techniques pour acheteurs B2B (chocolatiers, industriels)"),
            object(
                "packaging",
                "Conditionnement export",
                vec![
                    string("type", "Type").describe("Ex: Sacs jute + liner PE"),
                    number("weight", "Poids unitaire (kg)").describe("Ex: 60, 65"),
                    string("containerCapacity", "Capacité conteneur 20'")
                        .describe("Ex: 18-20 tonnes"),
                ],
            ),
            tag_list("certifications", "Certifications disponibles", CERTIFICATIONS)
                .describe("Selon origine, volume et filière partenaire"),
            string("moq", "MOQ (Quantité minimum)").describe("Ex: 1 conteneur 20' (18T)"),
            localized("availability", "Disponibilité", string),
            tag_list("incoterms", "Incoterms proposés", INCOTERMS),
            seo(),
            display_order(),
        ],
        preview: PreviewSpec::new(
            &[("title", "name.fr"), ("subtitle", "category"), ("media", "image")],
            Prepare::Fields,
        ),
        orderings: Vec::new(),
    }
}

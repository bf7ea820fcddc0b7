use super::{
    boolean, display_order, image, localized, localized_required, object, string, string_list,
    text, url, DocumentSchema, Direction, Field, Ordering,
};
use crate::preview::{Prepare, PreviewSpec};
use serde_json::Value;

const DEPARTMENTS: &[(&str, &str)] = &[
    ("Direction", "management"),
    ("Commercial / Export", "commercial"),
    ("Qualité", "quality"),
    ("Logistique", "logistics"),
    ("Approvisionnement", "sourcing"),
    ("Administration", "admin"),
];

/// Localized full name; `ru` holds a Cyrillic transliteration.
fn full_name() -> Field {
    object(
        "name",
        "Nom complet",
        vec![
            string("fr", "Français").required(),
            string("en", "English").required(),
            string("ru", "Русский (Russe)").describe("Nom translittéré en cyrillique"),
        ],
    )
    .describe("Nom du membre de l'équipe dans différentes langues")
    .required()
}

pub(super) fn schema() -> DocumentSchema {
    DocumentSchema {
        name: "teamMember",
        title: "Membre équipe",
        singleton: false,
        icon: None,
        fields: vec![
            full_name(),
            localized_required("role", "Poste"),
            string_list("department", "Département", DEPARTMENTS),
            localized("bio", "Bio", text),
            image("photo", "Photo"),
            string("email", "Email"),
            string("phone", "Téléphone"),
            url("linkedin", "LinkedIn"),
            boolean("isKeyContact", "Contact clé export")
                .describe("Afficher comme interlocuteur principal pour les clients B2B")
                .initial(Value::Bool(false)),
            display_order(),
        ],
        preview: PreviewSpec::new(
            &[("title", "name.fr"), ("subtitle", "role.fr"), ("media", "photo")],
            Prepare::Fields,
        ),
        orderings: vec![Ordering::by(
            "Ordre d'affichage",
            "orderAsc",
            "order",
            Direction::Asc,
        )],
    }
}

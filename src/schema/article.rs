use super::{
    array, boolean, image, list_options, localized, localized_required, object, seo, slug, string,
    string_list, text, url, ArrayMember, Direction, DocumentSchema, Field, FieldKind, Ordering,
    Rule,
};
use crate::preview::{Prepare, PreviewSpec};
use serde_json::Value;

const CATEGORIES: &[(&str, &str)] = &[
    ("Actualités entreprise", "company-news"),
    ("Marché & Tendances", "market-trends"),
    ("Filière cacao", "cocoa-industry"),
    ("Certifications & Qualité", "certifications"),
    ("Export & Logistique", "export-logistics"),
    ("Développement durable", "sustainability"),
];

const VIDEO_PLATFORMS: &[(&str, &str)] = &[
    ("YouTube", "youtube"),
    ("Vimeo", "vimeo"),
    ("Lien direct (MP4)", "direct"),
];

fn excerpt_text(name: &'static str, title: &'static str) -> Field {
    text(name, title).max(200.0)
}

fn rich_content(name: &'static str, title: &'static str) -> Field {
    array(
        name,
        title,
        vec![
            ArrayMember::of(FieldKind::Block),
            ArrayMember::of(FieldKind::Image { hotspot: true }),
        ],
    )
}

pub(super) fn schema() -> DocumentSchema {
    DocumentSchema {
        name: "article",
        title: "Article",
        singleton: false,
        icon: None,
        fields: vec![
            localized_required("title", "Titre"),
            slug("slug", "title.fr"),
            string_list("category", "Catégorie", CATEGORIES),
            localized("excerpt", "Extrait", excerpt_text)
                .describe("Résumé court pour les listes d'articles"),
            localized("content", "Contenu", rich_content),
            image("image", "Image principale"),
            object(
                "video",
                "Vidéo (optionnel)",
                vec![
                    url("url", "URL de la vidéo").rule(Rule::Uri {
                        schemes: vec!["http", "https"],
                    }),
                    string_list("platform", "Plateforme", VIDEO_PLATFORMS),
                    image("thumbnail", "Miniature personnalisée (optionnel)")
                        .describe("Si non fournie, l'image principale sera utilisée"),
                ],
            )
            .describe("URL de la vidéo (YouTube, Vimeo, ou lien direct)"),
            Field::new("publishedAt", "Date de publication", FieldKind::Datetime).required(),
            object(
                "author",
                "Auteur",
                vec![
                    Field::new(
                        "authorType",
                        "Type d'auteur",
                        FieldKind::String {
                            list: list_options(&[
                                ("Membre de l'équipe", "team"),
                                ("Auteur externe", "external"),
                            ]),
                            layout: Some("radio"),
                        },
                    )
                    .initial(Value::from("team")),
                    Field::new(
                        "teamMember",
                        "Membre de l'équipe",
                        FieldKind::Reference {
                            to: vec!["teamMember"],
                        },
                    )
                    .hidden_unless("authorType", "team"),
                    string("externalName", "Nom de l'auteur externe")
                        .hidden_unless("authorType", "external"),
                    url("externalLink", "Lien vers l'auteur externe (optionnel)")
                        .hidden_unless("authorType", "external"),
                ],
            ),
            array(
                "relatedProducts",
                "Produits liés",
                vec![ArrayMember::of(FieldKind::Reference {
                    to: vec!["product"],
                })],
            ),
            boolean("featured", "Article mis en avant").initial(Value::Bool(false)),
            seo(),
        ],
        preview: PreviewSpec::new(
            &[("title", "title.fr"), ("subtitle", "category"), ("media", "image")],
            Prepare::Fields,
        ),
        orderings: vec![Ordering::by(
            "Date de publication (récent)",
            "publishedAtDesc",
            "publishedAt",
            Direction::Desc,
        )],
    }
}

use super::{
    array, number, object, string, string_kind, string_list, ArrayMember, DocumentSchema, Field,
    FieldKind, Rule,
};
use crate::preview::{Prepare, PreviewSpec};
use serde_json::Value;

pub(crate) const REGIONS: &[(&str, &str)] = &[
    ("Europe", "eu"),
    ("Asie", "asia"),
    ("Amérique du Nord", "usa"),
    ("Afrique", "africa"),
    ("Autres", "other"),
];

const MONTHS: &[(&str, &str)] = &[
    ("Janvier", "Jan"),
    ("Février", "Fév"),
    ("Mars", "Mar"),
    ("Avril", "Avr"),
    ("Mai", "Mai"),
    ("Juin", "Juin"),
    ("Juillet", "Juil"),
    ("Août", "Août"),
    ("Septembre", "Sep"),
    ("Octobre", "Oct"),
    ("Novembre", "Nov"),
    ("Décembre", "Déc"),
];

fn percentage() -> Field {
    number("percentage", "Pourcentage (%)")
        .required()
        .min(0.0)
        .max(100.0)
}

fn tonnes(name: &'static str, title: &'static str) -> Field {
    number(name, title).required().min(0.0)
}

fn string_array(name: &'static str, title: &'static str) -> Field {
    array(name, title, vec![ArrayMember::of(string_kind())])
}

fn kpi() -> Field {
    object(
        "kpi",
        "Indicateurs clés (KPI)",
        vec![
            number("tonnesExported", "Capacité d'exportation (tonnes/an)")
                .describe(
                    "Capacité annuelle d'exportation (toutes commodités confondues) : entre 20 000 et 40 000 tonnes",
                )
                .initial(Value::from(30000))
                .required()
                .min(20000.0)
                .max(40000.0),
            number("countriesServed", "Nombre de pays desservis").min(0.0),
            string_array("countriesList", "Liste des pays desservis")
                .describe("Noms des pays où vous exportez"),
            number("producerPartners", "Producteurs partenaires").min(0.0),
            number("yearsExperience", "Années d'expérience").min(0.0),
            number("tracedLots", "Lots tracés (%)").min(0.0).max(100.0),
        ],
    )
}

fn exports_by_region() -> Field {
    array(
        "exportsByRegion",
        "Exports par région",
        vec![ArrayMember::object(
            vec![
                string_list("region", "Région", REGIONS).required(),
                percentage(),
                string_array("countries", "Pays inclus"),
            ],
            PreviewSpec::new(
                &[("region", "region"), ("percentage", "percentage")],
                Prepare::ExportRegion,
            ),
        )],
    )
}

fn top_destinations() -> Field {
    array(
        "topDestinations",
        "Top destinations",
        vec![ArrayMember::object(
            vec![
                string("country", "Pays").required(),
                string("countryCode", "Code pays (ISO)")
                    .describe("Ex: FR, BE, NL, DE, CN")
                    .required()
                    .rule(Rule::Length(2)),
                percentage(),
                string("port", "Port principal"),
            ],
            PreviewSpec::new(
                &[
                    ("country", "country"),
                    ("percentage", "percentage"),
                    ("port", "port"),
                ],
                Prepare::TopDestination,
            ),
        )],
    )
}

fn monthly_volumes() -> Field {
    array(
        "monthlyVolumes",
        "Volumes mensuels",
        vec![ArrayMember::object(
            vec![
                string_list("month", "Mois", MONTHS).required(),
                number("year", "Année").required().min(2020.0).max(2030.0),
                tonnes("volume", "Volume (tonnes)"),
            ],
            PreviewSpec::new(
                &[("month", "month"), ("year", "year"), ("volume", "volume")],
                Prepare::MonthlyVolume,
            ),
        )],
    )
}

fn product_mix() -> Field {
    array(
        "productMix",
        "Répartition par produit",
        vec![ArrayMember::object(
            vec![
                string("product", "Produit").required(),
                string("slug", "Slug")
                    .describe("Identifiant unique (ex: cacao, cafe, cajou)")
                    .required(),
                tonnes("volume", "Volume (tonnes)"),
                percentage(),
                string("color", "Couleur (hex)")
                    .describe("Ex: #8B4513 pour le cacao")
                    .required()
                    .rule(Rule::Regex("^#[0-9A-Fa-f]{6}$")),
            ],
            PreviewSpec::new(
                &[
                    ("product", "product"),
                    ("percentage", "percentage"),
                    ("volume", "volume"),
                ],
                Prepare::ProductMix,
            ),
        )],
    )
}

/// Singleton backing the statistics page.
pub(super) fn schema() -> DocumentSchema {
    DocumentSchema {
        name: "exportStatistics",
        title: "Statistiques d'export",
        singleton: true,
        icon: Some("BarChartIcon"),
        fields: vec![
            string("title", "Titre (interne)")
                .initial(Value::from("Statistiques d'export"))
                .read_only(),
            Field::new("lastUpdated", "Dernière mise à jour", FieldKind::Date).required(),
            kpi(),
            exports_by_region(),
            top_destinations(),
            monthly_volumes(),
            product_mix(),
        ],
        preview: PreviewSpec::new(&[("lastUpdated", "lastUpdated")], Prepare::ExportStatistics),
        orderings: Vec::new(),
    }
}

// src/models/taxonomy.rs

//! Sector and region keyword tables used to build search queries.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A taxonomy key with the search terms it expands to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermSet {
    /// Filter key (e.g., "restaurant", "ile-de-france")
    pub key: String,

    /// Search terms in priority order
    pub terms: Vec<String>,
}

impl TermSet {
    fn new(key: &str, terms: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Ordered sector and region tables.
///
/// Order matters: query expansion walks the tables front to back, and region
/// inference returns the first region whose terms match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    #[serde(default = "defaults::sectors")]
    pub sectors: Vec<TermSet>,

    #[serde(default = "defaults::regions")]
    pub regions: Vec<TermSet>,
}

impl Taxonomy {
    /// All sector keys, in table order.
    pub fn sector_keys(&self) -> impl Iterator<Item = &str> {
        self.sectors.iter().map(|s| s.key.as_str())
    }

    /// All region keys, in table order.
    pub fn region_keys(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.key.as_str())
    }

    /// Terms for a sector. Unknown keys degrade to the key itself.
    pub fn sector_terms<'a>(&'a self, key: &'a str) -> Vec<&'a str> {
        Self::lookup(&self.sectors, key)
    }

    /// Terms for a region. Unknown keys degrade to the key itself.
    pub fn region_terms<'a>(&'a self, key: &'a str) -> Vec<&'a str> {
        Self::lookup(&self.regions, key)
    }

    fn lookup<'a>(table: &'a [TermSet], key: &'a str) -> Vec<&'a str> {
        table
            .iter()
            .find(|set| set.key == key)
            .filter(|set| !set.terms.is_empty())
            .map(|set| set.terms.iter().map(String::as_str).collect())
            .unwrap_or_else(|| vec![key])
    }

    /// Check that every key is non-empty and has at least one term.
    pub fn validate(&self) -> Result<()> {
        if self.sectors.is_empty() {
            return Err(AppError::validation("taxonomy.sectors is empty"));
        }
        if self.regions.is_empty() {
            return Err(AppError::validation("taxonomy.regions is empty"));
        }
        for set in self.sectors.iter().chain(&self.regions) {
            if set.key.trim().is_empty() {
                return Err(AppError::validation("taxonomy key is empty"));
            }
            if set.terms.iter().all(|t| t.trim().is_empty()) {
                return Err(AppError::validation(format!(
                    "taxonomy key '{}' has no terms",
                    set.key
                )));
            }
        }
        Ok(())
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            sectors: defaults::sectors(),
            regions: defaults::regions(),
        }
    }
}

mod defaults {
    use super::TermSet;

    pub fn sectors() -> Vec<TermSet> {
        vec![
            TermSet::new(
                "association",
                &["association", "asso", "club", "organisation"],
            ),
            TermSet::new("restaurant", &["restaurant", "bistrot", "brasserie", "café"]),
            TermSet::new("commerce", &["magasin", "boutique", "commerce", "shop"]),
            TermSet::new("services", &["service", "entreprise", "société", "cabinet"]),
            TermSet::new(
                "sante",
                &["cabinet médical", "dentiste", "médecin", "clinique"],
            ),
            TermSet::new(
                "education",
                &["école", "formation", "cours", "enseignement"],
            ),
        ]
    }

    pub fn regions() -> Vec<TermSet> {
        vec![
            TermSet::new(
                "ile-de-france",
                &[
                    "Paris",
                    "Boulogne-Billancourt",
                    "Saint-Denis",
                    "Argenteuil",
                    "Montreuil",
                    "Nanterre",
                    "Créteil",
                    "Versailles",
                    "Île-de-France",
                    "75",
                    "77",
                    "78",
                    "91",
                    "92",
                    "93",
                    "94",
                    "95",
                ],
            ),
            TermSet::new(
                "auvergne-rhone-alpes",
                &[
                    "Lyon",
                    "Saint-Étienne",
                    "Grenoble",
                    "Villeurbanne",
                    "Clermont-Ferrand",
                    "Chambéry",
                    "Annecy",
                    "Valence",
                    "Roanne",
                    "Vénissieux",
                    "Rhône-Alpes",
                    "Auvergne",
                    "Puy-de-Dôme",
                    "Cantal",
                    "Allier",
                    "Haute-Loire",
                    "Ain",
                    "Ardèche",
                    "Drôme",
                    "Isère",
                    "Loire",
                    "Rhône",
                    "Savoie",
                    "Haute-Savoie",
                ],
            ),
            TermSet::new(
                "nouvelle-aquitaine",
                &[
                    "Bordeaux",
                    "Limoges",
                    "Poitiers",
                    "Pau",
                    "La Rochelle",
                    "Mérignac",
                    "Pessac",
                    "Bayonne",
                    "Angoulême",
                    "Niort",
                    "Bergerac",
                    "Brive-la-Gaillarde",
                    "Biarritz",
                    "Gironde",
                    "Charente",
                    "Charente-Maritime",
                    "Corrèze",
                    "Creuse",
                    "Dordogne",
                    "Landes",
                    "Lot-et-Garonne",
                    "Pyrénées-Atlantiques",
                    "Deux-Sèvres",
                    "Vienne",
                    "Haute-Vienne",
                    "Nouvelle-Aquitaine",
                ],
            ),
            TermSet::new(
                "occitanie",
                &[
                    "Toulouse",
                    "Montpellier",
                    "Nîmes",
                    "Perpignan",
                    "Béziers",
                    "Narbonne",
                    "Albi",
                    "Carcassonne",
                    "Montauban",
                    "Sète",
                    "Rodez",
                    "Tarbes",
                    "Colomiers",
                    "Muret",
                    "Blagnac",
                    "Castres",
                    "Hérault",
                    "Gard",
                    "Aude",
                    "Aveyron",
                    "Haute-Garonne",
                    "Gers",
                    "Lot",
                    "Hautes-Pyrénées",
                    "Pyrénées-Orientales",
                    "Tarn",
                    "Tarn-et-Garonne",
                    "Occitanie",
                ],
            ),
            TermSet::new(
                "hauts-de-france",
                &[
                    "Lille",
                    "Amiens",
                    "Roubaix",
                    "Tourcoing",
                    "Dunkerque",
                    "Calais",
                    "Villeneuve-d’Ascq",
                    "Saint-Quentin",
                    "Valenciennes",
                    "Arras",
                    "Boulogne-sur-Mer",
                    "Soissons",
                    "Compiègne",
                    "Maubeuge",
                    "Lens",
                    "Nord",
                    "Pas-de-Calais",
                    "Oise",
                    "Somme",
                    "Aisne",
                    "Hauts-de-France",
                ],
            ),
            TermSet::new(
                "provence-alpes-cote-d-azur",
                &[
                    "Marseille",
                    "Nice",
                    "Toulon",
                    "Aix-en-Provence",
                    "Avignon",
                    "Cannes",
                    "Antibes",
                    "La Seyne-sur-Mer",
                    "Hyères",
                    "Fréjus",
                    "Gap",
                    "Digne-les-Bains",
                    "Alpes-Maritimes",
                    "Bouches-du-Rhône",
                    "Hautes-Alpes",
                    "Alpes-de-Haute-Provence",
                    "Var",
                    "Vaucluse",
                    "Provence-Alpes-Côte d’Azur",
                ],
            ),
            TermSet::new(
                "bourgogne-franche-comte",
                &[
                    "Dijon",
                    "Besançon",
                    "Belfort",
                    "Chalon-sur-Saône",
                    "Nevers",
                    "Auxerre",
                    "Mâcon",
                    "Montbéliard",
                    "Sens",
                    "Saône-et-Loire",
                    "Yonne",
                    "Nièvre",
                    "Côte-d’Or",
                    "Doubs",
                    "Jura",
                    "Haute-Saône",
                    "Territoire de Belfort",
                    "Bourgogne",
                    "Franche-Comté",
                ],
            ),
            TermSet::new(
                "centre-val-de-loire",
                &[
                    "Tours",
                    "Orléans",
                    "Bourges",
                    "Blois",
                    "Châteauroux",
                    "Chartres",
                    "Dreux",
                    "Indre-et-Loire",
                    "Loiret",
                    "Cher",
                    "Eure-et-Loir",
                    "Indre",
                    "Loir-et-Cher",
                    "Centre-Val de Loire",
                ],
            ),
            TermSet::new(
                "grand-est",
                &[
                    "Strasbourg",
                    "Reims",
                    "Metz",
                    "Mulhouse",
                    "Nancy",
                    "Colmar",
                    "Troyes",
                    "Charleville-Mézières",
                    "Épinal",
                    "Bar-le-Duc",
                    "Haguenau",
                    "Saint-Dizier",
                    "Bas-Rhin",
                    "Haut-Rhin",
                    "Moselle",
                    "Meurthe-et-Moselle",
                    "Meuse",
                    "Ardennes",
                    "Aube",
                    "Marne",
                    "Haute-Marne",
                    "Vosges",
                    "Grand Est",
                ],
            ),
            TermSet::new(
                "normandie",
                &[
                    "Le Havre",
                    "Caen",
                    "Rouen",
                    "Cherbourg-en-Cotentin",
                    "Évreux",
                    "Dieppe",
                    "Alençon",
                    "Saint-Lô",
                    "Lisieux",
                    "Vernon",
                    "Calvados",
                    "Eure",
                    "Manche",
                    "Orne",
                    "Seine-Maritime",
                    "Normandie",
                ],
            ),
            TermSet::new(
                "pays-de-la-loire",
                &[
                    "Nantes",
                    "Angers",
                    "Le Mans",
                    "Saint-Nazaire",
                    "Cholet",
                    "La Roche-sur-Yon",
                    "Laval",
                    "Saumur",
                    "Mayenne",
                    "Sarthe",
                    "Vendée",
                    "Loire-Atlantique",
                    "Maine-et-Loire",
                    "Pays de la Loire",
                ],
            ),
            TermSet::new(
                "bretagne",
                &[
                    "Rennes",
                    "Brest",
                    "Quimper",
                    "Lorient",
                    "Vannes",
                    "Saint-Malo",
                    "Fougères",
                    "Concarneau",
                    "Morbihan",
                    "Finistère",
                    "Côtes-d’Armor",
                    "Ille-et-Vilaine",
                    "Bretagne",
                ],
            ),
            TermSet::new(
                "corse",
                &[
                    "Ajaccio",
                    "Bastia",
                    "Corte",
                    "Sartène",
                    "Calvi",
                    "Porto-Vecchio",
                    "Corse-du-Sud",
                    "Haute-Corse",
                    "Corse",
                ],
            ),
            TermSet::new(
                "guadeloupe",
                &[
                    "Pointe-à-Pitre",
                    "Basse-Terre",
                    "Les Abymes",
                    "Le Gosier",
                    "Sainte-Anne",
                    "Baie-Mahault",
                    "Petit-Bourg",
                    "Guadeloupe",
                ],
            ),
            TermSet::new(
                "martinique",
                &[
                    "Fort-de-France",
                    "Le Lamentin",
                    "Le Robert",
                    "Schoelcher",
                    "Saint-Joseph",
                    "Ducos",
                    "Rivière-Salée",
                    "La Trinité",
                    "Martinique",
                ],
            ),
            TermSet::new(
                "guyane",
                &[
                    "Cayenne",
                    "Saint-Laurent-du-Maroni",
                    "Kourou",
                    "Matoury",
                    "Remire-Montjoly",
                    "Guyane",
                ],
            ),
            TermSet::new(
                "la-reunion",
                &[
                    "Saint-Denis",
                    "Saint-Paul",
                    "Saint-Pierre",
                    "Le Tampon",
                    "Saint-André",
                    "Saint-Louis",
                    "Le Port",
                    "La Réunion",
                ],
            ),
            TermSet::new(
                "mayotte",
                &[
                    "Mamoudzou",
                    "Koungou",
                    "Dzaoudzi",
                    "Dembeni",
                    "Bandraboua",
                    "Pamandzi",
                    "Mayotte",
                ],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_taxonomy_is_valid() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.validate().is_ok());
        assert_eq!(taxonomy.sectors.len(), 6);
        assert_eq!(taxonomy.regions.len(), 18);
    }

    #[test]
    fn test_known_key_lookup() {
        let taxonomy = Taxonomy::default();
        assert_eq!(
            taxonomy.sector_terms("restaurant"),
            vec!["restaurant", "bistrot", "brasserie", "café"]
        );
        assert_eq!(taxonomy.region_terms("corse")[0], "Ajaccio");
    }

    #[test]
    fn test_unknown_key_degrades_to_itself() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.sector_terms("boulangerie"), vec!["boulangerie"]);
        assert_eq!(taxonomy.region_terms("belgique"), vec!["belgique"]);
    }

    #[test]
    fn test_validate_rejects_empty_terms() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.sectors[0].terms.clear();
        assert!(taxonomy.validate().is_err());
    }

    #[test]
    fn test_keys_keep_table_order() {
        let taxonomy = Taxonomy::default();
        let keys: Vec<_> = taxonomy.sector_keys().collect();
        assert_eq!(keys[0], "association");
        assert_eq!(keys[5], "education");
        assert_eq!(taxonomy.region_keys().next(), Some("ile-de-france"));
    }
}

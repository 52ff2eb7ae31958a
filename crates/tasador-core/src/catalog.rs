//! Closed choice lists for the categorical fields.
//!
//! The lists reproduce the options offered by the property form. They are the
//! only values the collector accepts; the feature schema may know more or
//! fewer of them (see [`crate::schema::FeatureSchema::coverage`]).

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::field::{BinaryField, CategoricalField, Field, NumericField};

/// Sector choices.
pub const SECTORS: [&str; 93] = [
    "170 Y ALREDORES",
    "ALTOS DE SUBA Y CERROS DE SAN JORGE",
    "AMERICAS",
    "ANTONIO NARINO",
    "APOGEO",
    "ARBORIZADORA",
    "BAVARIA",
    "BOLIVIA",
    "BOSA CENTRAL",
    "BOSA OCCIDENTAL",
    "BOSA SOACHA",
    "BOYACA REAL",
    "BRITALIA",
    "CALANDAIMA",
    "CASA BLANCA SUBA",
    "CASTILLA",
    "CASTILLA MARSELLA",
    "CEDRITOS",
    "CENTRO INTERNACIONAL",
    "CENTRO NARINO",
    "CENTRO Y ZONA COLONIAL",
    "CERROS DE SUBA",
    "CHAPINERO",
    "CHAPINERO ALTO",
    "CHICO",
    "CHICO LAGO",
    "CIUDAD BOLIVAR",
    "CIUDAD SALITRE OCCIDENTAL",
    "CIUDAD SALITRE ORIENTAL",
    "CIUDAD USME",
    "COLINA Y ALREDEDORES",
    "CORTIJO AUTOPISTA MEDELLIN",
    "COUNTRY",
    "COUNTRY CLUB",
    "DANUBIO",
    "DOCE DE OCTUBRE",
    "EL MINUTO DE DIOS",
    "EL PORVENIR",
    "EL PRADO",
    "EL REFUGIO",
    "EL RINCON",
    "ENGATIVA",
    "FONTIBON",
    "FONTIBON SAN PABLO",
    "FONTIBON TINTAL",
    "GALERIAS",
    "GARCES NAVAS",
    "GRAN BRITALIA",
    "GRANJAS DE TECHO",
    "GUAYMARAL",
    "ISMAEL PERDOMO",
    "KENNEDY",
    "LA ALHAMBRA",
    "LA ESMERALDA",
    "LA FLORESTA",
    "LA SOLEDAD",
    "LA URIBE",
    "LAS MARGARITAS",
    "LOS ALCAZARES",
    "LOS CEDROS",
    "MARRUECOS",
    "METROPOLIS",
    "MODELIA",
    "NICOLAS DE FEDERMAN",
    "NIZA",
    "NIZA ALHAMBRA",
    "NORMANDIA",
    "ORQUIDEAS",
    "OTROS",
    "PARDO RUBIO",
    "PUENTE ARANDA",
    "QUINTA PAREDES",
    "QUIROGA",
    "RAFAEL URIBE URIBE TUNJUELITO",
    "RESTREPO",
    "SAGRADO CORAZON",
    "SALITRE MODELIA",
    "SAN JOSE DE BAVARIA",
    "SAN RAFAEL",
    "SANTA BARBARA",
    "SANTA CECILIA",
    "SOSIEGO",
    "SUBA",
    "TIBABUYES",
    "TIMIZA",
    "TIMIZA LA ALQUERIA",
    "TINTAL NORTE",
    "TINTAL SUR",
    "TOBERIN",
    "USAQUEN",
    "VENECIA",
    "VERBENAL",
    "ZONA FRANCA",
];

/// Age of Property choices.
pub const AGES_OF_PROPERTY: [&str; 5] = [
    "ENTRE 10 Y 20 ANOS",
    "MAS DE 20 ANOS",
    "ENTRE 0 Y 5 ANOS",
    "ENTRE 5 Y 10 ANOS",
    "REMODELADO",
];

/// Locality choices.
pub const LOCALITIES: [&str; 19] = [
    "ANTONIO NARINO",
    "BARRIOS UNIDOS",
    "BOSA",
    "CANDELARIA",
    "CHAPINERO",
    "CIUDAD BOLIVAR",
    "ENGATIVA",
    "FONTIBON",
    "KENNEDY",
    "LOS MARTIRES",
    "PUENTE ARANDA",
    "RAFAEL URIBE URIBE",
    "SAN CRISTOBAL",
    "SANTA FE",
    "SUBA",
    "TEUSAQUILLO",
    "TUNJUELITO",
    "USAQUEN",
    "USME",
];

/// Nearest TM Station choices.
pub const TM_STATIONS: [&str; 132] = [
    "21 Ángeles",
    "7 de Agosto",
    "AV. 1 Mayo",
    "AV. 39",
    "AV. 68",
    "AV. Américas - AV. Boyacá",
    "AV. Boyacá",
    "AV. Cali",
    "AV. Chile",
    "AV. El Dorado",
    "AV. Jiménez - CL 13",
    "AV. Jiménez - Caracas",
    "AV. Rojas",
    "Alcalá",
    "Alquería",
    "Banderas",
    "Biblioteca",
    "Biblioteca Tintal",
    "Bicentenario",
    "Bosa",
    "CAD",
    "CAN",
    "Calle 100 - Marketmedios",
    "Calle 106",
    "Calle 127",
    "Calle 142",
    "Calle 146",
    "Calle 161",
    "Calle 187",
    "Calle 19",
    "Calle 22",
    "Calle 26",
    "Calle 34",
    "Calle 40 S",
    "Calle 45 - American School Way",
    "Calle 57",
    "Calle 63",
    "Calle 72",
    "Calle 76 - San Felipe",
    "Calle 85",
    "Campín - UAN",
    "Carrera 43 - Comapan",
    "Carrera 47",
    "Carrera 53",
    "Carrera 90",
    "Centro Comercial Paseo Villa del Río - Madelena",
    "Centro Memoria",
    "Ciudad Jardín - UAN",
    "Ciudad Universitaria - Lotería de Bogotá",
    "Comuneros",
    "Concejo de Bogotá",
    "Country Sur",
    "De La Sabana",
    "Distrito Grafiti",
    "El Tiempo - Maloka",
    "Ferias",
    "Flores",
    "Fucha",
    "General Santander",
    "Gobernación",
    "Granja - Carrera 77",
    "Gratamira",
    "Guatoque - Veraguas",
    "Humedal Córdoba",
    "Héroes - Gel´Hada",
    "La Campiña",
    "La Despensa",
    "Las Aguas",
    "Las Nieves",
    "Leon XIII",
    "Mandalay",
    "Marly",
    "Marsella",
    "Mazurén",
    "Minuto de Dios",
    "Modelia",
    "Molinos",
    "Movistar Arena",
    "Museo Nacional",
    "Museo del Oro",
    "NQS - Calle 30 S",
    "NQS - Calle 38A S",
    "Niza - Calle 127",
    "Normandía",
    "Olaya",
    "Paloquemao",
    "Patio Bonito",
    "Pepe Sierra",
    "Perdomo",
    "Policarpa",
    "Polo",
    "Portal 20 de Julio",
    "Portal 80",
    "Portal Américas",
    "Portal El Dorado",
    "Portal Norte",
    "Portal Suba",
    "Portal Sur - JFK Coop. Financiera",
    "Portal Tunal",
    "Portal Usme",
    "Pradera",
    "Prado",
    "Puente Aranda",
    "Puentelargo",
    "Quinta Paredes",
    "Quirigua",
    "Quiroga",
    "Recinto Ferial",
    "Restrepo",
    "Ricaurte - CL 13",
    "Ricaurte - NQS",
    "SENA",
    "Salitre - El Greco",
    "San Diego",
    "San Fason Carrera 22",
    "Santa Isabel",
    "Santa Lucía",
    "Sevillana",
    "Suba - AV. Boyacá",
    "Suba - Calle 100",
    "Suba - Calle 116",
    "Suba - Calle 95",
    "Suba - TV. 91",
    "Terminal",
    "Terreros - Hospital C.V",
    "Toberín - Foundever",
    "Transversal 86",
    "Tygua - San José",
    "U. Nacional",
    "Universidades",
    "Virrey",
    "Zona Industrial",
];

/// Socioeconomic level choices.
pub const SOCIOECONOMIC_LEVELS: [&str; 6] = ["1", "2", "3", "4", "5", "6"];

/// Parking space choices.
pub const PARKING_SPACES: [&str; 5] = ["0", "1", "2", "3", "4"];

static CHOICE_SETS: Lazy<Vec<HashSet<&'static str>>> = Lazy::new(|| {
    CategoricalField::ALL
        .iter()
        .map(|f| choices(*f).iter().copied().collect())
        .collect()
});

static FIELDS_BY_NAME: Lazy<HashMap<&'static str, Field>> = Lazy::new(|| {
    NumericField::ALL
        .iter()
        .map(|f| Field::Numeric(*f))
        .chain(BinaryField::ALL.iter().map(|f| Field::Binary(*f)))
        .chain(CategoricalField::ALL.iter().map(|f| Field::Categorical(*f)))
        .map(|f| (f.name(), f))
        .collect()
});

/// Returns the choices of a categorical field.
pub fn choices(field: CategoricalField) -> &'static [&'static str] {
    match field {
        CategoricalField::Sector => &SECTORS,
        CategoricalField::AgeOfProperty => &AGES_OF_PROPERTY,
        CategoricalField::Locality => &LOCALITIES,
        CategoricalField::NearestTmStation => &TM_STATIONS,
        CategoricalField::SocioeconomicLevel => &SOCIOECONOMIC_LEVELS,
        CategoricalField::ParkingSpaces => &PARKING_SPACES,
    }
}

/// Resolves `value` to the catalog's own `'static` string.
pub fn canonical(field: CategoricalField, value: &str) -> Option<&'static str> {
    CHOICE_SETS[field.index()].get(value).copied()
}

pub(crate) fn field_by_name(name: &str) -> Option<Field> {
    FIELDS_BY_NAME.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_lists_have_unique_values() {
        for field in CategoricalField::ALL {
            let list = choices(field);
            let set: HashSet<_> = list.iter().collect();
            assert_eq!(set.len(), list.len(), "duplicate choice in {}", field.name());
        }
    }

    #[test]
    fn test_choice_list_sizes() {
        assert_eq!(SECTORS.len(), 93);
        assert_eq!(AGES_OF_PROPERTY.len(), 5);
        assert_eq!(LOCALITIES.len(), 19);
        assert_eq!(TM_STATIONS.len(), 132);
    }

    #[test]
    fn test_canonical() {
        assert_eq!(canonical(CategoricalField::Sector, "CHAPINERO"), Some("CHAPINERO"));
        assert_eq!(canonical(CategoricalField::NearestTmStation, "Calle 85"), Some("Calle 85"));
        assert!(canonical(CategoricalField::AgeOfProperty, "MAS DE 20 ANOS").is_some());
        assert_eq!(canonical(CategoricalField::SocioeconomicLevel, "4"), Some("4"));
        assert_eq!(canonical(CategoricalField::SocioeconomicLevel, "7"), None);
        assert_eq!(canonical(CategoricalField::Locality, "chapinero"), None);
    }

    #[test]
    fn test_field_by_name() {
        assert_eq!(
            field_by_name("pets_allowed"),
            Some(Field::Binary(BinaryField::PetsAllowed))
        );
        assert_eq!(
            field_by_name("parking_spaces"),
            Some(Field::Categorical(CategoricalField::ParkingSpaces))
        );
        assert_eq!(field_by_name("garden"), None);
    }
}

//! Instruction localization.
//!
//! Pure functions from (maneuver, modifier, distance, language) to text.
//! English, French and Spanish carry the same content; an unknown language
//! code silently falls back to English.

use serde::{Deserialize, Serialize};
use std::fmt;

use wayguide_providers::{Destination, Landmark, LandmarkCategory, ManeuverModifier, ManeuverType};

/// Supported guidance languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    French,
    Spanish,
}

impl Language {
    /// Resolve a language code such as `"fr"` or `"es-MX"`. Unknown codes map to English.
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "fr" => Self::French,
            "es" => Self::Spanish,
            _ => Self::English,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Spanish => "es",
        }
    }

    pub fn all() -> [Language; 3] {
        [Self::English, Self::French, Self::Spanish]
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Render a distance: whole meters below 1 km, kilometers with one decimal above.
pub fn format_distance(distance_m: f64, language: Language) -> String {
    let distance_m = if distance_m.is_finite() {
        distance_m.max(0.0)
    } else {
        0.0
    };

    let meters = distance_m.round() as i64;
    if meters < 1000 {
        match language {
            Language::English => format!("{meters} meters"),
            Language::French => format!("{meters} mètres"),
            Language::Spanish => format!("{meters} metros"),
        }
    } else {
        let km = format!("{:.1}", distance_m / 1000.0);
        match language {
            Language::English => format!("{km} kilometers"),
            Language::French => format!("{} kilomètres", km.replace('.', ",")),
            Language::Spanish => format!("{} kilómetros", km.replace('.', ",")),
        }
    }
}

/// Localize a maneuver into instruction text.
pub fn localize(
    maneuver_type: &ManeuverType,
    modifier: Option<&ManeuverModifier>,
    distance_m: f64,
    language: Language,
) -> String {
    let d = format_distance(distance_m, language);

    match maneuver_type {
        ManeuverType::Turn => in_distance(&d, turn_action(modifier, language), language),
        ManeuverType::Continue | ManeuverType::Straight => match language {
            Language::English => format!("Continue straight for {d}"),
            Language::French => format!("Continuez tout droit sur {d}"),
            Language::Spanish => format!("Siga recto durante {d}"),
        },
        ManeuverType::Merge => {
            let action = match (language, side(modifier)) {
                (Language::English, Some(Side::Left)) => "merge left",
                (Language::English, Some(Side::Right)) => "merge right",
                (Language::English, None) => "merge",
                (Language::French, Some(Side::Left)) => "rejoignez la voie à gauche",
                (Language::French, Some(Side::Right)) => "rejoignez la voie à droite",
                (Language::French, None) => "rejoignez la voie",
                (Language::Spanish, Some(Side::Left)) => "incorpórese por la izquierda",
                (Language::Spanish, Some(Side::Right)) => "incorpórese por la derecha",
                (Language::Spanish, None) => "incorpórese",
            };
            in_distance(&d, action, language)
        }
        ManeuverType::Fork => {
            let action = match (language, side(modifier)) {
                (Language::English, Some(Side::Left)) => "keep left at the fork",
                (Language::English, Some(Side::Right)) => "keep right at the fork",
                (Language::English, None) => "continue at the fork",
                (Language::French, Some(Side::Left)) => "restez à gauche à l'embranchement",
                (Language::French, Some(Side::Right)) => "restez à droite à l'embranchement",
                (Language::French, None) => "continuez à l'embranchement",
                (Language::Spanish, Some(Side::Left)) => "manténgase a la izquierda en la bifurcación",
                (Language::Spanish, Some(Side::Right)) => "manténgase a la derecha en la bifurcación",
                (Language::Spanish, None) => "continúe en la bifurcación",
            };
            in_distance(&d, action, language)
        }
        ManeuverType::Arrive => {
            let action = match language {
                Language::English => "you will arrive at your destination",
                Language::French => "vous arriverez à destination",
                Language::Spanish => "llegará a su destino",
            };
            in_distance(&d, action, language)
        }
        ManeuverType::Depart => match language {
            Language::English => format!("Head out and walk for {d}"),
            Language::French => format!("Partez et marchez sur {d}"),
            Language::Spanish => format!("Salga y camine durante {d}"),
        },
        ManeuverType::Other(kind) => {
            let action = match modifier {
                Some(m) => format!("{kind} {m}"),
                None => kind.clone(),
            };
            in_distance(&d, &action, language)
        }
    }
}

fn in_distance(d: &str, action: &str, language: Language) -> String {
    match language {
        Language::English => format!("In {d}, {action}"),
        Language::French => format!("Dans {d}, {action}"),
        Language::Spanish => format!("En {d}, {action}"),
    }
}

fn turn_action(modifier: Option<&ManeuverModifier>, language: Language) -> &'static str {
    use ManeuverModifier as M;

    match (language, modifier) {
        (Language::English, Some(M::Left)) => "turn left",
        (Language::English, Some(M::Right)) => "turn right",
        (Language::English, Some(M::SlightLeft)) => "turn slightly left",
        (Language::English, Some(M::SlightRight)) => "turn slightly right",
        (Language::English, Some(M::SharpLeft)) => "turn sharp left",
        (Language::English, Some(M::SharpRight)) => "turn sharp right",
        (Language::English, Some(M::UTurn)) => "make a U-turn",
        (Language::English, Some(M::Straight)) => "continue straight",
        (Language::English, _) => "turn",

        (Language::French, Some(M::Left)) => "tournez à gauche",
        (Language::French, Some(M::Right)) => "tournez à droite",
        (Language::French, Some(M::SlightLeft)) => "tournez légèrement à gauche",
        (Language::French, Some(M::SlightRight)) => "tournez légèrement à droite",
        (Language::French, Some(M::SharpLeft)) => "tournez franchement à gauche",
        (Language::French, Some(M::SharpRight)) => "tournez franchement à droite",
        (Language::French, Some(M::UTurn)) => "faites demi-tour",
        (Language::French, Some(M::Straight)) => "continuez tout droit",
        (Language::French, _) => "tournez",

        (Language::Spanish, Some(M::Left)) => "gire a la izquierda",
        (Language::Spanish, Some(M::Right)) => "gire a la derecha",
        (Language::Spanish, Some(M::SlightLeft)) => "gire ligeramente a la izquierda",
        (Language::Spanish, Some(M::SlightRight)) => "gire ligeramente a la derecha",
        (Language::Spanish, Some(M::SharpLeft)) => "gire bruscamente a la izquierda",
        (Language::Spanish, Some(M::SharpRight)) => "gire bruscamente a la derecha",
        (Language::Spanish, Some(M::UTurn)) => "dé media vuelta",
        (Language::Spanish, Some(M::Straight)) => "siga recto",
        (Language::Spanish, _) => "gire",
    }
}

enum Side {
    Left,
    Right,
}

fn side(modifier: Option<&ManeuverModifier>) -> Option<Side> {
    use ManeuverModifier as M;

    match modifier? {
        M::Left | M::SlightLeft | M::SharpLeft => Some(Side::Left),
        M::Right | M::SlightRight | M::SharpRight => Some(Side::Right),
        _ => None,
    }
}

/// Message replacing the instruction while the walker heads away from the destination.
pub fn turn_around(language: Language) -> String {
    match language {
        Language::English => {
            "You are walking away from your destination. Please turn around.".to_string()
        }
        Language::French => {
            "Vous vous éloignez de votre destination. Veuillez faire demi-tour.".to_string()
        }
        Language::Spanish => "Se está alejando de su destino. Por favor, dé media vuelta.".to_string(),
    }
}

/// Fallback guidance when no route is available.
pub fn straight_line(distance_m: f64, walking_minutes: u64, language: Language) -> String {
    let d = format_distance(distance_m, language);
    match language {
        Language::English => format!(
            "Your destination is {d} away in a straight line, about {walking_minutes} minutes on foot"
        ),
        Language::French => format!(
            "Votre destination est à {d} à vol d'oiseau, environ {walking_minutes} minutes à pied"
        ),
        Language::Spanish => format!(
            "Su destino está a {d} en línea recta, unos {walking_minutes} minutos a pie"
        ),
    }
}

/// Narration used when live location is unavailable.
pub fn static_narration(destination: &Destination, language: Language) -> String {
    let place = match &destination.address {
        Some(address) => format!("{}, {}", destination.name, address),
        None => destination.name.clone(),
    };
    match language {
        Language::English => {
            format!("Live location is unavailable. Your destination is {place}.")
        }
        Language::French => format!(
            "La localisation en direct n'est pas disponible. Votre destination est {place}."
        ),
        Language::Spanish => format!(
            "La ubicación en tiempo real no está disponible. Su destino es {place}."
        ),
    }
}

/// Arrival announcement.
pub fn arrival(destination_name: Option<&str>, language: Language) -> String {
    match (language, destination_name) {
        (Language::English, Some(name)) => format!("You have arrived at {name}"),
        (Language::English, None) => "You have arrived at your destination".to_string(),
        (Language::French, Some(name)) => format!("Vous êtes arrivé à {name}"),
        (Language::French, None) => "Vous êtes arrivé à destination".to_string(),
        (Language::Spanish, Some(name)) => format!("Ha llegado a {name}"),
        (Language::Spanish, None) => "Ha llegado a su destino".to_string(),
    }
}

/// Localized label for a landmark category.
pub fn category_label(category: LandmarkCategory, language: Language) -> &'static str {
    use LandmarkCategory as C;

    match (language, category) {
        (Language::English, C::School) => "school",
        (Language::English, C::Mosque) => "mosque",
        (Language::English, C::Church) => "church",
        (Language::English, C::Market) => "market",
        (Language::English, C::BusStop) => "bus stop",
        (Language::English, C::Other) => "place",
        (Language::French, C::School) => "école",
        (Language::French, C::Mosque) => "mosquée",
        (Language::French, C::Church) => "église",
        (Language::French, C::Market) => "marché",
        (Language::French, C::BusStop) => "arrêt de bus",
        (Language::French, C::Other) => "lieu",
        (Language::Spanish, C::School) => "escuela",
        (Language::Spanish, C::Mosque) => "mezquita",
        (Language::Spanish, C::Church) => "iglesia",
        (Language::Spanish, C::Market) => "mercado",
        (Language::Spanish, C::BusStop) => "parada de autobús",
        (Language::Spanish, C::Other) => "lugar",
    }
}

/// Narrate a list of landmarks, used when no path is available.
pub fn landmark_narration(landmarks: &[Landmark], language: Language) -> String {
    if landmarks.is_empty() {
        return match language {
            Language::English => "No landmarks found nearby".to_string(),
            Language::French => "Aucun repère trouvé à proximité".to_string(),
            Language::Spanish => "No se encontraron puntos de referencia cercanos".to_string(),
        };
    }

    let list = landmarks
        .iter()
        .map(|l| format!("{} ({})", l.name, category_label(l.category, language)))
        .collect::<Vec<_>>()
        .join(", ");

    match language {
        Language::English => format!("Nearby landmarks: {list}"),
        Language::French => format!("Repères à proximité : {list}"),
        Language::Spanish => format!("Puntos de referencia cercanos: {list}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodesy::Coordinate;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("fr"), Language::French);
        assert_eq!(Language::from_code("es-MX"), Language::Spanish);
        assert_eq!(Language::from_code("EN_gb"), Language::English);
        assert_eq!(Language::from_code("yo"), Language::English);
        assert_eq!(Language::from_code(""), Language::English);
    }

    #[test]
    fn test_language_serde_fallback() {
        let lang: Language = serde_json::from_str(r#""de""#).unwrap();
        assert_eq!(lang, Language::English);
        assert_eq!(serde_json::to_string(&Language::Spanish).unwrap(), r#""es""#);
    }

    #[test]
    fn test_distance_formatting() {
        assert_eq!(format_distance(80.4, Language::English), "80 meters");
        assert_eq!(format_distance(999.4, Language::English), "999 meters");
        assert_eq!(format_distance(999.6, Language::English), "1.0 kilometers");
        assert_eq!(format_distance(999.5, Language::Spanish), "1,0 kilómetros");
        assert_eq!(format_distance(1000.0, Language::English), "1.0 kilometers");
        assert_eq!(format_distance(2345.0, Language::English), "2.3 kilometers");
        assert_eq!(format_distance(1500.0, Language::French), "1,5 kilomètres");
        assert_eq!(format_distance(-3.0, Language::Spanish), "0 metros");
    }

    #[test]
    fn test_turn_left_in_all_languages() {
        let left = ManeuverModifier::Left;
        assert_eq!(
            localize(&ManeuverType::Turn, Some(&left), 80.0, Language::English),
            "In 80 meters, turn left"
        );
        assert_eq!(
            localize(&ManeuverType::Turn, Some(&left), 80.0, Language::French),
            "Dans 80 mètres, tournez à gauche"
        );
        assert_eq!(
            localize(&ManeuverType::Turn, Some(&left), 80.0, Language::Spanish),
            "En 80 metros, gire a la izquierda"
        );
    }

    #[test]
    fn test_turn_modifiers() {
        let cases = [
            (ManeuverModifier::Right, "In 20 meters, turn right"),
            (ManeuverModifier::SlightLeft, "In 20 meters, turn slightly left"),
            (ManeuverModifier::SlightRight, "In 20 meters, turn slightly right"),
            (ManeuverModifier::SharpLeft, "In 20 meters, turn sharp left"),
            (ManeuverModifier::SharpRight, "In 20 meters, turn sharp right"),
        ];
        for (modifier, expected) in cases {
            assert_eq!(
                localize(&ManeuverType::Turn, Some(&modifier), 20.0, Language::English),
                expected
            );
        }
    }

    #[test]
    fn test_other_maneuvers() {
        assert_eq!(
            localize(&ManeuverType::Continue, None, 1200.0, Language::English),
            "Continue straight for 1.2 kilometers"
        );
        assert_eq!(
            localize(
                &ManeuverType::Fork,
                Some(&ManeuverModifier::SlightRight),
                40.0,
                Language::English
            ),
            "In 40 meters, keep right at the fork"
        );
        assert_eq!(
            localize(&ManeuverType::Merge, None, 10.0, Language::Spanish),
            "En 10 metros, incorpórese"
        );
        assert_eq!(
            localize(&ManeuverType::Arrive, None, 30.0, Language::French),
            "Dans 30 mètres, vous arriverez à destination"
        );
        assert_eq!(
            localize(&ManeuverType::Depart, None, 150.0, Language::English),
            "Head out and walk for 150 meters"
        );
    }

    #[test]
    fn test_unrecognized_type_passthrough() {
        let kind = ManeuverType::parse("roundabout");
        assert_eq!(
            localize(&kind, Some(&ManeuverModifier::Right), 60.0, Language::English),
            "In 60 meters, roundabout right"
        );
        assert_eq!(
            localize(&kind, None, 60.0, Language::French),
            "Dans 60 mètres, roundabout"
        );
    }

    #[test]
    fn test_every_language_renders_every_phrase() {
        let destination = Destination::new("City Library", Coordinate::new(0.0, 0.0))
            .with_address("1 Main Street");
        for language in Language::all() {
            assert!(!turn_around(language).is_empty());
            assert!(straight_line(500.0, 6, language).contains('6'));
            assert!(static_narration(&destination, language).contains("1 Main Street"));
            assert!(arrival(Some("City Library"), language).contains("City Library"));
        }
    }

    #[test]
    fn test_landmark_narration() {
        let landmarks = vec![
            Landmark::from_candidate(
                wayguide_providers::PlaceCandidate::new("Unity School", Coordinate::new(0.0, 0.0)),
                LandmarkCategory::School,
            ),
            Landmark::from_candidate(
                wayguide_providers::PlaceCandidate::new("Oja Market", Coordinate::new(0.0, 0.0)),
                LandmarkCategory::Market,
            ),
        ];
        assert_eq!(
            landmark_narration(&landmarks, Language::English),
            "Nearby landmarks: Unity School (school), Oja Market (market)"
        );
        assert_eq!(
            landmark_narration(&[], Language::French),
            "Aucun repère trouvé à proximité"
        );
    }
}

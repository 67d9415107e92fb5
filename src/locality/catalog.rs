//! Canonical boroughs (alcaldías) and municipalities we deliver to.

use crate::models::Region;

/// Canonical display names with their parent region.
pub const CANONICAL_LOCALITIES: &[(&str, Region)] = &[
    // Ciudad de México
    ("Álvaro Obregón", Region::Cdmx),
    ("Azcapotzalco", Region::Cdmx),
    ("Benito Juárez", Region::Cdmx),
    ("Coyoacán", Region::Cdmx),
    ("Cuajimalpa de Morelos", Region::Cdmx),
    ("Cuauhtémoc", Region::Cdmx),
    ("Gustavo A. Madero", Region::Cdmx),
    ("Iztacalco", Region::Cdmx),
    ("Iztapalapa", Region::Cdmx),
    ("La Magdalena Contreras", Region::Cdmx),
    ("Miguel Hidalgo", Region::Cdmx),
    ("Milpa Alta", Region::Cdmx),
    ("Tláhuac", Region::Cdmx),
    ("Tlalpan", Region::Cdmx),
    ("Venustiano Carranza", Region::Cdmx),
    ("Xochimilco", Region::Cdmx),
    // Estado de México
    ("Atizapán de Zaragoza", Region::Edomex),
    ("Chalco", Region::Edomex),
    ("Chimalhuacán", Region::Edomex),
    ("Coacalco de Berriozábal", Region::Edomex),
    ("Cuautitlán", Region::Edomex),
    ("Cuautitlán Izcalli", Region::Edomex),
    ("Ecatepec de Morelos", Region::Edomex),
    ("Huixquilucan", Region::Edomex),
    ("Ixtapaluca", Region::Edomex),
    ("La Paz", Region::Edomex),
    ("Metepec", Region::Edomex),
    ("Naucalpan de Juárez", Region::Edomex),
    ("Nezahualcóyotl", Region::Edomex),
    ("Nicolás Romero", Region::Edomex),
    ("Tecámac", Region::Edomex),
    ("Texcoco", Region::Edomex),
    ("Tlalnepantla de Baz", Region::Edomex),
    ("Toluca", Region::Edomex),
    ("Valle de Chalco Solidaridad", Region::Edomex),
    ("Zumpango", Region::Edomex),
];

/// Common misspellings and abbreviations: (alias, canonical).
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("neza", "Nezahualcóyotl"),
    ("cd neza", "Nezahualcóyotl"),
    ("ciudad neza", "Nezahualcóyotl"),
    ("ciudad nezahualcoyotl", "Nezahualcóyotl"),
    ("nezahualcoyolt", "Nezahualcóyotl"),
    ("gam", "Gustavo A. Madero"),
    ("g a m", "Gustavo A. Madero"),
    ("gustavo madero", "Gustavo A. Madero"),
    ("bj", "Benito Juárez"),
    ("ecatepec", "Ecatepec de Morelos"),
    ("naucalpan", "Naucalpan de Juárez"),
    ("satelite", "Naucalpan de Juárez"),
    ("tlalnepantla", "Tlalnepantla de Baz"),
    ("izcalli", "Cuautitlán Izcalli"),
    ("cuajimalpa", "Cuajimalpa de Morelos"),
    ("magdalena contreras", "La Magdalena Contreras"),
    ("coacalco", "Coacalco de Berriozábal"),
    ("atizapan", "Atizapán de Zaragoza"),
    ("valle de chalco", "Valle de Chalco Solidaridad"),
    ("ixtapalapa", "Iztapalapa"),
    ("iztapalpa", "Iztapalapa"),
    ("cuahutemoc", "Cuauhtémoc"),
    ("cuautemoc", "Cuauhtémoc"),
    ("xochimilko", "Xochimilco"),
    ("toluca de lerdo", "Toluca"),
];

use crate::lenient;
use crate::store::Document;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Eres un asistente útil. Responde en español con claridad y precisión.";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview-2025-06-03";
pub const DEFAULT_VOICE: &str = "verse";

/// Assistant settings. Fields missing from disk fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "lenient::string")]
    pub system_prompt: String,
    #[serde(deserialize_with = "lenient::string")]
    pub model: String,
    #[serde(deserialize_with = "temperature")]
    pub temperature: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub realtime_model: String,
    #[serde(deserialize_with = "lenient::string")]
    pub voice: String,
}

fn temperature<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient::as_number(&Value::deserialize(deserializer)?).unwrap_or(DEFAULT_TEMPERATURE))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            realtime_model: DEFAULT_REALTIME_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
        }
    }
}

impl Document for Settings {
    const NAME: &'static str = "settings";

    fn default_shape() -> Self {
        Self::default()
    }
}

/// Domain fields of a collection item; the id is kept by [`Record`].
pub trait CollectionFields:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const COLLECTION: &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(flatten)]
    pub fields: F,
}

/// Items that cannot be read are skipped, not fatal to the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "F: DeserializeOwned"))]
pub struct CollectionDocument<F> {
    #[serde(default = "Vec::new", deserialize_with = "lenient::records")]
    pub items: Vec<Record<F>>,
}

impl<F: CollectionFields> Document for CollectionDocument<F> {
    const NAME: &'static str = F::COLLECTION;

    fn default_shape() -> Self {
        Self { items: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFields {
    #[serde(rename = "nombre", deserialize_with = "lenient::string")]
    pub first_name: String,
    #[serde(rename = "apellido", default, deserialize_with = "lenient::string")]
    pub last_name: String,
    #[serde(rename = "telefono", default, deserialize_with = "lenient::string")]
    pub phone: String,
}

impl CollectionFields for PersonFields {
    const COLLECTION: &'static str = "personas";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFields {
    #[serde(rename = "descripcion", deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(rename = "gasto", deserialize_with = "lenient::number")]
    pub amount: f64,
}

impl CollectionFields for ExpenseFields {
    const COLLECTION: &'static str = "gastos";
}

pub type Person = Record<PersonFields>;
pub type Expense = Record<ExpenseFields>;
